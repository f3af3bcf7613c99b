// Models module

pub mod asset;

// Re-export commonly used types
pub use asset::{Asset, MessageResponse};
