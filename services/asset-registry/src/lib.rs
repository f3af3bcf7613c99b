// Asset Registry Library
// Exposes modules for testing and integration

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod store;

pub use config::Config;
pub use error::{RegistryError, Result};
pub use handlers::{router, AppState};
pub use store::{spawn_asset_store, StoreHandle};
