//! Asset Ledger Client
//!
//! Create, read, update and delete assets held by a ledger contract.
//!
//! # Architecture
//!
//! - **Facade**: [`AssetLedger`] runs one transaction per call
//! - **Gateway seam**: [`GatewayConnector`] / [`Gateway`] hide the network
//! - **Short-lived connections**: opened per call, always disconnected
//! - **Explicit errors**: every failure is logged and returned as [`LedgerError`]

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod ledger;
pub mod mock;
pub mod profile;
pub mod types;
pub mod wallet;

// Re-exports
pub use config::{DiscoveryConfig, LedgerConfig};
pub use error::{LedgerError, Result};
pub use gateway::{Contract, Gateway, GatewayConnector, Network};
pub use http::HttpGatewayConnector;
pub use ledger::AssetLedger;
pub use mock::MockGatewayConnector;
pub use profile::ConnectionProfile;
pub use types::{AssetTransaction, LedgerAsset};
pub use wallet::{FileSystemWallet, Identity};
