//! Asset ledger facade
//!
//! Each operation opens its own gateway connection, runs exactly one
//! transaction against the configured channel and contract, and
//! disconnects before returning, whether the transaction succeeded or not.
//!
//! # Example
//!
//! ```no_run
//! use ledger_client::{AssetLedger, LedgerConfig};
//!
//! #[tokio::main]
//! async fn main() -> ledger_client::Result<()> {
//!     let ledger = AssetLedger::with_http(LedgerConfig::from_env()?);
//!
//!     ledger.create_asset("asset1", "Tomoko", "300").await?;
//!     let asset = ledger.read_asset("asset1").await?;
//!     assert_eq!(asset.owner, "Tomoko");
//!
//!     Ok(())
//! }
//! ```

use crate::{
    gateway::{Gateway, GatewayConnector},
    http::HttpGatewayConnector,
    profile::ConnectionProfile,
    types::{AssetTransaction, ConnectOptions, LedgerAsset},
    wallet::FileSystemWallet,
    LedgerConfig, Result,
};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Asset operations against a ledger contract
pub struct AssetLedger {
    /// Configuration
    config: LedgerConfig,

    /// Wallet holding the connecting identity
    wallet: FileSystemWallet,

    /// Opens gateway connections
    connector: Arc<dyn GatewayConnector>,
}

impl AssetLedger {
    /// Create a facade using the given connector
    pub fn new(config: LedgerConfig, connector: Arc<dyn GatewayConnector>) -> Self {
        let wallet = FileSystemWallet::new(config.wallet_path.clone());
        Self {
            config,
            wallet,
            connector,
        }
    }

    /// Create a facade talking to a REST gateway
    pub fn with_http(config: LedgerConfig) -> Self {
        Self::new(config, Arc::new(HttpGatewayConnector::new()))
    }

    /// Active configuration
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Open a gateway connection as the configured identity
    ///
    /// The caller owns the connection and must disconnect it.
    pub async fn connect_gateway(&self) -> Result<Box<dyn Gateway>> {
        self.config.validate()?;
        let profile = ConnectionProfile::load(&self.config.profile_path)?;
        let identity = self.wallet.get(&self.config.identity_name)?;

        self.connector
            .connect(ConnectOptions {
                profile,
                identity,
                discovery: self.config.discovery,
                request_timeout: Duration::from_secs(self.config.request_timeout_secs),
            })
            .await
    }

    /// Create an asset
    pub async fn create_asset(&self, asset_id: &str, owner: &str, value: &str) -> Result<()> {
        match self
            .invoke(AssetTransaction::Create, &[asset_id, owner, value])
            .await
        {
            Ok(_) => {
                info!("Asset {} created successfully", asset_id);
                Ok(())
            }
            Err(e) => {
                error!("Failed to create asset {}: {}", asset_id, e);
                Err(e)
            }
        }
    }

    /// Read an asset
    pub async fn read_asset(&self, asset_id: &str) -> Result<LedgerAsset> {
        let result = self
            .invoke(AssetTransaction::Read, &[asset_id])
            .await
            .and_then(|payload| Ok(serde_json::from_slice::<LedgerAsset>(&payload)?));

        match result {
            Ok(asset) => {
                info!(
                    "Asset {} details: owner={}, value={}",
                    asset.asset_id, asset.owner, asset.value
                );
                Ok(asset)
            }
            Err(e) => {
                error!("Failed to read asset {}: {}", asset_id, e);
                Err(e)
            }
        }
    }

    /// Replace an asset's value
    pub async fn update_asset(&self, asset_id: &str, new_value: &str) -> Result<()> {
        match self
            .invoke(AssetTransaction::Update, &[asset_id, new_value])
            .await
        {
            Ok(_) => {
                info!("Asset {} updated successfully", asset_id);
                Ok(())
            }
            Err(e) => {
                error!("Failed to update asset {}: {}", asset_id, e);
                Err(e)
            }
        }
    }

    /// Delete an asset
    pub async fn delete_asset(&self, asset_id: &str) -> Result<()> {
        match self.invoke(AssetTransaction::Delete, &[asset_id]).await {
            Ok(_) => {
                info!("Asset {} deleted successfully", asset_id);
                Ok(())
            }
            Err(e) => {
                error!("Failed to delete asset {}: {}", asset_id, e);
                Err(e)
            }
        }
    }

    /// Run one transaction on a fresh connection
    async fn invoke(&self, transaction: AssetTransaction, args: &[&str]) -> Result<Bytes> {
        let gateway = self.connect_gateway().await?;

        let contract = gateway
            .network(self.config.channel.as_str())
            .contract(self.config.contract.as_str());
        let result = match transaction {
            AssetTransaction::Read => {
                contract
                    .evaluate_transaction(transaction.name(), args)
                    .await
            }
            _ => contract.submit_transaction(transaction.name(), args).await,
        };

        gateway.disconnect().await;
        result
    }
}

impl std::fmt::Debug for AssetLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLedger")
            .field("config", &self.config)
            .field("wallet", &self.wallet)
            .finish_non_exhaustive()
    }
}
