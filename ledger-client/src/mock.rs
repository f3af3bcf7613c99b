//! In-process gateway backed by an in-memory world state
//!
//! Implements the asset contract the way the ledger does: creating an
//! existing asset fails, reading, updating or deleting a missing one fails.
//! Connections are counted and failures can be injected, which makes it
//! the gateway of choice for exercising the facade without a network.

use crate::gateway::{Gateway, GatewayConnector};
use crate::types::{AssetTransaction, ConnectOptions, LedgerAsset};
use crate::{LedgerError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// Transaction seen by the mock gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTransaction {
    /// Channel the transaction targeted
    pub channel: String,
    /// Contract the transaction targeted
    pub contract: String,
    /// Transaction name
    pub transaction: String,
    /// Transaction arguments
    pub args: Vec<String>,
    /// Whether it was submitted (true) or evaluated (false)
    pub submitted: bool,
}

#[derive(Default)]
struct Shared {
    world: RwLock<BTreeMap<String, LedgerAsset>>,
    history: Mutex<Vec<RecordedTransaction>>,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
    fail_connect: AtomicBool,
    fail_submit: AtomicBool,
    fail_evaluate: AtomicBool,
    last_identity: Mutex<Option<String>>,
}

/// Connector handing out connections to a shared in-memory ledger
#[derive(Clone, Default)]
pub struct MockGatewayConnector {
    shared: Arc<Shared>,
}

impl MockGatewayConnector {
    /// Create an empty mock ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful connects
    pub fn connect_count(&self) -> usize {
        self.shared.connects.load(Ordering::SeqCst)
    }

    /// Number of `disconnect` calls, repeated calls on one connection included
    pub fn disconnect_count(&self) -> usize {
        self.shared.disconnects.load(Ordering::SeqCst)
    }

    /// Make subsequent connects fail
    pub fn fail_connect(&self, fail: bool) {
        self.shared.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent submits fail
    pub fn fail_submit(&self, fail: bool) {
        self.shared.fail_submit.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent evaluates fail
    pub fn fail_evaluate(&self, fail: bool) {
        self.shared.fail_evaluate.store(fail, Ordering::SeqCst);
    }

    /// Current world state entry for `asset_id`
    pub async fn asset(&self, asset_id: &str) -> Option<LedgerAsset> {
        self.shared.world.read().await.get(asset_id).cloned()
    }

    /// Seed world state without going through a transaction
    pub async fn insert(&self, asset: LedgerAsset) {
        self.shared
            .world
            .write()
            .await
            .insert(asset.asset_id.clone(), asset);
    }

    /// Every transaction received so far
    pub async fn history(&self) -> Vec<RecordedTransaction> {
        self.shared.history.lock().await.clone()
    }

    /// `mspId` of the identity used by the last connect
    pub async fn last_identity(&self) -> Option<String> {
        self.shared.last_identity.lock().await.clone()
    }
}

#[async_trait]
impl GatewayConnector for MockGatewayConnector {
    async fn connect(&self, options: ConnectOptions) -> Result<Box<dyn Gateway>> {
        if self.shared.fail_connect.load(Ordering::SeqCst) {
            warn!("Mock gateway: simulated connect failure");
            return Err(LedgerError::Connection(
                "Simulated gateway failure".to_string(),
            ));
        }

        self.shared.connects.fetch_add(1, Ordering::SeqCst);
        *self.shared.last_identity.lock().await = Some(options.identity.msp_id.clone());

        Ok(Box::new(MockGateway {
            shared: self.shared.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

struct MockGateway {
    shared: Arc<Shared>,
    closed: AtomicBool,
}

fn expect_args<'a>(
    transaction: &str,
    args: &'a [String],
    count: usize,
) -> std::result::Result<&'a [String], String> {
    if args.len() != count {
        return Err(format!(
            "{} expects {} argument(s), got {}",
            transaction,
            count,
            args.len()
        ));
    }
    Ok(args)
}

impl MockGateway {
    async fn record(
        &self,
        channel: &str,
        contract: &str,
        transaction: &str,
        args: &[String],
        submitted: bool,
    ) {
        self.shared.history.lock().await.push(RecordedTransaction {
            channel: channel.to_string(),
            contract: contract.to_string(),
            transaction: transaction.to_string(),
            args: args.to_vec(),
            submitted,
        });
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(LedgerError::Connection(
                "Gateway connection already closed".to_string(),
            ));
        }
        Ok(())
    }

    /// Run the asset contract against world state
    async fn execute(
        &self,
        transaction: &str,
        args: &[String],
    ) -> std::result::Result<Bytes, String> {
        let tx = AssetTransaction::from_name(transaction)
            .ok_or_else(|| format!("unknown transaction {}", transaction))?;

        match tx {
            AssetTransaction::Create => {
                let args = expect_args(transaction, args, 3)?;
                let mut world = self.shared.world.write().await;
                if world.contains_key(&args[0]) {
                    return Err(format!("the asset {} already exists", args[0]));
                }
                world.insert(
                    args[0].clone(),
                    LedgerAsset::new(&args[0], &args[1], &args[2]),
                );
                Ok(Bytes::new())
            }
            AssetTransaction::Read => {
                let args = expect_args(transaction, args, 1)?;
                let world = self.shared.world.read().await;
                let asset = world
                    .get(&args[0])
                    .ok_or_else(|| format!("the asset {} does not exist", args[0]))?;
                serde_json::to_vec(asset)
                    .map(Bytes::from)
                    .map_err(|e| e.to_string())
            }
            AssetTransaction::Update => {
                let args = expect_args(transaction, args, 2)?;
                let mut world = self.shared.world.write().await;
                let asset = world
                    .get_mut(&args[0])
                    .ok_or_else(|| format!("the asset {} does not exist", args[0]))?;
                asset.value = args[1].clone();
                Ok(Bytes::new())
            }
            AssetTransaction::Delete => {
                let args = expect_args(transaction, args, 1)?;
                self.shared
                    .world
                    .write()
                    .await
                    .remove(&args[0])
                    .ok_or_else(|| format!("the asset {} does not exist", args[0]))?;
                Ok(Bytes::new())
            }
        }
    }
}

#[async_trait]
impl Gateway for MockGateway {
    fn endpoint(&self) -> &str {
        "mock://in-memory"
    }

    async fn submit(
        &self,
        channel: &str,
        contract: &str,
        transaction: &str,
        args: &[String],
    ) -> Result<Bytes> {
        self.ensure_open()?;
        self.record(channel, contract, transaction, args, true).await;

        if self.shared.fail_submit.load(Ordering::SeqCst) {
            warn!("Mock gateway: simulated submit failure");
            return Err(LedgerError::submit(transaction, "Simulated endorsement failure"));
        }

        let result = self
            .execute(transaction, args)
            .await
            .map_err(|reason| LedgerError::submit(transaction, reason))?;
        info!("Mock gateway: committed {}", transaction);
        Ok(result)
    }

    async fn evaluate(
        &self,
        channel: &str,
        contract: &str,
        transaction: &str,
        args: &[String],
    ) -> Result<Bytes> {
        self.ensure_open()?;
        self.record(channel, contract, transaction, args, false).await;

        if self.shared.fail_evaluate.load(Ordering::SeqCst) {
            warn!("Mock gateway: simulated evaluate failure");
            return Err(LedgerError::evaluate(transaction, "Simulated query failure"));
        }

        if AssetTransaction::from_name(transaction) != Some(AssetTransaction::Read) {
            return Err(LedgerError::evaluate(
                transaction,
                "only readAsset can be evaluated",
            ));
        }

        self.execute(transaction, args)
            .await
            .map_err(|reason| LedgerError::evaluate(transaction, reason))
    }

    async fn disconnect(&self) {
        self.shared.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.closed.swap(true, Ordering::SeqCst) {
            warn!("Mock gateway: disconnect on a closed connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiscoveryConfig;
    use crate::profile::ConnectionProfile;
    use crate::wallet::Identity;
    use std::time::Duration;

    fn options() -> ConnectOptions {
        ConnectOptions {
            profile: ConnectionProfile::default(),
            identity: Identity::x509("Org1MSP", "CERT", "KEY"),
            discovery: DiscoveryConfig::default(),
            request_timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_contract_semantics() {
        let connector = MockGatewayConnector::new();
        let gateway = connector.connect(options()).await.unwrap();
        let contract = gateway.network("mychannel").contract("basic");

        contract
            .submit_transaction("createAsset", &["a1", "alice", "10"])
            .await
            .unwrap();
        assert!(contract
            .submit_transaction("createAsset", &["a1", "bob", "20"])
            .await
            .is_err());

        contract
            .submit_transaction("updateAsset", &["a1", "15"])
            .await
            .unwrap();
        assert_eq!(connector.asset("a1").await.unwrap().value, "15");

        contract
            .submit_transaction("deleteAsset", &["a1"])
            .await
            .unwrap();
        assert!(contract
            .evaluate_transaction("readAsset", &["a1"])
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_rejects_bad_arguments() {
        let connector = MockGatewayConnector::new();
        let gateway = connector.connect(options()).await.unwrap();
        let contract = gateway.network("mychannel").contract("basic");

        assert!(contract
            .submit_transaction("createAsset", &["a1"])
            .await
            .is_err());
        assert!(contract
            .submit_transaction("transferAsset", &["a1", "bob"])
            .await
            .is_err());
        assert!(contract
            .evaluate_transaction("deleteAsset", &["a1"])
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_every_disconnect_call_is_counted() {
        let connector = MockGatewayConnector::new();
        let gateway = connector.connect(options()).await.unwrap();

        gateway.disconnect().await;
        gateway.disconnect().await;

        assert_eq!(connector.connect_count(), 1);
        assert_eq!(connector.disconnect_count(), 2);
        assert!(gateway
            .network("mychannel")
            .contract("basic")
            .evaluate_transaction("readAsset", &["a1"])
            .await
            .is_err());
    }
}
