//! Single-writer asset store
//!
//! The asset sequence is owned by one task. Handlers never touch it
//! directly; they send commands through a cloneable [`StoreHandle`] and
//! await the reply, so every command runs to completion before the next.
//!
//! ```text
//!  axum handlers (many tasks)
//!          │  StoreHandle (Clone)
//!          ▼
//!  mpsc::channel (bounded)
//!          │
//!          ▼
//!  StoreActor (single task) ── owns AssetStore { Vec<Asset> }
//! ```

use crate::error::{RegistryError, Result};
use crate::models::Asset;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

/// Ordered, unindexed asset sequence
///
/// Duplicate ids are allowed; id lookups hit the first match in
/// insertion order.
#[derive(Debug, Default)]
pub struct AssetStore {
    assets: Vec<Asset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append as-is, no id or uniqueness check
    pub fn insert(&mut self, asset: Asset) -> Asset {
        self.assets.push(asset.clone());
        asset
    }

    pub fn get(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.has_id(id))
    }

    pub fn list(&self) -> &[Asset] {
        &self.assets
    }

    /// Shallow-merge `patch` onto the first match and return the result
    pub fn update(&mut self, id: &str, patch: Value) -> Option<Asset> {
        let asset = self.assets.iter_mut().find(|asset| asset.has_id(id))?;
        asset.merge(patch);
        Some(asset.clone())
    }

    /// Remove the first match only
    pub fn remove(&mut self, id: &str) -> Option<Asset> {
        let index = self.assets.iter().position(|asset| asset.has_id(id))?;
        Some(self.assets.remove(index))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Message sent to the store actor
pub enum StoreMessage {
    Insert {
        asset: Asset,
        response: oneshot::Sender<Asset>,
    },

    Get {
        id: String,
        response: oneshot::Sender<Option<Asset>>,
    },

    List {
        response: oneshot::Sender<Vec<Asset>>,
    },

    Update {
        id: String,
        patch: Value,
        response: oneshot::Sender<Option<Asset>>,
    },

    Remove {
        id: String,
        response: oneshot::Sender<Option<Asset>>,
    },

    Len {
        response: oneshot::Sender<usize>,
    },

    Shutdown,
}

/// Actor that owns the asset sequence
pub struct StoreActor {
    store: AssetStore,
    mailbox: mpsc::Receiver<StoreMessage>,
}

impl StoreActor {
    pub fn new(mailbox: mpsc::Receiver<StoreMessage>) -> Self {
        Self {
            store: AssetStore::new(),
            mailbox,
        }
    }

    /// Run until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                StoreMessage::Shutdown => {
                    tracing::info!("Asset store shutting down with {} assets", self.store.len());
                    break;
                }
                msg => self.handle_message(msg),
            }
        }
    }

    fn handle_message(&mut self, msg: StoreMessage) {
        // A dropped receiver means the request was cancelled; nothing to do.
        match msg {
            StoreMessage::Insert { asset, response } => {
                let _ = response.send(self.store.insert(asset));
            }

            StoreMessage::Get { id, response } => {
                let _ = response.send(self.store.get(&id).cloned());
            }

            StoreMessage::List { response } => {
                let _ = response.send(self.store.list().to_vec());
            }

            StoreMessage::Update {
                id,
                patch,
                response,
            } => {
                let _ = response.send(self.store.update(&id, patch));
            }

            StoreMessage::Remove { id, response } => {
                let _ = response.send(self.store.remove(&id));
            }

            StoreMessage::Len { response } => {
                let _ = response.send(self.store.len());
            }

            StoreMessage::Shutdown => {
                // Handled in run loop
            }
        }
    }
}

/// Handle for sending messages to the store actor
#[derive(Clone)]
pub struct StoreHandle {
    sender: mpsc::Sender<StoreMessage>,
}

impl StoreHandle {
    pub fn new(sender: mpsc::Sender<StoreMessage>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> StoreMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| RegistryError::StoreUnavailable("Store mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| RegistryError::StoreUnavailable("Response channel closed".to_string()))
    }

    pub async fn insert(&self, asset: Asset) -> Result<Asset> {
        self.request(|response| StoreMessage::Insert { asset, response })
            .await
    }

    pub async fn get(&self, id: impl Into<String>) -> Result<Option<Asset>> {
        let id = id.into();
        self.request(|response| StoreMessage::Get { id, response })
            .await
    }

    pub async fn list(&self) -> Result<Vec<Asset>> {
        self.request(|response| StoreMessage::List { response })
            .await
    }

    pub async fn update(&self, id: impl Into<String>, patch: Value) -> Result<Option<Asset>> {
        let id = id.into();
        self.request(|response| StoreMessage::Update {
            id,
            patch,
            response,
        })
        .await
    }

    pub async fn remove(&self, id: impl Into<String>) -> Result<Option<Asset>> {
        let id = id.into();
        self.request(|response| StoreMessage::Remove { id, response })
            .await
    }

    pub async fn len(&self) -> Result<usize> {
        self.request(|response| StoreMessage::Len { response })
            .await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(StoreMessage::Shutdown)
            .await
            .map_err(|_| RegistryError::StoreUnavailable("Store mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the store actor
pub fn spawn_asset_store(mailbox_capacity: usize) -> StoreHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity); // Bounded channel for backpressure
    let actor = StoreActor::new(rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    StoreHandle::new(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn asset(value: Value) -> Asset {
        Asset::new(value)
    }

    #[test]
    fn test_first_match_wins() {
        let mut store = AssetStore::new();
        store.insert(asset(json!({"id": "a1", "value": "first"})));
        store.insert(asset(json!({"id": "a1", "value": "second"})));

        assert_eq!(store.get("a1").unwrap().as_value()["value"], "first");

        let updated = store.update("a1", json!({"value": "patched"})).unwrap();
        assert_eq!(updated.as_value()["value"], "patched");
        assert_eq!(store.list()[1].as_value()["value"], "second");

        let removed = store.remove("a1").unwrap();
        assert_eq!(removed.as_value()["value"], "patched");
        assert_eq!(store.get("a1").unwrap().as_value()["value"], "second");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_records_without_id_are_listed_only() {
        let mut store = AssetStore::new();
        store.insert(asset(json!({"value": "orphan"})));

        assert!(store.get("").is_none());
        assert!(store.remove("undefined").is_none());
        assert_eq!(store.list().len(), 1);
    }

    #[tokio::test]
    async fn test_actor_roundtrip() {
        let handle = spawn_asset_store(16);

        handle
            .insert(asset(json!({"id": "a1", "value": "x"})))
            .await
            .unwrap();
        assert_eq!(handle.len().await.unwrap(), 1);
        assert!(handle.get("a1").await.unwrap().is_some());
        assert!(handle.update("missing", json!({})).await.unwrap().is_none());
        assert!(handle.remove("a1").await.unwrap().is_some());
        assert!(handle.list().await.unwrap().is_empty());

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let handle = spawn_asset_store(16);
        handle.shutdown().await.unwrap();

        // Give the actor a chance to exit and drop its mailbox
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let result = handle.list().await;
        assert!(matches!(result, Err(RegistryError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_concurrent_inserts_are_all_kept() {
        let handle = spawn_asset_store(16);

        let mut tasks = Vec::new();
        for i in 0..50 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                handle
                    .insert(asset(json!({"id": format!("a{}", i)})))
                    .await
                    .unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(handle.len().await.unwrap(), 50);
    }
}
