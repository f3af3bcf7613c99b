//! Gateway abstraction over the ledger network
//!
//! A [`GatewayConnector`] opens a [`Gateway`] connection; the connection
//! hands out [`Network`] and [`Contract`] views used to submit or evaluate
//! transactions. Connections are single use: the caller disconnects once
//! the transaction is done.

use crate::types::ConnectOptions;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Opens gateway connections
#[async_trait]
pub trait GatewayConnector: Send + Sync {
    /// Connect using the given identity, profile and discovery settings
    async fn connect(&self, options: ConnectOptions) -> Result<Box<dyn Gateway>>;
}

/// Open connection to a ledger peer
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Address of the peer the connection is bound to
    fn endpoint(&self) -> &str;

    /// Submit a state-changing transaction and wait for commit
    async fn submit(
        &self,
        channel: &str,
        contract: &str,
        transaction: &str,
        args: &[String],
    ) -> Result<Bytes>;

    /// Evaluate a read-only transaction
    async fn evaluate(
        &self,
        channel: &str,
        contract: &str,
        transaction: &str,
        args: &[String],
    ) -> Result<Bytes>;

    /// Release the connection
    async fn disconnect(&self);
}

impl dyn Gateway {
    /// View of the named channel
    pub fn network(&self, channel: impl Into<String>) -> Network<'_> {
        Network {
            gateway: self,
            channel: channel.into(),
        }
    }
}

/// A channel reached through a gateway
pub struct Network<'a> {
    gateway: &'a dyn Gateway,
    channel: String,
}

impl<'a> Network<'a> {
    /// Channel name
    pub fn name(&self) -> &str {
        &self.channel
    }

    /// View of a contract deployed on this channel
    pub fn contract(&self, name: impl Into<String>) -> Contract<'a> {
        Contract {
            gateway: self.gateway,
            channel: self.channel.clone(),
            name: name.into(),
        }
    }
}

/// A contract on a channel
pub struct Contract<'a> {
    gateway: &'a dyn Gateway,
    channel: String,
    name: String,
}

impl Contract<'_> {
    /// Contract name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Submit a transaction that changes ledger state
    pub async fn submit_transaction(&self, transaction: &str, args: &[&str]) -> Result<Bytes> {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        self.gateway
            .submit(&self.channel, &self.name, transaction, &args)
            .await
    }

    /// Evaluate a read-only transaction
    pub async fn evaluate_transaction(&self, transaction: &str, args: &[&str]) -> Result<Bytes> {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        self.gateway
            .evaluate(&self.channel, &self.name, transaction, &args)
            .await
    }
}
