//! Gateway connector speaking JSON over HTTP to a ledger REST gateway
//!
//! Endpoints, relative to the peer base URL:
//!
//! - `GET  /healthz` liveness probe used while connecting
//! - `POST /channels/{channel}/contracts/{contract}/submit`
//! - `POST /channels/{channel}/contracts/{contract}/evaluate`
//!
//! Transaction requests carry the transaction name, its string arguments
//! and the caller's MSP id and certificate. A 2xx response body is the raw
//! transaction result.

use crate::gateway::{Gateway, GatewayConnector};
use crate::profile::PeerEndpoint;
use crate::types::ConnectOptions;
use crate::{LedgerError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignerIdentity {
    msp_id: String,
    certificate: String,
}

#[derive(Debug, Serialize)]
struct TransactionRequest<'a> {
    transaction: &'a str,
    arguments: &'a [String],
    identity: &'a SignerIdentity,
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Submit,
    Evaluate,
}

impl Mode {
    fn path(&self) -> &'static str {
        match self {
            Mode::Submit => "submit",
            Mode::Evaluate => "evaluate",
        }
    }

    fn error(&self, transaction: &str, reason: impl ToString) -> LedgerError {
        match self {
            Mode::Submit => LedgerError::submit(transaction, reason),
            Mode::Evaluate => LedgerError::evaluate(transaction, reason),
        }
    }
}

/// Connector for ledger REST gateways
#[derive(Debug, Clone, Default)]
pub struct HttpGatewayConnector {
    client: Client,
}

impl HttpGatewayConnector {
    /// Create a connector with its own HTTP client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a connector sharing an existing HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn probe(&self, peer: &PeerEndpoint, timeout: Duration) -> Result<()> {
        let url = format!("{}/healthz", peer.url);
        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| LedgerError::Connection(format!("{}: {}", peer.name, e)))?;

        if !response.status().is_success() {
            return Err(LedgerError::Connection(format!(
                "{}: health check returned {}",
                peer.name,
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl GatewayConnector for HttpGatewayConnector {
    async fn connect(&self, options: ConnectOptions) -> Result<Box<dyn Gateway>> {
        let peers = options.profile.candidate_endpoints(options.discovery)?;
        let mut last_error = None;

        for peer in &peers {
            match self.probe(peer, options.request_timeout).await {
                Ok(()) => {
                    info!("Connected to gateway peer {} at {}", peer.name, peer.url);
                    return Ok(Box::new(HttpGateway {
                        client: self.client.clone(),
                        endpoint: peer.url.clone(),
                        identity: SignerIdentity {
                            msp_id: options.identity.msp_id.clone(),
                            certificate: options.identity.credentials.certificate.clone(),
                        },
                        timeout: options.request_timeout,
                        closed: AtomicBool::new(false),
                    }));
                }
                Err(e) => {
                    warn!("Gateway peer unreachable: {}", e);
                    last_error = Some(e);
                }
            }
        }

        Err(LedgerError::Connection(format!(
            "No reachable peer among {} candidate(s){}",
            peers.len(),
            last_error
                .map(|e| format!(", last error: {}", e))
                .unwrap_or_default()
        )))
    }
}

/// `{endpoint}/channels/{channel}/contracts/{contract}/{submit|evaluate}`,
/// with channel and contract escaped as single path segments
fn transaction_url(endpoint: &str, channel: &str, contract: &str, mode: Mode) -> Result<Url> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| LedgerError::Connection(format!("Invalid endpoint {}: {}", endpoint, e)))?;

    url.path_segments_mut()
        .map_err(|_| LedgerError::Connection(format!("Endpoint {} cannot be a base URL", endpoint)))?
        .pop_if_empty()
        .extend(&["channels", channel, "contracts", contract, mode.path()]);

    Ok(url)
}

/// Connection bound to one REST gateway peer
#[derive(Debug)]
pub struct HttpGateway {
    client: Client,
    endpoint: String,
    identity: SignerIdentity,
    timeout: Duration,
    closed: AtomicBool,
}

impl HttpGateway {
    async fn send(
        &self,
        mode: Mode,
        channel: &str,
        contract: &str,
        transaction: &str,
        args: &[String],
    ) -> Result<Bytes> {
        if self.closed.load(Ordering::Acquire) {
            return Err(LedgerError::Connection(
                "Gateway connection already closed".to_string(),
            ));
        }

        let url = transaction_url(&self.endpoint, channel, contract, mode)?;
        let request = TransactionRequest {
            transaction,
            arguments: args,
            identity: &self.identity,
        };

        debug!("{} {} via {}", mode.path(), transaction, url);

        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| mode.error(transaction, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(mode.error(
                transaction,
                format!("status {}: {}", status, error_text),
            ));
        }

        response.bytes().await.map_err(|e| mode.error(transaction, e))
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn submit(
        &self,
        channel: &str,
        contract: &str,
        transaction: &str,
        args: &[String],
    ) -> Result<Bytes> {
        self.send(Mode::Submit, channel, contract, transaction, args)
            .await
    }

    async fn evaluate(
        &self,
        channel: &str,
        contract: &str,
        transaction: &str,
        args: &[String],
    ) -> Result<Bytes> {
        self.send(Mode::Evaluate, channel, contract, transaction, args)
            .await
    }

    async fn disconnect(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("Disconnected from gateway peer {}", self.endpoint);
        }
    }
}
