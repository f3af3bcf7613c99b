//! Configuration for the ledger client

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Connection profile (JSON) describing the network
    pub profile_path: PathBuf,

    /// Wallet directory holding `<label>.id` identity files
    pub wallet_path: PathBuf,

    /// Identity label used to connect
    pub identity_name: String,

    /// Channel the contract is deployed on
    pub channel: String,

    /// Contract (chaincode) name
    pub contract: String,

    /// Peer discovery settings
    pub discovery: DiscoveryConfig,

    /// Per-request timeout against the gateway (seconds)
    pub request_timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            profile_path: PathBuf::from("connection-org1.json"),
            wallet_path: PathBuf::from("wallet"),
            identity_name: "admin".to_string(),
            channel: "mychannel".to_string(),
            contract: "basic".to_string(),
            discovery: DiscoveryConfig::default(),
            request_timeout_secs: 30,
        }
    }
}

/// Discovery configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Consider every peer in the profile, not only the client organization's
    pub enabled: bool,

    /// Rewrite discovered peer hosts to `localhost`
    pub as_localhost: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            as_localhost: true,
        }
    }
}

impl LedgerConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LedgerConfig = toml::from_str(&content)
            .map_err(|e| crate::LedgerError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = LedgerConfig::default();

        if let Ok(path) = std::env::var("LEDGER_PROFILE_PATH") {
            config.profile_path = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("LEDGER_WALLET_PATH") {
            config.wallet_path = PathBuf::from(path);
        }

        if let Ok(identity) = std::env::var("LEDGER_IDENTITY") {
            config.identity_name = identity;
        }

        if let Ok(channel) = std::env::var("LEDGER_CHANNEL") {
            config.channel = channel;
        }

        if let Ok(contract) = std::env::var("LEDGER_CONTRACT") {
            config.contract = contract;
        }

        if let Ok(flag) = std::env::var("LEDGER_DISCOVERY") {
            config.discovery.enabled = parse_flag("LEDGER_DISCOVERY", &flag)?;
        }

        if let Ok(flag) = std::env::var("LEDGER_AS_LOCALHOST") {
            config.discovery.as_localhost = parse_flag("LEDGER_AS_LOCALHOST", &flag)?;
        }

        if let Ok(secs) = std::env::var("LEDGER_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = parse_secs("LEDGER_REQUEST_TIMEOUT_SECS", &secs)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings no gateway request could succeed with
    pub fn validate(&self) -> crate::Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(crate::LedgerError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_secs(name: &str, value: &str) -> crate::Result<u64> {
    value.trim().parse().map_err(|e| {
        crate::LedgerError::Config(format!("{} must be a number of seconds: {}", name, e))
    })
}

fn parse_flag(name: &str, value: &str) -> crate::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(crate::LedgerError::Config(format!(
            "{} must be a boolean, got {:?}",
            name, other
        ))),
    }
}
