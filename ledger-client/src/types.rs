//! Core types for the ledger client

use crate::config::DiscoveryConfig;
use crate::profile::ConnectionProfile;
use crate::wallet::Identity;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Asset record as stored in ledger world state
///
/// Contracts disagree on field casing (`ID` vs `assetID`) and on whether
/// the value is a string or a number, so any of these read back. A missing
/// field reads as an empty string. Fields the facade does not know about
/// are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerAsset {
    /// Asset identifier
    #[serde(
        rename = "assetID",
        alias = "ID",
        alias = "id",
        default,
        deserialize_with = "scalar_string"
    )]
    pub asset_id: String,

    /// Current owner
    #[serde(alias = "Owner", default, deserialize_with = "scalar_string")]
    pub owner: String,

    /// Asset value
    #[serde(
        alias = "Value",
        alias = "AppraisedValue",
        default,
        deserialize_with = "scalar_string"
    )]
    pub value: String,

    /// Any other fields returned by the contract
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl LedgerAsset {
    /// Create a new asset record
    pub fn new(
        asset_id: impl Into<String>,
        owner: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            owner: owner.into(),
            value: value.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// Read a JSON scalar as text: strings as-is, numbers and booleans in
/// their JSON form, null as empty
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    })
}

/// Transaction names understood by the asset contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetTransaction {
    /// Create a new asset
    Create,
    /// Read an asset
    Read,
    /// Replace an asset's value
    Update,
    /// Remove an asset
    Delete,
}

impl AssetTransaction {
    /// Name the contract registers the transaction under
    pub fn name(&self) -> &'static str {
        match self {
            AssetTransaction::Create => "createAsset",
            AssetTransaction::Read => "readAsset",
            AssetTransaction::Update => "updateAsset",
            AssetTransaction::Delete => "deleteAsset",
        }
    }

    /// Parse a transaction name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "createAsset" => Some(AssetTransaction::Create),
            "readAsset" => Some(AssetTransaction::Read),
            "updateAsset" => Some(AssetTransaction::Update),
            "deleteAsset" => Some(AssetTransaction::Delete),
            _ => None,
        }
    }
}

impl std::fmt::Display for AssetTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a connector needs to open a gateway connection
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Parsed connection profile
    pub profile: ConnectionProfile,

    /// Identity the connection acts as
    pub identity: Identity,

    /// Peer discovery settings
    pub discovery: DiscoveryConfig,

    /// Per-request timeout
    pub request_timeout: Duration,
}
