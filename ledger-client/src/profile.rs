//! Connection profile loading and peer endpoint resolution
//!
//! The profile follows the common connection profile layout:
//!
//! ```json
//! {
//!   "name": "test-network-org1",
//!   "client": { "organization": "Org1" },
//!   "organizations": { "Org1": { "mspid": "Org1MSP", "peers": ["peer0.org1.example.com"] } },
//!   "peers": { "peer0.org1.example.com": { "url": "grpcs://peer0.org1.example.com:7051" } }
//! }
//! ```

use crate::config::DiscoveryConfig;
use crate::{LedgerError, Result};
use reqwest::Url;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Parsed connection profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionProfile {
    /// Network name
    #[serde(default)]
    pub name: String,

    /// Profile format version
    #[serde(default)]
    pub version: Option<String>,

    /// Client section
    #[serde(default)]
    pub client: ClientSection,

    /// Organizations by name
    #[serde(default)]
    pub organizations: BTreeMap<String, Organization>,

    /// Peers by name
    #[serde(default)]
    pub peers: BTreeMap<String, PeerConfig>,
}

/// Client section of the profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientSection {
    /// Organization the client belongs to
    #[serde(default)]
    pub organization: Option<String>,
}

/// Organization entry
#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    /// Membership service provider id
    pub mspid: String,

    /// Peers owned by the organization
    #[serde(default)]
    pub peers: Vec<String>,
}

/// Peer entry
#[derive(Debug, Clone, Deserialize)]
pub struct PeerConfig {
    /// Peer address (`grpc://`, `grpcs://`, `http://` or `https://`)
    pub url: String,

    /// TLS CA certificate
    #[serde(rename = "tlsCACerts", default)]
    pub tls_ca_certs: Option<TlsCaCerts>,
}

/// TLS CA certificate, inline or on disk
#[derive(Debug, Clone, Deserialize)]
pub struct TlsCaCerts {
    /// Inline PEM
    #[serde(default)]
    pub pem: Option<String>,

    /// Path to a PEM file
    #[serde(default)]
    pub path: Option<String>,
}

/// Resolved peer endpoint the gateway can dial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerEndpoint {
    /// Peer name from the profile
    pub name: String,

    /// Base URL, without a trailing slash
    pub url: String,
}

impl ConnectionProfile {
    /// Load a profile from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::Profile(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse a profile from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| LedgerError::Profile(format!("Invalid connection profile: {}", e)))
    }

    /// Organization named by `client.organization`
    pub fn client_organization(&self) -> Option<&Organization> {
        self.client
            .organization
            .as_ref()
            .and_then(|name| self.organizations.get(name))
    }

    /// Peers to try when connecting, in dial order
    ///
    /// The client organization's peers come first. With discovery enabled
    /// every other peer in the profile follows, sorted by name.
    pub fn candidate_endpoints(&self, discovery: DiscoveryConfig) -> Result<Vec<PeerEndpoint>> {
        let mut names: Vec<&str> = Vec::new();

        match self.client_organization() {
            Some(org) => {
                for peer in &org.peers {
                    if self.peers.contains_key(peer) {
                        names.push(peer);
                    } else {
                        warn!("Organization peer {} has no entry in the profile", peer);
                    }
                }
            }
            None if !discovery.enabled => {
                return Err(LedgerError::Profile(
                    "client.organization must name a profile organization when discovery is disabled"
                        .to_string(),
                ));
            }
            None => {}
        }

        if discovery.enabled {
            for peer in self.peers.keys() {
                if !names.contains(&peer.as_str()) {
                    names.push(peer);
                }
            }
        }

        if names.is_empty() {
            return Err(LedgerError::Profile(format!(
                "Profile {:?} lists no reachable peers",
                self.name
            )));
        }

        names
            .into_iter()
            .map(|name| {
                let url = endpoint_url(&self.peers[name].url, discovery.as_localhost)?;
                debug!("Candidate peer {} at {}", name, url);
                Ok(PeerEndpoint {
                    name: name.to_string(),
                    url,
                })
            })
            .collect()
    }
}

/// Map a profile peer URL onto the HTTP base URL of its gateway
pub fn endpoint_url(raw: &str, as_localhost: bool) -> Result<String> {
    let (scheme, rest) = raw
        .split_once("://")
        .ok_or_else(|| LedgerError::Profile(format!("Peer url {:?} has no scheme", raw)))?;

    let scheme = match scheme {
        "grpc" | "http" => "http",
        "grpcs" | "https" => "https",
        other => {
            return Err(LedgerError::Profile(format!(
                "Unsupported peer url scheme {:?}",
                other
            )))
        }
    };

    let mut url = Url::parse(&format!("{}://{}", scheme, rest))
        .map_err(|e| LedgerError::Profile(format!("Invalid peer url {:?}: {}", raw, e)))?;

    if as_localhost {
        url.set_host(Some("localhost"))
            .map_err(|e| LedgerError::Profile(format!("Invalid peer url {:?}: {}", raw, e)))?;
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}
