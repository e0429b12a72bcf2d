//! Transport configuration.
//!
//! [`RpcConfig`] is always passed in explicitly; the library never reads a
//! hardcoded endpoint. The CLI fills it from a config file and `ONT_*`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default JSON-RPC port of an Ontology node.
pub const DEFAULT_RPC_PORT: u16 = 20336;

/// Configuration for an [`RpcClient`](crate::RpcClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Full URL of the node's JSON-RPC endpoint.
    pub endpoint: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: format!("http://127.0.0.1:{DEFAULT_RPC_PORT}"),
            timeout_secs: 10,
        }
    }
}

impl RpcConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
