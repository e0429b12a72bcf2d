//! JSON-RPC 2.0 client for an Ontology node.
//!
//! Requests use positional params. Responses carry an integer `error`
//! field next to `result`; anything other than `0` (or a JSON-RPC error
//! object) is reported as [`RpcError::Remote`].

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use ont_core::address::Address;
use ont_core::transaction::SignedTransaction;

use crate::config::RpcConfig;
use crate::error::RpcError;

/// Native token balances of an address, in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Balance {
    #[serde(deserialize_with = "u64_from_str_or_number")]
    pub ont: u64,
    #[serde(deserialize_with = "u64_from_str_or_number")]
    pub ong: u64,
}

pub struct RpcClient {
    client: Client,
    endpoint: String,
}

impl RpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        tracing::debug!(method, endpoint = %self.endpoint, "rpc call");
        let resp: Value = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let result = check_response(resp)?;
        serde_json::from_value(result).map_err(|e| RpcError::Decode(e.to_string()))
    }

    // ── Convenience wrappers ──────────────────────────────────────────────────

    pub async fn get_version(&self) -> Result<String, RpcError> {
        self.call("getversion", json!([])).await
    }

    pub async fn get_block_count(&self) -> Result<u64, RpcError> {
        self.call("getblockcount", json!([])).await
    }

    pub async fn get_current_block_hash(&self) -> Result<String, RpcError> {
        self.call("getbestblockhash", json!([])).await
    }

    pub async fn get_block_hash_by_height(&self, height: u32) -> Result<String, RpcError> {
        self.call("getblockhash", json!([height])).await
    }

    /// Verbose block JSON.
    pub async fn get_block_by_hash(&self, hash: &str) -> Result<Value, RpcError> {
        self.call("getblock", json!([hash, 1])).await
    }

    pub async fn get_block_by_height(&self, height: u32) -> Result<Value, RpcError> {
        self.call("getblock", json!([height, 1])).await
    }

    pub async fn get_balance(&self, address: &Address) -> Result<Balance, RpcError> {
        self.call("getbalance", json!([address.encode()])).await
    }

    /// Raw storage value of `key` under `contract`; `None` if unset.
    pub async fn get_storage(&self, contract: &Address, key: &[u8]) -> Result<Option<Vec<u8>>, RpcError> {
        let value: Option<String> = self
            .call("getstorage", json!([contract.to_hex(), hex::encode(key)]))
            .await?;
        value
            .map(|s| hex::decode(s).map_err(|e| RpcError::Decode(e.to_string())))
            .transpose()
    }

    pub async fn get_smart_contract(&self, contract: &Address) -> Result<Value, RpcError> {
        self.call("getcontractstate", json!([contract.to_hex(), 1])).await
    }

    pub async fn get_smart_contract_event_by_tx_hash(&self, tx_hash: &str) -> Result<Value, RpcError> {
        self.call("getsmartcodeevent", json!([tx_hash])).await
    }

    pub async fn get_smart_contract_event_by_height(&self, height: u32) -> Result<Value, RpcError> {
        self.call("getsmartcodeevent", json!([height])).await
    }

    /// Verbose transaction JSON.
    pub async fn get_raw_transaction(&self, tx_hash: &str) -> Result<Value, RpcError> {
        self.call("getrawtransaction", json!([tx_hash, 1])).await
    }

    pub async fn get_merkle_proof(&self, tx_hash: &str) -> Result<Value, RpcError> {
        self.call("getmerkleproof", json!([tx_hash])).await
    }

    pub async fn get_generate_block_time(&self) -> Result<u64, RpcError> {
        self.call("getgenerateblocktime", json!([])).await
    }

    /// Submit a signed transaction as lowercase hex. With `pre_exec` the
    /// node only simulates it and returns the execution result.
    pub async fn send_raw_transaction(
        &self,
        tx: &SignedTransaction,
        pre_exec: bool,
    ) -> Result<Value, RpcError> {
        let params = if pre_exec {
            json!([tx.to_hex(), 1])
        } else {
            json!([tx.to_hex()])
        };
        tracing::debug!(tx = %tx.tx_hash_hex(), pre_exec, "sending transaction");
        self.call("sendrawtransaction", params).await
    }
}

/// Split a response envelope into its `result`, or the remote error.
pub(crate) fn check_response(mut resp: Value) -> Result<Value, RpcError> {
    match resp.get("error") {
        None | Some(Value::Null) => {}
        Some(Value::Number(n)) if n.as_i64() == Some(0) => {}
        Some(Value::Number(n)) => {
            let desc = resp.get("desc").and_then(Value::as_str).unwrap_or_default();
            let detail = match resp.get("result") {
                Some(Value::String(s)) if !s.is_empty() => format!("{desc}: {s}"),
                _ => desc.to_string(),
            };
            return Err(RpcError::Remote {
                code: n.as_i64().unwrap_or(-1),
                message: detail,
            });
        }
        Some(Value::Object(obj)) => {
            return Err(RpcError::Remote {
                code: obj.get("code").and_then(Value::as_i64).unwrap_or(-1),
                message: obj
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        Some(other) => {
            return Err(RpcError::Remote {
                code: -1,
                message: other.to_string(),
            });
        }
    }
    resp.get_mut("result")
        .map(Value::take)
        .ok_or_else(|| RpcError::Decode("response has no result".into()))
}

fn u64_from_str_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
