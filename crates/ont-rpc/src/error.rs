//! RPC error types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// Connection, timeout, or HTTP-level failure.
    #[error("transport: {0}")]
    Transport(String),

    /// The node answered with a nonzero error code.
    #[error("remote error {code}: {message}")]
    Remote { code: i64, message: String },

    /// Response body did not have the expected shape.
    #[error("decode: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RpcError::Decode(e.to_string())
        } else {
            RpcError::Transport(e.to_string())
        }
    }
}
