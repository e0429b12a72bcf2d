//! # ont-rpc
//! JSON-RPC transport to an Ontology node: chain queries and transaction
//! submission.

pub mod client;
pub mod config;
pub mod error;

pub use client::{Balance, RpcClient};
pub use config::RpcConfig;
pub use error::RpcError;
