//! CLI settings: optional TOML file layered under `ONT_*` environment
//! variables.
//!
//! ```toml
//! wallet = "/home/alice/.ont/wallet.json"
//!
//! [rpc]
//! endpoint = "http://polaris1.ont.io:20336"
//! timeout_secs = 15
//! ```
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `ONT_RPC__ENDPOINT`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ont_rpc::RpcConfig;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rpc: RpcConfig,
    pub wallet: Option<PathBuf>,
}

impl Settings {
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("ONT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Wallet file to use: explicit flag, then settings, then `~/.ont/wallet.json`.
    pub fn wallet_path(&self, flag: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(p) = flag.or_else(|| self.wallet.clone()) {
            return Ok(p);
        }
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".ont").join("wallet.json"))
    }
}
