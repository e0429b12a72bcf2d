//! # ont-wallet: password-protected keys and transaction signing.
//!
//! Seals private keys under scrypt + AES-256-GCM, keeps them in JSON wallet
//! records, and signs and assembles transactions built by `ont-core`.
//!
//! # Modules
//!
//! - [`error`]: `WalletError` enum
//! - [`keys`]: RawKey (zeroized scalar) and decrypted Account
//! - [`encryption`]: scrypt/AES-256-GCM key wrapping
//! - [`builder`]: signing, multi-signature assembly, transfer builder
//! - [`records`]: wallet file record shapes
//! - [`store`]: JSON wallet file load/save
//! - [`wallet`]: WalletManager

pub mod builder;
pub mod encryption;
pub mod error;
pub mod keys;
pub mod records;
pub mod store;
pub mod wallet;

// Re-exports for convenient access
pub use builder::{Asset, TransferBuilder, assemble, sign, verify};
pub use encryption::{EncryptedKey, ScryptParams, unwrap, wrap};
pub use error::WalletError;
pub use keys::{Account, RawKey};
pub use records::{AccountRecord, ControlRecord, Identity, WalletData};
pub use wallet::WalletManager;
