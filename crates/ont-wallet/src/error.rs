//! Wallet error types.

use ont_core::error::{AddressError, CryptoError, EncodingError, SignatureGroupError};
use thiserror::Error;

/// Errors that can occur in wallet operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Wrong password, wrong address, or tampered ciphertext. Carries no
    /// detail so callers cannot tell which.
    #[error("authentication failed")]
    Authentication,

    /// Scrypt cost parameters out of range.
    #[error("invalid scrypt parameters: {0}")]
    InvalidParams(String),

    /// Public key passed for signing does not belong to the private key.
    #[error("public key does not match private key")]
    KeyMismatch,

    /// Raw private key bytes are not a valid P-256 scalar.
    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("account already exists: {0}")]
    DuplicateAccount(String),

    #[error("identity already exists: {0}")]
    DuplicateIdentity(String),

    #[error("control already exists: {0}")]
    DuplicateControl(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    #[error("control not found: {0}")]
    ControlNotFound(String),

    /// ONT ID without the `did:ont:` prefix.
    #[error("invalid ONT ID: {0}")]
    InvalidOntId(String),

    #[error("no default account")]
    NoDefaultAccount,

    #[error("no default identity")]
    NoDefaultIdentity,

    /// Invalid monetary amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Transaction build error.
    #[error("build error: {0}")]
    BuildError(String),

    /// Record field that cannot be decoded (bad base64, bad hex).
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("wallet file not found: {0}")]
    FileNotFound(String),

    #[error("wallet file already exists: {0}")]
    FileExists(String),

    /// Manager has no file path to save to.
    #[error("no wallet path set")]
    NoPath,

    /// Wallet file is not valid JSON of the expected shape.
    #[error("corrupted file: {0}")]
    CorruptedFile(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Serialization error.
    #[error("serialization: {0}")]
    Serialization(String),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    SignatureGroup(#[from] SignatureGroupError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_authentication() {
        assert_eq!(WalletError::Authentication.to_string(), "authentication failed");
    }

    #[test]
    fn display_invalid_params() {
        let e = WalletError::InvalidParams("n must be a power of two".into());
        assert_eq!(e.to_string(), "invalid scrypt parameters: n must be a power of two");
    }

    #[test]
    fn clone_and_eq() {
        let e1 = WalletError::DuplicateAccount("AXYZ".into());
        let e2 = e1.clone();
        assert_eq!(e1, e2);
    }

    #[test]
    fn from_crypto_error() {
        let wallet: WalletError = CryptoError::InvalidPublicKey.into();
        assert_eq!(wallet, WalletError::Crypto(CryptoError::InvalidPublicKey));
    }

    #[test]
    fn from_signature_group_error() {
        let wallet: WalletError = SignatureGroupError::PayerMismatch.into();
        assert_eq!(
            wallet,
            WalletError::SignatureGroup(SignatureGroupError::PayerMismatch)
        );
    }
}
