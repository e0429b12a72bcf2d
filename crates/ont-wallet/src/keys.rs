//! Private key material and decrypted accounts.
//!
//! A [`RawKey`] is the 32-byte P-256 scalar in the clear. It only exists
//! in memory between unwrapping and signing, and is zeroized on drop.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use ont_core::address::Address;
use ont_core::crypto::{KeyPair, PublicKey};

use crate::error::WalletError;

/// A 32-byte P-256 private scalar.
///
/// Secret material is zeroized on drop to prevent leaking key material
/// in freed memory.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RawKey {
    bytes: [u8; 32],
}

impl RawKey {
    /// Generate a random key from the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            bytes: KeyPair::generate().secret_bytes(),
        }
    }

    /// Create a key from raw bytes. Rejects anything that is not a valid
    /// nonzero scalar below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let kp = KeyPair::from_secret_bytes(bytes).map_err(|_| WalletError::InvalidPrivateKey)?;
        Ok(Self {
            bytes: kp.secret_bytes(),
        })
    }

    pub fn from_hex(s: &str) -> Result<Self, WalletError> {
        let mut bytes = hex::decode(s.trim()).map_err(|_| WalletError::InvalidPrivateKey)?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Get the raw key bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn keypair(&self) -> Result<KeyPair, WalletError> {
        KeyPair::from_secret_bytes(&self.bytes).map_err(|_| WalletError::InvalidPrivateKey)
    }

    pub fn public_key(&self) -> Result<PublicKey, WalletError> {
        Ok(self.keypair()?.public_key())
    }
}

impl Clone for RawKey {
    fn clone(&self) -> Self {
        Self { bytes: self.bytes }
    }
}

impl PartialEq for RawKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for RawKey {}

impl fmt::Debug for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// A decrypted account ready to sign.
#[derive(Clone)]
pub struct Account {
    key: RawKey,
    public_key: PublicKey,
    address: Address,
}

impl Account {
    pub fn new(key: RawKey) -> Result<Self, WalletError> {
        let public_key = key.public_key()?;
        Ok(Self {
            address: public_key.address(),
            public_key,
            key,
        })
    }

    pub fn generate() -> Self {
        let kp = KeyPair::generate();
        let public_key = kp.public_key();
        Self {
            key: RawKey {
                bytes: kp.secret_bytes(),
            },
            address: public_key.address(),
            public_key,
        }
    }

    pub fn raw_key(&self) -> &RawKey {
        &self.key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign `message` with this account's key (`scheme || r || s`).
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, WalletError> {
        Ok(self.key.keypair()?.sign(message))
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
