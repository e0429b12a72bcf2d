//! Password-based private key protection.
//!
//! The key is derived with scrypt and the private scalar is sealed with
//! AES-256-GCM:
//!
//! ```text
//! dk    = scrypt(password, salt, n, r, p, dk_len)
//! key   = dk[dk_len - 32..]
//! nonce = sha256(address_text)[..12]
//! aad   = address_text
//! ciphertext = AES-256-GCM(key, nonce, aad, raw_key) || tag
//! ```
//!
//! Binding the address as AAD means a ciphertext only opens under the
//! address it was created for. Every decryption failure maps to the same
//! [`WalletError::Authentication`].

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use ont_core::address::Address;

use crate::error::WalletError;
use crate::keys::RawKey;

/// Salt length for newly wrapped keys.
pub const SALT_LEN: usize = 16;

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// AES-256 key length; the tail of the scrypt output.
const AES_KEY_LEN: usize = 32;

/// Largest accepted cost factor; 1 GiB of scrypt memory at r=8.
pub const MAX_SCRYPT_N: u64 = 1 << 20;

/// Largest accepted derived-key length.
pub const MAX_DK_LEN: usize = 1024;

/// Scrypt cost parameters, stored in the wallet file as `n, r, p, dkLen`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScryptParams {
    pub n: u64,
    pub r: u32,
    pub p: u32,
    #[serde(alias = "dk_len")]
    pub dk_len: usize,
}

impl Default for ScryptParams {
    fn default() -> Self {
        Self {
            n: 16384,
            r: 8,
            p: 8,
            dk_len: 64,
        }
    }
}

impl ScryptParams {
    pub fn new(n: u64, r: u32, p: u32, dk_len: usize) -> Result<Self, WalletError> {
        let params = Self { n, r, p, dk_len };
        params.validate()?;
        Ok(params)
    }

    /// All positive, `n` a power of two in `2..=MAX_SCRYPT_N`, `dk_len` in
    /// `32..=MAX_DK_LEN`.
    pub fn validate(&self) -> Result<(), WalletError> {
        if self.n <= 1 || !self.n.is_power_of_two() {
            return Err(WalletError::InvalidParams(format!(
                "n must be a power of two greater than 1, got {}",
                self.n
            )));
        }
        if self.n > MAX_SCRYPT_N {
            return Err(WalletError::InvalidParams(format!(
                "n must be at most {MAX_SCRYPT_N}, got {}",
                self.n
            )));
        }
        if self.r == 0 || self.p == 0 {
            return Err(WalletError::InvalidParams(format!(
                "r and p must be positive, got r={} p={}",
                self.r, self.p
            )));
        }
        if !(AES_KEY_LEN..=MAX_DK_LEN).contains(&self.dk_len) {
            return Err(WalletError::InvalidParams(format!(
                "dk_len must be between {AES_KEY_LEN} and {MAX_DK_LEN}, got {}",
                self.dk_len
            )));
        }
        Ok(())
    }

    fn to_scrypt(self) -> Result<scrypt::Params, WalletError> {
        self.validate()?;
        let log_n = self.n.trailing_zeros() as u8;
        scrypt::Params::new(log_n, self.r, self.p, scrypt::Params::RECOMMENDED_LEN)
            .map_err(|e| WalletError::InvalidParams(e.to_string()))
    }
}

/// A private key sealed under a password.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedKey {
    pub salt: Vec<u8>,
    pub params: ScryptParams,
    /// AES-256-GCM ciphertext followed by the 16-byte tag.
    pub ciphertext: Vec<u8>,
}

impl EncryptedKey {
    /// Rebuild from the base64 `key` and `salt` fields of a wallet record.
    pub fn from_base64(key: &str, salt: &str, params: ScryptParams) -> Result<Self, WalletError> {
        let ciphertext = BASE64
            .decode(key)
            .map_err(|e| WalletError::InvalidRecord(format!("key: {e}")))?;
        let salt = BASE64
            .decode(salt)
            .map_err(|e| WalletError::InvalidRecord(format!("salt: {e}")))?;
        Ok(Self {
            salt,
            params,
            ciphertext,
        })
    }

    pub fn key_base64(&self) -> String {
        BASE64.encode(&self.ciphertext)
    }

    pub fn salt_base64(&self) -> String {
        BASE64.encode(&self.salt)
    }
}

/// Seal `raw_key` for `address` under `password` with a fresh random salt.
pub fn wrap(
    raw_key: &RawKey,
    password: &str,
    address: &Address,
    params: &ScryptParams,
) -> Result<EncryptedKey, WalletError> {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    wrap_with_salt(raw_key, password, address, params, &salt)
}

/// Like [`wrap`] with a caller-provided salt.
pub fn wrap_with_salt(
    raw_key: &RawKey,
    password: &str,
    address: &Address,
    params: &ScryptParams,
    salt: &[u8],
) -> Result<EncryptedKey, WalletError> {
    let address_text = address.encode();
    let cipher = derive_cipher(password, salt, params)?;
    let nonce = address_nonce(&address_text);
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: raw_key.as_bytes(),
                aad: address_text.as_bytes(),
            },
        )
        .map_err(|_| WalletError::Authentication)?;

    tracing::debug!(address = %address_text, "wrapped private key");
    Ok(EncryptedKey {
        salt: salt.to_vec(),
        params: *params,
        ciphertext,
    })
}

/// Open a key sealed by [`wrap`]. Wrong password, wrong address and any
/// tampering all fail with [`WalletError::Authentication`].
pub fn unwrap(
    encrypted: &EncryptedKey,
    password: &str,
    address: &Address,
) -> Result<RawKey, WalletError> {
    let address_text = address.encode();
    let cipher = derive_cipher(password, &encrypted.salt, &encrypted.params)?;
    let nonce = address_nonce(&address_text);
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &encrypted.ciphertext,
                    aad: address_text.as_bytes(),
                },
            )
            .map_err(|_| WalletError::Authentication)?,
    );
    if plaintext.len() != 32 {
        return Err(WalletError::Authentication);
    }
    let key = RawKey::from_bytes(&plaintext).map_err(|_| WalletError::Authentication)?;

    tracing::debug!(address = %address_text, "unwrapped private key");
    Ok(key)
}

fn derive_cipher(
    password: &str,
    salt: &[u8],
    params: &ScryptParams,
) -> Result<Aes256Gcm, WalletError> {
    let scrypt_params = params.to_scrypt()?;
    let _span = tracing::debug_span!(
        "scrypt",
        n = params.n,
        r = params.r,
        p = params.p,
        dk_len = params.dk_len
    )
    .entered();

    let mut dk = Zeroizing::new(vec![0u8; params.dk_len]);
    scrypt::scrypt(password.as_bytes(), salt, &scrypt_params, &mut dk)
        .map_err(|e| WalletError::InvalidParams(e.to_string()))?;
    Aes256Gcm::new_from_slice(&dk[params.dk_len - AES_KEY_LEN..])
        .map_err(|_| WalletError::Authentication)
}

fn address_nonce(address_text: &str) -> [u8; NONCE_LEN] {
    let digest = Sha256::digest(address_text.as_bytes());
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&digest[..NONCE_LEN]);
    nonce
}
