//! NIST P-256 keys, ECDSA signatures, and the hash functions addresses and
//! transactions are built from.
//!
//! Uses the RustCrypto `p256` crate for curve arithmetic and ECDSA, `sha2`,
//! `ripemd` and `hmac` for hashing.
//!
//! # Signature encoding
//!
//! Signatures travel as `scheme (1 byte) || r (32 bytes) || s (32 bytes)`.
//! The only supported scheme is [`SignatureScheme::Sha256WithEcdsa`]: the
//! signed message is hashed once more with SHA-256 by the ECDSA signer.

use hmac::{Hmac, Mac};
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::{AffinePoint, ProjectivePoint};
use ripemd::Ripemd160;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256, Sha512};
use std::cmp::Ordering;
use std::fmt;

use crate::address::Address;
use crate::constants::COMPRESSED_PUBKEY_LEN;
use crate::error::CryptoError;

type HmacSha512 = Hmac<Sha512>;

/// Length of an encoded signature: scheme byte plus `r || s`.
pub const SIGNATURE_LEN: usize = 65;

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 applied twice. Used for checksums and transaction hashes.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// RIPEMD-160(SHA-256(data)).
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(sha256(data)).into()
}

/// HMAC-SHA512 keyed by `key`.
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac =
        <HmacSha512 as Mac>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// Signature scheme identifier carried in the first signature byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    Sha256WithEcdsa,
}

impl SignatureScheme {
    pub fn to_byte(self) -> u8 {
        match self {
            SignatureScheme::Sha256WithEcdsa => 0x01,
        }
    }

    pub fn from_byte(b: u8) -> Result<Self, CryptoError> {
        match b {
            0x01 => Ok(SignatureScheme::Sha256WithEcdsa),
            other => Err(CryptoError::UnsupportedScheme(other)),
        }
    }

    /// Name used in wallet records.
    pub fn name(self) -> &'static str {
        match self {
            SignatureScheme::Sha256WithEcdsa => "SHA256withECDSA",
        }
    }
}

/// P-256 keypair for signing transactions.
///
/// The underlying [`SigningKey`] zeroizes its scalar on drop.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a random keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Create a keypair from a 32-byte big-endian scalar.
    ///
    /// Rejects zero and values at or above the curve order.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidPrivateKey);
        }
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Raw scalar bytes. Handle with care.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: *self.signing_key.verifying_key(),
        }
    }

    /// Address of the single-key program for this keypair.
    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Sign `message`, returning `scheme || r || s`.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let sig: Signature = self.signing_key.sign(message);
        let mut out = Vec::with_capacity(SIGNATURE_LEN);
        out.push(SignatureScheme::Sha256WithEcdsa.to_byte());
        out.extend_from_slice(&sig.to_bytes());
        out
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// P-256 public key.
///
/// Serialized in compressed SEC1 form everywhere on the wire and in wallet
/// records.
#[derive(Clone, Copy)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Parse a compressed (33-byte) or uncompressed (65-byte) SEC1 key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { verifying_key })
    }

    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidPublicKey)?;
        Self::from_bytes(&bytes)
    }

    pub fn to_compressed(&self) -> [u8; COMPRESSED_PUBKEY_LEN] {
        let point = self.verifying_key.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_PUBKEY_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    pub fn to_uncompressed(&self) -> [u8; 65] {
        let point = self.verifying_key.to_encoded_point(false);
        let mut out = [0u8; 65];
        out.copy_from_slice(point.as_bytes());
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(&self.to_compressed())
    }

    /// Verify a `scheme || r || s` signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        if signature.len() != SIGNATURE_LEN {
            return Err(CryptoError::InvalidSignature);
        }
        SignatureScheme::from_byte(signature[0])?;
        let sig =
            Signature::from_slice(&signature[1..]).map_err(|_| CryptoError::InvalidSignature)?;
        self.verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }

    pub(crate) fn to_projective(self) -> ProjectivePoint {
        ProjectivePoint::from(*self.verifying_key.as_affine())
    }

    /// Fails on the identity point.
    pub(crate) fn from_affine(point: AffinePoint) -> Result<Self, CryptoError> {
        let verifying_key =
            VerifyingKey::from_affine(point).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { verifying_key })
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_compressed() == other.to_compressed()
    }
}

impl Eq for PublicKey {}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_compressed().hash(state);
    }
}

/// Orders by affine X, then Y. This is the order multisig programs list
/// their keys in.
impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_uncompressed().cmp(&other.to_uncompressed())
    }
}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
