//! Hierarchical public-key derivation (BIP32, non-hardened only) on P-256.
//!
//! A child key is `IL·G + parent` where `IL || IR = HMAC-SHA512(chain_code,
//! compressed_parent || index_be32)`; `IR` becomes the child chain code.
//! Hardened indices need the private key and are rejected.
//!
//! Extended keys import and export in the standard 78-byte `xpub`
//! base58check layout.

use p256::elliptic_curve::PrimeField;
use p256::{FieldBytes, ProjectivePoint, Scalar};
use std::fmt;
use std::str::FromStr;

use crate::address::Address;
use crate::constants::{
    CHECKSUM_LEN, COMPRESSED_PUBKEY_LEN, HARDENED_OFFSET, XPUB_PAYLOAD_LEN, XPUB_VERSION,
};
use crate::crypto::{PublicKey, hash160, hmac_sha512, sha256d};
use crate::error::DerivationError;

/// Sequence of child indices; empty means the root itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    pub fn new(indices: Vec<u32>) -> Self {
        Self(indices)
    }

    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// New path with `index` appended.
    pub fn child(&self, index: u32) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }
}

impl From<Vec<u32>> for DerivationPath {
    fn from(indices: Vec<u32>) -> Self {
        Self(indices)
    }
}

/// Accepts `0/1`, `m/0/1`, `m`, and the empty string. A trailing `'`, `h`
/// or `H` marks a hardened component.
impl FromStr for DerivationPath {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let rest = match s {
            "" | "m" | "M" => return Ok(Self::root()),
            _ => s
                .strip_prefix("m/")
                .or_else(|| s.strip_prefix("M/"))
                .unwrap_or(s),
        };

        let mut indices = Vec::new();
        for part in rest.split('/') {
            let (digits, hardened) = match part.strip_suffix(['\'', 'h', 'H']) {
                Some(d) => (d, true),
                None => (part, false),
            };
            let index: u32 = digits
                .parse()
                .map_err(|_| DerivationError::InvalidPath(s.to_string()))?;
            if index >= HARDENED_OFFSET {
                return Err(DerivationError::InvalidPath(s.to_string()));
            }
            indices.push(if hardened { index | HARDENED_OFFSET } else { index });
        }
        Ok(Self(indices))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for &index in &self.0 {
            if index >= HARDENED_OFFSET {
                write!(f, "/{}'", index - HARDENED_OFFSET)?;
            } else {
                write!(f, "/{index}")?;
            }
        }
        Ok(())
    }
}

/// Public key plus the chain code needed to derive its children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedPublicKey {
    public_key: PublicKey,
    chain_code: [u8; 32],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_index: u32,
}

impl ExtendedPublicKey {
    /// Root key at depth 0.
    pub fn new(public_key: PublicKey, chain_code: [u8; 32]) -> Self {
        Self {
            public_key,
            chain_code,
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_index: 0,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    pub fn child_index(&self) -> u32 {
        self.child_index
    }

    /// First four bytes of hash160 of the compressed key.
    pub fn fingerprint(&self) -> [u8; 4] {
        let h = hash160(&self.public_key.to_compressed());
        [h[0], h[1], h[2], h[3]]
    }

    pub fn address(&self) -> Address {
        self.public_key.address()
    }

    pub fn derive_child(&self, index: u32) -> Result<Self, DerivationError> {
        if index >= HARDENED_OFFSET {
            return Err(DerivationError::HardenedIndex(index));
        }
        let depth = self.depth.checked_add(1).ok_or(DerivationError::DepthOverflow)?;

        let mut data = [0u8; COMPRESSED_PUBKEY_LEN + 4];
        data[..COMPRESSED_PUBKEY_LEN].copy_from_slice(&self.public_key.to_compressed());
        data[COMPRESSED_PUBKEY_LEN..].copy_from_slice(&index.to_be_bytes());
        let i = hmac_sha512(&self.chain_code, &data);
        let (il, ir) = i.split_at(32);

        let tweak: Option<Scalar> =
            Scalar::from_repr(FieldBytes::clone_from_slice(il)).into();
        let tweak = tweak.ok_or(DerivationError::InvalidScalar)?;
        let point = ProjectivePoint::GENERATOR * tweak + self.public_key.to_projective();
        let public_key = PublicKey::from_affine(point.to_affine())
            .map_err(|_| DerivationError::InvalidScalar)?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);

        Ok(Self {
            public_key,
            chain_code,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_index: index,
        })
    }

    /// Every key along `path`, root first. The result has `path.len() + 1`
    /// entries.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Vec<Self>, DerivationError> {
        let mut keys = Vec::with_capacity(path.len() + 1);
        keys.push(self.clone());
        let mut current = self.clone();
        for &index in path.indices() {
            current = current.derive_child(index)?;
            keys.push(current.clone());
        }
        Ok(keys)
    }

    /// Last key along `path`.
    pub fn derive_leaf(&self, path: &DerivationPath) -> Result<Self, DerivationError> {
        path.indices()
            .iter()
            .try_fold(self.clone(), |key, &index| key.derive_child(index))
    }

    pub fn to_base58(&self) -> String {
        let mut data = Vec::with_capacity(XPUB_PAYLOAD_LEN + CHECKSUM_LEN);
        data.extend_from_slice(&XPUB_VERSION);
        data.push(self.depth);
        data.extend_from_slice(&self.parent_fingerprint);
        data.extend_from_slice(&self.child_index.to_be_bytes());
        data.extend_from_slice(&self.chain_code);
        data.extend_from_slice(&self.public_key.to_compressed());
        let checksum = sha256d(&data);
        data.extend_from_slice(&checksum[..CHECKSUM_LEN]);
        bs58::encode(data).into_string()
    }

    pub fn from_base58(s: &str) -> Result<Self, DerivationError> {
        let data = bs58::decode(s)
            .into_vec()
            .map_err(|e| DerivationError::InvalidEncoding(e.to_string()))?;
        if data.len() != XPUB_PAYLOAD_LEN + CHECKSUM_LEN {
            return Err(DerivationError::InvalidEncoding(format!(
                "expected {} bytes, got {}",
                XPUB_PAYLOAD_LEN + CHECKSUM_LEN,
                data.len()
            )));
        }
        let (payload, checksum) = data.split_at(XPUB_PAYLOAD_LEN);
        if sha256d(payload)[..CHECKSUM_LEN] != *checksum {
            return Err(DerivationError::InvalidEncoding("checksum mismatch".into()));
        }
        if payload[..4] != XPUB_VERSION {
            return Err(DerivationError::InvalidEncoding(format!(
                "unsupported version {}",
                hex::encode(&payload[..4])
            )));
        }

        let depth = payload[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&payload[5..9]);
        let mut index_bytes = [0u8; 4];
        index_bytes.copy_from_slice(&payload[9..13]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&payload[13..45]);
        let public_key = PublicKey::from_bytes(&payload[45..])
            .map_err(|_| DerivationError::InvalidEncoding("invalid public key".into()))?;

        Ok(Self {
            public_key,
            chain_code,
            depth,
            parent_fingerprint,
            child_index: u32::from_be_bytes(index_bytes),
        })
    }
}

impl fmt::Display for ExtendedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl FromStr for ExtendedPublicKey {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    const XPUB: &str = "xpub6CbjoChWbA9TdLQKghCH5GzRrvjPxTiz6kYkW3frXyyN6vfbR7wGkYqd9jyEqkpYRe33oe5sQbamndiWQjc9X3mr29HdKWqgjwb6G3xYXFo";

    fn root() -> ExtendedPublicKey {
        ExtendedPublicKey::from_base58(XPUB).unwrap()
    }

    #[test]
    fn parses_known_xpub() {
        let key = root();
        assert_eq!(key.depth(), 3);
        assert_eq!(key.parent_fingerprint(), [0x80, 0xf1, 0x72, 0xf1]);
        assert_eq!(key.child_index(), 0x8000_0000);
        assert_eq!(
            hex::encode(key.chain_code()),
            "90967c7c931b4b33a029f8daa13d5de36a1891ed7a4d67ca93b7fd2b1dc4a001"
        );
        assert_eq!(
            key.public_key().to_hex(),
            "03faffcf6343265b1b4a835d3e84c46353fc4f008114e3f37c434f6147206cc397"
        );
        assert_eq!(key.address().encode(), "AW8Tf5R4kyURy6LQ8Th181Z5GpTovWGLg6");
    }

    #[test]
    fn xpub_roundtrip() {
        assert_eq!(root().to_base58(), XPUB);
    }

    #[test]
    fn known_child_addresses() {
        let expected = [
            "ARXRQog4iZazp5YfXRyDZvU6ahrt3c2bb7",
            "APXh8MqcARUgafqvUNnpECzwKDtipkf3Zr",
            "ASpmd1MpFSpQ5rhicjRDqBpE1inP3Z7tus",
        ];
        let key = root();
        for (i, want) in expected.iter().enumerate() {
            let path = DerivationPath::new(vec![0, i as u32]);
            let leaf = key.derive_leaf(&path).unwrap();
            assert_eq!(leaf.address().encode(), *want, "path 0/{i}");
        }
    }

    #[test]
    fn derive_path_is_root_first() {
        let key = root();
        let path: DerivationPath = "0/1".parse().unwrap();
        let keys = key.derive_path(&path).unwrap();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0], key);
        assert_eq!(keys[1], key.derive_child(0).unwrap());
        assert_eq!(keys[2], keys[1].derive_child(1).unwrap());
        assert_eq!(keys[2].depth(), 5);
        assert_eq!(keys[2].parent_fingerprint(), keys[1].fingerprint());
    }

    #[test]
    fn derive_path_is_deterministic() {
        let key = root();
        let path = DerivationPath::new(vec![7, 3, 9]);
        assert_eq!(key.derive_path(&path).unwrap(), key.derive_path(&path).unwrap());
    }

    #[test]
    fn empty_path_returns_root_only() {
        let key = root();
        assert_eq!(key.derive_path(&DerivationPath::root()).unwrap(), vec![key]);
    }

    #[test]
    fn hardened_index_rejected() {
        assert_eq!(
            root().derive_child(HARDENED_OFFSET).unwrap_err(),
            DerivationError::HardenedIndex(HARDENED_OFFSET)
        );
        let path: DerivationPath = "0/1'".parse().unwrap();
        assert!(matches!(
            root().derive_path(&path),
            Err(DerivationError::HardenedIndex(_))
        ));
    }

    #[test]
    fn depth_overflow_rejected() {
        let mut key = ExtendedPublicKey::new(KeyPair::generate().public_key(), [7u8; 32]);
        key.depth = u8::MAX;
        assert_eq!(key.derive_child(0).unwrap_err(), DerivationError::DepthOverflow);
    }

    #[test]
    fn bad_checksum_rejected() {
        let mut data = bs58::decode(XPUB).into_vec().unwrap();
        data[81] ^= 0xff;
        let text = bs58::encode(data).into_string();
        assert!(matches!(
            ExtendedPublicKey::from_base58(&text),
            Err(DerivationError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(ExtendedPublicKey::from_base58("xpub123").is_err());
    }

    #[test]
    fn path_parsing() {
        assert_eq!("m/0/1".parse::<DerivationPath>().unwrap().indices(), &[0, 1]);
        assert_eq!("0/1".parse::<DerivationPath>().unwrap().indices(), &[0, 1]);
        assert!("m".parse::<DerivationPath>().unwrap().is_empty());
        assert!("".parse::<DerivationPath>().unwrap().is_empty());
        assert_eq!(
            "44'/1h".parse::<DerivationPath>().unwrap().indices(),
            &[44 | HARDENED_OFFSET, 1 | HARDENED_OFFSET]
        );
        assert!("0/x".parse::<DerivationPath>().is_err());
        assert!("0//1".parse::<DerivationPath>().is_err());
        assert!("2147483648".parse::<DerivationPath>().is_err());
    }

    #[test]
    fn path_display() {
        let path = DerivationPath::new(vec![0, 5 | HARDENED_OFFSET]);
        assert_eq!(path.to_string(), "m/0/5'");
        assert_eq!(path.to_string().parse::<DerivationPath>().unwrap(), path);
    }
}
