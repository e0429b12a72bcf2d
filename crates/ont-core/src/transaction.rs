//! Transaction types and their canonical binary encoding.
//!
//! Layout of the unsigned part (all integers little-endian):
//!
//! ```text
//! version u8 | tx_type u8 | nonce u32 | gas_price u64 | gas_limit u64
//! | payer [20] | payload var-bytes | attr count var-int | attributes
//! ```
//!
//! A signed transaction appends a var-int group count and, per group, the
//! public keys, threshold M and signatures. Signatures commit to
//! `sha256d(unsigned bytes)`, so the payer must be fixed before anyone
//! signs.

use crate::address::Address;
use crate::codec::{BinaryReader, BinaryWriter};
use crate::constants::{
    ADDRESS_LEN, DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE, MAX_MULTISIG_KEYS, TX_TYPE_INVOKE,
    TX_VERSION,
};
use crate::crypto::{PublicKey, sha256d};
use crate::error::{SignatureGroupError, TransactionError};

/// Fixed-width prefix before the payload: version, type, nonce, gas price,
/// gas limit, payer.
const HEADER_LEN: usize = 1 + 1 + 4 + 8 + 8 + ADDRESS_LEN;

/// Opaque typed attribute attached to a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TxAttribute {
    pub usage: u8,
    pub data: Vec<u8>,
}

/// A transaction before any signatures are attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub version: u8,
    pub tx_type: u8,
    pub nonce: u32,
    pub gas_price: u64,
    pub gas_limit: u64,
    /// [`Address::ZERO`] until a payer is chosen.
    pub payer: Address,
    pub payload: Vec<u8>,
    pub attributes: Vec<TxAttribute>,
}

impl UnsignedTransaction {
    /// Invoke transaction with the current Unix time as nonce.
    pub fn new(gas_price: u64, gas_limit: u64, payer: Address, payload: Vec<u8>) -> Self {
        Self {
            version: TX_VERSION,
            tx_type: TX_TYPE_INVOKE,
            nonce: chrono::Utc::now().timestamp() as u32,
            gas_price,
            gas_limit,
            payer,
            payload,
            attributes: Vec::new(),
        }
    }

    /// Invoke transaction with default gas settings and no payer.
    pub fn invoke(payload: Vec<u8>) -> Self {
        Self::new(DEFAULT_GAS_PRICE, DEFAULT_GAS_LIMIT, Address::ZERO, payload)
    }

    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn with_payer(mut self, payer: Address) -> Self {
        self.payer = payer;
        self
    }

    pub fn with_attribute(mut self, attribute: TxAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub(crate) fn write_to(&self, w: &mut BinaryWriter) {
        w.write_u8(self.version);
        w.write_u8(self.tx_type);
        w.write_u32(self.nonce);
        w.write_u64(self.gas_price);
        w.write_u64(self.gas_limit);
        w.write_bytes(self.payer.as_bytes());
        w.write_var_bytes(&self.payload);
        w.write_var_int(self.attributes.len() as u64);
        for attr in &self.attributes {
            w.write_u8(attr.usage);
            w.write_var_bytes(&attr.data);
        }
    }

    pub(crate) fn read_from(r: &mut BinaryReader<'_>) -> Result<Self, TransactionError> {
        let version = r.read_u8()?;
        let tx_type = r.read_u8()?;
        let nonce = r.read_u32()?;
        let gas_price = r.read_u64()?;
        let gas_limit = r.read_u64()?;
        let payer = Address::from_bytes(r.read_array()?);
        let payload = r.read_var_bytes()?;
        // usage byte plus at least a one-byte length
        let count = r.read_count(2)?;
        let mut attributes = Vec::with_capacity(count);
        for _ in 0..count {
            let usage = r.read_u8()?;
            let data = r.read_var_bytes()?;
            attributes.push(TxAttribute { usage, data });
        }
        Ok(Self {
            version,
            tx_type,
            nonce,
            gas_price,
            gas_limit,
            payer,
            payload,
            attributes,
        })
    }

    /// Canonical unsigned encoding: the bytes signatures commit to.
    pub fn serialize(&self) -> Vec<u8> {
        let mut w = BinaryWriter::with_capacity(HEADER_LEN + self.payload.len() + 8);
        self.write_to(&mut w);
        w.into_bytes()
    }

    /// Signing digest, `sha256d(serialize())`.
    pub fn hash(&self) -> [u8; 32] {
        hash_for_signing(&self.serialize())
    }

    /// Transaction id as shown by explorers and RPC lookups: the hash in
    /// reversed byte order.
    pub fn tx_hash_hex(&self) -> String {
        let mut h = self.hash();
        h.reverse();
        hex::encode(h)
    }
}

/// Signing digest of already-serialized unsigned bytes.
pub fn hash_for_signing(unsigned_bytes: &[u8]) -> [u8; 32] {
    sha256d(unsigned_bytes)
}

/// One M-of-N signature group. A single-key signer is the 1-of-1 case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigGroup {
    /// SEC1 compressed public keys.
    pub public_keys: Vec<Vec<u8>>,
    pub m: u16,
    pub sig_data: Vec<Vec<u8>>,
}

impl SigGroup {
    pub fn single(public_key: &PublicKey, signature: Vec<u8>) -> Self {
        Self {
            public_keys: vec![public_key.to_compressed().to_vec()],
            m: 1,
            sig_data: vec![signature],
        }
    }

    pub fn multi(m: u16, public_keys: &[PublicKey], signatures: Vec<Vec<u8>>) -> Self {
        Self {
            public_keys: public_keys.iter().map(|k| k.to_compressed().to_vec()).collect(),
            m,
            sig_data: signatures,
        }
    }

    /// Check `1 <= M <= N` and that there are no more signatures than keys.
    pub fn validate(&self) -> Result<(), SignatureGroupError> {
        let n = self.public_keys.len();
        if n == 0 {
            return Err(SignatureGroupError::NoPublicKeys);
        }
        if self.m == 0 || self.m as usize > n || n > MAX_MULTISIG_KEYS {
            return Err(SignatureGroupError::InvalidThreshold {
                m: self.m as u64,
                n,
            });
        }
        if self.sig_data.len() > n {
            return Err(SignatureGroupError::TooManySignatures {
                sigs: self.sig_data.len(),
                n,
            });
        }
        Ok(())
    }

    fn write_to(&self, w: &mut BinaryWriter) {
        w.write_var_int(self.public_keys.len() as u64);
        for key in &self.public_keys {
            w.write_var_bytes(key);
        }
        w.write_var_int(self.m as u64);
        w.write_var_int(self.sig_data.len() as u64);
        for sig in &self.sig_data {
            w.write_var_bytes(sig);
        }
    }

    fn read_from(r: &mut BinaryReader<'_>) -> Result<Self, TransactionError> {
        let n = r.read_count(1)?;
        let mut public_keys = Vec::with_capacity(n);
        for _ in 0..n {
            public_keys.push(r.read_var_bytes()?);
        }
        let m = r.read_var_int()?;
        if m == 0 || m > n as u64 || m > u16::MAX as u64 {
            return Err(SignatureGroupError::InvalidThreshold { m, n }.into());
        }
        let sig_count = r.read_count(1)?;
        let mut sig_data = Vec::with_capacity(sig_count);
        for _ in 0..sig_count {
            sig_data.push(r.read_var_bytes()?);
        }
        let group = Self {
            public_keys,
            m: m as u16,
            sig_data,
        };
        group.validate()?;
        Ok(group)
    }
}

/// An unsigned transaction plus validated signature groups.
///
/// Fields are read-only; build one with [`SignedTransaction::new`] or by
/// decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    unsigned: UnsignedTransaction,
    sigs: Vec<SigGroup>,
}

impl SignedTransaction {
    /// Validates every group. Groups keep the caller's order.
    pub fn new(
        unsigned: UnsignedTransaction,
        sigs: Vec<SigGroup>,
    ) -> Result<Self, SignatureGroupError> {
        for group in &sigs {
            group.validate()?;
        }
        Ok(Self { unsigned, sigs })
    }

    pub fn unsigned(&self) -> &UnsignedTransaction {
        &self.unsigned
    }

    pub fn sigs(&self) -> &[SigGroup] {
        &self.sigs
    }

    pub fn payer(&self) -> Address {
        self.unsigned.payer
    }

    pub fn into_parts(self) -> (UnsignedTransaction, Vec<SigGroup>) {
        (self.unsigned, self.sigs)
    }

    pub fn hash(&self) -> [u8; 32] {
        self.unsigned.hash()
    }

    pub fn tx_hash_hex(&self) -> String {
        self.unsigned.tx_hash_hex()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut w = BinaryWriter::with_capacity(HEADER_LEN + self.unsigned.payload.len() + 128);
        self.unsigned.write_to(&mut w);
        w.write_var_int(self.sigs.len() as u64);
        for group in &self.sigs {
            group.write_to(&mut w);
        }
        w.into_bytes()
    }

    /// Lowercase hex of [`SignedTransaction::serialize`], the form submitted
    /// to nodes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.serialize())
    }
}

/// Result of [`deserialize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedTransaction {
    Unsigned(UnsignedTransaction),
    Signed(SignedTransaction),
}

impl DecodedTransaction {
    pub fn unsigned(&self) -> &UnsignedTransaction {
        match self {
            DecodedTransaction::Unsigned(tx) => tx,
            DecodedTransaction::Signed(tx) => tx.unsigned(),
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, DecodedTransaction::Signed(_))
    }
}

/// Decode either encoding. Input that ends exactly after the attributes is
/// an unsigned transaction; anything longer must carry a complete
/// signature section and nothing after it.
pub fn deserialize(bytes: &[u8]) -> Result<DecodedTransaction, TransactionError> {
    let mut r = BinaryReader::new(bytes);
    let unsigned = UnsignedTransaction::read_from(&mut r)?;
    if r.is_empty() {
        return Ok(DecodedTransaction::Unsigned(unsigned));
    }
    let sigs = read_sig_section(&mut r)?;
    r.finish()?;
    Ok(DecodedTransaction::Signed(SignedTransaction { unsigned, sigs }))
}

/// Decode the unsigned encoding only.
pub fn deserialize_unsigned(bytes: &[u8]) -> Result<UnsignedTransaction, TransactionError> {
    let mut r = BinaryReader::new(bytes);
    let unsigned = UnsignedTransaction::read_from(&mut r)?;
    r.finish()?;
    Ok(unsigned)
}

/// Decode the signed encoding only. The signature section, even an empty
/// one, must be present.
pub fn deserialize_signed(bytes: &[u8]) -> Result<SignedTransaction, TransactionError> {
    let mut r = BinaryReader::new(bytes);
    let unsigned = UnsignedTransaction::read_from(&mut r)?;
    let sigs = read_sig_section(&mut r)?;
    r.finish()?;
    Ok(SignedTransaction { unsigned, sigs })
}

fn read_sig_section(r: &mut BinaryReader<'_>) -> Result<Vec<SigGroup>, TransactionError> {
    // key count, one key length, M, sig count
    let count = r.read_count(4)?;
    let mut sigs = Vec::with_capacity(count);
    for _ in 0..count {
        sigs.push(SigGroup::read_from(r)?);
    }
    Ok(sigs)
}
