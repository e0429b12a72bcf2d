//! Address encoding for Ontology accounts and contracts.
//!
//! An address is the 20-byte RIPEMD-160(SHA-256(program)) of a verification
//! program. Account addresses hash `PUSH(pubkey) CHECKSIG`; multisig
//! addresses hash an M-of-N `CHECKMULTISIG` program; contract addresses hash
//! the contract's VM code.
//!
//! Text form is base58check: `0x17 || hash || sha256d(0x17 || hash)[..4]`,
//! 25 bytes decoded. The `0x17` version byte makes every address start
//! with `A`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::{ADDRESS_LEN, ADDRESS_VERSION, CHECKSUM_LEN, DECODED_ADDRESS_LEN};
use crate::crypto::{PublicKey, hash160, sha256d};
use crate::error::AddressError;
use crate::program::{ProgramBuilder, opcode, program_from_multi_pubkeys};

/// A 20-byte script hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// All-zero address. Marks an unset payer.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Native ONT token contract.
    pub const ONT_CONTRACT: Address = native_contract(0x01);

    /// Native ONG token contract.
    pub const ONG_CONTRACT: Address = native_contract(0x02);

    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Accepts exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let arr: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| AddressError::InvalidLength {
            expected: ADDRESS_LEN,
            got: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Address of the single-key program for a SEC1-encoded public key.
    pub fn from_public_key(public_key: &[u8]) -> Self {
        let mut b = ProgramBuilder::new();
        b.push_bytes(public_key).emit(opcode::CHECKSIG);
        Self::from_vm_code(&b.into_bytes())
    }

    /// Contract address: hash160 of the deployed code.
    pub fn from_vm_code(code: &[u8]) -> Self {
        Self(hash160(code))
    }

    /// Address of an M-of-N multisig program. Key order does not matter.
    pub fn from_multisig(m: usize, public_keys: &[PublicKey]) -> Result<Self, AddressError> {
        let program = program_from_multi_pubkeys(m, public_keys)?;
        Ok(Self::from_vm_code(&program))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; ADDRESS_LEN] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Base58check text form.
    pub fn encode(&self) -> String {
        let mut data = Vec::with_capacity(DECODED_ADDRESS_LEN);
        data.push(ADDRESS_VERSION);
        data.extend_from_slice(&self.0);
        let checksum = sha256d(&data);
        data.extend_from_slice(&checksum[..CHECKSUM_LEN]);
        bs58::encode(data).into_string()
    }

    /// Parse base58check text.
    pub fn decode(s: &str) -> Result<Self, AddressError> {
        let data = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;
        if data.len() != DECODED_ADDRESS_LEN {
            return Err(AddressError::InvalidLength {
                expected: DECODED_ADDRESS_LEN,
                got: data.len(),
            });
        }
        if data[0] != ADDRESS_VERSION {
            return Err(AddressError::InvalidVersion(data[0]));
        }
        let (body, checksum) = data.split_at(1 + ADDRESS_LEN);
        if sha256d(body)[..CHECKSUM_LEN] != *checksum {
            return Err(AddressError::InvalidChecksum);
        }
        Self::from_slice(&body[1..])
    }

    /// Hex in the chain's display order (bytes reversed), as used for
    /// contract addresses.
    pub fn to_hex(&self) -> String {
        let mut bytes = self.0;
        bytes.reverse();
        hex::encode(bytes)
    }

    /// Inverse of [`Address::to_hex`].
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let mut bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        bytes.reverse();
        Self::from_slice(&bytes)
    }
}

const fn native_contract(last: u8) -> Address {
    let mut bytes = [0u8; ADDRESS_LEN];
    bytes[ADDRESS_LEN - 1] = last;
    Address(bytes)
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}
