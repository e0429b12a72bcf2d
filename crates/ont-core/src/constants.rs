//! Protocol constants for Ontology transactions and addresses.

/// Version byte prepended to the script hash before base58check encoding.
/// Makes every mainnet address start with `A`.
pub const ADDRESS_VERSION: u8 = 0x17;

/// Script hash length in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Length of the base58check checksum suffix.
pub const CHECKSUM_LEN: usize = 4;

/// Decoded address length: version + hash + checksum.
pub const DECODED_ADDRESS_LEN: usize = 1 + ADDRESS_LEN + CHECKSUM_LEN;

/// Syscall name the VM dispatches native contract calls through.
pub const NATIVE_INVOKE_NAME: &str = "Ontology.Native.Invoke";

/// Transaction type for contract deployment.
pub const TX_TYPE_DEPLOY: u8 = 0xd0;

/// Transaction type for contract invocation.
pub const TX_TYPE_INVOKE: u8 = 0xd1;

/// Current transaction format version.
pub const TX_VERSION: u8 = 0;

/// Gas price used by the reference transfer builder.
pub const DEFAULT_GAS_PRICE: u64 = 500;

/// Gas limit used by the reference transfer builder.
pub const DEFAULT_GAS_LIMIT: u64 = 20_000;

/// Upper bound on keys in one multisig program.
pub const MAX_MULTISIG_KEYS: usize = 1024;

/// Maximum nesting of Struct/Array invoke arguments.
pub const MAX_PARAM_DEPTH: usize = 16;

/// BIP32 version prefix for mainnet extended public keys (`xpub`).
pub const XPUB_VERSION: [u8; 4] = [0x04, 0x88, 0xb2, 0x1e];

/// Serialized extended public key length (without checksum).
pub const XPUB_PAYLOAD_LEN: usize = 78;

/// Child indices at or above this value are hardened.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Compressed SEC1 public key length.
pub const COMPRESSED_PUBKEY_LEN: usize = 33;
