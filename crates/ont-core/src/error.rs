//! Error types for the Ontology core.
use thiserror::Error;

/// Malformed address text, bad checksum, or a script hash of the wrong size.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58 text: {0}")] InvalidBase58(String),
    #[error("invalid length: expected {expected}, got {got}")] InvalidLength { expected: usize, got: usize },
    #[error("invalid version byte: {0:#04x}")] InvalidVersion(u8),
    #[error("invalid checksum")] InvalidChecksum,
    #[error("invalid hex: {0}")] InvalidHex(String),
    #[error("invalid multisig threshold: m={m}, n={n}")] InvalidThreshold { m: usize, n: usize },
    #[error("invalid public key in multisig set")] InvalidPublicKey,
}

/// Failure while building a native invoke payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("method name is empty")] EmptyMethod,
    #[error("unsupported argument type: {0}")] UnsupportedType(String),
    #[error("integer out of range: {0}")] IntegerOutOfRange(String),
    #[error("invalid argument value: {0}")] InvalidValue(String),
    #[error("argument nesting deeper than {0}")] NestingTooDeep(usize),
}

/// Truncated or otherwise invalid binary transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("unexpected end of input: needed {needed}, remaining {remaining}")] UnexpectedEof { needed: usize, remaining: usize },
    #[error("non-canonical var-int encoding")] NonCanonicalVarInt,
    #[error("length {0} exceeds remaining input")] LengthTooLarge(u64),
    #[error("{0} trailing bytes after transaction")] TrailingBytes(usize),
    #[error("invalid signature group: {0}")] InvalidSigGroup(#[from] SignatureGroupError),
}

/// Failure during hierarchical public-key derivation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    #[error("hardened index {0:#010x} needs a private key")] HardenedIndex(u32),
    #[error("derived scalar is out of range")] InvalidScalar,
    #[error("derivation depth overflow")] DepthOverflow,
    #[error("invalid extended key encoding: {0}")] InvalidEncoding(String),
    #[error("invalid derivation path: {0}")] InvalidPath(String),
}

/// Violated M-of-N signature group invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureGroupError {
    #[error("signature group has no public keys")] NoPublicKeys,
    #[error("invalid threshold: m={m}, n={n}")] InvalidThreshold { m: u64, n: usize },
    #[error("too many signatures: {sigs} > {n}")] TooManySignatures { sigs: usize, n: usize },
    #[error("payer differs from the one the signatures commit to")] PayerMismatch,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid private key bytes")] InvalidPrivateKey,
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid signature bytes")] InvalidSignature,
    #[error("unsupported signature scheme: {0:#04x}")] UnsupportedScheme(u8),
    #[error("signature verification failed")] VerificationFailed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OntError {
    #[error(transparent)] Address(#[from] AddressError),
    #[error(transparent)] Encoding(#[from] EncodingError),
    #[error(transparent)] Transaction(#[from] TransactionError),
    #[error(transparent)] Derivation(#[from] DerivationError),
    #[error(transparent)] SignatureGroup(#[from] SignatureGroupError),
    #[error(transparent)] Crypto(#[from] CryptoError),
}
