//! # ont-core
//! Addresses, P-256 keys, hierarchical public-key derivation, native invoke
//! payloads and the binary transaction codec for Ontology-compatible chains.

pub mod address;
pub mod codec;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod hd;
pub mod invoke;
pub mod program;
pub mod transaction;

pub use address::Address;
pub use crypto::{KeyPair, PublicKey};
pub use error::OntError;
pub use hd::{DerivationPath, ExtendedPublicKey};
pub use invoke::{NativeParam, State};
pub use transaction::{DecodedTransaction, SigGroup, SignedTransaction, UnsignedTransaction};
