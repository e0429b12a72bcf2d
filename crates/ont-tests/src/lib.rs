//! Cross-crate test suite for the Ontology toolkit.
//!
//! Golden vectors pin the wire formats against values produced by the
//! reference SDKs. Property tests cover codec and key-protection invariants
//! under random inputs.

pub mod helpers;
