//! Shared fixtures for the integration tests.

use ont_core::address::Address;
use ont_core::crypto::KeyPair;
use ont_core::transaction::UnsignedTransaction;
use ont_wallet::{Account, Asset, RawKey, ScryptParams, TransferBuilder};

/// Private key behind the golden transfer vector.
pub const SAMPLE_SECRET: &str = "523c5fcf74823831756f0bcb3634234f10b3beb1c05595058534577752ad2d9f";

/// Script hash of [`SAMPLE_SECRET`]'s address.
pub const SAMPLE_PAYER_HASH: &str = "4756c9dd829b2142883adbe1ae4f8689a1f673e9";

pub const SAMPLE_RECEIVER: &str = "AKFMnJT1u5pyPhzGRuauD1KkyUvqjQsmGs";

/// Scrypt parameters cheap enough for tight test loops.
pub fn low_cost_scrypt() -> ScryptParams {
    // far below the 16384 default; keys sealed here are not for real use
    ScryptParams {
        n: 16,
        r: 8,
        p: 1,
        dk_len: 64,
    }
}

pub fn sample_account() -> Account {
    let key = RawKey::from_hex(SAMPLE_SECRET).expect("valid sample key");
    Account::new(key).expect("sample key on curve")
}

/// Deterministic keypair from a nonzero seed byte.
pub fn keypair(seed: u8) -> KeyPair {
    assert_ne!(seed, 0, "zero is not a valid scalar");
    KeyPair::from_secret_bytes(&[seed; 32]).expect("seed scalar in range")
}

/// Unsigned 1-unit ONT transfer from the sample account with a fixed nonce.
pub fn sample_transfer(nonce: u32) -> UnsignedTransaction {
    let to = Address::decode(SAMPLE_RECEIVER).expect("valid receiver");
    TransferBuilder::new(Asset::Ont)
        .add_transfer(sample_account().address(), to, 1)
        .set_nonce(nonce)
        .build()
        .expect("transfer builds")
}
