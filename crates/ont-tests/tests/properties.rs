//! Property tests for the address codec, transaction codec, and key
//! protection.

use ont_core::address::Address;
use ont_core::transaction::{
    DecodedTransaction, SigGroup, SignedTransaction, TxAttribute, UnsignedTransaction,
    deserialize, deserialize_signed, deserialize_unsigned, hash_for_signing,
};
use ont_tests::helpers::*;
use ont_wallet::{RawKey, WalletError, unwrap, wrap};
use proptest::prelude::*;

fn arb_attribute() -> impl Strategy<Value = TxAttribute> {
    (any::<u8>(), prop::collection::vec(any::<u8>(), 0..40))
        .prop_map(|(usage, data)| TxAttribute { usage, data })
}

fn arb_unsigned() -> impl Strategy<Value = UnsignedTransaction> {
    (
        any::<u8>(),
        any::<u8>(),
        any::<u32>(),
        any::<u64>(),
        any::<u64>(),
        any::<[u8; 20]>(),
        prop::collection::vec(any::<u8>(), 0..300),
        prop::collection::vec(arb_attribute(), 0..4),
    )
        .prop_map(
            |(version, tx_type, nonce, gas_price, gas_limit, payer, payload, attributes)| {
                UnsignedTransaction {
                    version,
                    tx_type,
                    nonce,
                    gas_price,
                    gas_limit,
                    payer: Address::from_bytes(payer),
                    payload,
                    attributes,
                }
            },
        )
}

/// Signed by one to three deterministic keys, one group each.
fn arb_signed() -> impl Strategy<Value = SignedTransaction> {
    (arb_unsigned(), 1u8..4).prop_map(|(unsigned, signers)| {
        let digest = hash_for_signing(&unsigned.serialize());
        let groups = (1..=signers)
            .map(|seed| {
                let kp = keypair(seed);
                SigGroup::single(&kp.public_key(), kp.sign(&digest))
            })
            .collect();
        SignedTransaction::new(unsigned, groups).unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn base58_roundtrip(bytes in any::<[u8; 20]>()) {
        let addr = Address::from_bytes(bytes);
        let text = addr.encode();
        prop_assert!(text.starts_with('A'));
        prop_assert_eq!(Address::decode(&text).unwrap(), addr);
    }

    #[test]
    fn hex_roundtrip(bytes in any::<[u8; 20]>()) {
        let addr = Address::from_bytes(bytes);
        prop_assert_eq!(Address::from_hex(&addr.to_hex()).unwrap(), addr);
    }

    #[test]
    fn unsigned_roundtrip(tx in arb_unsigned()) {
        let bytes = tx.serialize();
        prop_assert_eq!(deserialize(&bytes).unwrap(), DecodedTransaction::Unsigned(tx.clone()));
        prop_assert_eq!(deserialize_unsigned(&bytes).unwrap(), tx);
    }

    #[test]
    fn signed_roundtrip(tx in arb_signed()) {
        let bytes = tx.serialize();
        prop_assert_eq!(deserialize_signed(&bytes).unwrap(), tx.clone());
        prop_assert_eq!(deserialize(&bytes).unwrap(), DecodedTransaction::Signed(tx));
    }

    #[test]
    fn truncated_unsigned_rejected(tx in arb_unsigned(), cut in 1usize..64) {
        let bytes = tx.serialize();
        let cut = cut.min(bytes.len());
        let short = &bytes[..bytes.len() - cut];
        prop_assert!(deserialize(short).is_err());
        prop_assert!(deserialize_unsigned(short).is_err());
    }

    #[test]
    fn truncated_signed_rejected(tx in arb_signed(), cut in 1usize..400) {
        let bytes = tx.serialize();
        let cut = cut.min(bytes.len());
        prop_assert!(deserialize_signed(&bytes[..bytes.len() - cut]).is_err());
    }

    #[test]
    fn trailing_bytes_rejected(tx in arb_signed(), extra in prop::collection::vec(any::<u8>(), 1..8)) {
        let mut bytes = tx.serialize();
        bytes.extend_from_slice(&extra);
        prop_assert!(deserialize_signed(&bytes).is_err());
    }

    #[test]
    fn decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..200)) {
        let _ = deserialize(&bytes);
        let _ = deserialize_signed(&bytes);
    }
}

proptest! {
    // scrypt dominates; keep the case count low
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn wrap_unwrap_roundtrip(secret in 1u8..=0xfe, password in "[a-zA-Z0-9]{1,24}") {
        let key = RawKey::from_bytes(&[secret; 32]).unwrap();
        let address = key.public_key().unwrap().address();
        let sealed = wrap(&key, &password, &address, &low_cost_scrypt()).unwrap();
        prop_assert_eq!(unwrap(&sealed, &password, &address).unwrap(), key);
    }

    #[test]
    fn wrong_password_fails(secret in 1u8..=0xfe, password in "[a-z]{4,12}") {
        let key = RawKey::from_bytes(&[secret; 32]).unwrap();
        let address = key.public_key().unwrap().address();
        let sealed = wrap(&key, &password, &address, &low_cost_scrypt()).unwrap();
        let wrong = format!("{password}!");
        prop_assert_eq!(unwrap(&sealed, &wrong, &address).unwrap_err(), WalletError::Authentication);
    }
}
