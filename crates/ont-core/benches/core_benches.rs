//! Criterion benchmarks for ont-core critical operations.
//!
//! Covers: address encoding, P-256 sign/verify, child key derivation,
//! and transaction serialization.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use ont_core::address::Address;
use ont_core::crypto::KeyPair;
use ont_core::hd::ExtendedPublicKey;
use ont_core::invoke::{State, encode_invoke_payload, transfer_states};
use ont_core::transaction::{self, SigGroup, SignedTransaction, UnsignedTransaction};

const XPUB: &str = "xpub6CbjoChWbA9TdLQKghCH5GzRrvjPxTiz6kYkW3frXyyN6vfbR7wGkYqd9jyEqkpYRe33oe5sQbamndiWQjc9X3mr29HdKWqgjwb6G3xYXFo";

fn sample_transaction(payer: Address) -> UnsignedTransaction {
    let states = [State {
        from: payer,
        to: Address::from_bytes([0x26; 20]),
        amount: 1,
    }];
    let payload =
        encode_invoke_payload(&Address::ONT_CONTRACT, 0, "transfer", &transfer_states(&states))
            .expect("payload");
    UnsignedTransaction::new(500, 20_000, payer, payload).with_nonce(1)
}

fn bench_address(c: &mut Criterion) {
    let keypair = KeyPair::from_secret_bytes(&[42u8; 32]).expect("valid scalar");
    let pubkey = keypair.public_key().to_compressed();
    let text = keypair.address().encode();

    c.bench_function("address_from_public_key", |b| {
        b.iter(|| Address::from_public_key(black_box(&pubkey)))
    });

    c.bench_function("address_decode", |b| {
        b.iter(|| Address::decode(black_box(&text)))
    });
}

fn bench_p256(c: &mut Criterion) {
    let keypair = KeyPair::from_secret_bytes(&[42u8; 32]).expect("valid scalar");
    let digest = sample_transaction(keypair.address()).hash();
    let signature = keypair.sign(&digest);
    let pubkey = keypair.public_key();

    c.bench_function("p256_sign", |b| b.iter(|| keypair.sign(black_box(&digest))));

    c.bench_function("p256_verify", |b| {
        b.iter(|| pubkey.verify(black_box(&digest), black_box(&signature)))
    });
}

fn bench_hd(c: &mut Criterion) {
    let root = ExtendedPublicKey::from_base58(XPUB).expect("valid xpub");

    c.bench_function("hd_derive_child", |b| {
        b.iter(|| root.derive_child(black_box(7)))
    });
}

fn bench_transaction(c: &mut Criterion) {
    let keypair = KeyPair::from_secret_bytes(&[42u8; 32]).expect("valid scalar");
    let tx = sample_transaction(keypair.address());
    let sig = keypair.sign(&tx.hash());
    let signed = SignedTransaction::new(tx.clone(), vec![SigGroup::single(&keypair.public_key(), sig)])
        .expect("valid group");
    let encoded = signed.serialize();

    c.bench_function("transaction_serialization", |b| {
        b.iter(|| black_box(&signed).serialize())
    });

    c.bench_function("transaction_deserialization", |b| {
        b.iter(|| transaction::deserialize(black_box(&encoded)).expect("decode failed"))
    });

    c.bench_function("transaction_hash", |b| b.iter(|| black_box(&tx).hash()));
}

criterion_group!(benches, bench_address, bench_p256, bench_hd, bench_transaction);
criterion_main!(benches);
