//! Wallet file to signed transaction, across a save/reopen cycle.

use ont_core::address::Address;
use ont_core::transaction::deserialize_signed;
use ont_tests::helpers::*;
use ont_wallet::{Asset, RawKey, TransferBuilder, WalletError, WalletManager, verify};

const PASSWORD: &str = "correct horse";

#[test]
fn create_reopen_and_sign() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wallet.json");

    let address = {
        let mut manager = WalletManager::create(&path).unwrap();
        manager.set_scrypt(low_cost_scrypt()).unwrap();
        let key = RawKey::from_hex(SAMPLE_SECRET).unwrap();
        let address = manager
            .create_account_from_private_key("main", PASSWORD, &key)
            .unwrap()
            .address;
        manager.save().unwrap();
        address
    };

    let manager = WalletManager::open(&path).unwrap();
    assert_eq!(manager.default_account().unwrap().address, address);
    assert_eq!(manager.scrypt(), low_cost_scrypt());

    let account = manager.get_account_by_address(&address, PASSWORD).unwrap();
    let to = Address::decode(SAMPLE_RECEIVER).unwrap();
    let signed = TransferBuilder::new(Asset::Ont)
        .add_transfer(address, to, 1)
        .set_nonce(1)
        .sign_single(&account)
        .unwrap();

    let decoded = deserialize_signed(&signed.serialize()).unwrap();
    assert_eq!(decoded.payer(), address);
    verify(
        decoded.unsigned(),
        account.public_key(),
        &decoded.sigs()[0].sig_data[0],
    )
    .unwrap();
}

#[test]
fn wrong_password_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wallet.json");

    let mut manager = WalletManager::create(&path).unwrap();
    manager.set_scrypt(low_cost_scrypt()).unwrap();
    let address = manager.create_account("", PASSWORD).unwrap().address;
    manager.save().unwrap();

    let reopened = WalletManager::open(&path).unwrap();
    assert_eq!(
        reopened.get_account_by_address(&address, "nope").unwrap_err(),
        WalletError::Authentication
    );
}

#[test]
fn identity_controls_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wallet.json");

    let mut manager = WalletManager::create(&path).unwrap();
    manager.set_scrypt(low_cost_scrypt()).unwrap();
    let ont_id = manager.create_identity("me", PASSWORD).unwrap().ontid.clone();
    let second = manager.add_control(&ont_id, PASSWORD).unwrap();
    manager.save().unwrap();

    let reopened = WalletManager::open(&path).unwrap();
    let identity = reopened.identity(&ont_id).unwrap();
    assert_eq!(identity.controls.len(), 2);

    let by_index = reopened
        .get_control_account_by_index(&ont_id, 1, PASSWORD)
        .unwrap();
    assert_eq!(by_index.address(), second.address());
    let by_address = reopened
        .get_control_account_by_address(&ont_id, &second.address(), PASSWORD)
        .unwrap();
    assert_eq!(by_address.address(), second.address());
}

#[test]
fn unsaved_changes_are_discarded_by_reset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wallet.json");

    let mut manager = WalletManager::create(&path).unwrap();
    manager.set_scrypt(low_cost_scrypt()).unwrap();
    manager.create_account("temp", PASSWORD).unwrap();
    manager.reset();
    assert!(manager.wallet().accounts.is_empty());
}
