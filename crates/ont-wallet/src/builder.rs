//! Signing, multi-signature assembly and the native token transfer builder.
//!
//! Signing flow:
//! 1. Build an [`UnsignedTransaction`] with the payer already set
//! 2. Each signer calls [`sign`] (safe to run concurrently; the transaction
//!    is only read)
//! 3. [`assemble`] merges the signature groups into a [`SignedTransaction`]

use std::fmt;
use std::str::FromStr;

use ont_core::address::Address;
use ont_core::constants::{DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE};
use ont_core::crypto::PublicKey;
use ont_core::error::SignatureGroupError;
use ont_core::invoke::{State, encode_invoke_payload, transfer_states};
use ont_core::transaction::{SigGroup, SignedTransaction, UnsignedTransaction, hash_for_signing};

use crate::error::WalletError;
use crate::keys::{Account, RawKey};

/// Sign the unsigned encoding of `unsigned`.
///
/// Returns `0x01 || r || s`. Fails with [`WalletError::KeyMismatch`] if
/// `public_key` does not belong to `private_key`.
pub fn sign(
    unsigned: &UnsignedTransaction,
    private_key: &RawKey,
    public_key: &PublicKey,
) -> Result<Vec<u8>, WalletError> {
    let keypair = private_key.keypair()?;
    if keypair.public_key() != *public_key {
        return Err(WalletError::KeyMismatch);
    }
    let digest = hash_for_signing(&unsigned.serialize());
    Ok(keypair.sign(&digest))
}

/// Verify a signature produced by [`sign`].
pub fn verify(
    unsigned: &UnsignedTransaction,
    public_key: &PublicKey,
    signature: &[u8],
) -> Result<(), WalletError> {
    public_key.verify(&unsigned.hash(), signature)?;
    Ok(())
}

/// Combine signature groups into a signed transaction with `payer` set.
///
/// Groups keep the caller's order. The payer is part of the signed digest,
/// so changing it once any group carries signatures fails with
/// [`SignatureGroupError::PayerMismatch`].
pub fn assemble(
    unsigned: UnsignedTransaction,
    payer: Address,
    groups: Vec<SigGroup>,
) -> Result<SignedTransaction, SignatureGroupError> {
    if unsigned.payer != payer && groups.iter().any(|g| !g.sig_data.is_empty()) {
        return Err(SignatureGroupError::PayerMismatch);
    }
    let signed = SignedTransaction::new(unsigned.with_payer(payer), groups)?;
    tracing::debug!(
        tx = %signed.tx_hash_hex(),
        payer = %payer,
        groups = signed.sigs().len(),
        "assembled transaction"
    );
    Ok(signed)
}

/// Native token moved by a [`TransferBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Asset {
    Ont,
    Ong,
}

impl Asset {
    pub fn contract(self) -> Address {
        match self {
            Asset::Ont => Address::ONT_CONTRACT,
            Asset::Ong => Address::ONG_CONTRACT,
        }
    }
}

impl FromStr for Asset {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ont" => Ok(Asset::Ont),
            "ong" => Ok(Asset::Ong),
            other => Err(WalletError::BuildError(format!("unknown asset: {other}"))),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Ont => f.write_str("ont"),
            Asset::Ong => f.write_str("ong"),
        }
    }
}

/// Builder for native ONT/ONG `transfer` transactions.
///
/// # Example
/// ```ignore
/// let signed = TransferBuilder::new(Asset::Ont)
///     .add_transfer(from, to, 10)
///     .sign_single(&account)?;
/// ```
#[derive(Clone, Debug)]
pub struct TransferBuilder {
    asset: Asset,
    states: Vec<State>,
    gas_price: u64,
    gas_limit: u64,
    payer: Option<Address>,
    nonce: Option<u32>,
}

impl TransferBuilder {
    /// Create a builder with default gas settings.
    pub fn new(asset: Asset) -> Self {
        Self {
            asset,
            states: Vec::new(),
            gas_price: DEFAULT_GAS_PRICE,
            gas_limit: DEFAULT_GAS_LIMIT,
            payer: None,
            nonce: None,
        }
    }

    pub fn add_transfer(&mut self, from: Address, to: Address, amount: u64) -> &mut Self {
        self.states.push(State { from, to, amount });
        self
    }

    pub fn set_gas_price(&mut self, gas_price: u64) -> &mut Self {
        self.gas_price = gas_price;
        self
    }

    pub fn set_gas_limit(&mut self, gas_limit: u64) -> &mut Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Override the payer (default: sender of the first transfer).
    pub fn set_payer(&mut self, payer: Address) -> &mut Self {
        self.payer = Some(payer);
        self
    }

    /// Fix the nonce instead of using the current time.
    pub fn set_nonce(&mut self, nonce: u32) -> &mut Self {
        self.nonce = Some(nonce);
        self
    }

    /// Build the unsigned transaction with its payer fixed.
    pub fn build(&self) -> Result<UnsignedTransaction, WalletError> {
        let first = self
            .states
            .first()
            .ok_or_else(|| WalletError::BuildError("no transfers".into()))?;
        if self.states.iter().any(|s| s.amount == 0) {
            return Err(WalletError::InvalidAmount("transfer amount is zero".into()));
        }
        let payer = self.payer.unwrap_or(first.from);
        let payload = encode_invoke_payload(
            &self.asset.contract(),
            0,
            "transfer",
            &transfer_states(&self.states),
        )?;
        let tx = UnsignedTransaction::new(self.gas_price, self.gas_limit, payer, payload);
        Ok(match self.nonce {
            Some(nonce) => tx.with_nonce(nonce),
            None => tx,
        })
    }

    /// Build and sign with a single account that is both sender and payer.
    pub fn sign_single(&self, account: &Account) -> Result<SignedTransaction, WalletError> {
        let unsigned = self.build()?;
        if unsigned.payer != account.address() {
            return Err(WalletError::BuildError(format!(
                "payer {} is not the signing account {}",
                unsigned.payer,
                account.address()
            )));
        }
        let sig = sign(&unsigned, account.raw_key(), account.public_key())?;
        let payer = unsigned.payer;
        let group = SigGroup::single(account.public_key(), sig);
        Ok(assemble(unsigned, payer, vec![group])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ont_core::transaction::deserialize;

    const SAMPLE_SECRET: &str = "523c5fcf74823831756f0bcb3634234f10b3beb1c05595058534577752ad2d9f";
    const RECEIVER: &str = "AKFMnJT1u5pyPhzGRuauD1KkyUvqjQsmGs";
    const GOLDEN_TRANSFER: &str = "00d101000000f401000000000000204e0000000000004756c9dd829b2142883adbe1ae4f8689a1f673e97100c66b144756c9dd829b2142883adbe1ae4f8689a1f673e96a7cc814261b18069e80f351a202cd1d230641dfa450b83b6a7cc8516a7cc86c51c1087472616e736665721400000000000000000000000000000000000000010068164f6e746f6c6f67792e4e61746976652e496e766f6b650000";

    fn sample_account() -> Account {
        Account::new(RawKey::from_hex(SAMPLE_SECRET).unwrap()).unwrap()
    }

    fn sample_unsigned(payer: Address) -> UnsignedTransaction {
        let mut builder = TransferBuilder::new(Asset::Ont);
        builder
            .add_transfer(payer, RECEIVER.parse().unwrap(), 1)
            .set_nonce(1);
        builder.build().unwrap()
    }

    #[test]
    fn golden_transfer_with_no_groups() {
        let account = sample_account();
        let unsigned = sample_unsigned(account.address());
        let signed = assemble(unsigned, account.address(), vec![]).unwrap();
        assert_eq!(signed.to_hex(), GOLDEN_TRANSFER);
    }

    #[test]
    fn sign_and_verify() {
        let account = sample_account();
        let unsigned = sample_unsigned(account.address());
        let sig = sign(&unsigned, account.raw_key(), account.public_key()).unwrap();
        assert_eq!(sig.len(), 65);
        assert_eq!(sig[0], 0x01);
        verify(&unsigned, account.public_key(), &sig).unwrap();
    }

    #[test]
    fn signature_commits_to_payer() {
        let account = sample_account();
        let unsigned = sample_unsigned(account.address());
        let sig = sign(&unsigned, account.raw_key(), account.public_key()).unwrap();
        let moved = unsigned.with_payer(Address::ONG_CONTRACT);
        assert!(verify(&moved, account.public_key(), &sig).is_err());
    }

    #[test]
    fn sign_rejects_mismatched_public_key() {
        let account = sample_account();
        let other = Account::generate();
        let unsigned = sample_unsigned(account.address());
        assert_eq!(
            sign(&unsigned, account.raw_key(), other.public_key()).unwrap_err(),
            WalletError::KeyMismatch
        );
    }

    #[test]
    fn assemble_keeps_group_order() {
        let a = Account::generate();
        let b = Account::generate();
        let unsigned = sample_unsigned(a.address());
        let sig_a = sign(&unsigned, a.raw_key(), a.public_key()).unwrap();
        let sig_b = sign(&unsigned, b.raw_key(), b.public_key()).unwrap();
        let groups = vec![
            SigGroup::single(b.public_key(), sig_b),
            SigGroup::single(a.public_key(), sig_a),
        ];
        let signed = assemble(unsigned, a.address(), groups.clone()).unwrap();
        assert_eq!(signed.sigs(), groups.as_slice());
    }

    #[test]
    fn assemble_multisig_group() {
        let signers: Vec<Account> = (0..3).map(|_| Account::generate()).collect();
        let keys: Vec<PublicKey> = signers.iter().map(|s| *s.public_key()).collect();
        let payer = Address::from_multisig(2, &keys).unwrap();
        let unsigned = sample_unsigned(signers[0].address()).with_payer(payer);
        let sigs = signers[..2]
            .iter()
            .map(|s| sign(&unsigned, s.raw_key(), s.public_key()).unwrap())
            .collect();
        let signed = assemble(unsigned, payer, vec![SigGroup::multi(2, &keys, sigs)]).unwrap();
        assert_eq!(signed.sigs()[0].m, 2);
        assert_eq!(signed.sigs()[0].sig_data.len(), 2);
        assert_eq!(
            deserialize(&signed.serialize()).unwrap(),
            ont_core::DecodedTransaction::Signed(signed)
        );
    }

    #[test]
    fn assemble_rejects_invalid_group() {
        let account = sample_account();
        let unsigned = sample_unsigned(account.address());
        let bad = SigGroup::multi(2, &[*account.public_key()], vec![]);
        assert!(matches!(
            assemble(unsigned, account.address(), vec![bad]),
            Err(SignatureGroupError::InvalidThreshold { m: 2, n: 1 })
        ));
    }

    #[test]
    fn assemble_rejects_payer_change_after_signing() {
        let account = sample_account();
        let unsigned = sample_unsigned(account.address());
        let sig = sign(&unsigned, account.raw_key(), account.public_key()).unwrap();
        let group = SigGroup::single(account.public_key(), sig);
        assert_eq!(
            assemble(unsigned, Address::ONG_CONTRACT, vec![group]).unwrap_err(),
            SignatureGroupError::PayerMismatch
        );
    }

    #[test]
    fn assemble_sets_payer_when_unsigned() {
        let account = sample_account();
        let unsigned = sample_unsigned(account.address()).with_payer(Address::ZERO);
        let signed = assemble(unsigned, account.address(), vec![]).unwrap();
        assert_eq!(signed.payer(), account.address());
    }

    #[test]
    fn sign_single_produces_verifiable_tx() {
        let account = Account::generate();
        let mut builder = TransferBuilder::new(Asset::Ong);
        builder
            .add_transfer(account.address(), RECEIVER.parse().unwrap(), 5)
            .set_gas_price(0)
            .set_gas_limit(30_000);
        let signed = builder.sign_single(&account).unwrap();
        assert_eq!(signed.unsigned().gas_limit, 30_000);
        let group = &signed.sigs()[0];
        verify(signed.unsigned(), account.public_key(), &group.sig_data[0]).unwrap();
    }

    #[test]
    fn sign_single_rejects_foreign_payer() {
        let account = Account::generate();
        let mut builder = TransferBuilder::new(Asset::Ont);
        builder
            .add_transfer(account.address(), RECEIVER.parse().unwrap(), 5)
            .set_payer(Address::ONT_CONTRACT);
        assert!(matches!(
            builder.sign_single(&account),
            Err(WalletError::BuildError(_))
        ));
    }

    #[test]
    fn build_validation() {
        assert!(matches!(
            TransferBuilder::new(Asset::Ont).build(),
            Err(WalletError::BuildError(_))
        ));
        let mut zero = TransferBuilder::new(Asset::Ont);
        zero.add_transfer(Address::ZERO, Address::ZERO, 0);
        assert!(matches!(zero.build(), Err(WalletError::InvalidAmount(_))));
    }

    #[test]
    fn asset_parsing() {
        assert_eq!("ONT".parse::<Asset>().unwrap(), Asset::Ont);
        assert_eq!("ong".parse::<Asset>().unwrap().contract(), Address::ONG_CONTRACT);
        assert!("btc".parse::<Asset>().is_err());
    }
}
