//! Wallet file record shapes.
//!
//! Field names follow the Ontology wallet file format (camelCase, plus the
//! hyphenated `enc-alg`). Records are plain data; changes that must keep
//! the file consistent go through the named methods on [`WalletData`] and
//! [`Identity`].

use serde::{Deserialize, Serialize};

use ont_core::address::Address;
use ont_core::crypto::SignatureScheme;

use crate::encryption::{EncryptedKey, ScryptParams};
use crate::error::WalletError;

/// Prefix of every ONT ID.
pub const DID_ONT: &str = "did:ont:";

/// Wallet file format version.
pub const WALLET_VERSION: &str = "1.0";

pub const ENC_ALG: &str = "aes-256-gcm";
pub const KEY_ALGORITHM: &str = "ECDSA";
pub const CURVE: &str = "P-256";

/// Curve parameters attached to each key record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyParameters {
    pub curve: String,
}

impl Default for KeyParameters {
    fn default() -> Self {
        Self {
            curve: CURVE.to_string(),
        }
    }
}

/// Top-level wallet file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletData {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub create_time: String,
    #[serde(default)]
    pub default_ontid: String,
    #[serde(default)]
    pub default_account_address: String,
    #[serde(default)]
    pub scrypt: ScryptParams,
    #[serde(default)]
    pub identities: Vec<Identity>,
    #[serde(default)]
    pub accounts: Vec<AccountRecord>,
}

impl Default for WalletData {
    fn default() -> Self {
        Self {
            name: "MyWallet".to_string(),
            version: WALLET_VERSION.to_string(),
            create_time: String::new(),
            default_ontid: String::new(),
            default_account_address: String::new(),
            scrypt: ScryptParams::default(),
            identities: Vec::new(),
            accounts: Vec::new(),
        }
    }
}

impl WalletData {
    pub fn account(&self, address: &Address) -> Option<&AccountRecord> {
        self.accounts.iter().find(|a| a.address == *address)
    }

    pub fn identity(&self, ont_id: &str) -> Option<&Identity> {
        self.identities.iter().find(|i| i.ontid == ont_id)
    }

    pub(crate) fn identity_mut(&mut self, ont_id: &str) -> Option<&mut Identity> {
        self.identities.iter_mut().find(|i| i.ontid == ont_id)
    }

    /// Append an account. The first account becomes the default.
    pub fn add_account(&mut self, mut record: AccountRecord) -> Result<&AccountRecord, WalletError> {
        if self.account(&record.address).is_some() {
            return Err(WalletError::DuplicateAccount(record.address.encode()));
        }
        record.is_default = self.accounts.is_empty();
        if record.is_default {
            self.default_account_address = record.address.encode();
        }
        self.accounts.push(record);
        let last = self.accounts.len() - 1;
        Ok(&self.accounts[last])
    }

    /// Append an identity. The first identity becomes the default.
    pub fn add_identity(&mut self, mut identity: Identity) -> Result<&Identity, WalletError> {
        if self.identity(&identity.ontid).is_some() {
            return Err(WalletError::DuplicateIdentity(identity.ontid));
        }
        identity.is_default = self.identities.is_empty();
        if identity.is_default {
            self.default_ontid = identity.ontid.clone();
        }
        self.identities.push(identity);
        let last = self.identities.len() - 1;
        Ok(&self.identities[last])
    }

    pub fn remove_account(&mut self, address: &Address) -> Result<AccountRecord, WalletError> {
        let pos = self
            .accounts
            .iter()
            .position(|a| a.address == *address)
            .ok_or_else(|| WalletError::AccountNotFound(address.encode()))?;
        let removed = self.accounts.remove(pos);
        if removed.is_default {
            self.default_account_address.clear();
        }
        Ok(removed)
    }

    pub fn set_default_account(&mut self, address: &Address) -> Result<(), WalletError> {
        if self.account(address).is_none() {
            return Err(WalletError::AccountNotFound(address.encode()));
        }
        for account in &mut self.accounts {
            account.is_default = account.address == *address;
        }
        self.default_account_address = address.encode();
        Ok(())
    }

    pub fn set_default_identity(&mut self, ont_id: &str) -> Result<(), WalletError> {
        if self.identity(ont_id).is_none() {
            return Err(WalletError::IdentityNotFound(ont_id.to_string()));
        }
        for identity in &mut self.identities {
            identity.is_default = identity.ontid == ont_id;
        }
        self.default_ontid = ont_id.to_string();
        Ok(())
    }

    pub fn set_account_label(&mut self, address: &Address, label: &str) -> Result<(), WalletError> {
        let account = self
            .accounts
            .iter_mut()
            .find(|a| a.address == *address)
            .ok_or_else(|| WalletError::AccountNotFound(address.encode()))?;
        account.label = label.to_string();
        Ok(())
    }

    pub fn default_account(&self) -> Option<&AccountRecord> {
        self.accounts.iter().find(|a| a.is_default)
    }

    pub fn default_identity(&self) -> Option<&Identity> {
        self.identities.iter().find(|i| i.is_default)
    }
}

/// An account entry: address plus the encrypted private key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub address: Address,
    #[serde(rename = "enc-alg", default = "default_enc_alg")]
    pub enc_alg: String,
    /// Base64 ciphertext.
    pub key: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Base64 salt.
    pub salt: String,
    #[serde(default)]
    pub parameters: KeyParameters,
    #[serde(default)]
    pub label: String,
    /// Hex compressed public key.
    pub public_key: String,
    #[serde(default = "default_scheme")]
    pub signature_scheme: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub lock: bool,
    /// Cost parameters the key was sealed with. Older files omit this and
    /// rely on the wallet-level `scrypt` block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrypt: Option<ScryptParams>,
}

impl AccountRecord {
    pub fn new(address: Address, encrypted: &EncryptedKey, public_key_hex: String, label: &str) -> Self {
        Self {
            address,
            enc_alg: default_enc_alg(),
            key: encrypted.key_base64(),
            algorithm: default_algorithm(),
            salt: encrypted.salt_base64(),
            parameters: KeyParameters::default(),
            label: label.to_string(),
            public_key: public_key_hex,
            signature_scheme: default_scheme(),
            is_default: false,
            lock: false,
            scrypt: Some(encrypted.params),
        }
    }

    /// The sealed key. `wallet_scrypt` applies only when the record carries
    /// no parameters of its own.
    pub fn encrypted_key(&self, wallet_scrypt: &ScryptParams) -> Result<EncryptedKey, WalletError> {
        EncryptedKey::from_base64(&self.key, &self.salt, self.scrypt.unwrap_or(*wallet_scrypt))
    }

    pub fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
    }
}

/// A decentralized identity with one or more control keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub ontid: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub lock: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub controls: Vec<ControlRecord>,
}

impl Identity {
    /// Identity whose ONT ID is derived from `address`.
    pub fn new(address: &Address, label: &str) -> Self {
        Self {
            ontid: format!("{DID_ONT}{}", address.encode()),
            label: label.to_string(),
            lock: false,
            is_default: false,
            controls: Vec::new(),
        }
    }

    /// Append a control. An empty id is filled with `keys-<n>`.
    pub fn add_control(&mut self, mut control: ControlRecord) -> Result<&ControlRecord, WalletError> {
        if self.controls.iter().any(|c| c.address == control.address) {
            return Err(WalletError::DuplicateControl(control.address.encode()));
        }
        if control.id.is_empty() {
            control.id = format!("keys-{}", self.controls.len() + 1);
        }
        self.controls.push(control);
        let last = self.controls.len() - 1;
        Ok(&self.controls[last])
    }

    pub fn control_by_address(&self, address: &Address) -> Option<&ControlRecord> {
        self.controls.iter().find(|c| c.address == *address)
    }

    pub fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
    }
}

/// One key controlling an identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlRecord {
    /// Key id, `keys-1`, `keys-2`, ...
    #[serde(default)]
    pub id: String,
    pub address: Address,
    #[serde(rename = "enc-alg", default = "default_enc_alg")]
    pub enc_alg: String,
    pub key: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    pub salt: String,
    #[serde(default)]
    pub parameters: KeyParameters,
    #[serde(default = "default_hash")]
    pub hash: String,
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrypt: Option<ScryptParams>,
}

impl ControlRecord {
    pub fn new(id: &str, address: Address, encrypted: &EncryptedKey, public_key_hex: String) -> Self {
        Self {
            id: id.to_string(),
            address,
            enc_alg: default_enc_alg(),
            key: encrypted.key_base64(),
            algorithm: default_algorithm(),
            salt: encrypted.salt_base64(),
            parameters: KeyParameters::default(),
            hash: default_hash(),
            public_key: public_key_hex,
            scrypt: Some(encrypted.params),
        }
    }

    pub fn encrypted_key(&self, wallet_scrypt: &ScryptParams) -> Result<EncryptedKey, WalletError> {
        EncryptedKey::from_base64(&self.key, &self.salt, self.scrypt.unwrap_or(*wallet_scrypt))
    }
}

fn default_enc_alg() -> String {
    ENC_ALG.to_string()
}

fn default_algorithm() -> String {
    KEY_ALGORITHM.to_string()
}

fn default_scheme() -> String {
    SignatureScheme::Sha256WithEcdsa.name().to_string()
}

fn default_hash() -> String {
    "sha256".to_string()
}
