//! Wallet composition: accounts, identities and file persistence.
//!
//! [`WalletManager`] keeps two copies of the wallet: the state last read
//! from or written to disk, and a working copy that operations mutate.
//! [`WalletManager::save`] writes the working copy; [`WalletManager::reset`]
//! discards it.

use std::path::{Path, PathBuf};

use rand::RngCore;

use ont_core::address::Address;

use crate::encryption::{self, ScryptParams};
use crate::error::WalletError;
use crate::keys::{Account, RawKey};
use crate::records::{AccountRecord, ControlRecord, DID_ONT, Identity, WalletData};
use crate::store;

/// Timestamp format of the `createTime` field.
const CREATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Default)]
pub struct WalletManager {
    path: Option<PathBuf>,
    on_disk: WalletData,
    in_memory: WalletData,
}

impl WalletManager {
    /// An empty in-memory wallet with no backing file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an existing wallet file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let wallet = store::load(path)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            on_disk: wallet.clone(),
            in_memory: wallet,
        })
    }

    /// Create a new wallet file. Fails if the file already exists.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        if path.exists() {
            return Err(WalletError::FileExists(path.display().to_string()));
        }
        let mut manager = Self::unsaved(path);
        manager.save()?;
        Ok(manager)
    }

    /// Open `path` if it exists, otherwise start an empty wallet bound to
    /// it. Nothing is written until [`WalletManager::save`].
    pub fn open_or_new(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path)
        } else {
            Ok(Self::unsaved(path))
        }
    }

    fn unsaved(path: &Path) -> Self {
        let mut manager = Self {
            path: Some(path.to_path_buf()),
            ..Self::default()
        };
        manager.in_memory.create_time = chrono::Utc::now().format(CREATE_TIME_FORMAT).to_string();
        manager
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The working copy.
    pub fn wallet(&self) -> &WalletData {
        &self.in_memory
    }

    pub fn wallet_mut(&mut self) -> &mut WalletData {
        &mut self.in_memory
    }

    pub fn scrypt(&self) -> ScryptParams {
        self.in_memory.scrypt
    }

    /// Cost parameters used for keys wrapped from now on. Existing records
    /// keep the parameters they were sealed with.
    pub fn set_scrypt(&mut self, params: ScryptParams) -> Result<(), WalletError> {
        params.validate()?;
        self.in_memory.scrypt = params;
        Ok(())
    }

    /// Write the working copy to disk.
    pub fn save(&mut self) -> Result<(), WalletError> {
        let path = self.path.as_ref().ok_or(WalletError::NoPath)?;
        store::save(path, &self.in_memory)?;
        self.on_disk = self.in_memory.clone();
        Ok(())
    }

    /// Discard unsaved changes.
    pub fn reset(&mut self) {
        self.in_memory = self.on_disk.clone();
    }

    pub fn create_account(&mut self, label: &str, password: &str) -> Result<&AccountRecord, WalletError> {
        self.create_account_from_private_key(label, password, &RawKey::generate())
    }

    pub fn create_account_from_private_key(
        &mut self,
        label: &str,
        password: &str,
        private_key: &RawKey,
    ) -> Result<&AccountRecord, WalletError> {
        let record = self.seal_account(label, password, private_key)?;
        tracing::debug!(address = %record.address, "created account");
        self.in_memory.add_account(record)
    }

    /// Import an account sealed elsewhere. The password is checked against
    /// the ciphertext before the record is added. `params` are the cost
    /// parameters the key was sealed with; `None` means this wallet's.
    pub fn import_account(
        &mut self,
        label: &str,
        encrypted_key_b64: &str,
        password: &str,
        address: &Address,
        salt_b64: &str,
        params: Option<ScryptParams>,
    ) -> Result<&AccountRecord, WalletError> {
        let params = params.unwrap_or_else(|| self.scrypt());
        let encrypted = encryption::EncryptedKey::from_base64(encrypted_key_b64, salt_b64, params)?;
        let raw = encryption::unwrap(&encrypted, password, address)?;
        let public_key = raw.public_key()?;
        if public_key.address() != *address {
            return Err(WalletError::Authentication);
        }
        let record = AccountRecord::new(*address, &encrypted, public_key.to_hex(), &label_or_random(label));
        self.in_memory.add_account(record)
    }

    pub fn create_identity(&mut self, label: &str, password: &str) -> Result<&Identity, WalletError> {
        self.create_identity_from_private_key(label, password, &RawKey::generate())
    }

    pub fn create_identity_from_private_key(
        &mut self,
        label: &str,
        password: &str,
        private_key: &RawKey,
    ) -> Result<&Identity, WalletError> {
        let control = self.seal_control(password, private_key)?;
        let mut identity = Identity::new(&control.address, &label_or_random(label));
        identity.add_control(control)?;
        tracing::debug!(ont_id = %identity.ontid, "created identity");
        self.in_memory.add_identity(identity)
    }

    /// Import an identity whose first control key was sealed elsewhere.
    pub fn import_identity(
        &mut self,
        label: &str,
        encrypted_key_b64: &str,
        password: &str,
        address: &Address,
        salt_b64: &str,
        params: Option<ScryptParams>,
    ) -> Result<&Identity, WalletError> {
        let params = params.unwrap_or_else(|| self.scrypt());
        let encrypted = encryption::EncryptedKey::from_base64(encrypted_key_b64, salt_b64, params)?;
        let raw = encryption::unwrap(&encrypted, password, address)?;
        let public_key = raw.public_key()?;
        if public_key.address() != *address {
            return Err(WalletError::Authentication);
        }
        let mut identity = Identity::new(address, &label_or_random(label));
        identity.add_control(ControlRecord::new("", *address, &encrypted, public_key.to_hex()))?;
        self.in_memory.add_identity(identity)
    }

    /// Add a freshly generated control key to an identity.
    pub fn add_control(&mut self, ont_id: &str, password: &str) -> Result<Account, WalletError> {
        self.add_control_by_private_key(ont_id, password, &RawKey::generate())
    }

    pub fn add_control_by_private_key(
        &mut self,
        ont_id: &str,
        password: &str,
        private_key: &RawKey,
    ) -> Result<Account, WalletError> {
        check_ont_id(ont_id)?;
        if self.in_memory.identity(ont_id).is_none() {
            return Err(WalletError::IdentityNotFound(ont_id.to_string()));
        }
        let control = self.seal_control(password, private_key)?;
        let identity = self
            .in_memory
            .identity_mut(ont_id)
            .ok_or_else(|| WalletError::IdentityNotFound(ont_id.to_string()))?;
        identity.add_control(control)?;
        Account::new(private_key.clone())
    }

    /// Decrypt the account stored under `address`.
    pub fn get_account_by_address(&self, address: &Address, password: &str) -> Result<Account, WalletError> {
        let record = self
            .in_memory
            .account(address)
            .ok_or_else(|| WalletError::AccountNotFound(address.encode()))?;
        let encrypted = record.encrypted_key(&self.in_memory.scrypt)?;
        Account::new(encryption::unwrap(&encrypted, password, address)?)
    }

    /// Decrypt the first control key of an identity.
    pub fn get_account_by_ont_id(&self, ont_id: &str, password: &str) -> Result<Account, WalletError> {
        self.get_control_account_by_index(ont_id, 0, password)
    }

    pub fn get_control_account_by_index(
        &self,
        ont_id: &str,
        index: usize,
        password: &str,
    ) -> Result<Account, WalletError> {
        let identity = self.identity(ont_id)?;
        let control = identity
            .controls
            .get(index)
            .ok_or_else(|| WalletError::ControlNotFound(format!("{ont_id} #{index}")))?;
        self.open_control(control, password)
    }

    pub fn get_control_account_by_address(
        &self,
        ont_id: &str,
        address: &Address,
        password: &str,
    ) -> Result<Account, WalletError> {
        let identity = self.identity(ont_id)?;
        let control = identity
            .control_by_address(address)
            .ok_or_else(|| WalletError::ControlNotFound(address.encode()))?;
        self.open_control(control, password)
    }

    pub fn default_account(&self) -> Result<&AccountRecord, WalletError> {
        self.in_memory
            .default_account()
            .ok_or(WalletError::NoDefaultAccount)
    }

    pub fn default_identity(&self) -> Result<&Identity, WalletError> {
        self.in_memory
            .default_identity()
            .ok_or(WalletError::NoDefaultIdentity)
    }

    pub fn identity(&self, ont_id: &str) -> Result<&Identity, WalletError> {
        check_ont_id(ont_id)?;
        self.in_memory
            .identity(ont_id)
            .ok_or_else(|| WalletError::IdentityNotFound(ont_id.to_string()))
    }

    fn open_control(&self, control: &ControlRecord, password: &str) -> Result<Account, WalletError> {
        let encrypted = control.encrypted_key(&self.in_memory.scrypt)?;
        Account::new(encryption::unwrap(&encrypted, password, &control.address)?)
    }

    fn seal_account(&self, label: &str, password: &str, key: &RawKey) -> Result<AccountRecord, WalletError> {
        let public_key = key.public_key()?;
        let address = public_key.address();
        if self.in_memory.account(&address).is_some() {
            return Err(WalletError::DuplicateAccount(address.encode()));
        }
        let encrypted = encryption::wrap(key, password, &address, &self.in_memory.scrypt)?;
        Ok(AccountRecord::new(
            address,
            &encrypted,
            public_key.to_hex(),
            &label_or_random(label),
        ))
    }

    fn seal_control(&self, password: &str, key: &RawKey) -> Result<ControlRecord, WalletError> {
        let public_key = key.public_key()?;
        let address = public_key.address();
        let encrypted = encryption::wrap(key, password, &address, &self.in_memory.scrypt)?;
        Ok(ControlRecord::new("", address, &encrypted, public_key.to_hex()))
    }
}

fn check_ont_id(ont_id: &str) -> Result<(), WalletError> {
    if ont_id.starts_with(DID_ONT) {
        Ok(())
    } else {
        Err(WalletError::InvalidOntId(ont_id.to_string()))
    }
}

/// Empty labels get eight random hex characters.
fn label_or_random(label: &str) -> String {
    if !label.is_empty() {
        return label.to_string();
    }
    let mut bytes = [0u8; 4];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
