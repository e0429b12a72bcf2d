//! JSON wallet file persistence.
//!
//! Saves go to a sibling temp file first and are renamed into place, so an
//! interrupted save never leaves a half-written wallet behind.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WalletError;
use crate::records::WalletData;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Read a wallet file. A leading UTF-8 byte order mark is ignored.
pub fn load(path: &Path) -> Result<WalletData, WalletError> {
    let content = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => WalletError::FileNotFound(path.display().to_string()),
        _ => WalletError::IoError(e.to_string()),
    })?;
    let body = content.strip_prefix(UTF8_BOM).unwrap_or(&content);
    let wallet: WalletData =
        serde_json::from_slice(body).map_err(|e| WalletError::CorruptedFile(e.to_string()))?;
    tracing::debug!(
        path = %path.display(),
        accounts = wallet.accounts.len(),
        identities = wallet.identities.len(),
        "loaded wallet"
    );
    Ok(wallet)
}

/// Write `wallet` as pretty-printed JSON.
pub fn save(path: &Path, wallet: &WalletData) -> Result<(), WalletError> {
    let json =
        serde_json::to_vec_pretty(wallet).map_err(|e| WalletError::Serialization(e.to_string()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| WalletError::IoError(e.to_string()))?;
    }
    let tmp = temp_path(path);
    fs::write(&tmp, &json).map_err(|e| WalletError::IoError(e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        WalletError::IoError(e.to_string())
    })?;
    tracing::debug!(path = %path.display(), bytes = json.len(), "saved wallet");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "wallet.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        let mut wallet = WalletData::default();
        wallet.name = "test".into();
        save(&path, &wallet).unwrap();
        assert_eq!(load(&path).unwrap(), wallet);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("wallet.json");
        save(&path, &WalletData::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn load_tolerates_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.json");
        let mut content = UTF8_BOM.to_vec();
        content.extend_from_slice(br#"{"name":"bom","version":"1.0"}"#);
        fs::write(&path, content).unwrap();
        assert_eq!(load(&path).unwrap().name, "bom");
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(&dir.path().join("missing.json")),
            Err(WalletError::FileNotFound(_))
        ));
    }

    #[test]
    fn load_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"{not json").unwrap();
        assert!(matches!(load(&path), Err(WalletError::CorruptedFile(_))));
    }

    #[test]
    fn save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        let mut wallet = WalletData::default();
        save(&path, &wallet).unwrap();
        wallet.name = "renamed".into();
        save(&path, &wallet).unwrap();
        assert_eq!(load(&path).unwrap().name, "renamed");
    }
}
