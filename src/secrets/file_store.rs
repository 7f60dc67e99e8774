//! secrets::file_store
//!
//! File-based token storage in `~/.wry/secrets.toml`.
//!
//! The file is a flat TOML table of `key = "value"`. On Unix it is created
//! with 0600 permissions before any content is written, and every update
//! goes through a temp file followed by a rename.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::traits::{SecretError, SecretStore};

/// File-based secret storage.
#[derive(Debug)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Create a store at `~/.wry/secrets.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, SecretError> {
        let home = dirs::home_dir()
            .ok_or_else(|| SecretError::ReadError("cannot determine home directory".into()))?;
        Ok(Self::with_path(home.join(".wry").join("secrets.toml")))
    }

    /// Create a store at a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the path to the secrets file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_secrets(&self) -> Result<BTreeMap<String, String>, SecretError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| SecretError::ReadError(format!("cannot read secrets file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SecretError::ReadError(format!("cannot parse secrets file: {}", e)))
    }

    fn write_secrets(&self, secrets: &BTreeMap<String, String>) -> Result<(), SecretError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SecretError::WriteError(format!("cannot create directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(secrets)
            .map_err(|e| SecretError::WriteError(format!("cannot serialize secrets: {}", e)))?;

        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| SecretError::WriteError(format!("cannot create temp file: {}", e)))?;

            // Restrict permissions before any content lands on disk
            #[cfg(unix)]
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| SecretError::WriteError(format!("cannot set permissions: {}", e)))?;

            file.write_all(content.as_bytes())
                .map_err(|e| SecretError::WriteError(format!("cannot write secrets: {}", e)))?;
            file.sync_all()
                .map_err(|e| SecretError::WriteError(format!("cannot sync to disk: {}", e)))?;
        }

        fs::rename(&temp_path, &self.path)
            .map_err(|e| SecretError::WriteError(format!("cannot rename temp file: {}", e)))
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.read_secrets()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let mut secrets = self.read_secrets()?;
        secrets.insert(key.to_string(), value.to_string());
        self.write_secrets(&secrets)
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        let mut secrets = self.read_secrets()?;
        if secrets.remove(key).is_none() {
            return Ok(());
        }
        self.write_secrets(&secrets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::token_key;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, FileSecretStore) {
        let temp = TempDir::new().expect("create temp dir");
        let store = FileSecretStore::with_path(temp.path().join("secrets.toml"));
        (temp, store)
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let (_temp, store) = create_test_store();
        assert!(store.get(&token_key("dev")).expect("get").is_none());
        // Reading never creates the file
        assert!(!store.path().exists());
    }

    #[test]
    fn set_overwrites_and_keeps_other_orgs() {
        let (_temp, store) = create_test_store();

        store.set(&token_key("dev"), "token-dev-1").expect("set dev");
        store.set(&token_key("qa"), "token-qa").expect("set qa");
        store.set(&token_key("dev"), "token-dev-2").expect("reset dev");

        assert_eq!(
            store.get(&token_key("dev")).expect("get dev"),
            Some("token-dev-2".to_string())
        );
        assert_eq!(
            store.get(&token_key("qa")).expect("get qa"),
            Some("token-qa".to_string())
        );
    }

    #[test]
    fn delete_existing_and_missing() {
        let (_temp, store) = create_test_store();

        store.set("key", "value").expect("set");
        store.delete("key").expect("delete");
        assert!(store.get("key").expect("get after delete").is_none());

        store.delete("never-set").expect("delete nonexistent");
        assert!(!store.exists("never-set").expect("exists"));
    }

    #[test]
    fn creates_directory_if_missing() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join(".wry").join("secrets.toml");
        let store = FileSecretStore::with_path(path.clone());

        store.set("key", "value").expect("set");

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn permissions_0600_on_unix() {
        let (_temp, store) = create_test_store();
        store.set("key", "value").expect("set");

        let mode = fs::metadata(store.path()).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "permissions should be 0600");
    }

    #[test]
    fn parse_error_is_reported() {
        let (_temp, store) = create_test_store();
        fs::write(store.path(), "invalid = [unclosed").expect("write bad toml");

        let err = store.get("key").unwrap_err().to_string();
        assert!(err.contains("cannot parse"), "unexpected error: {}", err);
    }

    #[test]
    fn special_characters_in_values() {
        let (_temp, store) = create_test_store();
        let token = "00D5C0000000abc!AQ4AQ\"quoted\"=and\nnewline";

        store.set(&token_key("dev"), token).expect("set");
        assert_eq!(
            store.get(&token_key("dev")).expect("get"),
            Some(token.to_string())
        );
    }
}
