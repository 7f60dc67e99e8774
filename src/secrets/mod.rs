//! secrets
//!
//! Storage for org access tokens.
//!
//! # Architecture
//!
//! Tokens are stored through the `SecretStore` trait:
//!
//! - [`FileSecretStore`]: `~/.wry/secrets.toml` (default)
//! - `KeychainSecretStore`: OS keychain (requires the `keychain` feature)
//!
//! # Security
//!
//! - Tokens are **never** logged or included in error messages
//! - The file store uses 0600 permissions on Unix
//! - All file writes are atomic (temp file + rename)
//!
//! # Example
//!
//! ```ignore
//! use sfwry::secrets::{create_store, token_key};
//!
//! let store = create_store("file")?;
//! store.set(&token_key("dev"), &access_token)?;
//! ```

mod file_store;
#[cfg(feature = "keychain")]
mod keychain_store;
mod traits;

pub use file_store::FileSecretStore;
#[cfg(feature = "keychain")]
pub use keychain_store::KeychainSecretStore;
pub use traits::{token_key, SecretError, SecretStore};

/// The default secret store provider name.
pub const DEFAULT_PROVIDER: &str = "file";

/// Create a secret store based on the provider name.
///
/// # Providers
///
/// - `"file"` (default): [`FileSecretStore`] storing in `~/.wry/secrets.toml`
/// - `"keychain"`: OS keychain (requires the `keychain` feature)
///
/// # Errors
///
/// Unknown provider names, keychain without the feature, or initialization
/// errors from the store.
pub fn create_store(provider: &str) -> Result<Box<dyn SecretStore>, SecretError> {
    match provider {
        "file" => Ok(Box::new(FileSecretStore::new()?)),
        #[cfg(feature = "keychain")]
        "keychain" => Ok(Box::new(KeychainSecretStore::new())),
        #[cfg(not(feature = "keychain"))]
        "keychain" => Err(SecretError::ProviderNotAvailable(
            "keychain support not enabled (compile with --features keychain)".into(),
        )),
        other => Err(SecretError::ProviderNotAvailable(format!(
            "unknown secret provider: '{}' (valid: file, keychain)",
            other
        ))),
    }
}
