//! FFI bindings for the credential store.
//!
//! Swift and Kotlin callers use [`SecureStorage`]. Reads and mutations fold
//! their outcome into a `{ status, value }` record instead of throwing, so the
//! bridge can forward the native status untouched; only
//! [`SecureStorage::contains_key`] throws.
//!
//! # Example (Swift)
//!
//! ```swift
//! let storage = SecureStorage.keychain()
//! let scope = Scope(groupId: nil, accountName: "com.example.app",
//!                   synchronizable: nil, accessibility: .whenUnlocked)
//! let response = storage.write(key: "token", value: "s3cr3t", scope: scope)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::{CredentialStore, Response, Scope, StorageConfig, Vault, VaultResult, VaultStatus};

/// Outcome of a single-value read.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ReadResponse {
    /// Vault status; success for normalized not-found.
    pub status: VaultStatus,
    /// Stored value, if present and decodable.
    pub value: Option<String>,
}

/// Outcome of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ReadAllResponse {
    /// Vault status; success for an empty scope.
    pub status: VaultStatus,
    /// Decoded entries, `None` for an empty scope.
    pub value: Option<HashMap<String, String>>,
}

/// Outcome of a write or delete.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct StatusResponse {
    /// Vault status.
    pub status: VaultStatus,
}

impl From<Response<String>> for ReadResponse {
    fn from(response: Response<String>) -> Self {
        Self {
            status: response.status,
            value: response.value,
        }
    }
}

impl From<Response<HashMap<String, String>>> for ReadAllResponse {
    fn from(response: Response<HashMap<String, String>>) -> Self {
        Self {
            status: response.status,
            value: response.value,
        }
    }
}

impl From<Response<()>> for StatusResponse {
    fn from(response: Response<()>) -> Self {
        Self {
            status: response.status,
        }
    }
}

/// Secure key-value storage exported to foreign callers.
#[derive(Debug, uniffi::Object)]
pub struct SecureStorage {
    inner: CredentialStore,
}

#[uniffi::export]
impl SecureStorage {
    /// Creates storage over a foreign-implemented vault.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(vault: Arc<dyn Vault>, config: StorageConfig) -> Arc<Self> {
        Arc::new(Self {
            inner: CredentialStore::new(vault, config),
        })
    }

    /// Returns whether `key` exists in `scope`.
    ///
    /// # Errors
    ///
    /// Throws the vault status for anything other than success or not-found.
    pub fn contains_key(&self, key: String, scope: Scope) -> VaultResult<bool> {
        self.inner.exists(&key, &scope)
    }

    /// Reads the value stored under `key`.
    #[must_use]
    pub fn read(&self, key: String, scope: Scope) -> ReadResponse {
        Response::from(self.inner.read(&key, &scope)).into()
    }

    /// Reads every entry in `scope`.
    #[must_use]
    pub fn read_all(&self, scope: Scope) -> ReadAllResponse {
        Response::from(self.inner.read_all(&scope)).into()
    }

    /// Stores `value` under `key`, replacing any existing value.
    #[must_use]
    pub fn write(&self, key: String, value: String, scope: Scope) -> StatusResponse {
        Response::from(self.inner.write(&key, &value, &scope)).into()
    }

    /// Deletes `key`.
    #[must_use]
    pub fn delete(&self, key: String, scope: Scope) -> StatusResponse {
        Response::from(self.inner.delete(&key, &scope)).into()
    }

    /// Deletes every entry in `scope`.
    #[must_use]
    pub fn delete_all(&self, scope: Scope) -> StatusResponse {
        Response::from(self.inner.delete_all(&scope)).into()
    }
}

#[cfg(target_vendor = "apple")]
#[uniffi::export]
impl SecureStorage {
    /// Creates storage over the system keychain with the detected platform
    /// configuration.
    #[uniffi::constructor]
    #[must_use]
    pub fn keychain() -> Arc<Self> {
        Self::new(
            Arc::new(crate::platform::KeychainVault::new()),
            StorageConfig::detect(),
        )
    }
}
