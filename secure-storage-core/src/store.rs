//! The public operation surface over a [`Vault`].

use std::collections::HashMap;
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::{ItemUpdate, Query, QueryBuilder, Scope, StorageConfig, Vault, VaultRecord, VaultResult};

/// Key-value credential store.
///
/// Stateless apart from the vault handle: every call is translated into one or
/// two vault calls and the vault's status is mapped back. "Not found" is never
/// an error; any other non-success status is returned as
/// [`VaultError`](crate::VaultError)
/// without retrying.
///
/// The store adds no locking. Concurrent writers to the same scoped key race
/// inside the vault; see [`CredentialStore::write`].
pub struct CredentialStore {
    vault: Arc<dyn Vault>,
    queries: QueryBuilder,
}

impl CredentialStore {
    /// Creates a store over `vault` for the resolved platform `config`.
    #[must_use]
    pub fn new(vault: Arc<dyn Vault>, config: StorageConfig) -> Self {
        Self {
            vault,
            queries: QueryBuilder::new(config),
        }
    }

    /// Returns whether `key` exists in `scope`.
    ///
    /// # Errors
    ///
    /// Returns the vault status for anything other than success or not-found.
    pub fn exists(&self, key: &str, scope: &Scope) -> VaultResult<bool> {
        let query = self.queries.build(Some(key), scope, Some(false));
        match self.vault.copy_matching(query) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Reads the value stored under `key` in `scope`.
    ///
    /// Returns `None` when nothing is stored, and also when the stored bytes
    /// are not valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns the vault status for anything other than success or not-found.
    pub fn read(&self, key: &str, scope: &Scope) -> VaultResult<Option<String>> {
        let query = self.queries.build(Some(key), scope, Some(true));
        let records = normalize_not_found(self.vault.copy_matching(query))?;

        Ok(records
            .and_then(|records| records.into_iter().next())
            .and_then(|record| record.data)
            .and_then(decode_utf8))
    }

    /// Reads every entry in `scope`.
    ///
    /// Returns `None` when the scope is empty. Entries without an account
    /// attribute or with a payload that is not valid UTF-8 are skipped.
    ///
    /// # Errors
    ///
    /// Returns the vault status for anything other than success or not-found.
    pub fn read_all(&self, scope: &Scope) -> VaultResult<Option<HashMap<String, String>>> {
        let query = self.queries.build(None, scope, Some(true)).enumerate();
        let Some(records) = normalize_not_found(self.vault.copy_matching(query))? else {
            return Ok(None);
        };

        let total = records.len();
        let entries: HashMap<String, String> = records.into_iter().filter_map(decode_entry).collect();
        if entries.len() < total {
            log::debug!("read_all skipped {} undecodable entries", total - entries.len());
        }

        Ok(Some(entries))
    }

    /// Stores `value` under `key` in `scope`, replacing any existing value.
    ///
    /// Runs an existence check and then either an update or an add. When the
    /// entry exists, its accessibility and sync attributes are rewritten from
    /// `scope` along with the value, so writing with a different policy
    /// migrates the stored entry to that policy.
    ///
    /// The two steps are not atomic. If another writer adds the same scoped
    /// key in between, the add fails and the vault's duplicate-item status is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns the status of the failing existence check, add, or update.
    pub fn write(&self, key: &str, value: &str, scope: &Scope) -> VaultResult<()> {
        let exists = self.exists(key, scope)?;
        let query = self.queries.build(Some(key), scope, None);

        if exists {
            log::trace!("entry exists, updating in place");
            let changes = ItemUpdate {
                value_data: Some(value.as_bytes().to_vec()),
                accessibility: Some(scope.accessibility),
                synchronizable: scope.synchronizable,
            };
            self.vault.update(query, changes)
        } else {
            log::trace!("entry absent, adding");
            self.vault.add(query.with_value(value.as_bytes().to_vec()))
        }
    }

    /// Deletes `key` from `scope`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns the vault status for anything other than success or not-found.
    pub fn delete(&self, key: &str, scope: &Scope) -> VaultResult<()> {
        self.delete_matching(self.queries.build(Some(key), scope, None))
    }

    /// Deletes every entry in `scope`. Deleting from an empty scope succeeds.
    ///
    /// # Errors
    ///
    /// Returns the vault status for anything other than success or not-found.
    pub fn delete_all(&self, scope: &Scope) -> VaultResult<()> {
        self.delete_matching(self.queries.build(None, scope, None))
    }

    fn delete_matching(&self, query: Query) -> VaultResult<()> {
        normalize_not_found(self.vault.delete(query)).map(drop)
    }
}

/// Maps not-found to `Ok(None)`, keeping every other outcome.
fn normalize_not_found<T>(result: VaultResult<T>) -> VaultResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

fn decode_utf8(bytes: Vec<u8>) -> Option<String> {
    let bytes = Zeroizing::new(bytes);
    std::str::from_utf8(&bytes).ok().map(str::to_owned)
}

fn decode_entry(record: VaultRecord) -> Option<(String, String)> {
    let key = record.account?;
    let value = record.data.and_then(decode_utf8)?;
    Some((key, value))
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("queries", &self.queries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{platform::MemoryVault, VaultError, VaultStatus};

    fn store() -> (Arc<MemoryVault>, CredentialStore) {
        let vault = Arc::new(MemoryVault::new());
        let store = CredentialStore::new(
            Arc::clone(&vault) as Arc<dyn Vault>,
            StorageConfig::default(),
        );
        (vault, store)
    }

    #[test]
    fn test_normalize_not_found() {
        assert_eq!(normalize_not_found(Ok(1)), Ok(Some(1)));
        assert_eq!(
            normalize_not_found::<()>(Err(VaultStatus::ITEM_NOT_FOUND.into())),
            Ok(None)
        );
        assert_eq!(
            normalize_not_found::<()>(Err(VaultStatus::DUPLICATE_ITEM.into())),
            Err(VaultError::from(VaultStatus::DUPLICATE_ITEM))
        );
    }

    #[test]
    fn test_decode_entry_skips_incomplete_records() {
        let full = VaultRecord {
            account: Some("a".to_string()),
            data: Some(b"1".to_vec()),
        };
        assert_eq!(decode_entry(full), Some(("a".to_string(), "1".to_string())));

        let no_account = VaultRecord {
            account: None,
            data: Some(b"1".to_vec()),
        };
        assert_eq!(decode_entry(no_account), None);

        let invalid = VaultRecord {
            account: Some("a".to_string()),
            data: Some(vec![0xff, 0xfe]),
        };
        assert_eq!(decode_entry(invalid), None);
    }

    #[test]
    fn test_write_then_overwrite() {
        let (vault, store) = store();
        let scope = Scope::default();

        store.write("k", "v1", &scope).unwrap();
        store.write("k", "v2", &scope).unwrap();

        assert_eq!(store.read("k", &scope).unwrap().as_deref(), Some("v2"));
        assert_eq!(vault.len(), 1);
    }

    #[test]
    fn test_exists() {
        let (_, store) = store();
        let scope = Scope::default();

        assert!(!store.exists("k", &scope).unwrap());
        store.write("k", "v", &scope).unwrap();
        assert!(store.exists("k", &scope).unwrap());
    }
}
