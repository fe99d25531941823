//! In-memory vault for testing.
//!
//! This implementation is NOT secure for production use. It reproduces the
//! keychain behaviours the store relies on: attributes omitted from a query
//! match any value, duplicates are detected on the full identity tuple, and
//! lookups, updates and deletes that match nothing report not-found.

use std::sync::{Mutex, MutexGuard};

use zeroize::Zeroizing;

use crate::{
    AccessibilityPolicy, ItemUpdate, MatchLimit, Query, Vault, VaultRecord, VaultResult,
    VaultStatus,
};

/// A stored entry.
struct Item {
    account: Option<String>,
    service: Option<String>,
    access_group: Option<String>,
    synchronizable: bool,
    accessibility: AccessibilityPolicy,
    data: Zeroizing<Vec<u8>>,
}

impl Item {
    /// Whether `query` selects this item.
    ///
    /// An absent account, service or access group matches any value. An
    /// absent sync flag means "not synchronizable".
    fn matches(&self, query: &Query) -> bool {
        narrows(query.account.as_ref(), self.account.as_ref())
            && narrows(query.service.as_ref(), self.service.as_ref())
            && narrows(query.access_group.as_ref(), self.access_group.as_ref())
            && self.synchronizable == query.synchronizable.unwrap_or(false)
    }

    /// Whether adding `query` would duplicate this item.
    fn collides_with(&self, query: &Query) -> bool {
        self.account == query.account
            && self.service == query.service
            && self.access_group == query.access_group
            && self.synchronizable == query.synchronizable.unwrap_or(false)
    }

    fn record(&self, query: &Query) -> VaultRecord {
        VaultRecord {
            account: query
                .return_attributes
                .unwrap_or(false)
                .then(|| self.account.clone())
                .flatten(),
            data: query
                .return_data
                .unwrap_or(false)
                .then(|| self.data.to_vec()),
        }
    }
}

fn narrows(wanted: Option<&String>, stored: Option<&String>) -> bool {
    wanted.is_none_or(|wanted| stored == Some(wanted))
}

/// In-memory [`Vault`] backed by a `Vec`, in insertion order.
///
/// Each call holds the lock for its whole duration, so individual calls are
/// atomic while sequences of calls are not, as with the platform vault.
#[derive(Default)]
pub struct MemoryVault {
    items: Mutex<Vec<Item>>,
}

impl std::fmt::Debug for MemoryVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryVault")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl MemoryVault {
    /// Creates an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries across all scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items().map_or(0, |items| items.len())
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the accessibility attribute stored for the first entry `query`
    /// selects, if any.
    #[must_use]
    pub fn accessibility_of(&self, query: &Query) -> Option<AccessibilityPolicy> {
        self.items()
            .ok()?
            .iter()
            .find(|item| item.matches(query))
            .map(|item| item.accessibility)
    }

    fn items(&self) -> VaultResult<MutexGuard<'_, Vec<Item>>> {
        self.items
            .lock()
            .map_err(|_| VaultStatus::INTERNAL_COMPONENT.into())
    }
}

impl Vault for MemoryVault {
    fn copy_matching(&self, query: Query) -> VaultResult<Vec<VaultRecord>> {
        let items = self.items()?;
        let limit = match query.match_limit {
            Some(MatchLimit::All) => usize::MAX,
            Some(MatchLimit::One) | None => 1,
        };

        let records: Vec<VaultRecord> = items
            .iter()
            .filter(|item| item.matches(&query))
            .take(limit)
            .map(|item| item.record(&query))
            .collect();

        if records.is_empty() {
            return Err(VaultStatus::ITEM_NOT_FOUND.into());
        }
        Ok(records)
    }

    fn add(&self, query: Query) -> VaultResult<()> {
        let mut items = self.items()?;
        if items.iter().any(|item| item.collides_with(&query)) {
            return Err(VaultStatus::DUPLICATE_ITEM.into());
        }

        items.push(Item {
            account: query.account,
            service: query.service,
            access_group: query.access_group,
            synchronizable: query.synchronizable.unwrap_or(false),
            accessibility: query.accessibility,
            data: Zeroizing::new(query.value_data.unwrap_or_default()),
        });
        Ok(())
    }

    fn update(&self, query: Query, changes: ItemUpdate) -> VaultResult<()> {
        let mut items = self.items()?;
        let mut matched = false;

        for item in items.iter_mut().filter(|item| item.matches(&query)) {
            matched = true;
            if let Some(data) = &changes.value_data {
                item.data = Zeroizing::new(data.clone());
            }
            if let Some(accessibility) = changes.accessibility {
                item.accessibility = accessibility;
            }
            if let Some(synchronizable) = changes.synchronizable {
                item.synchronizable = synchronizable;
            }
        }

        if matched {
            Ok(())
        } else {
            Err(VaultStatus::ITEM_NOT_FOUND.into())
        }
    }

    fn delete(&self, query: Query) -> VaultResult<()> {
        let mut items = self.items()?;
        let before = items.len();
        items.retain(|item| !item.matches(&query));

        if items.len() == before {
            return Err(VaultStatus::ITEM_NOT_FOUND.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VaultError;

    fn query(account: Option<&str>) -> Query {
        Query {
            account: account.map(str::to_owned),
            service: Some("svc".to_string()),
            ..Query::default()
        }
    }

    #[test]
    fn test_add_and_copy_matching() {
        let vault = MemoryVault::new();
        vault.add(query(Some("a")).with_value(b"1".to_vec())).unwrap();

        let mut lookup = query(Some("a"));
        lookup.return_data = Some(true);
        let records = vault.copy_matching(lookup).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data.as_deref(), Some(&b"1"[..]));
        assert_eq!(records[0].account, None);
    }

    #[test]
    fn test_duplicate_add() {
        let vault = MemoryVault::new();
        vault.add(query(Some("a"))).unwrap();

        assert_eq!(
            vault.add(query(Some("a"))),
            Err(VaultError::from(VaultStatus::DUPLICATE_ITEM))
        );
        assert_eq!(vault.len(), 1);
    }

    #[test]
    fn test_not_found_statuses() {
        let vault = MemoryVault::new();
        let not_found = VaultError::from(VaultStatus::ITEM_NOT_FOUND);

        assert_eq!(vault.copy_matching(query(Some("a"))), Err(not_found.clone()));
        assert_eq!(
            vault.update(query(Some("a")), ItemUpdate::default()),
            Err(not_found.clone())
        );
        assert_eq!(vault.delete(query(None)), Err(not_found));
    }

    #[test]
    fn test_absent_sync_flag_means_not_synchronizable() {
        let vault = MemoryVault::new();
        vault.add(query(Some("a"))).unwrap();

        let mut explicit = query(Some("a"));
        explicit.synchronizable = Some(false);
        assert!(vault.copy_matching(explicit).is_ok());

        let mut synced = query(Some("a"));
        synced.synchronizable = Some(true);
        assert!(vault.copy_matching(synced).is_err());
    }

    #[test]
    fn test_absent_attributes_match_any_value() {
        let vault = MemoryVault::new();
        vault.add(query(Some("a"))).unwrap();
        // A different service is a different identity, not a duplicate.
        vault
            .add(Query {
                account: Some("a".to_string()),
                ..Query::default()
            })
            .unwrap();
        assert_eq!(vault.len(), 2);

        let unscoped = Query {
            account: Some("a".to_string()),
            match_limit: Some(MatchLimit::All),
            ..Query::default()
        };
        assert_eq!(vault.copy_matching(unscoped.clone()).unwrap().len(), 2);

        vault.delete(unscoped).unwrap();
        assert!(vault.is_empty());
    }

    #[test]
    fn test_enumerate_and_delete_scope() {
        let vault = MemoryVault::new();
        vault.add(query(Some("a"))).unwrap();
        vault.add(query(Some("b"))).unwrap();
        vault
            .add(Query {
                account: Some("c".to_string()),
                ..Query::default()
            })
            .unwrap();

        let mut all = query(None);
        all.match_limit = Some(MatchLimit::All);
        all.return_attributes = Some(true);
        let accounts: Vec<_> = vault
            .copy_matching(all)
            .unwrap()
            .into_iter()
            .filter_map(|record| record.account)
            .collect();
        assert_eq!(accounts, ["a", "b"]);

        vault.delete(query(None)).unwrap();
        assert_eq!(vault.len(), 1);
    }

    #[test]
    fn test_update_rewrites_attributes() {
        let vault = MemoryVault::new();
        vault.add(query(Some("a")).with_value(b"1".to_vec())).unwrap();

        vault
            .update(
                query(Some("a")),
                ItemUpdate {
                    value_data: Some(b"2".to_vec()),
                    accessibility: Some(AccessibilityPolicy::Passcode),
                    synchronizable: None,
                },
            )
            .unwrap();

        assert_eq!(
            vault.accessibility_of(&query(Some("a"))),
            Some(AccessibilityPolicy::Passcode)
        );
        let mut lookup = query(Some("a"));
        lookup.return_data = Some(true);
        assert_eq!(
            vault.copy_matching(lookup).unwrap()[0].data.as_deref(),
            Some(&b"2"[..])
        );
    }
}
