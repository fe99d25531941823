//! The external credential vault.

use crate::{ItemUpdate, Query, VaultResult};

/// One matched entry returned by [`Vault::copy_matching`].
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct VaultRecord {
    /// `kSecAttrAccount`, present when attributes were requested.
    pub account: Option<String>,
    /// `kSecValueData`, present when data was requested.
    pub data: Option<Vec<u8>>,
}

/// Protected credential storage owned by the platform.
///
/// Implementations execute one native call per method and report any
/// non-success status as [`VaultError::Status`](crate::VaultError::Status),
/// including [`VaultStatus::ITEM_NOT_FOUND`](crate::VaultStatus::ITEM_NOT_FOUND).
/// Each call is expected to be atomic on its own; nothing here makes a
/// sequence of calls atomic.
///
/// The trait can be implemented from Swift or Kotlin where the native vault
/// lives on the other side of the bridge.
#[uniffi::export(with_foreign)]
pub trait Vault: Send + Sync {
    /// Looks up entries matching `query`. Returns a single record unless
    /// `query.match_limit` is [`MatchLimit::All`](crate::MatchLimit::All).
    ///
    /// # Errors
    ///
    /// Returns the vault status when the lookup fails or matches nothing.
    fn copy_matching(&self, query: Query) -> VaultResult<Vec<VaultRecord>>;

    /// Adds a new entry described by `query`, payload included.
    ///
    /// # Errors
    ///
    /// Returns the vault status when the add is rejected, e.g. a duplicate.
    fn add(&self, query: Query) -> VaultResult<()>;

    /// Rewrites the attributes in `changes` on every entry matching `query`.
    ///
    /// # Errors
    ///
    /// Returns the vault status when the update is rejected.
    fn update(&self, query: Query, changes: ItemUpdate) -> VaultResult<()>;

    /// Removes every entry matching `query`.
    ///
    /// # Errors
    ///
    /// Returns the vault status when the delete fails or matches nothing.
    fn delete(&self, query: Query) -> VaultResult<()>;
}
