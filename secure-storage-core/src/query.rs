//! Translation of logical (key, scope) parameters into vault predicates.

use serde::{Deserialize, Deserializer};

use crate::{AccessibilityPolicy, StorageConfig};

/// Item class marker. Every entry is stored as a generic password.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum ItemClass {
    /// `kSecClassGenericPassword`.
    #[default]
    GenericPassword,
}

/// Upper bound on the number of matches a lookup returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum MatchLimit {
    /// At most one match (the vault's default).
    One,
    /// Every match, unbounded.
    All,
}

/// Isolation attributes shared by every operation against the same entry.
///
/// Together with the key, `group_id`, `account_name` and `synchronizable`
/// identify an entry. They must be supplied exactly as they were at write
/// time, otherwise the entry is not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct Scope {
    /// Access group shared across applications.
    pub group_id: Option<String>,
    /// Service / namespace discriminator.
    pub account_name: Option<String>,
    /// Participation in cross-device sync. `Some(false)` is a constraint;
    /// `None` leaves matching to the vault.
    pub synchronizable: Option<bool>,
    /// When the entry may be read.
    #[serde(deserialize_with = "lenient_accessibility")]
    pub accessibility: AccessibilityPolicy,
}

impl Scope {
    /// Sets the access group.
    #[must_use]
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Sets the service / namespace discriminator.
    #[must_use]
    pub fn with_account_name(mut self, account_name: impl Into<String>) -> Self {
        self.account_name = Some(account_name.into());
        self
    }

    /// Sets the sync flag.
    #[must_use]
    pub const fn with_synchronizable(mut self, synchronizable: bool) -> Self {
        self.synchronizable = Some(synchronizable);
        self
    }

    /// Sets the accessibility policy from a caller literal; see
    /// [`AccessibilityPolicy::parse`].
    #[must_use]
    pub fn with_accessibility(mut self, literal: Option<&str>) -> Self {
        self.accessibility = AccessibilityPolicy::parse(literal);
        self
    }
}

fn lenient_accessibility<'de, D>(deserializer: D) -> Result<AccessibilityPolicy, D::Error>
where
    D: Deserializer<'de>,
{
    let literal = Option::<String>::deserialize(deserializer)?;
    Ok(AccessibilityPolicy::parse(literal.as_deref()))
}

/// Attribute predicate handed to the [`Vault`](crate::Vault).
///
/// Every optional attribute is omitted when `None`; absence is never encoded
/// as `false`, so the vault applies its own default matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct Query {
    /// Item class marker.
    pub class: ItemClass,
    /// Accessibility attribute.
    pub accessibility: AccessibilityPolicy,
    /// `kSecUseDataProtectionKeychain`, present only when the platform supports it.
    pub use_data_protection_keychain: Option<bool>,
    /// Entry key (`kSecAttrAccount`). `None` matches every key in scope.
    pub account: Option<String>,
    /// `kSecAttrAccessGroup`.
    pub access_group: Option<String>,
    /// `kSecAttrService`.
    pub service: Option<String>,
    /// `kSecAttrSynchronizable`.
    pub synchronizable: Option<bool>,
    /// `kSecReturnData`.
    pub return_data: Option<bool>,
    /// `kSecReturnAttributes`.
    pub return_attributes: Option<bool>,
    /// `kSecMatchLimit`.
    pub match_limit: Option<MatchLimit>,
    /// `kSecValueData`; only set on queries used to add an entry.
    pub value_data: Option<Vec<u8>>,
}

impl Query {
    /// Requests every match together with its attributes.
    #[must_use]
    pub const fn enumerate(mut self) -> Self {
        self.match_limit = Some(MatchLimit::All);
        self.return_attributes = Some(true);
        self
    }

    /// Attaches the payload for an add.
    #[must_use]
    pub fn with_value(mut self, value: Vec<u8>) -> Self {
        self.value_data = Some(value);
        self
    }
}

/// Attributes rewritten on an existing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct ItemUpdate {
    /// New payload.
    pub value_data: Option<Vec<u8>>,
    /// New accessibility attribute.
    pub accessibility: Option<AccessibilityPolicy>,
    /// New sync flag.
    pub synchronizable: Option<bool>,
}

/// Builds vault predicates from logical parameters.
///
/// The builder is pure: the same inputs always produce the same [`Query`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    config: StorageConfig,
}

impl QueryBuilder {
    /// Creates a builder for the resolved platform configuration.
    #[must_use]
    pub const fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Builds the predicate for `key` (or every key when `None`) in `scope`.
    #[must_use]
    pub fn build(self, key: Option<&str>, scope: &Scope, return_data: Option<bool>) -> Query {
        Query {
            class: ItemClass::GenericPassword,
            accessibility: scope.accessibility,
            use_data_protection_keychain: self.config.use_data_protection_keychain.then_some(true),
            account: key.map(str::to_owned),
            access_group: scope.group_id.clone(),
            service: scope.account_name.clone(),
            synchronizable: scope.synchronizable,
            return_data,
            return_attributes: None,
            match_limit: None,
            value_data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(use_data_protection_keychain: bool) -> QueryBuilder {
        QueryBuilder::new(StorageConfig {
            use_data_protection_keychain,
        })
    }

    #[test]
    fn test_base_query_omits_absent_attributes() {
        let query = builder(false).build(None, &Scope::default(), None);

        assert_eq!(query.class, ItemClass::GenericPassword);
        assert_eq!(query.accessibility, AccessibilityPolicy::WhenUnlocked);
        assert_eq!(query.use_data_protection_keychain, None);
        assert_eq!(query.account, None);
        assert_eq!(query.access_group, None);
        assert_eq!(query.service, None);
        assert_eq!(query.synchronizable, None);
        assert_eq!(query.return_data, None);
        assert_eq!(query.match_limit, None);
    }

    #[test]
    fn test_scoped_query() {
        let scope = Scope::default()
            .with_group_id("group.example")
            .with_account_name("com.example.app")
            .with_synchronizable(true)
            .with_accessibility(Some("passcode"));
        let query = builder(true).build(Some("token"), &scope, Some(true));

        assert_eq!(query.accessibility, AccessibilityPolicy::Passcode);
        assert_eq!(query.use_data_protection_keychain, Some(true));
        assert_eq!(query.account.as_deref(), Some("token"));
        assert_eq!(query.access_group.as_deref(), Some("group.example"));
        assert_eq!(query.service.as_deref(), Some("com.example.app"));
        assert_eq!(query.synchronizable, Some(true));
        assert_eq!(query.return_data, Some(true));
    }

    #[test]
    fn test_false_flags_are_kept() {
        let scope = Scope::default().with_synchronizable(false);
        let query = builder(false).build(Some("token"), &scope, Some(false));

        assert_eq!(query.synchronizable, Some(false));
        assert_eq!(query.return_data, Some(false));
    }

    #[test]
    fn test_accessibility_default_is_unlocked() {
        let builder = builder(true);
        let unlocked = builder.build(
            Some("k"),
            &Scope::default().with_accessibility(Some("unlocked")),
            Some(true),
        );

        for literal in [None, Some("bogus")] {
            let scope = Scope::default().with_accessibility(literal);
            assert_eq!(builder.build(Some("k"), &scope, Some(true)), unlocked);
        }
    }

    #[test]
    fn test_enumerate() {
        let query = builder(false).build(None, &Scope::default(), Some(true)).enumerate();
        assert_eq!(query.match_limit, Some(MatchLimit::All));
        assert_eq!(query.return_attributes, Some(true));
    }

    #[test]
    fn test_scope_from_bridge_options() {
        let scope: Scope = serde_json::from_str(
            r#"{"groupId": "group.example", "synchronizable": true, "accessibility": "first_unlock"}"#,
        )
        .unwrap();
        assert_eq!(scope.group_id.as_deref(), Some("group.example"));
        assert_eq!(scope.account_name, None);
        assert_eq!(scope.synchronizable, Some(true));
        assert_eq!(scope.accessibility, AccessibilityPolicy::AfterFirstUnlock);

        let scope: Scope = serde_json::from_str(r#"{"accessibility": "nope"}"#).unwrap();
        assert_eq!(scope.accessibility, AccessibilityPolicy::WhenUnlocked);

        let scope: Scope = serde_json::from_str(r#"{"accessibility": null}"#).unwrap();
        assert_eq!(scope.accessibility, AccessibilityPolicy::WhenUnlocked);
    }
}
