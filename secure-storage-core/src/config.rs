//! Platform configuration resolved once at startup.

use serde::Deserialize;

/// Platform capabilities resolved once at startup and handed to the
/// [`QueryBuilder`](crate::QueryBuilder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    /// Request the data protection keychain (`kSecUseDataProtectionKeychain`)
    /// on every query. Leave `false` where the platform lacks it; the flag is
    /// then omitted rather than treated as an error.
    pub use_data_protection_keychain: bool,
}

impl StorageConfig {
    /// Resolves the configuration for the compilation target.
    ///
    /// Apple targets get the data protection keychain; everything else runs
    /// without it.
    #[must_use]
    pub const fn detect() -> Self {
        Self {
            use_data_protection_keychain: cfg!(target_vendor = "apple"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::detect()
    }
}
