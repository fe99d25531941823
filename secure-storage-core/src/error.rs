//! Vault status codes and the error returned when the vault rejects a call.

use std::fmt;

use thiserror::Error;

/// Result type for vault-backed operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Native status code reported by the vault (an `OSStatus` on Apple platforms).
///
/// Only [`VaultStatus::SUCCESS`] and [`VaultStatus::ITEM_NOT_FOUND`] carry
/// meaning for the store; every other code is opaque and forwarded verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, uniffi::Record)]
pub struct VaultStatus {
    /// Raw status code.
    pub code: i32,
}

impl VaultStatus {
    /// `errSecSuccess`.
    pub const SUCCESS: Self = Self::new(0);
    /// `errSecItemNotFound`.
    pub const ITEM_NOT_FOUND: Self = Self::new(-25300);
    /// `errSecDuplicateItem`.
    pub const DUPLICATE_ITEM: Self = Self::new(-25299);
    /// `errSecInternalComponent`.
    pub const INTERNAL_COMPONENT: Self = Self::new(-2070);

    /// Wraps a raw status code.
    #[must_use]
    pub const fn new(code: i32) -> Self {
        Self { code }
    }

    /// Returns `true` for [`VaultStatus::SUCCESS`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.code == Self::SUCCESS.code
    }

    /// Returns `true` for [`VaultStatus::ITEM_NOT_FOUND`].
    #[must_use]
    pub const fn is_not_found(self) -> bool {
        self.code == Self::ITEM_NOT_FOUND.code
    }
}

impl fmt::Display for VaultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// Error raised when the vault reports a non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Error, uniffi::Error)]
pub enum VaultError {
    /// The vault returned `status`.
    #[error("vault returned status {status}")]
    Status {
        /// Status reported by the vault.
        status: VaultStatus,
    },
}

impl VaultError {
    /// Returns the status carried by this error.
    #[must_use]
    pub const fn status(&self) -> VaultStatus {
        match self {
            Self::Status { status } => *status,
        }
    }

    /// Returns `true` if the vault reported that nothing matched.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status().is_not_found()
    }
}

impl From<VaultStatus> for VaultError {
    fn from(status: VaultStatus) -> Self {
        Self::Status { status }
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for VaultError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        log::error!("foreign vault callback failed: {}", error.reason);
        Self::Status {
            status: VaultStatus::INTERNAL_COMPONENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::from(VaultStatus::DUPLICATE_ITEM);
        assert_eq!(err.to_string(), "vault returned status -25299");
        assert_eq!(err.status(), VaultStatus::DUPLICATE_ITEM);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_status_classification() {
        assert!(VaultStatus::new(0).is_success());
        assert!(VaultStatus::new(-25300).is_not_found());
        assert!(!VaultStatus::new(-34018).is_success());
        assert!(!VaultStatus::new(-34018).is_not_found());
    }
}
