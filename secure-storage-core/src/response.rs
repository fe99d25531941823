//! Status-folding result shape for bridge callers.

use crate::{VaultResult, VaultStatus};

/// Status-folding result shape for bridge callers that expect
/// `{ status, value }` instead of a thrown error.
///
/// `status` is always concrete: [`VaultStatus::SUCCESS`] for successful and
/// normalized not-found outcomes, the vault's own status otherwise. `value` is
/// `None` whenever `status` is not a success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<T> {
    /// Outcome reported to the caller.
    pub status: VaultStatus,
    /// Payload, if any.
    pub value: Option<T>,
}

impl<T> Response<T> {
    /// A successful response carrying `value`.
    #[must_use]
    pub const fn success(value: Option<T>) -> Self {
        Self {
            status: VaultStatus::SUCCESS,
            value,
        }
    }

    /// A failed response carrying `status`.
    #[must_use]
    pub const fn failure(status: VaultStatus) -> Self {
        Self {
            status,
            value: None,
        }
    }
}

impl<T> From<VaultResult<Option<T>>> for Response<T> {
    fn from(result: VaultResult<Option<T>>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(err) => Self::failure(err.status()),
        }
    }
}

impl From<VaultResult<()>> for Response<()> {
    fn from(result: VaultResult<()>) -> Self {
        Self::from(result.map(|()| None::<()>))
    }
}
