//! Vault implementations.
//!
//! The store only depends on the [`Vault`](crate::Vault) trait. This module
//! provides the implementations shipped with the crate:
//!
//! - [`MemoryVault`]: in-memory vault with keychain matching semantics, for
//!   tests and hosts without a platform vault
//! - [`KeychainVault`]: Keychain Services (Apple targets only)
//!
//! Other platforms implement [`Vault`](crate::Vault) on the foreign side of
//! the bridge and pass it to [`SecureStorage`](crate::ffi::SecureStorage).

pub mod memory;

pub use memory::MemoryVault;

/// Keychain Services implementation for Apple platforms.
#[cfg(target_vendor = "apple")]
pub mod apple;

#[cfg(target_vendor = "apple")]
pub use apple::KeychainVault;
