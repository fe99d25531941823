//! Key-value secure storage over the platform credential vault.
//!
//! `secure-storage-core` exposes exists / read / read-all / write / delete /
//! delete-all over a protected credential vault such as Keychain Services.
//! Each call is translated into the vault's attribute query model by
//! [`QueryBuilder`] and the vault's native status codes are mapped back into
//! a small taxonomy: success, normalized not-found, and [`VaultError`].
//!
//! ```rust
//! use std::sync::Arc;
//! use secure_storage_core::{platform::MemoryVault, CredentialStore, Scope, StorageConfig};
//!
//! let store = CredentialStore::new(Arc::new(MemoryVault::new()), StorageConfig::default());
//! let scope = Scope::default().with_account_name("com.example.app");
//!
//! store.write("token", "s3cr3t", &scope).unwrap();
//! assert_eq!(store.read("token", &scope).unwrap().as_deref(), Some("s3cr3t"));
//! ```

mod accessibility;
pub use accessibility::AccessibilityPolicy;

mod config;
pub use config::StorageConfig;

mod error;
pub use error::*;

mod query;
pub use query::{ItemClass, ItemUpdate, MatchLimit, Query, QueryBuilder, Scope};

mod response;
pub use response::Response;

mod store;
pub use store::CredentialStore;

mod vault;
pub use vault::{Vault, VaultRecord};

pub mod ffi;
pub mod logger;
pub mod platform;

uniffi::setup_scaffolding!("secure_storage_core");
