//! Keychain Services vault.
//!
//! Each [`Query`] is rendered into a `CFDictionary` of `kSec*` attributes and
//! handed to `SecItemCopyMatching`, `SecItemAdd`, `SecItemUpdate` or
//! `SecItemDelete`. Attributes absent from the query are absent from the
//! dictionary. Non-success `OSStatus` codes are returned unchanged.
//!
//! Protection and access control are enforced by the keychain itself.

use std::ptr;

use core_foundation::array::{CFArray, CFArrayRef};
use core_foundation::base::{CFType, CFTypeRef, TCFType};
use core_foundation::boolean::CFBoolean;
use core_foundation::data::CFData;
use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
use core_foundation::string::{CFString, CFStringRef};
use security_framework_sys::access_control::{
    kSecAttrAccessibleAfterFirstUnlock, kSecAttrAccessibleAfterFirstUnlockThisDeviceOnly,
    kSecAttrAccessibleWhenPasscodeSetThisDeviceOnly, kSecAttrAccessibleWhenUnlocked,
    kSecAttrAccessibleWhenUnlockedThisDeviceOnly,
};
use security_framework_sys::base::errSecSuccess;
use security_framework_sys::item::{
    kSecAttrAccessGroup, kSecAttrAccount, kSecAttrService, kSecAttrSynchronizable, kSecClass,
    kSecClassGenericPassword, kSecMatchLimit, kSecMatchLimitAll, kSecReturnAttributes,
    kSecReturnData, kSecValueData,
};
use security_framework_sys::keychain_item::{
    SecItemAdd, SecItemCopyMatching, SecItemDelete, SecItemUpdate,
};

use crate::{
    AccessibilityPolicy, ItemClass, ItemUpdate, MatchLimit, Query, Vault, VaultRecord,
    VaultResult, VaultStatus,
};

// Declared here rather than imported so the crate does not depend on which
// deployment-target features security-framework-sys was built with.
#[link(name = "Security", kind = "framework")]
extern "C" {
    static kSecAttrAccessible: CFStringRef;
    static kSecMatchLimitOne: CFStringRef;
    static kSecUseDataProtectionKeychain: CFStringRef;
}

type Attributes = Vec<(CFString, CFType)>;

/// [`Vault`] backed by the system keychain.
///
/// Stateless; the keychain synchronizes individual calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeychainVault;

impl KeychainVault {
    /// Creates a keychain vault.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Vault for KeychainVault {
    fn copy_matching(&self, query: Query) -> VaultResult<Vec<VaultRecord>> {
        let params = dictionary(query_attributes(&query));
        let mut result: CFTypeRef = ptr::null();
        // SAFETY: `params` is a valid dictionary and `result` a valid out pointer.
        let status = unsafe { SecItemCopyMatching(params.as_concrete_TypeRef(), &mut result) };
        check("SecItemCopyMatching", status)?;

        if result.is_null() {
            return Ok(Vec::new());
        }
        // SAFETY: SecItemCopyMatching follows the create rule for `result`.
        let result = unsafe { CFType::wrap_under_create_rule(result) };
        Ok(records(&result))
    }

    fn add(&self, query: Query) -> VaultResult<()> {
        let params = dictionary(query_attributes(&query));
        // SAFETY: `params` is a valid dictionary; no result is requested.
        let status = unsafe { SecItemAdd(params.as_concrete_TypeRef(), ptr::null_mut()) };
        check("SecItemAdd", status)
    }

    fn update(&self, query: Query, changes: ItemUpdate) -> VaultResult<()> {
        let params = dictionary(query_attributes(&query));
        let changes = dictionary(update_attributes(&changes));
        // SAFETY: both dictionaries are valid for the duration of the call.
        let status =
            unsafe { SecItemUpdate(params.as_concrete_TypeRef(), changes.as_concrete_TypeRef()) };
        check("SecItemUpdate", status)
    }

    fn delete(&self, query: Query) -> VaultResult<()> {
        let params = dictionary(query_attributes(&query));
        // SAFETY: `params` is a valid dictionary.
        let status = unsafe { SecItemDelete(params.as_concrete_TypeRef()) };
        check("SecItemDelete", status)
    }
}

fn check(call: &str, status: i32) -> VaultResult<()> {
    if status == errSecSuccess {
        return Ok(());
    }
    log::debug!(
        "{call} returned {status}: {}",
        security_framework::base::Error::from_code(status)
    );
    Err(VaultStatus::new(status).into())
}

fn key(raw: CFStringRef) -> CFString {
    // SAFETY: `raw` is one of the Security framework's static attribute keys.
    unsafe { CFString::wrap_under_get_rule(raw) }
}

fn dictionary(attributes: Attributes) -> CFDictionary<CFString, CFType> {
    CFDictionary::from_CFType_pairs(&attributes)
}

/// Attribute keys and values exported by the Security framework.
struct Keys {
    class: CFString,
    generic_password: CFString,
    accessible: CFString,
    data_protection: CFString,
    synchronizable: CFString,
    return_data: CFString,
    return_attributes: CFString,
    account: CFString,
    access_group: CFString,
    service: CFString,
    match_limit: CFString,
    match_one: CFString,
    match_all: CFString,
    value_data: CFString,
}

impl Keys {
    fn load() -> Self {
        // SAFETY: the Security framework exports these as immutable statics
        // that stay valid for the lifetime of the process.
        unsafe {
            Self {
                class: key(kSecClass),
                generic_password: key(kSecClassGenericPassword),
                accessible: key(kSecAttrAccessible),
                data_protection: key(kSecUseDataProtectionKeychain),
                synchronizable: key(kSecAttrSynchronizable),
                return_data: key(kSecReturnData),
                return_attributes: key(kSecReturnAttributes),
                account: key(kSecAttrAccount),
                access_group: key(kSecAttrAccessGroup),
                service: key(kSecAttrService),
                match_limit: key(kSecMatchLimit),
                match_one: key(kSecMatchLimitOne),
                match_all: key(kSecMatchLimitAll),
                value_data: key(kSecValueData),
            }
        }
    }
}

fn query_attributes(query: &Query) -> Attributes {
    let keys = Keys::load();
    let class = match query.class {
        ItemClass::GenericPassword => keys.generic_password.clone(),
    };

    let mut attributes: Attributes = vec![
        (keys.class.clone(), class.into_CFType()),
        (
            keys.accessible.clone(),
            accessibility_value(query.accessibility).into_CFType(),
        ),
    ];

    let flags = [
        (&keys.data_protection, query.use_data_protection_keychain),
        (&keys.synchronizable, query.synchronizable),
        (&keys.return_data, query.return_data),
        (&keys.return_attributes, query.return_attributes),
    ];
    for (name, flag) in flags {
        if let Some(flag) = flag {
            attributes.push((name.clone(), CFBoolean::from(flag).into_CFType()));
        }
    }

    let strings = [
        (&keys.account, query.account.as_deref()),
        (&keys.access_group, query.access_group.as_deref()),
        (&keys.service, query.service.as_deref()),
    ];
    for (name, value) in strings {
        if let Some(value) = value {
            attributes.push((name.clone(), CFString::new(value).into_CFType()));
        }
    }

    if let Some(limit) = query.match_limit {
        let limit = match limit {
            MatchLimit::One => &keys.match_one,
            MatchLimit::All => &keys.match_all,
        };
        attributes.push((keys.match_limit.clone(), limit.clone().into_CFType()));
    }

    if let Some(data) = &query.value_data {
        attributes.push((
            keys.value_data.clone(),
            CFData::from_buffer(data).into_CFType(),
        ));
    }

    attributes
}

fn update_attributes(changes: &ItemUpdate) -> Attributes {
    let keys = Keys::load();
    let mut attributes = Attributes::new();

    if let Some(data) = &changes.value_data {
        attributes.push((keys.value_data, CFData::from_buffer(data).into_CFType()));
    }
    if let Some(accessibility) = changes.accessibility {
        attributes.push((
            keys.accessible,
            accessibility_value(accessibility).into_CFType(),
        ));
    }
    if let Some(synchronizable) = changes.synchronizable {
        attributes.push((
            keys.synchronizable,
            CFBoolean::from(synchronizable).into_CFType(),
        ));
    }

    attributes
}

fn accessibility_value(policy: AccessibilityPolicy) -> CFString {
    // SAFETY: reading immutable extern statics exported by the Security framework.
    let raw = unsafe {
        match policy {
            AccessibilityPolicy::Passcode => kSecAttrAccessibleWhenPasscodeSetThisDeviceOnly,
            AccessibilityPolicy::WhenUnlocked => kSecAttrAccessibleWhenUnlocked,
            AccessibilityPolicy::WhenUnlockedThisDeviceOnly => {
                kSecAttrAccessibleWhenUnlockedThisDeviceOnly
            }
            AccessibilityPolicy::AfterFirstUnlock => kSecAttrAccessibleAfterFirstUnlock,
            AccessibilityPolicy::AfterFirstUnlockThisDeviceOnly => {
                kSecAttrAccessibleAfterFirstUnlockThisDeviceOnly
            }
        }
    };
    key(raw)
}

/// Converts a `SecItemCopyMatching` result into records.
///
/// The result is raw data when only data was requested, a dictionary when
/// attributes were requested, and an array of either for `kSecMatchLimitAll`.
fn records(result: &CFType) -> Vec<VaultRecord> {
    if result.instance_of::<CFArray>() {
        // SAFETY: type checked above.
        let items: CFArray<CFType> =
            unsafe { CFArray::wrap_under_get_rule(result.as_CFTypeRef() as CFArrayRef) };
        return items.iter().filter_map(|item| record(&item)).collect();
    }
    record(result).into_iter().collect()
}

fn record(value: &CFType) -> Option<VaultRecord> {
    if let Some(data) = value.downcast::<CFData>() {
        return Some(VaultRecord {
            account: None,
            data: Some(data.bytes().to_vec()),
        });
    }
    if !value.instance_of::<CFDictionary>() {
        return None;
    }

    // SAFETY: type checked above.
    let attributes: CFDictionary<CFString, CFType> =
        unsafe { CFDictionary::wrap_under_get_rule(value.as_CFTypeRef() as CFDictionaryRef) };
    let keys = Keys::load();
    let account = attributes
        .find(&keys.account)
        .and_then(|account| account.downcast::<CFString>())
        .map(|account| account.to_string());
    let data = attributes
        .find(&keys.value_data)
        .and_then(|data| data.downcast::<CFData>())
        .map(|data| data.bytes().to_vec());

    Some(VaultRecord { account, data })
}
