//! Keychain accessibility policies and their wire literals.

use strum::{EnumString, IntoStaticStr};

/// Condition under which a stored entry may be read.
///
/// Each variant maps onto one `kSecAttrAccessible*` value. Accessibility is a
/// storage attribute and does not take part in an entry's identity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, IntoStaticStr, uniffi::Enum,
)]
pub enum AccessibilityPolicy {
    /// Readable only while a device passcode is set; never leaves the device.
    #[strum(serialize = "passcode")]
    Passcode,
    /// Readable while the device is unlocked.
    #[default]
    #[strum(serialize = "unlocked")]
    WhenUnlocked,
    /// Readable while the device is unlocked; never leaves the device.
    #[strum(serialize = "unlocked_this_device")]
    WhenUnlockedThisDeviceOnly,
    /// Readable after the first unlock following a restart.
    #[strum(serialize = "first_unlock")]
    AfterFirstUnlock,
    /// Readable after the first unlock following a restart; never leaves the device.
    #[strum(serialize = "first_unlock_this_device")]
    AfterFirstUnlockThisDeviceOnly,
}

impl AccessibilityPolicy {
    /// Resolves a caller-supplied policy literal.
    ///
    /// This never fails: an absent or unrecognized literal resolves to
    /// [`AccessibilityPolicy::WhenUnlocked`]. Literals are matched exactly.
    #[must_use]
    pub fn parse(literal: Option<&str>) -> Self {
        literal
            .and_then(|literal| literal.parse().ok())
            .unwrap_or_default()
    }

    /// Returns the literal this policy is parsed from.
    #[must_use]
    pub fn as_literal(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(Some("passcode"), AccessibilityPolicy::Passcode)]
    #[test_case(Some("unlocked"), AccessibilityPolicy::WhenUnlocked)]
    #[test_case(Some("unlocked_this_device"), AccessibilityPolicy::WhenUnlockedThisDeviceOnly)]
    #[test_case(Some("first_unlock"), AccessibilityPolicy::AfterFirstUnlock)]
    #[test_case(Some("first_unlock_this_device"), AccessibilityPolicy::AfterFirstUnlockThisDeviceOnly)]
    #[test_case(None, AccessibilityPolicy::WhenUnlocked ; "absent")]
    #[test_case(Some(""), AccessibilityPolicy::WhenUnlocked ; "empty")]
    #[test_case(Some("always"), AccessibilityPolicy::WhenUnlocked ; "unknown")]
    #[test_case(Some("Passcode"), AccessibilityPolicy::WhenUnlocked ; "case mismatch")]
    fn test_parse(literal: Option<&str>, expected: AccessibilityPolicy) {
        assert_eq!(AccessibilityPolicy::parse(literal), expected);
    }

    #[test]
    fn test_literal_round_trip() {
        let policy = AccessibilityPolicy::AfterFirstUnlockThisDeviceOnly;
        assert_eq!(policy.as_literal(), "first_unlock_this_device");
        assert_eq!(AccessibilityPolicy::parse(Some(policy.as_literal())), policy);
    }
}
