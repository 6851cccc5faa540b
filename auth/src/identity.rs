//! Test personas.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity class a request authenticates as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityClass {
    /// Ordinary member account.
    General,
    /// Pre-provisioned administrator account.
    Admin,
}

impl IdentityClass {
    /// Every identity class.
    pub const ALL: [Self; 2] = [Self::General, Self::Admin];

    /// Lowercase wire name (`general` / `admin`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Admin => "admin",
        }
    }

    /// Whether a throwaway account may be registered when no fixed account
    /// is configured. Admin accounts must be pre-provisioned.
    #[must_use]
    pub const fn allows_self_registration(self) -> bool {
        matches!(self, Self::General)
    }
}

impl fmt::Display for IdentityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown identity class name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown identity class: {0}")]
pub struct UnknownIdentity(pub String);

impl FromStr for IdentityClass {
    type Err = UnknownIdentity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownIdentity(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Admin".parse::<IdentityClass>(), Ok(IdentityClass::Admin));
        assert_eq!(" general ".parse::<IdentityClass>(), Ok(IdentityClass::General));
        assert!("seller".parse::<IdentityClass>().is_err());
    }

    #[test]
    fn test_only_general_self_registers() {
        assert!(IdentityClass::General.allows_self_registration());
        assert!(!IdentityClass::Admin.allows_self_registration());
    }
}
