use std::fmt;
use std::str::FromStr;

use crate::error::PasskeepError;

/// Returns true if `s` is non-empty and made only of ASCII letters, digits,
/// `_` and `-`.
pub fn is_valid_secret_id(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// A secret identifier that has passed [`is_valid_secret_id`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SecretId(String);

impl SecretId {
    pub fn parse(s: &str) -> Result<Self, PasskeepError> {
        if is_valid_secret_id(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(PasskeepError::InvalidSecretId(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SecretId {
    type Err = PasskeepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for SecretId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
