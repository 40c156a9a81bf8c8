//! Token newtypes that never leak their value through `Debug`.

use std::fmt;

/// Short-lived bearer credential attached to authenticated calls.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Use only when constructing authorization headers or persisting.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// Longer-lived credential exchanged for a new access token.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Use only when constructing refresh requests or persisting.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_hide_value_in_debug() {
        let access = AccessToken::new("eyJhbGciOiJIUzI1NiJ9.access");
        let refresh = RefreshToken::new("refresh-secret");
        assert_eq!(format!("{:?}", access), "AccessToken(\"[REDACTED]\")");
        assert!(!format!("{:?}", refresh).contains("refresh-secret"));
        assert_eq!(access.as_str(), "eyJhbGciOiJIUzI1NiJ9.access");
    }
}
