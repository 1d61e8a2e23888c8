//! Username validation and canonicalization
//!
//! Usernames are case-insensitive handles. Every storage path and
//! token operation works on the canonical lowercase form, so the
//! newtype only ever holds that form. Invalid input is rejected
//! before any I/O happens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum handle length in characters
pub const MIN_LEN: usize = 3;

/// Maximum handle length in characters
pub const MAX_LEN: usize = 20;

/// Why a username was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsernameError {
    #[error("username must be 3-20 characters, got {0}")]
    Length(usize),

    #[error("username contains invalid character {0:?}")]
    Character(char),
}

/// A validated, canonical (lowercase) username
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and canonicalize a raw handle.
    ///
    /// Accepts 3-20 characters of `[a-zA-Z0-9_-]` and lowercases the
    /// result. Anything else is rejected without touching storage.
    pub fn parse(raw: &str) -> Result<Self, UsernameError> {
        let len = raw.chars().count();
        if !(MIN_LEN..=MAX_LEN).contains(&len) {
            return Err(UsernameError::Length(len));
        }
        for c in raw.chars() {
            if !(c.is_ascii_alphanumeric() || c == '_' || c == '-') {
                return Err(UsernameError::Character(c));
            }
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// Canonical lowercase form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}
