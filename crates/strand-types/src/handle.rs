//! Handle name and owner identity validation.
//!
//! Valid handle names:
//! - Must be non-empty and at most [`MAX_HANDLE_LEN`] bytes
//! - Must not contain whitespace or control characters
//! - Must not contain `/`, `\`, `:`, `?`, `*`, `[`, `]`, `~`, `^`, `@`
//! - Must not contain `..`
//! - Must not start or end with `.`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Longest accepted handle name, in bytes.
pub const MAX_HANDLE_LEN: usize = 64;

const FORBIDDEN_CHARS: &[char] = &['/', '\\', ':', '?', '*', '[', ']', '~', '^', '@'];

/// Validate a handle name, returning `Ok(())` if valid.
///
/// ```
/// use strand_types::validate_handle;
///
/// assert!(validate_handle("alice").is_ok());
/// assert!(validate_handle("news.daily").is_ok());
/// assert!(validate_handle("").is_err());
/// assert!(validate_handle("a/b").is_err());
/// ```
pub fn validate_handle(name: &str) -> Result<(), TypeError> {
    let invalid = |reason: String| TypeError::InvalidHandle {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("handle must not be empty".into()));
    }
    if name.len() > MAX_HANDLE_LEN {
        return Err(invalid(format!("longer than {MAX_HANDLE_LEN} bytes")));
    }
    if let Some(ch) = name.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid(format!("contains whitespace or control character {ch:?}")));
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid(format!("contains forbidden character {ch:?}")));
    }
    if name.contains("..") {
        return Err(invalid("must not contain '..'".into()));
    }
    if name.starts_with('.') || name.ends_with('.') {
        return Err(invalid("must not start or end with '.'".into()));
    }
    Ok(())
}

/// Who owns a handle.
///
/// Identities are opaque to this crate (an account, a key fingerprint, a
/// user name); they only need to be non-empty and free of whitespace.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidIdentity(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identity {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.0
    }
}
