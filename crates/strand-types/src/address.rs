use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Separator between the scheme and the payload of an address.
pub const SCHEME_SEPARATOR: &str = "://";

/// Location of an object in some content-addressed store.
///
/// An `Address` has the form `scheme://payload`. The scheme selects the
/// storage backend that can resolve the payload; the payload is opaque to
/// everything except that backend (usually a hex digest of the content).
/// Schemes follow URL scheme syntax and are normalized to lowercase.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    scheme: String,
    payload: String,
}

impl Address {
    /// Build an address from its parts, validating both.
    pub fn new(scheme: &str, payload: impl Into<String>) -> Result<Self, TypeError> {
        let payload = payload.into();
        let scheme = scheme.to_ascii_lowercase();
        let input = || format!("{scheme}{SCHEME_SEPARATOR}{payload}");

        validate_scheme(&scheme).map_err(|reason| TypeError::InvalidAddress {
            input: input(),
            reason,
        })?;
        if payload.is_empty() {
            return Err(TypeError::InvalidAddress {
                input: input(),
                reason: "payload must not be empty".into(),
            });
        }
        if payload.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidAddress {
                input: input(),
                reason: "payload must not contain whitespace".into(),
            });
        }

        Ok(Self { scheme, payload })
    }

    /// Parse a `scheme://payload` string.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let (scheme, payload) =
            s.split_once(SCHEME_SEPARATOR)
                .ok_or_else(|| TypeError::InvalidAddress {
                    input: s.to_string(),
                    reason: format!("missing '{SCHEME_SEPARATOR}' separator"),
                })?;
        Self::new(scheme, payload)
    }

    /// The protocol prefix, e.g. `mem` or `file`.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Everything after the separator.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Short form for logs: scheme plus the first 8 payload characters.
    pub fn short(&self) -> String {
        let end = self
            .payload
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.payload.len());
        format!("{}{}{}", self.scheme, SCHEME_SEPARATOR, &self.payload[..end])
    }
}

fn validate_scheme(scheme: &str) -> Result<(), String> {
    let mut chars = scheme.chars();
    match chars.next() {
        None => return Err("scheme must not be empty".into()),
        Some(first) if !first.is_ascii_alphabetic() => {
            return Err(format!("scheme must start with a letter, found {first:?}"));
        }
        Some(_) => {}
    }
    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))) {
        return Err(format!("scheme contains forbidden character {bad:?}"));
    }
    Ok(())
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.scheme, SCHEME_SEPARATOR, self.payload)
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_splits_scheme_and_payload() {
        let addr = Address::parse("mem://abcdef").unwrap();
        assert_eq!(addr.scheme(), "mem");
        assert_eq!(addr.payload(), "abcdef");
    }

    #[test]
    fn scheme_is_lowercased() {
        let addr = Address::parse("IPFS://QmHash").unwrap();
        assert_eq!(addr.scheme(), "ipfs");
        assert_eq!(addr.to_string(), "ipfs://QmHash");
    }

    #[test]
    fn payload_may_contain_separator() {
        let addr = Address::parse("http://example.org/a://b").unwrap();
        assert_eq!(addr.scheme(), "http");
        assert_eq!(addr.payload(), "example.org/a://b");
    }

    #[test]
    fn missing_separator_is_rejected() {
        let err = Address::parse("mem:abc").unwrap_err();
        assert!(matches!(err, TypeError::InvalidAddress { .. }));
    }

    #[test]
    fn bad_schemes_are_rejected() {
        assert!(Address::parse("://abc").is_err());
        assert!(Address::parse("1mem://abc").is_err());
        assert!(Address::parse("me m://abc").is_err());
        assert!(Address::parse("me_m://abc").is_err());
    }

    #[test]
    fn empty_or_spaced_payload_is_rejected() {
        assert!(Address::parse("mem://").is_err());
        assert!(Address::parse("mem://a b").is_err());
    }

    #[test]
    fn short_truncates_payload() {
        let addr = Address::new("mem", "0123456789abcdef").unwrap();
        assert_eq!(addr.short(), "mem://01234567");
        let tiny = Address::new("mem", "ab").unwrap();
        assert_eq!(tiny.short(), "mem://ab");
    }

    #[test]
    fn serializes_as_string() {
        let addr = Address::parse("file://deadbeef").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"file://deadbeef\"");
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn deserializing_garbage_fails() {
        let result: Result<Address, _> = serde_json::from_str("\"not an address\"");
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn display_parse_is_identity(
            scheme in "[a-z][a-z0-9+.-]{0,8}",
            payload in "[A-Za-z0-9_/.-]{1,40}",
        ) {
            let addr = Address::new(&scheme, payload.clone()).unwrap();
            let reparsed = Address::parse(&addr.to_string()).unwrap();
            prop_assert_eq!(reparsed.scheme(), scheme.as_str());
            prop_assert_eq!(reparsed.payload(), payload.as_str());
        }
    }
}
