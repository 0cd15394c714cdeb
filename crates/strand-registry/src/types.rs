//! Core registry types: [`HandleRecord`] and [`RegistryOp`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strand_types::{Address, Identity};

/// Everything the registry knows about one handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleRecord {
    pub owner: Identity,
    /// Head node of the handle's chain. Persisted as `""` when empty.
    #[serde(default, with = "pointer_string")]
    pub pointer: Option<Address>,
    /// Arbitrary metadata about the handle.
    #[serde(default)]
    pub profile: Value,
}

impl HandleRecord {
    /// A freshly registered handle: no content, no profile.
    pub fn new(owner: Identity) -> Self {
        Self {
            owner,
            pointer: None,
            profile: Value::Null,
        }
    }
}

/// A state-changing registry operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RegistryOp {
    Register {
        handle: String,
    },
    SetPointer {
        handle: String,
        #[serde(default, with = "pointer_string")]
        pointer: Option<Address>,
    },
    SetProfile {
        handle: String,
        profile: Value,
    },
    SetOwner {
        handle: String,
        owner: Identity,
    },
}

impl RegistryOp {
    pub fn handle(&self) -> &str {
        match self {
            Self::Register { handle }
            | Self::SetPointer { handle, .. }
            | Self::SetProfile { handle, .. }
            | Self::SetOwner { handle, .. } => handle,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::SetPointer { .. } => "set_pointer",
            Self::SetProfile { .. } => "set_profile",
            Self::SetOwner { .. } => "set_owner",
        }
    }
}

/// Serde adapter mapping `None` to the empty string and back.
mod pointer_string {
    use serde::{Deserialize, Deserializer, Serializer};
    use strand_types::Address;

    pub fn serialize<S: Serializer>(pointer: &Option<Address>, s: S) -> Result<S::Ok, S::Error> {
        match pointer {
            Some(address) => s.collect_str(address),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Address>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        if raw.is_empty() {
            return Ok(None);
        }
        Address::parse(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
