use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::hasher::ContentHasher;

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Raw content bytes, never interpreted by the store.
    Data,
    /// A JSON value encoded with [`encode_object`].
    Object,
}

impl ObjectKind {
    pub fn hasher(&self) -> &'static ContentHasher {
        match self {
            Self::Data => &ContentHasher::DATA,
            Self::Object => &ContentHasher::OBJECT,
        }
    }

    /// Name used for on-disk directories.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Object => "objects",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Data => write!(f, "data"),
            Self::Object => write!(f, "object"),
        }
    }
}

/// A stored object: kind tag plus its bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub bytes: Vec<u8>,
}

impl StoredObject {
    pub fn data(bytes: Vec<u8>) -> Self {
        Self {
            kind: ObjectKind::Data,
            bytes,
        }
    }

    pub fn object(value: &Value) -> StoreResult<Self> {
        Ok(Self {
            kind: ObjectKind::Object,
            bytes: encode_object(value)?,
        })
    }

    /// Hex digest this object is addressed by.
    pub fn digest(&self) -> String {
        self.kind.hasher().hex_digest(&self.bytes)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn decode_object(&self) -> StoreResult<Value> {
        serde_json::from_slice(&self.bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

/// Canonical encoding of a JSON object: compact, keys sorted.
///
/// `serde_json::Map` keeps keys ordered, so equal values always encode to
/// equal bytes and therefore to equal addresses.
pub fn encode_object(value: &Value) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| StoreError::Serialization(e.to_string()))
}
