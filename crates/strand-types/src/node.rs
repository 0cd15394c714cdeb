use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::address::Address;

/// Opaque per-entry metadata.
///
/// A sorted map so that a node always serializes to the same bytes, which
/// keeps node addresses deterministic.
pub type Meta = BTreeMap<String, serde_json::Value>;

/// One persisted step of a handle's history.
///
/// Nodes are immutable once written: the store derives their address from
/// their serialized form, so editing any field (including `previous`) yields
/// a different node at a different address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainNode {
    /// Address of the raw content bytes.
    pub content: Address,
    /// Stable identity of the logical item. Never regenerated by rebuilds.
    pub uuid: Uuid,
    /// Milliseconds since the UNIX epoch at first creation.
    pub timestamp: u64,
    #[serde(default)]
    pub meta: Meta,
    /// Address of the next-older node; absent for the oldest node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Address>,
}

impl ChainNode {
    /// A brand-new node with a fresh v7 uuid.
    pub fn create(
        content: Address,
        timestamp: u64,
        meta: Meta,
        previous: Option<Address>,
    ) -> Self {
        Self {
            content,
            uuid: Uuid::now_v7(),
            timestamp,
            meta,
            previous,
        }
    }

    /// The caller-facing view of this node.
    pub fn entry(&self) -> ChainEntry {
        ChainEntry {
            address: self.content.clone(),
            uuid: self.uuid,
            timestamp: self.timestamp,
            meta: self.meta.clone(),
        }
    }

    /// Same node linked onto a different predecessor.
    pub fn relinked(&self, previous: Option<Address>) -> Self {
        Self {
            previous,
            ..self.clone()
        }
    }
}

/// A chain entry as returned to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    /// Content address (not the node address).
    pub address: Address,
    pub uuid: Uuid,
    pub timestamp: u64,
    pub meta: Meta,
}

impl ChainEntry {
    /// Convenience accessor for a string-valued meta key.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.get(key).and_then(|v| v.as_str())
    }
}

/// A handle's chain as seen from its head: head node address plus entries,
/// newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleChain {
    pub head: Option<Address>,
    pub entries: Vec<ChainEntry>,
}

impl HandleChain {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The newest entry, if any.
    pub fn latest(&self) -> Option<&ChainEntry> {
        self.entries.first()
    }

    pub fn find(&self, uuid: &Uuid) -> Option<&ChainEntry> {
        self.entries.iter().find(|e| &e.uuid == uuid)
    }

    /// Entry uuids, newest first.
    pub fn uuids(&self) -> Vec<Uuid> {
        self.entries.iter().map(|e| e.uuid).collect()
    }
}
