use serde::{Deserialize, Serialize};
use strand_types::{Address, ChainEntry, HandleChain};

/// Observable state of a chain task.
///
/// Filled in by execute: `written` as soon as the storage writes are done,
/// the rest once the pointer update lands (or, for a load, once the chain is
/// read).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainContext {
    pub handle: String,
    /// Head node address after the operation.
    pub head: Option<Address>,
    /// Chain entries after the operation, newest first.
    pub entries: Vec<ChainEntry>,
    /// Every storage address written, in write order.
    pub written: Vec<Address>,
    /// Whether the registry pointer was updated.
    pub committed: bool,
}

impl ChainContext {
    pub fn for_handle(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            ..Self::default()
        }
    }

    pub fn chain(&self) -> HandleChain {
        HandleChain {
            head: self.head.clone(),
            entries: self.entries.clone(),
        }
    }

    pub(crate) fn record_chain(&mut self, chain: &HandleChain) {
        self.head = chain.head.clone();
        self.entries = chain.entries.clone();
    }
}
