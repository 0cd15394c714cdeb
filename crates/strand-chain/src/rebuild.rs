//! Rebuilding a chain after an interior edit.
//!
//! Nodes are content-addressed, so editing node `k` changes its address,
//! which changes the `previous` field (and so the address) of every node
//! newer than `k`. A rebuild rewrites exactly that suffix, oldest first,
//! each node relinked to the address written just before it. Nodes older
//! than `k` are untouched.

use strand_store::StoreResult;
use strand_types::{Address, ChainEntry, ChainNode, HandleChain, Meta};
use tracing::debug;

use crate::loader::LoadedChain;
use crate::writes::Writes;

/// An interior edit at one node of a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    /// Swap the node's content and meta. Uuid, timestamp and `previous` stay.
    Replace { content: Address, meta: Meta },
    /// Drop the node; the next newer node links past it.
    Remove,
}

/// The writes a rebuild will perform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebuildPlan {
    /// Address the first rewritten node links to.
    pub base: Option<Address>,
    /// Nodes to write, oldest first. Their `previous` is reset on write.
    pub nodes: Vec<ChainNode>,
    /// Entries below `base`, newest first.
    pub untouched: Vec<ChainEntry>,
}

impl RebuildPlan {
    /// Plan `edit` at `index` (0 is the head) of `chain`.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub fn new(chain: &LoadedChain, index: usize, edit: Edit) -> Self {
        let (_, target) = &chain.nodes[index];
        let base = target.previous.clone();

        let mut nodes = Vec::with_capacity(index + 1);
        if let Edit::Replace { content, meta } = edit {
            nodes.push(ChainNode {
                content,
                meta,
                ..target.clone()
            });
        }
        nodes.extend(chain.nodes[..index].iter().rev().map(|(_, node)| node.clone()));

        let untouched = chain.nodes[index + 1..]
            .iter()
            .map(|(_, node)| node.entry())
            .collect();

        Self {
            base,
            nodes,
            untouched,
        }
    }

    /// Number of node writes the plan performs.
    pub fn node_writes(&self) -> usize {
        self.nodes.len()
    }

    /// Write the plan's nodes in order and return the resulting chain.
    ///
    /// With no nodes to write (removing the head) the new head is `base`.
    pub(crate) async fn apply(self, writes: &mut Writes<'_>) -> StoreResult<HandleChain> {
        let mut below = self.base;
        let mut rebuilt = Vec::with_capacity(self.nodes.len());

        for node in self.nodes {
            let node = node.relinked(below.take());
            let address = writes.node(&node).await?;
            debug!(
                uuid = %node.uuid,
                node = %address.short(),
                "chain node rebuilt"
            );
            rebuilt.push(node.entry());
            below = Some(address);
        }

        rebuilt.reverse();
        rebuilt.extend(self.untouched);
        Ok(HandleChain {
            head: below,
            entries: rebuilt,
        })
    }
}
