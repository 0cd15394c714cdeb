//! Where a staged operation sends its storage writes.

use strand_store::{node_value, ContentHasher, Storage, StoreResult, StoredObject};
use strand_task::Cost;
use strand_types::{Address, ChainNode};

/// Destination of the writes an operation stages.
///
/// Execute stages against [`Writes::Commit`], which writes to storage.
/// Estimate stages the very same steps against [`Writes::DryRun`], which
/// prices each write and predicts the address a reference backend would
/// return, so the estimate covers exactly the writes execute performs.
pub(crate) enum Writes<'a> {
    Commit {
        storage: &'a dyn Storage,
        written: Vec<Address>,
    },
    DryRun {
        storage: &'a dyn Storage,
        cost: Cost,
    },
}

impl<'a> Writes<'a> {
    pub fn commit(storage: &'a dyn Storage) -> Self {
        Self::Commit {
            storage,
            written: Vec::new(),
        }
    }

    pub fn dry_run(storage: &'a dyn Storage) -> Self {
        Self::DryRun {
            storage,
            cost: Cost::ZERO,
        }
    }

    pub async fn data(&mut self, bytes: &[u8]) -> StoreResult<Address> {
        match self {
            Self::Commit { storage, written } => {
                let address = storage.write_data(bytes).await?;
                written.push(address.clone());
                Ok(address)
            }
            Self::DryRun { storage, cost } => {
                *cost += storage.write_cost(bytes.len());
                Ok(Address::new(
                    storage.scheme(),
                    ContentHasher::DATA.hex_digest(bytes),
                )?)
            }
        }
    }

    pub async fn node(&mut self, node: &ChainNode) -> StoreResult<Address> {
        match self {
            Self::Commit { storage, written } => {
                let address = strand_store::write_node(*storage, node).await?;
                written.push(address.clone());
                Ok(address)
            }
            Self::DryRun { storage, cost } => {
                let object = StoredObject::object(&node_value(node)?)?;
                *cost += storage.write_cost(object.bytes.len());
                Ok(Address::new(storage.scheme(), object.digest())?)
            }
        }
    }

    /// Addresses written so far (always empty for a dry run).
    pub fn written(&self) -> &[Address] {
        match self {
            Self::Commit { written, .. } => written,
            Self::DryRun { .. } => &[],
        }
    }

    /// Storage cost accumulated so far (always zero when committing).
    pub fn cost(&self) -> Cost {
        match self {
            Self::Commit { .. } => Cost::ZERO,
            Self::DryRun { cost, .. } => *cost,
        }
    }
}
