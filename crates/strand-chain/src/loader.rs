use std::collections::HashSet;

use strand_store::{read_node, Storage};
use strand_types::{Address, ChainNode, HandleChain, Uuid};
use tracing::debug;

use crate::error::{ChainError, ChainResult};

/// A chain read back with its node bodies.
#[derive(Clone, Debug, Default)]
pub struct LoadedChain {
    pub head: Option<Address>,
    /// `(node address, node)`, newest first.
    pub nodes: Vec<(Address, ChainNode)>,
}

impl LoadedChain {
    /// Index of the node carrying `uuid`.
    pub fn position(&self, uuid: &Uuid) -> Option<usize> {
        self.nodes.iter().position(|(_, node)| &node.uuid == uuid)
    }

    pub fn to_chain(&self) -> HandleChain {
        HandleChain {
            head: self.head.clone(),
            entries: self.nodes.iter().map(|(_, node)| node.entry()).collect(),
        }
    }
}

/// Follow `previous` links from `head` until the oldest node.
pub async fn load_chain(storage: &dyn Storage, head: Option<Address>) -> ChainResult<LoadedChain> {
    let mut nodes = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = head.clone();

    while let Some(address) = cursor {
        if !seen.insert(address.clone()) {
            return Err(ChainError::CycleDetected { address });
        }
        let node = read_node(storage, &address).await?;
        cursor = node.previous.clone();
        nodes.push((address, node));
    }

    debug!(
        head = ?head.as_ref().map(Address::short),
        length = nodes.len(),
        "chain loaded"
    );
    Ok(LoadedChain { head, nodes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strand_store::{write_node, InMemoryStorage, StoreError};
    use strand_types::Meta;

    #[tokio::test]
    async fn empty_head_is_empty_chain() {
        let storage = InMemoryStorage::new();
        let chain = load_chain(&storage, None).await.unwrap();
        assert!(chain.nodes.is_empty());
        assert!(chain.to_chain().is_empty());
    }

    #[tokio::test]
    async fn walks_newest_first() {
        let storage = InMemoryStorage::new();
        let mut previous = None;
        for i in 0..3 {
            let content = storage.write_data(format!("c{i}").as_bytes()).await.unwrap();
            let node = ChainNode::create(content, i, Meta::new(), previous.take());
            previous = Some(write_node(&storage, &node).await.unwrap());
        }

        let chain = load_chain(&storage, previous).await.unwrap();
        let stamps: Vec<_> = chain.nodes.iter().map(|(_, n)| n.timestamp).collect();
        assert_eq!(stamps, vec![2, 1, 0]);
        assert!(chain.nodes.last().unwrap().1.previous.is_none());
    }

    /// Serves one node at every address, linked to itself.
    struct LoopStorage;

    #[async_trait::async_trait]
    impl Storage for LoopStorage {
        fn scheme(&self) -> &str {
            "loop"
        }

        async fn write_data(&self, _: &[u8]) -> strand_store::StoreResult<Address> {
            unimplemented!()
        }

        async fn read_data(&self, address: &Address) -> strand_store::StoreResult<Vec<u8>> {
            Err(StoreError::NotFound(address.clone()))
        }

        async fn write_object(&self, _: &serde_json::Value) -> strand_store::StoreResult<Address> {
            unimplemented!()
        }

        async fn read_object(&self, address: &Address) -> strand_store::StoreResult<serde_json::Value> {
            Ok(json!({
                "content": "loop://content",
                "uuid": Uuid::nil().to_string(),
                "timestamp": 1,
                "previous": address.to_string(),
            }))
        }
    }

    #[tokio::test]
    async fn self_loop_is_a_cycle() {
        let head = Address::parse("loop://a").unwrap();
        let err = load_chain(&LoopStorage, Some(head.clone())).await.unwrap_err();
        assert!(matches!(err, ChainError::CycleDetected { address } if address == head));
    }

    #[tokio::test]
    async fn missing_node_propagates_store_error() {
        let storage = InMemoryStorage::new();
        let dangling = Address::new("mem", "ff".repeat(32)).unwrap();
        let err = load_chain(&storage, Some(dangling)).await.unwrap_err();
        assert!(matches!(err, ChainError::Store(StoreError::NotFound(_))));
    }
}
