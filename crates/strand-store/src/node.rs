//! Typed access to chain nodes stored as JSON objects.

use serde_json::Value;
use strand_types::{Address, ChainNode};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::encode_object;
use crate::traits::Storage;

/// The JSON form a node is stored as.
pub fn node_value(node: &ChainNode) -> StoreResult<Value> {
    serde_json::to_value(node).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Number of bytes `node` occupies once encoded.
pub fn encoded_node_len(node: &ChainNode) -> StoreResult<usize> {
    Ok(encode_object(&node_value(node)?)?.len())
}

pub async fn write_node(storage: &dyn Storage, node: &ChainNode) -> StoreResult<Address> {
    let address = storage.write_object(&node_value(node)?).await?;
    debug!(
        node = %address.short(),
        uuid = %node.uuid,
        previous = ?node.previous.as_ref().map(Address::short),
        "chain node written"
    );
    Ok(address)
}

pub async fn read_node(storage: &dyn Storage, address: &Address) -> StoreResult<ChainNode> {
    let value = storage.read_object(address).await?;
    serde_json::from_value(value).map_err(|e| StoreError::CorruptObject {
        address: address.clone(),
        reason: format!("not a chain node: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStorage;
    use serde_json::json;
    use strand_types::Meta;

    #[tokio::test]
    async fn node_roundtrip() {
        let store = InMemoryStorage::new();
        let content = store.write_data(b"body").await.unwrap();
        let mut meta = Meta::new();
        meta.insert("title".into(), json!("first"));
        let node = ChainNode::create(content, 1_000, meta, None);

        let address = write_node(&store, &node).await.unwrap();
        assert_eq!(read_node(&store, &address).await.unwrap(), node);
    }

    #[tokio::test]
    async fn same_node_same_address() {
        let store = InMemoryStorage::new();
        let content = store.write_data(b"body").await.unwrap();
        let node = ChainNode::create(content, 1, Meta::new(), None);
        let a = write_node(&store, &node).await.unwrap();
        let b = write_node(&store, &node).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn relinking_changes_address() {
        let store = InMemoryStorage::new();
        let content = store.write_data(b"body").await.unwrap();
        let node = ChainNode::create(content.clone(), 1, Meta::new(), None);
        let relinked = node.relinked(Some(content));
        assert_ne!(
            write_node(&store, &node).await.unwrap(),
            write_node(&store, &relinked).await.unwrap()
        );
    }

    #[tokio::test]
    async fn non_node_object_is_corrupt() {
        let store = InMemoryStorage::new();
        let address = store.write_object(&json!({"hello": "world"})).await.unwrap();
        let err = read_node(&store, &address).await.unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn encoded_len_matches_encoding() {
        let node = ChainNode::create(Address::parse("mem://abc").unwrap(), 5, Meta::new(), None);
        let bytes = serde_json::to_vec(&node).unwrap();
        assert_eq!(encoded_node_len(&node).unwrap(), bytes.len());
    }
}
