use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use strand_types::Address;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::hasher::is_hex_digest;
use crate::object::{ObjectKind, StoredObject};
use crate::traits::{check_scheme, Storage};

/// Scheme used by [`DirectoryStorage::new`].
pub const FILE_SCHEME: &str = "file";

/// Store that keeps each object in its own file under a root directory.
///
/// Layout mirrors a git loose-object directory, one tree per kind:
///
/// ```text
/// <root>/data/ab/cdef...     raw content
/// <root>/objects/12/3456...  encoded JSON objects
/// ```
///
/// Files are written to a temporary name and renamed into place, so a reader
/// never observes a partially written object. Every read re-hashes the bytes.
pub struct DirectoryStorage {
    root: PathBuf,
    scheme: String,
    tmp_counter: AtomicU64,
}

impl DirectoryStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_scheme(root, FILE_SCHEME)
    }

    pub fn with_scheme(root: impl Into<PathBuf>, scheme: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            scheme: scheme.into().to_ascii_lowercase(),
            tmp_counter: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, kind: ObjectKind, digest: &str) -> PathBuf {
        self.root
            .join(kind.as_str())
            .join(&digest[..2])
            .join(&digest[2..])
    }

    async fn put(&self, object: StoredObject) -> StoreResult<Address> {
        let digest = object.digest();
        let address = Address::new(&self.scheme, digest.clone())?;
        let path = self.object_path(object.kind, &digest);

        if tokio::fs::try_exists(&path).await? {
            debug!(address = %address.short(), "object already on disk");
            return Ok(address);
        }

        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        tokio::fs::create_dir_all(&dir).await?;

        let tmp = dir.join(format!(
            ".tmp-{}-{}",
            std::process::id(),
            self.tmp_counter.fetch_add(1, Ordering::Relaxed)
        ));
        if let Err(e) = tokio::fs::write(&tmp, &object.bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(
            address = %address.short(),
            kind = %object.kind,
            size = object.size(),
            "object written to disk"
        );
        Ok(address)
    }

    async fn get(&self, address: &Address, expected: ObjectKind) -> StoreResult<StoredObject> {
        check_scheme(&self.scheme, address)?;
        let digest = address.payload();
        if !is_hex_digest(digest) {
            return Err(StoreError::NotFound(address.clone()));
        }

        let bytes = match tokio::fs::read(self.object_path(expected, digest)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(self.missing(address, expected).await);
            }
            Err(e) => return Err(e.into()),
        };

        let object = StoredObject {
            kind: expected,
            bytes,
        };
        let computed = object.digest();
        if computed != digest {
            warn!(address = %address, computed = %computed, "stored object failed hash check");
            return Err(StoreError::HashMismatch {
                address: address.clone(),
                computed,
            });
        }
        Ok(object)
    }

    /// Error for an object absent from the `expected` tree.
    async fn missing(&self, address: &Address, expected: ObjectKind) -> StoreError {
        let other = match expected {
            ObjectKind::Data => ObjectKind::Object,
            ObjectKind::Object => ObjectKind::Data,
        };
        match tokio::fs::try_exists(self.object_path(other, address.payload())).await {
            Ok(true) => StoreError::KindMismatch {
                address: address.clone(),
                expected,
                found: other,
            },
            _ => StoreError::NotFound(address.clone()),
        }
    }
}

#[async_trait]
impl Storage for DirectoryStorage {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    async fn write_data(&self, data: &[u8]) -> StoreResult<Address> {
        self.put(StoredObject::data(data.to_vec())).await
    }

    async fn read_data(&self, address: &Address) -> StoreResult<Vec<u8>> {
        Ok(self.get(address, ObjectKind::Data).await?.bytes)
    }

    async fn write_object(&self, value: &Value) -> StoreResult<Address> {
        self.put(StoredObject::object(value)?).await
    }

    async fn read_object(&self, address: &Address) -> StoreResult<Value> {
        self.get(address, ObjectKind::Object).await?.decode_object()
    }
}

impl std::fmt::Debug for DirectoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryStorage")
            .field("root", &self.root)
            .field("scheme", &self.scheme)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn write_and_read_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStorage::new(dir.path());
        let address = store.write_data(b"on disk").await.unwrap();
        assert_eq!(address.scheme(), "file");
        assert_eq!(store.read_data(&address).await.unwrap(), b"on disk");

        let digest = address.payload();
        let path = dir.path().join("data").join(&digest[..2]).join(&digest[2..]);
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn objects_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let value = json!({"title": "persisted"});
        let address = DirectoryStorage::new(dir.path())
            .write_object(&value)
            .await
            .unwrap();

        let reopened = DirectoryStorage::new(dir.path());
        assert_eq!(reopened.read_object(&address).await.unwrap(), value);
    }

    #[tokio::test]
    async fn rewrite_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStorage::new(dir.path());
        let a = store.write_data(b"same").await.unwrap();
        let b = store.write_data(b"same").await.unwrap();
        assert_eq!(a, b);

        let digest = a.payload();
        let shard = dir.path().join("data").join(&digest[..2]);
        let files: Vec<_> = std::fs::read_dir(shard).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn corruption_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStorage::new(dir.path());
        let address = store.write_data(b"original").await.unwrap();

        let digest = address.payload();
        let path = dir.path().join("data").join(&digest[..2]).join(&digest[2..]);
        std::fs::write(&path, b"tampered").unwrap();

        let err = store.read_data(&address).await.unwrap_err();
        assert!(matches!(err, StoreError::HashMismatch { .. }));
    }

    #[tokio::test]
    async fn missing_and_malformed_payloads_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStorage::new(dir.path());

        let absent = Address::new("file", "ab".repeat(32)).unwrap();
        assert!(matches!(
            store.read_data(&absent).await,
            Err(StoreError::NotFound(_))
        ));

        let escape = Address::new("file", "../../etc/passwd").unwrap();
        assert!(matches!(
            store.read_data(&escape).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn kind_mismatch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStorage::new(dir.path());
        let address = store.write_object(&json!([1, 2, 3])).await.unwrap();
        let err = store.read_data(&address).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::KindMismatch {
                expected: ObjectKind::Data,
                found: ObjectKind::Object,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn foreign_scheme_is_unknown_protocol() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStorage::new(dir.path());
        let foreign = Address::parse("mem://abc").unwrap();
        assert!(store
            .read_object(&foreign)
            .await
            .unwrap_err()
            .is_unknown_protocol());
    }
}
