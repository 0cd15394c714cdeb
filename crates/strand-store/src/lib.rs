//! Content-addressed storage for Strand.
//!
//! Content bytes and chain nodes are stored as immutable objects identified
//! by a domain-separated BLAKE3 digest. The digest becomes the payload of an
//! [`Address`](strand_types::Address) whose scheme names the backend holding
//! the object.
//!
//! # Backends
//!
//! All backends implement the [`Storage`] trait:
//!
//! - [`InMemoryStorage`] -- `HashMap`-based store for tests and embedding
//! - [`DirectoryStorage`] -- one file per object under a root directory
//! - [`MultiStorage`] -- dispatches to a backend by address scheme
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. A write returns only once the object is readable at its address.
//! 3. Raw data and JSON objects live in separate namespaces.
//! 4. Concurrent reads are always safe.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod directory;
pub mod error;
pub mod hasher;
pub mod memory;
pub mod multi;
pub mod node;
pub mod object;
pub mod traits;

pub use directory::{DirectoryStorage, FILE_SCHEME};
pub use error::{StoreError, StoreResult};
pub use hasher::{is_hex_digest, ContentHasher};
pub use memory::{InMemoryStorage, MEMORY_SCHEME};
pub use multi::MultiStorage;
pub use node::{encoded_node_len, node_value, read_node, write_node};
pub use object::{encode_object, ObjectKind, StoredObject};
pub use traits::{check_scheme, Storage};
