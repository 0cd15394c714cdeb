//! Foundation types for Strand.
//!
//! Every other Strand crate depends on `strand-types`.
//!
//! # Key Types
//!
//! - [`Address`] -- `scheme://payload` locator of an object in a content-addressed store
//! - [`ChainNode`] -- one immutable, persisted step of a handle's history
//! - [`ChainEntry`] / [`HandleChain`] -- the caller-facing view of a chain
//! - [`Identity`] -- owner reference for a handle
//! - [`Clock`] -- timestamp source for new nodes

pub mod address;
pub mod clock;
pub mod error;
pub mod handle;
pub mod node;

pub use address::{Address, SCHEME_SEPARATOR};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::TypeError;
pub use handle::{validate_handle, Identity, MAX_HANDLE_LEN};
pub use node::{ChainEntry, ChainNode, HandleChain, Meta};
pub use uuid::Uuid;
