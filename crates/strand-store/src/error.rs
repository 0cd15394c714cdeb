use strand_types::{Address, TypeError};

use crate::object::ObjectKind;

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No backend is registered for the address scheme.
    #[error("unknown protocol: no storage registered for scheme {scheme:?}")]
    UnknownProtocol { scheme: String },

    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(Address),

    /// The address names an object of a different kind.
    #[error("{address} is {found}, expected {expected}")]
    KindMismatch {
        address: Address,
        expected: ObjectKind,
        found: ObjectKind,
    },

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {address}: computed {computed}")]
    HashMismatch { address: Address, computed: String },

    /// The object exists but cannot be decoded as the expected type.
    #[error("corrupt object {address}: {reason}")]
    CorruptObject { address: Address, reason: String },

    /// Serialization failure while encoding an object.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    InvalidAddress(#[from] TypeError),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for [`StoreError::UnknownProtocol`].
    pub fn is_unknown_protocol(&self) -> bool {
        matches!(self, Self::UnknownProtocol { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
