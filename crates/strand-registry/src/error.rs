//! Error types for registry operations.

use strand_types::{Identity, TypeError};
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The handle has never been registered.
    #[error("handle not registered: {handle}")]
    HandleNotRegistered { handle: String },

    /// Another identity already owns the handle.
    #[error("handle {handle} is already registered to {owner}")]
    AlreadyRegistered { handle: String, owner: Identity },

    /// The caller does not own the handle.
    #[error("{caller} is not the owner of {handle}")]
    Unauthorized { handle: String, caller: Identity },

    /// The handle name is invalid.
    #[error(transparent)]
    InvalidHandle(#[from] TypeError),

    /// The operation cannot be priced.
    #[error("estimation failed: {reason}")]
    Estimation { reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error during file-based registry operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Recast a refusal raised while simulating as [`RegistryError::Estimation`].
    ///
    /// I/O and serialization failures are backend errors and stay as they are.
    pub fn into_estimation(self) -> Self {
        match self {
            err @ (Self::HandleNotRegistered { .. }
            | Self::AlreadyRegistered { .. }
            | Self::Unauthorized { .. }
            | Self::InvalidHandle(_)) => Self::Estimation {
                reason: err.to_string(),
            },
            other => other,
        }
    }
}

/// Convenience type alias for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
