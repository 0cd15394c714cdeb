use thiserror::Error;

/// Errors produced by type parsing and validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("invalid handle name {name:?}: {reason}")]
    InvalidHandle { name: String, reason: String },

    #[error("invalid identity {0:?}")]
    InvalidIdentity(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
