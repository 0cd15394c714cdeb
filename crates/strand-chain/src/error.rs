use strand_registry::RegistryError;
use strand_store::StoreError;
use strand_types::Address;
use thiserror::Error;

/// Errors from chain engine operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The uuid to replace or remove is not in the handle's chain.
    #[error("{handle} handle does not need modification")]
    NotFound { handle: String },

    /// The operation cannot be priced in the chain's current state.
    #[error("estimation failed: {reason}")]
    Estimation { reason: String },

    /// Walking `previous` links revisited a node.
    #[error("cycle detected in chain at {address}")]
    CycleDetected { address: Address },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl ChainError {
    /// Recast an error raised while estimating.
    ///
    /// A missing target or a refused registry simulation means the operation
    /// cannot be priced. Backend failures stay as they are.
    pub fn into_estimation(self) -> Self {
        match self {
            err @ Self::NotFound { .. } => Self::Estimation {
                reason: err.to_string(),
            },
            Self::Registry(RegistryError::Estimation { reason }) => Self::Estimation { reason },
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message() {
        let err = ChainError::NotFound {
            handle: "news".into(),
        };
        assert_eq!(err.to_string(), "news handle does not need modification");
    }

    #[test]
    fn estimation_recasting() {
        let err = ChainError::NotFound {
            handle: "news".into(),
        }
        .into_estimation();
        assert!(
            matches!(err, ChainError::Estimation { ref reason } if reason.contains("news handle"))
        );

        let err = ChainError::from(RegistryError::Estimation {
            reason: "not owner".into(),
        })
        .into_estimation();
        assert!(matches!(err, ChainError::Estimation { .. }));

        let err = ChainError::from(StoreError::Serialization("x".into())).into_estimation();
        assert!(matches!(err, ChainError::Store(_)));
    }
}
