use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("chain error: {0}")]
    Chain(#[from] strand_chain::ChainError),

    #[error("store error: {0}")]
    Store(#[from] strand_store::StoreError),

    #[error("registry error: {0}")]
    Registry(#[from] strand_registry::RegistryError),

    #[error(transparent)]
    Type(#[from] strand_types::TypeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
