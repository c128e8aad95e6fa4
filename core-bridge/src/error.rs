use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeCoreError {
    #[error("Invalid bridge configuration: {0}")]
    Runtime(#[from] core_runtime::Error),
}

pub type Result<T> = std::result::Result<T, BridgeCoreError>;
