use thiserror::Error;

use super::dispatch::DispatchError;
use super::harness::{HarnessError, StorageError};
use crate::hostset::HostSetError;

/// Top-level error for the `fanout` binary.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),

    #[error("host spec: {0}")]
    HostSet(#[from] HostSetError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Harness(#[from] HarnessError),

    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
