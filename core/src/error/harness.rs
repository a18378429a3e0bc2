use std::time::Duration;

use thiserror::Error;

use super::dispatch::DispatchError;

/// Errors from the storage CLI adapter (pool/container provisioning).
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with code {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("could not parse {what} from output: '{output}'")]
    UnexpectedOutput { what: String, output: String },
}

/// Errors from the smoke harness wrapped around the dispatcher.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("step '{label}' failed: error running '{command}' on the following hosts: {hosts}")]
    StepFailed {
        label: String,
        command: String,
        hosts: String,
    },

    #[error("mount at {mountpoint} not ready on hosts {hosts} within {timeout:?}")]
    MountNotReady {
        mountpoint: String,
        hosts: String,
        timeout: Duration,
    },

    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
