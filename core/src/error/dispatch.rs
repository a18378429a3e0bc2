use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by `Dispatcher::dispatch` itself. Per-host command
/// failures are not errors at this level; they are carried in the
/// `CommandResult` so all host results are collected before any decision.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("empty host set: dispatch requires at least one host")]
    EmptyHostSet,

    #[error("empty command")]
    EmptyCommand,

    #[error("dispatch timed out after {0:?} with incomplete results")]
    Timeout(Duration),

    #[error("dispatch runner failed: {0}")]
    Runner(String),
}

/// Failures of the connectivity layer, before a command exit status could be
/// observed. The dispatcher records these under the sentinel exit code; they
/// never abort the dispatch to other hosts.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("connection to {host} failed: {reason}")]
    Connection { host: String, reason: String },
}
