//! fanout-core: parallel remote command dispatch and the POSIX mount smoke
//! harness built on top of it.
//!
//! The dispatcher fans a shell command out to a set of hosts over a
//! pluggable transport, aggregates the per-host exit codes, and classifies
//! the result as full success, partial failure or execution error. The
//! harness uses it to validate basic POSIX semantics on a freshly mounted
//! storage container.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod harness;
pub mod hostset;
pub mod storage;

pub use dispatch::{
    CommandResult, Dispatcher, ExecutionOutcome, HostReport, LocalTransport, SshTransport,
    Transport, SENTINEL_EXIT_CODE,
};
pub use error::{CliError, DispatchError, HarnessError, StorageError, TransportError};
pub use hostset::{HostSet, HostSetError};
