//! Distributed command dispatch.
//!
//! ```text
//! HostSet + command + timeout
//!   ↓
//! Dispatcher::dispatch(), concurrent fan-out over a Transport
//!   ↓
//! CommandResult { host → exit code } → ExecutionOutcome
//! ```

mod runner;
mod transport;
mod types;

pub use runner::{Dispatcher, DEFAULT_MAX_CONCURRENCY};
pub use transport::{LocalTransport, SshTransport, Transport, DEFAULT_CAPTURE_BYTES};
pub use types::{CommandResult, ExecutionOutcome, ExitReport, HostReport, SENTINEL_EXIT_CODE};
