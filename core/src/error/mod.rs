pub mod cli;
pub mod dispatch;
pub mod harness;

pub use cli::CliError;
pub use dispatch::{DispatchError, TransportError};
pub use harness::{HarnessError, StorageError};
