//! Smoke harness: builds the POSIX command sequence and drives it through
//! the dispatcher, converting any partial failure into a run failure with a
//! readable host list.

mod progress;
mod run;
mod scenario;

pub use progress::RunProgress;
pub use run::{run_scenario, RunOptions, ScenarioReport};
pub use scenario::{check_dir_exists, Scenario, ScenarioParams, Step};
