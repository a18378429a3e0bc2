use std::time::{Duration, Instant};

use super::progress::RunProgress;
use super::scenario::Scenario;
use crate::dispatch::{Dispatcher, ExecutionOutcome};
use crate::error::HarnessError;
use crate::hostset::HostSet;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Per-step dispatch timeout
    pub step_timeout: Duration,
    pub progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_secs(30),
            progress: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub steps_run: usize,
    pub duration_ms: u64,
}

/// Run scenario steps in order, each fanned out to every host.
///
/// Steps are ordered POSIX operations (a file must be written before its size
/// is checked), so they run sequentially; only hosts within a step run in
/// parallel. The run stops at the first step where any host disagrees, and
/// the error names the step, the command and the failing hosts.
pub async fn run_scenario(
    dispatcher: &Dispatcher,
    hosts: &HostSet,
    scenario: &Scenario,
    opts: &RunOptions,
) -> Result<ScenarioReport, HarnessError> {
    let start = Instant::now();
    let progress = RunProgress::new(scenario.steps.len(), opts.progress);
    let mut steps_run = 0usize;

    for step in &scenario.steps {
        progress.start_step(&step.label);
        tracing::info!(step = %step.label, command = %step.command, "running step");

        let result = dispatcher
            .dispatch(hosts, &step.command, opts.step_timeout)
            .await?;
        steps_run += 1;

        if let ExecutionOutcome::PartialFailure { failing, by_code } = result.outcome() {
            for (code, group) in &by_code {
                tracing::error!(step = %step.label, code = *code, hosts = %group, "step failed");
            }
            progress.finish(false);
            return Err(HarnessError::StepFailed {
                label: step.label.clone(),
                command: step.command.clone(),
                hosts: failing.to_string(),
            });
        }
        progress.complete_step();
    }

    progress.finish(true);
    Ok(ScenarioReport {
        steps_run,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}
