use std::collections::BTreeMap;

use crate::error::DispatchError;
use crate::hostset::HostSet;

/// Reserved exit code for "no valid exit status obtained" (transport failure,
/// killed by signal). First integer outside the valid 0-255 range.
pub const SENTINEL_EXIT_CODE: i32 = 256;

/// What the transport observed on one host: a process exit status and the
/// tail of its output.
#[derive(Debug, Clone)]
pub struct ExitReport {
    pub exit_code: i32,
    pub stdout_tail: String,
    pub stderr_tail: String,
}

/// Result of running the command on a single host.
#[derive(Debug, Clone)]
pub struct HostReport {
    pub host: String,

    /// Exit code (0 = success, `SENTINEL_EXIT_CODE` = no status obtained)
    pub exit_code: i32,

    /// Execution duration in milliseconds
    pub duration_ms: u64,

    /// Captured output tails (may be truncated)
    pub stdout_tail: String,
    pub stderr_tail: String,

    /// Transport-level failure, if the exit code is the sentinel
    pub transport_error: Option<String>,
}

/// Aggregated result of one dispatch. Every dispatched host appears in
/// `reports` exactly once, in host-set order.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub command: String,

    /// Whole-dispatch duration in milliseconds
    pub duration_ms: u64,

    pub reports: Vec<HostReport>,
}

impl CommandResult {
    /// Group hosts by the exit code they produced. Codes are ordered, so
    /// display output is stable.
    pub fn by_exit_code(&self) -> BTreeMap<i32, HostSet> {
        let mut groups: BTreeMap<i32, HostSet> = BTreeMap::new();
        for report in &self.reports {
            groups
                .entry(report.exit_code)
                .or_default()
                .push(report.host.clone());
        }
        groups
    }

    pub fn all_succeeded(&self) -> bool {
        !self.reports.is_empty() && self.reports.iter().all(|r| r.exit_code == 0)
    }

    /// Hosts that produced a non-zero or sentinel exit code.
    pub fn failing_hosts(&self) -> HostSet {
        self.reports
            .iter()
            .filter(|r| r.exit_code != 0)
            .map(|r| r.host.clone())
            .collect()
    }

    pub fn outcome(&self) -> ExecutionOutcome {
        if self.all_succeeded() {
            return ExecutionOutcome::AllSucceeded;
        }
        let by_code: BTreeMap<i32, HostSet> = self
            .by_exit_code()
            .into_iter()
            .filter(|(code, _)| *code != 0)
            .collect();
        ExecutionOutcome::PartialFailure {
            failing: self.failing_hosts(),
            by_code,
        }
    }
}

/// Caller-facing classification of a dispatch.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    AllSucceeded,

    /// At least one host disagreed; carries the failing hosts grouped by the
    /// non-zero code they produced.
    PartialFailure {
        failing: HostSet,
        by_code: BTreeMap<i32, HostSet>,
    },

    /// The dispatch itself failed (bad input, total timeout); no per-host
    /// status is known.
    ExecutionError(String),
}

impl ExecutionOutcome {
    pub fn from_dispatch(result: &Result<CommandResult, DispatchError>) -> Self {
        match result {
            Ok(res) => res.outcome(),
            Err(e) => ExecutionOutcome::ExecutionError(e.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::AllSucceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report(host: &str, exit_code: i32) -> HostReport {
        HostReport {
            host: host.to_string(),
            exit_code,
            duration_ms: 1,
            stdout_tail: String::new(),
            stderr_tail: String::new(),
            transport_error: None,
        }
    }

    fn result(reports: Vec<HostReport>) -> CommandResult {
        CommandResult {
            command: "true".to_string(),
            duration_ms: 1,
            reports,
        }
    }

    #[test]
    fn every_host_lands_under_exactly_one_code() {
        let res = result(vec![
            report("a", 0),
            report("b", 1),
            report("c", SENTINEL_EXIT_CODE),
            report("d", 1),
        ]);

        let groups = res.by_exit_code();
        let total: usize = groups.values().map(HostSet::len).sum();
        assert_eq!(total, 4);
        assert_eq!(groups[&0].to_string(), "a");
        assert_eq!(groups[&1].to_string(), "b,d");
        assert_eq!(groups[&SENTINEL_EXIT_CODE].to_string(), "c");
    }

    #[test]
    fn all_zero_is_success() {
        let res = result(vec![report("a", 0), report("b", 0)]);
        assert!(res.all_succeeded());
        assert!(res.outcome().is_success());
        assert!(res.failing_hosts().is_empty());
    }

    #[test]
    fn partial_failure_carries_only_nonzero_codes() {
        let res = result(vec![report("a", 0), report("b", 2)]);
        match res.outcome() {
            ExecutionOutcome::PartialFailure { failing, by_code } => {
                assert_eq!(failing.to_string(), "b");
                assert_eq!(by_code.len(), 1);
                assert_eq!(by_code[&2].to_string(), "b");
            }
            other => panic!("expected PartialFailure, got {other:?}"),
        }
    }

    #[test]
    fn empty_result_is_never_a_success() {
        let res = result(Vec::new());
        assert!(!res.all_succeeded());
    }

    #[test]
    fn dispatch_error_maps_to_execution_error() {
        let err: Result<CommandResult, DispatchError> = Err(DispatchError::EmptyHostSet);
        match ExecutionOutcome::from_dispatch(&err) {
            ExecutionOutcome::ExecutionError(reason) => {
                assert!(reason.contains("empty host set"));
            }
            other => panic!("expected ExecutionError, got {other:?}"),
        }
    }
}
