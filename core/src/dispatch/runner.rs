use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::Semaphore;

use super::transport::Transport;
use super::types::{CommandResult, HostReport, SENTINEL_EXIT_CODE};
use crate::error::DispatchError;
use crate::hostset::HostSet;

pub const DEFAULT_MAX_CONCURRENCY: usize = 32;

/// Fans a shell command out to every host in a `HostSet` and aggregates the
/// per-host exit codes into a single `CommandResult`.
///
/// One dispatch is a single join point for the caller: it returns only once
/// every host has answered or the overall timeout has elapsed. Per-host
/// executions are independent; a transport failure on one host is recorded
/// under the sentinel exit code and never aborts the others. The dispatcher
/// performs no retries; command semantics are opaque here and may not be
/// idempotent, so retry policy belongs to the caller.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    max_concurrency: usize,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Run `command` on every host, bounded by `timeout` for the whole
    /// dispatch.
    ///
    /// On timeout the pending per-host tasks are dropped (their child
    /// processes are killed on drop) and `DispatchError::Timeout` is
    /// returned: a total timeout is distinguished from a partial result
    /// because no complete per-host status is known.
    pub async fn dispatch(
        &self,
        hosts: &HostSet,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandResult, DispatchError> {
        if hosts.is_empty() {
            return Err(DispatchError::EmptyHostSet);
        }
        if command.trim().is_empty() {
            return Err(DispatchError::EmptyCommand);
        }

        let start = Instant::now();
        tracing::debug!(hosts = %hosts, command, "dispatching");

        let by_host = tokio::time::timeout(timeout, self.fan_out(hosts, command))
            .await
            .map_err(|_| DispatchError::Timeout(timeout))??;

        // Reports come back in completion order; re-key them to host-set
        // order so aggregation output is stable.
        let mut by_host: HashMap<String, HostReport> = by_host;
        let reports = hosts
            .iter()
            .filter_map(|h| by_host.remove(h))
            .collect::<Vec<_>>();

        let result = CommandResult {
            command: command.to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
            reports,
        };
        tracing::debug!(
            duration_ms = result.duration_ms,
            failed = result.failing_hosts().len(),
            "dispatch complete"
        );
        Ok(result)
    }

    async fn fan_out(
        &self,
        hosts: &HostSet,
        command: &str,
    ) -> Result<HashMap<String, HostReport>, DispatchError> {
        let sem = Arc::new(Semaphore::new(self.max_concurrency));
        let mut futs: FuturesUnordered<_> = FuturesUnordered::new();

        for host in hosts.iter() {
            let host = host.to_string();
            let command = command.to_string();
            let sem = sem.clone();
            let transport = self.transport.clone();

            futs.push(async move {
                let _permit = sem
                    .acquire_owned()
                    .await
                    .map_err(|_| DispatchError::Runner("semaphore closed unexpectedly".into()))?;

                let started = Instant::now();
                let report = match transport.execute(&host, &command).await {
                    Ok(exit) => HostReport {
                        host: host.clone(),
                        exit_code: exit.exit_code,
                        duration_ms: started.elapsed().as_millis() as u64,
                        stdout_tail: exit.stdout_tail,
                        stderr_tail: exit.stderr_tail,
                        transport_error: None,
                    },
                    Err(e) => {
                        tracing::warn!(host = %host, error = %e, "transport failure");
                        HostReport {
                            host: host.clone(),
                            exit_code: SENTINEL_EXIT_CODE,
                            duration_ms: started.elapsed().as_millis() as u64,
                            stdout_tail: String::new(),
                            stderr_tail: String::new(),
                            transport_error: Some(e.to_string()),
                        }
                    }
                };
                Ok::<_, DispatchError>(report)
            });
        }

        let mut results: HashMap<String, HostReport> = HashMap::new();
        while let Some(res) = futs.next().await {
            let report = res?;
            results.insert(report.host.clone(), report);
        }
        Ok(results)
    }
}
