//! Starts and stops the FUSE mount tool across the client hosts.
//!
//! The mount tool itself is opaque: it is launched through the dispatcher
//! like any other command, then readiness is observed from the outside by
//! polling `mountpoint -q` until every host sees the mount.

use std::time::{Duration, Instant};

use crate::dispatch::Dispatcher;
use crate::error::{DispatchError, HarnessError};
use crate::hostset::HostSet;

pub struct MountManager {
    tool: String,
    poll_interval: Duration,
}

impl MountManager {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            poll_interval: Duration::from_millis(500),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Launch the mount tool on every host and wait until the mountpoint is
    /// live everywhere or `ready_timeout` elapses.
    pub async fn start(
        &self,
        dispatcher: &Dispatcher,
        hosts: &HostSet,
        mountpoint: &str,
        pool_uuid: &str,
        cont_id: &str,
        ready_timeout: Duration,
    ) -> Result<(), HarnessError> {
        self.step(
            dispatcher,
            hosts,
            "mkdir mountpoint",
            &format!("mkdir -p {mountpoint}"),
            ready_timeout,
        )
        .await?;

        let start_cmd = format!(
            "{} --mountpoint={} --pool={} --container={}",
            self.tool, mountpoint, pool_uuid, cont_id
        );
        self.step(dispatcher, hosts, "mount start", &start_cmd, ready_timeout)
            .await?;

        if let Err(e) = self
            .wait_ready(dispatcher, hosts, mountpoint, ready_timeout)
            .await
        {
            // The tool was already launched; some hosts may have mounted.
            // Unmount what came up before surfacing the readiness failure.
            if let Err(stop_err) = self.stop(dispatcher, hosts, mountpoint, ready_timeout).await {
                tracing::warn!(mountpoint, error = %stop_err, "cleanup after failed mount");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Unmount on every host and remove the mountpoint directory.
    pub async fn stop(
        &self,
        dispatcher: &Dispatcher,
        hosts: &HostSet,
        mountpoint: &str,
        timeout: Duration,
    ) -> Result<(), HarnessError> {
        let unmount = format!("fusermount3 -u {mountpoint} || fusermount -u {mountpoint}");
        self.step(dispatcher, hosts, "unmount", &unmount, timeout)
            .await?;

        // The directory may be shared or already gone; not fatal.
        let cleanup = dispatcher
            .dispatch(hosts, &format!("rmdir {mountpoint}"), timeout)
            .await?;
        if !cleanup.all_succeeded() {
            tracing::debug!(
                hosts = %cleanup.failing_hosts(),
                "mountpoint directory not removed"
            );
        }
        Ok(())
    }

    async fn wait_ready(
        &self,
        dispatcher: &Dispatcher,
        hosts: &HostSet,
        mountpoint: &str,
        ready_timeout: Duration,
    ) -> Result<(), HarnessError> {
        let deadline = Instant::now() + ready_timeout;
        let check = format!("mountpoint -q {mountpoint}");
        // Clamp each probe so a wedged mountpoint check cannot eat the whole
        // deadline; deadline expiry then reports MountNotReady, not a
        // dispatch timeout.
        let probe_timeout = self.poll_interval * 4;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match dispatcher
                .dispatch(hosts, &check, remaining.min(probe_timeout))
                .await
            {
                Ok(result) if result.all_succeeded() => {
                    tracing::info!(mountpoint, hosts = %hosts, "mount ready");
                    return Ok(());
                }
                Ok(_) => {}
                // A hanging check counts as not ready; keep polling.
                Err(DispatchError::Timeout(_)) => {}
                Err(e) => return Err(e.into()),
            }
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }

        Err(HarnessError::MountNotReady {
            mountpoint: mountpoint.to_string(),
            hosts: hosts.to_string(),
            timeout: ready_timeout,
        })
    }

    async fn step(
        &self,
        dispatcher: &Dispatcher,
        hosts: &HostSet,
        label: &str,
        command: &str,
        timeout: Duration,
    ) -> Result<(), HarnessError> {
        let result = dispatcher.dispatch(hosts, command, timeout).await?;
        if !result.all_succeeded() {
            return Err(HarnessError::StepFailed {
                label: label.to_string(),
                command: command.to_string(),
                hosts: result.failing_hosts().to_string(),
            });
        }
        Ok(())
    }
}
