//! Connectivity seam between the dispatcher and the outside world.
//!
//! The dispatcher is a transport, not an interpreter: it hands an opaque
//! command string to a `Transport` and observes an exit status. Remote access
//! itself is delegated to the system `ssh` client; `LocalTransport` runs the
//! command on the local node and doubles as the test double for the
//! integration suite.

use async_trait::async_trait;
use tokio::process::Command;

use super::types::{ExitReport, SENTINEL_EXIT_CODE};
use crate::error::TransportError;

pub const DEFAULT_CAPTURE_BYTES: usize = 8192;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `command` on `host` and report its exit status. Must not
    /// retry: command semantics are unknown here and may not be idempotent.
    async fn execute(&self, host: &str, command: &str) -> Result<ExitReport, TransportError>;
}

/// Remote execution through the system `ssh` client.
pub struct SshTransport {
    ssh_bin: String,
    user: Option<String>,
    extra_args: Vec<String>,
    capture_bytes: usize,
}

impl SshTransport {
    pub fn new(ssh_bin: impl Into<String>) -> Self {
        Self {
            ssh_bin: ssh_bin.into(),
            user: None,
            extra_args: Vec::new(),
            capture_bytes: DEFAULT_CAPTURE_BYTES,
        }
    }

    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn with_capture_bytes(mut self, capture_bytes: usize) -> Self {
        self.capture_bytes = capture_bytes;
        self
    }

    fn target(&self, host: &str) -> String {
        match self.user.as_deref() {
            Some(user) if !user.is_empty() => format!("{user}@{host}"),
            _ => host.to_string(),
        }
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn execute(&self, host: &str, command: &str) -> Result<ExitReport, TransportError> {
        let mut cmd = Command::new(&self.ssh_bin);
        cmd.arg("-o")
            .arg("BatchMode=yes")
            .args(&self.extra_args)
            .arg(self.target(host))
            .arg("--")
            .arg(command)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true);

        let output = cmd.output().await.map_err(|source| TransportError::Spawn {
            program: self.ssh_bin.clone(),
            source,
        })?;

        Ok(ExitReport {
            // Killed by signal: no valid exit code, count as sentinel.
            exit_code: output.status.code().unwrap_or(SENTINEL_EXIT_CODE),
            stdout_tail: tail_lossy(&output.stdout, self.capture_bytes),
            stderr_tail: tail_lossy(&output.stderr, self.capture_bytes),
        })
    }
}

/// Local execution through `sh -c`, with the target host name exported as
/// `FANOUT_HOST` so a command can still branch per host.
pub struct LocalTransport {
    shell: String,
    capture_bytes: usize,
}

impl Default for LocalTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalTransport {
    pub fn new() -> Self {
        Self {
            shell: "sh".to_string(),
            capture_bytes: DEFAULT_CAPTURE_BYTES,
        }
    }

    pub fn with_capture_bytes(mut self, capture_bytes: usize) -> Self {
        self.capture_bytes = capture_bytes;
        self
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn execute(&self, host: &str, command: &str) -> Result<ExitReport, TransportError> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .env("FANOUT_HOST", host)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true);

        let output = cmd.output().await.map_err(|source| TransportError::Spawn {
            program: self.shell.clone(),
            source,
        })?;

        Ok(ExitReport {
            exit_code: output.status.code().unwrap_or(SENTINEL_EXIT_CODE),
            stdout_tail: tail_lossy(&output.stdout, self.capture_bytes),
            stderr_tail: tail_lossy(&output.stderr, self.capture_bytes),
        })
    }
}

/// Keep only the last `max` bytes of captured output. The cut is a raw byte
/// offset; `from_utf8_lossy` replaces a multi-byte character split at the
/// front.
fn tail_lossy(bytes: &[u8], max: usize) -> String {
    let start = bytes.len().saturating_sub(max);
    let tail = String::from_utf8_lossy(&bytes[start..]);
    tail.trim_end_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn local_transport_reports_exit_code_and_output() {
        let transport = LocalTransport::new();
        let report = transport
            .execute("node1", "echo out; echo err >&2; exit 7")
            .await
            .unwrap();
        assert_eq!(report.exit_code, 7);
        assert_eq!(report.stdout_tail, "out");
        assert_eq!(report.stderr_tail, "err");
    }

    #[tokio::test]
    async fn local_transport_exports_host_name() {
        let transport = LocalTransport::new();
        let report = transport
            .execute("node7", "printf %s \"$FANOUT_HOST\"")
            .await
            .unwrap();
        assert_eq!(report.exit_code, 0);
        assert_eq!(report.stdout_tail, "node7");
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let transport = SshTransport::new("/nonexistent/fanout-test-ssh");
        let err = transport.execute("node1", "true").await.unwrap_err();
        assert!(matches!(err, TransportError::Spawn { .. }));
    }

    #[test]
    fn tail_keeps_last_bytes_only() {
        let s = b"0123456789";
        assert_eq!(tail_lossy(s, 4), "6789");
        assert_eq!(tail_lossy(s, 64), "0123456789");
    }

    #[test]
    fn ssh_target_includes_user() {
        let plain = SshTransport::new("ssh");
        assert_eq!(plain.target("node1"), "node1");
        let with_user = SshTransport::new("ssh").with_user(Some("root".to_string()));
        assert_eq!(with_user.target("node1"), "root@node1");
    }
}
