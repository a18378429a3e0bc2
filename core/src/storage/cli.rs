//! Narrow adapter around the storage system's command-line tools.
//!
//! The pool/container implementation is an external collaborator: this
//! module only shells out to the management and client binaries and extracts
//! resource identifiers from their stdout. The stdout contracts are fragile
//! (labeled lines for pool create, a positional token for container create),
//! so each parse lives in its own function and a format change is a one-site
//! update.

use tokio::process::Command;

use crate::error::StorageError;

#[derive(Debug, Clone)]
pub struct Pool {
    pub uuid: String,
    pub svc_ranks: Vec<u32>,
}

impl Pool {
    /// Service ranks in the `--svc=` form, e.g. `0:1:2`.
    pub fn svc_spec(&self) -> String {
        self.svc_ranks
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(":")
    }
}

pub struct StorageCli {
    client_bin: String,
    mgmt_bin: String,
    envs: Vec<(String, String)>,
}

impl StorageCli {
    pub fn new(client_bin: impl Into<String>, mgmt_bin: impl Into<String>) -> Self {
        Self {
            client_bin: client_bin.into(),
            mgmt_bin: mgmt_bin.into(),
            envs: Vec::new(),
        }
    }

    /// Extra environment passed to every invocation (transport endpoints,
    /// agent sockets).
    pub fn with_envs(mut self, envs: Vec<(String, String)>) -> Self {
        self.envs = envs;
        self
    }

    pub async fn create_pool(&self, size: &str) -> Result<Pool, StorageError> {
        let out = self
            .run(&self.mgmt_bin, &["pool", "create", &format!("--size={size}")])
            .await?;
        let pool = parse_pool_create(&out)?;
        tracing::info!(uuid = %pool.uuid, svc = %pool.svc_spec(), "pool created");
        Ok(pool)
    }

    pub async fn destroy_pool(&self, pool: &Pool) -> Result<(), StorageError> {
        self.run(
            &self.mgmt_bin,
            &["pool", "destroy", &format!("--pool={}", pool.uuid)],
        )
        .await?;
        tracing::info!(uuid = %pool.uuid, "pool destroyed");
        Ok(())
    }

    /// Provision a POSIX-typed container in `pool` and return its id.
    pub async fn create_container(&self, pool: &Pool) -> Result<String, StorageError> {
        let out = self
            .run(
                &self.client_bin,
                &[
                    "cont",
                    "create",
                    &format!("--pool={}", pool.uuid),
                    &format!("--svc={}", pool.svc_spec()),
                    "--type=POSIX",
                ],
            )
            .await?;
        let cont_id = parse_container_id(&out)?;
        tracing::info!(container = %cont_id, "container created");
        Ok(cont_id)
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<String, StorageError> {
        let mut cmd = Command::new(program);
        cmd.args(args).kill_on_drop(true);
        for (k, v) in &self.envs {
            cmd.env(k, v);
        }

        let output = cmd.output().await.map_err(|source| StorageError::Spawn {
            program: program.to_string(),
            source,
        })?;

        if !output.status.success() {
            return Err(StorageError::CommandFailed {
                command: format!("{program} {}", args.join(" ")),
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Container create prints `Successfully created container <id>`; the id is
/// the fourth whitespace token. Positional, kept for CLI compatibility.
pub fn parse_container_id(stdout: &str) -> Result<String, StorageError> {
    stdout
        .split_whitespace()
        .nth(3)
        .map(str::to_string)
        .ok_or_else(|| StorageError::UnexpectedOutput {
            what: "container id".to_string(),
            output: stdout.trim().to_string(),
        })
}

/// Pool create prints labeled `key : value` lines; we need `UUID` and
/// `Service Ranks`.
pub fn parse_pool_create(stdout: &str) -> Result<Pool, StorageError> {
    let mut uuid = None;
    let mut svc_ranks = None;

    for line in stdout.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "UUID" => uuid = Some(value.trim().to_string()),
            "Service Ranks" => {
                svc_ranks = Some(parse_rank_list(value.trim())?);
            }
            _ => {}
        }
    }

    match (uuid, svc_ranks) {
        (Some(uuid), Some(svc_ranks)) if !uuid.is_empty() && !svc_ranks.is_empty() => {
            Ok(Pool { uuid, svc_ranks })
        }
        _ => Err(StorageError::UnexpectedOutput {
            what: "pool uuid and service ranks".to_string(),
            output: stdout.trim().to_string(),
        }),
    }
}

/// Ranks print as `[0-2]`, `[0,1,2]` or a bare `0`.
fn parse_rank_list(value: &str) -> Result<Vec<u32>, StorageError> {
    let inner = value.trim_start_matches('[').trim_end_matches(']');
    let mut ranks = Vec::new();

    for item in inner.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        if let Some((lo, hi)) = item.split_once('-') {
            let (lo, hi) = (parse_rank(lo, value)?, parse_rank(hi, value)?);
            if lo > hi {
                return Err(unexpected_ranks(value));
            }
            ranks.extend(lo..=hi);
        } else {
            ranks.push(parse_rank(item, value)?);
        }
    }

    if ranks.is_empty() {
        return Err(unexpected_ranks(value));
    }
    Ok(ranks)
}

fn parse_rank(s: &str, value: &str) -> Result<u32, StorageError> {
    s.trim().parse().map_err(|_| unexpected_ranks(value))
}

fn unexpected_ranks(value: &str) -> StorageError {
    StorageError::UnexpectedOutput {
        what: "service ranks".to_string(),
        output: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn container_id_is_the_fourth_token() {
        let out = "Successfully created container 3e661024-5c14-4a8d-9c8e-0f2a0efc6f3c\n";
        assert_eq!(
            parse_container_id(out).unwrap(),
            "3e661024-5c14-4a8d-9c8e-0f2a0efc6f3c"
        );
    }

    #[test]
    fn truncated_container_output_is_an_error() {
        let err = parse_container_id("Successfully created\n").unwrap_err();
        assert!(matches!(err, StorageError::UnexpectedOutput { .. }));
    }

    #[test]
    fn pool_create_labeled_output() {
        let out = "\
Pool created with 100.00% SCM
---------------------------------
  UUID          : b4a27b5b-688a-4d1e-8c38-ab9c1b034cfd
  Service Ranks : [0-2]
  Storage Ranks : [0-3]
";
        let pool = parse_pool_create(out).unwrap();
        assert_eq!(pool.uuid, "b4a27b5b-688a-4d1e-8c38-ab9c1b034cfd");
        assert_eq!(pool.svc_ranks, vec![0, 1, 2]);
        assert_eq!(pool.svc_spec(), "0:1:2");
    }

    #[test]
    fn rank_lists_accept_all_three_forms() {
        assert_eq!(parse_rank_list("[0-2]").unwrap(), vec![0, 1, 2]);
        assert_eq!(parse_rank_list("[0,2,4]").unwrap(), vec![0, 2, 4]);
        assert_eq!(parse_rank_list("1").unwrap(), vec![1]);
        assert!(parse_rank_list("[]").is_err());
        assert!(parse_rank_list("[x]").is_err());
    }

    #[test]
    fn pool_output_without_ranks_is_an_error() {
        let err = parse_pool_create("UUID : abc\n").unwrap_err();
        assert!(matches!(err, StorageError::UnexpectedOutput { .. }));
    }
}
