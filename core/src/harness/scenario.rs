//! The POSIX smoke sequence run against a mounted container.
//!
//! Mirrors the classic mount validation flow: create a directory and a file,
//! write with dd, assert the size, copy, compare, rename, then tear the tree
//! back down. Every step must exit 0 on every client host.

use std::time::Duration;

use crate::dispatch::Dispatcher;
use crate::error::DispatchError;
use crate::hostset::HostSet;

#[derive(Debug, Clone)]
pub struct ScenarioParams {
    pub dir_name: String,
    pub file_name1: String,
    pub file_name2: String,
    pub dd_count: u64,
    pub dd_blocksize: u64,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            dir_name: "dir".to_string(),
            file_name1: "testfile1".to_string(),
            file_name2: "testfile2".to_string(),
            dd_count: 4,
            dd_blocksize: 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Step {
    pub label: String,
    pub command: String,
}

impl Step {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Build the smoke sequence rooted at `mount_dir`.
    pub fn posix_smoke(mount_dir: &str, params: &ScenarioParams) -> Self {
        let dir = format!("{}/{}", mount_dir, params.dir_name);
        let file1 = format!("{}/{}", dir, params.file_name1);
        let file2 = format!("{}/{}", dir, params.file_name2);
        let expected_size = params.dd_count * params.dd_blocksize;

        let steps = vec![
            Step::new("mkdir", format!("mkdir -p {dir}")),
            Step::new("touch", format!("touch {file1}")),
            Step::new("ls file", format!("ls -a {file1}")),
            Step::new("rm file", format!("rm {file1}")),
            Step::new(
                "dd write",
                format!(
                    "dd if=/dev/zero of={file1} count={} bs={}",
                    params.dd_count, params.dd_blocksize
                ),
            ),
            Step::new("ls written", format!("ls -al {file1}")),
            Step::new(
                "stat size",
                format!("[ \"$(stat -c%s '{file1}')\" -eq {expected_size} ]"),
            ),
            Step::new("cp", format!("cp -r {file1} {file2}")),
            Step::new("cmp", format!("cmp --silent {file1} {file2}")),
            Step::new("rm copy", format!("rm {file2}")),
            Step::new("mv", format!("mv {file1} {file2}")),
            Step::new("ls renamed", format!("ls -al {file2}")),
            Step::new("rm renamed", format!("rm {file2}")),
            Step::new("rmdir", format!("rmdir {dir}")),
        ];

        Self { steps }
    }
}

/// True when `path` exists as a directory on every host.
pub async fn check_dir_exists(
    dispatcher: &Dispatcher,
    hosts: &HostSet,
    path: &str,
    timeout: Duration,
) -> Result<bool, DispatchError> {
    let result = dispatcher
        .dispatch(hosts, &format!("test -d '{path}'"), timeout)
        .await?;
    Ok(result.all_succeeded())
}
