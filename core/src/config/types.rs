use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Client host spec, e.g. "node[1-4]" (HostSet syntax).
    #[serde(default)]
    pub hosts: String,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub mount: MountConfig,

    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hosts: String::new(),
            dispatch: DispatchConfig::default(),
            transport: TransportConfig::default(),
            logging: LoggingConfig::default(),
            storage: StorageConfig::default(),
            mount: MountConfig::default(),
            scenario: ScenarioConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Overall per-dispatch timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bytes of stdout/stderr tail kept per host
    #[serde(default = "default_capture_bytes")]
    pub capture_bytes: usize,
}

fn default_max_concurrency() -> usize {
    32
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_capture_bytes() -> usize {
    8192
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            timeout_secs: default_timeout_secs(),
            capture_bytes: default_capture_bytes(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Ssh,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_transport_kind")]
    pub kind: TransportKind,

    #[serde(default = "default_ssh_bin")]
    pub ssh_bin: String,

    /// Remote user; empty means the local user.
    #[serde(default)]
    pub user: Option<String>,

    /// Extra arguments for the ssh client (e.g. "-o", "ConnectTimeout=10").
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_transport_kind() -> TransportKind {
    TransportKind::Ssh
}

fn default_ssh_bin() -> String {
    "ssh".to_string()
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: default_transport_kind(),
            ssh_bin: default_ssh_bin(),
            user: None,
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "fanout_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Client CLI (container operations)
    #[serde(default = "default_client_bin")]
    pub client_bin: String,

    /// Management CLI (pool operations)
    #[serde(default = "default_mgmt_bin")]
    pub mgmt_bin: String,

    #[serde(default = "default_pool_size")]
    pub pool_size: String,

    #[serde(default = "default_pool_count")]
    pub pool_count: u32,

    #[serde(default = "default_cont_count")]
    pub cont_count: u32,

    /// Extra environment for CLI invocations, KEY=VALUE.
    #[serde(default)]
    pub env: Vec<String>,
}

fn default_client_bin() -> String {
    "daos".to_string()
}

fn default_mgmt_bin() -> String {
    "dmg".to_string()
}

fn default_pool_size() -> String {
    "1G".to_string()
}

fn default_pool_count() -> u32 {
    1
}

fn default_cont_count() -> u32 {
    1
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            client_bin: default_client_bin(),
            mgmt_bin: default_mgmt_bin(),
            pool_size: default_pool_size(),
            pool_count: default_pool_count(),
            cont_count: default_cont_count(),
            env: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    #[serde(default = "default_mount_tool")]
    pub tool: String,

    /// Mountpoints are created under `<base_dir>/<pool-uuid>_fanout<n>`.
    #[serde(default = "default_mount_base_dir")]
    pub base_dir: String,

    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,
}

fn default_mount_tool() -> String {
    "dfuse".to_string()
}

fn default_mount_base_dir() -> String {
    "/tmp".to_string()
}

fn default_ready_timeout_secs() -> u64 {
    60
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            tool: default_mount_tool(),
            base_dir: default_mount_base_dir(),
            ready_timeout_secs: default_ready_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default = "default_dirname")]
    pub dirname: String,

    #[serde(default = "default_filename1")]
    pub filename1: String,

    #[serde(default = "default_filename2")]
    pub filename2: String,

    #[serde(default = "default_dd_count")]
    pub dd_count: u64,

    #[serde(default = "default_dd_blocksize")]
    pub dd_blocksize: u64,
}

fn default_dirname() -> String {
    "dir".to_string()
}

fn default_filename1() -> String {
    "testfile1".to_string()
}

fn default_filename2() -> String {
    "testfile2".to_string()
}

fn default_dd_count() -> u64 {
    4
}

fn default_dd_blocksize() -> u64 {
    1024
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            dirname: default_dirname(),
            filename1: default_filename1(),
            filename2: default_filename2(),
            dd_count: default_dd_count(),
            dd_blocksize: default_dd_blocksize(),
        }
    }
}
