use std::path::{Path, PathBuf};

use super::types::{AppConfig, TransportKind};

/// Get the default fanout data directory: ~/.fanout
pub fn get_fanout_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".fanout"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.fanout/config.toml (highest)
    let fanout_dir = get_fanout_data_dir()?;
    let user_config = fanout_dir.join("config.toml");

    // Priority 2: ./fanout.toml (current directory)
    let local_config = Path::new("fanout.toml");

    let mut cfg: AppConfig = if user_config.exists() {
        let s = std::fs::read_to_string(&user_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else if local_config.exists() {
        let s = std::fs::read_to_string(local_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else {
        AppConfig::default()
    };

    // Default the log directory into the fanout data directory
    if cfg.logging.file
        && cfg
            .logging
            .directory
            .as_deref()
            .map(|s| s.trim().is_empty())
            .unwrap_or(true)
    {
        let logs_dir = fanout_dir.join("logs");
        std::fs::create_dir_all(&logs_dir)?;
        cfg.logging.directory = Some(logs_dir.to_string_lossy().to_string());
    }

    if let Some(dir) = cfg.logging.directory.as_deref() {
        cfg.logging.directory = Some(shellexpand::tilde(dir).to_string());
    }

    // Environment variable overrides (Priority 0: highest)
    if let Ok(v) = std::env::var("FANOUT_HOSTS") {
        if !v.trim().is_empty() {
            cfg.hosts = v;
        }
    }
    if let Ok(v) = std::env::var("FANOUT_TRANSPORT") {
        match v.trim() {
            "" => {}
            "ssh" => cfg.transport.kind = TransportKind::Ssh,
            "local" => cfg.transport.kind = TransportKind::Local,
            other => anyhow::bail!("FANOUT_TRANSPORT must be 'ssh' or 'local', got '{other}'"),
        }
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_config_round_trips_from_toml() {
        let cfg: AppConfig = toml::from_str(
            r#"
            hosts = "node[1-3]"

            [dispatch]
            max_concurrency = 8
            timeout_secs = 10

            [transport]
            kind = "local"

            [storage]
            pool_count = 2
            cont_count = 3

            [scenario]
            dd_count = 16
            "#,
        )
        .unwrap();

        assert_eq!(cfg.hosts, "node[1-3]");
        assert_eq!(cfg.dispatch.max_concurrency, 8);
        assert_eq!(cfg.dispatch.timeout_secs, 10);
        assert_eq!(cfg.transport.kind, TransportKind::Local);
        assert_eq!(cfg.storage.pool_count, 2);
        assert_eq!(cfg.storage.cont_count, 3);
        assert_eq!(cfg.scenario.dd_count, 16);
        // untouched sections keep defaults
        assert_eq!(cfg.scenario.dd_blocksize, 1024);
        assert_eq!(cfg.mount.tool, "dfuse");
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.hosts, "");
        assert_eq!(cfg.transport.kind, TransportKind::Ssh);
        assert_eq!(cfg.dispatch.timeout_secs, 30);
        assert_eq!(cfg.storage.client_bin, "daos");
    }
}
