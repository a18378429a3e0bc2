use std::sync::Arc;
use std::time::Duration;

use fanout_core::config::{AppConfig, TransportKind};
use fanout_core::dispatch::{Dispatcher, LocalTransport, SshTransport, Transport};
use fanout_core::error::CliError;
use fanout_core::harness::{self, RunOptions, Scenario, ScenarioParams};
use fanout_core::storage::{MountManager, Pool, StorageCli};
use fanout_core::{ExecutionOutcome, HostSet};

use crate::commands::cli::{ExecArgs, SmokeArgs};

fn resolve_hosts(arg: &Option<String>, cfg: &AppConfig) -> Result<HostSet, CliError> {
    let spec = arg
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(cfg.hosts.as_str());
    if spec.trim().is_empty() {
        return Err(CliError::Config(
            "no hosts given: set `hosts` in the config file or pass --hosts".into(),
        ));
    }
    Ok(spec.parse()?)
}

fn build_transport(cfg: &AppConfig, force_local: bool) -> Arc<dyn Transport> {
    let kind = if force_local {
        TransportKind::Local
    } else {
        cfg.transport.kind
    };
    match kind {
        TransportKind::Local => Arc::new(
            LocalTransport::new().with_capture_bytes(cfg.dispatch.capture_bytes),
        ),
        TransportKind::Ssh => Arc::new(
            SshTransport::new(cfg.transport.ssh_bin.clone())
                .with_user(cfg.transport.user.clone())
                .with_extra_args(cfg.transport.extra_args.clone())
                .with_capture_bytes(cfg.dispatch.capture_bytes),
        ),
    }
}

fn build_dispatcher(cfg: &AppConfig, transport: Arc<dyn Transport>) -> Dispatcher {
    Dispatcher::new(transport).with_max_concurrency(cfg.dispatch.max_concurrency)
}

fn parse_env_pairs(pairs: &[String]) -> Result<Vec<(String, String)>, CliError> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| CliError::Config(format!("invalid env entry '{pair}', want KEY=VALUE")))
        })
        .collect()
}

/// One-off dispatch: run the command everywhere, print per-code host groups.
pub async fn run_exec(
    hosts_arg: &Option<String>,
    args: ExecArgs,
    cfg: &AppConfig,
) -> Result<i32, CliError> {
    let hosts = resolve_hosts(hosts_arg, cfg)?;
    let command = args.command.join(" ");
    let timeout = Duration::from_secs(args.timeout_secs.unwrap_or(cfg.dispatch.timeout_secs));

    let transport = build_transport(cfg, args.local);
    let mut dispatcher = build_dispatcher(cfg, transport);
    if let Some(n) = args.max_concurrency {
        dispatcher = dispatcher.with_max_concurrency(n);
    }

    let result = dispatcher.dispatch(&hosts, &command, timeout).await?;
    match result.outcome() {
        ExecutionOutcome::AllSucceeded => {
            println!(
                "ok: exit 0 on {} host(s) in {}ms",
                hosts.len(),
                result.duration_ms
            );
            Ok(0)
        }
        ExecutionOutcome::PartialFailure { failing, by_code } => {
            for (code, group) in &by_code {
                eprintln!("exit {code}: {group}");
            }
            eprintln!("error running '{command}' on the following hosts: {failing}");
            Ok(30)
        }
        ExecutionOutcome::ExecutionError(reason) => Err(CliError::Config(reason)),
    }
}

/// Full harness run: pool loop × container loop → mount → scenario → teardown.
pub async fn run_smoke(
    hosts_arg: &Option<String>,
    args: SmokeArgs,
    cfg: &AppConfig,
) -> Result<i32, CliError> {
    let hosts = resolve_hosts(hosts_arg, cfg)?;
    let transport = build_transport(cfg, false);
    let dispatcher = build_dispatcher(cfg, transport);

    let storage = StorageCli::new(cfg.storage.client_bin.clone(), cfg.storage.mgmt_bin.clone())
        .with_envs(parse_env_pairs(&cfg.storage.env)?);
    let mount = MountManager::new(cfg.mount.tool.clone());

    let step_timeout = Duration::from_secs(cfg.dispatch.timeout_secs);
    let params = ScenarioParams {
        dir_name: cfg.scenario.dirname.clone(),
        file_name1: cfg.scenario.filename1.clone(),
        file_name2: cfg.scenario.filename2.clone(),
        dd_count: cfg.scenario.dd_count,
        dd_blocksize: cfg.scenario.dd_blocksize,
    };
    let opts = RunOptions {
        step_timeout,
        progress: !args.no_progress && atty::is(atty::Stream::Stderr),
    };
    let ctx = SmokeCtx {
        dispatcher: &dispatcher,
        hosts: &hosts,
        storage: &storage,
        mount: &mount,
        cfg,
        params: &params,
        opts: &opts,
        step_timeout,
        ready_timeout: Duration::from_secs(cfg.mount.ready_timeout_secs),
    };

    for _ in 0..cfg.storage.pool_count {
        let pool = storage.create_pool(&cfg.storage.pool_size).await?;
        let run = run_pool(&ctx, &pool).await;
        // The pool is torn down even when the container loop failed.
        let destroyed = storage.destroy_pool(&pool).await;
        run?;
        destroyed?;
    }

    println!("smoke run passed on hosts: {hosts}");
    Ok(0)
}

struct SmokeCtx<'a> {
    dispatcher: &'a Dispatcher,
    hosts: &'a HostSet,
    storage: &'a StorageCli,
    mount: &'a MountManager,
    cfg: &'a AppConfig,
    params: &'a ScenarioParams,
    opts: &'a RunOptions,
    step_timeout: Duration,
    ready_timeout: Duration,
}

async fn run_pool(ctx: &SmokeCtx<'_>, pool: &Pool) -> Result<(), CliError> {
    for count in 0..ctx.cfg.storage.cont_count {
        let cont_id = ctx.storage.create_container(pool).await?;
        let mountpoint = format!("{}/{}_fanout{}", ctx.cfg.mount.base_dir, pool.uuid, count);

        // start() unmounts on its own readiness failure, so a failure here
        // leaves nothing mounted behind.
        ctx.mount
            .start(
                ctx.dispatcher,
                ctx.hosts,
                &mountpoint,
                &pool.uuid,
                &cont_id,
                ctx.ready_timeout,
            )
            .await?;

        let run = run_container_scenario(ctx, &mountpoint, &cont_id).await;
        // Unmount before surfacing any scenario failure.
        let stopped = ctx
            .mount
            .stop(ctx.dispatcher, ctx.hosts, &mountpoint, ctx.step_timeout)
            .await;
        run?;
        stopped?;
    }
    Ok(())
}

async fn run_container_scenario(
    ctx: &SmokeCtx<'_>,
    mountpoint: &str,
    cont_id: &str,
) -> Result<(), CliError> {
    let scenario_dir = format!("{}/{}", mountpoint, ctx.params.dir_name);
    let already_there =
        harness::check_dir_exists(ctx.dispatcher, ctx.hosts, &scenario_dir, ctx.step_timeout)
            .await?;
    if already_there {
        tracing::warn!(dir = %scenario_dir, "scenario directory already exists, skipping");
        return Ok(());
    }

    let scenario = Scenario::posix_smoke(mountpoint, ctx.params);
    let report = harness::run_scenario(ctx.dispatcher, ctx.hosts, &scenario, ctx.opts).await?;
    tracing::info!(
        steps = report.steps_run,
        duration_ms = report.duration_ms,
        container = %cont_id,
        "smoke scenario passed"
    );
    Ok(())
}
