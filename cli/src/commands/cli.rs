use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "fanout", about = "Parallel remote command dispatch")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Host spec, e.g. "node[1-4],login1" (overrides the config file).
    #[arg(long, global = true)]
    pub hosts: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ExecArgs {
    /// Overall dispatch timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Run the command locally (FANOUT_HOST set per host) instead of ssh.
    #[arg(long, default_value_t = false)]
    pub local: bool,

    /// The shell command to run on every host.
    #[arg(trailing_var_arg = true, required = true)]
    pub command: Vec<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SmokeArgs {
    /// Disable the step progress bar.
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one command on every host and report per-exit-code host groups.
    Exec(ExecArgs),

    /// Provision pool + container, mount, and run the POSIX smoke sequence.
    Smoke(SmokeArgs),
}
