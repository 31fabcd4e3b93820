//! depker - bootstrap launcher

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use depker_cli::cmd;
use depker_cli::{Cli, Command, Output};
use depker_core::{Invocation, Launcher, LauncherConfig, LauncherError, Reporter};

fn main() {
    // Initialize logging. stdout belongs to the delegated child.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DEPKER_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new();

    let code = match dispatch(&cli, &output) {
        Ok(code) => code,
        Err(err) => {
            output.error(&format!("{err:#}"));
            exit_code(&err)
        }
    };
    std::process::exit(code);
}

fn dispatch(cli: &Cli, output: &Output) -> Result<i32> {
    let config = LauncherConfig::from_env(|key| std::env::var(key).ok())
        .with_config_override(cli.config.clone());
    let invocation = Invocation::new(std::env::current_dir()?, std::env::var_os("PATH"));
    let launcher = Launcher::new(config, invocation, output);

    let command = cli.command();
    debug!(?command, cwd = %launcher.invocation().cwd.display(), "dispatching");

    match command {
        Command::Create => cmd::create::create(&launcher, output).map(|_| 0),
        Command::Reload => cmd::reload::reload(&launcher),
        Command::Update => cmd::update::update(&launcher, output),
        Command::Deno(args) => cmd::passthrough::deno(&launcher, &args),
        Command::Docker(args) => cmd::passthrough::docker(&launcher, &args),
        Command::Run(args) => cmd::run::run(&launcher, &args),
    }
}

/// Exit code for a failure that happened before (or instead of) delegation.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<LauncherError>())
        .map_or(1, LauncherError::exit_code)
}
