//! depker - bootstrap launcher
//!
//! Makes sure a Deno runtime is installed, then runs the project's depker
//! script with it.
//!
//! # Commands
//!
//! ```text
//! depker create            # scaffold depker.config.ts
//! depker reload            # re-fetch the entry script
//! depker update            # reinstall the managed runtime, then reload
//! depker deno <args...>    # run the managed runtime directly
//! depker docker <args...>  # run docker from PATH
//! depker <args...>         # run the entry script with <args...>
//! ```
//!
//! Launcher options go before the first positional argument. Everything
//! after it, including `--help`, belongs to the script.

pub mod cmd;
pub mod ui;

use std::ffi::OsString;

use clap::Parser;

pub use ui::Output;

/// Command-line surface of the launcher.
#[derive(Debug, Parser)]
#[command(name = "depker")]
#[command(about = "depker - bootstrap launcher for depker scripts")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Entry script to run instead of the discovered one (path or URL)
    #[arg(long, env = "DEPKER_CONFIG", value_name = "REF")]
    pub config: Option<String>,

    /// Subcommand or script arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<OsString>,
}

/// What the launcher was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write a starter `depker.config.ts`.
    Create,
    /// `deno cache --reload <reference>`.
    Reload,
    /// Remove the managed runtime, reinstall it and reload.
    Update,
    /// Forward the arguments to the runtime.
    Deno(Vec<OsString>),
    /// Forward the arguments to `docker`.
    Docker(Vec<OsString>),
    /// Run the entry script with the arguments.
    Run(Vec<OsString>),
}

impl Command {
    /// Classify positional arguments by their first element.
    pub fn from_args(mut args: Vec<OsString>) -> Self {
        let Some(first) = args.first().and_then(|arg| arg.to_str()) else {
            return Self::Run(args);
        };
        match first {
            "create" => Self::Create,
            "reload" => Self::Reload,
            "update" => Self::Update,
            "deno" => Self::Deno(args.split_off(1)),
            "docker" => Self::Docker(args.split_off(1)),
            _ => Self::Run(args),
        }
    }
}

impl Cli {
    /// The command the positional arguments describe.
    pub fn command(&self) -> Command {
        Command::from_args(self.args.clone())
    }
}
