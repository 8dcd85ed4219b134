//! CLI argument definitions.

use crate::cli::validators::parse_override;
use crate::config::Override;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Prepare a reconstruction workspace and launch the native solver.
#[derive(Debug, Parser)]
#[command(name = "recon-launch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config overrides: `key=value`, `+key=value`, `++key=value`, `~key`,
    /// or `group=option` to pick a different file for a defaults group.
    #[arg(value_parser = parse_override)]
    pub overrides: Vec<Override>,

    /// Options for preparing and launching a run.
    #[command(flatten)]
    pub run: RunArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the resolved configuration without touching the workspace.
    Resolve {
        /// Config overrides, as for a normal run.
        #[arg(value_parser = parse_override)]
        overrides: Vec<Override>,
        /// Output format.
        #[arg(long, value_enum, default_value = "yaml")]
        format: ResolveFormat,
    },
    /// Manage tool settings.
    Config {
        /// Settings action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Settings subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create the default settings file.
    Init,
    /// Display current settings.
    Show,
    /// Print the settings file path.
    Path,
}

/// Output format for `resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolveFormat {
    /// YAML, as written to `runtime_config.yaml`.
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

/// Arguments shared by a run and `resolve`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Directory with the layered YAML configs (overrides settings).
    #[arg(short = 'p', long, env = "RECON_LAUNCH_CONFIG_PATH", global = true)]
    pub config_path: Option<PathBuf>,

    /// Primary config name inside the config directory (overrides settings).
    #[arg(short = 'n', long, env = "RECON_LAUNCH_CONFIG_NAME", global = true)]
    pub config_name: Option<String>,

    /// Keep the order stored in `registered_image_list.npy` instead of sorting.
    #[arg(long)]
    pub keep_registered_order: bool,

    /// Prepare the workspace but do not launch the solver.
    #[arg(long)]
    pub no_launch: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}
