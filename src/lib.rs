//! recon-launch - reconstruction workspace preparation and solver launcher.
//!
//! Resolves a layered YAML configuration, snapshots the solver sources,
//! writes the image list and runtime config, then runs the prebuilt solver.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod images;
pub mod launcher;
pub mod pipeline;
pub mod settings;
pub mod snapshot;
pub mod workspace;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, ResolveFormat, RunArgs};
use config::Override;
use constants::launch::INTERRUPTED_EXIT_CODE;
use pipeline::{RunOptions, launch_solver, prepare};
use settings::{
    InitOutcome, Settings, init_settings_file, load_default_settings, render_settings,
    settings_file_path,
};
use tracing::{info, warn};

pub use error::{Error, Result};

/// Main entry point for the recon-launch CLI.
///
/// Returns the process exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();

    init_logging(cli.run.verbose, cli.run.quiet);

    // Ctrl+C belongs to the solver once it is running.
    if let Err(e) = ctrlc::set_handler(|| {
        if !launcher::child_running() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    let settings = load_default_settings()?;

    if let Some(command) = cli.command {
        return handle_command(command, &cli.run, &settings);
    }

    let options = run_options(&cli.run, &settings)?;
    let prepared = prepare(&options, &cli.overrides)?;

    if cli.run.no_launch {
        info!("Workspace prepared, not launching (--no-launch)");
        return Ok(0);
    }

    launch_solver(&prepared, &options.launch)
}

fn run_options(args: &RunArgs, settings: &Settings) -> Result<RunOptions> {
    let invocation_dir = std::env::current_dir()?;
    Ok(RunOptions::new(
        settings,
        args.config_path.as_deref(),
        args.config_name.as_deref(),
        args.keep_registered_order,
        &invocation_dir,
    ))
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    // stdout is left to `resolve` output and the solver.
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_command(command: Command, args: &RunArgs, settings: &Settings) -> Result<i32> {
    match command {
        Command::Resolve { overrides, format } => {
            handle_resolve_command(args, settings, &overrides, format)?;
        }
        Command::Config { action } => handle_config_command(action, settings)?,
    }
    Ok(0)
}

fn handle_resolve_command(
    args: &RunArgs,
    settings: &Settings,
    overrides: &[Override],
    format: ResolveFormat,
) -> Result<()> {
    let options = run_options(args, settings)?;
    let tree = config::resolve_tree(&options.source, overrides)?;

    let rendered = match format {
        ResolveFormat::Yaml => {
            serde_yaml::to_string(&tree).map_err(|e| Error::Render {
                message: e.to_string(),
            })?
        }
        ResolveFormat::Json => {
            let mut json = serde_json::to_string_pretty(&tree).map_err(|e| Error::Render {
                message: e.to_string(),
            })?;
            json.push('\n');
            json
        }
    };

    print!("{rendered}");
    Ok(())
}

fn handle_config_command(action: ConfigAction, settings: &Settings) -> Result<()> {
    match action {
        ConfigAction::Init => {
            match init_settings_file(&settings_file_path()?)? {
                InitOutcome::Created(path) => {
                    println!("Created settings file: {}", path.display());
                }
                InitOutcome::Existing(path) => {
                    println!("Settings file already exists: {}", path.display());
                }
            }
            Ok(())
        }
        ConfigAction::Show => {
            print!("{}", render_settings(settings)?);
            Ok(())
        }
        ConfigAction::Path => {
            let path = settings_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
