//! CLI de metropolis: genera, corre y analiza una simulación de transporte
//! a partir de una tabla de configuración TOML.
//!
//! Códigos de salida: 0 éxito (incluye dry-run), 1 error de configuración o
//! planificación, 2 fallo de un step, 130 aborto del usuario en el prompt de
//! huérfanos.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use metro_core::{run_pipeline, Config};

#[derive(Parser)]
#[command(name = "metropolis", version, about = "Command line tool to generate, run and analyse a METROPOLIS2 transport simulation")]
struct Cli {
    /// Path to the TOML configuration file to be used.
    config: PathBuf,

    /// Show the steps that would be run without actually running them.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_path(&cli.config) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("{}", error);
            return ExitCode::from(error.exit_code() as u8);
        }
    };
    let steps = metro_steps::all_steps();
    match run_pipeline(&steps, &config, cli.dry_run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{}", error);
            ExitCode::from(error.exit_code() as u8)
        }
    }
}
