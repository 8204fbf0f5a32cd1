mod cli;
mod commands;
mod config;
mod error;
mod integrations;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::commands::Context;
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("ot2 v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let ctx = Context {
        config_path: cli.config.clone(),
        templates_dir: cli.templates_dir.clone(),
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Plan(args) => {
            info!("Dispatching to 'plan' command.");
            commands::plan::run(args, &ctx).await
        }
        Commands::Sanger(args) => {
            info!("Dispatching to 'sanger' command.");
            commands::sanger::run(args, &ctx).await
        }
        Commands::Elisa(args) => commands::generate::elisa(args, &ctx).await,
        Commands::Labware(args) => commands::generate::labware(args, &ctx).await,
        Commands::Calibrate(args) => commands::generate::calibrate(args, &ctx).await,
        Commands::Templates(args) => commands::templates::run(args, &ctx).await,
        Commands::Protocols => commands::templates::protocols().await,
    };

    match &result {
        Ok(()) => info!("Command completed successfully."),
        Err(e) => error!("Command failed: {}", e),
    }
    result
}
