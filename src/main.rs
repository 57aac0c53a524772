//! chatplate - live authoring loop for tokenizer chat templates.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod fixtures;
mod logger;
mod reload;
mod render;
mod store;
mod utils;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::StudioConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log!("error"; "{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = StudioConfig::load(cli)?;

    match &cli.command {
        Commands::Extract {
            config_path,
            output_path,
            force,
        } => cli::roundtrip::run_extract(&config, config_path, output_path.as_deref(), *force),
        Commands::Inject {
            template_path,
            config_path,
        } => cli::roundtrip::run_inject(template_path, config_path),
        Commands::Serve { serve_args } => {
            // Ctrl+C must reach the server before it starts blocking
            core::setup_shutdown_handler()?;
            let bound = cli::serve::bind_server(Arc::new(config), serve_args.config_path.as_deref())?;
            bound.run()
        }
    }
}
