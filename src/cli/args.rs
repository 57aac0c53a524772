//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Live authoring loop for tokenizer chat templates
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Settings file path (default: chatplate.toml, searched upward)
    #[arg(short = 'C', long, global = true, default_value = "chatplate.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Extract the chat template from tokenizer_config.json into a file
    #[command(visible_alias = "x")]
    Extract {
        /// Path to tokenizer_config.json
        #[arg(value_hint = clap::ValueHint::FilePath)]
        config_path: PathBuf,

        /// Output file path (default: <templates>/<model_type>_template.jinja)
        #[arg(short, long = "output", value_hint = clap::ValueHint::FilePath)]
        output_path: Option<PathBuf>,

        /// Overwrite an existing output file without backing it up
        #[arg(short, long)]
        force: bool,
    },

    /// Inject a chat template file into tokenizer_config.json
    #[command(visible_alias = "j")]
    Inject {
        /// Path to template file
        #[arg(value_hint = clap::ValueHint::FilePath)]
        template_path: PathBuf,

        /// Path to tokenizer_config.json
        #[arg(value_hint = clap::ValueHint::FilePath)]
        config_path: PathBuf,
    },

    /// Start the live editor server
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        serve_args: ServeArgs,
    },
}

/// Serve command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// tokenizer_config.json to extract and keep in sync with its template
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub config_path: Option<PathBuf>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<std::net::IpAddr>,

    /// HTTP port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// WebSocket port for live notifications
    #[arg(short = 'w', long)]
    pub ws_port: Option<u16>,

    /// Disable file watching (no live notifications, no auto-sync)
    #[arg(long)]
    pub no_watch: bool,
}
