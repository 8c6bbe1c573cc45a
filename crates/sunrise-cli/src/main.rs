mod cmd;
mod config_path;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sunrise",
    about = "Wake the display when Sunshine reports it missing",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ./sunrise.yaml, ~/.config/sunrise/sunrise.yaml, /etc/sunrise/sunrise.yaml)
    #[arg(long, global = true, env = "SUNRISE_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the log and run the recovery sequence on new triggers
    Run {
        /// Check once immediately and exit instead of looping
        #[arg(long)]
        once: bool,
    },

    /// Scan the log once and report what a fresh daemon would do, without running commands
    Check,

    /// Inspect and validate the config file
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Write an example config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = config_path::resolve_config(cli.config.as_deref());

    let result = match cli.command {
        Commands::Run { once } => cmd::run::run(&config, once),
        Commands::Check => cmd::check::run(&config, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&config, subcommand, cli.json),
        Commands::Init { force } => cmd::init::run(&config, force),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
