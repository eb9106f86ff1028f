mod cmd;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ackd",
    about = "PagerDuty incident acknowledge daemon — poll incidents, expose acknowledge controls",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ~/.ackd/config.yaml)
    #[arg(long, global = true, env = "ACKD_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config file
    Init,

    /// Poll incidents, reconcile acknowledge controls, and serve the control API
    Run {
        /// Port to listen on (overrides config; 0 = OS-assigned)
        #[arg(long)]
        port: Option<u16>,
    },

    /// One-shot sweep of persisted control records left by a prior run
    Sweep,

    /// List currently triggered incidents
    Incidents,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = resolve_config_path(cli.config).and_then(|config_path| match cli.command {
        Commands::Init => cmd::init::run(&config_path),
        Commands::Run { port } => cmd::run::run(&config_path, port),
        Commands::Sweep => cmd::sweep::run(&config_path, cli.json),
        Commands::Incidents => cmd::incidents::run(&config_path, cli.json),
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn resolve_config_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p),
        None => Ok(ackd_core::paths::user_config_path()?),
    }
}
