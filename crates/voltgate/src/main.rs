//! voltgate - validating HTTP bridge for a networked Eurorack sequencer
//!
//! Subcommands:
//! - `voltgate serve` - Run the HTTP → TCP bridge
//! - `voltgate send <json>` - Send a raw JSON command to the controller

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use voltgate::relay;
use voltgate::serve;

mod commands;

#[derive(Parser)]
#[command(name = "voltgate")]
#[command(about = "Validating HTTP bridge for a networked Eurorack sequencer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bridge server
    Serve {
        /// HTTP port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Sequencer controller endpoint, host:port (overrides config)
        #[arg(long)]
        sequencer: Option<String>,

        /// Timeout in milliseconds for connect, send, and receive
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Path to a voltgate.toml config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Send a raw JSON command to the controller and print the reply
    Send {
        /// JSON document, e.g. '{"type":"start"}'
        json: String,

        /// Sequencer controller endpoint, host:port
        #[arg(long, default_value = relay::DEFAULT_ENDPOINT)]
        sequencer: String,

        /// Timeout in milliseconds
        #[arg(short, long, default_value = "2000")]
        timeout_ms: u64,
    },
}

fn init_tracing(default_directive: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            sequencer,
            timeout_ms,
            config,
        } => {
            let (serve_config, config) = serve::resolve_config(config, port, sequencer, timeout_ms)?;
            init_tracing(&config.telemetry.log_level);
            serve::run(serve_config).await?;
        }
        Commands::Send {
            json,
            sequencer,
            timeout_ms,
        } => {
            init_tracing("info");
            commands::send(&sequencer, &json, timeout_ms).await?;
        }
    }

    Ok(())
}
