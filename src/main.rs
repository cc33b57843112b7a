//! telink - inspection tool for Telink wire formats
//!
//! Decodes and encodes serial port protocol frames, renders addresses and
//! parses advertisement payloads given as hex on the command line.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use config::Config;
use std::path::PathBuf;
use telink_codec::Endianness;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "telink")]
#[command(about = "Inspect Telink serial port frames and advertisements")]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "TELINK_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Decode a serial port protocol frame
    DecodeFrame {
        /// Frame bytes as hex
        hex: String,

        /// Reject frames whose length field disagrees with the payload
        #[arg(long)]
        strict: bool,
    },

    /// Encode a serial port protocol frame
    EncodeFrame {
        /// Type code, as 0x55AA or decimal
        #[arg(short = 't', long = "type")]
        message_type: String,

        /// Payload bytes as hex
        payload: String,
    },

    /// Decode a 4-byte advertisement or 6-byte device address
    Address {
        /// Address bytes as hex
        hex: String,

        /// Byte order of the input (defaults to the configured one)
        #[arg(short, long)]
        endianness: Option<Endianness>,
    },

    /// Parse a Telink advertisement
    Advertisement {
        /// Advertising data as hex
        hex: String,
    },

    /// Parse a Telink scan response
    ScanResponse {
        /// Scan response data as hex
        hex: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => {
            if let Some(path) = &cli.config {
                tracing::debug!("Loaded config from {}", path.display());
            }
            config
        }
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };

    match commands::execute(&config, cli.command, cli.json) {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    }
}
