//! CLI command definitions and dispatch.

mod derive_key;
mod quote;

use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use tappd_client::{ClientConfig, TappdClient};

/// Tappd CLI — talk to a local tappd attestation daemon.
#[derive(Parser)]
#[command(name = "tappd-cli", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Command {
    /// Derive a key bound to a path and subject
    DeriveKey(derive_key::DeriveKeyArgs),
    /// Request a TDX quote over report data
    Quote(quote::QuoteArgs),
}

/// Connection flags shared by all commands.
#[derive(Args)]
pub struct ConnectionArgs {
    /// Daemon address: socket path, unix:<path>, or http://host:port.
    /// Defaults to TAPPD_ENDPOINT, then /var/run/tappd.sock.
    #[arg(long, short)]
    pub endpoint: Option<String>,

    /// Per-call deadline in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl ConnectionArgs {
    /// Build a client from the flags, falling back to the environment.
    pub(crate) fn client(&self) -> Result<TappdClient, Box<dyn std::error::Error>> {
        let mut config = ClientConfig::from_env();
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        let mut client = TappdClient::from_config(&config)?;
        if let Some(timeout_ms) = self.timeout_ms {
            client = client.with_timeout(Duration::from_millis(timeout_ms));
        }
        Ok(client)
    }
}

/// Dispatch a parsed CLI to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::DeriveKey(args) => derive_key::execute(args).await,
        Command::Quote(args) => quote::execute(args).await,
    }
}
