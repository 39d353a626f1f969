//! `tappd-cli derive-key` command — Derive a key from the daemon.
//!
//! Sends a DeriveKey request and prints the key and its certificate
//! chain as JSON.

use clap::Args;

use super::ConnectionArgs;

#[derive(Args)]
pub struct DeriveKeyArgs {
    /// Path the derived key is bound to
    pub path: String,

    /// Subject for the issued certificates
    pub subject: String,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Only output the key itself, no certificate chain
    #[arg(long, short)]
    pub quiet: bool,
}

pub async fn execute(args: DeriveKeyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = args.connection.client()?;
    let response = client.derive_key(&args.path, &args.subject).await?;

    if args.quiet {
        println!("{}", response.key);
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
