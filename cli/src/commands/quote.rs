//! `tappd-cli quote` command — Request a TDX quote from the daemon.
//!
//! The report data argument is text by default; with `--hex` it is decoded
//! as hex-encoded raw bytes first. Either way the daemon receives the
//! SHA-384 digest of the input, so the quote is bound to it.

use clap::Args;

use super::ConnectionArgs;

#[derive(Args)]
pub struct QuoteArgs {
    /// Report data to bind into the quote
    pub report_data: String,

    /// Treat the report data argument as hex-encoded raw bytes
    #[arg(long)]
    pub hex: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Only output the quote itself, no event log
    #[arg(long, short)]
    pub quiet: bool,
}

pub async fn execute(args: QuoteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let report_data = if args.hex {
        decode_hex_input(&args.report_data)?
    } else {
        args.report_data.clone().into_bytes()
    };

    let client = args.connection.client()?;
    let response = client.tdx_quote(&report_data).await?;

    if args.quiet {
        println!("{}", response.quote);
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Decode a hex string (optionally `0x`-prefixed) into bytes.
fn decode_hex_input(input: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let input = input.trim().trim_start_matches("0x");
    hex::decode(input).map_err(|e| format!("invalid hex report data: {}", e).into())
}
