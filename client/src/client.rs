//! High-level tappd client.
//!
//! Thin wrappers over [`RpcChannel`]: construct the request body, issue the
//! call, decode the typed response. All key-derivation and attestation
//! logic lives in the daemon; this client only forwards bytes.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha384};
use tracing::debug;

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::{Result, TappdError};
use crate::rpc::RpcChannel;

/// Response to a key derivation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveKeyResponse {
    /// Derived key, PEM-encoded.
    pub key: String,
    /// Certificate chain for the derived key.
    pub certificate_chain: Vec<String>,
}

/// Response to a TDX quote request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TdxQuoteResponse {
    /// Attestation quote, `0x`-prefixed hex.
    pub quote: String,
    /// Event log associated with the quote.
    pub event_log: String,
}

#[derive(Serialize)]
struct DeriveKeyArgs<'a> {
    path: &'a str,
    subject: &'a str,
}

#[derive(Serialize)]
struct TdxQuoteArgs {
    report_data: String,
}

/// Client for a local tappd daemon.
///
/// Each operation opens its own connection; a client is cheap to clone and
/// safe to share across tasks.
#[derive(Debug, Clone)]
pub struct TappdClient {
    channel: RpcChannel,
}

impl Default for TappdClient {
    /// Client for the daemon at the well-known socket path.
    fn default() -> Self {
        Self::new(Endpoint::default())
    }
}

impl TappdClient {
    /// Client for the daemon at `endpoint`.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            channel: RpcChannel::new(endpoint),
        }
    }

    /// Client built from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let endpoint: Endpoint = config.endpoint.parse()?;
        Ok(Self {
            channel: RpcChannel::new(endpoint)
                .with_timeout(Duration::from_millis(config.timeout_ms)),
        })
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.channel = self.channel.with_timeout(timeout);
        self
    }

    /// The underlying RPC channel, for cancellable calls.
    pub fn channel(&self) -> &RpcChannel {
        &self.channel
    }

    /// Derive a key bound to `path` with certificates issued for `subject`.
    pub async fn derive_key(&self, path: &str, subject: &str) -> Result<DeriveKeyResponse> {
        let payload = serde_json::to_vec(&DeriveKeyArgs { path, subject })?;
        let value = self.channel.call("/prpc/Tappd.DeriveKey", &payload).await?;
        serde_json::from_value(value).map_err(|e| TappdError::Parse(e.to_string()))
    }

    /// Request a TDX quote over `report_data`.
    ///
    /// The input (text or raw bytes) is not sent as-is: its SHA-384 digest,
    /// hex-encoded with a `0x` prefix, becomes the quote's report data,
    /// binding the quote to the caller-chosen content.
    pub async fn tdx_quote(&self, report_data: impl AsRef<[u8]>) -> Result<TdxQuoteResponse> {
        let report_data = report_data_hex(report_data.as_ref());
        debug!(report_data = %report_data, "requesting tdx quote");
        let payload = serde_json::to_vec(&TdxQuoteArgs { report_data })?;
        let value = self.channel.call("/prpc/Tappd.TdxQuote", &payload).await?;
        serde_json::from_value(value).map_err(|e| TappdError::Parse(e.to_string()))
    }
}

/// SHA-384 digest of `input`, lowercase hex with a `0x` prefix.
fn report_data_hex(input: &[u8]) -> String {
    format!("0x{}", hex::encode(Sha384::digest(input)))
}
