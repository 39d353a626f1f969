//! Synchronous client for non-async callers.
//!
//! Owns a current-thread tokio runtime and drives the async client on it.
//! Use the async [`TappdClient`](crate::TappdClient) from within an
//! existing runtime; this wrapper is for plain synchronous code.

use std::time::Duration;

use crate::client::{DeriveKeyResponse, TdxQuoteResponse};
use crate::endpoint::Endpoint;
use crate::error::{Result, TappdError};

/// Blocking tappd client.
#[derive(Debug)]
pub struct TappdClient {
    inner: crate::TappdClient,
    runtime: tokio::runtime::Runtime,
}

impl TappdClient {
    /// Blocking client for the daemon at `endpoint`.
    pub fn new(endpoint: Endpoint) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TappdError::Transport(format!("failed to start runtime: {}", e)))?;
        Ok(Self {
            inner: crate::TappdClient::new(endpoint),
            runtime,
        })
    }

    /// Blocking client for the daemon at the well-known socket path.
    pub fn default_client() -> Result<Self> {
        Self::new(Endpoint::default())
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.with_timeout(timeout);
        self
    }

    /// Derive a key bound to `path` with certificates issued for `subject`.
    pub fn derive_key(&self, path: &str, subject: &str) -> Result<DeriveKeyResponse> {
        self.runtime.block_on(self.inner.derive_key(path, subject))
    }

    /// Request a TDX quote over `report_data`.
    pub fn tdx_quote(&self, report_data: impl AsRef<[u8]>) -> Result<TdxQuoteResponse> {
        self.runtime.block_on(self.inner.tdx_quote(report_data))
    }
}
