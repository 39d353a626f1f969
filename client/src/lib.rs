//! Client SDK for the tappd attestation daemon.
//!
//! The daemon owns all key-derivation and attestation logic. This crate
//! speaks its minimal RPC protocol (HTTP/1.1-framed JSON over a Unix
//! domain socket, or plain TCP in test configurations) and exposes the
//! two operations it serves:
//!
//! - [`TappdClient::derive_key`]: derive a key bound to a path/subject.
//! - [`TappdClient::tdx_quote`]: request a hardware TDX quote over
//!   caller-supplied report data.
//!
//! ```no_run
//! use tappd_client::TappdClient;
//!
//! # async fn example() -> tappd_client::Result<()> {
//! let client = TappdClient::default();
//! let key = client.derive_key("/", "my-app").await?;
//! let quote = client.tdx_quote("some report data").await?;
//! # Ok(())
//! # }
//! ```

pub mod blocking;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod rpc;

// Re-export commonly used types
pub use client::{DeriveKeyResponse, TappdClient, TdxQuoteResponse};
pub use config::ClientConfig;
pub use endpoint::{Endpoint, DEFAULT_SOCKET_PATH};
pub use error::{Result, TappdError};
pub use rpc::{CancelToken, RpcChannel};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
