//! Raw HTTP-over-socket RPC channel.
//!
//! The tappd daemon speaks a minimal RPC protocol framed as HTTP/1.1 over a
//! Unix domain socket (or plain TCP in test configurations). There is no
//! real HTTP client here and none is wanted: one connection per call, one
//! POST request, one Content-Length-framed JSON response. No chunked
//! transfer, no redirects, no keep-alive, no TLS.
//!
//! Response bytes may arrive in arbitrarily many fragments of arbitrary
//! size; [`ResponseParser`] accumulates them incrementally and never
//! assumes chunk boundaries align with protocol boundaries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;
use tokio::sync::Notify;
use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::{Result, TappdError};

/// Default request deadline: 30 seconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Read buffer size for response fragments.
const READ_BUF_SIZE: usize = 8192;

/// Cooperative cancellation signal for an in-flight call.
///
/// A token is owned by the caller and passed into
/// [`RpcChannel::call_with_cancel`]. Firing it resolves the pending call
/// with [`TappdError::Aborted`] and drops the connection. Firing it after
/// the call has reached a terminal state is a no-op.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Default)]
struct CancelInner {
    notify: Notify,
    fired: AtomicBool,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the token. Idempotent.
    pub fn cancel(&self) {
        self.inner.fired.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    /// Whether the token has fired.
    pub fn is_cancelled(&self) -> bool {
        self.inner.fired.load(Ordering::Acquire)
    }

    /// Resolve once the token fires. Resolves immediately if it already has.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel()
            // between check and await cannot be missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("fired", &self.is_cancelled())
            .finish()
    }
}

/// Incremental parser for a Content-Length-framed HTTP/1.1 response.
///
/// Feed it raw fragments as they arrive. Headers are not parsed until the
/// `\r\n\r\n` separator has been seen in full, so partial header lines
/// split across fragment boundaries are never misread. After the separator
/// the remainder of the buffer seeds the body, and subsequent fragments
/// append to it until `content-length` bytes have accumulated.
#[derive(Debug, Default)]
pub struct ResponseParser {
    head: Vec<u8>,
    headers: HashMap<String, String>,
    headers_parsed: bool,
    content_length: usize,
    body: Vec<u8>,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one received fragment.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.headers_parsed {
            self.body.extend_from_slice(chunk);
            return;
        }

        self.head.extend_from_slice(chunk);
        let Some(sep) = find_separator(&self.head) else {
            return;
        };

        for line in self.head[..sep].split(|&b| b == b'\n') {
            let line = String::from_utf8_lossy(line);
            let line = line.trim_end_matches('\r');
            // Split on the first ": "; the status line has none and is skipped.
            if let Some((name, value)) = line.split_once(": ") {
                self.headers.insert(name.to_lowercase(), value.to_string());
            }
        }

        // Absent Content-Length is treated as a zero-length body, matching
        // the daemon's existing clients. Decode then fails on empty input
        // and surfaces as a parse error.
        self.content_length = self
            .headers
            .get("content-length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);

        self.body = self.head.split_off(sep + 4);
        self.head.clear();
        self.headers_parsed = true;
    }

    /// Whether the declared body length has fully arrived.
    pub fn is_complete(&self) -> bool {
        self.headers_parsed && self.body.len() >= self.content_length
    }

    /// Look up a response header by (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// The response body: exactly the first `content-length` bytes.
    ///
    /// Trailing bytes beyond the declared length are ignored, which guards
    /// against a peer that keeps the connection open a moment longer.
    pub fn body(&self) -> &[u8] {
        let len = self.content_length.min(self.body.len());
        &self.body[..len]
    }
}

/// Find the header/body separator `\r\n\r\n`.
fn find_separator(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// One transport connection, exclusively owned by a single call.
enum Conn {
    #[cfg(unix)]
    Unix(UnixStream),
    Tcp(TcpStream),
}

impl Conn {
    async fn open(endpoint: &Endpoint) -> Result<Self> {
        match endpoint {
            #[cfg(unix)]
            Endpoint::Unix(path) => {
                let stream = UnixStream::connect(path).await.map_err(|e| {
                    TappdError::Transport(format!(
                        "failed to connect to {}: {}",
                        path.display(),
                        e,
                    ))
                })?;
                Ok(Conn::Unix(stream))
            }
            #[cfg(not(unix))]
            Endpoint::Unix(path) => Err(TappdError::Transport(format!(
                "unix socket {} not supported on this platform",
                path.display(),
            ))),
            Endpoint::Tcp { host, port } => {
                let stream = TcpStream::connect((host.as_str(), *port))
                    .await
                    .map_err(|e| {
                        TappdError::Transport(format!(
                            "failed to connect to {}:{}: {}",
                            host, port, e,
                        ))
                    })?;
                Ok(Conn::Tcp(stream))
            }
        }
    }

    async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        match self {
            #[cfg(unix)]
            Conn::Unix(s) => s.write_all(buf).await,
            Conn::Tcp(s) => s.write_all(buf).await,
        }
    }

    async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            #[cfg(unix)]
            Conn::Unix(s) => s.read(buf).await,
            Conn::Tcp(s) => s.read(buf).await,
        }
    }

    async fn shutdown(&mut self) {
        // Signals the peer that no more data is needed. The connection is
        // torn down when the call resolves regardless of the outcome here.
        let _ = match self {
            #[cfg(unix)]
            Conn::Unix(s) => s.shutdown().await,
            Conn::Tcp(s) => s.shutdown().await,
        };
    }
}

/// Performs one request/response exchange per call against a fixed endpoint.
///
/// Each call opens a fresh connection, writes a single HTTP/1.1 POST, and
/// incrementally parses the Content-Length-framed JSON response. Connections
/// are never pooled or shared: concurrent calls each own their connection
/// and their deadline, so no synchronization is needed between them.
#[derive(Debug, Clone)]
pub struct RpcChannel {
    endpoint: Endpoint,
    timeout: Duration,
}

impl RpcChannel {
    /// Channel to `endpoint` with the default 30 s deadline.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The endpoint this channel targets.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Issue one RPC: POST `body` to `path`, return the decoded JSON value.
    ///
    /// `path` is used verbatim as the request target and must begin with
    /// a forward slash.
    pub async fn call(&self, path: &str, body: &[u8]) -> Result<serde_json::Value> {
        self.call_with_cancel(path, body, &CancelToken::new()).await
    }

    /// Like [`call`](Self::call), but resolves with [`TappdError::Aborted`]
    /// if `cancel` fires before the response is complete.
    pub async fn call_with_cancel(
        &self,
        path: &str,
        body: &[u8],
        cancel: &CancelToken,
    ) -> Result<serde_json::Value> {
        debug_assert!(path.starts_with('/'), "request path must start with '/'");

        if cancel.is_cancelled() {
            return Err(TappdError::Aborted);
        }

        let guarded = async {
            tokio::select! {
                res = self.exchange(path, body) => res,
                _ = cancel.cancelled() => {
                    debug!(path, "rpc call cancelled");
                    Err(TappdError::Aborted)
                }
            }
        };

        // Dropping the exchange future on timeout or cancellation closes
        // the connection and releases its file descriptor.
        match tokio::time::timeout(self.timeout, guarded).await {
            Ok(res) => res,
            Err(_) => {
                debug!(path, timeout_ms = self.timeout.as_millis() as u64, "rpc call timed out");
                Err(TappdError::Timeout(self.timeout.as_millis() as u64))
            }
        }
    }

    /// The full write-then-read exchange on a fresh connection.
    async fn exchange(&self, path: &str, body: &[u8]) -> Result<serde_json::Value> {
        let mut conn = Conn::open(&self.endpoint).await?;
        debug!(endpoint = %self.endpoint, path, body_len = body.len(), "rpc request");

        let head = format!(
            "POST {} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
            path,
            body.len(),
        );
        let mut request = Vec::with_capacity(head.len() + body.len());
        request.extend_from_slice(head.as_bytes());
        request.extend_from_slice(body);

        conn.write_all(&request)
            .await
            .map_err(|e| TappdError::Transport(format!("request write failed: {}", e)))?;

        let mut parser = ResponseParser::new();
        let mut buf = vec![0u8; READ_BUF_SIZE];
        loop {
            let n = conn
                .read(&mut buf)
                .await
                .map_err(|e| TappdError::Transport(format!("response read failed: {}", e)))?;
            if n == 0 {
                // Peer closed; decode whatever arrived. A body shorter than
                // its declared length then fails JSON decoding.
                break;
            }
            parser.feed(&buf[..n]);
            if parser.is_complete() {
                conn.shutdown().await;
                break;
            }
        }

        debug!(path, body_len = parser.body().len(), "rpc response");
        serde_json::from_slice(parser.body()).map_err(|e| TappdError::Parse(e.to_string()))
    }
}
