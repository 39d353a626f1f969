//! Daemon endpoint addressing.
//!
//! The tappd daemon listens on a Unix domain socket by default
//! (`/var/run/tappd.sock`). Test configurations, and platforms without
//! Unix sockets, reach it over plain TCP instead (default port 8090).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::TappdError;

/// Well-known socket path the daemon binds on Linux.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/tappd.sock";

/// TCP port the daemon binds when listening on an IP address.
pub const DEFAULT_TCP_PORT: u16 = 8090;

/// Address of a tappd daemon. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Filesystem path to the daemon's Unix domain socket.
    Unix(PathBuf),
    /// Host and port for a plain TCP/HTTP listener.
    Tcp { host: String, port: u16 },
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::Unix(PathBuf::from(DEFAULT_SOCKET_PATH))
    }
}

impl Endpoint {
    /// Endpoint for a Unix socket at `path`.
    pub fn unix(path: impl Into<PathBuf>) -> Self {
        Endpoint::Unix(path.into())
    }

    /// Endpoint for a TCP listener at `host:port`.
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Endpoint::Tcp {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "unix:{}", path.display()),
            Endpoint::Tcp { host, port } => write!(f, "http://{}:{}", host, port),
        }
    }
}

impl FromStr for Endpoint {
    type Err = TappdError;

    /// Parse an endpoint address.
    ///
    /// Accepted forms, matching what the daemon itself understands:
    /// - `unix:/var/run/tappd.sock`
    /// - `/var/run/tappd.sock` (bare path)
    /// - `http://127.0.0.1:8090` (port optional, defaults to 8090)
    /// - `tcp:127.0.0.1:8090`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TappdError::InvalidEndpoint("empty address".to_string()));
        }

        if let Some(path) = s.strip_prefix("unix:") {
            if path.is_empty() {
                return Err(TappdError::InvalidEndpoint(
                    "unix: address has no path".to_string(),
                ));
            }
            return Ok(Endpoint::Unix(PathBuf::from(path)));
        }

        if s.starts_with("https://") {
            return Err(TappdError::InvalidEndpoint(
                "https endpoints are not supported (no TLS)".to_string(),
            ));
        }

        if let Some(rest) = s.strip_prefix("http://") {
            let rest = rest.trim_end_matches('/');
            return parse_host_port(rest);
        }

        if let Some(rest) = s.strip_prefix("tcp:") {
            return parse_host_port(rest);
        }

        // Anything else is a socket path.
        Ok(Endpoint::Unix(PathBuf::from(s)))
    }
}

/// Split `host[:port]` into a TCP endpoint.
fn parse_host_port(s: &str) -> std::result::Result<Endpoint, TappdError> {
    if s.is_empty() {
        return Err(TappdError::InvalidEndpoint("missing host".to_string()));
    }
    match s.rsplit_once(':') {
        Some((host, port)) => {
            let port: u16 = port.parse().map_err(|_| {
                TappdError::InvalidEndpoint(format!("invalid port: '{}'", port))
            })?;
            if host.is_empty() {
                return Err(TappdError::InvalidEndpoint("missing host".to_string()));
            }
            Ok(Endpoint::tcp(host, port))
        }
        None => Ok(Endpoint::tcp(s, DEFAULT_TCP_PORT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_well_known_socket() {
        assert_eq!(
            Endpoint::default(),
            Endpoint::Unix(PathBuf::from("/var/run/tappd.sock"))
        );
    }

    #[test]
    fn test_parse_unix_prefixed() {
        let ep: Endpoint = "unix:/tmp/tappd.sock".parse().unwrap();
        assert_eq!(ep, Endpoint::Unix(PathBuf::from("/tmp/tappd.sock")));
    }

    #[test]
    fn test_parse_bare_path() {
        let ep: Endpoint = "/var/run/tappd.sock".parse().unwrap();
        assert_eq!(ep, Endpoint::Unix(PathBuf::from("/var/run/tappd.sock")));
    }

    #[test]
    fn test_parse_http_url() {
        let ep: Endpoint = "http://127.0.0.1:8090".parse().unwrap();
        assert_eq!(ep, Endpoint::tcp("127.0.0.1", 8090));
    }

    #[test]
    fn test_parse_http_url_default_port() {
        let ep: Endpoint = "http://localhost".parse().unwrap();
        assert_eq!(ep, Endpoint::tcp("localhost", DEFAULT_TCP_PORT));
    }

    #[test]
    fn test_parse_http_url_trailing_slash() {
        let ep: Endpoint = "http://localhost:9000/".parse().unwrap();
        assert_eq!(ep, Endpoint::tcp("localhost", 9000));
    }

    #[test]
    fn test_parse_tcp_prefixed() {
        let ep: Endpoint = "tcp:0.0.0.0:8090".parse().unwrap();
        assert_eq!(ep, Endpoint::tcp("0.0.0.0", 8090));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!("".parse::<Endpoint>().is_err());
        assert!("   ".parse::<Endpoint>().is_err());
        assert!("unix:".parse::<Endpoint>().is_err());
    }

    #[test]
    fn test_parse_rejects_https() {
        let err = "https://localhost:8090".parse::<Endpoint>().unwrap_err();
        assert!(matches!(err, TappdError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_parse_rejects_bad_port() {
        assert!("http://localhost:notaport".parse::<Endpoint>().is_err());
        assert!("http://localhost:99999".parse::<Endpoint>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for addr in ["unix:/tmp/tappd.sock", "http://127.0.0.1:8090"] {
            let ep: Endpoint = addr.parse().unwrap();
            let again: Endpoint = ep.to_string().parse().unwrap();
            assert_eq!(ep, again);
        }
    }
}
