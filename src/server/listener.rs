// Listener binding module
// Turns the configured base URL into a bound TCP listener

use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use url::Url;

use crate::error::BindError;

/// The `scheme://host:port` a service listens on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerBinding {
    scheme: String,
    host: String,
    port: u16,
}

impl ListenerBinding {
    /// Parse a base URL such as `http://localhost:8080`.
    ///
    /// Only `http` is accepted. A missing port means 80. Any path in the URL
    /// is ignored: routes are always matched from the root.
    pub fn parse(base_url: &str) -> Result<Self, BindError> {
        let url = Url::parse(base_url).map_err(|source| BindError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        if url.scheme() != "http" {
            return Err(BindError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            });
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| BindError::MissingHost {
                url: base_url.to_string(),
            })?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
            port: url.port_or_known_default().unwrap_or(80),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    /// `host:port`; IPv6 hosts keep their brackets
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve the host to candidate socket addresses without blocking
    /// the runtime
    pub async fn resolve(&self) -> Result<Vec<SocketAddr>, BindError> {
        let authority = self.authority();
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(authority.as_str())
            .await
            .map_err(|source| BindError::Resolve {
                authority: authority.clone(),
                source,
            })?
            .collect();

        if addrs.is_empty() {
            return Err(BindError::Resolve {
                authority,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "host resolved to no addresses",
                ),
            });
        }
        Ok(addrs)
    }

    /// Bind the first resolved address that accepts a listener.
    /// The socket is listening when this returns.
    pub async fn bind(&self) -> Result<TcpListener, BindError> {
        let mut last_error = None;
        for addr in self.resolve().await? {
            match create_listener(addr) {
                Ok(listener) => return Ok(listener),
                Err(source) => last_error = Some(BindError::Io { addr, source }),
            }
        }
        Err(last_error.unwrap_or_else(|| BindError::Resolve {
            authority: self.authority(),
            source: std::io::Error::from(std::io::ErrorKind::AddrNotAvailable),
        }))
    }
}

impl std::fmt::Display for ListenerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Create a `TcpListener` bound to `addr`.
///
/// `SO_REUSEADDR` lets a restarted service bind a port still in `TIME_WAIT`;
/// a port held by a live listener still fails with `AddrInUse`.
/// Must be called from within a tokio runtime.
pub fn create_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    // Create socket with appropriate domain (IPv4 or IPv6)
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    #[cfg(unix)]
    socket.set_reuse_address(true)?;

    // Set non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;

    // Start listening with a backlog queue size of 128
    socket.listen(128)?;

    // Convert socket2::Socket to std::net::TcpListener, then to tokio::net::TcpListener
    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
