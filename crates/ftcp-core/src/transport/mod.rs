//! Connection setup and timed socket I/O.
//!
//! The sender dials with [`connect_with_retry`], which resolves dotted IPv4
//! addresses directly and falls back to DNS, backing off exponentially
//! between attempts (1 s doubling to a 16 s cap). The receiver binds a
//! [`Listener`] with `SO_REUSEADDR` so a restarted server can reclaim its
//! port immediately.
//!
//! Blocking-socket timeouts (`SO_RCVTIMEO`/`SO_SNDTIMEO` in classic BSD
//! code) translate here to wrapping each await in [`io_timeout`]; an expiry
//! surfaces as the retryable [`Error::Timeout`] kind.

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::{TcpListener, TcpStream};

use crate::error::{Error, Result};
use crate::{CONNECT_BACKOFF_INITIAL_MS, CONNECT_BACKOFF_MAX_MS};

/// Listen backlog for the receiver socket.
const LISTEN_BACKLOG: i32 = 5;

/// Bound a network wait by `secs` seconds.
///
/// # Errors
///
/// Maps expiry to [`Error::Timeout`]; other failures pass through.
pub async fn io_timeout<F, T>(secs: u64, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(Duration::from_secs(secs), fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(secs)),
    }
}

/// Resolve `host` to a socket address, trying dotted IPv4 first and DNS
/// A-records second.
async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(SocketAddr::new(IpAddr::V4(ip), port));
    }

    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| Error::Resolve(host.to_string()))?;

    addrs
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| Error::Resolve(host.to_string()))
}

/// Connect to `host:port`, retrying with exponential backoff.
///
/// Each failed attempt sleeps before the next one: 1000 ms, 2000, 4000,
/// 8000, capped at 16 000. The returned stream has `TCP_NODELAY` set
/// (failure to set it is logged, not fatal).
///
/// # Errors
///
/// Returns [`Error::Connect`] after `max_attempts` failures, or
/// [`Error::Resolve`] if the host does not resolve at all.
pub async fn connect_with_retry(
    host: &str,
    port: u16,
    max_attempts: u32,
    timeout_secs: u64,
) -> Result<TcpStream> {
    let addr = resolve(host, port).await?;

    let mut delay_ms = CONNECT_BACKOFF_INITIAL_MS;
    for attempt in 1..=max_attempts {
        tracing::info!(%addr, attempt, max_attempts, "connecting");

        match io_timeout(timeout_secs, async {
            TcpStream::connect(addr).await.map_err(Error::Io)
        })
        .await
        {
            Ok(stream) => {
                if let Err(e) = stream.set_nodelay(true) {
                    tracing::warn!("failed to set TCP_NODELAY: {e}");
                }
                tracing::info!(%addr, "connected");
                return Ok(stream);
            }
            Err(e) => {
                tracing::warn!(attempt, "connection attempt failed: {e}");
                if attempt < max_attempts {
                    tracing::info!(delay_ms, "retrying after backoff");
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms = (delay_ms * 2).min(CONNECT_BACKOFF_MAX_MS);
                }
            }
        }
    }

    Err(Error::Connect {
        host: host.to_string(),
        port,
        attempts: max_attempts,
    })
}

/// A bound TCP listener for the receiver role.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind to `0.0.0.0:port` with `SO_REUSEADDR` and start listening.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bind`] if the socket cannot be created, configured,
    /// or bound.
    pub fn bind(port: u16) -> Result<Self> {
        let bind_err = |source| Error::Bind { port, source };

        let socket =
            Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).map_err(bind_err)?;
        socket.set_reuse_address(true).map_err(bind_err)?;
        socket
            .bind(&SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port).into())
            .map_err(bind_err)?;
        socket.listen(LISTEN_BACKLOG).map_err(bind_err)?;
        socket.set_nonblocking(true).map_err(bind_err)?;

        let inner = TcpListener::from_std(socket.into()).map_err(bind_err)?;
        tracing::info!(port, "listening");
        Ok(Self { inner })
    }

    /// The port this listener actually bound (useful with port 0).
    ///
    /// # Errors
    ///
    /// Returns an error if the local address cannot be read.
    pub fn local_port(&self) -> Result<u16> {
        Ok(self.inner.local_addr()?.port())
    }

    /// Accept one inbound connection.
    ///
    /// The accepted stream gets `TCP_NODELAY` (non-fatal on failure).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Accept`] if the accept call fails.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        let (stream, peer) = self.inner.accept().await.map_err(Error::Accept)?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::warn!("failed to set TCP_NODELAY: {e}");
        }
        tracing::info!(%peer, "accepted connection");
        Ok((stream, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_dotted_ipv4_without_dns() {
        let addr = resolve("192.168.1.100", 8080).await.expect("resolve");
        assert_eq!(addr.to_string(), "192.168.1.100:8080");
    }

    #[tokio::test]
    async fn resolve_rejects_garbage() {
        assert!(matches!(
            resolve("no.such.host.invalid.", 8080).await,
            Err(Error::Resolve(_))
        ));
    }

    #[tokio::test]
    async fn listener_accepts_loopback_connection() {
        let listener = Listener::bind(0).expect("bind");
        let port = listener.local_port().expect("port");

        let dial = tokio::spawn(async move {
            TcpStream::connect(("127.0.0.1", port)).await.expect("dial")
        });

        let (_stream, peer) = listener.accept().await.expect("accept");
        assert!(peer.ip().is_loopback());
        dial.await.expect("dial task");
    }

    #[tokio::test]
    async fn io_timeout_expires() {
        let result: Result<()> = io_timeout(0, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(Error::Timeout(0))));
    }
}
