use crate::error::ProbeError;
use crate::types::PortState;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tokio::time;
use tracing::trace;

/// Probe one `host:port` with a single TCP connect attempt bounded by `timeout`.
///
/// - Resolves `host` first; a failed lookup is a `ResolutionFailure`.
/// - Refused, timed out and unreachable connects are `Closed`, not errors.
/// - The stream is dropped right after connecting; no data is exchanged.
pub async fn probe(host: &str, port: u16, timeout: Duration) -> Result<PortState, ProbeError> {
    if port == 0 {
        return Err(ProbeError::ConnectionError {
            port,
            detail: "port 0 is not a valid target".into(),
        });
    }
    let ip = resolve_host(host).await?;
    probe_addr(SocketAddr::new(ip, port), timeout).await
}

/// Resolve `host` to one address, preferring IPv4 when both families are returned.
pub async fn resolve_host(host: &str) -> Result<IpAddr, ProbeError> {
    let failure = || ProbeError::ResolutionFailure {
        host: host.to_string(),
    };
    let addrs: Vec<SocketAddr> = lookup_host((host, 0))
        .await
        .map_err(|_| failure())?
        .collect();
    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .map(SocketAddr::ip)
        .ok_or_else(failure)
}

/// Connect-only half of [`probe`] for an already resolved address.
pub async fn probe_addr(addr: SocketAddr, timeout: Duration) -> Result<PortState, ProbeError> {
    match time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => {
            trace!(%addr, "open");
            Ok(PortState::Open)
        }
        Ok(Err(e)) if is_closed(&e) => {
            trace!(%addr, error = %e, "closed");
            Ok(PortState::Closed)
        }
        Ok(Err(e)) => Err(ProbeError::ConnectionError {
            port: addr.port(),
            detail: e.to_string(),
        }),
        Err(_elapsed) => {
            trace!(%addr, "timed out");
            Ok(PortState::Closed)
        }
    }
}

fn is_closed(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable
    )
}
