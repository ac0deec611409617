//! Hostname resolution for destination-address rewrites.

use std::io;
use std::net::{IpAddr, ToSocketAddrs};

use tracing::debug;

use crate::error::{Result, RpcctlError};

/// Resolves a hostname or address literal to an address string.
///
/// Literals pass through untouched. Names go through the system resolver and
/// the first answer wins. Resolution runs before any record is written, so a
/// bad name never leaves a transport group half-updated.
pub fn resolve(host: &str) -> Result<String> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip.to_string());
    }
    let mut addrs = (host, 0).to_socket_addrs().map_err(|source| RpcctlError::Resolution {
        host: host.to_string(),
        source,
    })?;
    match addrs.next() {
        Some(addr) => {
            debug!(host, addr = %addr.ip(), "resolved destination");
            Ok(addr.ip().to_string())
        }
        None => Err(RpcctlError::Resolution {
            host: host.to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        }),
    }
}
