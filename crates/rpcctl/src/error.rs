//! Error types for sunrpc sysfs control operations.

use thiserror::Error;

/// Errors surfaced by rpcctl operations.
///
/// Every variant renders as a single line suitable for an operator-facing
/// diagnostic. `NotFound` doubles as the "no such entity" answer for name
/// lookups, carrying the path or pattern that came up empty.
#[derive(Debug, Error)]
pub enum RpcctlError {
    /// A record, directory or name lookup found nothing.
    #[error("no such entry: {path}")]
    NotFound {
        /// The path or search pattern that matched nothing.
        path: String,
    },

    /// A lifecycle operation was attempted on a group's main xprt.
    #[error("main xprts cannot be {action}")]
    MainXprtProtected {
        /// What was attempted, e.g. "set offline" or "removed".
        action: String,
    },

    /// A record read or write failed for a reason other than absence.
    #[error("{path}: {source}")]
    Backing {
        /// The record that was being accessed.
        path: String,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// A hostname did not resolve to a usable address.
    #[error("cannot resolve {host}: {source}")]
    Resolution {
        /// The hostname or address literal that was given.
        host: String,
        /// The resolver failure.
        source: std::io::Error,
    },

    /// The mount table lists no sysfs filesystem.
    #[error("sysfs is not mounted")]
    NoSysfsMount,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RpcctlError>;
