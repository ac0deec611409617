//! Locating the sunrpc control hierarchy.
//!
//! The hierarchy lives at `kernel/sunrpc` under a mounted sysfs. Discovery
//! scans the mount table for filesystems whose type column is `sysfs` and
//! takes the first one, which is how the rest of the system finds `/sys`.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Result, RpcctlError};

/// Mount points whose filesystem type column is exactly `sysfs`.
///
/// `text` is `/proc/mounts` formatted: whitespace-separated columns of
/// device, mount point, type, options. Lines with fewer columns are skipped.
pub fn parse_mounts(text: &str) -> Vec<PathBuf> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let _device = fields.next()?;
            let mountpoint = fields.next()?;
            let fstype = fields.next()?;
            (fstype == "sysfs").then(|| PathBuf::from(mountpoint))
        })
        .collect()
}

/// The `kernel/sunrpc` directory under the first mounted sysfs.
pub fn sunrpc_root() -> Result<PathBuf> {
    let mounts = fs::read_to_string("/proc/mounts").map_err(|source| RpcctlError::Backing {
        path: "/proc/mounts".to_string(),
        source,
    })?;
    sunrpc_root_from(&mounts)
}

/// As [`sunrpc_root`], but from already-read mount-table text.
pub fn sunrpc_root_from(mounts: &str) -> Result<PathBuf> {
    let sysfs = parse_mounts(mounts)
        .into_iter()
        .next()
        .ok_or(RpcctlError::NoSysfsMount)?;
    let root = sysfs.join("kernel").join("sunrpc");
    if !root.is_dir() {
        return Err(RpcctlError::NotFound {
            path: root.display().to_string(),
        });
    }
    debug!(root = %root.display(), "found sunrpc directory");
    Ok(root)
}
