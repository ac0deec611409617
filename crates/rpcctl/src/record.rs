//! Access to the small text records behind the sunrpc sysfs tree.
//!
//! Every value this tool reads or writes is a tiny text file: single-line
//! scalars (`dstaddr`, `xprtsec`, `xprt_state`) and `key=value` telemetry
//! tables (`xprt_info`, `xprt_switch_info`). [`RecordStore`] is the seam
//! between the entity model and those files. [`SysfsStore`] is the real
//! filesystem implementation; tests substitute an in-memory store to observe
//! write ordering and inject faults.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, RpcctlError};

/// Sentinel substituted when an optional scalar record is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// Render absence as `(enoent)`: the kernel never created the record.
    Enoent,
    /// Render absence as `(unknown)`: the value was never published.
    Unknown,
}

impl Missing {
    /// The sentinel string standing in for the absent record.
    pub fn sentinel(self) -> &'static str {
        match self {
            Missing::Enoent => "(enoent)",
            Missing::Unknown => "(unknown)",
        }
    }
}

/// How an [`InfoTable`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOrigin {
    /// The backing record was read, possibly with malformed lines skipped.
    Loaded,
    /// The backing record does not exist.
    Missing,
    /// The backing record exists but could not be read.
    Unreadable,
}

/// Integer-valued `key=value` table with default-zero lookups.
///
/// Info tables are best-effort telemetry. An absent file, an unreadable file
/// or a malformed line must never fail the operation that wanted the numbers,
/// so every degradation collapses to "counter reads zero" while the origin
/// records what actually happened.
#[derive(Debug, Clone)]
pub struct InfoTable {
    values: BTreeMap<String, u64>,
    origin: TableOrigin,
}

impl InfoTable {
    /// Parses table text. Every line of the form `key=integer` contributes
    /// an entry; lines without `=` or with an unparsable value are skipped.
    pub fn parse(text: &str) -> Self {
        let mut values = BTreeMap::new();
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match value.trim().parse::<u64>() {
                Ok(n) => {
                    values.insert(key.trim().to_string(), n);
                }
                Err(_) => debug!(line, "skipping malformed info line"),
            }
        }
        InfoTable {
            values,
            origin: TableOrigin::Loaded,
        }
    }

    /// An empty table for a record that does not exist.
    pub fn missing() -> Self {
        InfoTable {
            values: BTreeMap::new(),
            origin: TableOrigin::Missing,
        }
    }

    /// An empty table for a record that exists but could not be read.
    pub fn unreadable() -> Self {
        InfoTable {
            values: BTreeMap::new(),
            origin: TableOrigin::Unreadable,
        }
    }

    /// The value for `key`, zero when the key is absent.
    pub fn get(&self, key: &str) -> u64 {
        self.values.get(key).copied().unwrap_or(0)
    }

    /// Boolean view of a counter: any non-zero value is true.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) != 0
    }

    /// How this table was obtained.
    pub fn origin(&self) -> TableOrigin {
        self.origin
    }

    /// Number of parsed entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no entries were parsed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The seam between the entity model and the backing records.
///
/// Implementations supply the primitives; the scalar and table contracts are
/// default methods so every store degrades identically.
pub trait RecordStore: std::fmt::Debug {
    /// First line of the record, trimmed. Absence is `NotFound`.
    fn read_line(&self, path: &Path) -> Result<String>;

    /// Whole text of the record. Absence is `NotFound`.
    fn read_all(&self, path: &Path) -> Result<String>;

    /// Overwrites the record with `value`. All failures propagate.
    fn write(&self, path: &Path, value: &str) -> Result<()>;

    /// Whether the path exists at all.
    fn exists(&self, path: &Path) -> bool;

    /// Whether the path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate children of a directory, sorted by path.
    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Target of a symbolic link.
    fn read_link(&self, path: &Path) -> Result<PathBuf>;

    /// Reads a scalar record, substituting the `missing` sentinel when the
    /// record is absent. Other failures propagate.
    fn read_scalar(&self, path: &Path, missing: Missing) -> Result<String> {
        match self.read_line(path) {
            Err(RpcctlError::NotFound { .. }) => Ok(missing.sentinel().to_string()),
            other => other,
        }
    }

    /// Writes a scalar record and returns what the record holds afterwards.
    ///
    /// The kernel may normalize or reject the stored value, so the read-back
    /// is authoritative, not the input.
    fn write_scalar(&self, path: &Path, value: &str) -> Result<String> {
        self.write(path, value)?;
        self.read_scalar(path, Missing::Enoent)
    }

    /// Reads a `key=value` info table, degrading to an empty table on any
    /// failure. The table's origin distinguishes absent from unreadable.
    fn read_table(&self, path: &Path) -> InfoTable {
        match self.read_all(path) {
            Ok(text) => InfoTable::parse(&text),
            Err(RpcctlError::NotFound { .. }) => InfoTable::missing(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "info table unreadable");
                InfoTable::unreadable()
            }
        }
    }
}

/// [`RecordStore`] over the real sysfs tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysfsStore;

fn store_err(path: &Path, err: io::Error) -> RpcctlError {
    if err.kind() == io::ErrorKind::NotFound {
        RpcctlError::NotFound {
            path: path.display().to_string(),
        }
    } else {
        RpcctlError::Backing {
            path: path.display().to_string(),
            source: err,
        }
    }
}

impl RecordStore for SysfsStore {
    fn read_line(&self, path: &Path) -> Result<String> {
        let text = fs::read_to_string(path).map_err(|e| store_err(path, e))?;
        Ok(text.lines().next().unwrap_or("").trim().to_string())
    }

    fn read_all(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| store_err(path, e))
    }

    fn write(&self, path: &Path, value: &str) -> Result<()> {
        debug!(path = %path.display(), value, "writing record");
        fs::write(path, value).map_err(|e| store_err(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(path).map_err(|e| store_err(path, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry.map_err(|e| store_err(path, e))?.path());
        }
        paths.sort();
        Ok(paths)
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf> {
        fs::read_link(path).map_err(|e| store_err(path, e))
    }
}

/// File-name component of a path as UTF-8, empty when absent or non-UTF-8.
pub(crate) fn stem(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}
