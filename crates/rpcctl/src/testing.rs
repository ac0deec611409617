//! Test doubles and fixtures shared by the unit tests.
//!
//! [`FakeStore`] is an in-memory [`RecordStore`] that records every write
//! attempt in order, can fail selected writes, and can store a different
//! value than was written (the kernel normalizes several of these records).
//! The `write_*` helpers scaffold realistic sunrpc trees on a real
//! filesystem for tests that want the `SysfsStore` path exercised.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Result, RpcctlError};
use crate::record::RecordStore;

fn not_found(path: &Path) -> RpcctlError {
    RpcctlError::NotFound {
        path: path.display().to_string(),
    }
}

/// In-memory record store with write instrumentation.
#[derive(Debug, Default)]
pub(crate) struct FakeStore {
    files: Mutex<BTreeMap<PathBuf, String>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
    links: Mutex<BTreeMap<PathBuf, PathBuf>>,
    fail_writes: Mutex<BTreeSet<PathBuf>>,
    stored: Mutex<BTreeMap<PathBuf, String>>,
    writes: Mutex<Vec<(PathBuf, String)>>,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_dir(&self, path: impl Into<PathBuf>) {
        self.dirs.lock().unwrap().insert(path.into());
    }

    pub(crate) fn add_file(&self, path: impl Into<PathBuf>, contents: &str) {
        self.files.lock().unwrap().insert(path.into(), contents.to_string());
    }

    pub(crate) fn add_link(&self, path: impl Into<PathBuf>, target: impl Into<PathBuf>) {
        self.links.lock().unwrap().insert(path.into(), target.into());
    }

    /// Makes every write to `path` fail with a permission error. The attempt
    /// is still logged.
    pub(crate) fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.fail_writes.lock().unwrap().insert(path.into());
    }

    /// Makes successful writes to `path` store `stored` instead of the
    /// written value, imitating kernel-side normalization.
    pub(crate) fn store_as(&self, path: impl Into<PathBuf>, stored: &str) {
        self.stored.lock().unwrap().insert(path.into(), stored.to_string());
    }

    /// Every attempted write in order, including failed ones.
    pub(crate) fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.lock().unwrap().clone()
    }

    pub(crate) fn contents(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }
}

impl RecordStore for FakeStore {
    fn read_line(&self, path: &Path) -> Result<String> {
        match self.files.lock().unwrap().get(path) {
            Some(text) => Ok(text.lines().next().unwrap_or("").trim().to_string()),
            None => Err(not_found(path)),
        }
    }

    fn read_all(&self, path: &Path) -> Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, value: &str) -> Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), value.to_string()));
        if self.fail_writes.lock().unwrap().contains(path) {
            return Err(RpcctlError::Backing {
                path: path.display().to_string(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        let stored = self
            .stored
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| value.to_string());
        self.files.lock().unwrap().insert(path.to_path_buf(), stored);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
            || self.dirs.lock().unwrap().contains(path)
            || self.links.lock().unwrap().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !self.is_dir(path) {
            return Err(not_found(path));
        }
        let mut entries = BTreeSet::new();
        for p in self.files.lock().unwrap().keys() {
            if p.parent() == Some(path) {
                entries.insert(p.clone());
            }
        }
        for p in self.dirs.lock().unwrap().iter() {
            if p.parent() == Some(path) {
                entries.insert(p.clone());
            }
        }
        for p in self.links.lock().unwrap().keys() {
            if p.parent() == Some(path) {
                entries.insert(p.clone());
            }
        }
        Ok(entries.into_iter().collect())
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf> {
        self.links
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))
    }
}

/// Populates a fake xprt directory with the standard record set.
pub(crate) fn fake_xprt(store: &FakeStore, path: &Path, main: bool) {
    store.add_dir(path);
    store.add_file(
        path.join("xprt_info"),
        &format!("dst_port=2049\nsrc_port=789\nnum_reqs=7\nmain_xprt={}\n", u8::from(main)),
    );
    store.add_file(path.join("xprt_state"), "4 connected bound\n");
    store.add_file(path.join("dstaddr"), "10.0.0.1\n");
    store.add_file(path.join("srcaddr"), "10.0.0.2\n");
    store.add_file(path.join("xprtsec"), "tls\n");
}

/// Writes a real xprt directory under `dir` and returns its path.
pub(crate) fn write_xprt(dir: &Path, name: &str, main: bool) -> PathBuf {
    let path = dir.join(name);
    fs::create_dir_all(&path).unwrap();
    fs::write(
        path.join("xprt_info"),
        format!(
            "dst_port=2049\nsrc_port=789\nnum_reqs=42\ncur_cong=0\ncong_win=16\n\
             min_num_slots=2\nmax_num_slots=64\nbinding_q_len=0\nsending_q_len=1\n\
             pending_q_len=2\nbacklog_q_len=0\ntasks_queuelen=3\nmain_xprt={}\n",
            u8::from(main)
        ),
    )
    .unwrap();
    fs::write(path.join("xprt_state"), "4 connected bound\n").unwrap();
    fs::write(path.join("dstaddr"), "192.168.1.20\n").unwrap();
    fs::write(path.join("srcaddr"), "192.168.1.10\n").unwrap();
    fs::write(path.join("xprtsec"), "none\n").unwrap();
    path
}

/// Writes a real switch directory with the given `(xprt name, is main)`
/// members and returns its path.
pub(crate) fn write_switch(root: &Path, name: &str, members: &[(&str, bool)]) -> PathBuf {
    let path = root.join("xprt-switches").join(name);
    fs::create_dir_all(&path).unwrap();
    fs::write(
        path.join("xprt_switch_info"),
        format!("num_xprts={}\nnum_active={}\nqueue_len=0\n", members.len(), members.len()),
    )
    .unwrap();
    for (member, main) in members {
        write_xprt(&path, member, *main);
    }
    path
}

/// Writes a real client directory linked to `switch` and returns its path.
pub(crate) fn write_client(root: &Path, name: &str, switch: &str) -> PathBuf {
    let path = root.join("rpc-clients").join(name);
    fs::create_dir_all(&path).unwrap();
    std::os::unix::fs::symlink(
        Path::new("../../xprt-switches").join(switch),
        path.join("switch"),
    )
    .unwrap();
    fs::write(path.join("program"), "nfs\n").unwrap();
    fs::write(path.join("rpc_version"), "3\n").unwrap();
    fs::write(path.join("max_connect"), "16\n").unwrap();
    path
}
