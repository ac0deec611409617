//! A single sunrpc transport connection.
//!
//! Each xprt lives in a directory named `<name>-<kind>` under its switch,
//! e.g. `xprt-3-tcp`. The directory holds the address scalars, the
//! `xprt_info` counter table and the writable `xprt_state` record that
//! drives the transport's lifecycle.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, RpcctlError};
use crate::record::{self, InfoTable, Missing, RecordStore};

/// Writable lifecycle targets for an xprt's state record.
///
/// These are requests, not guarantees: the kernel applies the transition and
/// republishes whatever state labels actually hold afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTarget {
    /// Return the transport to service.
    Online,
    /// Quiesce the transport without tearing it down.
    Offline,
    /// Ask the kernel to tear the transport down.
    Remove,
}

impl StateTarget {
    /// Token written to the state record.
    pub fn as_str(self) -> &'static str {
        match self {
            StateTarget::Online => "online",
            StateTarget::Offline => "offline",
            StateTarget::Remove => "remove",
        }
    }
}

impl fmt::Display for StateTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transport connection under an xprt switch.
#[derive(Debug)]
pub struct Xprt {
    store: Arc<dyn RecordStore>,
    path: PathBuf,
    name: String,
    kind: String,
    info: InfoTable,
    dstaddr: String,
    srcaddr: String,
    xprtsec: String,
    state: String,
}

impl Xprt {
    /// Loads an xprt from its backing directory.
    ///
    /// The directory name splits at the last `-` into the xprt's name and its
    /// transport kind. Address and security scalars degrade to sentinels when
    /// absent; the state record is read only while the directory still
    /// exists, since the kernel can retire an xprt at any moment.
    pub fn load(store: Arc<dyn RecordStore>, path: PathBuf) -> Result<Self> {
        let stem = record::stem(&path);
        let (name, kind) = match stem.rsplit_once('-') {
            Some((name, kind)) => (name.to_string(), kind.to_string()),
            None => (stem.to_string(), String::new()),
        };
        let info = store.read_table(&path.join("xprt_info"));
        let dstaddr = store.read_scalar(&path.join("dstaddr"), Missing::Enoent)?;
        let srcaddr = store.read_scalar(&path.join("srcaddr"), Missing::Enoent)?;
        let xprtsec = store.read_scalar(&path.join("xprtsec"), Missing::Unknown)?;
        let state = if store.exists(&path) {
            read_state(store.as_ref(), &path)?
        } else {
            String::new()
        };
        Ok(Xprt {
            store,
            path,
            name,
            kind,
            info,
            dstaddr,
            srcaddr,
            xprtsec,
            state,
        })
    }

    /// The xprt's name, e.g. `xprt-3`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The transport kind taken from the directory suffix, e.g. `tcp`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Destination address as last read back from the record.
    pub fn dstaddr(&self) -> &str {
        &self.dstaddr
    }

    /// Source address of the connection.
    pub fn srcaddr(&self) -> &str {
        &self.srcaddr
    }

    /// Transport security in use, e.g. `none` or `tls`.
    pub fn xprtsec(&self) -> &str {
        &self.xprtsec
    }

    /// Comma-joined state labels, e.g. `connected,bound`.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// True when the kernel marks this transport as its group's main xprt.
    pub fn is_main(&self) -> bool {
        self.info.flag("main_xprt")
    }

    /// Re-reads the state labels if the backing directory still exists.
    /// A retired xprt keeps its last observed state.
    pub fn refresh_state(&mut self) -> Result<()> {
        if self.store.exists(&self.path) {
            self.state = read_state(self.store.as_ref(), &self.path)?;
        }
        Ok(())
    }

    /// Writes a lifecycle target to the state record and re-reads the state.
    ///
    /// Main xprts are refused: the kernel depends on them staying up.
    pub fn set_state(&mut self, target: StateTarget) -> Result<()> {
        if self.is_main() {
            return Err(RpcctlError::MainXprtProtected {
                action: format!("set {}", target),
            });
        }
        debug!(xprt = %self.name, %target, "setting xprt state");
        self.store.write(&self.path.join("xprt_state"), target.as_str())?;
        self.refresh_state()
    }

    /// Rewrites the destination address. The cached value follows the
    /// read-back, which is what the kernel actually stored.
    ///
    /// Allowed on main xprts: moving a group to a new address must move its
    /// main connection too.
    pub fn set_dstaddr(&mut self, addr: &str) -> Result<()> {
        self.dstaddr = self.store.write_scalar(&self.path.join("dstaddr"), addr)?;
        Ok(())
    }

    /// Takes the transport offline, then asks for removal.
    ///
    /// The kernel refuses to tear down a live transport, so the offline
    /// write must succeed before the remove write is issued.
    pub fn remove(&mut self) -> Result<()> {
        if self.is_main() {
            return Err(RpcctlError::MainXprtProtected {
                action: "removed".to_string(),
            });
        }
        self.set_state(StateTarget::Offline)?;
        self.set_state(StateTarget::Remove)
    }

    /// One-line membership summary used in switch listings.
    pub fn summary(&self) -> String {
        let main = if self.is_main() { " [main]" } else { "" };
        format!("{}: {}, {}{}", self.name, self.kind, self.dstaddr, main)
    }
}

impl fmt::Display for Xprt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.store.exists(&self.path) {
            return write!(f, "{}: has been removed", self.name);
        }
        let main = if self.is_main() { ", main" } else { "" };
        writeln!(
            f,
            "{}: {}, {}, port {}, sec {}, state <{}>{}",
            self.name,
            self.kind,
            self.dstaddr,
            self.info.get("dst_port"),
            self.xprtsec,
            self.state,
            main
        )?;
        writeln!(
            f,
            "\tSource: {}, port {}, Requests: {}",
            self.srcaddr,
            self.info.get("src_port"),
            self.info.get("num_reqs")
        )?;
        writeln!(
            f,
            "\tCongestion: cur {}, win {}, Slots: min {}, max {}",
            self.info.get("cur_cong"),
            self.info.get("cong_win"),
            self.info.get("min_num_slots"),
            self.info.get("max_num_slots")
        )?;
        write!(
            f,
            "\tQueues: binding {}, sending {}, pending {}, backlog {}, tasks {}",
            self.info.get("binding_q_len"),
            self.info.get("sending_q_len"),
            self.info.get("pending_q_len"),
            self.info.get("backlog_q_len"),
            self.info.get("tasks_queuelen")
        )
    }
}

/// First line of `xprt_state` minus the leading numeric code, labels joined
/// with commas.
fn read_state(store: &dyn RecordStore, dir: &Path) -> Result<String> {
    let line = store.read_line(&dir.join("xprt_state"))?;
    Ok(line.split_whitespace().skip(1).collect::<Vec<_>>().join(","))
}
