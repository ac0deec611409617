//! Groups of transport connections sharing dispatch counters.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::record::{self, InfoTable, RecordStore};
use crate::xprt::Xprt;

/// An xprt switch: the kernel's grouping of xprts behind one rpc client.
///
/// Holds a point-in-time snapshot of its member xprts, name-sorted.
#[derive(Debug)]
pub struct XprtSwitch {
    store: Arc<dyn RecordStore>,
    path: PathBuf,
    name: String,
    info: InfoTable,
    xprts: Vec<Xprt>,
}

impl XprtSwitch {
    /// Loads a switch and every xprt directory beneath it.
    pub fn load(store: Arc<dyn RecordStore>, path: PathBuf) -> Result<Self> {
        let name = record::stem(&path).to_string();
        let info = store.read_table(&path.join("xprt_switch_info"));
        let mut xprts = Vec::new();
        for entry in store.list_dir(&path)? {
            if store.is_dir(&entry) {
                xprts.push(Xprt::load(store.clone(), entry)?);
            }
        }
        xprts.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(XprtSwitch {
            store,
            path,
            name,
            info,
            xprts,
        })
    }

    /// The switch's name, e.g. `switch-0`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member xprts in name order.
    pub fn xprts(&self) -> &[Xprt] {
        &self.xprts
    }

    /// Asks the kernel to instantiate another transport in this group.
    ///
    /// Fire-and-forget: the kernel creates the member asynchronously and it
    /// shows up in a later listing. Nothing is read back.
    pub fn add_xprt(&self) -> Result<()> {
        debug!(switch = %self.name, "requesting new xprt");
        self.store.write(&self.path.join("add_xprt"), "1")
    }

    /// Points every member, the main xprt included, at a new destination.
    ///
    /// Members are updated in name order and the first failure aborts the
    /// sweep: earlier members keep the new address, later ones are untouched.
    pub fn set_dstaddr(&mut self, addr: &str) -> Result<()> {
        debug!(switch = %self.name, addr, count = self.xprts.len(), "updating destinations");
        for xprt in &mut self.xprts {
            xprt.set_dstaddr(addr)?;
        }
        Ok(())
    }
}

impl fmt::Display for XprtSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: xprts {}, active {}, queue {}",
            self.name,
            self.info.get("num_xprts"),
            self.info.get("num_active"),
            self.info.get("queue_len")
        )?;
        for xprt in &self.xprts {
            write!(f, "\n\t{}", xprt.summary())?;
        }
        Ok(())
    }
}
