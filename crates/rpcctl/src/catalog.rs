//! Name-based discovery across the sunrpc hierarchy.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::client::RpcClient;
use crate::error::{Result, RpcctlError};
use crate::record::{self, RecordStore};
use crate::switch::XprtSwitch;
use crate::xprt::Xprt;

/// Lookup root for xprts, switches and clients under one sunrpc directory.
#[derive(Debug)]
pub struct Catalog {
    store: Arc<dyn RecordStore>,
    root: PathBuf,
}

impl Catalog {
    /// A catalog rooted at `<sysfs>/kernel/sunrpc`.
    pub fn new(store: Arc<dyn RecordStore>, root: PathBuf) -> Self {
        Catalog { store, root }
    }

    /// The sunrpc directory this catalog reads.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn switches_dir(&self) -> PathBuf {
        self.root.join("xprt-switches")
    }

    fn clients_dir(&self) -> PathBuf {
        self.root.join("rpc-clients")
    }

    /// Xprts across every switch, name-sorted.
    ///
    /// With a name, matches every xprt directory named `<name>-<kind>` for
    /// any kind; kernels append a `-<n>` suffix to sibling connections, so a
    /// short name can legitimately match several xprts. A named lookup that
    /// matches nothing is `NotFound`, carrying the pattern that was tried.
    pub fn xprts(&self, name: Option<&str>) -> Result<Vec<Xprt>> {
        let prefix = format!("{}-", name.unwrap_or("xprt"));
        let mut xprts = Vec::new();
        for switch in self.store.list_dir(&self.switches_dir())? {
            if !self.store.is_dir(&switch) {
                continue;
            }
            for entry in self.store.list_dir(&switch)? {
                if record::stem(&entry).starts_with(&prefix) && self.store.is_dir(&entry) {
                    xprts.push(Xprt::load(self.store.clone(), entry)?);
                }
            }
        }
        if name.is_some() && xprts.is_empty() {
            return Err(RpcctlError::NotFound {
                path: format!("{}/*/{}*", self.switches_dir().display(), prefix),
            });
        }
        xprts.sort_by(|a, b| a.name().cmp(b.name()));
        debug!(count = xprts.len(), "matched xprts");
        Ok(xprts)
    }

    /// The named switch alone, or every switch, name-sorted.
    pub fn switches(&self, name: Option<&str>) -> Result<Vec<XprtSwitch>> {
        let dir = self.switches_dir();
        let mut switches = Vec::new();
        match name {
            Some(name) => {
                switches.push(XprtSwitch::load(self.store.clone(), dir.join(name))?);
            }
            None => {
                for entry in self.store.list_dir(&dir)? {
                    if self.store.is_dir(&entry) {
                        switches.push(XprtSwitch::load(self.store.clone(), entry)?);
                    }
                }
            }
        }
        switches.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(switches)
    }

    /// The named client alone, or every client, name-sorted.
    pub fn clients(&self, name: Option<&str>) -> Result<Vec<RpcClient>> {
        let dir = self.clients_dir();
        let mut clients = Vec::new();
        match name {
            Some(name) => {
                clients.push(RpcClient::load(self.store.clone(), dir.join(name))?);
            }
            None => {
                for entry in self.store.list_dir(&dir)? {
                    if self.store.is_dir(&entry) {
                        clients.push(RpcClient::load(self.store.clone(), entry)?);
                    }
                }
            }
        }
        clients.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(clients)
    }
}
