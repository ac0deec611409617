//! Rpc clients and the switch each one is bound to.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::record::{self, Missing, RecordStore};
use crate::switch::XprtSwitch;

/// An rpc client directory under `rpc-clients/`, plus the switch its
/// `switch` symlink points at.
#[derive(Debug)]
pub struct RpcClient {
    name: String,
    switch: XprtSwitch,
    program: String,
    version: String,
    max_connect: String,
}

impl RpcClient {
    /// Loads a client, following its `switch` link to load the switch too.
    ///
    /// The link target is relative to the client directory, exactly as the
    /// kernel publishes it. Program, version and connection-cap scalars
    /// degrade to `(unknown)` on kernels that do not publish them.
    pub fn load(store: Arc<dyn RecordStore>, path: PathBuf) -> Result<Self> {
        let name = record::stem(&path).to_string();
        let target = store.read_link(&path.join("switch"))?;
        let switch = XprtSwitch::load(store.clone(), path.join(target))?;
        let program = store.read_scalar(&path.join("program"), Missing::Unknown)?;
        let version = store.read_scalar(&path.join("rpc_version"), Missing::Unknown)?;
        let max_connect = store.read_scalar(&path.join("max_connect"), Missing::Unknown)?;
        Ok(RpcClient {
            name,
            switch,
            program,
            version,
            max_connect,
        })
    }

    /// The client's name, e.g. `clnt-a8`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The switch this client dispatches through.
    pub fn switch(&self) -> &XprtSwitch {
        &self.switch
    }

    /// The rpc program served, e.g. `nfs`.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The rpc protocol version in use.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Upper bound on concurrent transports for this client.
    pub fn max_connect(&self) -> &str {
        &self.max_connect
    }
}

impl fmt::Display for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}, rpc version {}, max_connect {}\n  {}{}",
            self.name,
            self.program,
            self.version,
            self.max_connect,
            " ".repeat(self.name.len()),
            self.switch
        )
    }
}
