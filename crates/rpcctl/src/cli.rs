//! Command-line surface and dispatch.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};

use crate::catalog::Catalog;
use crate::error::{Result, RpcctlError};
use crate::mount;
use crate::record::SysfsStore;
use crate::resolve::resolve;
use crate::xprt::{StateTarget, Xprt};

/// Command line for the `rpcctl` binary.
#[derive(Debug, Parser)]
#[command(name = "rpcctl")]
#[command(about = "Displays and controls SunRPC transports via sysfs", long_about = None)]
pub struct Cli {
    /// Sunrpc sysfs directory (default: discovered from /proc/mounts)
    #[arg(long, env = "RPCCTL_SYSFS", value_name = "DIR", global = true)]
    pub root: Option<PathBuf>,

    /// Object class to operate on
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level object classes.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Commands for rpc clients
    Client {
        /// Client subcommand, defaults to show
        #[command(subcommand)]
        cmd: Option<ClientCmd>,
    },
    /// Commands for xprt switches
    Switch {
        /// Switch subcommand, defaults to show
        #[command(subcommand)]
        cmd: Option<SwitchCmd>,
    },
    /// Commands for individual xprts
    Xprt {
        /// Xprt subcommand, defaults to show
        #[command(subcommand)]
        cmd: Option<XprtCmd>,
    },
}

/// Operations on rpc clients.
#[derive(Debug, Subcommand)]
pub enum ClientCmd {
    /// Show rpc clients
    Show {
        /// Name of a specific rpc client to show
        client: Option<String>,
    },
}

/// Operations on xprt switches.
#[derive(Debug, Subcommand)]
pub enum SwitchCmd {
    /// Show xprt switches
    Show {
        /// Name of a specific xprt switch to show
        switch: Option<String>,
    },
    /// Add a new xprt to the switch
    AddXprt {
        /// Name of the xprt switch to add an xprt to
        switch: String,
    },
    /// Change an xprt switch property
    Set {
        /// Name of the xprt switch to modify
        switch: String,
        /// Property to change
        #[command(subcommand)]
        property: SwitchProperty,
    },
}

/// Writable switch properties.
#[derive(Debug, Subcommand)]
pub enum SwitchProperty {
    /// Change the destination address of every xprt in the switch
    Dstaddr {
        /// The new address or hostname
        newaddr: String,
    },
}

/// Operations on individual xprts.
#[derive(Debug, Subcommand)]
pub enum XprtCmd {
    /// Show xprts
    Show {
        /// Name of a specific xprt to show
        xprt: Option<String>,
    },
    /// Offline and remove an xprt
    Remove {
        /// Name of the xprt to remove
        xprt: String,
    },
    /// Change an xprt property
    Set {
        /// Name of the xprt to modify
        xprt: String,
        /// Property to change
        #[command(subcommand)]
        property: XprtProperty,
    },
}

/// Writable xprt properties.
#[derive(Debug, Subcommand)]
pub enum XprtProperty {
    /// Set the xprt online
    Online,
    /// Set the xprt offline
    Offline,
    /// Change the destination address
    Dstaddr {
        /// The new address or hostname
        newaddr: String,
    },
}

impl Cli {
    /// Executes the parsed command against the backing sysfs tree.
    pub fn run(self) -> Result<()> {
        let root = match self.root {
            Some(root) => {
                if !root.is_dir() {
                    return Err(RpcctlError::NotFound {
                        path: root.display().to_string(),
                    });
                }
                root
            }
            None => mount::sunrpc_root()?,
        };
        let catalog = Catalog::new(Arc::new(SysfsStore), root);

        match self.command {
            None => {
                println!("{}", Cli::command().render_usage());
                println!("sunrpc dir: {}", catalog.root().display());
                Ok(())
            }
            Some(Command::Client { cmd }) => {
                run_client(&catalog, cmd.unwrap_or(ClientCmd::Show { client: None }))
            }
            Some(Command::Switch { cmd }) => {
                run_switch(&catalog, cmd.unwrap_or(SwitchCmd::Show { switch: None }))
            }
            Some(Command::Xprt { cmd }) => {
                run_xprt(&catalog, cmd.unwrap_or(XprtCmd::Show { xprt: None }))
            }
        }
    }
}

fn run_client(catalog: &Catalog, cmd: ClientCmd) -> Result<()> {
    match cmd {
        ClientCmd::Show { client } => {
            for client in catalog.clients(client.as_deref())? {
                println!("{}", client);
            }
            Ok(())
        }
    }
}

fn run_switch(catalog: &Catalog, cmd: SwitchCmd) -> Result<()> {
    match cmd {
        SwitchCmd::Show { switch } => {
            for switch in catalog.switches(switch.as_deref())? {
                println!("{}", switch);
            }
            Ok(())
        }
        SwitchCmd::AddXprt { switch } => {
            for switch in catalog.switches(Some(&switch))? {
                switch.add_xprt()?;
            }
            Ok(())
        }
        SwitchCmd::Set {
            switch,
            property: SwitchProperty::Dstaddr { newaddr },
        } => {
            let mut switches = catalog.switches(Some(&switch))?;
            let addr = resolve(&newaddr)?;
            for switch in &mut switches {
                switch.set_dstaddr(&addr)?;
            }
            if let Some(switch) = switches.last() {
                println!("{}", switch);
            }
            Ok(())
        }
    }
}

fn run_xprt(catalog: &Catalog, cmd: XprtCmd) -> Result<()> {
    match cmd {
        XprtCmd::Show { xprt } => {
            for xprt in catalog.xprts(xprt.as_deref())? {
                println!("{}", xprt);
            }
            Ok(())
        }
        XprtCmd::Remove { xprt } => {
            let mut xprts = catalog.xprts(Some(&xprt))?;
            for xprt in &mut xprts {
                xprt.remove()?;
            }
            print_last(&xprts);
            Ok(())
        }
        XprtCmd::Set { xprt, property } => {
            let mut xprts = catalog.xprts(Some(&xprt))?;
            match property {
                XprtProperty::Online => {
                    for xprt in &mut xprts {
                        xprt.set_state(StateTarget::Online)?;
                    }
                }
                XprtProperty::Offline => {
                    for xprt in &mut xprts {
                        xprt.set_state(StateTarget::Offline)?;
                    }
                }
                XprtProperty::Dstaddr { newaddr } => {
                    let addr = resolve(&newaddr)?;
                    for xprt in &mut xprts {
                        xprt.set_dstaddr(&addr)?;
                    }
                }
            }
            print_last(&xprts);
            Ok(())
        }
    }
}

/// Mutating commands echo the final state of the last entity they touched.
fn print_last(xprts: &[Xprt]) {
    if let Some(xprt) = xprts.last() {
        println!("{}", xprt);
    }
}
