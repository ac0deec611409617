#![warn(missing_docs)]

//! rpcctl: operator control of the kernel's SunRPC transports via sysfs.
//!
//! The kernel publishes its RPC transport pool under `<sysfs>/kernel/sunrpc`:
//! every transport connection (xprt), the switches grouping them, and the rpc
//! clients bound to those switches each get a directory of small text
//! records. This crate models the records as typed entities and drives the
//! writable ones: lifecycle state, destination addresses, and on-demand
//! member creation.

pub mod catalog;
pub mod cli;
pub mod client;
pub mod error;
pub mod mount;
pub mod record;
pub mod resolve;
pub mod switch;
pub mod xprt;

#[cfg(test)]
mod testing;

pub use error::{Result, RpcctlError};
