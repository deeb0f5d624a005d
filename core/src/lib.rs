//! Simple commissioning initiator for mesh networks.
//!
//! The initiator brings the local node onto a network, broadcasts an identify
//! query, and for every device that answers while identifying it discovers the
//! remote clusters, resolves the remote extended address, and writes unicast
//! bindings for the clusters the local endpoint is interested in.
//!
//! The radio stack, the binding table storage and the timer are collaborators,
//! see [`network::Network`], [`binding::BindingTable`] and
//! [`scheduler::Scheduler`]. [`CommissioningEngine`] is the state machine that
//! coordinates them.

#[macro_use]
extern crate num_derive;

/// Bindings written by the initiator and the table they are stored in
pub mod binding;
/// Cluster identifiers and cluster lists
pub mod cluster;
pub mod commissioning;
pub mod config;
pub mod constants;
pub mod data_model;
#[cfg(feature = "std-tokio")]
pub mod driver;
pub mod error;
pub mod network;
pub mod scheduler;
pub mod util;

#[cfg(test)]
mod test_utils;

pub use commissioning::CommissioningEngine;
pub use config::CommissioningConfig;
pub use error::{Error, Result};
pub use util::state::{CommissioningEvent, CommissioningState};
