//! Edgeflow domain types — activations, networks, property snapshots.
//!
//! This crate holds the shared vocabulary of the workspace: the
//! descriptor that identifies a desired activation, the record shape
//! the control plane reports back, the status state machine, and the
//! orchestrator configuration.
//!
//! # Components
//!
//! - **`types`** — Network, ActivationType, ActivationStatus, descriptor/record/snapshot
//! - **`config`** — ActivationConfig (timeouts, poll cadence, submission note)

pub mod config;
pub mod types;

pub use config::ActivationConfig;
pub use types::*;
