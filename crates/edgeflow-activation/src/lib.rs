//! Edgeflow activation orchestration.
//!
//! Drives deployment (activation) and rollback (deactivation) of a
//! versioned configuration artifact onto a delivery network, against a
//! control plane that performs the work asynchronously and exposes it
//! only through a polled status endpoint.
//!
//! The orchestration is: build a descriptor → look for an existing
//! activation that already satisfies it → submit a new one only when
//! none does → poll until a terminal status or the wait ceiling.
//!
//! # Components
//!
//! - **`request`** — ActivationRequest and descriptor building (version resolution, contact validation)
//! - **`matcher`** — reuse scan over the remote activation history
//! - **`submitter`** — submission and the deactivation precondition
//! - **`poller`** — background status poll task
//! - **`orchestrator`** — the top-level activate/deactivate flows

pub mod error;
pub mod matcher;
pub mod orchestrator;
pub mod poller;
pub mod request;
pub mod submitter;

pub use error::{ActivationError, ActivationResult};
pub use orchestrator::{ActivationOutcome, Orchestrator};
pub use poller::StatusPoller;
pub use request::ActivationRequest;
