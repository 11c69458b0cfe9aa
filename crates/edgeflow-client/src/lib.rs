//! Edgeflow control-plane contract.
//!
//! The orchestrator talks to the remote control plane exclusively
//! through the [`ControlPlane`] trait. Transport, authentication, and
//! retry policy for transient failures belong to the implementation,
//! not to this contract.
//!
//! # Components
//!
//! - **`error`** — ClientError taxonomy (not-found, rejection, transport)
//! - **`memory`** — InMemoryControlPlane, the in-process test backend

pub mod error;
pub mod memory;

pub use error::{ClientError, ClientResult};
pub use memory::InMemoryControlPlane;

use async_trait::async_trait;
use edgeflow_core::{
    ActivationDescriptor, ActivationId, ActivationRecord, ActivationStatus, Network,
    PropertySnapshot, Version,
};

/// Remote control-plane operations consumed by the orchestrator.
///
/// Implementations must be `Send + Sync + 'static` so the poller can
/// run against them from a spawned task.
#[async_trait]
pub trait ControlPlane: Send + Sync + 'static {
    /// Latest version of the property, optionally scoped to the
    /// version history of one network.
    ///
    /// Fails with [`ClientError::PropertyNotFound`] for an unknown
    /// property.
    async fn latest_version(
        &self,
        property_id: &str,
        network: Option<Network>,
    ) -> ClientResult<Version>;

    /// All historical activations for the property, in control-plane
    /// order. The order is opaque but stable.
    async fn list_activations(&self, property_id: &str) -> ClientResult<Vec<ActivationRecord>>;

    /// Submit a new activation. The only operation that creates remote
    /// activation records.
    ///
    /// Fails with [`ClientError::RemoteRejection`] carrying the remote
    /// error payload when the control plane refuses the descriptor.
    async fn submit_activation(
        &self,
        property_id: &str,
        descriptor: &ActivationDescriptor,
    ) -> ClientResult<ActivationId>;

    /// Current status of one activation. Polled repeatedly.
    async fn activation_status(
        &self,
        property_id: &str,
        activation_id: &str,
    ) -> ClientResult<ActivationStatus>;

    /// Currently-active versions per network.
    async fn property_snapshot(&self, property_id: &str) -> ClientResult<PropertySnapshot>;
}
