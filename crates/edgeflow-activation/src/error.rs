//! Activation orchestration error types.
//!
//! A polling timeout and a failed deactivation precondition are
//! defined outcomes, not errors — they never appear here.

use thiserror::Error;

use edgeflow_client::ClientError;
use edgeflow_core::Network;

/// Errors that can occur while orchestrating an activation.
#[derive(Debug, Error)]
pub enum ActivationError {
    /// No target version could be determined. Fatal, no retry.
    #[error("unable to resolve a version for {property_id} on {network}: {source}")]
    VersionResolution {
        property_id: String,
        network: Network,
        #[source]
        source: ClientError,
    },

    #[error("no notification contacts provided")]
    NoContacts,

    #[error("invalid notification contact: {0:?}")]
    InvalidContact(String),

    /// The control plane refused the activation. Fatal to this call;
    /// re-invoking will find whatever the remote ended up doing.
    #[error("activation submission failed: {0}")]
    Submission(#[source] ClientError),

    #[error("control plane error: {0}")]
    Client(#[from] ClientError),
}

pub type ActivationResult<T> = Result<T, ActivationError>;
