//! Control-plane client error types.

use thiserror::Error;

/// Errors surfaced by a control-plane client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("property not found: {0}")]
    PropertyNotFound(String),

    #[error("activation not found: {property_id}/{activation_id}")]
    ActivationNotFound {
        property_id: String,
        activation_id: String,
    },

    /// The control plane refused the request. Carries the remote
    /// error payload verbatim.
    #[error("control plane rejected request (status {status}): {detail}")]
    RemoteRejection {
        status: u16,
        detail: serde_json::Value,
    },

    #[error("transport error: {0}")]
    Transport(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
