//! Activation submission and the deactivation precondition.
//!
//! `submit` is the only path that creates new remote activation
//! records. Deactivation is additionally gated on the targeted version
//! being the one currently active on the network — withdrawing a
//! version that is not active is already satisfied, not an error.

use tracing::{info, warn};

use edgeflow_client::ControlPlane;
use edgeflow_core::{ActivationDescriptor, ActivationId, PropertySnapshot};

use crate::error::{ActivationError, ActivationResult};

/// Submit a new activation to the control plane.
///
/// No automatic retry: a refusal surfaces as
/// [`ActivationError::Submission`] and the caller decides what to do.
pub async fn submit<C: ControlPlane + ?Sized>(
    client: &C,
    descriptor: &ActivationDescriptor,
) -> ActivationResult<ActivationId> {
    match client
        .submit_activation(&descriptor.property_id, descriptor)
        .await
    {
        Ok(activation_id) => {
            info!(
                property_id = %descriptor.property_id,
                %activation_id,
                version = descriptor.version,
                network = %descriptor.network,
                activation_type = %descriptor.activation_type,
                "activation submitted"
            );
            Ok(activation_id)
        }
        Err(source) => {
            warn!(
                property_id = %descriptor.property_id,
                version = descriptor.version,
                network = %descriptor.network,
                error = %source,
                "submission refused"
            );
            Err(ActivationError::Submission(source))
        }
    }
}

/// True if the deactivation targets the version currently active on
/// its network. When false, the deactivation is a no-op.
pub fn deactivation_applies(
    snapshot: &PropertySnapshot,
    descriptor: &ActivationDescriptor,
) -> bool {
    snapshot.active_version(descriptor.network) == Some(descriptor.version)
}
