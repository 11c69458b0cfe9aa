//! Reuse scan over the remote activation history.
//!
//! The control plane — not this process — is the source of truth for
//! outstanding activations, and other clients may be driving it
//! concurrently. Instead of locking, the orchestrator reuses any
//! existing activation that already satisfies the desired outcome,
//! which keeps duplicate submissions out and attaches the caller to
//! the correct in-progress deployment.

use tracing::debug;

use edgeflow_core::{ActivationDescriptor, ActivationRecord};

/// Find an existing activation satisfying `descriptor`.
///
/// Returns the first history entry (in control-plane order) whose
/// status is in the reusable set and whose `(version, network, type)`
/// equals the descriptor's. `None` is not an error — it means a new
/// submission is needed.
pub fn find_reusable<'a>(
    history: &'a [ActivationRecord],
    descriptor: &ActivationDescriptor,
) -> Option<&'a ActivationRecord> {
    let found = history
        .iter()
        .find(|record| record.status.is_reusable() && descriptor.matches(record));

    match found {
        Some(record) => debug!(
            activation_id = %record.activation_id,
            status = %record.status,
            version = record.version,
            network = %record.network,
            "found existing activation"
        ),
        None => debug!(
            version = descriptor.version,
            network = %descriptor.network,
            "no existing activation matches"
        ),
    }
    found
}
