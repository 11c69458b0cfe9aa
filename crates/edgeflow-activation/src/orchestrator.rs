//! Top-level activation orchestration.
//!
//! The `Orchestrator` composes the pieces: build a descriptor, attach
//! to an existing activation or submit a new one, then wait on the
//! status poller until the activation goes active, the poller reports
//! another terminal status, or the wait ceiling elapses. Hitting the
//! ceiling is a defined outcome — the deployment may still complete
//! remotely, and a later call will find and reuse it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use edgeflow_client::ControlPlane;
use edgeflow_core::{
    ActivationConfig, ActivationDescriptor, ActivationId, ActivationStatus, ActivationType,
    Version,
};

use crate::error::{ActivationError, ActivationResult};
use crate::matcher;
use crate::poller::StatusPoller;
use crate::request::ActivationRequest;
use crate::submitter;

/// What an orchestration call reports back.
///
/// All fields are empty on the no-op paths (activation disabled, or a
/// deactivation whose target version was not active).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationOutcome {
    pub activation_id: Option<ActivationId>,
    /// Last observed status. On timeout this is the most recent
    /// non-active status, not an error.
    pub status: Option<ActivationStatus>,
    /// The version the call resolved and acted on.
    pub version: Option<Version>,
}

impl ActivationOutcome {
    fn noop(version: Option<Version>) -> Self {
        Self {
            activation_id: None,
            status: None,
            version,
        }
    }
}

/// Orchestrates activations against one control-plane client.
///
/// Holds no ambient global state: construct one and pass it where it
/// is needed. Each call re-fetches remote state; nothing is cached
/// between calls.
pub struct Orchestrator<C: ControlPlane> {
    client: Arc<C>,
    config: ActivationConfig,
}

impl<C: ControlPlane> Orchestrator<C> {
    pub fn new(client: Arc<C>, config: ActivationConfig) -> Self {
        Self { client, config }
    }

    /// Deploy a version to a network.
    ///
    /// Reuses an equivalent in-flight or already-active activation
    /// when one exists; otherwise submits a new one. Waits for the
    /// activation to go active, up to the configured ceiling.
    pub async fn activate(&self, request: ActivationRequest) -> ActivationResult<ActivationOutcome> {
        if !request.enabled {
            debug!(property_id = %request.property_id, "activation disabled, nothing to do");
            return Ok(ActivationOutcome::noop(request.version));
        }

        let mut request = request;
        request.activation_type = ActivationType::Activate;
        let descriptor = self.build_descriptor(&request).await?;

        let (activation_id, status) = self.match_or_submit(&descriptor).await?;
        let final_status = self
            .await_outcome(&descriptor.property_id, &activation_id, status)
            .await;

        info!(
            property_id = %descriptor.property_id,
            %activation_id,
            version = descriptor.version,
            network = %descriptor.network,
            status = %final_status,
            "activation finished"
        );
        Ok(ActivationOutcome {
            activation_id: Some(activation_id),
            status: Some(final_status),
            version: Some(descriptor.version),
        })
    }

    /// Withdraw a version from a network.
    ///
    /// If the targeted version is not the one currently active on the
    /// network, the deactivation is already satisfied: success, no
    /// submission, empty activation id.
    pub async fn deactivate(
        &self,
        request: ActivationRequest,
    ) -> ActivationResult<ActivationOutcome> {
        let mut request = request;
        request.activation_type = ActivationType::Deactivate;
        let descriptor = self.build_descriptor(&request).await?;

        let snapshot = self
            .client
            .property_snapshot(&descriptor.property_id)
            .await?;
        if !submitter::deactivation_applies(&snapshot, &descriptor) {
            info!(
                property_id = %descriptor.property_id,
                version = descriptor.version,
                network = %descriptor.network,
                active_version = ?snapshot.active_version(descriptor.network),
                "version not active on network, deactivation already satisfied"
            );
            return Ok(ActivationOutcome::noop(Some(descriptor.version)));
        }

        let (activation_id, status) = self.match_or_submit(&descriptor).await?;
        let final_status = self
            .await_outcome(&descriptor.property_id, &activation_id, status)
            .await;

        info!(
            property_id = %descriptor.property_id,
            %activation_id,
            version = descriptor.version,
            network = %descriptor.network,
            status = %final_status,
            "deactivation finished"
        );
        Ok(ActivationOutcome {
            activation_id: Some(activation_id),
            status: Some(final_status),
            version: Some(descriptor.version),
        })
    }

    // ── Internal helpers ────────────────────────────────────────────

    async fn build_descriptor(
        &self,
        request: &ActivationRequest,
    ) -> ActivationResult<ActivationDescriptor> {
        let mut descriptor = request.build(&*self.client).await?;
        if descriptor.note.is_none() {
            descriptor.note = Some(self.config.note().to_string());
        }
        Ok(descriptor)
    }

    /// Attach to a matching existing activation or submit a new one.
    ///
    /// A refused submission gets one more match pass: a concurrent
    /// client may have created the activation we wanted, in which case
    /// it is adopted instead of failing the call.
    async fn match_or_submit(
        &self,
        descriptor: &ActivationDescriptor,
    ) -> ActivationResult<(ActivationId, ActivationStatus)> {
        let history = self
            .client
            .list_activations(&descriptor.property_id)
            .await?;
        if let Some(existing) = matcher::find_reusable(&history, descriptor) {
            info!(
                property_id = %descriptor.property_id,
                activation_id = %existing.activation_id,
                status = %existing.status,
                "reusing existing activation"
            );
            return Ok((existing.activation_id.clone(), existing.status));
        }

        match submitter::submit(&*self.client, descriptor).await {
            Ok(activation_id) => Ok((activation_id, ActivationStatus::New)),
            Err(err @ ActivationError::Submission(_)) => {
                let history = self
                    .client
                    .list_activations(&descriptor.property_id)
                    .await?;
                if let Some(existing) = matcher::find_reusable(&history, descriptor) {
                    info!(
                        property_id = %descriptor.property_id,
                        activation_id = %existing.activation_id,
                        "adopting activation submitted by a concurrent client"
                    );
                    Ok((existing.activation_id.clone(), existing.status))
                } else {
                    Err(err)
                }
            }
            Err(other) => Err(other),
        }
    }

    /// Wait for the activation to settle: exits on an observed
    /// `Active`, on the poller ending after another terminal status,
    /// or on timeout — whichever comes first. Returns the last
    /// observed status.
    async fn await_outcome(
        &self,
        property_id: &str,
        activation_id: &str,
        initial: ActivationStatus,
    ) -> ActivationStatus {
        if initial.is_terminal() {
            return initial;
        }

        let mut poller = StatusPoller::spawn(
            self.client.clone(),
            property_id.to_string(),
            activation_id.to_string(),
            initial,
            self.config.poll_interval(),
        );
        let timeout = tokio::time::sleep(self.config.timeout());
        tokio::pin!(timeout);

        let mut current = initial;
        loop {
            tokio::select! {
                update = poller.recv() => match update {
                    Some(status) => {
                        debug!(%property_id, %activation_id, %status, "observed status");
                        current = status;
                        if status == ActivationStatus::Active {
                            break;
                        }
                    }
                    // Poll loop ended after delivering a terminal status.
                    None => break,
                },
                _ = &mut timeout => {
                    warn!(
                        %property_id,
                        %activation_id,
                        last_status = %current,
                        "gave up waiting for activation to settle"
                    );
                    break;
                }
            }
        }
        poller.stop();
        current
    }
}
