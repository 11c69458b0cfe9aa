//! In-memory control plane.
//!
//! An in-process [`ControlPlane`] used by tests across the workspace.
//! Properties and activation history are seeded directly; newly
//! submitted activations walk through a scripted status progression,
//! one step per status fetch, so polling behavior can be exercised
//! deterministically.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use edgeflow_core::{
    ActivationDescriptor, ActivationId, ActivationRecord, ActivationStatus, Network, PropertyId,
    PropertySnapshot, Version,
};

use crate::error::{ClientError, ClientResult};
use crate::ControlPlane;

struct StoredActivation {
    record: ActivationRecord,
    /// Remaining statuses this activation walks through; one is
    /// consumed per status fetch. Empty means the status is settled.
    script: VecDeque<ActivationStatus>,
}

struct PropertyEntry {
    latest_version: Version,
    staging_version: Option<Version>,
    production_version: Option<Version>,
    activations: Vec<StoredActivation>,
}

#[derive(Default)]
struct Inner {
    properties: HashMap<PropertyId, PropertyEntry>,
    /// Statuses applied to activations created via `submit_activation`.
    submission_script: Vec<ActivationStatus>,
    /// Total successful submissions.
    submissions: u64,
    /// When set, `submit_activation` fails with a remote rejection.
    reject_submissions: bool,
    /// Record appended to history at the moment a submission is
    /// rejected, simulating a concurrent client winning the race.
    racing_activation: Option<ActivationRecord>,
    racing_property: String,
    /// Outstanding injected transport failures for status fetches.
    transient_status_failures: u32,
    next_id: u64,
}

/// In-process control plane backed by a shared map.
#[derive(Clone)]
pub struct InMemoryControlPlane {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Register a property with its latest and per-network versions.
    pub async fn add_property(
        &self,
        property_id: &str,
        latest_version: Version,
        staging_version: Option<Version>,
        production_version: Option<Version>,
    ) {
        let mut inner = self.inner.lock().await;
        inner.properties.insert(
            property_id.to_string(),
            PropertyEntry {
                latest_version,
                staging_version,
                production_version,
                activations: Vec::new(),
            },
        );
    }

    /// Append a pre-existing activation to a property's history.
    pub async fn seed_activation(&self, property_id: &str, record: ActivationRecord) {
        self.seed_activation_with_script(property_id, record, Vec::new())
            .await;
    }

    /// Append a pre-existing activation whose status walks through
    /// `script` on successive fetches.
    pub async fn seed_activation_with_script(
        &self,
        property_id: &str,
        record: ActivationRecord,
        script: Vec<ActivationStatus>,
    ) {
        let mut inner = self.inner.lock().await;
        if let Some(entry) = inner.properties.get_mut(property_id) {
            entry.activations.push(StoredActivation {
                record,
                script: script.into(),
            });
        }
    }

    /// Set the status progression applied to future submissions.
    pub async fn set_submission_script(&self, script: Vec<ActivationStatus>) {
        let mut inner = self.inner.lock().await;
        inner.submission_script = script;
    }

    /// Make future submissions fail with a remote rejection.
    pub async fn reject_submissions(&self, reject: bool) {
        let mut inner = self.inner.lock().await;
        inner.reject_submissions = reject;
    }

    /// On the next rejected submission, append `record` to the
    /// property's history — as if a concurrent client submitted the
    /// conflicting activation that caused the rejection.
    pub async fn reject_with_racing_activation(&self, property_id: &str, record: ActivationRecord) {
        let mut inner = self.inner.lock().await;
        inner.reject_submissions = true;
        inner.racing_activation = Some(record);
        inner.racing_property = property_id.to_string();
    }

    /// Inject `count` transport failures into upcoming status fetches.
    pub async fn fail_status_fetches(&self, count: u32) {
        let mut inner = self.inner.lock().await;
        inner.transient_status_failures = count;
    }

    /// Number of successful submissions so far.
    pub async fn submission_count(&self) -> u64 {
        self.inner.lock().await.submissions
    }

    /// Current history of a property (test assertions).
    pub async fn history(&self, property_id: &str) -> Vec<ActivationRecord> {
        let inner = self.inner.lock().await;
        inner
            .properties
            .get(property_id)
            .map(|entry| entry.activations.iter().map(|a| a.record.clone()).collect())
            .unwrap_or_default()
    }
}

impl Default for InMemoryControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ControlPlane for InMemoryControlPlane {
    async fn latest_version(
        &self,
        property_id: &str,
        _network: Option<Network>,
    ) -> ClientResult<Version> {
        let inner = self.inner.lock().await;
        let entry = inner
            .properties
            .get(property_id)
            .ok_or_else(|| ClientError::PropertyNotFound(property_id.to_string()))?;
        Ok(entry.latest_version)
    }

    async fn list_activations(&self, property_id: &str) -> ClientResult<Vec<ActivationRecord>> {
        let inner = self.inner.lock().await;
        let entry = inner
            .properties
            .get(property_id)
            .ok_or_else(|| ClientError::PropertyNotFound(property_id.to_string()))?;
        Ok(entry.activations.iter().map(|a| a.record.clone()).collect())
    }

    async fn submit_activation(
        &self,
        property_id: &str,
        descriptor: &ActivationDescriptor,
    ) -> ClientResult<ActivationId> {
        let mut inner = self.inner.lock().await;
        if inner.reject_submissions {
            if let Some(record) = inner.racing_activation.take() {
                let racing_property = inner.racing_property.clone();
                if let Some(entry) = inner.properties.get_mut(&racing_property) {
                    entry.activations.push(StoredActivation {
                        record,
                        script: VecDeque::new(),
                    });
                }
            }
            return Err(ClientError::RemoteRejection {
                status: 422,
                detail: serde_json::json!({
                    "title": "activation rejected",
                    "detail": "a conflicting activation is outstanding",
                }),
            });
        }
        if !inner.properties.contains_key(property_id) {
            return Err(ClientError::PropertyNotFound(property_id.to_string()));
        }

        inner.next_id += 1;
        inner.submissions += 1;
        let activation_id = format!("atv_{}", inner.next_id);
        let script: VecDeque<_> = inner.submission_script.clone().into();

        let entry = inner
            .properties
            .get_mut(property_id)
            .ok_or_else(|| ClientError::PropertyNotFound(property_id.to_string()))?;
        entry.activations.push(StoredActivation {
            record: ActivationRecord {
                activation_id: activation_id.clone(),
                version: descriptor.version,
                network: descriptor.network,
                activation_type: descriptor.activation_type,
                status: ActivationStatus::New,
            },
            script,
        });

        debug!(%property_id, %activation_id, version = descriptor.version, "submission accepted");
        Ok(activation_id)
    }

    async fn activation_status(
        &self,
        property_id: &str,
        activation_id: &str,
    ) -> ClientResult<ActivationStatus> {
        let mut inner = self.inner.lock().await;
        if inner.transient_status_failures > 0 {
            inner.transient_status_failures -= 1;
            return Err(ClientError::Transport("connection reset".to_string()));
        }

        let entry = inner
            .properties
            .get_mut(property_id)
            .ok_or_else(|| ClientError::PropertyNotFound(property_id.to_string()))?;
        let stored = entry
            .activations
            .iter_mut()
            .find(|a| a.record.activation_id == activation_id)
            .ok_or_else(|| ClientError::ActivationNotFound {
                property_id: property_id.to_string(),
                activation_id: activation_id.to_string(),
            })?;

        if let Some(next) = stored.script.pop_front() {
            stored.record.status = next;
        }
        Ok(stored.record.status)
    }

    async fn property_snapshot(&self, property_id: &str) -> ClientResult<PropertySnapshot> {
        let inner = self.inner.lock().await;
        let entry = inner
            .properties
            .get(property_id)
            .ok_or_else(|| ClientError::PropertyNotFound(property_id.to_string()))?;
        Ok(PropertySnapshot {
            property_id: property_id.to_string(),
            staging_version: entry.staging_version,
            production_version: entry.production_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeflow_core::ActivationType;

    fn descriptor(property_id: &str, version: Version) -> ActivationDescriptor {
        ActivationDescriptor {
            property_id: property_id.to_string(),
            version,
            network: Network::Staging,
            activation_type: ActivationType::Activate,
            notify_contacts: vec!["ops@example.com".to_string()],
            note: None,
        }
    }

    #[tokio::test]
    async fn unknown_property_is_not_found() {
        let plane = InMemoryControlPlane::new();
        let result = plane.latest_version("prp_missing", None).await;
        assert!(matches!(result, Err(ClientError::PropertyNotFound(_))));
    }

    #[tokio::test]
    async fn submission_appends_to_history_and_counts() {
        let plane = InMemoryControlPlane::new();
        plane.add_property("prp_1", 3, None, None).await;

        let id = plane
            .submit_activation("prp_1", &descriptor("prp_1", 3))
            .await
            .unwrap();
        assert_eq!(id, "atv_1");
        assert_eq!(plane.submission_count().await, 1);

        let history = plane.list_activations("prp_1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, ActivationStatus::New);
        assert_eq!(history[0].version, 3);
    }

    #[tokio::test]
    async fn scripted_status_walks_one_step_per_fetch() {
        let plane = InMemoryControlPlane::new();
        plane.add_property("prp_1", 3, None, None).await;
        plane
            .set_submission_script(vec![ActivationStatus::Pending, ActivationStatus::Active])
            .await;

        let id = plane
            .submit_activation("prp_1", &descriptor("prp_1", 3))
            .await
            .unwrap();

        assert_eq!(
            plane.activation_status("prp_1", &id).await.unwrap(),
            ActivationStatus::Pending
        );
        assert_eq!(
            plane.activation_status("prp_1", &id).await.unwrap(),
            ActivationStatus::Active
        );
        // Script exhausted: status is settled.
        assert_eq!(
            plane.activation_status("prp_1", &id).await.unwrap(),
            ActivationStatus::Active
        );
    }

    #[tokio::test]
    async fn injected_transport_failures_then_recovery() {
        let plane = InMemoryControlPlane::new();
        plane.add_property("prp_1", 3, None, None).await;
        let id = plane
            .submit_activation("prp_1", &descriptor("prp_1", 3))
            .await
            .unwrap();

        plane.fail_status_fetches(2).await;
        assert!(matches!(
            plane.activation_status("prp_1", &id).await,
            Err(ClientError::Transport(_))
        ));
        assert!(matches!(
            plane.activation_status("prp_1", &id).await,
            Err(ClientError::Transport(_))
        ));
        assert!(plane.activation_status("prp_1", &id).await.is_ok());
    }

    #[tokio::test]
    async fn rejection_carries_remote_payload() {
        let plane = InMemoryControlPlane::new();
        plane.add_property("prp_1", 3, None, None).await;
        plane.reject_submissions(true).await;

        let err = plane
            .submit_activation("prp_1", &descriptor("prp_1", 3))
            .await
            .unwrap_err();
        match err {
            ClientError::RemoteRejection { status, detail } => {
                assert_eq!(status, 422);
                assert!(detail["title"].is_string());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(plane.submission_count().await, 0);
    }

    #[tokio::test]
    async fn snapshot_reports_per_network_versions() {
        let plane = InMemoryControlPlane::new();
        plane.add_property("prp_1", 5, Some(3), Some(2)).await;

        let snapshot = plane.property_snapshot("prp_1").await.unwrap();
        assert_eq!(snapshot.active_version(Network::Staging), Some(3));
        assert_eq!(snapshot.active_version(Network::Production), Some(2));
    }
}
