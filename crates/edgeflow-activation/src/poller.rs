//! Background status poll task.
//!
//! The poller runs concurrently with the orchestrator's wait loop and
//! communicates exclusively through an unbounded channel: every
//! observed status transition is delivered, in order, exactly once.
//! Transient fetch failures count as "no transition this cycle" and
//! are retried on the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use edgeflow_client::ControlPlane;
use edgeflow_core::ActivationStatus;

/// Handle to a spawned poll task for one activation.
pub struct StatusPoller {
    updates: mpsc::UnboundedReceiver<ActivationStatus>,
    shutdown_tx: watch::Sender<bool>,
    _handle: JoinHandle<()>,
}

impl StatusPoller {
    /// Spawn a poll loop for `activation_id`, starting from the last
    /// status known to the caller.
    pub fn spawn<C: ControlPlane>(
        client: Arc<C>,
        property_id: String,
        activation_id: String,
        initial: ActivationStatus,
        interval: Duration,
    ) -> Self {
        let (tx, updates) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run_poll_loop(
            client,
            property_id,
            activation_id,
            initial,
            interval,
            tx,
            shutdown_rx,
        ));

        Self {
            updates,
            shutdown_tx,
            _handle: handle,
        }
    }

    /// Next observed transition. `None` once the poll loop has ended,
    /// which happens after it delivers a terminal status.
    pub async fn recv(&mut self) -> Option<ActivationStatus> {
        self.updates.recv().await
    }

    /// Signal the poll task to stop and abandon it. The task is never
    /// joined; the remote activation continues regardless.
    pub fn stop(self) {
        let _ = self.shutdown_tx.send(true);
    }
}

async fn run_poll_loop<C: ControlPlane>(
    client: Arc<C>,
    property_id: String,
    activation_id: String,
    initial: ActivationStatus,
    interval: Duration,
    tx: mpsc::UnboundedSender<ActivationStatus>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut last = initial;
    debug!(%property_id, %activation_id, status = %last, "status poll loop starting");

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                match client.activation_status(&property_id, &activation_id).await {
                    Ok(status) => {
                        if status != last {
                            debug!(%property_id, %activation_id, %status, "status transition");
                            if tx.send(status).is_err() {
                                // Consumer stopped waiting.
                                break;
                            }
                            last = status;
                        }
                        if status.is_terminal() {
                            break;
                        }
                    }
                    Err(error) => {
                        // No transition observed this cycle.
                        debug!(%property_id, %activation_id, %error, "status fetch failed, will retry");
                    }
                }
            }
            _ = shutdown.changed() => {
                debug!(%property_id, %activation_id, "status poll loop shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeflow_client::InMemoryControlPlane;
    use edgeflow_core::{ActivationDescriptor, ActivationType, Network};

    const TICK: Duration = Duration::from_millis(5);

    async fn submitted(plane: &InMemoryControlPlane, script: Vec<ActivationStatus>) -> String {
        plane.add_property("prp_1", 3, None, None).await;
        plane.set_submission_script(script).await;
        plane
            .submit_activation(
                "prp_1",
                &ActivationDescriptor {
                    property_id: "prp_1".to_string(),
                    version: 3,
                    network: Network::Staging,
                    activation_type: ActivationType::Activate,
                    notify_contacts: vec!["ops@example.com".to_string()],
                    note: None,
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn delivers_every_transition_in_order() {
        let plane = Arc::new(InMemoryControlPlane::new());
        let id = submitted(
            &plane,
            vec![
                ActivationStatus::Pending,
                ActivationStatus::Zone1,
                ActivationStatus::Zone2,
                ActivationStatus::Active,
            ],
        )
        .await;

        let mut poller = StatusPoller::spawn(
            plane,
            "prp_1".to_string(),
            id,
            ActivationStatus::New,
            TICK,
        );

        let mut observed = Vec::new();
        while let Some(status) = poller.recv().await {
            observed.push(status);
        }
        assert_eq!(
            observed,
            vec![
                ActivationStatus::Pending,
                ActivationStatus::Zone1,
                ActivationStatus::Zone2,
                ActivationStatus::Active,
            ]
        );

        // Monotonic progression, no reordering.
        for pair in observed.windows(2) {
            assert!(pair[0].progress_rank() < pair[1].progress_rank());
        }
    }

    #[tokio::test]
    async fn repeated_status_is_not_redelivered() {
        let plane = Arc::new(InMemoryControlPlane::new());
        // Stays Pending for two fetches before going Active.
        let id = submitted(
            &plane,
            vec![
                ActivationStatus::Pending,
                ActivationStatus::Pending,
                ActivationStatus::Pending,
                ActivationStatus::Active,
            ],
        )
        .await;

        let mut poller = StatusPoller::spawn(
            plane,
            "prp_1".to_string(),
            id,
            ActivationStatus::New,
            TICK,
        );

        let mut observed = Vec::new();
        while let Some(status) = poller.recv().await {
            observed.push(status);
        }
        assert_eq!(
            observed,
            vec![ActivationStatus::Pending, ActivationStatus::Active]
        );
    }

    #[tokio::test]
    async fn transient_fetch_failures_are_retried() {
        let plane = Arc::new(InMemoryControlPlane::new());
        let id = submitted(&plane, vec![ActivationStatus::Active]).await;
        plane.fail_status_fetches(3).await;

        let mut poller = StatusPoller::spawn(
            plane,
            "prp_1".to_string(),
            id,
            ActivationStatus::New,
            TICK,
        );

        assert_eq!(poller.recv().await, Some(ActivationStatus::Active));
        assert_eq!(poller.recv().await, None);
    }

    #[tokio::test]
    async fn loop_ends_after_non_active_terminal() {
        let plane = Arc::new(InMemoryControlPlane::new());
        let id = submitted(
            &plane,
            vec![ActivationStatus::Pending, ActivationStatus::Failed],
        )
        .await;

        let mut poller = StatusPoller::spawn(
            plane,
            "prp_1".to_string(),
            id,
            ActivationStatus::New,
            TICK,
        );

        assert_eq!(poller.recv().await, Some(ActivationStatus::Pending));
        assert_eq!(poller.recv().await, Some(ActivationStatus::Failed));
        assert_eq!(poller.recv().await, None);
    }
}
