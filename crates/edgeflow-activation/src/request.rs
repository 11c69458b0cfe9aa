//! Activation requests and descriptor building.
//!
//! An [`ActivationRequest`] is the caller-supplied desired state. It
//! is normalized into an immutable `ActivationDescriptor`: a missing
//! version resolves to the property's latest, and notification
//! contacts are validated and deduplicated.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use edgeflow_client::ControlPlane;
use edgeflow_core::{ActivationDescriptor, ActivationType, Network, PropertyId, Version};

use crate::error::{ActivationError, ActivationResult};

/// Minimal well-formedness check for a notification address:
/// local part, one `@`, domain with a dot. Deliverability is the
/// control plane's problem.
static CONTACT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("contact pattern compiles")
});

/// Desired activation outcome, as supplied by the caller.
#[derive(Debug, Clone)]
pub struct ActivationRequest {
    pub property_id: PropertyId,
    /// Explicit target version; `None` resolves to the latest
    /// version at build time (activate flow only).
    pub version: Option<Version>,
    pub network: Network,
    pub activation_type: ActivationType,
    pub contacts: Vec<String>,
    /// Overrides the configured submission note when set.
    pub note: Option<String>,
    /// When false, the orchestrator performs no remote action.
    pub enabled: bool,
}

impl ActivationRequest {
    /// Request deploying `version` (or the latest, when `None`) to
    /// `network`.
    pub fn activate(
        property_id: &str,
        version: Option<Version>,
        network: Network,
        contacts: Vec<String>,
    ) -> Self {
        Self {
            property_id: property_id.to_string(),
            version,
            network,
            activation_type: ActivationType::Activate,
            contacts,
            note: None,
            enabled: true,
        }
    }

    /// Request withdrawing `version` from `network`.
    ///
    /// Deactivation always names an explicit version: the precondition
    /// check compares it against the currently-active one.
    pub fn deactivate(
        property_id: &str,
        version: Version,
        network: Network,
        contacts: Vec<String>,
    ) -> Self {
        Self {
            property_id: property_id.to_string(),
            version: Some(version),
            network,
            activation_type: ActivationType::Deactivate,
            contacts,
            note: None,
            enabled: true,
        }
    }

    /// Attach a submission note.
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    /// Mark the request as disabled (the no-op flow).
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Normalize into a descriptor: validate contacts, resolve the
    /// version when unspecified.
    ///
    /// The version lookup is the only side effect.
    pub async fn build<C: ControlPlane + ?Sized>(
        &self,
        client: &C,
    ) -> ActivationResult<ActivationDescriptor> {
        let notify_contacts = validate_contacts(&self.contacts)?;

        let version = match self.version {
            Some(version) => version,
            None => {
                let version = client
                    .latest_version(&self.property_id, Some(self.network))
                    .await
                    .map_err(|source| ActivationError::VersionResolution {
                        property_id: self.property_id.clone(),
                        network: self.network,
                        source,
                    })?;
                debug!(
                    property_id = %self.property_id,
                    network = %self.network,
                    version,
                    "resolved latest version"
                );
                version
            }
        };

        Ok(ActivationDescriptor {
            property_id: self.property_id.clone(),
            version,
            network: self.network,
            activation_type: self.activation_type,
            notify_contacts,
            note: self.note.clone(),
        })
    }
}

/// Require a non-empty set of well-formed addresses; dedup while
/// preserving first-seen order.
fn validate_contacts(contacts: &[String]) -> ActivationResult<Vec<String>> {
    if contacts.is_empty() {
        return Err(ActivationError::NoContacts);
    }

    let mut seen = HashSet::new();
    let mut validated = Vec::with_capacity(contacts.len());
    for contact in contacts {
        if !CONTACT_PATTERN.is_match(contact) {
            return Err(ActivationError::InvalidContact(contact.clone()));
        }
        if seen.insert(contact.as_str()) {
            validated.push(contact.clone());
        }
    }
    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeflow_client::InMemoryControlPlane;

    fn contacts() -> Vec<String> {
        vec!["ops@example.com".to_string()]
    }

    #[tokio::test]
    async fn explicit_version_is_kept() {
        let plane = InMemoryControlPlane::new();
        let request = ActivationRequest::activate("prp_1", Some(3), Network::Staging, contacts());

        let descriptor = request.build(&plane).await.unwrap();
        assert_eq!(descriptor.version, 3);
        assert_eq!(descriptor.activation_type, ActivationType::Activate);
    }

    #[tokio::test]
    async fn missing_version_resolves_to_latest() {
        let plane = InMemoryControlPlane::new();
        plane.add_property("prp_1", 7, None, None).await;
        let request = ActivationRequest::activate("prp_1", None, Network::Staging, contacts());

        let descriptor = request.build(&plane).await.unwrap();
        assert_eq!(descriptor.version, 7);
    }

    #[tokio::test]
    async fn resolution_failure_is_fatal() {
        let plane = InMemoryControlPlane::new();
        let request =
            ActivationRequest::activate("prp_missing", None, Network::Staging, contacts());

        let err = request.build(&plane).await.unwrap_err();
        assert!(matches!(err, ActivationError::VersionResolution { .. }));
    }

    #[tokio::test]
    async fn empty_contacts_are_rejected() {
        let plane = InMemoryControlPlane::new();
        let request = ActivationRequest::activate("prp_1", Some(1), Network::Staging, vec![]);

        let err = request.build(&plane).await.unwrap_err();
        assert!(matches!(err, ActivationError::NoContacts));
    }

    #[tokio::test]
    async fn malformed_contact_names_the_offender() {
        let plane = InMemoryControlPlane::new();
        let request = ActivationRequest::activate(
            "prp_1",
            Some(1),
            Network::Staging,
            vec!["ops@example.com".to_string(), "not-an-address".to_string()],
        );

        match request.build(&plane).await.unwrap_err() {
            ActivationError::InvalidContact(value) => assert_eq!(value, "not-an-address"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn contacts_are_deduplicated_in_order() {
        let plane = InMemoryControlPlane::new();
        let request = ActivationRequest::activate(
            "prp_1",
            Some(1),
            Network::Staging,
            vec![
                "b@example.com".to_string(),
                "a@example.com".to_string(),
                "b@example.com".to_string(),
            ],
        );

        let descriptor = request.build(&plane).await.unwrap();
        assert_eq!(descriptor.notify_contacts, vec!["b@example.com", "a@example.com"]);
    }

    #[test]
    fn contact_pattern_accepts_and_rejects() {
        assert!(CONTACT_PATTERN.is_match("a@x.com"));
        assert!(CONTACT_PATTERN.is_match("first.last+tag@sub.domain.org"));

        assert!(!CONTACT_PATTERN.is_match("a@x"));
        assert!(!CONTACT_PATTERN.is_match("@x.com"));
        assert!(!CONTACT_PATTERN.is_match("a b@x.com"));
        assert!(!CONTACT_PATTERN.is_match(""));
    }

    #[test]
    fn disabled_flag_round_trips() {
        let request =
            ActivationRequest::activate("prp_1", None, Network::Staging, contacts()).disabled();
        assert!(!request.enabled);
    }
}
