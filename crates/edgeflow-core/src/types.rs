//! Domain types for activation orchestration.
//!
//! These types represent the desired state handed to the orchestrator
//! (descriptors) and the remote state reported by the control plane
//! (activation records, property snapshots). All types are serializable
//! to/from JSON for transport through a control-plane client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier for a configuration property.
pub type PropertyId = String;

/// Identifier the control plane assigns to a submitted activation.
pub type ActivationId = String;

/// A property configuration version. Versions are plain integers
/// assigned sequentially by the control plane.
pub type Version = u32;

// ── Network ───────────────────────────────────────────────────────

/// Delivery network an activation targets.
///
/// Each network tracks its own active version independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Staging,
    Production,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Staging => write!(f, "staging"),
            Network::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "staging" => Ok(Network::Staging),
            "production" => Ok(Network::Production),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

// ── Activation type ───────────────────────────────────────────────

/// Whether an activation deploys a version or withdraws it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationType {
    Activate,
    Deactivate,
}

impl fmt::Display for ActivationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationType::Activate => write!(f, "activate"),
            ActivationType::Deactivate => write!(f, "deactivate"),
        }
    }
}

// ── Status ────────────────────────────────────────────────────────

/// Status of an activation as reported by the control plane.
///
/// The zone statuses are the propagation waves the control plane walks
/// through while pushing a version out to the network edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationStatus {
    New,
    Pending,
    #[serde(rename = "ZONE_1")]
    Zone1,
    #[serde(rename = "ZONE_2")]
    Zone2,
    #[serde(rename = "ZONE_3")]
    Zone3,
    PendingDeactivation,
    Active,
    Aborted,
    Failed,
    Deactivated,
}

impl ActivationStatus {
    /// True if no further transition will occur for this record.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ActivationStatus::Active
                | ActivationStatus::Aborted
                | ActivationStatus::Failed
                | ActivationStatus::Deactivated
        )
    }

    /// True if an existing record in this status satisfies a matching
    /// descriptor — in progress, or already successfully active.
    ///
    /// The control plane rejects or no-ops duplicate submissions while
    /// one of these is outstanding, so a record in this set is reused
    /// instead of submitting again.
    pub fn is_reusable(self) -> bool {
        matches!(
            self,
            ActivationStatus::New
                | ActivationStatus::Pending
                | ActivationStatus::PendingDeactivation
                | ActivationStatus::Zone1
                | ActivationStatus::Zone2
                | ActivationStatus::Zone3
                | ActivationStatus::Active
        )
    }

    /// Position in the forward progression of the state machine.
    ///
    /// Status transitions are monotonic: a later observation never has
    /// a lower rank than an earlier one. Relative order among the
    /// non-active terminals is arbitrary.
    pub fn progress_rank(self) -> u8 {
        match self {
            ActivationStatus::New => 0,
            ActivationStatus::Pending => 1,
            ActivationStatus::Zone1 => 2,
            ActivationStatus::Zone2 => 3,
            ActivationStatus::Zone3 => 4,
            ActivationStatus::PendingDeactivation => 5,
            ActivationStatus::Active => 6,
            ActivationStatus::Aborted => 7,
            ActivationStatus::Failed => 8,
            ActivationStatus::Deactivated => 9,
        }
    }
}

impl fmt::Display for ActivationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivationStatus::New => "NEW",
            ActivationStatus::Pending => "PENDING",
            ActivationStatus::Zone1 => "ZONE_1",
            ActivationStatus::Zone2 => "ZONE_2",
            ActivationStatus::Zone3 => "ZONE_3",
            ActivationStatus::PendingDeactivation => "PENDING_DEACTIVATION",
            ActivationStatus::Active => "ACTIVE",
            ActivationStatus::Aborted => "ABORTED",
            ActivationStatus::Failed => "FAILED",
            ActivationStatus::Deactivated => "DEACTIVATED",
        };
        write!(f, "{s}")
    }
}

// ── Descriptor ────────────────────────────────────────────────────

/// The immutable logical key of a desired activation outcome.
///
/// Built once per orchestration call and discarded after use. Two
/// descriptors are equivalent for dedup purposes iff
/// `(version, network, activation_type)` match — `notify_contacts`
/// and `note` are not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationDescriptor {
    pub property_id: PropertyId,
    pub version: Version,
    pub network: Network,
    pub activation_type: ActivationType,
    /// Addresses notified by the control plane on completion.
    /// Deduplicated, first-seen order preserved.
    pub notify_contacts: Vec<String>,
    /// Free-text note attached to the submission.
    pub note: Option<String>,
}

impl ActivationDescriptor {
    /// True if an existing record carries the same dedup key.
    pub fn matches(&self, record: &ActivationRecord) -> bool {
        record.version == self.version
            && record.network == self.network
            && record.activation_type == self.activation_type
    }
}

// ── Activation record ─────────────────────────────────────────────

/// An activation as tracked by the control plane.
///
/// `activation_id` is assigned remotely and immutable once set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationRecord {
    pub activation_id: ActivationId,
    pub version: Version,
    pub network: Network,
    pub activation_type: ActivationType,
    pub status: ActivationStatus,
}

// ── Property snapshot ─────────────────────────────────────────────

/// Point-in-time view of a property's currently-active versions.
///
/// Never cached across orchestration calls — the remote state may
/// change between calls made minutes or hours apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySnapshot {
    pub property_id: PropertyId,
    /// Version currently active on staging, if any.
    pub staging_version: Option<Version>,
    /// Version currently active on production, if any.
    pub production_version: Option<Version>,
}

impl PropertySnapshot {
    /// The version currently active on the given network.
    pub fn active_version(&self, network: Network) -> Option<Version> {
        match network {
            Network::Staging => self.staging_version,
            Network::Production => self.production_version,
        }
    }
}
