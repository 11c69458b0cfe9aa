//! Orchestrator configuration.
//!
//! Durations are written as strings ("90m", "30s", "500ms") in the
//! TOML file and parsed on access; unparseable values fall back to
//! the defaults rather than failing an orchestration call.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Ceiling on how long a single orchestration call waits for a
/// terminal status before reporting the last observed one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90 * 60);

/// Cadence of status fetches against the control plane.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for activation orchestration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivationConfig {
    /// Wait ceiling per orchestration call (e.g., "90m").
    pub timeout: Option<String>,
    /// Status poll interval (e.g., "30s").
    pub poll_interval: Option<String>,
    /// Note attached to every submission.
    pub note: Option<String>,
}

impl ActivationConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ActivationConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parsed wait ceiling; defaults to 90 minutes.
    pub fn timeout(&self) -> Duration {
        self.timeout
            .as_deref()
            .and_then(parse_duration)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Parsed poll interval; defaults to 30 seconds.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
            .as_deref()
            .and_then(parse_duration)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    /// Note attached to submissions.
    pub fn note(&self) -> &str {
        self.note.as_deref().unwrap_or("Submitted by edgeflow")
    }
}

/// Parse "90m" / "30s" / "500ms" style durations.
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else if let Some(hours) = s.strip_suffix('h') {
        hours
            .parse::<u64>()
            .ok()
            .map(|h| Duration::from_secs(h * 3600))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ActivationConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(90 * 60));
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.note(), "Submitted by edgeflow");
    }

    #[test]
    fn parse_duration_values() {
        assert_eq!(parse_duration("90m"), Some(Duration::from_secs(5400)));
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
        assert_eq!(parse_duration("invalid"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn unparseable_values_fall_back_to_defaults() {
        let config = ActivationConfig {
            timeout: Some("soon".to_string()),
            poll_interval: Some("often".to_string()),
            note: None,
        };
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.poll_interval(), DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn from_toml() {
        let parsed: ActivationConfig = toml::from_str(
            r#"
            timeout = "45m"
            poll_interval = "10s"
            note = "nightly push"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.timeout(), Duration::from_secs(45 * 60));
        assert_eq!(parsed.poll_interval(), Duration::from_secs(10));
        assert_eq!(parsed.note(), "nightly push");
    }
}
