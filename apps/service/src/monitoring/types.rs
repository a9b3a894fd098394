use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Health of a monitored API as last observed by a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
    Warning,
    #[default]
    Unknown,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Up => "up",
            HealthStatus::Down => "down",
            HealthStatus::Warning => "warning",
            HealthStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised health status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for HealthStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(HealthStatus::Up),
            "down" => Ok(HealthStatus::Down),
            "warning" => Ok(HealthStatus::Warning),
            "unknown" => Ok(HealthStatus::Unknown),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Result of a single probe against a target URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    pub status: HealthStatus,

    /// Wall-clock time from dispatch to response or failure
    pub response_time_ms: Option<u64>,

    /// Set for anything other than `up`
    pub error: Option<String>,
}

impl ProbeOutcome {
    pub fn up(response_time_ms: u64) -> Self {
        Self { status: HealthStatus::Up, response_time_ms: Some(response_time_ms), error: None }
    }

    pub fn warning(response_time_ms: u64, error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Warning,
            response_time_ms: Some(response_time_ms),
            error: Some(error.into()),
        }
    }

    pub fn down(response_time_ms: Option<u64>, error: impl Into<String>) -> Self {
        Self { status: HealthStatus::Down, response_time_ms, error: Some(error.into()) }
    }
}
