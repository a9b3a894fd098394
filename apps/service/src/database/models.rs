use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::monitoring::types::{HealthStatus, ProbeOutcome};

pub type TargetId = i64;

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_CHECK_INTERVAL: u32 = 300;
pub const MIN_CHECK_INTERVAL: u32 = 30;
pub const MAX_CHECK_INTERVAL: u32 = 3600;

/// An upstream API under uptime surveillance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredTarget {
    pub id: TargetId,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub category: String,
    pub is_active: bool,
    /// Seconds between scheduled probes
    pub check_interval: u32,

    pub status: HealthStatus,
    #[serde(rename = "responseTime")]
    pub response_time_ms: Option<u64>,
    pub last_error: Option<String>,
    pub last_check: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MonitoredTarget {
    /// Apply a patch to the editable attributes, leaving health untouched
    pub fn apply(&mut self, patch: &TargetPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(url) = &patch.url {
            self.url = url.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(check_interval) = patch.check_interval {
            self.check_interval = check_interval;
        }
    }

    /// Overwrite the health fields with a probe result
    pub fn record(&mut self, health: &HealthUpdate) {
        self.status = health.status;
        self.response_time_ms = health.response_time_ms;
        self.last_error = health.last_error.clone();
        self.last_check = Some(health.checked_at);
    }
}

/// Input for creating a target
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTarget {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub check_interval: Option<u32>,
    pub is_active: Option<bool>,
}

impl NewTarget {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { name: name.into(), url: url.into(), ..Default::default() }
    }

    pub fn with_interval(mut self, seconds: u32) -> Self {
        self.check_interval = Some(seconds);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = Some(false);
        self
    }

    /// Materialise the record a store should insert, health starting at `unknown`
    pub fn into_target(self, id: TargetId, now: DateTime<Utc>) -> MonitoredTarget {
        MonitoredTarget {
            id,
            name: self.name,
            url: self.url,
            description: self.description,
            category: self.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            is_active: self.is_active.unwrap_or(true),
            check_interval: self.check_interval.unwrap_or(DEFAULT_CHECK_INTERVAL),
            status: HealthStatus::Unknown,
            response_time_ms: None,
            last_error: None,
            last_check: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of the editable attributes; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub check_interval: Option<u32>,
}

/// Health fields written by a single probe
#[derive(Debug, Clone, PartialEq)]
pub struct HealthUpdate {
    pub status: HealthStatus,
    pub response_time_ms: Option<u64>,
    pub last_error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthUpdate {
    pub fn from_outcome(outcome: &ProbeOutcome, checked_at: DateTime<Utc>) -> Self {
        Self {
            status: outcome.status,
            response_time_ms: outcome.response_time_ms,
            last_error: outcome.error.clone(),
            checked_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TargetFilter {
    pub category: Option<String>,
    pub active: Option<bool>,
}

impl TargetFilter {
    pub fn active() -> Self {
        Self { active: Some(true), ..Default::default() }
    }

    pub fn matches(&self, target: &MonitoredTarget) -> bool {
        self.category.as_ref().is_none_or(|c| *c == target.category)
            && self.active.is_none_or(|a| a == target.is_active)
    }
}

/// Target counts by health, shown on the admin dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub total: u64,
    pub up: u64,
    pub down: u64,
    pub warning: u64,
    pub unknown: u64,
}

impl HealthSummary {
    pub fn add(&mut self, status: HealthStatus, count: u64) {
        self.total += count;
        match status {
            HealthStatus::Up => self.up += count,
            HealthStatus::Down => self.down += count,
            HealthStatus::Warning => self.warning += count,
            HealthStatus::Unknown => self.unknown += count,
        }
    }
}

/// Current time truncated to the precision timestamps are stored with,
/// so a record built in memory equals the one read back
pub fn stored_now() -> DateTime<Utc> {
    i64_to_timestamp(timestamp_to_i64(Utc::now()))
}

/// Stored as unix milliseconds
pub fn timestamp_to_i64(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

pub fn i64_to_timestamp(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
}
