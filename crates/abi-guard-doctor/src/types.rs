use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a single health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single doctor check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorCheck {
    pub name: String,
    pub status: CheckStatus,
    pub details: String,
}

impl DoctorCheck {
    #[must_use]
    pub fn pass(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self { name: name.into(), status: CheckStatus::Pass, details: details.into() }
    }

    #[must_use]
    pub fn warn(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self { name: name.into(), status: CheckStatus::Warn, details: details.into() }
    }

    #[must_use]
    pub fn fail(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self { name: name.into(), status: CheckStatus::Fail, details: details.into() }
    }
}

/// Full doctor report: all checks sorted by name, plus an overall `ok`
/// that is false only if at least one check failed (warnings don't gate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorReport {
    pub schema_version: String,
    pub emitted_at: DateTime<Utc>,
    pub ok: bool,
    pub checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    #[must_use]
    pub fn from_checks(emitted_at: DateTime<Utc>, mut checks: Vec<DoctorCheck>) -> Self {
        checks.sort_by(|a, b| a.name.cmp(&b.name));
        let ok = !checks.iter().any(|c| c.status == CheckStatus::Fail);
        Self { schema_version: "1".to_string(), emitted_at, ok, checks }
    }
}
