//! `waiver-audit`: checks the configured waiver set itself for hygiene —
//! expired waivers, missing required metadata, and waivers expiring soon —
//! independent of any particular diff run.

use chrono::{DateTime, Utc};
use serde::Serialize;

use abi_guard_types::{PolicyWaiver, WaiverRequirements};

#[derive(Debug, Clone, Serialize)]
pub struct WaiverFinding {
    pub waiver_id: String,
    pub severity: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WaiverAuditReport {
    pub waiver_count: usize,
    pub findings: Vec<WaiverFinding>,
}

impl WaiverAuditReport {
    #[must_use]
    pub fn has_expired(&self) -> bool {
        self.findings.iter().any(|f| f.severity == "expired")
    }

    #[must_use]
    pub fn has_missing_metadata(&self) -> bool {
        self.findings.iter().any(|f| f.severity == "missing_metadata")
    }

    #[must_use]
    pub fn has_expiring_soon(&self) -> bool {
        self.findings.iter().any(|f| f.severity == "expiring_soon")
    }
}

fn missing_metadata_reasons(waiver: &PolicyWaiver, requirements: &WaiverRequirements) -> Vec<String> {
    let mut reasons = Vec::new();
    if requirements.require_owner && waiver.owner.as_deref().unwrap_or("").is_empty() {
        reasons.push("missing owner".to_string());
    }
    if requirements.require_reason && waiver.reason.as_deref().unwrap_or("").is_empty() {
        reasons.push("missing reason".to_string());
    }
    if requirements.require_expires_utc && waiver.expires_utc.is_none() {
        reasons.push("missing expires_utc".to_string());
    }
    if requirements.require_approved_by && waiver.approved_by.as_deref().unwrap_or("").is_empty() {
        reasons.push("missing approved_by".to_string());
    }
    if requirements.require_ticket && waiver.ticket.as_deref().unwrap_or("").is_empty() {
        reasons.push("missing ticket".to_string());
    }
    reasons
}

/// Audits `waivers` against `requirements`, flagging expired waivers,
/// waivers missing required metadata fields, waivers exceeding
/// `max_ttl_days` from `created_utc`, and waivers expiring within
/// `warn_expiring_within_days` of `now`.
#[must_use]
pub fn audit_waivers(waivers: &[PolicyWaiver], requirements: &WaiverRequirements, now: DateTime<Utc>) -> WaiverAuditReport {
    let mut findings = Vec::new();

    for waiver in waivers {
        let reasons = missing_metadata_reasons(waiver, requirements);
        if !reasons.is_empty() {
            findings.push(WaiverFinding {
                waiver_id: waiver.waiver_id.clone(),
                severity: "missing_metadata",
                message: reasons.join(", "),
            });
        }

        if let Some(expires) = &waiver.expires_utc {
            match expires.parse::<DateTime<Utc>>() {
                Ok(expiry) if expiry < now => {
                    findings.push(WaiverFinding {
                        waiver_id: waiver.waiver_id.clone(),
                        severity: "expired",
                        message: format!("expired at {expires}"),
                    });
                }
                Ok(expiry) => {
                    let days_remaining = (expiry - now).num_days();
                    if days_remaining >= 0 && (days_remaining as u64) <= requirements.warn_expiring_within_days {
                        findings.push(WaiverFinding {
                            waiver_id: waiver.waiver_id.clone(),
                            severity: "expiring_soon",
                            message: format!("expires in {days_remaining} day(s) ({expires})"),
                        });
                    }
                }
                Err(_) => {
                    findings.push(WaiverFinding {
                        waiver_id: waiver.waiver_id.clone(),
                        severity: "missing_metadata",
                        message: format!("unparseable expires_utc '{expires}'"),
                    });
                }
            }
        }

        if let (Some(max_ttl_days), Some(created_utc)) = (requirements.max_ttl_days, &waiver.created_utc) {
            if let (Ok(created), Some(expires)) = (created_utc.parse::<DateTime<Utc>>(), &waiver.expires_utc) {
                if let Ok(expiry) = expires.parse::<DateTime<Utc>>() {
                    let ttl_days = (expiry - created).num_days().max(0) as u64;
                    if ttl_days > max_ttl_days {
                        findings.push(WaiverFinding {
                            waiver_id: waiver.waiver_id.clone(),
                            severity: "missing_metadata",
                            message: format!("ttl of {ttl_days} day(s) exceeds max_ttl_days={max_ttl_days}"),
                        });
                    }
                }
            }
        }
    }

    WaiverAuditReport { waiver_count: waivers.len(), findings }
}
