use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::version::{AbiVersion, VersionBump};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    None,
    Additive,
    Breaking,
}

impl Classification {
    #[must_use]
    pub fn required_bump(self) -> VersionBump {
        match self {
            Self::None => VersionBump::Patch,
            Self::Additive => VersionBump::Minor,
            Self::Breaking => VersionBump::Major,
        }
    }

    #[must_use]
    pub fn classify(has_breaking: bool, has_additive: bool) -> Self {
        if has_breaking {
            Self::Breaking
        } else if has_additive {
            Self::Additive
        } else {
            Self::None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EnumChange {
    Breaking {
        removed_members: Vec<String>,
        added_members: Vec<String>,
        value_changed: Vec<String>,
    },
    Additive {
        removed_members: Vec<String>,
        added_members: Vec<String>,
        value_changed: Vec<String>,
    },
    Unknown { reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumDiff {
    pub removed_enums: Vec<String>,
    pub added_enums: Vec<String>,
    pub changed_enums: BTreeMap<String, EnumChange>,
    pub breaking_changes: Vec<String>,
    pub additive_changes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StructChange {
    Breaking {
        removed_fields: Vec<String>,
        added_fields: Vec<String>,
        changed_fields: Vec<String>,
        base_is_prefix: bool,
    },
    Additive {
        removed_fields: Vec<String>,
        added_fields: Vec<String>,
        changed_fields: Vec<String>,
        base_is_prefix: bool,
    },
    Unknown { reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructDiff {
    pub removed_structs: Vec<String>,
    pub added_structs: Vec<String>,
    pub changed_structs: BTreeMap<String, StructChange>,
    pub breaking_changes: Vec<String>,
    pub additive_changes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutDiff {
    pub available_in_baseline: bool,
    pub available_in_current: bool,
    pub checked_structs: usize,
    pub breaking_changes: Vec<String>,
    pub warnings: Vec<String>,
}

/// One rule that fired while applying policy to a [`Report`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedRule {
    pub id: String,
    pub severity: String,
    pub message: String,
}

/// One waiver that matched and suppressed (or merely annotated) a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedWaiver {
    pub waiver_id: String,
    pub severity: String,
    pub message: String,
    pub created_utc: Option<String>,
    pub owner: Option<String>,
    pub approved_by: Option<String>,
    pub ticket: Option<String>,
    pub reason: Option<String>,
    pub expires_utc: Option<String>,
}

/// Outcome of comparing two snapshots of the same target (C3/C4/C5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub status: ReportStatus,
    pub change_classification: Classification,
    pub required_bump: VersionBump,
    pub baseline_abi_version: AbiVersion,
    pub current_abi_version: AbiVersion,
    pub recommended_next_version: AbiVersion,
    pub version_policy_satisfied: bool,
    pub removed_symbols: Vec<String>,
    pub added_symbols: Vec<String>,
    pub changed_signatures: Vec<String>,
    pub enum_diff: EnumDiff,
    pub struct_diff: StructDiff,
    pub layout_diff: LayoutDiff,
    pub breaking_reasons: Vec<String>,
    pub additive_reasons: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(default)]
    pub policy_rules_applied: Vec<AppliedRule>,
    #[serde(default)]
    pub waivers_applied: Vec<AppliedWaiver>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pass,
    Fail,
}

impl Report {
    #[must_use]
    pub fn recompute_status(&self) -> ReportStatus {
        if self.errors.is_empty() {
            ReportStatus::Pass
        } else {
            ReportStatus::Fail
        }
    }
}
