//! Compares two struct layout probes, flagging size/alignment/offset drift
//! between baseline and current even when the declared fields look the same.

use std::collections::BTreeSet;

use abi_guard_types::{LayoutDiff, LayoutProbePayload};

#[must_use]
pub fn compare_layout_probes(base: &LayoutProbePayload, curr: &LayoutProbePayload) -> LayoutDiff {
    let mut out = LayoutDiff {
        available_in_baseline: base.available,
        available_in_current: curr.available,
        checked_structs: 0,
        breaking_changes: Vec::new(),
        warnings: Vec::new(),
    };

    if out.available_in_baseline && !out.available_in_current {
        out.warnings
            .push("layout probe unavailable in current snapshot while baseline had layout data".to_string());
        return out;
    }
    if out.available_in_current && !out.available_in_baseline {
        out.warnings
            .push("layout probe available in current snapshot but baseline has no layout data".to_string());
        return out;
    }
    if !out.available_in_baseline && !out.available_in_current {
        return out;
    }

    let base_names: BTreeSet<&String> = base.structs.keys().collect();
    let curr_names: BTreeSet<&String> = curr.structs.keys().collect();
    let shared: Vec<&&String> = base_names.intersection(&curr_names).collect();
    out.checked_structs = shared.len();

    for struct_name in shared {
        let base_entry = &base.structs[*struct_name];
        let curr_entry = &curr.structs[*struct_name];

        if base_entry.size != curr_entry.size {
            out.breaking_changes.push(format!(
                "layout {struct_name}: size changed ({} -> {})",
                base_entry.size, curr_entry.size
            ));
        }
        if base_entry.alignment != curr_entry.alignment {
            out.breaking_changes.push(format!(
                "layout {struct_name}: alignment changed ({} -> {})",
                base_entry.alignment, curr_entry.alignment
            ));
        }

        let base_offset_names: BTreeSet<&String> = base_entry.offsets.keys().collect();
        let curr_offset_names: BTreeSet<&String> = curr_entry.offsets.keys().collect();
        for field_name in base_offset_names.intersection(&curr_offset_names) {
            let base_offset = base_entry.offsets[*field_name];
            let curr_offset = curr_entry.offsets[*field_name];
            if base_offset != curr_offset {
                out.breaking_changes.push(format!(
                    "layout {struct_name}.{field_name}: offset changed ({base_offset} -> {curr_offset})"
                ));
            }
        }
    }

    out
}
