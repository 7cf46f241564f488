//! Compares the enum sections of two header payloads.

use std::collections::{BTreeMap, BTreeSet};

use abi_guard_types::{EnumChange, EnumDiff, HeaderEnum};

#[must_use]
pub fn compare_enum_sets(base_enums: &BTreeMap<String, HeaderEnum>, curr_enums: &BTreeMap<String, HeaderEnum>) -> EnumDiff {
    let base_names: BTreeSet<&String> = base_enums.keys().collect();
    let curr_names: BTreeSet<&String> = curr_enums.keys().collect();

    let removed_enums: Vec<String> = base_names.difference(&curr_names).map(|s| s.to_string()).collect();
    let added_enums: Vec<String> = curr_names.difference(&base_names).map(|s| s.to_string()).collect();

    let mut changed_enums = BTreeMap::new();
    let mut breaking_changes = Vec::new();
    let mut additive_changes = Vec::new();

    for name in base_names.intersection(&curr_names) {
        let base = &base_enums[*name];
        let curr = &curr_enums[*name];

        let base_map: BTreeMap<&str, (Option<i64>, Option<&str>)> = base
            .members
            .iter()
            .map(|m| (m.name.as_str(), (m.value, m.value_expr.as_deref())))
            .collect();
        let curr_map: BTreeMap<&str, (Option<i64>, Option<&str>)> = curr
            .members
            .iter()
            .map(|m| (m.name.as_str(), (m.value, m.value_expr.as_deref())))
            .collect();

        let base_keys: BTreeSet<&str> = base_map.keys().copied().collect();
        let curr_keys: BTreeSet<&str> = curr_map.keys().copied().collect();

        let removed_members: Vec<String> = base_keys.difference(&curr_keys).map(|s| s.to_string()).collect();
        let added_members: Vec<String> = curr_keys.difference(&base_keys).map(|s| s.to_string()).collect();

        let mut value_changed = Vec::new();
        for member_name in base_keys.intersection(&curr_keys) {
            if base_map[member_name] != curr_map[member_name] {
                value_changed.push(member_name.to_string());
            }
        }

        if !removed_members.is_empty() || !value_changed.is_empty() {
            if !removed_members.is_empty() {
                breaking_changes.push(format!("enum {} removed members: {}", name, removed_members.join(", ")));
            }
            if !value_changed.is_empty() {
                breaking_changes.push(format!("enum {} changed values: {}", name, value_changed.join(", ")));
            }
            changed_enums.insert(
                (*name).clone(),
                EnumChange::Breaking {
                    removed_members,
                    added_members,
                    value_changed,
                },
            );
            continue;
        }

        if !added_members.is_empty() {
            additive_changes.push(format!("enum {} added members: {}", name, added_members.join(", ")));
            changed_enums.insert(
                (*name).clone(),
                EnumChange::Additive {
                    removed_members: Vec::new(),
                    added_members,
                    value_changed: Vec::new(),
                },
            );
        }
    }

    if !removed_enums.is_empty() {
        breaking_changes.push(format!("removed enums: {}", removed_enums.join(", ")));
    }
    if !added_enums.is_empty() {
        additive_changes.push(format!("added enums: {}", added_enums.join(", ")));
    }

    EnumDiff {
        removed_enums,
        added_enums,
        changed_enums,
        breaking_changes,
        additive_changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_guard_types::EnumMember;

    fn enum_with(members: Vec<(&str, Option<i64>)>) -> HeaderEnum {
        HeaderEnum::from_members(
            members
                .into_iter()
                .map(|(name, value)| EnumMember {
                    name: name.to_string(),
                    value,
                    value_expr: None,
                })
                .collect(),
        )
    }

    #[test]
    fn removed_member_is_breaking() {
        let mut base = BTreeMap::new();
        base.insert("color_t".to_string(), enum_with(vec![("RED", Some(0)), ("GREEN", Some(1))]));
        let mut curr = BTreeMap::new();
        curr.insert("color_t".to_string(), enum_with(vec![("RED", Some(0))]));

        let diff = compare_enum_sets(&base, &curr);
        assert_eq!(diff.breaking_changes.len(), 1);
        assert!(matches!(diff.changed_enums["color_t"], EnumChange::Breaking { .. }));
    }

    #[test]
    fn added_member_is_additive() {
        let mut base = BTreeMap::new();
        base.insert("color_t".to_string(), enum_with(vec![("RED", Some(0))]));
        let mut curr = BTreeMap::new();
        curr.insert("color_t".to_string(), enum_with(vec![("RED", Some(0)), ("GREEN", Some(1))]));

        let diff = compare_enum_sets(&base, &curr);
        assert_eq!(diff.additive_changes.len(), 1);
        assert!(matches!(diff.changed_enums["color_t"], EnumChange::Additive { .. }));
    }

    #[test]
    fn value_change_on_same_member_is_breaking() {
        let mut base = BTreeMap::new();
        base.insert("status_t".to_string(), enum_with(vec![("OK", Some(0))]));
        let mut curr = BTreeMap::new();
        curr.insert("status_t".to_string(), enum_with(vec![("OK", Some(1))]));

        let diff = compare_enum_sets(&base, &curr);
        assert_eq!(diff.breaking_changes.len(), 1);
    }

    #[test]
    fn removed_enum_is_breaking_added_enum_is_additive() {
        let mut base = BTreeMap::new();
        base.insert("old_t".to_string(), enum_with(vec![("A", Some(0))]));
        let mut curr = BTreeMap::new();
        curr.insert("new_t".to_string(), enum_with(vec![("A", Some(0))]));

        let diff = compare_enum_sets(&base, &curr);
        assert_eq!(diff.removed_enums, vec!["old_t".to_string()]);
        assert_eq!(diff.added_enums, vec!["new_t".to_string()]);
    }
}
