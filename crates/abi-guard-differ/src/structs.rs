//! Compares the struct sections of two header payloads, including the
//! tail-extension rule that lets additive field growth at the end of a
//! struct be treated as non-breaking.

use std::collections::{BTreeMap, BTreeSet};

use abi_guard_types::{HeaderStruct, StructChange, StructDiff};

fn normalize_ws(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[must_use]
pub fn compare_struct_sets(
    base_structs: &BTreeMap<String, HeaderStruct>,
    curr_structs: &BTreeMap<String, HeaderStruct>,
    struct_tail_addition_is_breaking: bool,
) -> StructDiff {
    let base_names: BTreeSet<&String> = base_structs.keys().collect();
    let curr_names: BTreeSet<&String> = curr_structs.keys().collect();

    let removed_structs: Vec<String> = base_names.difference(&curr_names).map(|s| s.to_string()).collect();
    let added_structs: Vec<String> = curr_names.difference(&base_names).map(|s| s.to_string()).collect();

    let mut changed_structs = BTreeMap::new();
    let mut breaking_changes = Vec::new();
    let mut additive_changes = Vec::new();

    for name in base_names.intersection(&curr_names) {
        let base = &base_structs[*name];
        let curr = &curr_structs[*name];

        let base_decls: Vec<String> = base.fields.iter().map(|f| normalize_ws(&f.declaration)).collect();
        let curr_decls: Vec<String> = curr.fields.iter().map(|f| normalize_ws(&f.declaration)).collect();

        if base_decls == curr_decls {
            continue;
        }

        let base_names_seq: Vec<&str> = base.fields.iter().map(|f| f.name.as_str()).collect();
        let curr_names_seq: Vec<&str> = curr.fields.iter().map(|f| f.name.as_str()).collect();

        let base_name_set: BTreeSet<&str> = base_names_seq.iter().copied().collect();
        let curr_name_set: BTreeSet<&str> = curr_names_seq.iter().copied().collect();

        let removed_fields: Vec<String> = base_name_set.difference(&curr_name_set).map(|s| s.to_string()).collect();
        let added_fields: Vec<String> = curr_name_set.difference(&base_name_set).map(|s| s.to_string()).collect();

        let mut changed_fields = Vec::new();
        for field_name in base_name_set.intersection(&curr_name_set) {
            let b_idx = base_names_seq.iter().position(|n| n == field_name).unwrap();
            let c_idx = curr_names_seq.iter().position(|n| n == field_name).unwrap();
            if base_decls[b_idx] != curr_decls[c_idx] || b_idx != c_idx {
                changed_fields.push((*field_name).to_string());
            }
        }
        changed_fields.sort();

        let base_is_prefix = curr_decls.len() >= base_decls.len() && curr_decls[..base_decls.len()] == base_decls[..];
        let additive_tail = base_is_prefix && !struct_tail_addition_is_breaking;

        if additive_tail {
            additive_changes.push(format!("struct {name} tail extended"));
            changed_structs.insert(
                (*name).clone(),
                StructChange::Additive {
                    removed_fields,
                    added_fields,
                    changed_fields,
                    base_is_prefix,
                },
            );
        } else {
            breaking_changes.push(format!("struct {name} layout changed"));
            changed_structs.insert(
                (*name).clone(),
                StructChange::Breaking {
                    removed_fields,
                    added_fields,
                    changed_fields,
                    base_is_prefix,
                },
            );
        }
    }

    if !removed_structs.is_empty() {
        breaking_changes.push(format!("removed structs: {}", removed_structs.join(", ")));
    }
    if !added_structs.is_empty() {
        additive_changes.push(format!("added structs: {}", added_structs.join(", ")));
    }

    StructDiff {
        removed_structs,
        added_structs,
        changed_structs,
        breaking_changes,
        additive_changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_guard_types::StructField;

    fn struct_with(fields: Vec<(&str, &str)>) -> HeaderStruct {
        HeaderStruct::from_fields(
            fields
                .into_iter()
                .map(|(name, decl)| StructField {
                    name: name.to_string(),
                    declaration: decl.to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn tail_extension_is_additive_by_default() {
        let mut base = BTreeMap::new();
        base.insert("widget_t".to_string(), struct_with(vec![("a", "int a")]));
        let mut curr = BTreeMap::new();
        curr.insert("widget_t".to_string(), struct_with(vec![("a", "int a"), ("b", "int b")]));

        let diff = compare_struct_sets(&base, &curr, false);
        assert_eq!(diff.additive_changes.len(), 1);
        assert!(matches!(diff.changed_structs["widget_t"], StructChange::Additive { .. }));
    }

    #[test]
    fn tail_extension_is_breaking_when_policy_says_so() {
        let mut base = BTreeMap::new();
        base.insert("widget_t".to_string(), struct_with(vec![("a", "int a")]));
        let mut curr = BTreeMap::new();
        curr.insert("widget_t".to_string(), struct_with(vec![("a", "int a"), ("b", "int b")]));

        let diff = compare_struct_sets(&base, &curr, true);
        assert!(matches!(diff.changed_structs["widget_t"], StructChange::Breaking { .. }));
    }

    #[test]
    fn reordered_field_is_breaking() {
        let mut base = BTreeMap::new();
        base.insert("widget_t".to_string(), struct_with(vec![("a", "int a"), ("b", "int b")]));
        let mut curr = BTreeMap::new();
        curr.insert("widget_t".to_string(), struct_with(vec![("b", "int b"), ("a", "int a")]));

        let diff = compare_struct_sets(&base, &curr, false);
        assert!(matches!(diff.changed_structs["widget_t"], StructChange::Breaking { .. }));
    }

    #[test]
    fn identical_declarations_produce_no_diff_entry() {
        let mut base = BTreeMap::new();
        base.insert("widget_t".to_string(), struct_with(vec![("a", "int a")]));
        let mut curr = BTreeMap::new();
        curr.insert("widget_t".to_string(), struct_with(vec![("a", "int   a")]));

        let diff = compare_struct_sets(&base, &curr, false);
        assert!(diff.changed_structs.is_empty());
    }
}
