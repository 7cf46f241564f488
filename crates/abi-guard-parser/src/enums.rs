//! Extracts `typedef enum { ... } Name;` blocks into [`HeaderEnum`] records.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use abi_guard_types::{EnumMember, HeaderEnum, TypePolicy};

use crate::int_expr::{eval_c_int_expr, sanitize_c_int_expr};
use crate::lexical::normalize_ws;

static ENUM_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)typedef\s+enum(?:\s+[A-Za-z_][A-Za-z0-9_]*)?\s*\{(?P<body>.*?)\}\s*(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*;")
        .unwrap()
});
static ENUM_MEMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?:\s*=\s*(?P<expr>.+))?$").unwrap());

#[must_use]
pub fn parse_enum_blocks(content: &str, policy: &TypePolicy) -> BTreeMap<String, HeaderEnum> {
    if !policy.enable_enums {
        return BTreeMap::new();
    }
    let Ok(name_re) = Regex::new(&policy.enum_name_pattern) else {
        return BTreeMap::new();
    };

    let mut enums = BTreeMap::new();
    for caps in ENUM_BLOCK.captures_iter(content) {
        let enum_name = &caps["name"];
        if policy.ignore_enums.iter().any(|ignored| ignored == enum_name) {
            continue;
        }
        if !name_re.is_match(enum_name) {
            continue;
        }

        let body = &caps["body"];
        let raw_items: Vec<String> = body.split(',').map(normalize_ws).collect();

        let mut members = Vec::new();
        let mut last_value: Option<i64> = None;
        let mut next_from_last = true;

        for item in raw_items {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let Some(caps) = ENUM_MEMBER.captures(item) else {
                continue;
            };
            let member_name = caps["name"].to_string();
            let expr = caps.name("expr").map(|m| m.as_str());

            let (value, value_expr) = match expr {
                None => {
                    let value = if next_from_last && last_value.is_some() {
                        last_value.map(|v| v + 1)
                    } else if members.is_empty() {
                        Some(0)
                    } else {
                        None
                    };
                    (value, None)
                }
                Some(expr) => {
                    let value_expr = sanitize_c_int_expr(expr);
                    let value = eval_c_int_expr(&value_expr);
                    (value, Some(value_expr))
                }
            };

            if let Some(v) = value {
                last_value = Some(v);
                next_from_last = true;
            } else {
                next_from_last = false;
            }

            members.push(EnumMember {
                name: member_name,
                value,
                value_expr,
            });
        }

        enums.insert(enum_name.to_string(), HeaderEnum::from_members(members));
    }
    enums
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> TypePolicy {
        TypePolicy::default()
    }

    #[test]
    fn parses_explicit_and_implicit_member_values() {
        let header = "typedef enum { WIDGET_RED = 1, WIDGET_GREEN, WIDGET_BLUE = 10 } widget_color_t;";
        let enums = parse_enum_blocks(header, &policy());
        let e = enums.get("widget_color_t").unwrap();
        assert_eq!(e.member_count, 3);
        assert_eq!(e.members[0].value, Some(1));
        assert_eq!(e.members[1].value, Some(2));
        assert_eq!(e.members[2].value, Some(10));
    }

    #[test]
    fn first_member_defaults_to_zero() {
        let header = "typedef enum { WIDGET_OK, WIDGET_ERR } widget_status_t;";
        let enums = parse_enum_blocks(header, &policy());
        let e = enums.get("widget_status_t").unwrap();
        assert_eq!(e.members[0].value, Some(0));
        assert_eq!(e.members[1].value, Some(1));
    }

    #[test]
    fn ignored_enum_name_is_skipped() {
        let mut p = policy();
        p.ignore_enums = vec!["widget_internal_t".to_string()];
        let header = "typedef enum { A } widget_internal_t;";
        let enums = parse_enum_blocks(header, &p);
        assert!(enums.is_empty());
    }

    #[test]
    fn unevaluated_expression_leaves_value_none_and_breaks_chain() {
        let header = "typedef enum { A = SOME_MACRO, B } widget_weird_t;";
        let enums = parse_enum_blocks(header, &policy());
        let e = enums.get("widget_weird_t").unwrap();
        assert_eq!(e.members[0].value, None);
        assert_eq!(e.members[1].value, None);
    }
}
