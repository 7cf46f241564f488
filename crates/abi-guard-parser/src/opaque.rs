//! Extracts opaque handle typedefs, callback function-pointer typedefs, and
//! prefixed `#define` constants from the raw (comment-stripped) header text.

use std::collections::BTreeMap;

use regex::Regex;

use abi_guard_types::{CallbackTypedef, OpaqueHandleTypedef};

use crate::lexical::normalize_ws;

static OPAQUE_TYPEDEF: once_cell::sync::Lazy<Regex> = once_cell::sync::Lazy::new(|| {
    Regex::new(r"typedef\s+struct\s+(?P<tag>[A-Za-z_][A-Za-z0-9_]*)\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*;")
        .unwrap()
});

#[must_use]
pub fn extract_opaque_struct_typedefs(content: &str, symbol_prefix: &str) -> Vec<OpaqueHandleTypedef> {
    let mut out = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for caps in OPAQUE_TYPEDEF.captures_iter(content) {
        let tag = &caps["tag"];
        let name = &caps["name"];
        if tag != name {
            continue;
        }
        if !name.starts_with(symbol_prefix) || !name.ends_with("_t") {
            continue;
        }
        if !seen.insert(name.to_string()) {
            continue;
        }
        out.push(OpaqueHandleTypedef {
            name: name.to_string(),
            declaration: normalize_ws(&caps[0]),
        });
    }
    out
}

#[must_use]
pub fn extract_callback_typedefs(
    content: &str,
    symbol_prefix: &str,
    call_macro: &str,
) -> Vec<CallbackTypedef> {
    let name_pattern = format!("{}[A-Za-z0-9_]*_cb", regex::escape(symbol_prefix));
    let pattern = format!(
        r"(?s)typedef\s+[^;]*?\(\s*{}\s*\*\s*(?P<name>{})\s*\)\s*\([^;]*?\)\s*;",
        regex::escape(call_macro),
        name_pattern
    );
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for caps in re.captures_iter(content) {
        let name = caps["name"].to_string();
        if !seen.insert(name.clone()) {
            continue;
        }
        out.push(CallbackTypedef {
            name,
            declaration: normalize_ws(&caps[0]),
        });
    }
    out
}

#[must_use]
pub fn extract_prefixed_define_constants(content: &str, macro_prefix: &str) -> BTreeMap<String, String> {
    let pattern = Regex::new(r"(?m)^\s*#\s*define\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s+(?P<value>.+?)\s*$").unwrap();
    let mut constants = BTreeMap::new();
    for caps in pattern.captures_iter(content) {
        let name = &caps["name"];
        if !name.starts_with(macro_prefix) {
            continue;
        }
        let value = normalize_ws(&caps["value"]);
        if value.is_empty() {
            continue;
        }
        constants.insert(name.to_string(), value);
    }
    constants
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_opaque_handle_typedef() {
        let header = "typedef struct widget_handle widget_handle_t;";
        let out = extract_opaque_struct_typedefs(header, "widget_");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "widget_handle_t");
    }

    #[test]
    fn skips_typedef_without_matching_tag_and_name() {
        let header = "typedef struct internal_tag widget_handle_t;";
        let out = extract_opaque_struct_typedefs(header, "widget_");
        assert!(out.is_empty());
    }

    #[test]
    fn extracts_callback_typedef() {
        let header = "typedef void (WIDGET_CALL *widget_progress_cb)(int percent);";
        let out = extract_callback_typedefs(header, "widget_", "WIDGET_CALL");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "widget_progress_cb");
    }

    #[test]
    fn extracts_only_prefixed_constants() {
        let header = "#define WIDGET_MAX_SIZE 256\n#define OTHER_THING 1\n";
        let constants = extract_prefixed_define_constants(header, "WIDGET_");
        assert_eq!(constants.len(), 1);
        assert_eq!(constants.get("WIDGET_MAX_SIZE").unwrap(), "256");
    }
}
