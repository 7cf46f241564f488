//! Extracts `typedef struct { ... } Name;` blocks into [`HeaderStruct`]
//! records, splitting their bodies into individual field declarations.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use abi_guard_types::{HeaderStruct, StructField, TypePolicy};

use crate::lexical::{normalize_ws, sanitize_c_decl_text};

static STRUCT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)typedef\s+struct(?:\s+[A-Za-z_][A-Za-z0-9_]*)?\s*\{(?P<body>.*?)\}\s*(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*;")
        .unwrap()
});
static FUNCTION_PTR_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*\*\s*(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*\)\s*\(").unwrap());
static BITFIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<left>.+?)\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*:\s*(?P<bits>.+)$").unwrap());
static ARRAY_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<left>.+?)\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?P<array>(?:\s*\[[^\]]+\])+)\s*$").unwrap()
});
static REGULAR_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<left>.+?)\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*$").unwrap());

/// Split a struct body into semicolon-terminated field declarations,
/// joining continuation lines and dropping blank/`#`-directive lines.
#[must_use]
pub fn split_struct_declarations(body: &str) -> Vec<String> {
    let mut declarations = Vec::new();
    let mut buffer = String::new();

    for line in body.lines() {
        let stripped = normalize_ws(line);
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }
        buffer = if buffer.is_empty() {
            stripped
        } else {
            normalize_ws(&format!("{buffer} {stripped}"))
        };

        while let Some(semi) = buffer.find(';') {
            let before = buffer[..semi].to_string();
            let after = buffer[semi + 1..].to_string();
            let decl = normalize_ws(&before);
            if !decl.is_empty() {
                declarations.push(decl);
            }
            buffer = normalize_ws(&after);
        }
    }

    declarations
}

#[must_use]
pub fn parse_struct_field(decl: &str, index: usize) -> StructField {
    let decl = sanitize_c_decl_text(decl);

    if let Some(caps) = FUNCTION_PTR_FIELD.captures(&decl) {
        return StructField {
            name: caps["name"].to_string(),
            declaration: normalize_ws(&decl),
        };
    }
    if let Some(caps) = BITFIELD.captures(&decl) {
        return StructField {
            name: caps["name"].to_string(),
            declaration: normalize_ws(&decl),
        };
    }
    if let Some(caps) = ARRAY_FIELD.captures(&decl) {
        return StructField {
            name: caps["name"].to_string(),
            declaration: normalize_ws(&decl),
        };
    }
    if let Some(caps) = REGULAR_FIELD.captures(&decl) {
        return StructField {
            name: caps["name"].to_string(),
            declaration: normalize_ws(&decl),
        };
    }

    StructField {
        name: format!("__unnamed_{index}"),
        declaration: normalize_ws(&decl),
    }
}

#[must_use]
pub fn parse_struct_blocks(content: &str, policy: &TypePolicy) -> BTreeMap<String, HeaderStruct> {
    if !policy.enable_structs {
        return BTreeMap::new();
    }
    let Ok(name_re) = Regex::new(&policy.struct_name_pattern) else {
        return BTreeMap::new();
    };

    let mut structs = BTreeMap::new();
    for caps in STRUCT_BLOCK.captures_iter(content) {
        let struct_name = &caps["name"];
        if policy.ignore_structs.iter().any(|ignored| ignored == struct_name) {
            continue;
        }
        if !name_re.is_match(struct_name) {
            continue;
        }

        let declarations = split_struct_declarations(&caps["body"]);
        let fields: Vec<StructField> = declarations
            .iter()
            .enumerate()
            .map(|(idx, decl)| parse_struct_field(decl, idx))
            .collect();

        structs.insert(struct_name.to_string(), HeaderStruct::from_fields(fields));
    }
    structs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> TypePolicy {
        TypePolicy::default()
    }

    #[test]
    fn parses_regular_and_array_and_function_pointer_fields() {
        let header = "typedef struct {\n    int count;\n    char name[32];\n    void (*callback)(int);\n} widget_t;";
        let structs = parse_struct_blocks(header, &policy());
        let s = structs.get("widget_t").unwrap();
        assert_eq!(s.field_count, 3);
        assert_eq!(s.fields[0].name, "count");
        assert_eq!(s.fields[1].name, "name");
        assert_eq!(s.fields[2].name, "callback");
    }

    #[test]
    fn split_struct_declarations_joins_continuation_lines() {
        let body = "int\n  count;\nchar name[32];";
        let decls = split_struct_declarations(body);
        assert_eq!(decls, vec!["int count".to_string(), "char name[32]".to_string()]);
    }

    #[test]
    fn unnamed_field_falls_back_to_index_placeholder() {
        let field = parse_struct_field("union { int a; float b; }", 2);
        assert_eq!(field.name, "__unnamed_2");
    }

    #[test]
    fn ignored_struct_name_is_skipped() {
        let mut p = policy();
        p.ignore_structs = vec!["widget_private_t".to_string()];
        let header = "typedef struct { int a; } widget_private_t;";
        let structs = parse_struct_blocks(header, &p);
        assert!(structs.is_empty());
    }
}
