//! Derives the set of opaque handle typedef names visible in an IDL payload,
//! either from an explicit list or by scanning function/struct declarations
//! for `_t`-suffixed tokens that aren't already known enums or structs.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use abi_guard_types::Idl;

static TYPEDEF_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*_t$").unwrap());
static TYPEDEF_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*_t\b").unwrap());

#[must_use]
pub fn is_c_typedef_name(value: &str) -> bool {
    TYPEDEF_NAME.is_match(value)
}

#[must_use]
pub fn derive_opaque_type_names_from_idl(idl: &Idl) -> Vec<String> {
    let enum_names: BTreeSet<&str> = idl.header_types.enums.keys().map(String::as_str).collect();
    let struct_names: BTreeSet<&str> = idl.header_types.structs.keys().map(String::as_str).collect();

    if !idl.header_types.opaque_types.is_empty() {
        let mut seen = BTreeSet::new();
        let mut names = Vec::new();
        for item in &idl.header_types.opaque_types {
            let name = item.trim();
            if !is_c_typedef_name(name) || seen.contains(name) {
                continue;
            }
            seen.insert(name.to_string());
            names.push(name.to_string());
        }
        if !names.is_empty() {
            return names;
        }
    }

    let mut candidates: BTreeSet<String> = BTreeSet::new();
    for function in &idl.functions {
        for m in TYPEDEF_TOKEN.find_iter(&function.c_return_type) {
            candidates.insert(m.as_str().to_string());
        }
        for param in &function.parameters {
            for m in TYPEDEF_TOKEN.find_iter(&param.c_type) {
                candidates.insert(m.as_str().to_string());
            }
        }
    }
    for header_struct in idl.header_types.structs.values() {
        for field in &header_struct.fields {
            for m in TYPEDEF_TOKEN.find_iter(&field.declaration) {
                candidates.insert(m.as_str().to_string());
            }
        }
    }

    candidates
        .into_iter()
        .filter(|name| !enum_names.contains(name.as_str()) && !struct_names.contains(name.as_str()) && is_c_typedef_name(name))
        .collect()
}
