//! Renders a linker version-script export map (GNU ld `VERS_1.0 { global: ...
//! local: *; };` shape) from an IDL payload's function symbol list.

use std::collections::BTreeSet;

use abi_guard_types::Idl;

#[must_use]
pub fn render_native_export_map_from_idl(idl: &Idl) -> String {
    let symbols: BTreeSet<&str> = idl
        .functions
        .iter()
        .map(|f| f.name.as_str())
        .filter(|name| !name.is_empty())
        .collect();

    let mut lines = Vec::new();
    lines.push("{".to_string());
    lines.push("  global:".to_string());
    for symbol in symbols {
        lines.push(format!("    {symbol};"));
    }
    lines.push(String::new());
    lines.push("  local:".to_string());
    lines.push("    *;".to_string());
    lines.push("};".to_string());
    lines.push(String::new());
    lines.join("\n")
}
