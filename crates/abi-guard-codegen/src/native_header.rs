//! Renders the canonical native C header (C7) from an IDL payload: include
//! guard, export/calling-convention macros, constants, opaque/callback
//! typedefs, enum and struct definitions, and function declarations.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use abi_guard_idl::derive_opaque_type_names_from_idl;
use abi_guard_parser::lexical::{normalize_c_type, normalize_ws, sanitize_c_decl_text};
use abi_guard_types::{Idl, IdlParameter};

static FN_PTR_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*\*\s*\)").unwrap());
static LEADING_PAREN_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s+").unwrap());
static TRAILING_PAREN_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\)").unwrap());

/// Generator-configurable names for the macros, version constants, and
/// include guard a rendered header uses.
#[derive(Debug, Clone)]
pub struct NativeHeaderConfig {
    pub api_macro: String,
    pub call_macro: String,
    pub header_guard: Option<String>,
    pub version_major_name: String,
    pub version_minor_name: String,
    pub version_patch_name: String,
    pub native_constants: BTreeMap<String, String>,
}

impl Default for NativeHeaderConfig {
    fn default() -> Self {
        Self {
            api_macro: "ABI_API".to_string(),
            call_macro: "ABI_CALL".to_string(),
            header_guard: None,
            version_major_name: "ABI_VERSION_MAJOR".to_string(),
            version_minor_name: "ABI_VERSION_MINOR".to_string(),
            version_patch_name: "ABI_VERSION_PATCH".to_string(),
            native_constants: BTreeMap::new(),
        }
    }
}

fn header_guard_for(target_name: &str, cfg: &NativeHeaderConfig) -> String {
    if let Some(guard) = &cfg.header_guard {
        if !guard.is_empty() {
            return guard.clone();
        }
    }
    let base: String = target_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect::<String>()
        .to_uppercase();
    if base.ends_with("_H") {
        base
    } else {
        format!("{base}_H")
    }
}

#[must_use]
pub fn collect_opaque_type_declarations(idl: &Idl) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut declarations = Vec::new();
    for item in &idl.header_types.opaque_type_declarations {
        let mut decl = normalize_ws(item);
        if decl.is_empty() {
            continue;
        }
        if !decl.ends_with(';') {
            decl.push(';');
        }
        if seen.insert(decl.clone()) {
            declarations.push(decl);
        }
    }
    if !declarations.is_empty() {
        return declarations;
    }

    derive_opaque_type_names_from_idl(idl)
        .into_iter()
        .map(|name| format!("typedef struct {name} {name};"))
        .collect()
}

#[must_use]
pub fn collect_callback_typedef_declarations(idl: &Idl) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut declarations = Vec::new();
    for callback in &idl.header_types.callback_typedefs {
        let mut declaration = sanitize_c_decl_text(&callback.declaration);
        if declaration.is_empty() {
            continue;
        }
        declaration = LEADING_PAREN_SPACE.replace_all(&declaration, "(").to_string();
        declaration = TRAILING_PAREN_SPACE.replace_all(&declaration, ")").to_string();
        if !declaration.ends_with(';') {
            declaration.push(';');
        }
        if seen.insert(declaration.clone()) {
            declarations.push(declaration);
        }
    }
    declarations
}

#[must_use]
pub fn collect_native_constants(idl: &Idl, overrides: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut constants: BTreeMap<String, String> = idl
        .header_types
        .constants
        .iter()
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .map(|(k, v)| (k.clone(), normalize_ws(v)))
        .collect();
    for (key, value) in overrides {
        if !key.is_empty() && !value.is_empty() {
            constants.insert(key.clone(), normalize_ws(value));
        }
    }
    constants
}

#[must_use]
pub fn render_c_parameter_for_declaration(param: &IdlParameter, index: usize) -> String {
    let c_type = normalize_c_type(&param.c_type);
    if param.variadic || c_type == "..." {
        return "...".to_string();
    }
    let name = if param.name.is_empty() { format!("arg{index}") } else { param.name.clone() };
    if FN_PTR_PARENS.is_match(&c_type) {
        return FN_PTR_PARENS.replacen(&c_type, 1, format!("(*{name})").as_str()).to_string();
    }
    format!("{c_type} {name}").trim().to_string()
}

#[must_use]
pub fn render_native_header_from_idl(target_name: &str, idl: &Idl, cfg: &NativeHeaderConfig) -> String {
    let header_guard = header_guard_for(target_name, cfg);
    let api_base = cfg.api_macro.strip_suffix("_API").unwrap_or(&cfg.api_macro);
    let export_switch = format!("{api_base}_EXPORTS");
    let dll_switch = format!("{api_base}_DLL");

    let mut constants = collect_native_constants(idl, &cfg.native_constants);
    for key in [&cfg.version_major_name, &cfg.version_minor_name, &cfg.version_patch_name] {
        constants.remove(key);
    }

    let mut lines = Vec::new();
    lines.push(format!("#ifndef {header_guard}"));
    lines.push(format!("#define {header_guard}"));
    lines.push(String::new());
    lines.push("/* Auto-generated from ABI IDL. Do not edit manually. */".to_string());
    lines.push(String::new());
    lines.push("#ifdef __cplusplus".to_string());
    lines.push("extern \"C\" {".to_string());
    lines.push("#endif".to_string());
    lines.push(String::new());
    lines.push("#include <stddef.h>".to_string());
    lines.push("#include <stdint.h>".to_string());
    lines.push("#include <stdbool.h>".to_string());
    lines.push(String::new());
    lines.push("#if defined(_WIN32)".to_string());
    lines.push(format!("  #if defined({export_switch})"));
    lines.push(format!("    #define {} __declspec(dllexport)", cfg.api_macro));
    lines.push(format!("  #elif defined({dll_switch})"));
    lines.push(format!("    #define {} __declspec(dllimport)", cfg.api_macro));
    lines.push("  #else".to_string());
    lines.push(format!("    #define {}", cfg.api_macro));
    lines.push("  #endif".to_string());
    lines.push(format!("  #define {} __cdecl", cfg.call_macro));
    lines.push("#else".to_string());
    lines.push(format!("  #define {} __attribute__((visibility(\"default\")))", cfg.api_macro));
    lines.push(format!("  #define {}", cfg.call_macro));
    lines.push("#endif".to_string());
    lines.push(String::new());
    for (name, value) in &constants {
        lines.push(format!("#define {name} {value}"));
    }
    lines.push(format!("#define {} {}", cfg.version_major_name, idl.abi_version.major));
    lines.push(format!("#define {} {}", cfg.version_minor_name, idl.abi_version.minor));
    lines.push(format!("#define {} {}", cfg.version_patch_name, idl.abi_version.patch));
    lines.push(String::new());

    let opaque_typedefs = collect_opaque_type_declarations(idl);
    lines.extend(opaque_typedefs.iter().cloned());
    if !opaque_typedefs.is_empty() {
        lines.push(String::new());
    }

    let callback_typedefs = collect_callback_typedef_declarations(idl);
    lines.extend(callback_typedefs.iter().cloned());
    if !callback_typedefs.is_empty() {
        lines.push(String::new());
    }

    for (enum_name, enum_def) in &idl.header_types.enums {
        lines.push(format!("typedef enum {enum_name} {{"));
        for member in &enum_def.members {
            if member.name.is_empty() {
                continue;
            }
            if let Some(expr) = &member.value_expr {
                if !expr.is_empty() {
                    lines.push(format!("  {} = {expr},", member.name));
                    continue;
                }
            }
            if let Some(value) = member.value {
                lines.push(format!("  {} = {value},", member.name));
            } else {
                lines.push(format!("  {},", member.name));
            }
        }
        lines.push(format!("}} {enum_name};"));
        lines.push(String::new());
    }

    for (struct_name, struct_def) in &idl.header_types.structs {
        lines.push(format!("typedef struct {struct_name} {{"));
        for field in &struct_def.fields {
            let declaration = normalize_ws(&field.declaration);
            if declaration.is_empty() {
                continue;
            }
            lines.push(format!("  {declaration};"));
        }
        lines.push(format!("}} {struct_name};"));
        lines.push(String::new());
    }

    let mut functions = idl.functions.clone();
    functions.sort_by(|a, b| a.name.cmp(&b.name));
    for function in &functions {
        if function.name.is_empty() {
            continue;
        }
        let return_type = normalize_c_type(&function.c_return_type);
        let params_text = if function.parameters.is_empty() {
            "void".to_string()
        } else {
            function
                .parameters
                .iter()
                .enumerate()
                .map(|(idx, p)| render_c_parameter_for_declaration(p, idx))
                .collect::<Vec<_>>()
                .join(", ")
        };
        lines.push(format!("{} {return_type} {} {}({params_text});", cfg.api_macro, cfg.call_macro, function.name));
    }

    lines.push(String::new());
    lines.push("#ifdef __cplusplus".to_string());
    lines.push("}".to_string());
    lines.push("#endif".to_string());
    lines.push(String::new());
    lines.push(format!("#endif /* {header_guard} */"));
    lines.push(String::new());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_guard_types::{
        Availability, IdlCodegenInfo, IdlFunction, IdlHeaderTypes, IdlSource, IdlSummary, IdlToolIdentity, AbiVersion,
        IDL_SCHEMA_URI_V1, IDL_SCHEMA_VERSION,
    };

    fn minimal_idl() -> Idl {
        Idl {
            idl_schema_version: IDL_SCHEMA_VERSION,
            idl_schema: IDL_SCHEMA_URI_V1.to_string(),
            tool: IdlToolIdentity { name: "abi_guard".to_string(), version: "1.0.0".to_string() },
            content_fingerprint: "fp".to_string(),
            target: "widget".to_string(),
            abi_version: AbiVersion::new(1, 2, 3),
            source: IdlSource { header_path: "widget.h".to_string(), parser_backend: None },
            summary: IdlSummary { function_count: 1, enum_count: 0, struct_count: 0 },
            functions: vec![IdlFunction {
                name: "widget_create".to_string(),
                c_return_type: "widget_t *".to_string(),
                c_parameters_raw: "int flags".to_string(),
                parameters: vec![IdlParameter {
                    name: "flags".to_string(),
                    c_type: "int".to_string(),
                    pointer_depth: 0,
                    variadic: false,
                }],
                c_signature: String::new(),
                documentation: String::new(),
                deprecated: false,
                availability: Availability { since_abi: "1.2.3".to_string() },
                stable_id: "id".to_string(),
            }],
            header_types: IdlHeaderTypes {
                enums: BTreeMap::new(),
                structs: BTreeMap::new(),
                opaque_types: Vec::new(),
                opaque_type_declarations: Vec::new(),
                callback_typedefs: Vec::new(),
                constants: BTreeMap::new(),
            },
            codegen: IdlCodegenInfo { enabled: true, include_symbols: Vec::new(), exclude_symbols: Vec::new() },
        }
    }

    #[test]
    fn renders_include_guard_and_version_macros() {
        let idl = minimal_idl();
        let rendered = render_native_header_from_idl("widget", &idl, &NativeHeaderConfig::default());
        assert!(rendered.contains("#ifndef WIDGET_H"));
        assert!(rendered.contains("#define ABI_VERSION_MAJOR 1"));
        assert!(rendered.contains("#define ABI_VERSION_MINOR 2"));
        assert!(rendered.contains("#define ABI_VERSION_PATCH 3"));
    }

    #[test]
    fn renders_function_declaration_with_api_and_call_macros() {
        let idl = minimal_idl();
        let rendered = render_native_header_from_idl("widget", &idl, &NativeHeaderConfig::default());
        assert!(rendered.contains("ABI_API widget_t * ABI_CALL widget_create(int flags);"));
    }

    #[test]
    fn void_parameter_list_renders_as_void() {
        let mut idl = minimal_idl();
        idl.functions[0].parameters.clear();
        let rendered = render_native_header_from_idl("widget", &idl, &NativeHeaderConfig::default());
        assert!(rendered.contains("widget_create(void);"));
    }

    #[test]
    fn function_pointer_parameter_embeds_name_inside_parens() {
        let mut idl = minimal_idl();
        idl.functions[0].parameters[0].c_type = "void (*)(int)".to_string();
        idl.functions[0].parameters[0].name = "cb".to_string();
        let rendered = render_native_header_from_idl("widget", &idl, &NativeHeaderConfig::default());
        assert!(rendered.contains("void (*cb)(int)"));
    }
}
