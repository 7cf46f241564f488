//! Probes real struct layouts (size, alignment, field offsets) by compiling
//! and running a tiny generated C program that `#include`s the target header
//! and prints `sizeof`/`_Alignof`/`offsetof` as JSON.

use std::collections::BTreeMap;
use std::time::Duration;

use camino::Utf8Path;
use once_cell::sync::Lazy;
use regex::Regex;

use abi_guard_runner::{CommandRunner, CommandSpec};
use abi_guard_types::{HeaderStruct, LayoutProbePayload, StructLayout};

static LAYOUT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

pub struct LayoutProbeConfig {
    pub enable: bool,
    pub compiler: Option<String>,
    pub cflags: Vec<String>,
    pub include_dirs: Vec<String>,
}

impl Default for LayoutProbeConfig {
    fn default() -> Self {
        Self {
            enable: false,
            compiler: None,
            cflags: Vec::new(),
            include_dirs: Vec::new(),
        }
    }
}

#[must_use]
fn is_valid_layout_name(name: &str) -> bool {
    LAYOUT_NAME.is_match(name)
}

#[must_use]
fn is_offsetable_field(name: &str, declaration: &str) -> bool {
    if !is_valid_layout_name(name) {
        return false;
    }
    if name.starts_with("__unnamed_") {
        return false;
    }
    if declaration.contains(':') {
        return false;
    }
    true
}

fn disabled(reason: &str) -> LayoutProbePayload {
    LayoutProbePayload {
        enabled: false,
        available: false,
        reason: Some(reason.to_string()),
        compiler: None,
        errors: Vec::new(),
        structs: BTreeMap::new(),
    }
}

fn generate_probe_source(header_path: &Utf8Path, structs: &BTreeMap<String, HeaderStruct>, names: &[String]) -> String {
    let mut lines = vec![
        "#include <stddef.h>".to_string(),
        "#include <stdio.h>".to_string(),
        format!("#include \"{header_path}\""),
        "int main(void) {".to_string(),
        "  printf(\"{\");".to_string(),
    ];

    for (s_idx, struct_name) in names.iter().enumerate() {
        let prefix = if s_idx > 0 { "," } else { "" };
        lines.push(format!(
            "  printf(\"{prefix}\\\"{struct_name}\\\":{{\\\"size\\\":%zu,\\\"alignment\\\":%zu,\\\"offsets\\\":{{\", sizeof({struct_name}), _Alignof({struct_name}));"
        ));
        if let Some(s) = structs.get(struct_name) {
            let offsetable: Vec<_> = s
                .fields
                .iter()
                .filter(|f| is_offsetable_field(&f.name, &f.declaration))
                .collect();
            for (f_idx, field) in offsetable.iter().enumerate() {
                let field_prefix = if f_idx > 0 { "," } else { "" };
                lines.push(format!(
                    "  printf(\"{field_prefix}\\\"{}\\\":%zu\", offsetof({struct_name}, {}));",
                    field.name, field.name
                ));
            }
        }
        lines.push("  printf(\"}\");".to_string());
    }

    lines.push("  printf(\"}\");".to_string());
    lines.push("  return 0;".to_string());
    lines.push("}".to_string());
    format!("{}\n", lines.join("\n"))
}

/// Compile and run a tiny probe program to recover the real layout of each
/// struct the header parser found. Returns a disabled/unavailable payload
/// (never an error) when probing isn't configured or the toolchain is
/// missing, matching the diagnostic-not-fatal nature of this step.
pub fn probe_struct_layouts(
    header_path: &Utf8Path,
    structs: &BTreeMap<String, HeaderStruct>,
    cfg: &LayoutProbeConfig,
    runner: &dyn CommandRunner,
) -> LayoutProbePayload {
    if !cfg.enable {
        return disabled("disabled");
    }

    let compiler = cfg.compiler.clone().unwrap_or_else(|| {
        std::env::var("CC").unwrap_or_else(|_| "cc".to_string())
    });

    let mut struct_names: Vec<String> = structs
        .keys()
        .filter(|name| is_valid_layout_name(name))
        .cloned()
        .collect();
    struct_names.sort();

    if struct_names.is_empty() {
        return LayoutProbePayload {
            enabled: true,
            available: false,
            reason: Some("no_structs".to_string()),
            compiler: Some(compiler),
            errors: Vec::new(),
            structs: BTreeMap::new(),
        };
    }

    let Ok(temp_dir) = tempfile::Builder::new().prefix("abi_layout_probe_").tempdir() else {
        return LayoutProbePayload {
            enabled: true,
            available: false,
            reason: Some("temp_dir_failed".to_string()),
            compiler: Some(compiler),
            errors: vec!["failed to create temporary probe directory".to_string()],
            structs: BTreeMap::new(),
        };
    };

    let source_path = temp_dir.path().join("probe.c");
    let binary_name = if cfg!(target_os = "windows") { "probe.exe" } else { "probe" };
    let binary_path = temp_dir.path().join(binary_name);

    let source = generate_probe_source(header_path, structs, &struct_names);
    if std::fs::write(&source_path, source).is_err() {
        return LayoutProbePayload {
            enabled: true,
            available: false,
            reason: Some("probe_source_write_failed".to_string()),
            compiler: Some(compiler),
            errors: vec!["failed to write generated probe source".to_string()],
            structs: BTreeMap::new(),
        };
    }

    let mut compile = CommandSpec::new(&compiler)
        .arg("-std=c11")
        .arg(source_path.to_string_lossy().into_owned())
        .arg("-o")
        .arg(binary_path.to_string_lossy().into_owned());
    for dir in &cfg.include_dirs {
        compile = compile.arg("-I").arg(dir);
    }
    for flag in &cfg.cflags {
        compile = compile.arg(flag);
    }
    let compile_display = compile.display();

    let compile_output = match runner.run(&compile, Duration::from_secs(60)) {
        Ok(out) if out.success() => out,
        Ok(out) => {
            let message = out.stderr_string();
            let message = if message.trim().is_empty() { out.stdout_string() } else { message };
            return LayoutProbePayload {
                enabled: true,
                available: false,
                reason: Some("compile_failed".to_string()),
                compiler: Some(compile_display),
                errors: vec![message.trim().to_string()],
                structs: BTreeMap::new(),
            };
        }
        Err(err) => {
            return LayoutProbePayload {
                enabled: true,
                available: false,
                reason: Some("compiler_not_found".to_string()),
                compiler: Some(compile_display),
                errors: vec![err.to_string()],
                structs: BTreeMap::new(),
            };
        }
    };
    let _ = compile_output;

    let run_spec = CommandSpec::new(binary_path.to_string_lossy().into_owned());
    let run_output = match runner.run(&run_spec, Duration::from_secs(10)) {
        Ok(out) if out.success() => out,
        Ok(out) => {
            let message = out.stderr_string();
            let message = if message.trim().is_empty() { out.stdout_string() } else { message };
            return LayoutProbePayload {
                enabled: true,
                available: false,
                reason: Some("probe_execution_failed".to_string()),
                compiler: Some(compile_display),
                errors: vec![message.trim().to_string()],
                structs: BTreeMap::new(),
            };
        }
        Err(err) => {
            return LayoutProbePayload {
                enabled: true,
                available: false,
                reason: Some("probe_execution_failed".to_string()),
                compiler: Some(compile_display),
                errors: vec![err.to_string()],
                structs: BTreeMap::new(),
            };
        }
    };

    let raw_output = run_output.stdout_string();
    let raw_output = raw_output.trim();
    let layout_data: serde_json::Value = if raw_output.is_empty() {
        serde_json::json!({})
    } else {
        match serde_json::from_str(raw_output) {
            Ok(value) => value,
            Err(err) => {
                return LayoutProbePayload {
                    enabled: true,
                    available: false,
                    reason: Some("probe_output_parse_failed".to_string()),
                    compiler: Some(compile_display),
                    errors: vec![format!("{err}: {}", &raw_output[..raw_output.len().min(240)])],
                    structs: BTreeMap::new(),
                };
            }
        }
    };

    let Some(layout_obj) = layout_data.as_object() else {
        return LayoutProbePayload {
            enabled: true,
            available: false,
            reason: Some("probe_output_invalid".to_string()),
            compiler: Some(compile_display),
            errors: vec!["probe output root is not an object".to_string()],
            structs: BTreeMap::new(),
        };
    };

    let mut normalized = BTreeMap::new();
    for struct_name in &struct_names {
        let Some(entry) = layout_obj.get(struct_name).and_then(|v| v.as_object()) else {
            continue;
        };
        let Some(size) = entry.get("size").and_then(|v| v.as_u64()) else {
            continue;
        };
        let Some(alignment) = entry.get("alignment").and_then(|v| v.as_u64()) else {
            continue;
        };
        let mut offsets = BTreeMap::new();
        if let Some(offsets_obj) = entry.get("offsets").and_then(|v| v.as_object()) {
            for (field_name, offset_value) in offsets_obj {
                if let Some(offset) = offset_value.as_u64() {
                    offsets.insert(field_name.clone(), offset);
                }
            }
        }
        normalized.insert(struct_name.clone(), StructLayout { size, alignment, offsets });
    }

    LayoutProbePayload {
        enabled: true,
        available: true,
        reason: Some("ok".to_string()),
        compiler: Some(compile_display),
        errors: Vec::new(),
        structs: normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_guard_types::StructField;

    #[test]
    fn disabled_config_short_circuits_without_touching_runner() {
        use abi_guard_runner::MockCommandRunner;
        let runner = MockCommandRunner::new();
        let payload = probe_struct_layouts(
            Utf8Path::new("widget.h"),
            &BTreeMap::new(),
            &LayoutProbeConfig::default(),
            &runner,
        );
        assert!(!payload.enabled);
        assert_eq!(payload.reason.as_deref(), Some("disabled"));
    }

    #[test]
    fn no_structs_reports_unavailable_with_reason() {
        use abi_guard_runner::MockCommandRunner;
        let runner = MockCommandRunner::new();
        let cfg = LayoutProbeConfig {
            enable: true,
            ..Default::default()
        };
        let payload = probe_struct_layouts(Utf8Path::new("widget.h"), &BTreeMap::new(), &cfg, &runner);
        assert!(payload.enabled);
        assert!(!payload.available);
        assert_eq!(payload.reason.as_deref(), Some("no_structs"));
    }

    #[test]
    fn is_offsetable_field_excludes_bitfields_and_unnamed_placeholders() {
        assert!(is_offsetable_field("count", "int count"));
        assert!(!is_offsetable_field("__unnamed_0", "int __unnamed_0"));
        assert!(!is_offsetable_field("flags", "unsigned flags : 4"));
    }

    #[test]
    fn generate_probe_source_includes_header_and_offset_calls() {
        let mut structs = BTreeMap::new();
        structs.insert(
            "widget_t".to_string(),
            HeaderStruct::from_fields(vec![StructField {
                name: "count".to_string(),
                declaration: "int count".to_string(),
            }]),
        );
        let source = generate_probe_source(Utf8Path::new("widget.h"), &structs, &["widget_t".to_string()]);
        assert!(source.contains("#include \"widget.h\""));
        assert!(source.contains("offsetof(widget_t, count)"));
    }
}
