//! Assembles the full [`Idl`] payload (C6) from an ABI snapshot.

use std::collections::{BTreeMap, BTreeSet};

use abi_guard_types::{
    stable_hash, Idl, IdlCodegenInfo, IdlHeaderTypes, IdlSource, IdlSummary, IdlToolIdentity, Snapshot,
    IDL_SCHEMA_URI_V1, IDL_SCHEMA_VERSION, TOOL_VERSION,
};

use crate::filter::CodegenSymbolFilter;
use crate::functions::build_function_idl_records;

/// Mirrors the `codegen` section of target config: which symbols get
/// emitted, their documentation strings, and which are marked deprecated.
#[derive(Debug, Clone)]
pub struct IdlBuildConfig {
    pub enabled: bool,
    pub filter: CodegenSymbolFilter,
    pub symbol_docs: BTreeMap<String, String>,
    pub deprecated_symbols: BTreeSet<String>,
}

impl Default for IdlBuildConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            filter: CodegenSymbolFilter::default(),
            symbol_docs: BTreeMap::new(),
            deprecated_symbols: BTreeSet::new(),
        }
    }
}

#[must_use]
pub fn build_idl_payload(target_name: &str, snapshot: &Snapshot, cfg: &IdlBuildConfig) -> Idl {
    let records = build_function_idl_records(
        &snapshot.header,
        &snapshot.abi_version,
        &cfg.filter,
        &cfg.symbol_docs,
        &cfg.deprecated_symbols,
    );

    let content_fingerprint = stable_hash(&serde_json::json!({
        "target": target_name,
        "abi_version": snapshot.abi_version,
        "functions": records
            .iter()
            .map(|r| serde_json::json!({
                "name": r.name,
                "c_return_type": r.c_return_type,
                "parameters": r.parameters,
            }))
            .collect::<Vec<_>>(),
    }));

    Idl {
        idl_schema_version: IDL_SCHEMA_VERSION,
        idl_schema: IDL_SCHEMA_URI_V1.to_string(),
        tool: IdlToolIdentity {
            name: "abi_guard".to_string(),
            version: TOOL_VERSION.to_string(),
        },
        content_fingerprint,
        target: target_name.to_string(),
        abi_version: snapshot.abi_version.clone(),
        source: IdlSource {
            header_path: snapshot.header.path.clone(),
            parser_backend: Some(snapshot.header.parser.backend_requested.clone()),
        },
        summary: IdlSummary {
            function_count: records.len(),
            enum_count: snapshot.header.enum_count,
            struct_count: snapshot.header.struct_count,
        },
        functions: records,
        header_types: IdlHeaderTypes {
            enums: snapshot.header.enums.clone(),
            structs: snapshot.header.structs.clone(),
            opaque_types: snapshot.header.opaque_types.clone(),
            opaque_type_declarations: snapshot.header.opaque_type_declarations.clone(),
            callback_typedefs: snapshot.header.callback_typedefs.clone(),
            constants: snapshot.header.constants.clone(),
        },
        codegen: IdlCodegenInfo {
            enabled: cfg.enabled,
            include_symbols: cfg.filter.include_symbols.iter().cloned().collect(),
            exclude_symbols: cfg.filter.exclude_symbols.iter().cloned().collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_guard_types::{
        BindingsPayload, BinaryPayload, HeaderFunction, HeaderPayload, LayoutProbePayload, ParserInfo,
        SnapshotPolicy, ToolIdentity, TypePolicy,
    };
    use abi_guard_types::AbiVersion;

    fn sample_snapshot() -> Snapshot {
        let mut functions = BTreeMap::new();
        functions.insert(
            "widget_create".to_string(),
            HeaderFunction {
                return_type: "widget_t *".to_string(),
                parameters: "int flags".to_string(),
                signature: "widget_t * widget_create(int flags)".to_string(),
            },
        );

        Snapshot {
            tool: ToolIdentity::default(),
            target: "widget".to_string(),
            generated_at_utc: "2026-01-01T00:00:00Z".to_string(),
            policy: SnapshotPolicy {
                type_policy: TypePolicy::default(),
                strict_semver: true,
            },
            abi_version: AbiVersion::new(1, 2, 3),
            header: HeaderPayload {
                path: "widget.h".to_string(),
                function_count: functions.len(),
                symbols: functions.keys().cloned().collect(),
                functions,
                enum_count: 0,
                enums: BTreeMap::new(),
                struct_count: 0,
                structs: BTreeMap::new(),
                opaque_types: Vec::new(),
                opaque_type_declarations: Vec::new(),
                callback_typedefs: Vec::new(),
                constants: BTreeMap::new(),
                parser: ParserInfo {
                    backend_requested: "regex".to_string(),
                    backend: "regex".to_string(),
                    fallback_used: false,
                    parse_mode: "regex".to_string(),
                    details: BTreeMap::new(),
                },
                layout_probe: LayoutProbePayload {
                    enabled: false,
                    available: false,
                    reason: Some("disabled".to_string()),
                    compiler: None,
                    errors: Vec::new(),
                    structs: BTreeMap::new(),
                },
            },
            bindings: BindingsPayload::not_configured(),
            binary: BinaryPayload::not_configured(),
        }
    }

    #[test]
    fn assembles_payload_with_one_function_record() {
        let snapshot = sample_snapshot();
        let idl = build_idl_payload("widget", &snapshot, &IdlBuildConfig::default());
        assert_eq!(idl.target, "widget");
        assert_eq!(idl.summary.function_count, 1);
        assert_eq!(idl.functions[0].name, "widget_create");
        assert_eq!(idl.source.header_path, "widget.h");
        assert_eq!(idl.source.parser_backend.as_deref(), Some("regex"));
    }

    #[test]
    fn content_fingerprint_is_stable_across_equivalent_snapshots() {
        let snapshot = sample_snapshot();
        let idl_a = build_idl_payload("widget", &snapshot, &IdlBuildConfig::default());
        let idl_b = build_idl_payload("widget", &snapshot, &IdlBuildConfig::default());
        assert_eq!(idl_a.content_fingerprint, idl_b.content_fingerprint);
    }

    #[test]
    fn content_fingerprint_changes_with_abi_version() {
        let mut snapshot = sample_snapshot();
        let idl_a = build_idl_payload("widget", &snapshot, &IdlBuildConfig::default());
        snapshot.abi_version = AbiVersion::new(2, 0, 0);
        let idl_b = build_idl_payload("widget", &snapshot, &IdlBuildConfig::default());
        assert_ne!(idl_a.content_fingerprint, idl_b.content_fingerprint);
    }
}
