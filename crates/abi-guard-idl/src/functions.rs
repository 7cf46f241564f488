//! Builds [`IdlFunction`] records from a snapshot's header function table.

use std::collections::{BTreeMap, BTreeSet};

use abi_guard_types::{AbiVersion, Availability, HeaderPayload, IdlFunction};
use abi_guard_parser::lexical::normalize_c_type;
use abi_guard_parser::parse_c_function_parameters;

use crate::filter::{include_symbol_for_codegen, CodegenSymbolFilter};

fn stable_id_key(symbol: &str, return_type: &str, params: &[abi_guard_types::IdlParameter]) -> serde_json::Value {
    serde_json::json!({
        "name": symbol,
        "return_type": return_type,
        "parameters": params.iter().map(|p| (p.name.clone(), p.c_type.clone())).collect::<Vec<_>>(),
    })
}

#[must_use]
pub fn build_function_idl_records(
    header: &HeaderPayload,
    abi_version: &AbiVersion,
    filter: &CodegenSymbolFilter,
    symbol_docs: &BTreeMap<String, String>,
    deprecated_symbols: &BTreeSet<String>,
) -> Vec<IdlFunction> {
    let since_abi = abi_version.to_string();
    let mut out = Vec::new();

    for symbol in header.functions.keys() {
        if !include_symbol_for_codegen(symbol, filter) {
            continue;
        }
        let payload = &header.functions[symbol];
        let return_type = normalize_c_type(&payload.return_type);
        let parameters = parse_c_function_parameters(&payload.parameters)
            .into_iter()
            .map(|mut p| {
                p.c_type = normalize_c_type(&p.c_type);
                p
            })
            .collect::<Vec<_>>();

        let stable_id = abi_guard_types::stable_hash(&stable_id_key(symbol, &return_type, &parameters));

        out.push(IdlFunction {
            name: symbol.clone(),
            c_return_type: return_type,
            c_parameters_raw: payload.parameters.clone(),
            parameters,
            c_signature: payload.signature.clone(),
            documentation: symbol_docs.get(symbol).cloned().unwrap_or_default(),
            deprecated: deprecated_symbols.contains(symbol),
            availability: Availability {
                since_abi: since_abi.clone(),
            },
            stable_id,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_guard_types::{HeaderFunction, LayoutProbePayload, ParserInfo};

    fn empty_parser_info() -> ParserInfo {
        ParserInfo {
            backend_requested: "regex".to_string(),
            backend: "regex".to_string(),
            fallback_used: false,
            parse_mode: "regex".to_string(),
            details: BTreeMap::new(),
        }
    }

    fn disabled_layout_probe() -> LayoutProbePayload {
        LayoutProbePayload {
            enabled: false,
            available: false,
            reason: Some("disabled".to_string()),
            compiler: None,
            errors: Vec::new(),
            structs: BTreeMap::new(),
        }
    }

    fn header_with(functions: Vec<(&str, &str, &str)>) -> HeaderPayload {
        let mut map = BTreeMap::new();
        for (name, return_type, parameters) in functions {
            map.insert(
                name.to_string(),
                HeaderFunction {
                    return_type: return_type.to_string(),
                    parameters: parameters.to_string(),
                    signature: format!("{return_type} {name}({parameters})"),
                },
            );
        }
        HeaderPayload {
            path: "widget.h".to_string(),
            function_count: map.len(),
            symbols: map.keys().cloned().collect(),
            functions: map,
            enum_count: 0,
            enums: BTreeMap::new(),
            struct_count: 0,
            structs: BTreeMap::new(),
            opaque_types: Vec::new(),
            opaque_type_declarations: Vec::new(),
            callback_typedefs: Vec::new(),
            constants: BTreeMap::new(),
            parser: empty_parser_info(),
            layout_probe: disabled_layout_probe(),
        }
    }

    #[test]
    fn builds_one_record_per_included_symbol() {
        let header = header_with(vec![("widget_create", "widget_t *", "int flags")]);
        let records = build_function_idl_records(
            &header,
            &AbiVersion::new(1, 0, 0),
            &CodegenSymbolFilter::default(),
            &BTreeMap::new(),
            &BTreeSet::new(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "widget_create");
        assert_eq!(records[0].availability.since_abi, "1.0.0");
        assert_eq!(records[0].parameters.len(), 1);
    }

    #[test]
    fn excluded_symbol_is_skipped() {
        let header = header_with(vec![
            ("widget_create", "widget_t *", "void"),
            ("widget_internal_reset", "void", "void"),
        ]);
        let mut filter = CodegenSymbolFilter::default();
        filter.exclude_symbols.insert("widget_internal_reset".to_string());
        let records = build_function_idl_records(&header, &AbiVersion::new(1, 0, 0), &filter, &BTreeMap::new(), &BTreeSet::new());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "widget_create");
    }

    #[test]
    fn stable_id_is_deterministic_for_identical_signatures() {
        let header = header_with(vec![("widget_create", "widget_t *", "int flags")]);
        let r1 = build_function_idl_records(&header, &AbiVersion::new(1, 0, 0), &CodegenSymbolFilter::default(), &BTreeMap::new(), &BTreeSet::new());
        let r2 = build_function_idl_records(&header, &AbiVersion::new(2, 0, 0), &CodegenSymbolFilter::default(), &BTreeMap::new(), &BTreeSet::new());
        assert_eq!(r1[0].stable_id, r2[0].stable_id);
    }

    #[test]
    fn deprecated_symbols_are_flagged() {
        let header = header_with(vec![("widget_create_v1", "widget_t *", "void")]);
        let mut deprecated = BTreeSet::new();
        deprecated.insert("widget_create_v1".to_string());
        let records = build_function_idl_records(&header, &AbiVersion::new(1, 0, 0), &CodegenSymbolFilter::default(), &BTreeMap::new(), &deprecated);
        assert!(records[0].deprecated);
    }
}
