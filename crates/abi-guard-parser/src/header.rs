//! Top-level header parser: reads a C header, extracts its version macros,
//! optionally runs it through a real preprocessor, then extracts functions,
//! enums, structs, opaque handles, callback typedefs, and constants.

use std::collections::BTreeMap;

use camino::Utf8Path;
use once_cell::sync::Lazy;
use regex::Regex;

use abi_guard_types::{AbiVersion, HeaderFunction, HeaderPayload, LayoutProbePayload, ParserInfo, TypePolicy};

use crate::enums::parse_enum_blocks;
use crate::error::ParserError;
use crate::lexical::{sanitize_c_decl_text, strip_c_comments};
use crate::opaque::{extract_callback_typedefs, extract_opaque_struct_typedefs, extract_prefixed_define_constants};
use crate::preprocess::{preprocess_header_for_parsing, PreprocessConfig};
use crate::structs::parse_struct_blocks;
use abi_guard_runner::CommandRunner;

static DEFINE_LEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*#.*?$").unwrap());
static EXTERN_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*extern\s+").unwrap());

pub struct VersionMacros<'a> {
    pub major: &'a str,
    pub minor: &'a str,
    pub patch: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserBackend {
    Regex,
    ClangPreprocess,
}

pub struct HeaderParseConfig {
    pub backend: ParserBackend,
    pub fallback_to_regex: bool,
    pub preprocess: PreprocessConfig,
}

impl Default for HeaderParseConfig {
    fn default() -> Self {
        Self {
            backend: ParserBackend::Regex,
            fallback_to_regex: true,
            preprocess: PreprocessConfig::default(),
        }
    }
}

#[must_use]
pub fn extract_define_int(content: &str, macro_name: &str) -> Option<i64> {
    let pattern = format!(r"(?m)^\s*#\s*define\s+{}\s+([0-9]+)\b", regex::escape(macro_name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(content)?.get(1)?.as_str().parse().ok()
}

fn function_pattern(api_macro: &str, call_macro: &str, symbol_prefix: &str, clang_preprocessed: bool) -> Regex {
    if clang_preprocessed {
        let pattern = format!(
            r"(?s)(?P<ret>[^;\n][^;]*?)\s+(?P<name>{}[A-Za-z0-9_]*)\s*\((?P<params>.*?)\)\s*;",
            regex::escape(symbol_prefix)
        );
        Regex::new(&pattern).expect("generated function pattern is valid")
    } else {
        let pattern = format!(
            r"(?s){}\s+(?P<ret>.*?)\s+{}\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*\((?P<params>.*?)\)\s*;",
            regex::escape(api_macro),
            regex::escape(call_macro)
        );
        Regex::new(&pattern).expect("generated function pattern is valid")
    }
}

/// Parse a C header into a [`HeaderPayload`], the [`AbiVersion`] declared by
/// its version macros, and metadata describing which backend produced it.
#[allow(clippy::too_many_arguments)]
pub fn parse_c_header(
    header_path: &Utf8Path,
    raw: &str,
    api_macro: &str,
    call_macro: &str,
    symbol_prefix: &str,
    version_macros: &VersionMacros,
    type_policy: &TypePolicy,
    cfg: &HeaderParseConfig,
    runner: &dyn CommandRunner,
) -> Result<(HeaderPayload, AbiVersion, ParserInfo), ParserError> {
    let content_for_versions = strip_c_comments(raw);
    let major = extract_define_int(&content_for_versions, version_macros.major).ok_or_else(|| {
        ParserError::MissingVersionMacro {
            path: header_path.to_path_buf(),
            macro_name: version_macros.major.to_string(),
        }
    })?;
    let minor = extract_define_int(&content_for_versions, version_macros.minor).ok_or_else(|| {
        ParserError::MissingVersionMacro {
            path: header_path.to_path_buf(),
            macro_name: version_macros.minor.to_string(),
        }
    })?;
    let patch = extract_define_int(&content_for_versions, version_macros.patch).ok_or_else(|| {
        ParserError::MissingVersionMacro {
            path: header_path.to_path_buf(),
            macro_name: version_macros.patch.to_string(),
        }
    })?;

    let backend_requested = match cfg.backend {
        ParserBackend::Regex => "regex",
        ParserBackend::ClangPreprocess => "clang_preprocess",
    };

    let mut backend = backend_requested.to_string();
    let mut fallback_used = false;
    let mut details: BTreeMap<String, String> = BTreeMap::new();
    let mut declaration_source = raw.to_string();

    if cfg.backend == ParserBackend::ClangPreprocess {
        match preprocess_header_for_parsing(header_path, &cfg.preprocess, runner) {
            Ok(outcome) => {
                declaration_source = outcome.source;
                details.insert("compiler_resolved".to_string(), outcome.compiler_resolved);
                details.insert("command".to_string(), outcome.command);
                details.insert("elapsed_ms".to_string(), outcome.elapsed_ms.to_string());
            }
            Err(exc) => {
                if !cfg.fallback_to_regex {
                    return Err(exc);
                }
                backend = "regex".to_string();
                fallback_used = true;
                details.insert("fallback_reason".to_string(), exc.to_string());
                declaration_source = raw.to_string();
            }
        }
    }

    let content = strip_c_comments(&declaration_source);
    let declaration_content = DEFINE_LEADING.replace_all(&content, "").to_string();

    let clang_preprocessed = backend == "clang_preprocess";
    let pattern = function_pattern(api_macro, call_macro, symbol_prefix, clang_preprocessed);
    let parse_mode = if clang_preprocessed {
        "prefix_symbols_from_preprocessed_header"
    } else {
        "api_call_macro_match"
    };

    let mut functions: BTreeMap<String, HeaderFunction> = BTreeMap::new();
    for caps in pattern.captures_iter(&declaration_content) {
        let name = caps["name"].to_string();
        if !symbol_prefix.is_empty() && !name.starts_with(symbol_prefix) {
            continue;
        }
        let mut return_type = sanitize_c_decl_text(&caps["ret"]);
        return_type = EXTERN_PREFIX.replace(&return_type, "").to_string();
        let params = sanitize_c_decl_text(&caps["params"]);
        let signature = format!("{return_type} ({params})");
        functions.insert(
            name,
            HeaderFunction {
                return_type,
                parameters: params,
                signature,
            },
        );
    }

    if functions.is_empty() {
        return Err(ParserError::NoFunctionsFound {
            path: header_path.to_path_buf(),
            api_macro: api_macro.to_string(),
            call_macro: call_macro.to_string(),
        });
    }

    let enums = parse_enum_blocks(&declaration_content, type_policy);
    let structs = parse_struct_blocks(&declaration_content, type_policy);
    let raw_without_comments = strip_c_comments(raw);
    let opaque_entries = extract_opaque_struct_typedefs(&raw_without_comments, symbol_prefix);
    let callback_typedefs = extract_callback_typedefs(&raw_without_comments, symbol_prefix, call_macro);
    let constants = extract_prefixed_define_constants(&raw_without_comments, &symbol_prefix.to_uppercase());

    let symbols: Vec<String> = functions.keys().cloned().collect();
    let parser_info = ParserInfo {
        backend_requested: backend_requested.to_string(),
        backend,
        fallback_used,
        parse_mode: parse_mode.to_string(),
        details,
    };
    let payload = HeaderPayload {
        path: header_path.to_string(),
        function_count: functions.len(),
        symbols,
        functions,
        enum_count: enums.len(),
        enums,
        struct_count: structs.len(),
        structs,
        opaque_types: opaque_entries.iter().map(|e| e.name.clone()).collect(),
        opaque_type_declarations: opaque_entries.iter().map(|e| e.declaration.clone()).collect(),
        callback_typedefs,
        constants,
        parser: parser_info.clone(),
        layout_probe: LayoutProbePayload {
            enabled: false,
            available: false,
            reason: None,
            compiler: None,
            errors: Vec::new(),
            structs: BTreeMap::new(),
        },
    };

    Ok((payload, AbiVersion::new(major as u64, minor as u64, patch as u64), parser_info))
}
