//! Snapshot builder (C2): parses a target's header, probes its compiled
//! binary for exported symbols, and (optionally) probes real struct layouts,
//! assembling the result into a versioned [`Snapshot`].

pub mod error;
pub mod exports;
pub mod layout;

pub use error::SnapshotError;
pub use exports::{candidate_export_tool_names, extract_binary_exports};
pub use layout::{probe_struct_layouts, LayoutProbeConfig};

use camino::Utf8Path;

use abi_guard_parser::header::{parse_c_header, HeaderParseConfig, VersionMacros};
use abi_guard_runner::CommandRunner;
use abi_guard_types::{BindingsPayload, BinaryPayload, Snapshot, SnapshotPolicy, ToolIdentity, TypePolicy};

/// Binary-export behavior requested for this snapshot build.
pub enum BinaryProbe<'a> {
    /// Skip binary inspection entirely (e.g. `--skip-binary`).
    Skip,
    /// Not configured for this target; the resulting payload records that.
    NotConfigured,
    /// Probe `path`, treating non-prefixed exports as configured.
    Probe { path: &'a Utf8Path, allow_non_prefixed_exports: bool },
}

#[allow(clippy::too_many_arguments)]
pub fn build_snapshot(
    target_name: &str,
    header_path: &Utf8Path,
    header_repo_relative_path: &str,
    raw_header: &str,
    api_macro: &str,
    call_macro: &str,
    symbol_prefix: &str,
    version_macros: &VersionMacros,
    type_policy: &TypePolicy,
    header_parse_cfg: &HeaderParseConfig,
    layout_cfg: &layout::LayoutProbeConfig,
    bindings_expected_symbols: Option<&[String]>,
    binary_probe: BinaryProbe<'_>,
    generated_at_utc: &str,
    runner: &dyn CommandRunner,
) -> Result<Snapshot, SnapshotError> {
    let (mut header_payload, abi_version, _parser_info) = parse_c_header(
        header_path,
        raw_header,
        api_macro,
        call_macro,
        symbol_prefix,
        version_macros,
        type_policy,
        header_parse_cfg,
        runner,
    )?;
    header_payload.path = header_repo_relative_path.to_string();
    header_payload.layout_probe = probe_struct_layouts(header_path, &header_payload.structs, layout_cfg, runner);

    let bindings_payload = match bindings_expected_symbols {
        Some(symbols) => {
            let mut cleaned: Vec<String> = symbols.iter().filter(|s| !s.is_empty()).cloned().collect();
            cleaned.sort();
            cleaned.dedup();
            BindingsPayload {
                available: true,
                source: "config.bindings.expected_symbols".to_string(),
                symbol_count: cleaned.len(),
                symbols: cleaned,
            }
        }
        None => BindingsPayload::not_configured(),
    };

    let binary_payload = match binary_probe {
        BinaryProbe::Skip => BinaryPayload::explicit_skip(),
        BinaryProbe::NotConfigured => BinaryPayload::not_configured(),
        BinaryProbe::Probe {
            path,
            allow_non_prefixed_exports,
        } => {
            let mut payload = extract_binary_exports(path, symbol_prefix, allow_non_prefixed_exports, runner)?;
            payload.skipped = false;
            payload
        }
    };

    Ok(Snapshot {
        tool: ToolIdentity::default(),
        target: target_name.to_string(),
        generated_at_utc: generated_at_utc.to_string(),
        policy: SnapshotPolicy {
            type_policy: type_policy.clone(),
            strict_semver: true,
        },
        abi_version,
        header: header_payload,
        bindings: bindings_payload,
        binary: binary_payload,
    })
}
