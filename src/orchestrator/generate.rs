//! `generate` / `codegen`: build the IDL payload for a target, render the
//! native header and export map from it, write them under `abi/generated`
//! (honoring `--check`/`--dry-run`), and optionally run external generators
//! (`codegen` only).

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use abi_guard_codegen::{
    render_native_export_map_from_idl, render_native_header_from_idl, run_code_generators_for_target, write_artifact_if_changed,
    ArtifactStatus, GeneratorRunResult,
};
use abi_guard_config::TargetRaw;
use abi_guard_idl::build_idl_payload;
use abi_guard_runner::CommandRunner;
use abi_guard_types::{Idl, Snapshot};

use crate::error::AppError;
use crate::json_io;
use crate::paths;

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub check: bool,
    pub dry_run: bool,
    pub fail_on_sync: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactOutcome {
    pub path: Utf8PathBuf,
    pub status: ArtifactStatus,
    pub diff: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateResult {
    pub idl_path: Utf8PathBuf,
    pub idl: Option<Idl>,
    pub artifacts: Vec<ArtifactOutcome>,
    pub out_of_sync: bool,
}

impl GenerateResult {
    #[must_use]
    pub fn has_drift(&self) -> bool {
        self.artifacts.iter().any(|a| a.status == ArtifactStatus::Drift)
    }
}

/// Builds the IDL payload for `snapshot`, writes `<target>.idl.json`, the
/// rendered native header, and the native export map under `generated_root`.
/// `expected_symbols` (a target's `bindings.expected_symbols`) drives
/// `out_of_sync`: when non-empty and it differs from the IDL's exported
/// symbol set, the run is out of sync with its declared bindings.
pub fn generate_target(
    repo_root: &Utf8Path,
    generated_root: &Utf8Path,
    target_name: &str,
    target: &TargetRaw,
    snapshot: &Snapshot,
    options: &GenerateOptions,
) -> Result<GenerateResult, AppError> {
    let idl_cfg = abi_guard_config::resolve_idl_build_config(target_name, target.codegen.as_ref(), target.bindings.as_ref())?;
    let idl_path = target
        .codegen
        .as_ref()
        .and_then(|c| c.idl_output_path.as_deref())
        .map(|raw| paths::resolve(repo_root, raw))
        .unwrap_or_else(|| json_io::default_idl_path(generated_root, target_name));

    if !idl_cfg.enabled {
        return Ok(GenerateResult { idl_path, ..GenerateResult::default() });
    }

    let idl = build_idl_payload(target_name, snapshot, &idl_cfg);

    let expected_symbols = abi_guard_config::bindings_expected_symbols(target.bindings.as_ref());
    let actual_symbols: std::collections::BTreeSet<&str> = idl.functions.iter().map(|f| f.name.as_str()).collect();
    let out_of_sync = !expected_symbols.is_empty()
        && expected_symbols.iter().any(|expected| !actual_symbols.contains(expected.as_str()));

    let mut artifacts = Vec::new();

    let idl_json = serde_json::to_string_pretty(&idl).map_err(|source| AppError::ParseJson { path: idl_path.clone(), source })?;
    let idl_write = write_artifact_if_changed(&idl_path, &format!("{idl_json}\n"), options.check, options.dry_run)?;
    artifacts.push(ArtifactOutcome { path: idl_path.clone(), status: idl_write.status, diff: idl_write.diff });

    let header_cfg = abi_guard_config::resolve_native_header_config(target.codegen.as_ref());
    let header_content = render_native_header_from_idl(target_name, &idl, &header_cfg);
    let header_path = target
        .codegen
        .as_ref()
        .and_then(|c| c.native_header_output_path.as_deref())
        .map(|raw| paths::resolve(repo_root, raw))
        .unwrap_or_else(|| paths::resolve(repo_root, &format!("{target_name}.generated.h")));
    let header_write = write_artifact_if_changed(&header_path, &header_content, options.check, options.dry_run)?;
    artifacts.push(ArtifactOutcome { path: header_path, status: header_write.status, diff: header_write.diff });

    let export_map_content = render_native_export_map_from_idl(&idl);
    let export_map_path = target
        .codegen
        .as_ref()
        .and_then(|c| c.native_export_map_output_path.as_deref())
        .map(|raw| paths::resolve(repo_root, raw))
        .unwrap_or_else(|| paths::resolve(repo_root, &format!("{target_name}.ver")));
    let export_map_write = write_artifact_if_changed(&export_map_path, &export_map_content, options.check, options.dry_run)?;
    artifacts.push(ArtifactOutcome { path: export_map_path, status: export_map_write.status, diff: export_map_write.diff });

    if options.fail_on_sync && out_of_sync {
        return Err(AppError::DriftFailure(format!("target '{target_name}' bindings are out of sync with generated IDL")));
    }

    Ok(GenerateResult { idl_path, idl: Some(idl), artifacts, out_of_sync })
}

/// Runs `generate_target` then, if the target's `codegen.generators` list is
/// non-empty, runs each external generator against the written IDL path.
/// Used by the `codegen` command (a superset of `generate`).
pub fn codegen_target(
    repo_root: &Utf8Path,
    generated_root: &Utf8Path,
    target_name: &str,
    target: &TargetRaw,
    snapshot: &Snapshot,
    options: &GenerateOptions,
    generator_timeout: Duration,
    runner: &dyn CommandRunner,
) -> Result<(GenerateResult, Vec<GeneratorRunResult>), AppError> {
    let result = generate_target(repo_root, generated_root, target_name, target, snapshot, options)?;

    let raw_generators = target.bindings.as_ref().map(|b| b.generators.clone()).unwrap_or_default();
    if raw_generators.is_empty() {
        return Ok((result, Vec::new()));
    }
    let entries = abi_guard_config::resolve_generator_entries(&raw_generators);
    let normalized = abi_guard_codegen::normalize_generator_entries(target_name, &entries)?;
    let runs = run_code_generators_for_target(repo_root, target_name, &normalized, &result.idl_path, generator_timeout, runner)?;
    Ok((result, runs))
}
