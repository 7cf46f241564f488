//! Resolves one named target's raw config into the typed pieces
//! [`abi_guard_snapshot::build_snapshot`] needs, and builds its current
//! snapshot.

use camino::{Utf8Path, Utf8PathBuf};

use abi_guard_config::{ConfigRaw, TargetRaw};
use abi_guard_parser::header::VersionMacros;
use abi_guard_runner::CommandRunner;
use abi_guard_snapshot::{build_snapshot, BinaryProbe};
use abi_guard_types::Snapshot;

use crate::error::AppError;
use crate::paths;

/// CLI-level overrides that apply across every target in a multi-target
/// invocation (`--binary`, `--skip-binary`, `--baseline-root`).
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub binary_path: Option<Utf8PathBuf>,
    pub skip_binary: bool,
    pub baseline_root: Option<Utf8PathBuf>,
}

/// Looks up `target_name` in `config`, erroring with [`AppError::UnknownTarget`]
/// if absent.
pub fn lookup_target<'a>(config: &'a ConfigRaw, target_name: &str) -> Result<&'a TargetRaw, AppError> {
    config.targets.get(target_name).ok_or_else(|| AppError::UnknownTarget(target_name.to_string()))
}

/// Resolves the baseline snapshot path for `target_name`: `--baseline-root`
/// (if given) joined with the target's own `baseline_path` when set, else
/// the target's `baseline_path` resolved against `repo_root`, else
/// `abi/baselines/<target>.json`.
#[must_use]
pub fn resolve_baseline_path(repo_root: &Utf8Path, target_name: &str, target: &TargetRaw, overrides: &RunOverrides) -> Utf8PathBuf {
    if let Some(root) = &overrides.baseline_root {
        return crate::json_io::default_baseline_path(root, target_name);
    }
    if let Some(raw_path) = &target.baseline_path {
        return paths::resolve(repo_root, raw_path);
    }
    crate::json_io::default_baseline_path(&paths::default_baseline_root(repo_root), target_name)
}

/// Builds the current ABI snapshot for `target_name`, reading its header
/// from disk and resolving the binary-export probe from `overrides` and the
/// target's own `binary` config section.
pub fn build_current_snapshot(
    repo_root: &Utf8Path,
    target_name: &str,
    target: &TargetRaw,
    overrides: &RunOverrides,
    generated_at_utc: &str,
    runner: &dyn CommandRunner,
) -> Result<Snapshot, AppError> {
    let header_path = paths::resolve(repo_root, &target.header.path);
    let raw_header = std::fs::read_to_string(&header_path).map_err(|source| AppError::ReadFile {
        path: header_path.clone(),
        source,
    })?;

    let version_macros = VersionMacros {
        major: &target.header.version_macros.major,
        minor: &target.header.version_macros.minor,
        patch: &target.header.version_macros.patch,
    };
    let type_policy = abi_guard_config::build_type_policy(&target.header, &target.header.symbol_prefix);
    let header_parse_cfg = abi_guard_config::resolve_header_parser_config(&target.header);
    let layout_cfg = abi_guard_config::resolve_layout_probe_config(&target.header);
    let expected_symbols = abi_guard_config::bindings_expected_symbols(target.bindings.as_ref());
    let expected_symbols = if expected_symbols.is_empty() { None } else { Some(expected_symbols.as_slice()) };

    let binary_probe = resolve_binary_probe(repo_root, target, overrides);

    let snapshot = build_snapshot(
        target_name,
        &header_path,
        &target.header.path,
        &raw_header,
        &target.header.api_macro,
        &target.header.call_macro,
        &target.header.symbol_prefix,
        &version_macros,
        &type_policy,
        &header_parse_cfg,
        &layout_cfg,
        expected_symbols,
        binary_probe.as_probe(),
        generated_at_utc,
        runner,
    )?;
    Ok(snapshot)
}

/// Owns the resolved binary path (if any) so [`BinaryProbe`]'s borrow can
/// outlive the match that produced it.
enum ResolvedBinaryProbe {
    Skip,
    NotConfigured,
    Probe { path: Utf8PathBuf, allow_non_prefixed_exports: bool },
}

impl ResolvedBinaryProbe {
    fn as_probe(&self) -> BinaryProbe<'_> {
        match self {
            Self::Skip => BinaryProbe::Skip,
            Self::NotConfigured => BinaryProbe::NotConfigured,
            Self::Probe { path, allow_non_prefixed_exports } => BinaryProbe::Probe {
                path,
                allow_non_prefixed_exports: *allow_non_prefixed_exports,
            },
        }
    }
}

fn resolve_binary_probe(repo_root: &Utf8Path, target: &TargetRaw, overrides: &RunOverrides) -> ResolvedBinaryProbe {
    if overrides.skip_binary {
        return ResolvedBinaryProbe::Skip;
    }
    if let Some(path) = &overrides.binary_path {
        let allow_non_prefixed = target.binary.as_ref().is_some_and(|b| b.allow_non_prefixed_exports);
        return ResolvedBinaryProbe::Probe {
            path: path.clone(),
            allow_non_prefixed_exports: allow_non_prefixed,
        };
    }
    let Some(binary) = &target.binary else { return ResolvedBinaryProbe::NotConfigured };
    if binary.skip.unwrap_or(false) {
        return ResolvedBinaryProbe::Skip;
    }
    let Some(raw_path) = &binary.path else { return ResolvedBinaryProbe::NotConfigured };
    ResolvedBinaryProbe::Probe {
        path: paths::resolve(repo_root, raw_path),
        allow_non_prefixed_exports: binary.allow_non_prefixed_exports,
    }
}
