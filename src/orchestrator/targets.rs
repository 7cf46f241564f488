//! `list-targets`, `init-target`, `regen-baselines`: target-set
//! bookkeeping that doesn't fit the single-target verify/generate flow.

use camino::Utf8Path;

use abi_guard_config::{BindingsRaw, ConfigRaw, HeaderRaw, TargetRaw, VersionMacrosRaw};
use abi_guard_runner::CommandRunner;

use crate::error::AppError;
use crate::json_io;
use crate::orchestrator::target::{self, RunOverrides};

/// `list-targets`: the configured target names, already sorted since
/// `ConfigRaw::targets` is a `BTreeMap`.
#[must_use]
pub fn list_targets(config: &ConfigRaw) -> Vec<String> {
    config.targets.keys().cloned().collect()
}

/// Arguments accepted by `init-target`, one-to-one with its CLI flags.
pub struct InitTargetArgs {
    pub target_name: String,
    pub header_path: String,
    pub api_macro: String,
    pub call_macro: String,
    pub symbol_prefix: String,
    pub version_major_macro: String,
    pub version_minor_macro: String,
    pub version_patch_macro: String,
    pub binding_symbols: Vec<String>,
    pub binary_path: Option<String>,
    pub baseline_path: Option<String>,
    pub force: bool,
}

impl Default for InitTargetArgs {
    fn default() -> Self {
        Self {
            target_name: String::new(),
            header_path: String::new(),
            api_macro: "LUMENRTC_API".to_string(),
            call_macro: "LUMENRTC_CALL".to_string(),
            symbol_prefix: "lrtc_".to_string(),
            version_major_macro: String::new(),
            version_minor_macro: String::new(),
            version_patch_macro: String::new(),
            binding_symbols: Vec::new(),
            binary_path: None,
            baseline_path: None,
            force: false,
        }
    }
}

/// Bootstraps a new target entry in `config` and writes the config back to
/// `config_path`. Refuses to overwrite an existing target unless `force`.
/// When `create_baseline` is set, also builds and writes the target's
/// initial baseline snapshot.
#[allow(clippy::too_many_arguments)]
pub fn init_target(
    repo_root: &Utf8Path,
    config_path: &Utf8Path,
    config: &mut ConfigRaw,
    args: &InitTargetArgs,
    create_baseline: bool,
    generated_at_utc: &str,
    runner: &dyn CommandRunner,
) -> Result<(), AppError> {
    if config.targets.contains_key(&args.target_name) && !args.force {
        return Err(AppError::PolicyFailure(format!(
            "target '{}' already exists; pass --force to overwrite",
            args.target_name
        )));
    }

    let target_raw = TargetRaw {
        baseline_path: args.baseline_path.clone(),
        header: HeaderRaw {
            path: args.header_path.clone(),
            api_macro: args.api_macro.clone(),
            call_macro: args.call_macro.clone(),
            symbol_prefix: args.symbol_prefix.clone(),
            version_macros: VersionMacrosRaw {
                major: args.version_major_macro.clone(),
                minor: args.version_minor_macro.clone(),
                patch: args.version_patch_macro.clone(),
            },
            parser: None,
            types: None,
            layout: None,
        },
        bindings: if args.binding_symbols.is_empty() {
            None
        } else {
            Some(BindingsRaw { expected_symbols: args.binding_symbols.clone(), ..BindingsRaw::default() })
        },
        policy: None,
        codegen: None,
        binary: args.binary_path.as_ref().map(|path| abi_guard_config::BinaryRaw {
            path: Some(path.clone()),
            skip: None,
            allow_non_prefixed_exports: false,
        }),
    };

    config.targets.insert(args.target_name.clone(), target_raw.clone());
    abi_guard_config::save_config(config_path, config)?;

    if create_baseline {
        let overrides = RunOverrides::default();
        let snapshot =
            target::build_current_snapshot(repo_root, &args.target_name, &target_raw, &overrides, generated_at_utc, runner)?;
        let baseline_path = target::resolve_baseline_path(repo_root, &args.target_name, &target_raw, &overrides);
        json_io::write_json(&baseline_path, &snapshot)?;
    }

    Ok(())
}

/// `regen-baselines`: rebuilds and overwrites every target's baseline
/// snapshot from its current header/binary. A single target's failure
/// aborts the batch, matching [`crate::orchestrator::verify::verify_all`]'s
/// fail-fast behaviour.
pub fn regen_baselines(
    repo_root: &Utf8Path,
    config: &ConfigRaw,
    overrides: &RunOverrides,
    generated_at_utc: &str,
    runner: &dyn CommandRunner,
) -> Result<Vec<String>, AppError> {
    let mut updated = Vec::new();
    for (target_name, target_cfg) in &config.targets {
        let snapshot = target::build_current_snapshot(repo_root, target_name, target_cfg, overrides, generated_at_utc, runner)?;
        let baseline_path = target::resolve_baseline_path(repo_root, target_name, target_cfg, overrides);
        json_io::write_json(&baseline_path, &snapshot)?;
        updated.push(target_name.clone());
    }
    Ok(updated)
}
