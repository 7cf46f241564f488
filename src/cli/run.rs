//! Top-level dispatch: parses [`crate::cli::args::Cli`], wires each
//! subcommand to its `orchestrator` entry point, and maps the result to a
//! process exit code.

use camino::Utf8PathBuf;
use clap::Parser;

use abi_guard_config::ConfigRaw;
use abi_guard_runner::{CommandRunner, SystemCommandRunner};
use abi_guard_types::Snapshot;
use abi_guard_utils::logging::{init_tracing, LogFormat};

use crate::cli::args::{
    BinaryOverrideArgs, Cli, Command, DiffArgs, DoctorArgs, GenerateArgs, InitTargetArgs as CliInitTargetArgs, SnapshotArgs,
    SyncArgs, VerifyAllArgs, VerifyArgs, WaiverAuditArgs,
};
use crate::error::AppError;
use crate::exit_codes::{self, codes};
use crate::json_io;
use crate::orchestrator::target::RunOverrides;
use crate::orchestrator::{changelog, diff, doctor, generate, report, sync, target, targets, verify, waiver_audit};
use crate::paths;

/// Runs the CLI end-to-end and returns the process exit code. Never panics
/// on user-facing failure: every [`AppError`] is formatted as a single
/// `abi_guard: error: ...` line on stderr before mapping to an exit code.
#[must_use]
pub fn run() -> i32 {
    let cli = Cli::parse();

    let log_format = cli.log_format.parse::<LogFormat>().unwrap_or_default();
    let _ = init_tracing(cli.verbose, log_format);

    match dispatch(&cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("abi_guard: error: {err}");
            exit_codes::fatal_error_exit_code(&err)
        }
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn overrides_from(binary: &BinaryOverrideArgs, baseline_root: Option<&Utf8PathBuf>) -> RunOverrides {
    RunOverrides {
        binary_path: binary.binary.clone(),
        skip_binary: binary.skip_binary,
        baseline_root: baseline_root.cloned(),
    }
}

fn load_config(path: &Utf8PathBuf) -> Result<ConfigRaw, AppError> {
    Ok(abi_guard_config::load_config(path)?)
}

fn exit_for_status(status: abi_guard_types::ReportStatus) -> i32 {
    match status {
        abi_guard_types::ReportStatus::Pass => codes::SUCCESS,
        abi_guard_types::ReportStatus::Fail => codes::REPORT_FAILURE,
    }
}

fn write_optional_json<T: serde::Serialize>(path: Option<&Utf8PathBuf>, value: &T) -> Result<(), AppError> {
    if let Some(path) = path {
        json_io::write_json(path, value)?;
    }
    Ok(())
}

fn write_optional_text(path: Option<&Utf8PathBuf>, text: &str) -> Result<(), AppError> {
    if let Some(path) = path {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AppError::WriteFile { path: path.clone(), source })?;
        }
        abi_guard_utils::atomic_write::write_file_atomic(path, text).map_err(|source| AppError::WriteFile {
            path: path.clone(),
            source: std::io::Error::other(source.to_string()),
        })?;
    }
    Ok(())
}

fn dispatch(command: &Command) -> Result<i32, AppError> {
    let runner = SystemCommandRunner::new();

    match command {
        Command::Snapshot(args) => run_snapshot(args, &runner),
        Command::Verify(args) => run_verify(args, &runner),
        Command::VerifyAll(args) => run_verify_all(args, &runner),
        Command::RegenBaselines(args) => run_regen_baselines(args, &runner),
        Command::Doctor(args) => run_doctor(args),
        Command::WaiverAudit(args) => run_waiver_audit(args),
        Command::Changelog(args) => run_changelog(args, &runner),
        Command::Generate(args) => run_generate(args, &runner, false),
        Command::Codegen(args) => run_generate(args, &runner, true),
        Command::Sync(args) => run_sync(args, &runner),
        Command::Diff(args) => run_diff(args),
        Command::ListTargets(args) => run_list_targets(args),
        Command::InitTarget(args) => run_init_target(args, &runner),
        Command::Benchmark(_) => Err(AppError::Unsupported("benchmark")),
        Command::BenchmarkGate(_) => Err(AppError::Unsupported("benchmark-gate")),
        Command::ValidatePluginManifest(_) => Err(AppError::Unsupported("validate-plugin-manifest")),
        Command::ReleasePrepare(_) => Err(AppError::Unsupported("release-prepare")),
    }
}

fn run_snapshot(args: &SnapshotArgs, runner: &dyn CommandRunner) -> Result<i32, AppError> {
    let config = load_config(&args.repo.config)?;
    let target_cfg = target::lookup_target(&config, &args.target)?;
    let overrides = overrides_from(&args.binary, None);
    let generated_at_utc = now_rfc3339();
    let snapshot: Snapshot =
        target::build_current_snapshot(&args.repo.repo_root, &args.target, target_cfg, &overrides, &generated_at_utc, runner)?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| json_io::default_baseline_path(&paths::default_baseline_root(&args.repo.repo_root), &args.target));
    json_io::write_json(&output_path, &snapshot)?;
    println!("wrote snapshot for '{}' to {output_path}", args.target);
    Ok(codes::SUCCESS)
}

fn run_verify(args: &VerifyArgs, runner: &dyn CommandRunner) -> Result<i32, AppError> {
    let config = load_config(&args.repo.config)?;
    let overrides = overrides_from(&args.binary, None);
    let generated_at_utc = now_rfc3339();

    let (current, mut rep) = if let Some(baseline_path) = &args.baseline {
        let target_cfg = target::lookup_target(&config, &args.target)?;
        let baseline: Snapshot = json_io::read_json(baseline_path)?;
        let current =
            target::build_current_snapshot(&args.repo.repo_root, &args.target, target_cfg, &overrides, &generated_at_utc, runner)?;
        let mut rep = abi_guard_differ::compare_snapshots(&baseline, &current);
        let policy = abi_guard_config::resolve_effective_policy(&args.target, config.policy.as_ref(), target_cfg.policy.as_ref())?;
        abi_guard_policy::apply_policy_to_report(&mut rep, &policy, &args.target)?;
        (current, rep)
    } else {
        verify::verify_target(&args.repo.repo_root, &config, &args.target, &overrides, &generated_at_utc, runner)?
    };

    if args.fail_on_warnings && !rep.warnings.is_empty() {
        rep.status = abi_guard_types::ReportStatus::Fail;
    }

    if let Some(current_output) = &args.current_output {
        json_io::write_json(current_output, &current)?;
    }
    write_optional_json(args.report.as_ref(), &rep)?;
    write_optional_text(args.markdown_report.as_ref(), &report::render_markdown_report(&args.target, &rep))?;
    if let Some(sarif_path) = &args.sarif_report {
        let mut results = std::collections::BTreeMap::new();
        results.insert(args.target.clone(), rep.clone());
        json_io::write_json(sarif_path, &report::render_sarif(&results))?;
    }

    print!("{}", report::render_console_summary(&args.target, &rep));
    Ok(exit_for_status(rep.status))
}

fn run_verify_all(args: &VerifyAllArgs, runner: &dyn CommandRunner) -> Result<i32, AppError> {
    let config = load_config(&args.repo.config)?;
    let overrides = overrides_from(&args.binary, args.baseline_root.as_ref());
    let generated_at_utc = now_rfc3339();
    let mut aggregate = verify::verify_all(&args.repo.repo_root, &config, &overrides, &generated_at_utc, runner)?;

    if args.fail_on_warnings {
        for rep in aggregate.results.values_mut() {
            if !rep.warnings.is_empty() {
                rep.status = abi_guard_types::ReportStatus::Fail;
            }
        }
        aggregate = report::AggregateReport::new(generated_at_utc.clone(), aggregate.results);
    }

    if let Some(dir) = &args.output_dir {
        for (name, rep) in &aggregate.results {
            json_io::write_json(&dir.join(format!("{name}.json")), rep)?;
        }
    }
    if let Some(sarif_path) = &args.sarif_report {
        json_io::write_json(sarif_path, &report::render_sarif(&aggregate.results))?;
    }

    print!("{}", report::render_console_summary_all(&aggregate));
    Ok(if aggregate.has_failures() { codes::REPORT_FAILURE } else { codes::SUCCESS })
}

fn run_regen_baselines(args: &crate::cli::args::RegenBaselinesArgs, runner: &dyn CommandRunner) -> Result<i32, AppError> {
    let config = load_config(&args.repo.config)?;
    let overrides = overrides_from(&args.binary, args.baseline_root.as_ref());
    let generated_at_utc = now_rfc3339();
    let updated = targets::regen_baselines(&args.repo.repo_root, &config, &overrides, &generated_at_utc, runner)?;
    println!("regenerated {} baseline(s): {}", updated.len(), updated.join(", "));

    if args.verify {
        let mut aggregate = verify::verify_all(&args.repo.repo_root, &config, &overrides, &generated_at_utc, runner)?;
        if args.fail_on_warnings {
            for rep in aggregate.results.values_mut() {
                if !rep.warnings.is_empty() {
                    rep.status = abi_guard_types::ReportStatus::Fail;
                }
            }
            aggregate = report::AggregateReport::new(generated_at_utc.clone(), aggregate.results);
        }
        if let Some(sarif_path) = &args.sarif_report {
            json_io::write_json(sarif_path, &report::render_sarif(&aggregate.results))?;
        }
        print!("{}", report::render_console_summary_all(&aggregate));
        return Ok(if aggregate.has_failures() { codes::REPORT_FAILURE } else { codes::SUCCESS });
    }
    Ok(codes::SUCCESS)
}

fn run_doctor(args: &DoctorArgs) -> Result<i32, AppError> {
    let scratch_dir = tempfile::tempdir().map_err(|source| AppError::WriteFile { path: Utf8PathBuf::from("<tmp>"), source })?;
    let scratch_path = Utf8PathBuf::from_path_buf(scratch_dir.path().to_path_buf()).unwrap_or_else(|_| Utf8PathBuf::from("."));
    let baseline_root = args
        .baseline_root
        .clone()
        .unwrap_or_else(|| paths::default_baseline_root(&args.repo.repo_root));

    let options = doctor::DoctorOptions {
        require_baselines: args.require_baselines,
        require_binaries: args.require_binaries,
        fail_on_warnings: args.fail_on_warnings,
    };
    let rep = doctor::run(&args.repo.repo_root, &args.repo.config, &scratch_path, &baseline_root, chrono::Utc::now(), &options);

    for check in &rep.checks {
        println!("[{:?}] {}: {}", check.status, check.name, check.details);
    }
    Ok(if rep.ok { codes::SUCCESS } else { codes::REPORT_FAILURE })
}

fn run_waiver_audit(args: &WaiverAuditArgs) -> Result<i32, AppError> {
    let config = load_config(&args.config)?;
    let target_policy = args.target.as_ref().and_then(|t| config.targets.get(t)).and_then(|t| t.policy.as_ref());
    let target_name = args.target.as_deref().unwrap_or("<all>");
    let policy = abi_guard_config::resolve_effective_policy(target_name, config.policy.as_ref(), target_policy)?;

    let rep = waiver_audit::audit_waivers(&policy.waivers, &policy.waiver_requirements, chrono::Utc::now());

    if args.print_json {
        println!("{}", serde_json::to_string_pretty(&rep).unwrap_or_default());
    } else {
        for finding in &rep.findings {
            println!("[{}] {}: {}", finding.severity, finding.waiver_id, finding.message);
        }
    }
    write_optional_json(args.output.as_ref(), &rep)?;

    let failed = (args.fail_on_expired && rep.has_expired())
        || (args.fail_on_missing_metadata && rep.has_missing_metadata())
        || (args.fail_on_expiring_soon && rep.has_expiring_soon());
    Ok(if failed { codes::REPORT_FAILURE } else { codes::SUCCESS })
}

fn run_changelog(args: &crate::cli::args::ChangelogArgs, runner: &dyn CommandRunner) -> Result<i32, AppError> {
    let config = load_config(&args.repo.config)?;
    let overrides = overrides_from(&args.binary, args.baseline_root.as_ref());
    let generated_at_utc = now_rfc3339();
    let result = changelog::render_changelog(
        &args.repo.repo_root,
        &config,
        &overrides,
        &args.title,
        args.release_tag.as_deref(),
        &generated_at_utc,
        runner,
    )?;

    write_optional_text(args.output.as_ref(), &result.document)?;
    if args.output.is_none() {
        print!("{}", result.document);
    }

    Ok(if result.has_failures && args.fail_on_failing { codes::REPORT_FAILURE } else { codes::SUCCESS })
}

fn run_generate(args: &GenerateArgs, runner: &dyn CommandRunner, is_codegen: bool) -> Result<i32, AppError> {
    let config = load_config(&args.repo.config)?;
    let target_cfg = target::lookup_target(&config, &args.target)?;
    let overrides = overrides_from(&args.binary, None);
    let generated_at_utc = now_rfc3339();
    let snapshot = target::build_current_snapshot(&args.repo.repo_root, &args.target, target_cfg, &overrides, &generated_at_utc, runner)?;

    let generated_root = paths::default_generated_root(&args.repo.repo_root);
    let options = generate::GenerateOptions { check: args.check, dry_run: args.dry_run, fail_on_sync: args.fail_on_sync };

    let result = if is_codegen {
        let (result, runs) = generate::codegen_target(
            &args.repo.repo_root,
            &generated_root,
            &args.target,
            target_cfg,
            &snapshot,
            &options,
            std::time::Duration::from_secs(120),
            runner,
        )?;
        for run in &runs {
            println!("generator '{}': {}", run.name, run.status);
        }
        result
    } else {
        generate::generate_target(&args.repo.repo_root, &generated_root, &args.target, target_cfg, &snapshot, &options)?
    };

    for artifact in &result.artifacts {
        println!("{:?} {}", artifact.status, artifact.path);
        if args.print_diff && !artifact.diff.is_empty() {
            println!("{}", artifact.diff);
        }
    }
    write_optional_json(args.report_json.as_ref(), &result)?;

    Ok(if result.out_of_sync || result.has_drift() { codes::REPORT_FAILURE } else { codes::SUCCESS })
}

fn run_sync(args: &SyncArgs, runner: &dyn CommandRunner) -> Result<i32, AppError> {
    let config = load_config(&args.repo.config)?;
    let overrides = overrides_from(&args.binary, args.baseline_root.as_ref());
    let generated_at_utc = now_rfc3339();
    let generated_root = args.output_dir.clone().unwrap_or_else(|| paths::default_generated_root(&args.repo.repo_root));

    let options = sync::SyncOptions {
        generate: generate::GenerateOptions { check: args.check, dry_run: false, fail_on_sync: args.fail_on_sync },
        update_baselines: args.update_baselines,
        run_verify: !args.no_verify,
    };

    let result = sync::sync_target(
        &args.repo.repo_root,
        &generated_root,
        &config,
        &args.target,
        &overrides,
        &options,
        &generated_at_utc,
        runner,
    )?;

    for artifact in &result.generate.artifacts {
        println!("{:?} {}", artifact.status, artifact.path);
        if args.print_diff && !artifact.diff.is_empty() {
            println!("{}", artifact.diff);
        }
    }
    write_optional_json(args.report_json.as_ref(), &result.report)?;

    if let Some(mut rep) = result.report {
        if args.fail_on_warnings && !rep.warnings.is_empty() {
            rep.status = abi_guard_types::ReportStatus::Fail;
        }
        print!("{}", report::render_console_summary(&args.target, &rep));
        return Ok(exit_for_status(rep.status));
    }
    Ok(if result.generate.out_of_sync { codes::REPORT_FAILURE } else { codes::SUCCESS })
}

fn run_diff(args: &DiffArgs) -> Result<i32, AppError> {
    let rep = diff::diff_snapshots(&args.baseline, &args.current, args.fail_on_warnings)?;

    write_optional_json(args.report.as_ref(), &rep)?;
    write_optional_text(args.markdown_report.as_ref(), &report::render_markdown_report("diff", &rep))?;
    if let Some(sarif_path) = &args.sarif_report {
        let mut results = std::collections::BTreeMap::new();
        results.insert("diff".to_string(), rep.clone());
        json_io::write_json(sarif_path, &report::render_sarif(&results))?;
    }

    print!("{}", report::render_console_summary("diff", &rep));
    Ok(exit_for_status(rep.status))
}

fn run_list_targets(args: &crate::cli::args::ListTargetsArgs) -> Result<i32, AppError> {
    let config = load_config(&args.config)?;
    for name in targets::list_targets(&config) {
        println!("{name}");
    }
    Ok(codes::SUCCESS)
}

fn run_init_target(args: &CliInitTargetArgs, runner: &dyn CommandRunner) -> Result<i32, AppError> {
    let mut config = load_config(&args.repo.config)?;
    let init_args = targets::InitTargetArgs {
        target_name: args.target.clone(),
        header_path: args.header_path.clone(),
        api_macro: args.api_macro.clone(),
        call_macro: args.call_macro.clone(),
        symbol_prefix: args.symbol_prefix.clone(),
        version_major_macro: args.version_major_macro.clone(),
        version_minor_macro: args.version_minor_macro.clone(),
        version_patch_macro: args.version_patch_macro.clone(),
        binding_symbols: args.binding_symbol.clone(),
        binary_path: args.binary_path.clone(),
        baseline_path: args.baseline_path.clone(),
        force: args.force,
    };
    let generated_at_utc = now_rfc3339();
    targets::init_target(
        &args.repo.repo_root,
        &args.repo.config,
        &mut config,
        &init_args,
        !args.no_create_baseline,
        &generated_at_utc,
        runner,
    )?;
    println!("initialized target '{}'", args.target);
    Ok(codes::SUCCESS)
}
