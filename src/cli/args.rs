use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "abi-guard", version, about = "ABI governance framework for native C shared libraries")]
pub struct Cli {
    /// Log output format.
    #[arg(long, global = true, default_value = "text")]
    pub log_format: String,

    /// Enable debug-level logging.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build and write a target's current ABI snapshot.
    Snapshot(SnapshotArgs),
    /// Diff a target's current snapshot against its stored baseline.
    Verify(VerifyArgs),
    /// Run `verify` across every configured target.
    VerifyAll(VerifyAllArgs),
    /// Rebuild every target's baseline snapshot from its current header/binary.
    RegenBaselines(RegenBaselinesArgs),
    /// Run environment health checks.
    Doctor(DoctorArgs),
    /// Audit the configured waiver set for expiry and missing metadata.
    WaiverAudit(WaiverAuditArgs),
    /// Render a Markdown changelog across every configured target.
    Changelog(ChangelogArgs),
    /// Render IDL/native header/export map artifacts for a target.
    Generate(GenerateArgs),
    /// `generate`, then run any configured external code generators.
    Codegen(GenerateArgs),
    /// Regenerate artifacts, optionally update the baseline, then verify.
    Sync(SyncArgs),
    /// Diff two already-built snapshot files directly.
    Diff(DiffArgs),
    /// List configured target names.
    ListTargets(ListTargetsArgs),
    /// Bootstrap a new target entry in the config file.
    InitTarget(InitTargetArgs),
    /// Measure snapshot/verify wall-clock cost across targets.
    Benchmark(BenchmarkArgs),
    /// Gate a benchmark report against a budget.
    BenchmarkGate(BenchmarkGateArgs),
    /// Validate an external codegen plugin manifest.
    ValidatePluginManifest(ValidatePluginManifestArgs),
    /// Full release pipeline: doctor, sync, codegen, verify-all, changelog.
    ReleasePrepare(ReleasePrepareArgs),
}

#[derive(Args, Clone, Debug)]
pub struct RepoConfigArgs {
    #[arg(long, default_value = ".")]
    pub repo_root: Utf8PathBuf,

    #[arg(long, default_value = "abi-guard.toml")]
    pub config: Utf8PathBuf,
}

#[derive(Args, Clone, Debug, Default)]
pub struct BinaryOverrideArgs {
    #[arg(long)]
    pub binary: Option<Utf8PathBuf>,

    #[arg(long)]
    pub skip_binary: bool,
}

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub repo: RepoConfigArgs,

    #[arg(long)]
    pub target: String,

    #[command(flatten)]
    pub binary: BinaryOverrideArgs,

    #[arg(long)]
    pub output: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub repo: RepoConfigArgs,

    #[arg(long)]
    pub target: String,

    #[arg(long)]
    pub baseline: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub binary: BinaryOverrideArgs,

    #[arg(long)]
    pub current_output: Option<Utf8PathBuf>,

    #[arg(long)]
    pub report: Option<Utf8PathBuf>,

    #[arg(long)]
    pub markdown_report: Option<Utf8PathBuf>,

    #[arg(long)]
    pub sarif_report: Option<Utf8PathBuf>,

    #[arg(long)]
    pub fail_on_warnings: bool,
}

#[derive(Args, Debug)]
pub struct VerifyAllArgs {
    #[command(flatten)]
    pub repo: RepoConfigArgs,

    #[arg(long)]
    pub baseline_root: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub binary: BinaryOverrideArgs,

    #[arg(long)]
    pub output_dir: Option<Utf8PathBuf>,

    #[arg(long)]
    pub sarif_report: Option<Utf8PathBuf>,

    #[arg(long)]
    pub fail_on_warnings: bool,
}

#[derive(Args, Debug)]
pub struct RegenBaselinesArgs {
    #[command(flatten)]
    pub repo: RepoConfigArgs,

    #[arg(long)]
    pub baseline_root: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub binary: BinaryOverrideArgs,

    #[arg(long)]
    pub verify: bool,

    #[arg(long)]
    pub output_dir: Option<Utf8PathBuf>,

    #[arg(long)]
    pub sarif_report: Option<Utf8PathBuf>,

    #[arg(long)]
    pub fail_on_warnings: bool,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    #[command(flatten)]
    pub repo: RepoConfigArgs,

    #[arg(long)]
    pub baseline_root: Option<Utf8PathBuf>,

    #[arg(long)]
    pub require_baselines: bool,

    #[arg(long)]
    pub require_binaries: bool,

    #[arg(long)]
    pub fail_on_warnings: bool,
}

#[derive(Args, Debug)]
pub struct WaiverAuditArgs {
    #[arg(long)]
    pub config: Utf8PathBuf,

    #[arg(long)]
    pub target: Option<String>,

    #[arg(long)]
    pub output: Option<Utf8PathBuf>,

    #[arg(long)]
    pub print_json: bool,

    #[arg(long)]
    pub fail_on_expired: bool,

    #[arg(long)]
    pub fail_on_missing_metadata: bool,

    #[arg(long)]
    pub fail_on_expiring_soon: bool,
}

#[derive(Args, Debug)]
pub struct ChangelogArgs {
    #[command(flatten)]
    pub repo: RepoConfigArgs,

    #[arg(long)]
    pub baseline: Option<Utf8PathBuf>,

    #[arg(long)]
    pub baseline_root: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub binary: BinaryOverrideArgs,

    #[arg(long, default_value = "ABI Changelog")]
    pub title: String,

    #[arg(long)]
    pub release_tag: Option<String>,

    #[arg(long)]
    pub output: Option<Utf8PathBuf>,

    #[arg(long)]
    pub report_json: Option<Utf8PathBuf>,

    #[arg(long)]
    pub sarif_report: Option<Utf8PathBuf>,

    #[arg(long)]
    pub fail_on_failing: bool,

    #[arg(long)]
    pub fail_on_warnings: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub repo: RepoConfigArgs,

    #[arg(long)]
    pub target: String,

    #[command(flatten)]
    pub binary: BinaryOverrideArgs,

    #[arg(long)]
    pub idl_output: Option<Utf8PathBuf>,

    #[arg(long)]
    pub dry_run: bool,

    #[arg(long)]
    pub check: bool,

    #[arg(long)]
    pub print_diff: bool,

    #[arg(long)]
    pub report_json: Option<Utf8PathBuf>,

    #[arg(long)]
    pub fail_on_sync: bool,
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub repo: RepoConfigArgs,

    #[arg(long)]
    pub target: String,

    #[arg(long)]
    pub baseline_root: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub binary: BinaryOverrideArgs,

    #[arg(long)]
    pub update_baselines: bool,

    #[arg(long)]
    pub check: bool,

    #[arg(long)]
    pub print_diff: bool,

    #[arg(long)]
    pub no_verify: bool,

    #[arg(long)]
    pub fail_on_warnings: bool,

    #[arg(long)]
    pub fail_on_sync: bool,

    #[arg(long)]
    pub output_dir: Option<Utf8PathBuf>,

    #[arg(long)]
    pub report_json: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    #[arg(long)]
    pub baseline: Utf8PathBuf,

    #[arg(long)]
    pub current: Utf8PathBuf,

    #[arg(long)]
    pub report: Option<Utf8PathBuf>,

    #[arg(long)]
    pub markdown_report: Option<Utf8PathBuf>,

    #[arg(long)]
    pub sarif_report: Option<Utf8PathBuf>,

    #[arg(long)]
    pub fail_on_warnings: bool,
}

#[derive(Args, Debug)]
pub struct ListTargetsArgs {
    #[arg(long)]
    pub config: Utf8PathBuf,
}

#[derive(Args, Debug)]
pub struct InitTargetArgs {
    #[command(flatten)]
    pub repo: RepoConfigArgs,

    #[arg(long)]
    pub target: String,

    #[arg(long)]
    pub header_path: String,

    #[arg(long, default_value = "LUMENRTC_API")]
    pub api_macro: String,

    #[arg(long, default_value = "LUMENRTC_CALL")]
    pub call_macro: String,

    #[arg(long, default_value = "lrtc_")]
    pub symbol_prefix: String,

    #[arg(long)]
    pub version_major_macro: String,

    #[arg(long)]
    pub version_minor_macro: String,

    #[arg(long)]
    pub version_patch_macro: String,

    #[arg(long)]
    pub binding_symbol: Vec<String>,

    #[arg(long)]
    pub binary_path: Option<String>,

    #[arg(long)]
    pub baseline_path: Option<String>,

    #[arg(long)]
    pub no_create_baseline: bool,

    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct BenchmarkArgs {
    #[command(flatten)]
    pub repo: RepoConfigArgs,

    #[arg(long)]
    pub target: Option<String>,

    #[arg(long)]
    pub baseline_root: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub binary: BinaryOverrideArgs,

    #[arg(long, default_value_t = 3)]
    pub iterations: u32,

    #[arg(long)]
    pub output: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct BenchmarkGateArgs {
    #[arg(long)]
    pub report: Utf8PathBuf,

    #[arg(long)]
    pub budget: Utf8PathBuf,

    #[arg(long)]
    pub output: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct ValidatePluginManifestArgs {
    #[arg(long)]
    pub manifest: Vec<Utf8PathBuf>,

    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    #[arg(long)]
    pub repo_root: Option<Utf8PathBuf>,

    #[arg(long)]
    pub target: Option<String>,

    #[arg(long)]
    pub output: Option<Utf8PathBuf>,

    #[arg(long)]
    pub print_json: bool,

    #[arg(long)]
    pub fail_on_warnings: bool,
}

#[derive(Args, Debug)]
pub struct ReleasePrepareArgs {
    #[command(flatten)]
    pub repo: RepoConfigArgs,

    #[arg(long)]
    pub baseline_root: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub binary: BinaryOverrideArgs,

    #[arg(long)]
    pub require_binaries: bool,

    #[arg(long)]
    pub update_baselines: bool,

    #[arg(long)]
    pub check_generated: bool,

    #[arg(long)]
    pub print_diff: bool,

    #[arg(long)]
    pub fail_on_sync: bool,

    #[arg(long)]
    pub fail_on_warnings: bool,

    #[arg(long)]
    pub release_tag: Option<String>,

    #[arg(long, default_value = "ABI Changelog")]
    pub title: String,

    #[arg(long)]
    pub changelog_output: Option<Utf8PathBuf>,

    #[arg(long)]
    pub output_dir: Option<Utf8PathBuf>,

    #[arg(long)]
    pub benchmark_budget: Option<Utf8PathBuf>,

    #[arg(long)]
    pub emit_sbom: bool,

    #[arg(long)]
    pub emit_attestation: bool,
}
