//! Individual health checks. Each returns a single [`DoctorCheck`]; `lib.rs`
//! decides which ones apply to a given config and assembles the report.

use camino::Utf8Path;

use abi_guard_config::TargetRaw;

use crate::types::DoctorCheck;

pub fn check_config_loadable(config_path: &Utf8Path) -> DoctorCheck {
    match abi_guard_config::load_config(config_path) {
        Ok(config) => DoctorCheck::pass(
            "config_loadable",
            format!("loaded {} target(s) from {config_path}", config.targets.len()),
        ),
        Err(err) => DoctorCheck::fail("config_loadable", err.to_string()),
    }
}

pub fn check_target_header_exists(repo_root: &Utf8Path, target_name: &str, target: &TargetRaw) -> DoctorCheck {
    let name = format!("target.{target_name}.header_path");
    let path = abi_guard_utils_join(repo_root, &target.header.path);
    if path.is_file() {
        DoctorCheck::pass(name, format!("{path} exists"))
    } else {
        DoctorCheck::fail(name, format!("{path} does not exist"))
    }
}

pub fn check_target_binary(repo_root: &Utf8Path, target_name: &str, target: &TargetRaw) -> Option<DoctorCheck> {
    let binary = target.binary.as_ref()?;
    if binary.skip.unwrap_or(false) {
        return None;
    }
    let name = format!("target.{target_name}.binary_path");
    let Some(raw_path) = &binary.path else {
        return Some(DoctorCheck::warn(name, "no binary.path configured; binary checks will be skipped"));
    };
    let path = abi_guard_utils_join(repo_root, raw_path);
    Some(if path.is_file() {
        DoctorCheck::pass(name, format!("{path} exists"))
    } else {
        DoctorCheck::fail(name, format!("{path} does not exist"))
    })
}

/// Mirrors the original implementation's clang-candidate search order:
/// an explicit `header.parser.compiler`, then `header.parser.compiler_candidates`,
/// then the `ABI_CLANG`/`LLVM_CLANG`/`CC` environment variables, then a
/// platform-specific list of common clang binary names.
fn default_clang_candidates() -> Vec<String> {
    let mut candidates = Vec::new();
    for env_key in ["ABI_CLANG", "LLVM_CLANG", "CC"] {
        if let Ok(value) = std::env::var(env_key) {
            if !value.trim().is_empty() {
                candidates.push(value.trim().to_string());
            }
        }
    }

    if cfg!(target_os = "windows") {
        if let Ok(llvm_home) = std::env::var("LLVM_HOME") {
            if !llvm_home.trim().is_empty() {
                candidates.push(format!("{}/bin/clang.exe", llvm_home.trim()));
            }
        }
        if let Ok(program_files) = std::env::var("ProgramFiles") {
            if !program_files.trim().is_empty() {
                candidates.push(format!("{}/LLVM/bin/clang.exe", program_files.trim()));
            }
        }
        candidates.extend(["clang", "clang.exe", "clang-cl", "clang-cl.exe"].map(String::from));
    } else {
        candidates.extend(
            ["clang", "clang-20", "clang-19", "clang-18", "clang-17", "clang-16"].map(String::from),
        );
    }

    let mut seen = std::collections::BTreeSet::new();
    candidates.retain(|c| seen.insert(c.clone()));
    candidates
}

pub fn check_clang_preprocessor(target_name: &str, target: &TargetRaw) -> Option<DoctorCheck> {
    let backend = target.header.parser.as_ref().and_then(|p| p.backend.as_deref());
    if backend != Some("clang_preprocess") {
        return None;
    }

    let name = format!("target.{target_name}.clang_preprocessor");
    let mut candidates = Vec::new();
    if let Some(parser) = &target.header.parser {
        if let Some(compiler) = &parser.compiler {
            if !compiler.trim().is_empty() {
                candidates.push(compiler.clone());
            }
        }
        candidates.extend(parser.compiler_candidates.iter().cloned());
    }
    candidates.extend(default_clang_candidates());

    for candidate in &candidates {
        if which::which(candidate).is_ok() || Utf8Path::new(candidate).is_file() {
            return Some(DoctorCheck::pass(name, format!("resolved preprocessor: {candidate}")));
        }
    }

    Some(DoctorCheck::fail(
        name,
        format!("no preprocessor found; tried: {}", candidates.join(", ")),
    ))
}

pub fn check_export_listing_tool() -> DoctorCheck {
    let candidates = abi_guard_snapshot::candidate_export_tool_names();
    for candidate in &candidates {
        if which::which(candidate).is_ok() {
            return DoctorCheck::pass("export_listing_tool", format!("found {candidate} on PATH"));
        }
    }
    DoctorCheck::warn(
        "export_listing_tool",
        format!("none of [{}] found on PATH; binary export checks will fail", candidates.join(", ")),
    )
}

pub fn check_bindings_configured(target_name: &str, target: &TargetRaw) -> DoctorCheck {
    let name = format!("target.{target_name}.bindings_configured");
    match &target.bindings {
        Some(bindings) if !bindings.expected_symbols.is_empty() => {
            DoctorCheck::pass(name, format!("{} expected symbol(s) configured", bindings.expected_symbols.len()))
        }
        _ => DoctorCheck::warn(name, "no bindings.expected_symbols configured; drift in exported symbols won't be caught"),
    }
}

pub fn check_write_permissions(scratch_dir: &Utf8Path) -> DoctorCheck {
    if let Err(err) = std::fs::create_dir_all(scratch_dir) {
        return DoctorCheck::fail("write_permissions", format!("cannot create {scratch_dir}: {err}"));
    }
    let test_file = scratch_dir.join(".doctor_write_test");
    match std::fs::write(&test_file, b"doctor") {
        Ok(()) => {
            let _ = std::fs::remove_file(&test_file);
            DoctorCheck::pass("write_permissions", format!("{scratch_dir} is writable"))
        }
        Err(err) => DoctorCheck::fail("write_permissions", format!("cannot write to {scratch_dir}: {err}")),
    }
}

pub fn check_atomic_rename(scratch_dir: &Utf8Path) -> DoctorCheck {
    if let Err(err) = std::fs::create_dir_all(scratch_dir) {
        return DoctorCheck::fail("atomic_rename", format!("cannot create {scratch_dir}: {err}"));
    }
    let source = scratch_dir.join(".doctor_rename_source");
    let target = scratch_dir.join(".doctor_rename_target");
    if let Err(err) = std::fs::write(&source, b"doctor") {
        return DoctorCheck::fail("atomic_rename", format!("cannot write {source}: {err}"));
    }
    match std::fs::rename(&source, &target) {
        Ok(()) => {
            let _ = std::fs::remove_file(&target);
            DoctorCheck::pass("atomic_rename", format!("same-volume rename works under {scratch_dir}"))
        }
        Err(err) => {
            let _ = std::fs::remove_file(&source);
            DoctorCheck::fail("atomic_rename", format!("rename failed under {scratch_dir}: {err}"))
        }
    }
}

fn abi_guard_utils_join(repo_root: &Utf8Path, value: &str) -> camino::Utf8PathBuf {
    abi_guard_utils::paths::ensure_relative_path(repo_root, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_guard_config::{HeaderParserRaw, HeaderRaw, VersionMacrosRaw};

    fn target_with_header(header: HeaderRaw) -> TargetRaw {
        TargetRaw { baseline_path: None, header, bindings: None, policy: None, codegen: None, binary: None }
    }

    fn header(path: &str) -> HeaderRaw {
        HeaderRaw {
            path: path.to_string(),
            api_macro: "WIDGET_API".to_string(),
            call_macro: "WIDGET_CALL".to_string(),
            symbol_prefix: "widget_".to_string(),
            version_macros: VersionMacrosRaw {
                major: "WIDGET_VERSION_MAJOR".to_string(),
                minor: "WIDGET_VERSION_MINOR".to_string(),
                patch: "WIDGET_VERSION_PATCH".to_string(),
            },
            parser: None,
            types: None,
            layout: None,
        }
    }

    #[test]
    fn missing_header_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let root = camino::Utf8Path::from_path(dir.path()).unwrap();
        let target = target_with_header(header("missing.h"));
        let check = check_target_header_exists(root, "widget", &target);
        assert_eq!(check.status, crate::types::CheckStatus::Fail);
    }

    #[test]
    fn existing_header_file_passes() {
        let dir = tempfile::tempdir().unwrap();
        let root = camino::Utf8Path::from_path(dir.path()).unwrap();
        std::fs::write(dir.path().join("widget.h"), "").unwrap();
        let target = target_with_header(header("widget.h"));
        let check = check_target_header_exists(root, "widget", &target);
        assert_eq!(check.status, crate::types::CheckStatus::Pass);
    }

    #[test]
    fn non_clang_backend_skips_preprocessor_check() {
        let target = target_with_header(header("widget.h"));
        assert!(check_clang_preprocessor("widget", &target).is_none());
    }

    #[test]
    fn clang_backend_with_no_candidates_resolvable_fails() {
        let mut h = header("widget.h");
        h.parser = Some(HeaderParserRaw {
            backend: Some("clang_preprocess".to_string()),
            compiler: Some("/nonexistent/clang-doctor-test".to_string()),
            compiler_candidates: Vec::new(),
            args: Vec::new(),
            include_dirs: Vec::new(),
            fallback_to_regex: Some(false),
        });
        let target = target_with_header(h);
        let check = check_clang_preprocessor("widget", &target).unwrap();
        // We can't assert pass/fail deterministically (clang may exist on the
        // host running these tests), just that a check is produced.
        assert_eq!(check.name, "target.widget.clang_preprocessor");
    }

    #[test]
    fn missing_bindings_warns() {
        let target = target_with_header(header("widget.h"));
        let check = check_bindings_configured("widget", &target);
        assert_eq!(check.status, crate::types::CheckStatus::Warn);
    }

    #[test]
    fn write_permissions_and_atomic_rename_pass_in_tempdir() {
        let dir = tempfile::tempdir().unwrap();
        let root = camino::Utf8Path::from_path(dir.path()).unwrap().join(".abi-guard-doctor");
        assert_eq!(check_write_permissions(&root).status, crate::types::CheckStatus::Pass);
        assert_eq!(check_atomic_rename(&root).status, crate::types::CheckStatus::Pass);
    }
}
