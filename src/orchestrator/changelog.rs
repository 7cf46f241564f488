//! `changelog`: runs verification across every target (or a baseline
//! directory snapshot comparison) and renders the aggregate as a titled
//! Markdown changelog document.

use camino::Utf8Path;

use abi_guard_config::ConfigRaw;
use abi_guard_runner::CommandRunner;

use crate::error::AppError;
use crate::orchestrator::report::render_changelog_document;
use crate::orchestrator::target::RunOverrides;
use crate::orchestrator::verify::verify_all;

pub struct ChangelogResult {
    pub document: String,
    pub has_failures: bool,
}

pub fn render_changelog(
    repo_root: &Utf8Path,
    config: &ConfigRaw,
    overrides: &RunOverrides,
    title: &str,
    release_tag: Option<&str>,
    generated_at_utc: &str,
    runner: &dyn CommandRunner,
) -> Result<ChangelogResult, AppError> {
    let aggregate = verify_all(repo_root, config, overrides, generated_at_utc, runner)?;
    let document = render_changelog_document(title, release_tag, generated_at_utc, &aggregate.results);
    Ok(ChangelogResult { document, has_failures: aggregate.has_failures() })
}
