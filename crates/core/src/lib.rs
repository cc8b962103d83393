//! # tagver core library
//!
//! GitFlow-aware semantic version calculation, reimplementing the
//! GitVersion style of automatic versioning as a pure, library-shaped
//! engine. The core never touches a git implementation directly: callers
//! supply a [`git::Repository`] port implementation (the CLI crate's is
//! backed by `gix`).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tagver::{calculate, ContextOptions};
//!
//! # fn example(repo: &impl tagver::Repository) -> tagver::Result<()> {
//! let config = tagver::Configuration::builder().build()?;
//! let result = calculate(repo, &config, &ContextOptions::default(), false)?;
//! println!("{}", result.version.semver());
//! # Ok(())
//! # }
//! ```

pub mod calculator;
pub mod config;
pub mod context;
pub mod enums;
pub mod error;
pub mod explain;
pub mod formatter;
pub mod git;
pub mod increment;
pub mod merge_message;
pub mod repository_store;
pub mod strategies;
pub mod version;

pub use calculator::VersionResult;
pub use config::{Configuration, EffectiveConfiguration};
pub use context::{Context, ContextOptions};
pub use enums::{
    CommitMessageConvention, CommitMessageIncrementMode, IncrementStrategy, MainlineIncrementMode,
    VersionField, Verbosity, VersioningMode,
};
pub use error::{Result, TagVerError};
pub use git::{Branch, Commit, Repository, Tag};
pub use version::SemanticVersion;

use std::collections::BTreeMap;

/// Resolve the effective configuration for the current branch, build a
/// [`Context`], and run the full calculation pipeline.
///
/// This is the single public entry point other crates and the CLI use; the
/// lower-level pieces (`config`, `context`, `calculator`, `strategies`) are
/// exposed for testing and composition, but this is the normal path.
pub fn calculate<R: Repository>(
    repo: &R,
    config: &Configuration,
    options: &ContextOptions,
    explain: bool,
) -> Result<VersionResult> {
    let target_key = context_branch_key(repo, config, options)?;
    let effective = config.effective_configuration_for(&target_key)?;
    let context = Context::resolve(repo, config, &effective.tag_prefix, options)?;

    let mut result = calculator::calculate(repo, &context, config, &effective, explain)?;
    attach_build_metadata(&mut result, &context, repo)?;
    Ok(result)
}

fn context_branch_key<R: Repository>(
    repo: &R,
    config: &Configuration,
    options: &ContextOptions,
) -> Result<String> {
    let friendly_name = match &options.target_branch {
        Some(name) => name.clone(),
        None => {
            if !repo.is_detached_head()? {
                repo.current_branch_name()?
                    .ok_or_else(|| TagVerError::ContextResolution("HEAD has no branch name".to_string()))?
            } else {
                "unknown".to_string()
            }
        }
    };
    Ok(config
        .match_branch_key(&friendly_name)?
        .unwrap_or_else(|| "unknown".to_string()))
}

fn attach_build_metadata<R: Repository>(
    result: &mut VersionResult,
    context: &Context,
    repo: &R,
) -> Result<()> {
    let version_source_sha = result
        .selected
        .as_ref()
        .and_then(|winner| winner.source_commit.as_ref())
        .map(|c| c.sha.clone());

    let build_metadata = version::BuildMetaData {
        commits_since_tag: Some(result.commits_since_version_source),
        branch: Some(result.branch_name.clone()),
        sha: Some(context.current_commit.sha.clone()),
        short_sha: Some(context.current_commit.short_sha.clone()),
        version_source_sha,
        commit_date: Some(context.current_commit.when),
        commits_since_version_source: Some(result.commits_since_version_source),
        uncommitted_changes: context.number_of_uncommitted_changes,
    };
    result.version = result.version.with_build_meta_data(build_metadata);
    let _ = repo; // reserved for future repository-derived metadata
    Ok(())
}

/// Produce the formatted output variable map for a calculation result.
pub fn format_output(result: &VersionResult, effective: &EffectiveConfiguration) -> BTreeMap<String, String> {
    formatter::format_variables(&result.version, &result.branch_name, effective)
}
