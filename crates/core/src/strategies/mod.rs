//! Base-version discovery strategies.
//!
//! Six strategies run in a fixed order, each returning zero or more
//! [`BaseVersion`] candidates from the same inputs. None mutate shared
//! state; the calculator concatenates their output and ranks it.

pub mod config_next_version;
pub mod fallback;
pub mod merge_message_strategy;
pub mod tagged_commit;
pub mod track_release_branches;
pub mod version_in_branch_name;

use crate::config::{Configuration, EffectiveConfiguration};
use crate::context::Context;
use crate::error::Result;
use crate::git::{Commit, Repository};

/// A single source-commit-anchored version candidate.
#[derive(Debug, Clone)]
pub struct BaseVersion {
    /// Human-readable provenance, surfaced in `--explain` output.
    pub source: String,
    pub version: crate::version::SemanticVersion,
    /// Whether the branch's increment should be tentatively applied when
    /// ranking this candidate, and later when computing the final version.
    pub should_increment: bool,
    /// The commit this candidate is anchored to, if any (`ConfigNextVersion`
    /// has none).
    pub source_commit: Option<Commit>,
    /// Overrides the branch name used for pre-release tag substitution.
    pub branch_name_override: Option<String>,
}

/// Uniform contract every base-version strategy implements.
pub trait Strategy {
    fn name(&self) -> &'static str;

    fn base_versions(
        &self,
        repo: &dyn Repository,
        context: &Context,
        full_config: &Configuration,
        effective: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>>;
}

/// The fixed, deterministic strategy run order.
pub fn all_strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(config_next_version::ConfigNextVersion),
        Box::new(tagged_commit::TaggedCommit),
        Box::new(merge_message_strategy::MergeMessageStrategy),
        Box::new(version_in_branch_name::VersionInBranchName),
        Box::new(track_release_branches::TrackReleaseBranches),
        Box::new(fallback::Fallback),
    ]
}

/// Branch keys (and their effective configs) whose `is_release_branch` flag
/// is set, matched against every branch git actually reports.
pub(crate) fn release_branch_friendly_names(
    repo: &dyn Repository,
    full_config: &Configuration,
) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for branch in repo.branches()? {
        if branch.is_remote {
            continue;
        }
        if let Some(key) = full_config.match_branch_key(&branch.friendly_name)? {
            let effective = full_config.effective_configuration_for(&key)?;
            if effective.is_release_branch {
                names.push(branch.friendly_name);
            }
        }
    }
    Ok(names)
}
