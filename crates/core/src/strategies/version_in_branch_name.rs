use crate::config::{Configuration, EffectiveConfiguration};
use crate::context::Context;
use crate::error::Result;
use crate::git::Repository;
use crate::merge_message::extract_version_from_branch_name;
use crate::repository_store::RepositoryStore;

use super::{BaseVersion, Strategy};

/// Extracts a version straight from a release branch's own name, e.g.
/// `release/2.0.0`.
pub struct VersionInBranchName;

impl Strategy for VersionInBranchName {
    fn name(&self) -> &'static str {
        "VersionInBranchName"
    }

    fn base_versions(
        &self,
        repo: &dyn Repository,
        context: &Context,
        full_config: &Configuration,
        effective: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        if !effective.is_release_branch {
            return Ok(vec![]);
        }
        let Some(version) =
            extract_version_from_branch_name(&context.current_branch_friendly_name, &effective.tag_prefix)
        else {
            return Ok(vec![]);
        };

        let store = RepositoryStore::new(repo);
        let mut candidate_branches = Vec::new();
        for source_key in &effective.source_branches {
            if let Some(source_config) = full_config.branches.get(source_key) {
                if let Some(pattern) = &source_config.regex {
                    if let Ok(regex) = regex::Regex::new(pattern) {
                        for branch in repo.branches()? {
                            if !branch.is_remote && regex.is_match(&branch.friendly_name) {
                                candidate_branches.push(branch);
                            }
                        }
                    }
                }
            }
        }

        let fork_point = store
            .find_branch_was_branched_from(&context.current_branch_tip_sha, &candidate_branches)?
            .map(|(_, merge_base)| merge_base);

        let source_commit = match &fork_point {
            Some(sha) => Some(repo.commit_from_sha(sha)?),
            None => None,
        };

        let branch_name_override = Some(strip_version_segment(&context.current_branch_friendly_name));

        Ok(vec![BaseVersion {
            source: format!(
                "Version in branch name '{}'",
                context.current_branch_friendly_name
            ),
            version,
            should_increment: false,
            source_commit,
            branch_name_override,
        }])
    }
}

/// Drop the path segment that parsed as a version, trimming the trailing
/// separator left behind.
fn strip_version_segment(friendly_name: &str) -> String {
    let segments: Vec<&str> = friendly_name.split('/').collect();
    let kept: Vec<&str> = segments
        .into_iter()
        .filter(|segment| {
            let candidate = segment.split('-').next().unwrap_or(segment);
            !candidate.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false)
        })
        .collect();
    kept.join("/").trim_matches(|c| c == '/' || c == '-').to_string()
}
