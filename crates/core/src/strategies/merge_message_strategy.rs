use crate::config::{Configuration, EffectiveConfiguration};
use crate::context::Context;
use crate::error::Result;
use crate::git::Repository;
use crate::merge_message::{extract_version_from_branch_name, match_merge_commit, match_squash_commit};

use super::{release_branch_friendly_names, BaseVersion, Strategy};

const MAX_CANDIDATES: usize = 5;

/// Scans merge and squash commits for merges of release branches, yielding
/// up to five candidates total.
pub struct MergeMessageStrategy;

impl Strategy for MergeMessageStrategy {
    fn name(&self) -> &'static str {
        "MergeMessage"
    }

    fn base_versions(
        &self,
        repo: &dyn Repository,
        context: &Context,
        full_config: &Configuration,
        effective: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        let ancestry = repo.commit_log(&context.current_branch_tip_sha, None, None)?;
        let release_branches = release_branch_friendly_names(repo, full_config)?;
        let user_formats = &effective.merge_message_formats;

        let mut candidates = Vec::new();

        // Pass 1: merge commits.
        for commit in &ancestry {
            if candidates.len() >= MAX_CANDIDATES {
                break;
            }
            if !commit.is_merge() {
                continue;
            }
            let Some(matched) = match_merge_commit(&commit.message, user_formats) else {
                continue;
            };
            if !release_branches.contains(&matched.merged_branch) {
                continue;
            }
            let Some(version) = extract_version_from_branch_name(&matched.merged_branch, &effective.tag_prefix) else {
                continue;
            };
            let first_line = commit.message.lines().next().unwrap_or_default();
            candidates.push(BaseVersion {
                source: format!("Merge message '{first_line}'"),
                version,
                should_increment: !effective.prevent_increment_of_merged_branch_version,
                source_commit: Some(commit.clone()),
                branch_name_override: None,
            });
        }

        // Pass 2: squash commits (single parent).
        for commit in &ancestry {
            if candidates.len() >= MAX_CANDIDATES {
                break;
            }
            if commit.is_merge() {
                continue;
            }
            let Some(matched) = match_squash_commit(&commit.message, user_formats) else {
                continue;
            };
            if !release_branches.contains(&matched.merged_branch) {
                continue;
            }
            let Some(version) = extract_version_from_branch_name(&matched.merged_branch, &effective.tag_prefix) else {
                continue;
            };
            let first_line = commit.message.lines().next().unwrap_or_default();
            candidates.push(BaseVersion {
                source: format!("Squash merge '{first_line}'"),
                version,
                should_increment: !effective.prevent_increment_of_merged_branch_version,
                source_commit: Some(commit.clone()),
                branch_name_override: None,
            });
        }

        candidates.truncate(MAX_CANDIDATES);
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BranchConfig, Configuration as Cfg};
    use crate::git::testing::FakeRepository;
    use crate::git::{Branch, Commit};
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn commit(sha: &str, parents: &[&str], message: &str) -> Commit {
        Commit {
            sha: sha.to_string(),
            short_sha: sha.to_string(),
            message: message.to_string(),
            when: chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            parent_shas: parents.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn merge_of_release_branch_yields_candidate() {
        let mut commits = HashMap::new();
        commits.insert("c1".to_string(), commit("c1", &[], "init"));
        commits.insert(
            "c2".to_string(),
            commit("c2", &["c1", "r1"], "Merge branch 'release/2.0.0' into main"),
        );
        let repo = FakeRepository {
            commits,
            branches: vec![Branch {
                friendly_name: "release/2.0.0".to_string(),
                tip_sha: "c1".to_string(),
                is_remote: false,
            }],
            ..Default::default()
        };

        let mut branches = HashMap::new();
        branches.insert(
            "release".to_string(),
            BranchConfig {
                regex: Some(r"^releases?[/-]".to_string()),
                is_release_branch: Some(true),
                ..Default::default()
            },
        );
        let overlay = Cfg {
            branches,
            ..Default::default()
        };
        let full = Cfg::builder().with_overlay(overlay).build().unwrap();
        let effective = full.effective_configuration_for("main").unwrap();

        let context = Context {
            current_branch_friendly_name: "main".to_string(),
            current_branch_tip_sha: "c2".to_string(),
            current_commit: repo.commits["c2"].clone(),
            is_current_commit_tagged: false,
            current_commit_tagged_version: None,
            number_of_uncommitted_changes: 0,
        };

        let candidates = MergeMessageStrategy
            .base_versions(&repo, &context, &full, &effective)
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].version.semver(), "2.0.0");
    }
}
