use crate::config::{Configuration, EffectiveConfiguration};
use crate::context::Context;
use crate::error::Result;
use crate::git::Repository;
use crate::repository_store::RepositoryStore;

use super::{BaseVersion, Strategy};

/// Every valid version tag reachable from the current branch tip becomes a
/// candidate. Tags on the current commit win absolutely over older tags.
pub struct TaggedCommit;

impl Strategy for TaggedCommit {
    fn name(&self) -> &'static str {
        "TaggedCommit"
    }

    fn base_versions(
        &self,
        repo: &dyn Repository,
        context: &Context,
        _full_config: &Configuration,
        effective: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        let store = RepositoryStore::new(repo);
        let by_commit = store.version_tags_by_commit(&effective.tag_prefix)?;
        let ancestry = repo.commit_log(&context.current_branch_tip_sha, None, None)?;

        let mut on_current_commit = Vec::new();
        let mut older = Vec::new();

        for commit in &ancestry {
            let Some(tags) = by_commit.get(&commit.sha) else {
                continue;
            };
            let is_current = commit.sha == context.current_commit.sha;
            for tag in tags {
                let candidate = BaseVersion {
                    source: format!("Git tag '{}'", tag.tag.name),
                    version: tag.version.clone(),
                    should_increment: !is_current,
                    source_commit: Some(commit.clone()),
                    branch_name_override: None,
                };
                if is_current {
                    on_current_commit.push(candidate);
                } else {
                    older.push(candidate);
                }
            }
        }

        if !on_current_commit.is_empty() {
            Ok(on_current_commit)
        } else {
            Ok(older)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration as Cfg;
    use crate::git::testing::FakeRepository;
    use crate::git::{Commit, Tag};
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn commit(sha: &str, parents: &[&str]) -> Commit {
        Commit {
            sha: sha.to_string(),
            short_sha: sha.to_string(),
            message: "msg".to_string(),
            when: chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            parent_shas: parents.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn current_commit_tags_win_over_older_tags() {
        let mut commits = HashMap::new();
        commits.insert("c1".to_string(), commit("c1", &[]));
        commits.insert("c2".to_string(), commit("c2", &["c1"]));
        let repo = FakeRepository {
            commits,
            tags: vec![
                Tag {
                    name: "v1.0.0".to_string(),
                    target_sha: "c1".to_string(),
                },
                Tag {
                    name: "v2.0.0".to_string(),
                    target_sha: "c2".to_string(),
                },
            ],
            ..Default::default()
        };
        let full = Cfg::builder().build().unwrap();
        let effective = full.effective_configuration_for("main").unwrap();
        let context = Context {
            current_branch_friendly_name: "main".to_string(),
            current_branch_tip_sha: "c2".to_string(),
            current_commit: repo.commits["c2"].clone(),
            is_current_commit_tagged: true,
            current_commit_tagged_version: None,
            number_of_uncommitted_changes: 0,
        };
        let candidates = TaggedCommit
            .base_versions(&repo, &context, &full, &effective)
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].version.semver(), "2.0.0");
        assert!(!candidates[0].should_increment);
    }
}
