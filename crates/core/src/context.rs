//! Resolves the inputs the calculator needs from a repository and a set of
//! options into a single, self-contained [`Context`].

use regex::Regex;

use crate::config::Configuration;
use crate::error::{Result, TagVerError};
use crate::git::{Branch, Commit, Repository};
use crate::repository_store::RepositoryStore;
use crate::version::SemanticVersion;

/// Caller-supplied overrides for context resolution.
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    pub target_branch: Option<String>,
    pub commit_sha: Option<String>,
}

/// Everything the calculator needs about "where we are" in the repository.
#[derive(Debug, Clone)]
pub struct Context {
    pub current_branch_friendly_name: String,
    pub current_branch_tip_sha: String,
    pub current_commit: Commit,
    pub is_current_commit_tagged: bool,
    pub current_commit_tagged_version: Option<SemanticVersion>,
    pub number_of_uncommitted_changes: u32,
}

impl Context {
    pub fn resolve<R: Repository>(
        repo: &R,
        full_config: &Configuration,
        tag_prefix: &Regex,
        options: &ContextOptions,
    ) -> Result<Self> {
        let store = RepositoryStore::new(repo);

        let (current_branch_friendly_name, current_branch_tip_sha) = match &options.target_branch {
            Some(name) => {
                let branch = store.find_branch(name)?.ok_or_else(|| {
                    TagVerError::ContextResolution(format!("unknown target branch '{name}'"))
                })?;
                (branch.friendly_name, branch.tip_sha)
            }
            None => Self::resolve_head_branch(repo, full_config, &store)?,
        };

        let current_commit = match &options.commit_sha {
            Some(sha) => repo.commit_from_sha(sha)?,
            None => repo.commit_from_sha(&current_branch_tip_sha)?,
        };

        let tagged_version = store.version_tag_at_commit(&current_commit.sha, tag_prefix)?;
        let is_current_commit_tagged = tagged_version.is_some();
        let current_commit_tagged_version = tagged_version.map(|t| t.version);

        let number_of_uncommitted_changes = repo.number_of_uncommitted_changes()?;

        Ok(Context {
            current_branch_friendly_name,
            current_branch_tip_sha,
            current_commit,
            is_current_commit_tagged,
            current_commit_tagged_version,
            number_of_uncommitted_changes,
        })
    }

    fn resolve_head_branch<R: Repository>(
        repo: &R,
        full_config: &Configuration,
        store: &RepositoryStore<'_, R>,
    ) -> Result<(String, String)> {
        if !repo.is_detached_head()? {
            let name = repo.current_branch_name()?.ok_or_else(|| {
                TagVerError::ContextResolution("HEAD has no branch name".to_string())
            })?;
            let branch = store.find_branch(&name)?.ok_or_else(|| {
                TagVerError::ContextResolution(format!("current branch '{name}' has no tip"))
            })?;
            return Ok((branch.friendly_name, branch.tip_sha));
        }

        // Detached HEAD: recover a friendly branch identity by looking at
        // which branches contain the current commit, ranked by branch-config
        // priority (highest wins, ties broken by branch name). Falls back to
        // the first non-remote branch, then the first branch at all, when no
        // candidate matches any configured branch key.
        let head = repo.head_commit()?.ok_or_else(|| {
            TagVerError::ContextResolution("repository has no commits".to_string())
        })?;
        let candidates = repo.branches_containing_commit(&head.sha)?;
        let non_remote: Vec<Branch> = candidates.iter().filter(|b| !b.is_remote).cloned().collect();

        let chosen = Self::highest_priority_branch(full_config, &non_remote)?
            .or_else(|| non_remote.first().cloned())
            .or_else(|| candidates.first().cloned())
            .ok_or_else(|| {
                TagVerError::ContextResolution(
                    "detached HEAD and no branch contains the current commit".to_string(),
                )
            })?;

        Ok((chosen.friendly_name.clone(), head.sha.clone()))
    }

    fn highest_priority_branch(
        full_config: &Configuration,
        candidates: &[Branch],
    ) -> Result<Option<Branch>> {
        let mut best: Option<(Branch, i64)> = None;
        for branch in candidates {
            let Some(key) = full_config.match_branch_key(&branch.friendly_name)? else {
                continue;
            };
            let effective = full_config.effective_configuration_for(&key)?;
            let replace = match &best {
                None => true,
                Some((best_branch, best_priority)) => {
                    effective.priority > *best_priority
                        || (effective.priority == *best_priority
                            && branch.friendly_name < best_branch.friendly_name)
                }
            };
            if replace {
                best = Some((branch.clone(), effective.priority));
            }
        }
        Ok(best.map(|(branch, _)| branch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::FakeRepository;
    use crate::git::{Branch, Commit as GitCommit};
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn commit(sha: &str) -> GitCommit {
        GitCommit {
            sha: sha.to_string(),
            short_sha: sha.to_string(),
            message: "msg".to_string(),
            when: chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            parent_shas: vec![],
        }
    }

    #[test]
    fn resolves_target_branch_by_name() {
        let mut commits = HashMap::new();
        commits.insert("c1".to_string(), commit("c1"));
        let repo = FakeRepository {
            commits,
            branches: vec![Branch {
                friendly_name: "develop".to_string(),
                tip_sha: "c1".to_string(),
                is_remote: false,
            }],
            ..Default::default()
        };
        let prefix = Regex::new("[vV]").unwrap();
        let config = Configuration::builder().build().unwrap();
        let options = ContextOptions {
            target_branch: Some("develop".to_string()),
            commit_sha: None,
        };
        let context = Context::resolve(&repo, &config, &prefix, &options).unwrap();
        assert_eq!(context.current_branch_friendly_name, "develop");
        assert!(!context.is_current_commit_tagged);
    }

    #[test]
    fn unknown_target_branch_errors() {
        let repo = FakeRepository::default();
        let prefix = Regex::new("[vV]").unwrap();
        let config = Configuration::builder().build().unwrap();
        let options = ContextOptions {
            target_branch: Some("ghost".to_string()),
            commit_sha: None,
        };
        let err = Context::resolve(&repo, &config, &prefix, &options).unwrap_err();
        assert!(matches!(err, TagVerError::ContextResolution(_)));
    }
}
