//! Domain queries layered over the raw [`crate::git::Repository`] port.
//!
//! Where `Repository` exposes git primitives (commits, branches, tags),
//! `RepositoryStore` answers the questions the calculator actually asks:
//! which tags are valid versions, what's tagged at a commit, which branch a
//! feature branch forked from.

use std::collections::HashMap;

use regex::Regex;

use crate::error::Result;
use crate::git::{Branch, Repository, Tag, VersionTag};
use crate::version::SemanticVersion;

pub struct RepositoryStore<'a, R: Repository> {
    repo: &'a R,
}

impl<'a, R: Repository> RepositoryStore<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Every tag whose name parses as a version once `tag_prefix` is
    /// stripped, sorted highest-precedence first at each target commit.
    pub fn valid_version_tags(&self, tag_prefix: &Regex) -> Result<Vec<VersionTag>> {
        let mut tags = Vec::new();
        for tag in self.repo.tags()? {
            match SemanticVersion::parse(&tag.name, Some(tag_prefix)) {
                Ok(version) => tags.push(VersionTag { tag, version }),
                Err(_) => tracing::debug!(tag = %tag.name, "skipping tag that does not parse as a version"),
            }
        }
        tags.sort_by(|a, b| b.version.compare_to(&a.version));
        Ok(tags)
    }

    /// Version tags grouped by the commit sha they point at.
    pub fn version_tags_by_commit(
        &self,
        tag_prefix: &Regex,
    ) -> Result<HashMap<String, Vec<VersionTag>>> {
        let mut by_commit: HashMap<String, Vec<VersionTag>> = HashMap::new();
        for version_tag in self.valid_version_tags(tag_prefix)? {
            by_commit
                .entry(version_tag.tag.target_sha.clone())
                .or_default()
                .push(version_tag);
        }
        for tags in by_commit.values_mut() {
            tags.sort_by(|a, b| b.version.compare_to(&a.version));
        }
        Ok(by_commit)
    }

    /// The highest-precedence version tag pointing directly at `commit_sha`,
    /// if any.
    pub fn version_tag_at_commit(
        &self,
        commit_sha: &str,
        tag_prefix: &Regex,
    ) -> Result<Option<VersionTag>> {
        Ok(self
            .version_tags_by_commit(tag_prefix)?
            .remove(commit_sha)
            .and_then(|mut tags| {
                if tags.is_empty() {
                    None
                } else {
                    Some(tags.remove(0))
                }
            }))
    }

    /// The branch whose `friendly_name` exactly equals `friendly_name`, as
    /// git reports it. No config or regex matching is involved.
    pub fn find_branch(&self, friendly_name: &str) -> Result<Option<Branch>> {
        Ok(self
            .repo
            .branches()?
            .into_iter()
            .find(|b| b.friendly_name == friendly_name))
    }

    /// The highest-priority local branch whose configured branch key has
    /// `is_mainline` set (`main`/`master` under the default config, but
    /// driven entirely by `full_config` rather than a hardcoded name).
    pub fn find_mainline_branch(
        &self,
        full_config: &crate::config::Configuration,
    ) -> Result<Option<Branch>> {
        let mut best: Option<(Branch, i64)> = None;
        for branch in self.repo.branches()? {
            if branch.is_remote {
                continue;
            }
            let Some(key) = full_config.match_branch_key(&branch.friendly_name)? else {
                continue;
            };
            let effective = full_config.effective_configuration_for(&key)?;
            if !effective.is_mainline {
                continue;
            }
            let better = match &best {
                None => true,
                Some((_, best_priority)) => effective.priority > *best_priority,
            };
            if better {
                best = Some((branch, effective.priority));
            }
        }
        if best.is_none() {
            tracing::warn!("no branch matches a mainline branch configuration");
        }
        Ok(best.map(|(branch, _)| branch))
    }

    /// All branches flagged as release branches in `release_branch_names`.
    pub fn release_branches(&self, release_branch_names: &[String]) -> Result<Vec<Branch>> {
        Ok(self
            .repo
            .branches()?
            .into_iter()
            .filter(|b| release_branch_names.contains(&b.friendly_name))
            .collect())
    }

    /// Whether `commit_sha` is reachable from `branch_tip_sha`.
    pub fn is_commit_on_branch(&self, commit_sha: &str, branch_tip_sha: &str) -> Result<bool> {
        if commit_sha == branch_tip_sha {
            return Ok(true);
        }
        let commits = self.repo.commit_log(branch_tip_sha, None, None)?;
        Ok(commits.iter().any(|c| c.sha == commit_sha))
    }

    /// Find the most likely branch `branch_tip_sha` was forked from among
    /// `candidate_branches`, by merge-base distance: the candidate whose
    /// merge base with the branch is itself furthest along the candidate's
    /// own history (i.e. the most recent common ancestor) wins.
    pub fn find_branch_was_branched_from(
        &self,
        branch_tip_sha: &str,
        candidate_branches: &[Branch],
    ) -> Result<Option<(Branch, String)>> {
        let mut best: Option<(Branch, String, usize)> = None;
        for candidate in candidate_branches {
            let Some(merge_base) = self
                .repo
                .find_merge_base(branch_tip_sha, &candidate.tip_sha)?
            else {
                tracing::debug!(branch = %candidate.friendly_name, "no merge base with candidate, skipping");
                continue;
            };
            let distance = self
                .repo
                .commits_prior_to(&candidate.tip_sha, &merge_base, None)?
                .len();
            let better = match &best {
                None => true,
                Some((_, _, best_distance)) => distance < *best_distance,
            };
            if better {
                best = Some((candidate.clone(), merge_base, distance));
            }
        }
        Ok(best.map(|(branch, merge_base, _)| (branch, merge_base)))
    }

    /// Resolve a tag name to its target commit's sha, for when the raw
    /// `Tag` has not already been peeled.
    pub fn peel(&self, tag: &Tag) -> Result<String> {
        self.repo.peel_tag_to_commit(&tag.name)
    }
}
