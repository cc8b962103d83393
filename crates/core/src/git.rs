//! The abstract repository port.
//!
//! The core crate never links against a git implementation. Every query the
//! calculator needs is expressed here as a trait method; the CLI crate
//! supplies the sole concrete implementation backed by `gix`. This keeps the
//! calculation pipeline testable with an in-memory fake and keeps the core
//! crate's dependency graph free of any particular git library.

use chrono::{DateTime, Utc};

use crate::error::Result;

/// A single commit, independent of the backing git implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub short_sha: String,
    pub message: String,
    pub when: DateTime<Utc>,
    pub parent_shas: Vec<String>,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parent_shas.len() > 1
    }
}

/// A named branch and the sha it currently points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Friendly name with any remote prefix stripped, e.g. `develop`, not
    /// `origin/develop`.
    pub friendly_name: String,
    pub tip_sha: String,
    pub is_remote: bool,
}

/// A raw tag as read from the repository, before prefix/grammar validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    /// The commit the tag points to once any annotation object is peeled.
    pub target_sha: String,
}

/// A tag whose name parsed as a valid version under the configured
/// `tag-prefix`.
#[derive(Debug, Clone)]
pub struct VersionTag {
    pub tag: Tag,
    pub version: crate::version::SemanticVersion,
}

/// The abstract source of truth the calculator queries. Every method accepts
/// an optional path filter; implementations that cannot restrict history by
/// path are free to ignore it, but must accept the parameter so callers
/// don't need to special-case support.
pub trait Repository {
    /// The repository's current HEAD commit, or `None` for an empty repo.
    fn head_commit(&self) -> Result<Option<Commit>>;

    /// `true` when HEAD does not point at a named branch.
    fn is_detached_head(&self) -> Result<bool>;

    /// The friendly name of the branch HEAD points to, if any.
    fn current_branch_name(&self) -> Result<Option<String>>;

    /// All local and remote-tracking branches, deduplicated by friendly name.
    fn branches(&self) -> Result<Vec<Branch>>;

    /// Every tag in the repository, with annotated tags peeled to the commit
    /// they reference.
    fn tags(&self) -> Result<Vec<Tag>>;

    /// Fetch a single commit by its full sha.
    fn commit_from_sha(&self, sha: &str) -> Result<Commit>;

    /// Walk first-parent-and-merges history starting at `start_sha`,
    /// earliest ancestor last, stopping at (but not including) `stop_sha`
    /// when given.
    fn commit_log(
        &self,
        start_sha: &str,
        stop_sha: Option<&str>,
        path_filter: Option<&[String]>,
    ) -> Result<Vec<Commit>>;

    /// Walk strictly along first-parent history from `start_sha`, used by
    /// the mainline strategies to scan only the mainline's own commits.
    fn mainline_commit_log(
        &self,
        start_sha: &str,
        stop_sha: Option<&str>,
        path_filter: Option<&[String]>,
    ) -> Result<Vec<Commit>>;

    /// All commits reachable from `branch_tip_sha` that are not reachable
    /// from any of `exclude_shas` (typically the branch's source branches).
    fn branch_commits(
        &self,
        branch_tip_sha: &str,
        exclude_shas: &[String],
        path_filter: Option<&[String]>,
    ) -> Result<Vec<Commit>>;

    /// Commits on `start_sha`'s ancestry strictly before `commit_sha`,
    /// inclusive of neither endpoint oddity (used to count commits since a
    /// version source).
    fn commits_prior_to(
        &self,
        start_sha: &str,
        commit_sha: &str,
        path_filter: Option<&[String]>,
    ) -> Result<Vec<Commit>>;

    /// The best common ancestor of two commits, or `None` if they share no
    /// history.
    fn find_merge_base(&self, left_sha: &str, right_sha: &str) -> Result<Option<String>>;

    /// Every branch whose history contains `commit_sha`.
    fn branches_containing_commit(&self, commit_sha: &str) -> Result<Vec<Branch>>;

    /// Count of uncommitted changes (working tree + index) relative to HEAD.
    fn number_of_uncommitted_changes(&self) -> Result<u32>;

    /// Resolve a tag name to the commit sha it ultimately points to,
    /// peeling through annotation objects.
    fn peel_tag_to_commit(&self, tag_name: &str) -> Result<String>;
}

/// An in-memory [`Repository`] for tests, both this crate's own unit tests
/// and other crates' black-box integration tests. Not gated behind
/// `#[cfg(test)]` since integration tests under `tests/` compile as
/// separate crates and can only see items that are always built.
pub mod testing {
    use std::collections::{HashMap, HashSet};

    use super::*;

    #[derive(Debug, Clone, Default)]
    pub struct FakeRepository {
        pub commits: HashMap<String, Commit>,
        pub head_sha: Option<String>,
        pub detached: bool,
        pub current_branch: Option<String>,
        pub branches: Vec<Branch>,
        pub tags: Vec<Tag>,
        pub uncommitted_changes: u32,
    }

    impl FakeRepository {
        pub fn ancestors(&self, start_sha: &str, stop_at: &HashSet<String>) -> Vec<Commit> {
            let mut out = Vec::new();
            let mut stack = vec![start_sha.to_string()];
            let mut visited = HashSet::new();
            while let Some(sha) = stack.pop() {
                if !visited.insert(sha.clone()) || stop_at.contains(&sha) {
                    continue;
                }
                if let Some(commit) = self.commits.get(&sha) {
                    out.push(commit.clone());
                    stack.extend(commit.parent_shas.iter().cloned());
                }
            }
            out
        }
    }

    impl Repository for FakeRepository {
        fn head_commit(&self) -> Result<Option<Commit>> {
            Ok(self
                .head_sha
                .as_ref()
                .and_then(|sha| self.commits.get(sha).cloned()))
        }

        fn is_detached_head(&self) -> Result<bool> {
            Ok(self.detached)
        }

        fn current_branch_name(&self) -> Result<Option<String>> {
            Ok(self.current_branch.clone())
        }

        fn branches(&self) -> Result<Vec<Branch>> {
            Ok(self.branches.clone())
        }

        fn tags(&self) -> Result<Vec<Tag>> {
            Ok(self.tags.clone())
        }

        fn commit_from_sha(&self, sha: &str) -> Result<Commit> {
            self.commits.get(sha).cloned().ok_or_else(|| {
                crate::error::TagVerError::repository(
                    "looking up commit",
                    anyhow::anyhow!("unknown sha: {sha}"),
                )
            })
        }

        fn commit_log(
            &self,
            start_sha: &str,
            stop_sha: Option<&str>,
            _path_filter: Option<&[String]>,
        ) -> Result<Vec<Commit>> {
            let stop: HashSet<String> = stop_sha.into_iter().map(String::from).collect();
            Ok(self.ancestors(start_sha, &stop))
        }

        fn mainline_commit_log(
            &self,
            start_sha: &str,
            stop_sha: Option<&str>,
            path_filter: Option<&[String]>,
        ) -> Result<Vec<Commit>> {
            self.commit_log(start_sha, stop_sha, path_filter)
        }

        fn branch_commits(
            &self,
            branch_tip_sha: &str,
            exclude_shas: &[String],
            _path_filter: Option<&[String]>,
        ) -> Result<Vec<Commit>> {
            let exclude: HashSet<String> = exclude_shas.iter().cloned().collect();
            let mut reachable_from_excluded = HashSet::new();
            for sha in &exclude {
                for commit in self.ancestors(sha, &HashSet::new()) {
                    reachable_from_excluded.insert(commit.sha);
                }
                reachable_from_excluded.insert(sha.clone());
            }
            Ok(self
                .ancestors(branch_tip_sha, &HashSet::new())
                .into_iter()
                .filter(|c| !reachable_from_excluded.contains(&c.sha))
                .collect())
        }

        fn commits_prior_to(
            &self,
            start_sha: &str,
            commit_sha: &str,
            _path_filter: Option<&[String]>,
        ) -> Result<Vec<Commit>> {
            let stop: HashSet<String> = [commit_sha.to_string()].into_iter().collect();
            Ok(self.ancestors(start_sha, &stop))
        }

        fn find_merge_base(&self, left_sha: &str, right_sha: &str) -> Result<Option<String>> {
            let left: HashSet<String> = self
                .ancestors(left_sha, &HashSet::new())
                .into_iter()
                .map(|c| c.sha)
                .chain(std::iter::once(left_sha.to_string()))
                .collect();
            let mut queue = vec![right_sha.to_string()];
            let mut visited = HashSet::new();
            while let Some(sha) = queue.pop() {
                if !visited.insert(sha.clone()) {
                    continue;
                }
                if left.contains(&sha) {
                    return Ok(Some(sha));
                }
                if let Some(commit) = self.commits.get(&sha) {
                    queue.extend(commit.parent_shas.iter().cloned());
                }
            }
            Ok(None)
        }

        fn branches_containing_commit(&self, commit_sha: &str) -> Result<Vec<Branch>> {
            let mut out = Vec::new();
            for branch in &self.branches {
                let reachable = self.ancestors(&branch.tip_sha, &HashSet::new());
                if branch.tip_sha == commit_sha
                    || reachable.iter().any(|c| c.sha == commit_sha)
                {
                    out.push(branch.clone());
                }
            }
            Ok(out)
        }

        fn number_of_uncommitted_changes(&self) -> Result<u32> {
            Ok(self.uncommitted_changes)
        }

        fn peel_tag_to_commit(&self, tag_name: &str) -> Result<String> {
            self.tags
                .iter()
                .find(|t| t.name == tag_name)
                .map(|t| t.target_sha.clone())
                .ok_or_else(|| {
                    crate::error::TagVerError::repository(
                        "peeling tag",
                        anyhow::anyhow!("unknown tag: {tag_name}"),
                    )
                })
        }
    }
}
