//! The sole concrete [`tagver::Repository`] implementation, backed by
//! `gix`. The core crate never depends on `gix` itself; this module is the
//! one place that translates between gix's object model and the core's
//! plain domain types.

use std::collections::HashSet;

use anyhow::Context as _;
use chrono::{TimeZone, Utc};
use tagver::{Branch, Commit, Repository, Tag};

pub struct GixRepository {
    inner: gix::Repository,
}

impl GixRepository {
    pub fn discover(path: impl Into<std::path::PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let inner = gix::discover(&path)
            .with_context(|| format!("discovering a git repository at {}", path.display()))?;
        Ok(Self { inner })
    }

    fn to_commit(&self, id: gix::ObjectId) -> anyhow::Result<Commit> {
        let object = self.inner.find_object(id).context("resolving commit object")?;
        let commit = object.try_into_commit().context("object is not a commit")?;
        let message = commit
            .message()
            .map(|m| m.title.to_string())
            .unwrap_or_default();
        let when = commit
            .time()
            .map(|time| {
                Utc.timestamp_opt(time.seconds, 0)
                    .single()
                    .unwrap_or_else(Utc::now)
            })
            .unwrap_or_else(|_| Utc::now());
        let parent_shas = commit
            .parent_ids()
            .map(|id| id.to_string())
            .collect::<Vec<_>>();

        Ok(Commit {
            sha: id.to_string(),
            short_sha: id.to_string().chars().take(7).collect(),
            message,
            when,
            parent_shas,
        })
    }

    fn ancestors(
        &self,
        start: gix::ObjectId,
        stop: Option<&str>,
        first_parent_only: bool,
    ) -> anyhow::Result<Vec<Commit>> {
        let stop_id: Option<gix::ObjectId> = stop.map(|s| s.parse()).transpose()?;
        let mut out = Vec::new();
        let mut platform = self
            .inner
            .rev_walk([start])
            .sorting(gix::revision::walk::Sorting::ByCommitTimeNewestFirst);
        if first_parent_only {
            platform = platform.first_parent_only();
        }
        let walk = platform.all().context("walking commit history")?;

        for info in walk {
            let info = info.context("reading a commit during history walk")?;
            if Some(info.id) == stop_id {
                continue;
            }
            out.push(self.to_commit(info.id)?);
        }
        Ok(out)
    }
}

impl Repository for GixRepository {
    fn head_commit(&self) -> tagver::Result<Option<Commit>> {
        map_err("resolving HEAD", || {
            let mut head = self.inner.head()?;
            match head.try_peel_to_id_in_place() {
                Ok(Some(id)) => Ok(Some(self.to_commit(id.detach())?)),
                Ok(None) => Ok(None),
                Err(e) => Err(anyhow::anyhow!(e)),
            }
        })
    }

    fn is_detached_head(&self) -> tagver::Result<bool> {
        map_err("checking HEAD kind", || {
            Ok(self.inner.head()?.is_detached())
        })
    }

    fn current_branch_name(&self) -> tagver::Result<Option<String>> {
        map_err("reading current branch name", || {
            Ok(self
                .inner
                .head_name()?
                .map(|name| name.shorten().to_string()))
        })
    }

    fn branches(&self) -> tagver::Result<Vec<Branch>> {
        map_err("listing branches", || {
            let mut out = Vec::new();
            let platform = self.inner.references()?;
            for reference in platform.all()?.filter_map(Result::ok) {
                let full_name = reference.name().as_bstr().to_string();
                let is_remote = full_name.starts_with("refs/remotes/");
                if !full_name.starts_with("refs/heads/") && !is_remote {
                    continue;
                }
                let friendly_name = reference.name().shorten().to_string();
                let Some(id) = reference.clone().into_fully_peeled_id().ok() else {
                    continue;
                };
                out.push(Branch {
                    friendly_name,
                    tip_sha: id.to_string(),
                    is_remote,
                });
            }
            Ok(out)
        })
    }

    fn tags(&self) -> tagver::Result<Vec<Tag>> {
        map_err("listing tags", || {
            let mut out = Vec::new();
            let platform = self.inner.references()?;
            for mut reference in platform.tags()?.filter_map(Result::ok) {
                let name = reference.name().shorten().to_string();
                let Ok(id) = reference.peel_to_id_in_place() else {
                    continue;
                };
                out.push(Tag {
                    name,
                    target_sha: id.to_string(),
                });
            }
            Ok(out)
        })
    }

    fn commit_from_sha(&self, sha: &str) -> tagver::Result<Commit> {
        map_err("looking up a commit", || {
            let id: gix::ObjectId = sha.parse().context("parsing commit sha")?;
            self.to_commit(id)
        })
    }

    fn commit_log(
        &self,
        start_sha: &str,
        stop_sha: Option<&str>,
        _path_filter: Option<&[String]>,
    ) -> tagver::Result<Vec<Commit>> {
        map_err("getting commit log", || {
            let start: gix::ObjectId = start_sha.parse().context("parsing start sha")?;
            self.ancestors(start, stop_sha, false)
        })
    }

    fn mainline_commit_log(
        &self,
        start_sha: &str,
        stop_sha: Option<&str>,
        _path_filter: Option<&[String]>,
    ) -> tagver::Result<Vec<Commit>> {
        map_err("getting mainline commit log", || {
            let start: gix::ObjectId = start_sha.parse().context("parsing start sha")?;
            self.ancestors(start, stop_sha, true)
        })
    }

    fn branch_commits(
        &self,
        branch_tip_sha: &str,
        exclude_shas: &[String],
        _path_filter: Option<&[String]>,
    ) -> tagver::Result<Vec<Commit>> {
        map_err("getting branch-exclusive commits", || {
            let tip: gix::ObjectId = branch_tip_sha.parse().context("parsing branch tip sha")?;
            let mut excluded = HashSet::new();
            for sha in exclude_shas {
                let id: gix::ObjectId = sha.parse().context("parsing excluded sha")?;
                excluded.insert(id.to_string());
                for commit in self.ancestors(id, None, false)? {
                    excluded.insert(commit.sha);
                }
            }
            Ok(self
                .ancestors(tip, None, false)?
                .into_iter()
                .filter(|c| !excluded.contains(&c.sha))
                .collect())
        })
    }

    fn commits_prior_to(
        &self,
        start_sha: &str,
        commit_sha: &str,
        _path_filter: Option<&[String]>,
    ) -> tagver::Result<Vec<Commit>> {
        map_err("counting commits prior to a commit", || {
            let start: gix::ObjectId = start_sha.parse().context("parsing start sha")?;
            self.ancestors(start, Some(commit_sha), false)
        })
    }

    fn find_merge_base(&self, left_sha: &str, right_sha: &str) -> tagver::Result<Option<String>> {
        map_err("finding a merge base", || {
            let left: gix::ObjectId = left_sha.parse().context("parsing left sha")?;
            let right: gix::ObjectId = right_sha.parse().context("parsing right sha")?;
            match self.inner.merge_base(left, right) {
                Ok(id) => Ok(Some(id.to_string())),
                Err(_) => Ok(None),
            }
        })
    }

    fn branches_containing_commit(&self, commit_sha: &str) -> tagver::Result<Vec<Branch>> {
        map_err("finding branches containing a commit", || {
            let all = self.branches_inner()?;
            let mut out = Vec::new();
            for branch in all {
                let tip: gix::ObjectId = branch.tip_sha.parse().context("parsing branch tip sha")?;
                let contains = tip.to_string() == commit_sha
                    || self
                        .ancestors(tip, None, false)?
                        .iter()
                        .any(|c| c.sha == commit_sha);
                if contains {
                    out.push(branch);
                }
            }
            Ok(out)
        })
    }

    fn number_of_uncommitted_changes(&self) -> tagver::Result<u32> {
        map_err("counting uncommitted changes", || {
            let status = self.inner.status(gix::progress::Discard)?;
            let count = status
                .into_iter(None)
                .context("iterating working tree status")?
                .filter_map(Result::ok)
                .count();
            Ok(count as u32)
        })
    }

    fn peel_tag_to_commit(&self, tag_name: &str) -> tagver::Result<String> {
        map_err("peeling an annotated tag", || {
            let mut reference = self
                .inner
                .find_reference(&format!("refs/tags/{tag_name}"))
                .with_context(|| format!("tag '{tag_name}' not found"))?;
            let id = reference.peel_to_id_in_place().context("peeling tag reference")?;
            Ok(id.to_string())
        })
    }
}

impl GixRepository {
    fn branches_inner(&self) -> anyhow::Result<Vec<Branch>> {
        let mut out = Vec::new();
        let platform = self.inner.references()?;
        for reference in platform.all()?.filter_map(Result::ok) {
            let full_name = reference.name().as_bstr().to_string();
            let is_remote = full_name.starts_with("refs/remotes/");
            if !full_name.starts_with("refs/heads/") && !is_remote {
                continue;
            }
            let friendly_name = reference.name().shorten().to_string();
            let Ok(id) = reference.clone().into_fully_peeled_id() else {
                continue;
            };
            out.push(Branch {
                friendly_name,
                tip_sha: id.to_string(),
                is_remote,
            });
        }
        Ok(out)
    }
}

fn map_err<T>(operation: &str, f: impl FnOnce() -> anyhow::Result<T>) -> tagver::Result<T> {
    f().map_err(|e| tagver::TagVerError::repository(operation, e))
}
