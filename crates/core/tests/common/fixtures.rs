//! A small fluent builder over `tagver`'s in-memory `FakeRepository`, used
//! by this crate's black-box integration tests to build commit/branch/tag
//! scenarios without touching a real git repository.

#![allow(dead_code)]

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use tagver::git::testing::FakeRepository;
use tagver::{Branch, Commit, Tag};

pub struct RepoBuilder {
    commits: HashMap<String, Commit>,
    branch_tips: HashMap<String, String>,
    remote_branches: Vec<String>,
    tags: Vec<Tag>,
    current_branch: String,
    counter: usize,
}

impl RepoBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            commits: HashMap::new(),
            branch_tips: HashMap::new(),
            remote_branches: Vec::new(),
            tags: Vec::new(),
            current_branch: "main".to_string(),
            counter: 0,
        };
        builder.branch_tips.insert("main".to_string(), String::new());
        builder
    }

    fn next_sha(&mut self) -> String {
        self.counter += 1;
        format!("c{}", self.counter)
    }

    fn tip(&self) -> Option<String> {
        self.branch_tips
            .get(&self.current_branch)
            .filter(|s| !s.is_empty())
            .cloned()
    }

    pub fn commit(&mut self, message: &str) -> &mut Self {
        let sha = self.next_sha();
        let parent = self.tip();
        let when = Utc.timestamp_opt(1_700_000_000 + self.counter as i64 * 60, 0).unwrap();
        self.commits.insert(
            sha.clone(),
            Commit {
                sha: sha.clone(),
                short_sha: sha.clone(),
                message: message.to_string(),
                when,
                parent_shas: parent.into_iter().collect(),
            },
        );
        self.branch_tips.insert(self.current_branch.clone(), sha);
        self
    }

    pub fn tag(&mut self, name: &str) -> &mut Self {
        let target_sha = self.tip().expect("cannot tag before any commit");
        self.tags.push(Tag {
            name: name.to_string(),
            target_sha,
        });
        self
    }

    pub fn branch(&mut self, name: &str) -> &mut Self {
        let tip = self.tip().unwrap_or_default();
        self.branch_tips.insert(name.to_string(), tip);
        self.current_branch = name.to_string();
        self
    }

    pub fn checkout(&mut self, name: &str) -> &mut Self {
        assert!(
            self.branch_tips.contains_key(name),
            "checkout of unknown branch '{name}'"
        );
        self.current_branch = name.to_string();
        self
    }

    pub fn mark_remote(&mut self, name: &str) -> &mut Self {
        self.remote_branches.push(name.to_string());
        self
    }

    pub fn merge(&mut self, other_branch: &str) -> &mut Self {
        let sha = self.next_sha();
        let own_tip = self.tip();
        let other_tip = self
            .branch_tips
            .get(other_branch)
            .filter(|s| !s.is_empty())
            .cloned()
            .expect("merge source branch has no commits");
        let when = Utc.timestamp_opt(1_700_000_000 + self.counter as i64 * 60, 0).unwrap();
        let parent_shas = own_tip.into_iter().chain(std::iter::once(other_tip)).collect();
        self.commits.insert(
            sha.clone(),
            Commit {
                sha: sha.clone(),
                short_sha: sha.clone(),
                message: format!("Merge branch '{other_branch}' into {}", self.current_branch),
                when,
                parent_shas,
            },
        );
        self.branch_tips.insert(self.current_branch.clone(), sha);
        self
    }

    pub fn tip_sha(&self) -> String {
        self.tip().expect("repository has no commits yet")
    }

    pub fn build(&self) -> FakeRepository {
        let branches = self
            .branch_tips
            .iter()
            .filter(|(_, tip)| !tip.is_empty())
            .map(|(name, tip)| Branch {
                friendly_name: name.clone(),
                tip_sha: tip.clone(),
                is_remote: self.remote_branches.contains(name),
            })
            .collect();

        FakeRepository {
            commits: self.commits.clone(),
            head_sha: self.tip(),
            detached: false,
            current_branch: Some(self.current_branch.clone()),
            branches,
            tags: self.tags.clone(),
            uncommitted_changes: 0,
        }
    }
}
