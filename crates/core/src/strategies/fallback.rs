use crate::config::{Configuration, EffectiveConfiguration};
use crate::context::Context;
use crate::error::Result;
use crate::git::Repository;
use crate::version::SemanticVersion;

use super::{BaseVersion, Strategy};

/// Always yields exactly one candidate from the configured base version,
/// anchored to the root commit of the current branch.
pub struct Fallback;

impl Strategy for Fallback {
    fn name(&self) -> &'static str {
        "Fallback"
    }

    fn base_versions(
        &self,
        repo: &dyn Repository,
        context: &Context,
        _full_config: &Configuration,
        effective: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        let ancestry = repo.commit_log(&context.current_branch_tip_sha, None, None)?;
        let root_commit = ancestry
            .last()
            .cloned()
            .unwrap_or_else(|| context.current_commit.clone());

        let version = SemanticVersion::parse(&effective.base_version, None)
            .unwrap_or_else(|_| SemanticVersion::new(0, 1, 0));

        Ok(vec![BaseVersion {
            source: "Fallback base version".to_string(),
            version,
            should_increment: false,
            source_commit: Some(root_commit),
            branch_name_override: None,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration as Cfg;
    use crate::git::testing::FakeRepository;
    use crate::git::Commit;
    use std::collections::HashMap;

    #[test]
    fn always_yields_one_candidate() {
        let mut commits = HashMap::new();
        commits.insert(
            "c1".to_string(),
            Commit {
                sha: "c1".to_string(),
                short_sha: "c1".to_string(),
                message: "init".to_string(),
                when: chrono::Utc::now(),
                parent_shas: vec![],
            },
        );
        let repo = FakeRepository {
            commits,
            ..Default::default()
        };
        let full = Cfg::builder().build().unwrap();
        let effective = full.effective_configuration_for("main").unwrap();
        let context = Context {
            current_branch_friendly_name: "main".to_string(),
            current_branch_tip_sha: "c1".to_string(),
            current_commit: repo.commits["c1"].clone(),
            is_current_commit_tagged: false,
            current_commit_tagged_version: None,
            number_of_uncommitted_changes: 0,
        };
        let candidates = Fallback.base_versions(&repo, &context, &full, &effective).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].version.semver(), "0.1.0");
    }
}
