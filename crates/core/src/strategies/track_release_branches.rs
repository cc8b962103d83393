use crate::config::{Configuration, EffectiveConfiguration};
use crate::context::Context;
use crate::error::Result;
use crate::git::Repository;
use crate::repository_store::RepositoryStore;

use super::{release_branch_friendly_names, tagged_commit::TaggedCommit, BaseVersion, Strategy};

/// Active on branches (typically `develop`) that track release branches:
/// surfaces versions from release branches not yet merged back, plus
/// whatever's tagged on the main branch.
pub struct TrackReleaseBranches;

impl Strategy for TrackReleaseBranches {
    fn name(&self) -> &'static str {
        "TrackReleaseBranches"
    }

    fn base_versions(
        &self,
        repo: &dyn Repository,
        context: &Context,
        full_config: &Configuration,
        effective: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        if !effective.tracks_release_branches {
            return Ok(vec![]);
        }

        let store = RepositoryStore::new(repo);
        let mut candidates = Vec::new();

        for release_branch_name in release_branch_friendly_names(repo, full_config)? {
            let Some(release_branch) = store.find_branch(&release_branch_name)? else {
                continue;
            };
            let Some(merge_base) =
                repo.find_merge_base(&context.current_branch_tip_sha, &release_branch.tip_sha)?
            else {
                continue;
            };
            if merge_base == context.current_commit.sha {
                continue;
            }

            let Some(key) = full_config.match_branch_key(&release_branch.friendly_name)? else {
                continue;
            };
            let release_effective = full_config.effective_configuration_for(&key)?;
            let Some(version) = crate::merge_message::extract_version_from_branch_name(
                &release_branch.friendly_name,
                &release_effective.tag_prefix,
            ) else {
                continue;
            };

            let source_commit = repo.commit_from_sha(&merge_base)?;
            candidates.push(BaseVersion {
                source: format!("Release branch exists -> {}", release_branch.friendly_name),
                version,
                should_increment: true,
                source_commit: Some(source_commit),
                branch_name_override: Some(String::new()),
            });
        }

        if let Some(main_branch) = store.find_mainline_branch(full_config)? {
            if let Some(main_key) = full_config.match_branch_key(&main_branch.friendly_name)? {
                let main_effective = full_config.effective_configuration_for(&main_key)?;
                let main_context = Context {
                    current_branch_friendly_name: main_branch.friendly_name.clone(),
                    current_branch_tip_sha: main_branch.tip_sha.clone(),
                    current_commit: repo.commit_from_sha(&main_branch.tip_sha)?,
                    is_current_commit_tagged: false,
                    current_commit_tagged_version: None,
                    number_of_uncommitted_changes: 0,
                };
                let mut main_candidates = TaggedCommit.base_versions(
                    repo,
                    &main_context,
                    full_config,
                    &main_effective,
                )?;
                candidates.append(&mut main_candidates);
            }
        }

        Ok(candidates)
    }
}
