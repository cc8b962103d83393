//! Overlay-merge configuration builder.
//!
//! Layers are applied in the order they're added: built-in defaults first,
//! then each `with_overlay` call in turn. Every `Option` field present in a
//! later layer replaces the prior layer's value; branch maps and merge
//! message formats merge key-by-key rather than replacing wholesale.

use std::collections::HashMap;

use crate::error::Result;

use super::{defaults, BranchConfig, Configuration, Ignore};

#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    layers: Vec<Configuration>,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self {
            layers: vec![defaults::default_configuration()],
        }
    }

    /// Queue an overlay on top of whatever has been applied so far.
    pub fn with_overlay(mut self, overlay: Configuration) -> Self {
        self.layers.push(overlay);
        self
    }

    /// Parse and queue a YAML document as an overlay.
    pub fn with_yaml_overlay(self, yaml: &str) -> Result<Self> {
        let overlay = Configuration::from_yaml_str(yaml)?;
        Ok(self.with_overlay(overlay))
    }

    /// Merge every queued layer and validate the result.
    pub fn build(self) -> Result<Configuration> {
        let mut merged = Configuration::default();
        for layer in self.layers {
            merged = merge(merged, layer);
        }
        apply_inverse_source_branches(&mut merged);
        validate(&merged)?;
        Ok(merged)
    }
}

fn merge(base: Configuration, overlay: Configuration) -> Configuration {
    let mut branches = base.branches;
    for (key, overlay_branch) in overlay.branches {
        branches
            .entry(key)
            .and_modify(|existing| *existing = merge_branch(existing.clone(), overlay_branch.clone()))
            .or_insert(overlay_branch);
    }

    let mut merge_message_formats = base.merge_message_formats;
    merge_message_formats.extend(overlay.merge_message_formats);

    let ignore = merge_ignore(base.ignore, overlay.ignore);

    Configuration {
        mode: overlay.mode.or(base.mode),
        tag_prefix: overlay.tag_prefix.or(base.tag_prefix),
        base_version: overlay.base_version.or(base.base_version),
        next_version: overlay.next_version.or(base.next_version),
        increment: overlay.increment.or(base.increment),
        continuous_delivery_fallback_tag: overlay
            .continuous_delivery_fallback_tag
            .or(base.continuous_delivery_fallback_tag),
        commit_message_incrementing: overlay
            .commit_message_incrementing
            .or(base.commit_message_incrementing),
        commit_message_convention: overlay
            .commit_message_convention
            .or(base.commit_message_convention),
        major_version_bump_message: overlay
            .major_version_bump_message
            .or(base.major_version_bump_message),
        minor_version_bump_message: overlay
            .minor_version_bump_message
            .or(base.minor_version_bump_message),
        patch_version_bump_message: overlay
            .patch_version_bump_message
            .or(base.patch_version_bump_message),
        no_bump_message: overlay.no_bump_message.or(base.no_bump_message),
        commit_date_format: overlay.commit_date_format.or(base.commit_date_format),
        tag_pre_release_weight: overlay.tag_pre_release_weight.or(base.tag_pre_release_weight),
        legacy_semver_padding: overlay.legacy_semver_padding.or(base.legacy_semver_padding),
        build_metadata_padding: overlay.build_metadata_padding.or(base.build_metadata_padding),
        commits_since_version_source_padding: overlay
            .commits_since_version_source_padding
            .or(base.commits_since_version_source_padding),
        mainline_increment: overlay.mainline_increment.or(base.mainline_increment),
        branches,
        merge_message_formats,
        ignore,
    }
}

fn merge_branch(base: BranchConfig, overlay: BranchConfig) -> BranchConfig {
    BranchConfig {
        regex: overlay.regex.or(base.regex),
        increment: overlay.increment.or(base.increment),
        mode: overlay.mode.or(base.mode),
        tag: overlay.tag.or(base.tag),
        source_branches: overlay.source_branches.or(base.source_branches),
        is_source_branch_for: overlay.is_source_branch_for.or(base.is_source_branch_for),
        is_mainline: overlay.is_mainline.or(base.is_mainline),
        is_release_branch: overlay.is_release_branch.or(base.is_release_branch),
        tracks_release_branches: overlay
            .tracks_release_branches
            .or(base.tracks_release_branches),
        prevent_increment_of_merged_branch_version: overlay
            .prevent_increment_of_merged_branch_version
            .or(base.prevent_increment_of_merged_branch_version),
        track_merge_target: overlay.track_merge_target.or(base.track_merge_target),
        tag_number_pattern: overlay.tag_number_pattern.or(base.tag_number_pattern),
        commit_message_incrementing: overlay
            .commit_message_incrementing
            .or(base.commit_message_incrementing),
        pre_release_weight: overlay.pre_release_weight.or(base.pre_release_weight),
        priority: overlay.priority.or(base.priority),
    }
}

fn merge_ignore(base: Ignore, overlay: Ignore) -> Ignore {
    let mut sha = base.sha;
    for entry in overlay.sha {
        if !sha.contains(&entry) {
            sha.push(entry);
        }
    }
    Ignore {
        commits_before: overlay.commits_before.or(base.commits_before),
        sha,
    }
}

/// Resolve the inverse `is-source-branch-for` relationship: for every branch
/// that names itself in another branch's `is-source-branch-for`, make sure
/// that other branch is also listed in this branch's `source-branches`.
fn apply_inverse_source_branches(config: &mut Configuration) {
    let mut additions: HashMap<String, Vec<String>> = HashMap::new();
    for (key, branch) in &config.branches {
        if let Some(targets) = &branch.is_source_branch_for {
            for target in targets {
                additions.entry(target.clone()).or_default().push(key.clone());
            }
        }
    }
    for (target, sources) in additions {
        if let Some(branch) = config.branches.get_mut(&target) {
            let existing = branch.source_branches.get_or_insert_with(Vec::new);
            for source in sources {
                if !existing.contains(&source) {
                    existing.push(source);
                }
            }
        }
    }
}

fn validate(config: &Configuration) -> Result<()> {
    for key in config.branches.keys() {
        config.effective_configuration_for(key)?;
    }

    if let Some(tag_prefix) = &config.tag_prefix {
        regex::Regex::new(tag_prefix).map_err(|e| {
            crate::error::TagVerError::ConfigInvalid(format!("tag-prefix '{tag_prefix}': {e}"))
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::IncrementStrategy;

    #[test]
    fn overlay_replaces_scalar_but_keeps_unset_siblings() {
        let overlay = Configuration {
            increment: Some(IncrementStrategy::Major),
            ..Configuration::default()
        };
        let config = ConfigurationBuilder::new()
            .with_overlay(overlay)
            .build()
            .unwrap();
        assert_eq!(config.increment, Some(IncrementStrategy::Major));
        assert_eq!(
            config.mode,
            Some(crate::enums::VersioningMode::ContinuousDelivery)
        );
    }

    #[test]
    fn overlay_merges_branch_fields_rather_than_replacing_wholesale() {
        let mut branches = HashMap::new();
        branches.insert(
            "main".to_string(),
            BranchConfig {
                tag: Some("custom".to_string()),
                ..BranchConfig::default()
            },
        );
        let overlay = Configuration {
            branches,
            ..Configuration::default()
        };
        let config = ConfigurationBuilder::new()
            .with_overlay(overlay)
            .build()
            .unwrap();
        let main = &config.branches["main"];
        assert_eq!(main.tag.as_deref(), Some("custom"));
        // regex survives from the default layer even though the overlay
        // only set `tag`.
        assert!(main.regex.is_some());
    }

    #[test]
    fn invalid_regex_overlay_fails_validation() {
        let mut branches = HashMap::new();
        branches.insert(
            "main".to_string(),
            BranchConfig {
                regex: Some("(".to_string()),
                ..BranchConfig::default()
            },
        );
        let overlay = Configuration {
            branches,
            ..Configuration::default()
        };
        let result = ConfigurationBuilder::new().with_overlay(overlay).build();
        assert!(result.is_err());
    }
}
