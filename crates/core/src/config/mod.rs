//! Layered, overlay-merged configuration.
//!
//! [`Configuration`] mirrors the YAML schema directly (every scalar is
//! `Option`-shaped: "optional to mean inherit") and can be built from a
//! chain of overlays via [`builder::ConfigurationBuilder`]. Once built and
//! validated, [`Configuration::effective_configuration_for`] projects the
//! fully-resolved, non-optional [`EffectiveConfiguration`] for one branch.

mod builder;
pub mod defaults;

pub use builder::ConfigurationBuilder;

use std::collections::HashMap;

use regex::Regex;
use serde::Deserialize;

use crate::enums::{
    CommitMessageConvention, CommitMessageIncrementMode, IncrementStrategy, MainlineIncrementMode,
    VersioningMode,
};
use crate::error::{Result, TagVerError};

/// Top-level configuration document. Every field is optional so overlays can
/// replace only what they set; see [`ConfigurationBuilder`] for merge rules.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Configuration {
    pub mode: Option<VersioningMode>,
    pub tag_prefix: Option<String>,
    pub base_version: Option<String>,
    pub next_version: Option<String>,
    pub increment: Option<IncrementStrategy>,
    pub continuous_delivery_fallback_tag: Option<String>,
    pub commit_message_incrementing: Option<CommitMessageIncrementMode>,
    pub commit_message_convention: Option<CommitMessageConvention>,
    pub major_version_bump_message: Option<String>,
    pub minor_version_bump_message: Option<String>,
    pub patch_version_bump_message: Option<String>,
    pub no_bump_message: Option<String>,
    pub commit_date_format: Option<String>,
    pub tag_pre_release_weight: Option<i64>,
    pub legacy_semver_padding: Option<usize>,
    pub build_metadata_padding: Option<usize>,
    pub commits_since_version_source_padding: Option<usize>,
    pub mainline_increment: Option<MainlineIncrementMode>,
    #[serde(default)]
    pub branches: HashMap<String, BranchConfig>,
    #[serde(default)]
    pub merge_message_formats: HashMap<String, String>,
    #[serde(default)]
    pub ignore: Ignore,
}

/// Per-branch overlay-able rules. See the data model's `BranchConfig`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BranchConfig {
    pub regex: Option<String>,
    pub increment: Option<IncrementStrategy>,
    pub mode: Option<VersioningMode>,
    pub tag: Option<String>,
    pub source_branches: Option<Vec<String>>,
    pub is_source_branch_for: Option<Vec<String>>,
    pub is_mainline: Option<bool>,
    pub is_release_branch: Option<bool>,
    pub tracks_release_branches: Option<bool>,
    pub prevent_increment_of_merged_branch_version: Option<bool>,
    pub track_merge_target: Option<bool>,
    pub tag_number_pattern: Option<String>,
    pub commit_message_incrementing: Option<CommitMessageIncrementMode>,
    pub pre_release_weight: Option<i64>,
    pub priority: Option<i64>,
}

/// `ignore.commits-before` + `ignore.sha`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Ignore {
    #[serde(default, with = "ignore_date")]
    pub commits_before: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub sha: Vec<String>,
}

/// Accepts RFC3339, `YYYY-MM-DDTHH:MM:SS`, or `YYYY-MM-DD`.
mod ignore_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => parse(&s)
                .map(Some)
                .map_err(|e| serde::de::Error::custom(e.to_string())),
        }
    }

    pub fn parse(s: &str) -> crate::error::Result<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
            return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            let naive = date
                .and_hms_opt(0, 0, 0)
                .expect("midnight is always a valid time");
            return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
        Err(crate::error::TagVerError::ConfigInvalid(format!(
            "invalid ignore.commits-before date: {s}"
        )))
    }
}

/// Fully-resolved, non-optional configuration for one branch. Produced by
/// [`Configuration::effective_configuration_for`].
#[derive(Debug, Clone)]
pub struct EffectiveConfiguration {
    pub branch_key: String,
    pub regex: Regex,
    pub increment: IncrementStrategy,
    pub mode: VersioningMode,
    pub tag: String,
    pub source_branches: Vec<String>,
    pub is_source_branch_for: Vec<String>,
    pub is_mainline: bool,
    pub is_release_branch: bool,
    pub tracks_release_branches: bool,
    pub prevent_increment_of_merged_branch_version: bool,
    pub track_merge_target: bool,
    pub tag_number_pattern: Option<Regex>,
    pub commit_message_incrementing: CommitMessageIncrementMode,
    pub pre_release_weight: i64,
    pub priority: i64,

    // Global scalars, carried alongside the branch projection for the
    // calculator and formatter's convenience.
    pub tag_prefix: Regex,
    pub base_version: String,
    pub next_version: Option<String>,
    pub continuous_delivery_fallback_tag: String,
    pub commit_message_convention: CommitMessageConvention,
    pub major_version_bump_message: String,
    pub minor_version_bump_message: String,
    pub patch_version_bump_message: String,
    pub no_bump_message: String,
    pub commit_date_format: String,
    pub legacy_semver_padding: usize,
    pub build_metadata_padding: usize,
    pub commits_since_version_source_padding: usize,
    pub mainline_increment: MainlineIncrementMode,
    pub merge_message_formats: Vec<(String, String)>,
    pub ignore: Ignore,
}

impl Configuration {
    /// Start a builder seeded with the built-in defaults.
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// Parse a single YAML document as one overlay layer.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Over all configured branches whose regex matches `friendly_branch_name`,
    /// pick the one with the highest priority; tie-break by branch key
    /// ascending for determinism.
    pub fn match_branch_key(&self, friendly_branch_name: &str) -> Result<Option<String>> {
        let mut best: Option<(&str, i64)> = None;
        for (key, branch) in &self.branches {
            let pattern = branch.regex.as_deref().ok_or_else(|| {
                TagVerError::ConfigInvalid(format!("branch '{key}' has no regex"))
            })?;
            let re = Regex::new(pattern).map_err(|e| {
                TagVerError::ConfigInvalid(format!("branch '{key}' regex '{pattern}': {e}"))
            })?;
            if !re.is_match(friendly_branch_name) {
                continue;
            }
            let priority = branch.priority.unwrap_or(0);
            best = match best {
                Some((best_key, best_priority))
                    if best_priority > priority
                        || (best_priority == priority && best_key < key.as_str()) =>
                {
                    Some((best_key, best_priority))
                }
                _ => Some((key.as_str(), priority)),
            };
        }
        Ok(best.map(|(key, _)| key.to_string()))
    }

    /// Project the fully-resolved configuration for a single branch.
    pub fn effective_configuration_for(&self, branch_key: &str) -> Result<EffectiveConfiguration> {
        let default_branch = BranchConfig::default();
        let branch = self.branches.get(branch_key).unwrap_or(&default_branch);

        let pattern = branch
            .regex
            .clone()
            .ok_or_else(|| TagVerError::ConfigInvalid(format!("branch '{branch_key}' has no regex")))?;
        let regex = Regex::new(&pattern)
            .map_err(|e| TagVerError::ConfigInvalid(format!("branch '{branch_key}' regex '{pattern}': {e}")))?;

        let tag_prefix_pattern = self
            .tag_prefix
            .clone()
            .unwrap_or_else(|| defaults::DEFAULT_TAG_PREFIX.to_string());
        let tag_prefix = Regex::new(&tag_prefix_pattern)
            .map_err(|e| TagVerError::ConfigInvalid(format!("tag-prefix '{tag_prefix_pattern}': {e}")))?;

        let global_mode = self.mode.unwrap_or(VersioningMode::ContinuousDelivery);
        let mode = branch.mode.unwrap_or_else(|| {
            if branch_key == "develop" && global_mode != VersioningMode::Mainline {
                VersioningMode::ContinuousDeployment
            } else {
                global_mode
            }
        });

        let global_increment = self.increment.unwrap_or(IncrementStrategy::Patch);
        let increment = branch.increment.unwrap_or(global_increment);

        let global_cmi = self
            .commit_message_incrementing
            .unwrap_or(CommitMessageIncrementMode::Enabled);
        let commit_message_incrementing = branch.commit_message_incrementing.unwrap_or(global_cmi);

        let tag_number_pattern = branch
            .tag_number_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| TagVerError::ConfigInvalid(format!("tag-number-pattern: {e}")))?;

        let mut merge_message_formats: Vec<(String, String)> = self
            .merge_message_formats
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        merge_message_formats.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(EffectiveConfiguration {
            branch_key: branch_key.to_string(),
            regex,
            increment,
            mode,
            tag: branch
                .tag
                .clone()
                .unwrap_or_else(|| "{BranchName}".to_string()),
            source_branches: branch.source_branches.clone().unwrap_or_default(),
            is_source_branch_for: branch.is_source_branch_for.clone().unwrap_or_default(),
            is_mainline: branch.is_mainline.unwrap_or(false),
            is_release_branch: branch.is_release_branch.unwrap_or(false),
            tracks_release_branches: branch.tracks_release_branches.unwrap_or(false),
            prevent_increment_of_merged_branch_version: branch
                .prevent_increment_of_merged_branch_version
                .unwrap_or(false),
            track_merge_target: branch.track_merge_target.unwrap_or(false),
            tag_number_pattern,
            commit_message_incrementing,
            pre_release_weight: branch
                .pre_release_weight
                .unwrap_or(defaults::DEFAULT_TAG_PRE_RELEASE_WEIGHT),
            priority: branch.priority.unwrap_or(0),

            tag_prefix,
            base_version: self
                .base_version
                .clone()
                .unwrap_or_else(|| defaults::DEFAULT_BASE_VERSION.to_string()),
            next_version: self.next_version.clone(),
            continuous_delivery_fallback_tag: self
                .continuous_delivery_fallback_tag
                .clone()
                .unwrap_or_else(|| defaults::DEFAULT_CD_FALLBACK_TAG.to_string()),
            commit_message_convention: self
                .commit_message_convention
                .unwrap_or(CommitMessageConvention::ConventionalCommits),
            major_version_bump_message: self
                .major_version_bump_message
                .clone()
                .unwrap_or_else(|| defaults::DEFAULT_MAJOR_BUMP_MESSAGE.to_string()),
            minor_version_bump_message: self
                .minor_version_bump_message
                .clone()
                .unwrap_or_else(|| defaults::DEFAULT_MINOR_BUMP_MESSAGE.to_string()),
            patch_version_bump_message: self
                .patch_version_bump_message
                .clone()
                .unwrap_or_else(|| defaults::DEFAULT_PATCH_BUMP_MESSAGE.to_string()),
            no_bump_message: self
                .no_bump_message
                .clone()
                .unwrap_or_else(|| defaults::DEFAULT_NO_BUMP_MESSAGE.to_string()),
            commit_date_format: self
                .commit_date_format
                .clone()
                .unwrap_or_else(|| defaults::DEFAULT_COMMIT_DATE_FORMAT.to_string()),
            legacy_semver_padding: self
                .legacy_semver_padding
                .unwrap_or(defaults::DEFAULT_LEGACY_SEMVER_PADDING),
            build_metadata_padding: self
                .build_metadata_padding
                .unwrap_or(defaults::DEFAULT_BUILD_METADATA_PADDING),
            commits_since_version_source_padding: self
                .commits_since_version_source_padding
                .unwrap_or(defaults::DEFAULT_COMMITS_SINCE_VERSION_SOURCE_PADDING),
            mainline_increment: self
                .mainline_increment
                .unwrap_or(MainlineIncrementMode::Aggregate),
            merge_message_formats,
            ignore: self.ignore.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_branch_key_prefers_highest_priority() {
        let config = Configuration::builder().build().unwrap();
        assert_eq!(
            config.match_branch_key("main").unwrap().as_deref(),
            Some("main")
        );
        assert_eq!(
            config.match_branch_key("develop").unwrap().as_deref(),
            Some("develop")
        );
        assert_eq!(
            config.match_branch_key("feature/foo").unwrap().as_deref(),
            Some("feature")
        );
        // everything else falls through to the catch-all
        assert_eq!(
            config.match_branch_key("whatever").unwrap().as_deref(),
            Some("unknown")
        );
    }

    #[test]
    fn effective_configuration_resolves_develop_to_continuous_deployment() {
        let config = Configuration::builder().build().unwrap();
        let effective = config.effective_configuration_for("develop").unwrap();
        assert_eq!(effective.mode, VersioningMode::ContinuousDeployment);
    }

    #[test]
    fn every_branch_regex_compiles_after_build() {
        let config = Configuration::builder().build().unwrap();
        for key in config.branches.keys() {
            let effective = config.effective_configuration_for(key).unwrap();
            assert!(effective.regex.as_str().len() >= 0);
        }
    }
}
