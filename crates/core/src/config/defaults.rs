//! Built-in defaults: the eight default branch kinds and the global scalar
//! defaults they and any overlay inherit from.

use std::collections::HashMap;

use crate::enums::{
    CommitMessageConvention, CommitMessageIncrementMode, IncrementStrategy, MainlineIncrementMode,
    VersioningMode,
};

use super::{BranchConfig, Ignore, Configuration};

pub const DEFAULT_TAG_PREFIX: &str = "[vV]";
pub const DEFAULT_BASE_VERSION: &str = "0.1.0";
pub const DEFAULT_CD_FALLBACK_TAG: &str = "ci";
pub const DEFAULT_COMMIT_DATE_FORMAT: &str = "yyyy-MM-dd";
pub const DEFAULT_TAG_PRE_RELEASE_WEIGHT: i64 = 60000;
pub const DEFAULT_LEGACY_SEMVER_PADDING: usize = 4;
pub const DEFAULT_BUILD_METADATA_PADDING: usize = 4;
pub const DEFAULT_COMMITS_SINCE_VERSION_SOURCE_PADDING: usize = 4;

pub const DEFAULT_MAJOR_BUMP_MESSAGE: &str = r"(?i)\+semver:\s?(breaking|major)";
pub const DEFAULT_MINOR_BUMP_MESSAGE: &str = r"(?i)\+semver:\s?(feature|minor)";
pub const DEFAULT_PATCH_BUMP_MESSAGE: &str = r"(?i)\+semver:\s?(fix|patch)";
pub const DEFAULT_NO_BUMP_MESSAGE: &str = r"(?i)\+semver:\s?(none|skip)";

/// Produce the built-in configuration: every scalar defaulted and all eight
/// default branch kinds populated. Overlays are applied on top of this by
/// [`super::builder::ConfigurationBuilder`].
pub fn default_configuration() -> Configuration {
    Configuration {
        mode: Some(VersioningMode::ContinuousDelivery),
        tag_prefix: Some(DEFAULT_TAG_PREFIX.to_string()),
        base_version: Some(DEFAULT_BASE_VERSION.to_string()),
        next_version: None,
        increment: Some(IncrementStrategy::Patch),
        continuous_delivery_fallback_tag: Some(DEFAULT_CD_FALLBACK_TAG.to_string()),
        commit_message_incrementing: Some(CommitMessageIncrementMode::Enabled),
        commit_message_convention: Some(CommitMessageConvention::ConventionalCommits),
        major_version_bump_message: Some(DEFAULT_MAJOR_BUMP_MESSAGE.to_string()),
        minor_version_bump_message: Some(DEFAULT_MINOR_BUMP_MESSAGE.to_string()),
        patch_version_bump_message: Some(DEFAULT_PATCH_BUMP_MESSAGE.to_string()),
        no_bump_message: Some(DEFAULT_NO_BUMP_MESSAGE.to_string()),
        commit_date_format: Some(DEFAULT_COMMIT_DATE_FORMAT.to_string()),
        tag_pre_release_weight: Some(DEFAULT_TAG_PRE_RELEASE_WEIGHT),
        legacy_semver_padding: Some(DEFAULT_LEGACY_SEMVER_PADDING),
        build_metadata_padding: Some(DEFAULT_BUILD_METADATA_PADDING),
        commits_since_version_source_padding: Some(DEFAULT_COMMITS_SINCE_VERSION_SOURCE_PADDING),
        mainline_increment: Some(MainlineIncrementMode::Aggregate),
        branches: default_branch_configs(),
        merge_message_formats: HashMap::new(),
        ignore: Ignore::default(),
    }
}

fn branch(
    regex: &str,
    increment: IncrementStrategy,
    tag: &str,
    is_mainline: bool,
    is_release_branch: bool,
    tracks_release_branches: bool,
    prevent_increment_of_merged_branch_version: bool,
    pre_release_weight: i64,
    priority: i64,
    source_branches: &[&str],
) -> BranchConfig {
    BranchConfig {
        regex: Some(regex.to_string()),
        increment: Some(increment),
        mode: None,
        tag: Some(tag.to_string()),
        source_branches: Some(source_branches.iter().map(|s| s.to_string()).collect()),
        is_source_branch_for: None,
        is_mainline: Some(is_mainline),
        is_release_branch: Some(is_release_branch),
        tracks_release_branches: Some(tracks_release_branches),
        prevent_increment_of_merged_branch_version: Some(
            prevent_increment_of_merged_branch_version,
        ),
        track_merge_target: Some(false),
        tag_number_pattern: None,
        commit_message_incrementing: None,
        pre_release_weight: Some(pre_release_weight),
        priority: Some(priority),
    }
}

/// The eight named branch kinds, with the regexes, priorities, and flags
/// from the design's default branch table.
pub fn default_branch_configs() -> HashMap<String, BranchConfig> {
    let mut branches = HashMap::new();

    branches.insert(
        "main".to_string(),
        branch(
            r"^master$|^main$",
            IncrementStrategy::Patch,
            "",
            true,
            false,
            false,
            true,
            55000,
            100,
            &[],
        ),
    );
    branches.insert(
        "develop".to_string(),
        branch(
            r"^dev(elop)?(ment)?$",
            IncrementStrategy::Minor,
            "alpha",
            false,
            false,
            true,
            false,
            0,
            60,
            &["main"],
        ),
    );
    branches.insert(
        "release".to_string(),
        branch(
            r"^releases?[/-]",
            IncrementStrategy::None,
            "beta",
            false,
            true,
            false,
            true,
            30000,
            90,
            &["develop", "main"],
        ),
    );
    branches.insert(
        "feature".to_string(),
        branch(
            r"^features?[/-]",
            IncrementStrategy::Inherit,
            "{BranchName}",
            false,
            false,
            false,
            false,
            30000,
            50,
            &["develop", "main", "release", "feature", "hotfix", "support"],
        ),
    );
    branches.insert(
        "hotfix".to_string(),
        branch(
            r"^hotfix(es)?[/-]",
            IncrementStrategy::Patch,
            "beta",
            false,
            false,
            false,
            false,
            30000,
            80,
            &["main", "support"],
        ),
    );
    branches.insert(
        "pull-request".to_string(),
        branch(
            r"^(pull|pull-requests|pr)[/-]",
            IncrementStrategy::Inherit,
            "PullRequest",
            false,
            false,
            false,
            false,
            30000,
            40,
            &["develop", "main", "release", "feature", "hotfix", "support"],
        ),
    );
    branches.insert(
        "support".to_string(),
        branch(
            r"^support[/-]",
            IncrementStrategy::Patch,
            "",
            true,
            false,
            false,
            true,
            55000,
            70,
            &["main"],
        ),
    );
    branches.insert(
        "unknown".to_string(),
        branch(
            r".*",
            IncrementStrategy::Inherit,
            "{BranchName}",
            false,
            false,
            false,
            false,
            30000,
            0,
            &["main", "develop"],
        ),
    );

    branches
}
