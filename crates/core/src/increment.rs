//! Scans a commit range for an increment hint under the configured
//! commit-message convention.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EffectiveConfiguration;
use crate::enums::{CommitMessageConvention, CommitMessageIncrementMode, VersionField};
use crate::git::Commit;

static CONVENTIONAL_COMMIT_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<type>\w+)(\([^)]*\))?(?P<bang>!)?:\s").unwrap());
static BREAKING_CHANGE_FOOTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^BREAKING[ -]CHANGE:\s").unwrap());

fn conventional_commits_field(message: &str) -> VersionField {
    let Some(captures) = CONVENTIONAL_COMMIT_HEADER.captures(message) else {
        return VersionField::None;
    };
    if captures.name("bang").is_some() || BREAKING_CHANGE_FOOTER.is_match(message) {
        return VersionField::Major;
    }
    match &captures["type"] {
        "feat" => VersionField::Minor,
        "fix" => VersionField::Patch,
        _ => VersionField::None,
    }
}

fn bump_directive_field(message: &str, config: &EffectiveConfiguration) -> VersionField {
    let matches = |pattern: &str| Regex::new(pattern).map(|re| re.is_match(message)).unwrap_or(false);
    if matches(&config.major_version_bump_message) {
        VersionField::Major
    } else if matches(&config.minor_version_bump_message) {
        VersionField::Minor
    } else if matches(&config.patch_version_bump_message) {
        VersionField::Patch
    } else {
        VersionField::None
    }
}

pub(crate) fn commit_field(message: &str, config: &EffectiveConfiguration) -> VersionField {
    match config.commit_message_convention {
        CommitMessageConvention::ConventionalCommits => conventional_commits_field(message),
        CommitMessageConvention::BumpDirective => bump_directive_field(message, config),
        CommitMessageConvention::Both => {
            conventional_commits_field(message).max(bump_directive_field(message, config))
        }
    }
}

/// Determine the increment field implied by `commits` (exclusive of the
/// base-version source, inclusive of the current commit), applying the
/// branch-default fallback and pre-1.0 cap described by the calculator.
pub fn determine_increment(
    commits: &[Commit],
    config: &EffectiveConfiguration,
    should_increment: bool,
    version_major_is_zero: bool,
) -> VersionField {
    if config.commit_message_incrementing == CommitMessageIncrementMode::Disabled {
        return branch_default(config, should_increment);
    }

    let mut field = VersionField::None;
    for commit in commits {
        if config.commit_message_incrementing == CommitMessageIncrementMode::MergeMessageOnly
            && !commit.is_merge()
        {
            continue;
        }
        field = field.max(commit_field(&commit.message, config));
    }

    if version_major_is_zero && field == VersionField::Major {
        field = VersionField::Minor;
    }

    if should_increment {
        let default_field = config.increment.branch_default_field();
        if field < default_field {
            field = default_field;
        }
    }

    field
}

pub(crate) fn branch_default(config: &EffectiveConfiguration, should_increment: bool) -> VersionField {
    if should_increment {
        config.increment.branch_default_field()
    } else {
        VersionField::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;

    fn config() -> EffectiveConfiguration {
        Configuration::builder()
            .build()
            .unwrap()
            .effective_configuration_for("main")
            .unwrap()
    }

    fn commit(message: &str) -> Commit {
        Commit {
            sha: "x".to_string(),
            short_sha: "x".to_string(),
            message: message.to_string(),
            when: chrono::Utc::now(),
            parent_shas: vec![],
        }
    }

    #[test]
    fn conventional_commit_bang_is_major() {
        assert_eq!(conventional_commits_field("feat!: rewrite"), VersionField::Major);
    }

    #[test]
    fn breaking_change_footer_is_major() {
        let msg = "fix: small change\n\nBREAKING CHANGE: reworks the API";
        assert_eq!(conventional_commits_field(msg), VersionField::Major);
    }

    #[test]
    fn feat_is_minor_fix_is_patch() {
        assert_eq!(conventional_commits_field("feat: add thing"), VersionField::Minor);
        assert_eq!(conventional_commits_field("fix: bug"), VersionField::Patch);
    }

    #[test]
    fn other_types_are_none() {
        assert_eq!(conventional_commits_field("chore: tidy"), VersionField::None);
    }

    #[test]
    fn pre_one_major_is_capped_to_minor() {
        let commits = vec![commit("feat!: rewrite")];
        let field = determine_increment(&commits, &config(), false, true);
        assert_eq!(field, VersionField::Minor);
    }

    #[test]
    fn should_increment_raises_to_branch_default() {
        let commits: Vec<Commit> = vec![];
        let field = determine_increment(&commits, &config(), true, false);
        assert_eq!(field, config().increment.branch_default_field());
    }

    #[test]
    fn disabled_mode_ignores_commit_messages() {
        let mut cfg = config();
        cfg.commit_message_incrementing = CommitMessageIncrementMode::Disabled;
        let commits = vec![commit("feat!: rewrite")];
        assert_eq!(determine_increment(&commits, &cfg, false, false), VersionField::None);
    }
}
