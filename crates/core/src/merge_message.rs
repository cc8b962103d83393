//! The fixed merge-message regex catalog and version-from-branch-name
//! extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::version::SemanticVersion;

/// What a merge-message regex yielded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeMessageMatch {
    pub merged_branch: String,
    pub target_branch: Option<String>,
    pub pull_request_number: Option<String>,
    pub is_merged_pull_request: bool,
}

struct NamedPattern {
    name: &'static str,
    regex: Regex,
}

fn default_patterns() -> &'static [NamedPattern] {
    static PATTERNS: Lazy<Vec<NamedPattern>> = Lazy::new(|| {
        vec![
            NamedPattern {
                name: "Default",
                regex: Regex::new(r"(?i)^Merge (branch|tag) '(?P<MergedBranch>[^']+)'(?: into (?P<TargetBranch>.+))?")
                    .unwrap(),
            },
            NamedPattern {
                name: "SmartGit",
                regex: Regex::new(r"(?i)^Finish (?P<MergedBranch>\S+)(?: into (?P<TargetBranch>.+))?")
                    .unwrap(),
            },
            NamedPattern {
                name: "BitBucketPull",
                regex: Regex::new(
                    r"(?i)^Merge pull request #(?P<PullRequestNumber>\d+) (?:from|in) (?P<MergedBranch>\S+) from (?P<Source>\S+) to (?P<TargetBranch>\S+)",
                )
                .unwrap(),
            },
            NamedPattern {
                name: "BitBucketPullv7",
                regex: Regex::new(
                    r"(?is)^Pull request #(?P<PullRequestNumber>\d+):.*\n\nMerge in (?P<MergedBranch>\S+) from (?P<Source>\S+) to (?P<TargetBranch>\S+)",
                )
                .unwrap(),
            },
            NamedPattern {
                name: "GitHubPull",
                regex: Regex::new(
                    r"(?i)^Merge pull request #(?P<PullRequestNumber>\d+) (?:from|in) (?P<MergedBranch>\S+)(?: into (?P<TargetBranch>.+))?",
                )
                .unwrap(),
            },
            NamedPattern {
                name: "RemoteTracking",
                regex: Regex::new(
                    r"(?i)^Merge remote-tracking branch '(?P<MergedBranch>[^']+)'(?: into (?P<TargetBranch>.+))?",
                )
                .unwrap(),
            },
        ]
    });
    &PATTERNS
}

fn squash_patterns() -> &'static [NamedPattern] {
    static PATTERNS: Lazy<Vec<NamedPattern>> = Lazy::new(|| {
        vec![
            NamedPattern {
                name: "GitHubSquash",
                regex: Regex::new(r"(?i)^.+\(#(?P<PullRequestNumber>\d+)\)$").unwrap(),
            },
            NamedPattern {
                name: "BitBucketSquash",
                regex: Regex::new(
                    r"(?i)^Merged in (?P<MergedBranch>\S+) \(pull request #(?P<PullRequestNumber>\d+)\)",
                )
                .unwrap(),
            },
        ]
    });
    &PATTERNS
}

fn strip_remote_prefix(branch: &str) -> String {
    branch
        .trim_start_matches("refs/remotes/")
        .trim_start_matches("origin/")
        .to_string()
}

fn try_match(patterns: &[NamedPattern], first_line: &str) -> Option<MergeMessageMatch> {
    for pattern in patterns {
        if let Some(captures) = pattern.regex.captures(first_line) {
            let merged_branch = captures
                .name("MergedBranch")
                .map(|m| strip_remote_prefix(m.as_str()))?;
            return Some(MergeMessageMatch {
                merged_branch,
                target_branch: captures.name("TargetBranch").map(|m| m.as_str().to_string()),
                pull_request_number: captures
                    .name("PullRequestNumber")
                    .map(|m| m.as_str().to_string()),
                is_merged_pull_request: captures.name("PullRequestNumber").is_some(),
            });
        }
    }
    None
}

/// Try `user_formats` (name, pattern pairs; invalid patterns are skipped)
/// then the default merge-commit catalog, against the full commit message
/// (only its first line is matched against single-line patterns, but
/// `BitBucketPullv7` needs the first two lines).
pub fn match_merge_commit(message: &str, user_formats: &[(String, String)]) -> Option<MergeMessageMatch> {
    let head = message.lines().take(2).collect::<Vec<_>>().join("\n");
    let first_line = message.lines().next().unwrap_or("");

    for (_, pattern) in user_formats {
        let Ok(regex) = Regex::new(pattern) else {
            continue;
        };
        let target = if pattern.contains("\\n") || pattern.contains('\n') {
            head.as_str()
        } else {
            first_line
        };
        if let Some(captures) = regex.captures(target) {
            if let Some(merged_branch) = captures.name("MergedBranch") {
                return Some(MergeMessageMatch {
                    merged_branch: strip_remote_prefix(merged_branch.as_str()),
                    target_branch: captures.name("TargetBranch").map(|m| m.as_str().to_string()),
                    pull_request_number: captures
                        .name("PullRequestNumber")
                        .map(|m| m.as_str().to_string()),
                    is_merged_pull_request: captures.name("PullRequestNumber").is_some(),
                });
            }
        }
    }

    try_match(default_patterns(), &head).or_else(|| try_match(default_patterns(), first_line))
}

/// Squash-commit catalog, tried against single-parent commits.
pub fn match_squash_commit(message: &str, user_formats: &[(String, String)]) -> Option<MergeMessageMatch> {
    let first_line = message.lines().next().unwrap_or("");
    for (_, pattern) in user_formats {
        let Ok(regex) = Regex::new(pattern) else {
            continue;
        };
        if let Some(captures) = regex.captures(first_line) {
            return Some(MergeMessageMatch {
                merged_branch: captures
                    .name("MergedBranch")
                    .map(|m| strip_remote_prefix(m.as_str()))
                    .unwrap_or_default(),
                target_branch: None,
                pull_request_number: captures
                    .name("PullRequestNumber")
                    .map(|m| m.as_str().to_string()),
                is_merged_pull_request: captures.name("PullRequestNumber").is_some(),
            });
        }
    }
    try_match(squash_patterns(), first_line)
}

static BRANCH_NAME_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+){0,2}$").unwrap());

/// Extract a version from a friendly branch name: split on `/`, try each
/// segment whole, then split each on the first `-`. Matching segments are
/// stripped of the tag prefix and padded to three components.
pub fn extract_version_from_branch_name(
    friendly_name: &str,
    tag_prefix: &Regex,
) -> Option<SemanticVersion> {
    for segment in friendly_name.split('/') {
        if let Some(version) = try_segment(segment, tag_prefix) {
            return Some(version);
        }
        if let Some((head, _)) = segment.split_once('-') {
            if let Some(version) = try_segment(head, tag_prefix) {
                return Some(version);
            }
        }
    }
    None
}

fn try_segment(segment: &str, tag_prefix: &Regex) -> Option<SemanticVersion> {
    let stripped = match tag_prefix.find(segment) {
        Some(m) if m.start() == 0 => &segment[m.end()..],
        _ => segment,
    };
    if !BRANCH_NAME_VERSION.is_match(stripped) {
        return None;
    }
    let mut parts = stripped.split('.');
    let major: u64 = parts.next()?.parse().ok()?;
    let minor: u64 = parts.next().map(|p| p.parse().ok()).unwrap_or(Some(0))?;
    let patch: u64 = parts.next().map(|p| p.parse().ok()).unwrap_or(Some(0))?;
    Some(SemanticVersion::new(major, minor, patch))
}

const KNOWN_PREFIXES: &[&str] = &[
    "feature/",
    "features/",
    "hotfix/",
    "hotfixes/",
    "bugfix/",
    "bugfixes/",
    "release/",
    "releases/",
    "support/",
    "pull/",
    "pull-requests/",
    "pr/",
];

/// Strip a known branch-kind prefix and replace any character outside
/// `[a-zA-Z0-9-]` with `-`, for substitution into a branch's `Tag` template.
pub fn clean_branch_name_for_tag(branch_name: &str) -> String {
    let mut name = branch_name;
    for prefix in KNOWN_PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            name = rest;
            break;
        }
    }
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_default_merge_branch() {
        let m = match_merge_commit("Merge branch 'release/2.0.0' into main", &[]).unwrap();
        assert_eq!(m.merged_branch, "release/2.0.0");
        assert_eq!(m.target_branch.as_deref(), Some("main"));
    }

    #[test]
    fn matches_github_pull_request() {
        let m = match_merge_commit("Merge pull request #42 from acme/feature/foo into main", &[]).unwrap();
        assert_eq!(m.pull_request_number.as_deref(), Some("42"));
        assert!(m.is_merged_pull_request);
    }

    #[test]
    fn matches_github_squash() {
        let m = match_squash_commit("Add widget support (#17)", &[]).unwrap();
        assert_eq!(m.pull_request_number.as_deref(), Some("17"));
    }

    #[test]
    fn invalid_user_format_falls_through_to_defaults() {
        let formats = vec![("broken".to_string(), "(unterminated".to_string())];
        let m = match_merge_commit("Merge branch 'develop'", &formats).unwrap();
        assert_eq!(m.merged_branch, "develop");
    }

    #[test]
    fn extracts_version_from_release_branch_name() {
        let prefix = Regex::new("[vV]").unwrap();
        let version = extract_version_from_branch_name("release/2.3", &prefix).unwrap();
        assert_eq!(version.semver(), "2.3.0");
    }

    #[test]
    fn extracts_version_from_hyphenated_segment() {
        let prefix = Regex::new("[vV]").unwrap();
        let version = extract_version_from_branch_name("release/v1.2.3-final", &prefix).unwrap();
        assert_eq!(version.semver(), "1.2.3");
    }

    #[test]
    fn cleans_known_prefix_and_invalid_characters() {
        assert_eq!(clean_branch_name_for_tag("feature/foo_bar!"), "foo-bar--");
    }
}
