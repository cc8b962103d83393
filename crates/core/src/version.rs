//! Semantic version representation, parsing, comparison, and rendering.

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;

use crate::enums::VersionField;
use crate::error::{Result, TagVerError};

/// Non-negative `major.minor.patch` plus an optional pre-release tag and
/// build metadata. Immutable: every mutator returns a new value.
#[derive(Debug, Clone, Default)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Option<PreReleaseTag>,
    pub build_metadata: BuildMetaData,
}

/// An optional pre-release name and/or numeric counter.
///
/// Four shapes are representable: absent (the version is stable, modeled as
/// `SemanticVersion::pre_release == None`), name-only, name+number, and
/// number-only (`name == None`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreReleaseTag {
    pub name: Option<String>,
    pub number: Option<u64>,
}

impl PreReleaseTag {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            number: None,
        }
    }

    pub fn with_number(name: impl Into<String>, number: u64) -> Self {
        Self {
            name: Some(name.into()),
            number: Some(number),
        }
    }

    /// Case-insensitive name comparison.
    fn name_key(&self) -> String {
        self.name.as_deref().unwrap_or("").to_lowercase()
    }

    /// Whether this tag's name matches `name`, case-insensitively.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name))
    }

    /// Compare two tags: lexicographic on name, then numeric on number.
    fn compare(&self, other: &Self) -> Ordering {
        self.name_key()
            .cmp(&other.name_key())
            .then(self.number.cmp(&other.number))
    }
}

impl fmt::Display for PreReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.number) {
            (Some(name), Some(n)) => write!(f, "{name}.{n}"),
            (Some(name), None) => write!(f, "{name}"),
            (None, Some(n)) => write!(f, "{n}"),
            (None, None) => Ok(()),
        }
    }
}

/// Build metadata attached to a calculated version. Never participates in
/// `SemanticVersion` comparison.
#[derive(Debug, Clone, Default)]
pub struct BuildMetaData {
    pub commits_since_tag: Option<u32>,
    pub branch: Option<String>,
    pub sha: Option<String>,
    pub short_sha: Option<String>,
    pub version_source_sha: Option<String>,
    pub commit_date: Option<chrono::DateTime<chrono::Utc>>,
    pub commits_since_version_source: Option<u32>,
    pub uncommitted_changes: u32,
}

impl BuildMetaData {
    /// `count[.Branch.<name>][.Sha.<sha>]`, used by `InformationalVersion`
    /// and the formatter's `FullBuildMetaData` field.
    pub fn full_metadata_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(count) = self.commits_since_tag {
            parts.push(count.to_string());
        }
        if let Some(branch) = &self.branch {
            parts.push(format!("Branch.{branch}"));
        }
        if let Some(sha) = &self.sha {
            parts.push(format!("Sha.{sha}"));
        }
        parts.join(".")
    }
}

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: None,
            build_metadata: BuildMetaData::default(),
        }
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_some()
    }

    /// Parse a version, optionally stripping a leading tag prefix matched by
    /// `tag_prefix`. When `tag_prefix` is `Some`, it must match at the very
    /// start of `s`; a non-match at position 0 (or no match at all) is a
    /// distinguishable failure from a malformed numeric body.
    pub fn parse(s: &str, tag_prefix: Option<&Regex>) -> Result<Self> {
        let remainder = match tag_prefix {
            None => s,
            Some(re) => match re.find(s) {
                Some(m) if m.start() == 0 => &s[m.end()..],
                _ => {
                    return Err(TagVerError::version_parse(s, "tag prefix did not match"));
                }
            },
        };

        static VERSION_RE: once_cell::sync::Lazy<Regex> = once_cell::sync::Lazy::new(|| {
            Regex::new(
                r"(?x)
                ^
                (?P<major>0|[1-9]\d*)
                (?:\.(?P<minor>0|[1-9]\d*))?
                (?:\.(?P<patch>0|[1-9]\d*))?
                (?:\.(?P<quad>0|[1-9]\d*))?
                (?:-(?P<pre>[0-9A-Za-z.-]+))?
                (?:\+(?P<build>[0-9A-Za-z.-]+))?
                $
                ",
            )
            .expect("static version regex is valid")
        });

        let caps = VERSION_RE
            .captures(remainder)
            .ok_or_else(|| TagVerError::version_parse(s, "does not match semantic version grammar"))?;

        let parse_field = |name: &str| -> Result<u64> {
            caps.name(name)
                .map(|m| {
                    m.as_str()
                        .parse::<u64>()
                        .map_err(|e| TagVerError::version_parse(s, e.to_string()))
                })
                .transpose()
                .map(|v| v.unwrap_or(0))
        };

        let major = parse_field("major")?;
        let minor = parse_field("minor")?;
        let patch = parse_field("patch")?;
        // the fourth `.n` group is accepted (.NET-style tags) and discarded

        let pre_release = caps.name("pre").map(|m| parse_pre_release(m.as_str()));

        let mut build_metadata = BuildMetaData::default();
        if let Some(m) = caps.name("build") {
            if let Ok(n) = m.as_str().parse::<u32>() {
                build_metadata.commits_since_tag = Some(n);
            }
        }

        Ok(Self {
            major,
            minor,
            patch,
            pre_release,
            build_metadata,
        })
    }

    /// SemVer 2.0 precedence: major, minor, patch, then pre-release. Build
    /// metadata is never compared.
    pub fn compare_to(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                // stable sorts higher than any pre-release at the same M.m.p
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.compare(b),
            })
    }

    /// Bump `field`. Major zeroes minor/patch; minor zeroes patch; both (and
    /// patch) strip pre-release and build metadata. `None` is a no-op.
    pub fn increment_field(&self, field: VersionField) -> Self {
        match field {
            VersionField::Major => Self {
                major: self.major + 1,
                minor: 0,
                patch: 0,
                pre_release: None,
                build_metadata: BuildMetaData::default(),
            },
            VersionField::Minor => Self {
                major: self.major,
                minor: self.minor + 1,
                patch: 0,
                pre_release: None,
                build_metadata: BuildMetaData::default(),
            },
            VersionField::Patch => Self {
                major: self.major,
                minor: self.minor,
                patch: self.patch + 1,
                pre_release: None,
                build_metadata: BuildMetaData::default(),
            },
            VersionField::None => self.clone(),
        }
    }

    /// Bump the pre-release tag's numeric counter. Returns `None` when there
    /// is no pre-release tag, or the tag has no existing numeric counter.
    pub fn increment_pre_release(&self) -> Option<Self> {
        let tag = self.pre_release.as_ref()?;
        let number = tag.number?;
        let mut next = self.clone();
        next.pre_release = Some(PreReleaseTag {
            name: tag.name.clone(),
            number: Some(number + 1),
        });
        Some(next)
    }

    pub fn with_pre_release_tag(&self, tag: Option<PreReleaseTag>) -> Self {
        Self {
            pre_release: tag,
            ..self.clone()
        }
    }

    pub fn with_build_meta_data(&self, build_metadata: BuildMetaData) -> Self {
        Self {
            build_metadata,
            ..self.clone()
        }
    }

    /// `M.m.p[-pre]`
    pub fn semver(&self) -> String {
        match &self.pre_release {
            Some(pre) => format!("{}.{}.{}-{}", self.major, self.minor, self.patch, pre),
            None => format!("{}.{}.{}", self.major, self.minor, self.patch),
        }
    }

    /// `SemVer` with a `+build` suffix when commits-since-tag is known.
    pub fn full_semver(&self) -> String {
        match self.build_metadata.commits_since_tag {
            Some(count) => format!("{}+{}", self.semver(), count),
            None => self.semver(),
        }
    }

    /// Pre-release without the dot separator, e.g. `-beta4`.
    pub fn legacy_semver(&self) -> String {
        let base = format!("{}.{}.{}", self.major, self.minor, self.patch);
        match &self.pre_release {
            Some(PreReleaseTag {
                name: Some(name),
                number: Some(n),
            }) => format!("{base}-{name}{n}"),
            Some(PreReleaseTag {
                name: Some(name),
                number: None,
            }) => format!("{base}-{name}"),
            Some(PreReleaseTag {
                name: None,
                number: Some(n),
            }) => format!("{base}-{n}"),
            Some(PreReleaseTag {
                name: None,
                number: None,
            })
            | None => base,
        }
    }

    /// Same as [`Self::legacy_semver`] but the numeric suffix is zero-padded
    /// to `width`.
    pub fn legacy_semver_padded(&self, width: usize) -> String {
        let base = format!("{}.{}.{}", self.major, self.minor, self.patch);
        match &self.pre_release {
            Some(PreReleaseTag {
                name,
                number: Some(n),
            }) => {
                let padded = format!("{:0width$}", n, width = width);
                match name {
                    Some(name) => format!("{base}-{name}{padded}"),
                    None => format!("{base}-{padded}"),
                }
            }
            Some(PreReleaseTag {
                name: Some(name),
                number: None,
            }) => format!("{base}-{name}"),
            _ => base,
        }
    }

    /// `SemVer + "+" + full-metadata-string`.
    pub fn informational_version(&self) -> String {
        let metadata = self.build_metadata.full_metadata_string();
        if metadata.is_empty() {
            self.semver()
        } else {
            format!("{}+{}", self.semver(), metadata)
        }
    }
}

/// Split on the last `.`-delimited token; if numeric, it's the counter, the
/// rest is the name.
fn parse_pre_release(raw: &str) -> PreReleaseTag {
    match raw.rsplit_once('.') {
        Some((name, tail)) => match tail.parse::<u64>() {
            Ok(n) => PreReleaseTag {
                name: Some(name.to_string()),
                number: Some(n),
            },
            Err(_) => PreReleaseTag {
                name: Some(raw.to_string()),
                number: None,
            },
        },
        None => match raw.parse::<u64>() {
            Ok(n) => PreReleaseTag {
                name: None,
                number: Some(n),
            },
            Err(_) => PreReleaseTag {
                name: Some(raw.to_string()),
                number: None,
            },
        },
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.semver())
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.compare_to(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare_to(other))
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_to(other)
    }
}
