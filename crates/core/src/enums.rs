//! Closed-set configuration enumerations.
//!
//! Every enum here parses case-insensitively from either its camel-case name
//! or a hyphenated alias (`ContinuousDeployment` / `continuous-deployment`).

use std::fmt;
use std::str::FromStr;

use crate::error::TagVerError;

/// A single field of a [`crate::version::SemanticVersion`] that can be bumped.
///
/// Ordered `None < Patch < Minor < Major` so increment determination can take
/// the maximum field seen across a commit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum VersionField {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl fmt::Display for VersionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VersionField::None => "None",
            VersionField::Patch => "Patch",
            VersionField::Minor => "Minor",
            VersionField::Major => "Major",
        };
        write!(f, "{s}")
    }
}

impl FromStr for VersionField {
    type Err = TagVerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "none" => Ok(VersionField::None),
            "patch" => Ok(VersionField::Patch),
            "minor" => Ok(VersionField::Minor),
            "major" => Ok(VersionField::Major),
            _ => Err(unknown("VersionField", s)),
        }
    }
}

/// The increment a branch applies to its base version.
///
/// `Inherit` defers to the global default increment; `None` never bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncrementStrategy {
    None,
    Major,
    Minor,
    Patch,
    Inherit,
}

impl IncrementStrategy {
    /// Collapse to the [`VersionField`] this strategy bumps, with
    /// `None`/`Inherit` both collapsing to `VersionField::None`.
    pub fn to_version_field(self) -> VersionField {
        match self {
            IncrementStrategy::Major => VersionField::Major,
            IncrementStrategy::Minor => VersionField::Minor,
            IncrementStrategy::Patch => VersionField::Patch,
            IncrementStrategy::None | IncrementStrategy::Inherit => VersionField::None,
        }
    }

    /// The field applied when a branch falls back to "its own default"
    /// increment — used for ranking candidates (§4.8.2) and as the
    /// no-commit-message-hint fallback (§4.8.6). Unlike
    /// [`Self::to_version_field`], `Inherit` resolves to `Patch` here rather
    /// than `None`.
    pub fn branch_default_field(self) -> VersionField {
        match self {
            IncrementStrategy::Inherit => VersionField::Patch,
            other => other.to_version_field(),
        }
    }
}

impl fmt::Display for IncrementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IncrementStrategy::None => "None",
            IncrementStrategy::Major => "Major",
            IncrementStrategy::Minor => "Minor",
            IncrementStrategy::Patch => "Patch",
            IncrementStrategy::Inherit => "Inherit",
        };
        write!(f, "{s}")
    }
}

impl FromStr for IncrementStrategy {
    type Err = TagVerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "none" => Ok(IncrementStrategy::None),
            "major" => Ok(IncrementStrategy::Major),
            "minor" => Ok(IncrementStrategy::Minor),
            "patch" => Ok(IncrementStrategy::Patch),
            "inherit" => Ok(IncrementStrategy::Inherit),
            _ => Err(unknown("IncrementStrategy", s)),
        }
    }
}

/// The branch's versioning mode: how a base version is turned into a final one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersioningMode {
    ContinuousDelivery,
    ContinuousDeployment,
    Mainline,
}

impl fmt::Display for VersioningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VersioningMode::ContinuousDelivery => "ContinuousDelivery",
            VersioningMode::ContinuousDeployment => "ContinuousDeployment",
            VersioningMode::Mainline => "Mainline",
        };
        write!(f, "{s}")
    }
}

impl FromStr for VersioningMode {
    type Err = TagVerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "continuousdelivery" => Ok(VersioningMode::ContinuousDelivery),
            "continuousdeployment" => Ok(VersioningMode::ContinuousDeployment),
            "mainline" => Ok(VersioningMode::Mainline),
            _ => Err(unknown("VersioningMode", s)),
        }
    }
}

/// Whether commit messages are scanned for increment hints at all, and if so
/// whether every commit or only merge commits are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitMessageIncrementMode {
    Disabled,
    Enabled,
    MergeMessageOnly,
}

impl fmt::Display for CommitMessageIncrementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommitMessageIncrementMode::Disabled => "Disabled",
            CommitMessageIncrementMode::Enabled => "Enabled",
            CommitMessageIncrementMode::MergeMessageOnly => "MergeMessageOnly",
        };
        write!(f, "{s}")
    }
}

impl FromStr for CommitMessageIncrementMode {
    type Err = TagVerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "disabled" => Ok(CommitMessageIncrementMode::Disabled),
            "enabled" => Ok(CommitMessageIncrementMode::Enabled),
            "mergemessageonly" => Ok(CommitMessageIncrementMode::MergeMessageOnly),
            _ => Err(unknown("CommitMessageIncrementMode", s)),
        }
    }
}

/// Which convention is used to read an increment hint out of a commit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitMessageConvention {
    ConventionalCommits,
    BumpDirective,
    Both,
}

impl fmt::Display for CommitMessageConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommitMessageConvention::ConventionalCommits => "ConventionalCommits",
            CommitMessageConvention::BumpDirective => "BumpDirective",
            CommitMessageConvention::Both => "Both",
        };
        write!(f, "{s}")
    }
}

impl FromStr for CommitMessageConvention {
    type Err = TagVerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "conventionalcommits" => Ok(CommitMessageConvention::ConventionalCommits),
            "bumpdirective" => Ok(CommitMessageConvention::BumpDirective),
            "both" => Ok(CommitMessageConvention::Both),
            _ => Err(unknown("CommitMessageConvention", s)),
        }
    }
}

/// How the mainline calculator applies increments along first-parent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MainlineIncrementMode {
    Aggregate,
    EachCommit,
}

impl fmt::Display for MainlineIncrementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MainlineIncrementMode::Aggregate => "Aggregate",
            MainlineIncrementMode::EachCommit => "EachCommit",
        };
        write!(f, "{s}")
    }
}

impl FromStr for MainlineIncrementMode {
    type Err = TagVerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "aggregate" => Ok(MainlineIncrementMode::Aggregate),
            "eachcommit" => Ok(MainlineIncrementMode::EachCommit),
            _ => Err(unknown("MainlineIncrementMode", s)),
        }
    }
}

/// Verbosity levels for the CLI's tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
    Trace,
}

impl FromStr for Verbosity {
    type Err = TagVerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "quiet" => Ok(Verbosity::Quiet),
            "normal" => Ok(Verbosity::Normal),
            "verbose" | "info" => Ok(Verbosity::Verbose),
            "debug" => Ok(Verbosity::Debug),
            "trace" => Ok(Verbosity::Trace),
            _ => Err(unknown("Verbosity", s)),
        }
    }
}

/// Lower-case and strip hyphens so `continuous-deployment` and
/// `ContinuousDeployment` normalize to the same key.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn unknown(enum_name: &str, value: &str) -> TagVerError {
    TagVerError::ConfigInvalid(format!("unknown {enum_name}: {value}"))
}

/// Deserialize any of the enums above from their YAML string form by
/// reusing the case-insensitive `FromStr` already implemented for each.
macro_rules! deserialize_via_fromstr {
    ($ty:ty) => {
        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

deserialize_via_fromstr!(VersionField);
deserialize_via_fromstr!(IncrementStrategy);
deserialize_via_fromstr!(VersioningMode);
deserialize_via_fromstr!(CommitMessageIncrementMode);
deserialize_via_fromstr!(CommitMessageConvention);
deserialize_via_fromstr!(MainlineIncrementMode);
deserialize_via_fromstr!(Verbosity);
