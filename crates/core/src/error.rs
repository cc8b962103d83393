//! Error types for the version calculation engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, TagVerError>;

/// Main error type, per the error kinds enumerated in the design's error
/// handling section: config validation, context resolution, base-version
/// selection, version parsing, and transparent repository-port failures.
#[derive(Error, Debug)]
pub enum TagVerError {
    /// Bad `tag-prefix`/branch regex, a branch missing its regex, a bad YAML
    /// enum value, or an unparseable `ignore.commits-before` date.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Failure resolving the calculation context: unknown target branch,
    /// branch has no tip commit, or an explicit commit lookup failed.
    #[error("could not resolve context: {0}")]
    ContextResolution(String),

    /// No strategy produced a single candidate base version.
    #[error("no base versions found from any strategy")]
    NoBaseVersions,

    /// Every candidate was excluded by the `ignore` clause.
    #[error("all base versions were filtered out by ignore config")]
    AllCandidatesFiltered,

    /// An unparseable `next-version` or base-version tag.
    #[error("could not parse version '{value}': {reason}")]
    VersionParse { value: String, reason: String },

    /// Transparent wrap of a `Repository` port failure, tagged with the
    /// operation that was being attempted.
    #[error("repository error while {operation}: {source}")]
    RepositoryError {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// A strategy-level failure, wrapped with the strategy's name.
    #[error("strategy {name}: {source}")]
    Strategy {
        name: &'static str,
        #[source]
        source: Box<TagVerError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TagVerError {
    pub fn repository(operation: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        TagVerError::RepositoryError {
            operation: operation.into(),
            source: source.into(),
        }
    }

    pub fn version_parse(value: impl Into<String>, reason: impl Into<String>) -> Self {
        TagVerError::VersionParse {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn strategy(name: &'static str, source: TagVerError) -> Self {
        TagVerError::Strategy {
            name,
            source: Box::new(source),
        }
    }
}
