use crate::config::{Configuration, EffectiveConfiguration};
use crate::context::Context;
use crate::error::Result;
use crate::git::Repository;
use crate::version::SemanticVersion;

use super::{BaseVersion, Strategy};

/// Yields the configured `next-version` verbatim, when set and the current
/// commit isn't already tagged.
pub struct ConfigNextVersion;

impl Strategy for ConfigNextVersion {
    fn name(&self) -> &'static str {
        "ConfigNextVersion"
    }

    fn base_versions(
        &self,
        _repo: &dyn Repository,
        context: &Context,
        _full_config: &Configuration,
        effective: &EffectiveConfiguration,
    ) -> Result<Vec<BaseVersion>> {
        if context.is_current_commit_tagged {
            return Ok(vec![]);
        }
        let Some(next_version) = &effective.next_version else {
            return Ok(vec![]);
        };
        let version = SemanticVersion::parse(next_version, None)?;
        Ok(vec![BaseVersion {
            source: "NextVersion in configuration file".to_string(),
            version,
            should_increment: false,
            source_commit: None,
            branch_name_override: None,
        }])
    }
}
