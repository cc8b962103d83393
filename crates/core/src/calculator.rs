//! The full calculation pipeline: base-version selection, mode-specific
//! increment application, pre-release assignment, and build metadata.

use std::cmp::Ordering;

use crate::config::EffectiveConfiguration;
use crate::context::Context;
use crate::enums::{MainlineIncrementMode, VersionField, VersioningMode};
use crate::error::{Result, TagVerError};
use crate::explain::Explanation;
use crate::git::{Commit, Repository};
use crate::increment;
use crate::merge_message::clean_branch_name_for_tag;
use crate::repository_store::RepositoryStore;
use crate::strategies::{all_strategies, BaseVersion};
use crate::version::SemanticVersion;

/// The outcome of a full calculation.
#[derive(Debug, Clone)]
pub struct VersionResult {
    pub version: SemanticVersion,
    pub branch_name: String,
    pub commits_since_version_source: u32,
    pub candidates: Vec<BaseVersion>,
    /// The candidate that actually won selection, `None` when the current
    /// commit's own tag short-circuited the pipeline before any strategy ran.
    pub selected: Option<BaseVersion>,
    pub explanation: Explanation,
}

pub fn calculate<R: Repository>(
    repo: &R,
    context: &Context,
    full_config: &crate::config::Configuration,
    effective: &EffectiveConfiguration,
    explain: bool,
) -> Result<VersionResult> {
    let mut explanation = Explanation::new(explain);

    if context.is_current_commit_tagged {
        let version = context
            .current_commit_tagged_version
            .clone()
            .expect("is_current_commit_tagged implies a version");
        explanation.add(format!(
            "current commit is tagged '{}'; short-circuiting",
            version.semver()
        ));
        return Ok(VersionResult {
            version,
            branch_name: context.current_branch_friendly_name.clone(),
            commits_since_version_source: 0,
            candidates: vec![],
            selected: None,
            explanation,
        });
    }

    let candidates = collect_candidates(repo, context, full_config, effective)?;
    if candidates.is_empty() {
        return Err(TagVerError::NoBaseVersions);
    }

    let filtered = filter_ignored(candidates, effective);
    if filtered.is_empty() {
        return Err(TagVerError::AllCandidatesFiltered);
    }

    let winner = select_winner(&filtered, effective, &mut explanation);

    let commits_since_source = commits_since_source(repo, context, &winner, effective)?;
    let commits_since_version_source = commits_since_source.len() as u32;

    let version = match effective.mode {
        VersioningMode::Mainline => apply_mainline(&winner, &commits_since_source, effective, &mut explanation),
        _ => apply_standard(&winner, &commits_since_source, effective, &mut explanation),
    };

    let version = match effective.mode {
        VersioningMode::Mainline => version,
        _ => assign_pre_release(repo, version, context, &winner, effective, &mut explanation)?,
    };

    let branch_name = winner
        .branch_name_override
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| context.current_branch_friendly_name.clone());

    Ok(VersionResult {
        version,
        branch_name,
        commits_since_version_source,
        candidates: filtered,
        selected: Some(winner),
        explanation,
    })
}

fn collect_candidates<R: Repository>(
    repo: &R,
    context: &Context,
    full_config: &crate::config::Configuration,
    effective: &EffectiveConfiguration,
) -> Result<Vec<BaseVersion>> {
    let mut all = Vec::new();
    for strategy in all_strategies() {
        let yielded = strategy
            .base_versions(repo, context, full_config, effective)
            .map_err(|e| TagVerError::strategy(strategy.name(), e))?;
        all.extend(yielded);
    }
    Ok(all)
}

fn filter_ignored(candidates: Vec<BaseVersion>, effective: &EffectiveConfiguration) -> Vec<BaseVersion> {
    candidates
        .into_iter()
        .filter(|candidate| match &candidate.source_commit {
            None => true,
            Some(commit) => {
                if effective.ignore.sha.contains(&commit.sha) {
                    return false;
                }
                match effective.ignore.commits_before {
                    Some(cutoff) => commit.when >= cutoff,
                    None => true,
                }
            }
        })
        .collect()
}

fn effective_version(candidate: &BaseVersion, effective: &EffectiveConfiguration) -> SemanticVersion {
    if candidate.should_increment {
        let field = effective.increment.branch_default_field();
        candidate.version.increment_field(field)
    } else {
        candidate.version.clone()
    }
}

fn select_winner(
    candidates: &[BaseVersion],
    effective: &EffectiveConfiguration,
    explanation: &mut Explanation,
) -> BaseVersion {
    let mut winner = &candidates[0];
    let mut winner_effective = effective_version(winner, effective);

    for candidate in &candidates[1..] {
        let candidate_effective = effective_version(candidate, effective);
        let ordering = candidate_effective.compare_to(&winner_effective);
        let replace = match ordering {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => older_source(candidate, winner),
        };
        if replace {
            winner = candidate;
            winner_effective = candidate_effective;
        }
    }

    explanation.add(format!(
        "selected base version {} from {}",
        winner.version.semver(),
        winner.source
    ));
    tracing::debug!(version = %winner.version.semver(), source = %winner.source, "selected base version candidate");
    winner.clone()
}

fn older_source(candidate: &BaseVersion, current_winner: &BaseVersion) -> bool {
    match (&candidate.source_commit, &current_winner.source_commit) {
        (Some(a), Some(b)) => a.when < b.when,
        (Some(_), None) => true,
        _ => false,
    }
}

fn commits_since_source<R: Repository>(
    repo: &R,
    context: &Context,
    winner: &BaseVersion,
    effective: &EffectiveConfiguration,
) -> Result<Vec<Commit>> {
    let stop_sha = winner.source_commit.as_ref().map(|c| c.sha.as_str());
    match effective.mode {
        VersioningMode::Mainline => repo.mainline_commit_log(&context.current_commit.sha, stop_sha, None),
        _ => repo.commit_log(&context.current_commit.sha, stop_sha, None),
    }
}

fn apply_mainline(
    winner: &BaseVersion,
    commits: &[Commit],
    effective: &EffectiveConfiguration,
    explanation: &mut Explanation,
) -> SemanticVersion {
    match effective.mainline_increment {
        MainlineIncrementMode::Aggregate => {
            let field = increment::determine_increment(
                commits,
                effective,
                winner.should_increment,
                winner.version.major == 0,
            );
            explanation.add(format!("mainline aggregate increment: {field}"));
            winner.version.increment_field(field)
        }
        MainlineIncrementMode::EachCommit => {
            let mut version = winner.version.clone();
            for commit in commits.iter().rev() {
                let mut field = increment::commit_field(&commit.message, effective);
                if field == VersionField::None && winner.should_increment {
                    field = increment::branch_default(effective, true);
                }
                if version.major == 0 && field == VersionField::Major {
                    field = VersionField::Minor;
                }
                version = version.increment_field(field);
            }
            explanation.add(format!("mainline each-commit result: {}", version.semver()));
            version
        }
    }
}

fn apply_standard(
    winner: &BaseVersion,
    commits: &[Commit],
    effective: &EffectiveConfiguration,
    explanation: &mut Explanation,
) -> SemanticVersion {
    let field = increment::determine_increment(
        commits,
        effective,
        winner.should_increment,
        winner.version.major == 0,
    );
    explanation.add(format!("standard increment: {field}"));
    winner.version.increment_field(field)
}

fn assign_pre_release<R: Repository>(
    repo: &R,
    version: SemanticVersion,
    context: &Context,
    winner: &BaseVersion,
    effective: &EffectiveConfiguration,
    explanation: &mut Explanation,
) -> Result<SemanticVersion> {
    if effective.tag.is_empty() {
        return Ok(version);
    }

    let branch_name = winner
        .branch_name_override
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| context.current_branch_friendly_name.clone());

    let cleaned = clean_branch_name_for_tag(&branch_name);
    let tag_name = effective.tag.replace("{BranchName}", &cleaned);
    let tag_name = tag_name.trim_matches(|c| c == '-').to_string();

    if tag_name.is_empty() {
        return Ok(version);
    }

    let number = disambiguate_pre_release_number(repo, &version, &tag_name, effective)?;
    explanation.add(format!("pre-release tag '{tag_name}.{number}'"));

    Ok(version.with_pre_release_tag(Some(crate::version::PreReleaseTag::with_number(
        &tag_name, number,
    ))))
}

fn disambiguate_pre_release_number<R: Repository>(
    repo: &R,
    version: &SemanticVersion,
    tag_name: &str,
    effective: &EffectiveConfiguration,
) -> Result<u64> {
    let store = RepositoryStore::new(repo);
    let mut highest = 0u64;
    for version_tag in store.valid_version_tags(&effective.tag_prefix)? {
        let candidate = &version_tag.version;
        if candidate.major != version.major || candidate.minor != version.minor || candidate.patch != version.patch {
            continue;
        }
        let Some(pre) = &candidate.pre_release else {
            continue;
        };
        if pre.name_matches(tag_name) {
            if let Some(number) = pre.number {
                highest = highest.max(number);
            }
        }
    }
    Ok(highest + 1)
}
