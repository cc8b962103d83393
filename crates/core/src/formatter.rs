//! Produces the deterministic named-variable map from a final version and
//! its effective configuration.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, IsoWeek, Utc};

use crate::config::EffectiveConfiguration;
use crate::enums::VersioningMode;
use crate::version::{PreReleaseTag, SemanticVersion};

/// CD-mode pre-release promotion: a continuous-deployment branch with no
/// numbered pre-release gets one synthesized from the fallback tag.
fn promote_for_continuous_deployment(version: SemanticVersion, effective: &EffectiveConfiguration) -> SemanticVersion {
    if effective.mode != VersioningMode::ContinuousDeployment {
        return version;
    }
    let has_numbered_pre_release = matches!(&version.pre_release, Some(tag) if tag.number.is_some());
    if has_numbered_pre_release {
        return version;
    }
    let name = version
        .pre_release
        .as_ref()
        .and_then(|tag| tag.name.clone())
        .unwrap_or_else(|| effective.continuous_delivery_fallback_tag.clone());
    let name = if name.is_empty() { "ci".to_string() } else { name };
    let number = version.build_metadata.commits_since_tag.unwrap_or(0) as u64;
    version.with_pre_release_tag(Some(PreReleaseTag::with_number(&name, number)))
}

fn escape_branch_name(branch_name: &str) -> String {
    branch_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

fn translate_date_format(format: &str, date: DateTime<Utc>) -> String {
    if format.contains("2006") || format.contains("15:04") {
        return date.format(format).to_string();
    }

    const TOKENS: &[(&str, &str)] = &[
        ("yyyy", "%Y"),
        ("yy", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("M", "%-m"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("dd", "%d"),
        ("d", "%-d"),
        ("HH", "%H"),
        ("H", "%-H"),
        ("hh", "%I"),
        ("h", "%-I"),
        ("mm", "%M"),
        ("m", "%-M"),
        ("ss", "%S"),
        ("s", "%-S"),
        ("tt", "%p"),
        ("zzz", "%:z"),
        ("zz", "%z"),
        ("z", "%#z"),
        ("fff", "%3f"),
        ("ff", "%2f"),
        ("f", "%1f"),
    ];

    // Longest tokens first so e.g. `yyyy` isn't chopped up by the `y` rule
    // that doesn't exist, and `MMMM` isn't broken by `MM`.
    let mut strftime = String::new();
    let mut remaining = format;
    'outer: while !remaining.is_empty() {
        for (token, replacement) in TOKENS {
            if remaining.starts_with(token) {
                strftime.push_str(replacement);
                remaining = &remaining[token.len()..];
                continue 'outer;
            }
        }
        let mut chars = remaining.chars();
        let next = chars.next().unwrap();
        strftime.push(next);
        remaining = chars.as_str();
    }

    date.format(&strftime).to_string()
}

fn iso_week_of(date: DateTime<Utc>) -> IsoWeek {
    date.iso_week()
}

/// Produce the full `~35`-entry variable map for a calculated version.
pub fn format_variables(
    version: &SemanticVersion,
    branch_name: &str,
    effective: &EffectiveConfiguration,
) -> BTreeMap<String, String> {
    let version = promote_for_continuous_deployment(version.clone(), effective);
    let mut vars = BTreeMap::new();

    vars.insert("Major".to_string(), version.major.to_string());
    vars.insert("Minor".to_string(), version.minor.to_string());
    vars.insert("Patch".to_string(), version.patch.to_string());
    vars.insert(
        "MajorMinorPatch".to_string(),
        format!("{}.{}.{}", version.major, version.minor, version.patch),
    );

    vars.insert("SemVer".to_string(), version.semver());
    vars.insert("FullSemVer".to_string(), version.full_semver());
    vars.insert("LegacySemVer".to_string(), version.legacy_semver());
    vars.insert(
        "LegacySemVerPadded".to_string(),
        version.legacy_semver_padded(effective.legacy_semver_padding),
    );
    vars.insert("InformationalVersion".to_string(), version.informational_version());

    let (pre_release_tag, pre_release_label, pre_release_number) = match &version.pre_release {
        Some(tag) => (
            tag.to_string(),
            tag.name.clone().unwrap_or_default(),
            tag.number.map(|n| n.to_string()).unwrap_or_default(),
        ),
        None => (String::new(), String::new(), String::new()),
    };
    vars.insert("PreReleaseTag".to_string(), pre_release_tag.clone());
    vars.insert(
        "PreReleaseTagWithDash".to_string(),
        if pre_release_tag.is_empty() {
            String::new()
        } else {
            format!("-{pre_release_tag}")
        },
    );
    vars.insert("PreReleaseLabel".to_string(), pre_release_label.clone());
    vars.insert(
        "PreReleaseLabelWithDash".to_string(),
        if pre_release_label.is_empty() {
            String::new()
        } else {
            format!("-{pre_release_label}")
        },
    );
    vars.insert("PreReleaseNumber".to_string(), pre_release_number.clone());
    let weighted = version
        .pre_release
        .as_ref()
        .and_then(|tag| tag.number)
        .map(|n| (effective.pre_release_weight + n as i64).to_string())
        .unwrap_or_default();
    vars.insert("WeightedPreReleaseNumber".to_string(), weighted);

    let build_metadata = version.build_metadata.clone();
    let build_count = build_metadata.commits_since_tag.unwrap_or(0);
    vars.insert("BuildMetaData".to_string(), build_count.to_string());
    vars.insert(
        "BuildMetaDataPadded".to_string(),
        format!("{:0width$}", build_count, width = effective.build_metadata_padding),
    );
    vars.insert(
        "FullBuildMetaData".to_string(),
        build_metadata.full_metadata_string(),
    );

    vars.insert("BranchName".to_string(), branch_name.to_string());
    vars.insert("EscapedBranchName".to_string(), escape_branch_name(branch_name));
    vars.insert("Sha".to_string(), build_metadata.sha.clone().unwrap_or_default());
    vars.insert(
        "ShortSha".to_string(),
        build_metadata.short_sha.clone().unwrap_or_default(),
    );

    vars.insert(
        "VersionSourceSha".to_string(),
        build_metadata.version_source_sha.clone().unwrap_or_default(),
    );
    let commits_since_source = build_metadata.commits_since_version_source.unwrap_or(0);
    vars.insert(
        "CommitsSinceVersionSource".to_string(),
        commits_since_source.to_string(),
    );
    vars.insert(
        "CommitsSinceVersionSourcePadded".to_string(),
        format!(
            "{:0width$}",
            commits_since_source,
            width = effective.legacy_semver_padding
        ),
    );
    vars.insert(
        "UncommittedChanges".to_string(),
        build_metadata.uncommitted_changes.to_string(),
    );

    let commit_date = build_metadata.commit_date.unwrap_or_else(Utc::now);
    vars.insert(
        "CommitDate".to_string(),
        translate_date_format(&effective.commit_date_format, commit_date),
    );
    let iso_week = iso_week_of(commit_date);
    vars.insert(
        "CommitTag".to_string(),
        format!(
            "{:02}.{}.{}",
            iso_week.year().rem_euclid(100),
            iso_week.week(),
            build_metadata.short_sha.clone().unwrap_or_default()
        ),
    );

    // Assembly/NuGet fields mirror other formats rather than carrying
    // independent state.
    vars.insert("AssemblySemVer".to_string(), format!("{}.{}.{}.0", version.major, version.minor, version.patch));
    vars.insert(
        "AssemblySemFileVer".to_string(),
        format!("{}.{}.{}.0", version.major, version.minor, version.patch),
    );
    vars.insert("NuGetVersionV2".to_string(), version.legacy_semver_padded(effective.legacy_semver_padding));
    vars.insert("NuGetVersion".to_string(), version.legacy_semver());
    vars.insert("NuGetPreReleaseTag".to_string(), pre_release_label.clone());
    vars.insert(
        "NuGetPreReleaseTagV2".to_string(),
        version.legacy_semver_padded(effective.legacy_semver_padding),
    );

    vars
}
