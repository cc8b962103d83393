//! Black-box tests of the standard-mode calculation pipeline through the
//! public `tagver::calculate` entry point.

mod common;

use common::fixtures::RepoBuilder;
use tagver::ContextOptions;

#[test]
fn no_tags_falls_back_to_base_version() {
    let mut builder = RepoBuilder::new();
    builder.commit("initial commit");
    let repo = builder.build();

    let config = tagver::Configuration::builder().build().unwrap();
    let result = tagver::calculate(&repo, &config, &ContextOptions::default(), false).unwrap();
    assert_eq!(result.version.semver(), "0.1.0");
}

#[test]
fn tagged_commit_short_circuits_to_the_tag() {
    let mut builder = RepoBuilder::new();
    builder.commit("initial commit").tag("v1.2.3");
    let repo = builder.build();

    let config = tagver::Configuration::builder().build().unwrap();
    let result = tagver::calculate(&repo, &config, &ContextOptions::default(), false).unwrap();
    assert_eq!(result.version.semver(), "1.2.3");
}

#[test]
fn fix_commit_after_tag_bumps_patch() {
    let mut builder = RepoBuilder::new();
    builder.commit("initial commit").tag("v1.0.0").commit("fix: a bug");
    let repo = builder.build();

    let config = tagver::Configuration::builder().build().unwrap();
    let result = tagver::calculate(&repo, &config, &ContextOptions::default(), false).unwrap();
    assert_eq!(result.version.semver(), "1.0.1");
    assert_eq!(result.commits_since_version_source, 1);
}

#[test]
fn feat_commit_after_tag_bumps_minor() {
    let mut builder = RepoBuilder::new();
    builder.commit("initial commit").tag("v1.0.0").commit("feat: a feature");
    let repo = builder.build();

    let config = tagver::Configuration::builder().build().unwrap();
    let result = tagver::calculate(&repo, &config, &ContextOptions::default(), false).unwrap();
    assert_eq!(result.version.semver(), "1.1.0");
}

#[test]
fn breaking_change_footer_bumps_major() {
    let mut builder = RepoBuilder::new();
    builder
        .commit("initial commit")
        .tag("v1.0.0")
        .commit("feat: something\n\nBREAKING CHANGE: incompatible change");
    let repo = builder.build();

    let config = tagver::Configuration::builder().build().unwrap();
    let result = tagver::calculate(&repo, &config, &ContextOptions::default(), false).unwrap();
    assert_eq!(result.version.semver(), "2.0.0");
}

#[test]
fn explicit_branch_override_resolves_context_there() {
    let mut builder = RepoBuilder::new();
    builder.commit("initial commit").tag("v1.0.0");
    builder.branch("develop").commit("feat: work in progress");
    let repo = builder.build();

    let config = tagver::Configuration::builder().build().unwrap();
    let options = ContextOptions {
        target_branch: Some("develop".to_string()),
        commit_sha: None,
    };
    let result = tagver::calculate(&repo, &config, &options, false).unwrap();
    assert!(result.version.pre_release.is_some());
    assert_eq!(result.version.major, 1);
    assert_eq!(result.version.minor, 1);
}
