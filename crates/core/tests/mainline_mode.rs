//! Black-box tests of Mainline mode (Aggregate and EachCommit increment
//! strategies) through the public `tagver::calculate` entry point.

mod common;

use common::fixtures::RepoBuilder;
use tagver::ContextOptions;

fn mainline_config() -> tagver::Configuration {
    tagver::Configuration::builder()
        .with_yaml_overlay("mode: mainline\n")
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn aggregate_mode_takes_the_highest_bump_across_all_commits() {
    let mut builder = RepoBuilder::new();
    builder
        .commit("initial commit")
        .tag("v1.0.0")
        .commit("fix: a bug")
        .commit("feat: a feature")
        .commit("fix: another bug");
    let repo = builder.build();

    let config = mainline_config();
    let result = tagver::calculate(&repo, &config, &ContextOptions::default(), false).unwrap();
    // highest bump seen (feat) wins a single aggregate increment
    assert_eq!(result.version.semver(), "1.1.0");
}

#[test]
fn each_commit_mode_applies_one_increment_per_commit() {
    let mut builder = RepoBuilder::new();
    builder
        .commit("initial commit")
        .tag("v1.0.0")
        .commit("fix: a bug")
        .commit("fix: another bug");
    let repo = builder.build();

    let config = tagver::Configuration::builder()
        .with_yaml_overlay("mode: mainline\nmainline-increment: each-commit\n")
        .unwrap()
        .build()
        .unwrap();
    let result = tagver::calculate(&repo, &config, &ContextOptions::default(), false).unwrap();
    assert_eq!(result.version.semver(), "1.0.2");
}

#[test]
fn mainline_mode_never_assigns_a_pre_release_tag() {
    let mut builder = RepoBuilder::new();
    builder.commit("initial commit").tag("v1.0.0").commit("feat: a feature");
    let repo = builder.build();

    let config = mainline_config();
    let result = tagver::calculate(&repo, &config, &ContextOptions::default(), false).unwrap();
    assert!(result.version.pre_release.is_none());
}
