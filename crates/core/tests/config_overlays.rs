//! Black-box tests of configuration overlays: custom tag prefixes, a
//! `next-version` pin, and branch-specific overrides.

mod common;

use common::fixtures::RepoBuilder;
use tagver::ContextOptions;

#[test]
fn custom_tag_prefix_strips_a_non_default_marker() {
    let mut builder = RepoBuilder::new();
    builder.commit("initial commit").tag("rel-1.0.0").commit("fix: a bug");
    let repo = builder.build();

    let config = tagver::Configuration::builder()
        .with_yaml_overlay("tag-prefix: rel-\n")
        .unwrap()
        .build()
        .unwrap();
    let result = tagver::calculate(&repo, &config, &ContextOptions::default(), false).unwrap();
    assert_eq!(result.version.semver(), "1.0.1");
}

#[test]
fn next_version_pins_the_floor_when_there_are_no_tags() {
    let mut builder = RepoBuilder::new();
    builder.commit("initial commit");
    let repo = builder.build();

    let config = tagver::Configuration::builder()
        .with_yaml_overlay("next-version: 5.0.0\n")
        .unwrap()
        .build()
        .unwrap();
    let result = tagver::calculate(&repo, &config, &ContextOptions::default(), false).unwrap();
    assert_eq!(result.version.major, 5);
}

#[test]
fn branch_override_replaces_only_the_named_field() {
    let mut builder = RepoBuilder::new();
    builder.commit("initial commit").tag("v1.0.0");
    builder.branch("develop").commit("feat: work in progress");
    let repo = builder.build();

    let yaml = "branches:\n  develop:\n    tag: preview\n";
    let config = tagver::Configuration::builder()
        .with_yaml_overlay(yaml)
        .unwrap()
        .build()
        .unwrap();
    let options = ContextOptions {
        target_branch: Some("develop".to_string()),
        commit_sha: None,
    };
    let result = tagver::calculate(&repo, &config, &options, false).unwrap();
    let tag = result.version.pre_release.clone().unwrap();
    assert_eq!(tag.name.as_deref(), Some("preview"));
}

#[test]
fn invalid_branch_regex_overlay_fails_to_build() {
    let yaml = "branches:\n  main:\n    regex: \"(\"\n";
    let result = tagver::Configuration::builder().with_yaml_overlay(yaml).unwrap().build();
    assert!(result.is_err());
}
