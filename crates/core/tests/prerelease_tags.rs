//! Black-box tests of pre-release tag assignment and numeric disambiguation
//! on non-mainline branches.

mod common;

use common::fixtures::RepoBuilder;
use tagver::ContextOptions;

#[test]
fn develop_branch_gets_alpha_pre_release_tag() {
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
    let tag = result.version.pre_release.clone().unwrap();
    assert_eq!(tag.name.as_deref(), Some("alpha"));
    assert_eq!(tag.number, Some(1));
}

#[test]
fn existing_pre_release_tags_at_the_same_version_bump_the_numeric_counter() {
    let mut builder = RepoBuilder::new();
    builder.commit("initial commit").tag("v1.0.0");
    // Two already-published alpha tags for the upcoming 1.1.0, parked on a
    // branch develop never merges from, so they don't also become base
    // version candidates themselves.
    builder
        .branch("decoy")
        .commit("decoy build")
        .tag("v1.1.0-alpha.1")
        .tag("v1.1.0-alpha.2");
    builder.checkout("main").branch("develop").commit("feat: work in progress");
    let repo = builder.build();

    let config = tagver::Configuration::builder().build().unwrap();
    let options = ContextOptions {
        target_branch: Some("develop".to_string()),
        commit_sha: None,
    };
    let result = tagver::calculate(&repo, &config, &options, false).unwrap();
    assert_eq!((result.version.major, result.version.minor, result.version.patch), (1, 1, 0));
    let tag = result.version.pre_release.clone().unwrap();
    assert_eq!(tag.name.as_deref(), Some("alpha"));
    assert_eq!(tag.number, Some(3));
}

#[test]
fn release_branch_name_feeds_the_beta_tag() {
    let mut builder = RepoBuilder::new();
    builder.commit("initial commit").tag("v1.0.0");
    builder.branch("release/2.0.0").commit("fix: stabilize");
    let repo = builder.build();

    let config = tagver::Configuration::builder().build().unwrap();
    let options = ContextOptions {
        target_branch: Some("release/2.0.0".to_string()),
        commit_sha: None,
    };
    let result = tagver::calculate(&repo, &config, &options, false).unwrap();
    let tag = result.version.pre_release.clone().unwrap();
    assert_eq!(tag.name.as_deref(), Some("beta"));
}

#[test]
fn feature_branch_uses_its_own_cleaned_name_as_the_tag() {
    let mut builder = RepoBuilder::new();
    builder.commit("initial commit").tag("v1.0.0");
    builder.branch("feature/cool-thing").commit("feat: wip");
    let repo = builder.build();

    let config = tagver::Configuration::builder().build().unwrap();
    let options = ContextOptions {
        target_branch: Some("feature/cool-thing".to_string()),
        commit_sha: None,
    };
    let result = tagver::calculate(&repo, &config, &options, false).unwrap();
    let tag = result.version.pre_release.clone().unwrap();
    assert_eq!(tag.name.as_deref(), Some("cool-thing"));
}
