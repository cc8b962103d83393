use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::TempDir;

fn tagver_cmd() -> Command {
    cargo_bin_cmd!("tagver")
}

fn create_git_repo() -> TempDir {
    let temp = TempDir::new().unwrap();
    let repo_path = temp.path();

    Command::new("git").arg("init").current_dir(repo_path).assert().success();
    Command::new("git")
        .args(["config", "user.email", "test@example.com"])
        .current_dir(repo_path)
        .assert()
        .success();
    Command::new("git")
        .args(["config", "user.name", "Test User"])
        .current_dir(repo_path)
        .assert()
        .success();
    Command::new("git")
        .args(["commit", "--allow-empty", "-m", "Initial commit"])
        .current_dir(repo_path)
        .assert()
        .success();
    temp
}

fn create_git_repo_with_tag(tag: &str) -> TempDir {
    let temp = create_git_repo();
    Command::new("git")
        .args(["tag", tag])
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

fn commit(repo_path: &std::path::Path, message: &str) {
    Command::new("git")
        .args(["commit", "--allow-empty", "-m", message])
        .current_dir(repo_path)
        .assert()
        .success();
}

#[test]
fn test_help_flag() {
    tagver_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Calculate a GitFlow-aware semantic version",
        ));
}

#[test]
fn test_version_flag() {
    tagver_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"tagver \d+\.\d+\.\d+").unwrap());
}

#[test]
fn test_in_git_repo_no_tags() {
    let temp = create_git_repo();
    tagver_cmd()
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_in_git_repo_with_tag() {
    let temp = create_git_repo_with_tag("1.0.0");
    tagver_cmd()
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1.0.0"));
}

#[test]
fn test_non_git_directory() {
    let temp = TempDir::new().unwrap();
    tagver_cmd().current_dir(temp.path()).assert().code(2);
}

#[test]
fn test_fix_commit_bumps_patch() {
    let temp = create_git_repo_with_tag("1.0.0");
    commit(temp.path(), "fix: a bug");
    tagver_cmd()
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1.0.1"));
}

#[test]
fn test_feat_commit_bumps_minor() {
    let temp = create_git_repo_with_tag("1.0.0");
    commit(temp.path(), "feat: a feature");
    tagver_cmd()
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1.1.0"));
}

#[test]
fn test_explicit_branch_override() {
    let temp = create_git_repo_with_tag("1.0.0");
    let repo_path = temp.path();
    Command::new("git")
        .args(["checkout", "-b", "develop"])
        .current_dir(repo_path)
        .assert()
        .success();
    commit(repo_path, "feat: work on develop");

    tagver_cmd()
        .current_dir(repo_path)
        .arg("--branch")
        .arg("develop")
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"));
}

#[test]
fn test_config_overlay_sets_tag_prefix() {
    let temp = create_git_repo();
    let repo_path = temp.path();
    Command::new("git")
        .args(["tag", "v1.0.0"])
        .current_dir(repo_path)
        .assert()
        .success();

    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(config_file, "tag-prefix: v").unwrap();

    tagver_cmd()
        .current_dir(repo_path)
        .arg("--config")
        .arg(config_file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1.0.0"));
}

#[test]
fn test_explain_flag_prints_reasoning() {
    let temp = create_git_repo_with_tag("1.0.0");
    tagver_cmd()
        .current_dir(temp.path())
        .arg("--explain")
        .assert()
        .success()
        .stdout(predicate::str::contains("1.0.0"));
}

#[test]
fn test_json_output() {
    let temp = create_git_repo_with_tag("1.2.3");
    tagver_cmd()
        .current_dir(temp.path())
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""SemVer""#))
        .stdout(predicate::str::contains(r#""Major": "1""#))
        .stdout(predicate::str::contains(r#""Minor": "2""#))
        .stdout(predicate::str::contains(r#""Patch": "3""#));
}

#[test]
fn test_invalid_config_path_fails() {
    let temp = create_git_repo();
    tagver_cmd()
        .current_dir(temp.path())
        .arg("--config")
        .arg("does-not-exist.yml")
        .assert()
        .code(2);
}
