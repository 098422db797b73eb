use crate::common::file::{FileSpec, write_file};
use crate::common::redirect_temp_dir;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

/// Commit timestamp every test commit is pinned to
pub const COMMIT_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    redirect_temp_dir();
    TempDir::new().expect("Failed to create temp dir")
}

/// A repository with `wug.txt` committed on `master`
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("wug.txt"),
        "This is a wug.\n".to_string(),
    ));
    run_twig_command(repository_dir.path(), &["add", "wug.txt"])
        .assert()
        .success();
    twig_commit(repository_dir.path(), "added wug")
        .assert()
        .success();

    repository_dir
}

pub fn run_twig_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("twig").expect("Failed to find twig binary");
    cmd.envs(vec![("NO_PAGER", "1"), ("TWIG_COMMIT_DATE", COMMIT_DATE)]);
    cmd.env_remove("TWIG_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn twig_commit(dir: &Path, message: &str) -> Command {
    run_twig_command(dir, &["commit", message])
}

pub fn twig_merge(dir: &Path, branch: &str) -> Command {
    run_twig_command(dir, &["merge", branch])
}

/// Write `content` to `file`, stage it and commit it
pub fn commit_file(dir: &Path, file: &str, content: &str, message: &str) {
    write_file(FileSpec::new(dir.join(file), content.to_string()));
    run_twig_command(dir, &["add", file]).assert().success();
    twig_commit(dir, message).assert().success().stdout("");
}

/// Captured stdout of a command that is expected to succeed
pub fn stdout_of(mut cmd: Command) -> String {
    let output = cmd.output().expect("Failed to run twig");
    assert!(output.status.success(), "twig exited with {}", output.status);

    String::from_utf8(output.stdout).expect("stdout is not UTF-8")
}

/// Name of the current branch
pub fn current_branch(dir: &Path) -> String {
    std::fs::read_to_string(dir.join(".twig").join("HEAD"))
        .expect("Failed to read HEAD")
        .trim()
        .to_string()
}

/// Head commit id of a branch, read from its branch file
pub fn branch_head(dir: &Path, branch: &str) -> String {
    let content = std::fs::read_to_string(dir.join(".twig").join("branches").join(branch))
        .unwrap_or_else(|e| panic!("Failed to read branch {branch}: {e}"));

    content
        .lines()
        .find_map(|line| line.strip_prefix("head "))
        .unwrap_or_else(|| panic!("Branch {branch} has no head"))
        .to_string()
}

/// History entries of a branch, oldest first
pub fn branch_history(dir: &Path, branch: &str) -> Vec<String> {
    let content = std::fs::read_to_string(dir.join(".twig").join("branches").join(branch))
        .unwrap_or_else(|e| panic!("Failed to read branch {branch}: {e}"));

    content
        .lines()
        .filter_map(|line| line.strip_prefix("history "))
        .map(str::to_string)
        .collect()
}

pub fn head_commit_id(dir: &Path) -> String {
    branch_head(dir, &current_branch(dir))
}

/// Number of commit objects in the object store
pub fn commit_object_count(dir: &Path) -> usize {
    std::fs::read_dir(dir.join(".twig").join("objects"))
        .expect("Failed to list objects")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with('c'))
        .count()
}

/// Raw content of a branch's staging file, if it has one
pub fn stage_content(dir: &Path, branch: &str) -> Option<Vec<u8>> {
    std::fs::read(dir.join(".twig").join("stage").join(branch)).ok()
}
