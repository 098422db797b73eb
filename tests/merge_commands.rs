use crate::common::command::{
    branch_head, branch_history, commit_file, commit_object_count, current_branch,
    init_repository_dir, run_twig_command, stage_content, stdout_of, twig_merge,
};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::Path;

mod common;

/// Split at `added wug` plus `notwug.txt`; each side then edits its own copy
fn diverged_branches(dir: &Path) {
    commit_file(dir, "notwug.txt", "This is not a wug.\n", "added notwug");
    run_twig_command(dir, &["branch", "other"]).assert().success();

    commit_file(dir, "wug.txt", "master wug\n", "master edits wug");

    run_twig_command(dir, &["checkout", "other"]).assert().success();
    commit_file(dir, "wug.txt", "other wug\n", "other edits wug");
    commit_file(dir, "k.txt", "new on other\n", "other adds k");
    run_twig_command(dir, &["rm", "notwug.txt"]).assert().success();
    run_twig_command(dir, &["commit", "other removes notwug"])
        .assert()
        .success();

    run_twig_command(dir, &["checkout", "master"]).assert().success();
}

#[rstest]
fn conflicting_merge_writes_markers_and_commits(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    diverged_branches(dir);
    let master_head = branch_head(dir, "master");
    let other_head = branch_head(dir, "other");

    twig_merge(dir, "other")
        .assert()
        .success()
        .stdout("Encountered a merge conflict.\n");

    assert_eq!(
        read_file(&dir.join("wug.txt")),
        "<<<<<<< HEAD\nmaster wug\n=======\nother wug\n>>>>>>>\n"
    );
    assert_eq!(read_file(&dir.join("k.txt")), "new on other\n");
    assert!(!dir.join("notwug.txt").exists());

    let history = branch_history(dir, "master");
    assert_eq!(history[history.len() - 2], master_head);
    let log = stdout_of(run_twig_command(dir, &["log"]));
    assert!(log.starts_with(&format!(
        "===\ncommit {}\nMerge: {} {}\n",
        branch_head(dir, "master"),
        &master_head[..7],
        &other_head[..7]
    )));
    assert!(log.contains("Merged other into master.\n"));

    let status = stdout_of(run_twig_command(dir, &["status"]));
    assert!(status.contains("=== Staged Files ===\n\n=== Removed Files ===\n\n"));
}

#[rstest]
fn clean_merge_is_silent(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "other"]).assert().success();
    commit_file(dir, "mine.txt", "mine\n", "master adds mine");
    run_twig_command(dir, &["checkout", "other"]).assert().success();
    commit_file(dir, "wug.txt", "other wug\n", "other edits wug");
    run_twig_command(dir, &["checkout", "master"]).assert().success();

    twig_merge(dir, "other").assert().success().stdout("");

    assert_eq!(read_file(&dir.join("wug.txt")), "other wug\n");
    assert_eq!(read_file(&dir.join("mine.txt")), "mine\n");
}

#[rstest]
fn merge_deletes_untracked_files_left_in_the_tree(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    diverged_branches(dir);
    write_file(FileSpec::new(dir.join("scratch.txt"), "scratch\n".into()));

    twig_merge(dir, "other").assert().success();

    assert!(!dir.join("scratch.txt").exists());
}

#[rstest]
fn merge_fast_forwards_when_the_current_head_is_the_split_point(
    init_repository_dir: TempDir,
) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "other"]).assert().success();
    run_twig_command(dir, &["checkout", "other"]).assert().success();
    commit_file(dir, "ahead.txt", "ahead\n", "other moves ahead");
    run_twig_command(dir, &["checkout", "master"]).assert().success();
    let commits_before = commit_object_count(dir);

    twig_merge(dir, "other")
        .assert()
        .success()
        .stdout("Current branch fast-forwarded.\n");

    assert_eq!(commit_object_count(dir), commits_before);
    assert_eq!(branch_head(dir, "master"), branch_head(dir, "other"));
    assert_eq!(branch_history(dir, "master"), branch_history(dir, "other"));
    assert_eq!(current_branch(dir), "master");
    assert_eq!(read_file(&dir.join("ahead.txt")), "ahead\n");
}

#[rstest]
fn merging_an_ancestor_is_refused(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "behind"]).assert().success();
    commit_file(dir, "ahead.txt", "ahead\n", "master moves ahead");
    let head = branch_head(dir, "master");
    let history = branch_history(dir, "master");
    let behind_history = branch_history(dir, "behind");
    let stage = stage_content(dir, "master");
    let commits_before = commit_object_count(dir);

    twig_merge(dir, "behind")
        .assert()
        .success()
        .stdout("Given branch is an ancestor of the current branch.\n");

    assert_eq!(branch_head(dir, "master"), head);
    assert_eq!(branch_history(dir, "master"), history);
    assert_eq!(branch_history(dir, "behind"), behind_history);
    assert_eq!(stage_content(dir, "master"), stage);
    assert_eq!(commit_object_count(dir), commits_before);
    assert_eq!(current_branch(dir), "master");
}

#[rstest]
#[case::itself("master", "Cannot merge a branch with itself.\n")]
#[case::missing("nowhere", "A branch with that name does not exist.\n")]
fn merge_refusals(init_repository_dir: TempDir, #[case] branch: &str, #[case] expected: &str) {
    twig_merge(init_repository_dir.path(), branch)
        .assert()
        .success()
        .stdout(expected.to_string());
}

#[rstest]
fn merge_with_staged_changes_is_refused(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    diverged_branches(dir);
    write_file(FileSpec::new(dir.join("pending.txt"), "pending\n".into()));
    run_twig_command(dir, &["add", "pending.txt"]).assert().success();

    twig_merge(dir, "other")
        .assert()
        .success()
        .stdout("You have uncommitted changes.\n");
}

#[rstest]
fn staged_changes_are_reported_before_a_missing_branch(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["rm", "wug.txt"]).assert().success();

    twig_merge(dir, "nowhere")
        .assert()
        .success()
        .stdout("You have uncommitted changes.\n");
}

#[rstest]
fn merge_leaves_everything_alone_when_an_untracked_file_is_in_the_way(
    init_repository_dir: TempDir,
) {
    let dir = init_repository_dir.path();
    diverged_branches(dir);
    write_file(FileSpec::new(dir.join("k.txt"), "mine, untracked\n".into()));
    let head = branch_head(dir, "master");

    twig_merge(dir, "other")
        .assert()
        .success()
        .stdout(
            "There is an untracked file in the way; delete it, or add and commit it first.\n",
        );

    assert_eq!(branch_head(dir, "master"), head);
    assert_eq!(read_file(&dir.join("k.txt")), "mine, untracked\n");
    assert_eq!(read_file(&dir.join("wug.txt")), "master wug\n");
    assert_eq!(read_file(&dir.join("notwug.txt")), "This is not a wug.\n");
}
