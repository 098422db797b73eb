use crate::common::command::{
    branch_history, commit_file, init_repository_dir, run_twig_command, stdout_of,
};
use assert_fs::TempDir;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

const COMMIT_DATE_LINE: &str = "Date: Sun Jan 1 12:00:00 2023 +0000";
const ROOT_DATE_LINE: &str = "Date: Thu Jan 1 00:00:00 1970 +0000";

#[rstest]
fn log_lists_the_branch_history_newest_first(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_file(dir, "notwug.txt", "not a wug\n", "added notwug");
    let history = branch_history(dir, "master");
    assert_eq!(history.len(), 3);

    let log = stdout_of(run_twig_command(dir, &["log"]));

    let expected = format!(
        "===\ncommit {}\n{COMMIT_DATE_LINE}\nadded notwug\n\n\
         ===\ncommit {}\n{COMMIT_DATE_LINE}\nadded wug\n\n\
         ===\ncommit {}\n{ROOT_DATE_LINE}\ninitial commit\n\n",
        history[2], history[1], history[0]
    );
    assert_eq!(log, expected);
}

#[rstest]
fn log_only_follows_the_current_branch(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "side"]).assert().success();
    run_twig_command(dir, &["checkout", "side"]).assert().success();
    commit_file(dir, "side.txt", "side\n", "side work");
    run_twig_command(dir, &["checkout", "master"]).assert().success();

    run_twig_command(dir, &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("side work").not());

    run_twig_command(dir, &["global-log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("side work"))
        .stdout(predicate::str::contains("added wug"))
        .stdout(predicate::str::contains("initial commit"));
}

#[rstest]
fn global_log_shows_every_commit_once(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_file(dir, "notwug.txt", "not a wug\n", "added notwug");

    let global_log = stdout_of(run_twig_command(dir, &["global-log"]));

    assert_eq!(global_log.matches("===\n").count(), 3);
    let mut ids = global_log
        .lines()
        .filter_map(|line| line.strip_prefix("commit "))
        .collect::<Vec<_>>();
    let listed = ids.clone();
    ids.sort();
    assert_eq!(listed, ids);
}

#[rstest]
fn find_prints_every_commit_with_the_message(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    commit_file(dir, "a.txt", "a\n", "same message");
    commit_file(dir, "b.txt", "b\n", "same message");
    let history = branch_history(dir, "master");

    let found = stdout_of(run_twig_command(dir, &["find", "same message"]));

    let mut expected = vec![history[2].clone(), history[3].clone()];
    expected.sort();
    assert_eq!(found, format!("{}\n{}\n", expected[0], expected[1]));
}

#[rstest]
fn find_without_a_match_is_reported(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["find", "never written"])
        .assert()
        .success()
        .stdout("No commit with that name found: never written\n");
}

#[rstest]
fn merge_commits_show_both_parents(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "other"]).assert().success();
    commit_file(dir, "mine.txt", "mine\n", "on master");
    let master_head = branch_history(dir, "master").pop().unwrap();
    run_twig_command(dir, &["checkout", "other"]).assert().success();
    commit_file(dir, "theirs.txt", "theirs\n", "on other");
    let other_head = branch_history(dir, "other").pop().unwrap();
    run_twig_command(dir, &["checkout", "master"]).assert().success();

    run_twig_command(dir, &["merge", "other"])
        .assert()
        .success()
        .stdout("");

    let log = stdout_of(run_twig_command(dir, &["log"]));
    let merge_line = format!("Merge: {} {}\n", &master_head[..7], &other_head[..7]);
    assert!(log.contains(&merge_line), "{log}");
    assert!(log.contains("Merged other into master.\n"));
}
