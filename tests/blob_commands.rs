use crate::common::command::{
    branch_history, head_commit_id, init_repository_dir, run_twig_command, stdout_of,
};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;
use sha1::{Digest, Sha1};

mod common;

fn expected_blob_id(content: &str) -> String {
    format!("b{:x}", Sha1::digest(content.as_bytes()))
}

#[rstest]
fn hash_object_prints_the_blob_id_without_storing(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("loose.txt"), "loose content\n".into()));
    let blob_id = expected_blob_id("loose content\n");

    run_twig_command(dir, &["hash-object", "loose.txt"])
        .assert()
        .success()
        .stdout(format!("{blob_id}\n"));

    assert!(!dir.join(".twig/objects").join(&blob_id).exists());
}

#[rstest]
fn hash_object_with_write_stores_a_readable_blob(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("loose.txt"), "loose content\n".into()));
    let blob_id = expected_blob_id("loose content\n");

    run_twig_command(dir, &["hash-object", "-w", "loose.txt"])
        .assert()
        .success()
        .stdout(format!("{blob_id}\n"));

    run_twig_command(dir, &["cat-file", &blob_id])
        .assert()
        .success()
        .stdout("loose content\n");
}

#[rstest]
fn cat_file_prints_a_commit_body(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let commit_id = head_commit_id(dir);
    let root_id = branch_history(dir, "master")[0].clone();

    let body = stdout_of(run_twig_command(dir, &["cat-file", &commit_id]));

    assert_eq!(
        body,
        format!(
            "parent {root_id}\ntimestamp 1672574400 +0000\nfile {} wug.txt\n\nadded wug",
            expected_blob_id("This is a wug.\n")
        )
    );
}

#[rstest]
fn cat_file_of_a_missing_object_is_refused(init_repository_dir: TempDir) {
    let missing = expected_blob_id("never stored");

    run_twig_command(init_repository_dir.path(), &["cat-file", &missing])
        .assert()
        .success()
        .stdout(format!("No object with that name found: {missing}\n"));
}
