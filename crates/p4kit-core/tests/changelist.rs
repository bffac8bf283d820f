mod common;

use std::fs;

use common::{argv, p4, ScriptedRunner};
use p4kit_core::P4Error;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn create_changelist_submits_spec_and_returns_number() {
    let runner = ScriptedRunner::new().ok("Change 137 created.\n");
    let number = p4(&runner).create_changelist().expect("create");
    assert_eq!(number, "137");

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args, argv(&["change", "-i"]));
    let stdin = calls[0].stdin.as_deref().expect("spec on stdin");
    assert!(stdin.starts_with("Change: new\n\nClient: alice-main\n\nUser: alice\n\nStatus: new\n\n"));
}

#[test]
fn create_changelist_without_confirmation_is_protocol_error() {
    let runner = ScriptedRunner::new().ok("Something else happened.\n");
    assert!(matches!(
        p4(&runner).create_changelist(),
        Err(P4Error::Protocol { .. })
    ));
}

#[test]
fn create_changelist_non_zero_exit_is_operation_error() {
    let runner = ScriptedRunner::new().fail("Perforce password (P4PASSWD) invalid or unset.\n");
    assert!(matches!(
        p4(&runner).create_changelist(),
        Err(P4Error::Operation { .. })
    ));
}

#[test]
fn best_effort_operations_build_fixed_arguments_and_ignore_status() {
    let runner = ScriptedRunner::new()
        .fail("add failed")
        .fail("edit failed")
        .fail("reopen failed")
        .fail("revert failed")
        .fail("copy failed");
    let client = p4(&runner);

    assert_eq!(client.add("5", "/ws/new.txt").expect("add").status, 1);
    assert_eq!(client.edit("5", "//depot/a.txt").expect("edit").status, 1);
    assert_eq!(
        client.reopen("5", "binary+l", "//depot/a.bin").expect("reopen").status,
        1
    );
    assert_eq!(client.revert("//depot/a.txt").expect("revert").status, 1);
    assert_eq!(
        client.copy("5", "//depot/x", "//depot/y").expect("copy").status,
        1
    );

    assert_eq!(
        runner.call_args(),
        vec![
            argv(&["add", "-c", "5", "-I", "/ws/new.txt"]),
            argv(&["edit", "-c", "5", "//depot/a.txt"]),
            argv(&["reopen", "-c", "5", "-t", "binary+l", "//depot/a.bin"]),
            argv(&["revert", "//depot/a.txt"]),
            argv(&["copy", "-c", "5", "//depot/x", "//depot/y"]),
        ]
    );
}

#[test]
fn best_effort_result_can_be_checked_by_caller() {
    let runner = ScriptedRunner::new().fail("//depot/a.txt - file(s) not opened on this client.");
    let err = p4(&runner)
        .revert("//depot/a.txt")
        .expect("ran")
        .check("revert")
        .expect_err("checked");
    assert!(matches!(err, P4Error::Operation { .. }));
}

#[test]
fn merge_moves_opened_files_then_deletes_changelist() {
    let runner = ScriptedRunner::new()
        .ok("//depot/a.txt#3\n//depot/b.txt#1\n")
        .ok("")
        .ok("Change 200 deleted.\n");
    let moved = p4(&runner).merge_changelists("100", "200").expect("merge");
    assert_eq!(moved, 2);
    assert_eq!(
        runner.call_args(),
        vec![
            argv(&["opened", "-c", "200"]),
            argv(&["reopen", "-c", "100", "//depot/a.txt", "//depot/b.txt"]),
            argv(&["changelist", "-d", "200"]),
        ]
    );
}

#[test]
fn merge_with_nothing_opened_only_deletes() {
    let runner = ScriptedRunner::new().ok("").ok("Change 200 deleted.\n");
    let moved = p4(&runner).merge_changelists("100", "200").expect("merge");
    assert_eq!(moved, 0);
    assert_eq!(
        runner.call_args(),
        vec![argv(&["opened", "-c", "200"]), argv(&["changelist", "-d", "200"])]
    );
}

#[test]
fn merge_rejects_non_numeric_ids_before_running_anything() {
    let runner = ScriptedRunner::new();
    for (keep, merge) in [("12a", "200"), ("100", "12a"), ("", "200")] {
        assert!(matches!(
            p4(&runner).merge_changelists(keep, merge),
            Err(P4Error::Validation(_))
        ));
    }
    assert!(runner.calls().is_empty());
}

#[test]
fn merge_reopen_failure_reports_count_and_first_file() {
    let runner = ScriptedRunner::new()
        .ok("//depot/a.txt#3 - edit\n//depot/b.txt#1 - edit\n")
        .fail("locked by bob\n");
    let err = p4(&runner).merge_changelists("100", "200").expect_err("fails");
    match err {
        P4Error::Operation { message, stderr } => {
            assert_eq!(message, "Couldn't reopen 2 files including //depot/a.txt");
            assert_eq!(stderr, "locked by bob");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // The merge changelist is left alone when its files could not be moved.
    assert_eq!(runner.calls().len(), 2);
}

#[test]
fn merge_delete_failure_is_reported() {
    let runner = ScriptedRunner::new()
        .ok("")
        .fail("Change 200 has shelved files.\n");
    let err = p4(&runner).merge_changelists("100", "200").expect_err("fails");
    assert_eq!(
        err.to_string(),
        "Couldn't delete changelist 200: Change 200 has shelved files."
    );
}

#[test]
fn tree_revert_lists_every_file_under_the_workspace_path() {
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path().join("proj");
    fs::create_dir_all(root.join("src").join("nested")).expect("dirs");
    fs::write(root.join("a.txt"), "a").expect("a");
    fs::write(root.join("src").join("b.rs"), "b").expect("b");
    fs::write(root.join("src").join("nested").join("c.rs"), "c").expect("c");
    let root_str = root.to_string_lossy().to_string();

    let runner = ScriptedRunner::new()
        .ok(&format!("//depot/proj/... //alice-main/proj/... {}\n", root_str))
        .ok("");
    let result = p4(&runner).tree_revert("//depot/proj/...").expect("revert");
    assert!(result.is_some());

    let calls = runner.call_args();
    assert_eq!(calls[0], argv(&["where", "//depot/proj/..."]));
    let mut reverted = calls[1][1..].to_vec();
    reverted.sort();
    let mut expected = vec![
        root.join("a.txt").to_string_lossy().to_string(),
        root.join("src").join("b.rs").to_string_lossy().to_string(),
        root.join("src").join("nested").join("c.rs").to_string_lossy().to_string(),
    ];
    expected.sort();
    assert_eq!(calls[1][0], "revert");
    assert_eq!(reverted, expected);
}

#[test]
fn tree_revert_with_no_files_runs_nothing() {
    let temp = TempDir::new().expect("tempdir");
    fs::create_dir_all(temp.path().join("empty").join("sub")).expect("dirs");
    let root_str = temp.path().join("empty").to_string_lossy().to_string();

    let runner = ScriptedRunner::new().ok(&format!("//depot/e //ws/e {}\n", root_str));
    let result = p4(&runner).tree_revert("//depot/e").expect("revert");
    assert!(result.is_none());
    assert_eq!(runner.call_args(), vec![argv(&["where", "//depot/e"])]);
}

#[test]
fn tree_revert_of_wildcard_path_without_local_files_runs_nothing() {
    let temp = TempDir::new().expect("tempdir");
    let local = temp.path().join("proj").join("...");
    let runner = ScriptedRunner::new().ok(&format!(
        "//depot/proj/... //alice-main/proj/... {}\n",
        local.to_string_lossy()
    ));
    let result = p4(&runner).tree_revert("//depot/proj/...").expect("revert");
    assert!(result.is_none());
    assert_eq!(runner.call_args(), vec![argv(&["where", "//depot/proj/..."])]);
}

#[cfg(unix)]
#[test]
fn tree_revert_includes_symlinks_but_not_links_to_directories() {
    use std::os::unix::fs::symlink;

    let temp = TempDir::new().expect("tempdir");
    let root = temp.path().join("proj");
    fs::create_dir_all(root.join("sub")).expect("dirs");
    fs::write(root.join("real.txt"), "real").expect("real");
    symlink(root.join("real.txt"), root.join("link.txt")).expect("file link");
    symlink(root.join("gone.txt"), root.join("dangling.txt")).expect("dangling link");
    symlink(root.join("sub"), root.join("sublink")).expect("dir link");

    let runner = ScriptedRunner::new()
        .ok(&format!("//depot/proj/... //ws/proj/... {}\n", root.to_string_lossy()))
        .ok("");
    p4(&runner).tree_revert("//depot/proj/...").expect("revert");

    let calls = runner.call_args();
    let mut reverted = calls[1][1..].to_vec();
    reverted.sort();
    let mut expected: Vec<String> = ["dangling.txt", "link.txt", "real.txt"]
        .iter()
        .map(|name| root.join(name).to_string_lossy().to_string())
        .collect();
    expected.sort();
    assert_eq!(reverted, expected);
}
