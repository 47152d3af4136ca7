use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

// Utilities
fn make_cmd() -> Command {
    let mut cmd = Command::cargo_bin("brainfoop").expect("brainfoop binary");
    cmd.timeout(Duration::from_secs(4))
        .env_remove("BFOOP_REPL_MODE")
        .env_remove("BFOOP_TIMEOUT_MS")
        .env_remove("BFOOP_MAX_STEPS")
        .env_remove("BFOOP_OUTPUT");
    cmd
}

fn print_a() -> String {
    format!("{}.", "+".repeat(65))
}

#[test]
fn repl_empty_input_exits_clean_and_quiet() {
    // Piped stdin auto-selects bare mode, which prints no prompt
    make_cmd()
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn repl_runs_each_line_on_a_fresh_tape() {
    // Both lines print 'A'; the second does not start from 65
    make_cmd()
        .arg("repl")
        .write_stdin(format!("{0}\n{0}\n", print_a()))
        .assert()
        .success()
        .stdout("A\nA\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn repl_quit_line_stops_session() {
    make_cmd()
        .write_stdin(format!("{}\nq\n{}\n", print_a(), print_a()))
        .assert()
        .success()
        .stdout("A\n");
}

#[test]
fn repl_comment_only_lines_are_skipped() {
    make_cmd()
        .write_stdin("just a note\n\n+.\n")
        .assert()
        .success()
        .stdout("\u{1}\n");
}

#[test]
fn repl_structural_error_ends_session_with_status_1() {
    make_cmd()
        .write_stdin(format!("[\n{}\n", print_a()))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Structural error: unmatched bracket '['"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn repl_input_reads_following_stdin() {
    // ',' consumes the bytes after the program's own line
    make_cmd()
        .arg("repl")
        .arg("--bare")
        .write_stdin(",.\nZ\n")
        .assert()
        .success()
        .stdout("Z\n");
}

#[test]
fn repl_raw_output_flag() {
    make_cmd()
        .args(["repl", "--output", "raw"])
        .write_stdin(format!("{}+.\n", print_a()))
        .assert()
        .success()
        .stdout("AB");
}

#[test]
fn repl_forced_editor_on_non_tty_errors() {
    make_cmd()
        .arg("repl")
        .arg("--editor")
        .write_stdin("+.")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("stdin is not a TTY"));
}

#[test]
fn repl_env_mode_respected_flags_override() {
    make_cmd()
        .env("BFOOP_REPL_MODE", "editor")
        .arg("repl")
        .arg("--bare")
        .write_stdin("+.")
        .assert()
        .success()
        .stdout("\u{1}\n");
}

#[test]
fn repl_invalid_env_mode_is_error() {
    make_cmd()
        .env("BFOOP_REPL_MODE", "fancy")
        .write_stdin("+.")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid BFOOP_REPL_MODE value"));
}
