//! End-to-end tests: drive the shell binary over piped stdin (scripted
//! mode) inside a scratch directory with a scratch `$HOME`.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

struct Session {
    home: TempDir,
    cwd: TempDir,
}

impl Session {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
            cwd: TempDir::new().unwrap(),
        }
    }

    fn dir(&self) -> &Path {
        self.cwd.path()
    }

    fn run(&self, script: &str) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_treesh"))
            .current_dir(self.cwd.path())
            .env("HOME", self.home.path())
            .env("TREESH_LOG", "error")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .as_mut()
            .unwrap()
            .write_all(script.as_bytes())
            .unwrap();
        child.wait_with_output().unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn runs_a_simple_command() {
    let session = Session::new();
    let output = session.run("echo hello\n");
    assert!(output.status.success());
    assert!(stdout(&output).contains("hello"));
}

#[test]
fn pipeline_connects_stdout_to_stdin() {
    let session = Session::new();
    let output = session.run("echo one two three | wc -w\n");
    assert_eq!(stdout(&output).trim(), "3");
}

#[test]
fn list_runs_left_before_right() {
    let session = Session::new();
    let output = session.run("echo first; echo second\n");
    let out = stdout(&output);
    let first = out.find("first").unwrap();
    let second = out.find("second").unwrap();
    assert!(first < second);
}

#[test]
fn output_redirection_creates_and_truncates() {
    let session = Session::new();
    session.run("echo stale > out.txt\necho fresh > out.txt\n");
    let content = fs::read_to_string(session.dir().join("out.txt")).unwrap();
    assert_eq!(content, "fresh\n");
}

#[test]
fn append_redirection_keeps_existing_content() {
    let session = Session::new();
    session.run("echo one > log.txt; echo two >> log.txt\n");
    let content = fs::read_to_string(session.dir().join("log.txt")).unwrap();
    assert_eq!(content, "one\ntwo\n");
}

#[test]
fn input_redirection_feeds_the_command() {
    let session = Session::new();
    fs::write(session.dir().join("in.txt"), "a\nb\nc\n").unwrap();
    let output = session.run("wc -l < in.txt\n");
    assert_eq!(stdout(&output).trim(), "3");
}

#[test]
fn missing_input_file_is_reported_and_session_survives() {
    let session = Session::new();
    let output = session.run("wc -l < nope.txt\necho alive\n");
    assert!(stderr(&output).contains("nope.txt"));
    assert!(stdout(&output).contains("alive"));
}

#[test]
fn exec_failure_is_reported_and_session_survives() {
    let session = Session::new();
    let output = session.run("definitely-not-a-program-xyz\necho alive\n");
    let err = stderr(&output);
    assert!(err.contains("definitely-not-a-program-xyz"));
    assert!(err.contains("failed"));
    assert!(stdout(&output).contains("alive"));
}

#[test]
fn parse_error_kills_the_line_not_the_session() {
    let session = Session::new();
    let output = session.run("(echo x\necho alive\n");
    assert!(stderr(&output).contains("syntax error"));
    assert!(stdout(&output).contains("alive"));
}

#[test]
fn subshell_block_redirects_as_a_unit() {
    let session = Session::new();
    session.run("(echo a; echo b) > block.txt\n");
    let content = fs::read_to_string(session.dir().join("block.txt")).unwrap();
    assert_eq!(content, "a\nb\n");
}

#[test]
fn background_line_is_joined_by_wait() {
    let session = Session::new();
    session.run("echo bg > bg.txt &\nwait\n");
    // `wait` blocked until the background line finished, so the file is
    // complete by the time the session exits.
    let content = fs::read_to_string(session.dir().join("bg.txt")).unwrap();
    assert_eq!(content, "bg\n");
}

#[test]
fn cd_builtin_affects_later_commands() {
    let session = Session::new();
    fs::create_dir(session.dir().join("sub")).unwrap();
    session.run("cd sub\necho here > marker.txt\n");
    assert!(session.dir().join("sub/marker.txt").exists());
}

#[test]
fn cd_failure_is_reported_and_session_survives() {
    let session = Session::new();
    let output = session.run("cd definitely-missing-dir\necho alive\n");
    assert!(stderr(&output).contains("cannot cd"));
    assert!(stdout(&output).contains("alive"));
}

#[test]
fn history_lists_entries_once_per_adjacent_run() {
    let session = Session::new();
    let output = session.run("echo a\necho a\necho b\nhistory\n");
    let out = stdout(&output);
    assert_eq!(out.matches("echo a").count(), 1);
    assert!(out.contains("1: echo a"));
    assert!(out.contains("2: echo b"));
}

#[test]
fn bang_bang_with_empty_history_is_an_error() {
    let session = Session::new();
    let output = session.run("!!\n");
    assert!(stderr(&output).contains("no previous command"));
}

#[test]
fn bang_bang_reruns_the_last_command() {
    let session = Session::new();
    let output = session.run("echo again\n!!\n");
    // Once for the original run, once echoed by the substitution, once
    // for the re-run.
    assert_eq!(stdout(&output).matches("again").count(), 3);
}

#[test]
fn exit_builtin_ends_the_session() {
    let session = Session::new();
    let output = session.run("exit\necho unreachable\n");
    assert!(output.status.success());
    assert!(!stdout(&output).contains("unreachable"));
}
