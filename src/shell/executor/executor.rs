//! Recursive tree interpreter.
//!
//! [`run`] is only ever called inside the process the session forked for
//! one command line; every composite node owns a further process boundary.
//! Errors here are diagnostics plus a nonzero exit of the affected
//! process, never a propagated `Result` — there is no caller to return to.

use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::os::unix::io::{AsRawFd, RawFd};
use std::process;

use log::debug;
use nix::sys::wait::waitpid;
use nix::unistd::{self, fork, ForkResult};

use crate::shell::parser::ast::{Cmd, CmdTree, RedirMode};

/// Exit status for exec failures, parse errors, and invariant violations.
pub const EXIT_FAILURE: i32 = 1;

/// Execute one finalized command tree; never returns.
pub fn run(cmd: &CmdTree) -> ! {
    match cmd {
        Cmd::Exec { argv } => exec(argv),
        Cmd::Redir {
            cmd,
            file,
            mode,
            fd,
        } => {
            redirect(file, *mode, *fd);
            run(cmd)
        }
        Cmd::Pipe { left, right } => run_pipe(left, right),
        Cmd::List { left, right } => run_list(left, right),
        Cmd::Back { cmd } => {
            if let ForkResult::Child = fork1() {
                run(cmd);
            }
            process::exit(0);
        }
        Cmd::Wait => {
            if let Err(err) = waitpid(None, None) {
                // ECHILD: nothing outstanding to wait for.
                debug!("wait: {err}");
            }
            process::exit(0);
        }
    }
}

/// Replace this process image with the named program. Terminal on
/// success; on failure, diagnostic naming the program and exit 1.
fn exec(argv: &[String]) -> ! {
    if argv.is_empty() {
        process::exit(EXIT_FAILURE);
    }
    let cargs: Vec<CString> = match argv
        .iter()
        .map(|a| CString::new(a.as_str()))
        .collect::<Result<_, _>>()
    {
        Ok(v) => v,
        Err(_) => die(&format!("exec {}: argument contains NUL", argv[0])),
    };
    match unistd::execvp(&cargs[0], &cargs) {
        Ok(infallible) => match infallible {},
        Err(err) => die(&format!("exec {} failed: {}", argv[0], err)),
    }
}

/// Rebind descriptor `fd` to `file` opened per `mode`. The opened file is
/// dup2'd onto the slot and the temporary descriptor closed, so the slot
/// ends up as the only reference.
fn redirect(file: &str, mode: RedirMode, fd: RawFd) {
    let opened = match mode {
        RedirMode::Read => File::open(file),
        RedirMode::Truncate => OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(file),
        RedirMode::Append => OpenOptions::new()
            .write(true)
            .create(true)
            .append(true)
            .open(file),
    };
    let f = match opened {
        Ok(f) => f,
        Err(err) => die(&format!("open {file} failed: {err}")),
    };
    if f.as_raw_fd() != fd {
        if let Err(err) = unistd::dup2(f.as_raw_fd(), fd) {
            die(&format!("dup2 {file} failed: {err}"));
        }
    } else {
        // Already landed on the slot; keep it open past this scope.
        std::mem::forget(f);
    }
}

/// One anonymous channel, two children: left writes slot 1, right reads
/// slot 0. Both ends are closed here and both children joined.
fn run_pipe(left: &CmdTree, right: &CmdTree) -> ! {
    let (read_end, write_end) = match unistd::pipe() {
        Ok(ends) => ends,
        Err(err) => die(&format!("pipe failed: {err}")),
    };
    if let ForkResult::Child = fork1() {
        if let Err(err) = unistd::dup2(write_end.as_raw_fd(), 1) {
            die(&format!("dup2 pipe failed: {err}"));
        }
        drop(read_end);
        drop(write_end);
        run(left);
    }
    if let ForkResult::Child = fork1() {
        if let Err(err) = unistd::dup2(read_end.as_raw_fd(), 0) {
            die(&format!("dup2 pipe failed: {err}"));
        }
        drop(read_end);
        drop(write_end);
        run(right);
    }
    drop(read_end);
    drop(write_end);
    let _ = waitpid(None, None);
    let _ = waitpid(None, None);
    process::exit(0);
}

/// Left subtree in a child, joined before the right subtree takes over
/// this process.
fn run_list(left: &CmdTree, right: &CmdTree) -> ! {
    if let ForkResult::Child = fork1() {
        run(left);
    }
    let _ = waitpid(None, None);
    run(right)
}

fn fork1() -> ForkResult {
    // The child goes straight to exec or to more descriptor plumbing;
    // nothing async-signal-unsafe happens before then.
    match unsafe { fork() } {
        Ok(result) => result,
        Err(err) => die(&format!("fork failed: {err}")),
    }
}

fn die(msg: &str) -> ! {
    eprintln!("treesh: {msg}");
    process::exit(EXIT_FAILURE);
}
