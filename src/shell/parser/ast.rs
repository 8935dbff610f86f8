//! The Command Tree and the finalize pass.
//!
//! The parser builds `Cmd<Span>`, borrowing word boundaries from the input
//! line. [`finalize`] converts that into `Cmd<String>` in one recursion
//! after parsing completes, so the executor works on independent strings.

use std::os::unix::io::RawFd;

use super::lexer::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirMode {
    /// `<`: read-only on slot 0.
    Read,
    /// `>`: write, create, truncate on slot 1.
    Truncate,
    /// `>>`: write, create, append on slot 1.
    Append,
}

/// One node of a parsed command line, polymorphic over the word type.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd<W> {
    Exec {
        argv: Vec<W>,
    },
    Redir {
        cmd: Box<Cmd<W>>,
        file: W,
        mode: RedirMode,
        fd: RawFd,
    },
    Pipe {
        left: Box<Cmd<W>>,
        right: Box<Cmd<W>>,
    },
    List {
        left: Box<Cmd<W>>,
        right: Box<Cmd<W>>,
    },
    Back {
        cmd: Box<Cmd<W>>,
    },
    Wait,
}

/// Tree as produced by the parser: words are spans into the line.
pub type SpanTree = Cmd<Span>;
/// Tree after finalize: every word owns its bytes.
pub type CmdTree = Cmd<String>;

/// Copy every span out of `line` so the tree no longer references it.
/// Runs exactly once, strictly after the whole line has parsed.
pub fn finalize(cmd: SpanTree, line: &str) -> CmdTree {
    match cmd {
        Cmd::Exec { argv } => Cmd::Exec {
            argv: argv
                .into_iter()
                .map(|w| w.as_str(line).to_string())
                .collect(),
        },
        Cmd::Redir {
            cmd,
            file,
            mode,
            fd,
        } => Cmd::Redir {
            cmd: Box::new(finalize(*cmd, line)),
            file: file.as_str(line).to_string(),
            mode,
            fd,
        },
        Cmd::Pipe { left, right } => Cmd::Pipe {
            left: Box::new(finalize(*left, line)),
            right: Box::new(finalize(*right, line)),
        },
        Cmd::List { left, right } => Cmd::List {
            left: Box::new(finalize(*left, line)),
            right: Box::new(finalize(*right, line)),
        },
        Cmd::Back { cmd } => Cmd::Back {
            cmd: Box::new(finalize(*cmd, line)),
        },
        Cmd::Wait => Cmd::Wait,
    }
}
