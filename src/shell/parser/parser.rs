//! Recursive-descent parser for the command grammar:
//!
//! ```text
//! line   := pipe ('&')*  (';' line)?
//! pipe   := exec ('|' pipe)?
//! exec   := 'wait'  |  block  |  redir* word redir* (word redir*)*
//! block  := '(' line ')' redir*
//! redir  := ('<' | '>' | '>>') word
//! ```

use std::os::unix::io::RawFd;

use thiserror::Error;

use super::ast::{Cmd, RedirMode, SpanTree};
use super::lexer::{Lexer, Span, Token};

/// Upper bound on arguments per command, from the original shell.
pub const MAX_ARGS: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("syntax error near `{0}`")]
    Unexpected(String),
    #[error("syntax error: missing command")]
    MissingCommand,
    #[error("syntax error: missing `)`")]
    UnmatchedParen,
    #[error("syntax error: missing file for redirection")]
    MissingRedirTarget,
    #[error("too many arguments (limit {MAX_ARGS})")]
    TooManyArgs,
    #[error("syntax error: trailing input `{0}`")]
    Leftovers(String),
}

/// Parse one whole line into a span tree. The caller runs
/// [`super::ast::finalize`] on the result before executing it.
pub fn parse(line: &str) -> Result<SpanTree, ParseError> {
    let mut lx = Lexer::new(line);
    let cmd = parse_line(&mut lx, line)?;
    if !lx.at_end() {
        return Err(ParseError::Leftovers(lx.rest().to_string()));
    }
    Ok(cmd)
}

fn parse_line(lx: &mut Lexer<'_>, line: &str) -> Result<SpanTree, ParseError> {
    let mut cmd = parse_pipe(lx, line)?;
    while lx.peek(b"&") {
        lx.next_token();
        cmd = Cmd::Back { cmd: Box::new(cmd) };
    }
    if lx.peek(b";") {
        lx.next_token();
        let right = parse_line(lx, line)?;
        cmd = Cmd::List {
            left: Box::new(cmd),
            right: Box::new(right),
        };
    }
    Ok(cmd)
}

fn parse_pipe(lx: &mut Lexer<'_>, line: &str) -> Result<SpanTree, ParseError> {
    let cmd = parse_exec(lx, line)?;
    if lx.peek(b"|") {
        lx.next_token();
        let right = parse_pipe(lx, line)?;
        return Ok(Cmd::Pipe {
            left: Box::new(cmd),
            right: Box::new(right),
        });
    }
    Ok(cmd)
}

fn parse_exec(lx: &mut Lexer<'_>, line: &str) -> Result<SpanTree, ParseError> {
    if lx.peek(b"(") {
        return parse_block(lx, line);
    }

    // `wait` standing alone in this production is the wait primitive;
    // followed by anything else it is an ordinary program name.
    let mut ahead = *lx;
    if let Token::Word(w) = ahead.next_token() {
        if w.as_str(line) == "wait" && (ahead.at_end() || ahead.peek(b"|)&;")) {
            *lx = ahead;
            return Ok(Cmd::Wait);
        }
    }

    let mut argv: Vec<Span> = Vec::new();
    let mut redirs = Vec::new();
    parse_redirs(&mut redirs, lx, line)?;
    while !(lx.at_end() || lx.peek(b"|)&;")) {
        match lx.next_token() {
            Token::Word(w) => {
                argv.push(w);
                if argv.len() > MAX_ARGS {
                    return Err(ParseError::TooManyArgs);
                }
            }
            tok => return Err(ParseError::Unexpected(describe(tok, line))),
        }
        parse_redirs(&mut redirs, lx, line)?;
    }
    if argv.is_empty() {
        return Err(ParseError::MissingCommand);
    }
    Ok(wrap_redirs(Cmd::Exec { argv }, redirs))
}

fn parse_block(lx: &mut Lexer<'_>, line: &str) -> Result<SpanTree, ParseError> {
    lx.next_token(); // consume `(`
    let cmd = parse_line(lx, line)?;
    if !lx.peek(b")") {
        return Err(ParseError::UnmatchedParen);
    }
    lx.next_token();
    let mut redirs = Vec::new();
    parse_redirs(&mut redirs, lx, line)?;
    Ok(wrap_redirs(cmd, redirs))
}

fn parse_redirs(
    redirs: &mut Vec<(Span, RedirMode, RawFd)>,
    lx: &mut Lexer<'_>,
    _line: &str,
) -> Result<(), ParseError> {
    while lx.peek(b"<>") {
        let op = lx.next_token();
        let file = match lx.next_token() {
            Token::Word(w) => w,
            _ => return Err(ParseError::MissingRedirTarget),
        };
        match op {
            Token::Less => redirs.push((file, RedirMode::Read, 0)),
            Token::Great => redirs.push((file, RedirMode::Truncate, 1)),
            Token::GreatGreat => redirs.push((file, RedirMode::Append, 1)),
            _ => break,
        }
    }
    Ok(())
}

/// Wrap `cmd` in the accumulated redirections, earliest innermost.
fn wrap_redirs(mut cmd: SpanTree, redirs: Vec<(Span, RedirMode, RawFd)>) -> SpanTree {
    for (file, mode, fd) in redirs {
        cmd = Cmd::Redir {
            cmd: Box::new(cmd),
            file,
            mode,
            fd,
        };
    }
    cmd
}

fn describe(tok: Token, line: &str) -> String {
    match tok {
        Token::Eof => "end of line".to_string(),
        Token::Word(w) => w.as_str(line).to_string(),
        Token::Pipe => "|".to_string(),
        Token::Less => "<".to_string(),
        Token::Great => ">".to_string(),
        Token::GreatGreat => ">>".to_string(),
        Token::Amp => "&".to_string(),
        Token::Semi => ";".to_string(),
        Token::LParen => "(".to_string(),
        Token::RParen => ")".to_string(),
    }
}
