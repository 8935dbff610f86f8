//! Pull tokenizer over one input line.
//!
//! Words are spans into the line rather than owned strings; the finalize
//! pass in [`super::ast`] copies them out once the whole tree has parsed.

/// Half-open byte range into the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn as_str<'a>(&self, line: &'a str) -> &'a str {
        &line[self.start..self.end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Eof,
    Word(Span),
    Pipe,
    Less,
    Great,
    /// `>>`, consumed as one token.
    GreatGreat,
    Amp,
    Semi,
    LParen,
    RParen,
}

/// The grammar's single-character symbols. `>` doubles as the first byte
/// of the append marker.
pub const SYMBOLS: &[u8] = b"<|>&;()";

/// Cursor over the line. `Copy`, so the parser can snapshot it for
/// bounded lookahead without a token buffer.
#[derive(Debug, Clone, Copy)]
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Non-consuming lookahead: does the next non-whitespace byte belong
    /// to `set`?
    pub fn peek(&mut self, set: &[u8]) -> bool {
        self.skip_whitespace();
        match self.bytes().get(self.pos) {
            Some(b) => set.contains(b),
            None => false,
        }
    }

    /// True once only whitespace remains.
    pub fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.src.len()
    }

    /// Unconsumed remainder of the line, for diagnostics.
    pub fn rest(&mut self) -> &'a str {
        self.skip_whitespace();
        &self.src[self.pos..]
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let bytes = self.bytes();
        let Some(&b) = bytes.get(self.pos) else {
            return Token::Eof;
        };
        match b {
            b'|' => {
                self.pos += 1;
                Token::Pipe
            }
            b'<' => {
                self.pos += 1;
                Token::Less
            }
            b'&' => {
                self.pos += 1;
                Token::Amp
            }
            b';' => {
                self.pos += 1;
                Token::Semi
            }
            b'(' => {
                self.pos += 1;
                Token::LParen
            }
            b')' => {
                self.pos += 1;
                Token::RParen
            }
            b'>' => {
                self.pos += 1;
                if bytes.get(self.pos) == Some(&b'>') {
                    self.pos += 1;
                    Token::GreatGreat
                } else {
                    Token::Great
                }
            }
            _ => {
                let start = self.pos;
                while self.pos < bytes.len()
                    && !bytes[self.pos].is_ascii_whitespace()
                    && !SYMBOLS.contains(&bytes[self.pos])
                {
                    self.pos += 1;
                }
                Token::Word(Span {
                    start,
                    end: self.pos,
                })
            }
        }
    }
}
