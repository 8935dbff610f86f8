pub mod ast;
mod lexer;
#[allow(clippy::module_inception)]
mod parser;

pub use lexer::{Lexer, Span, Token};
pub use parser::{parse, ParseError, MAX_ARGS};
