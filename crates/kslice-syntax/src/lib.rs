use kslice_lexer::token::LexerError;
use thiserror::Error;

pub mod ast;
pub mod parser;

pub use parser::parse_kconfig_from_str;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error(transparent)]
    Lexer(#[from] LexerError),
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("`{0}` without a matching opening statement")]
    UnmatchedEnd(&'static str),
    #[error("missing `{0}` before end of file")]
    UnterminatedBlock(&'static str),
}

pub type ParserResult<T> = Result<T, ParseError>;
