pub use lexer::{tokenize, KconfigLexer};

pub use token::Token;

#[macro_use]
pub mod token;
pub mod lexer;
#[cfg(test)]
mod tests;
