//! Token source for the parser.
//!
//! The lexer runs once over the whole input; after that the stream is only
//! changed by explicit splices (auto-DEF and tree edits), which re-lex the
//! touched lines and shift everything downstream.

mod lexer;
mod stream;

#[cfg(test)]
mod stream_tests;

pub use lexer::{Token, TokenKind, lex};
pub use stream::{HEADER, TokenStream};

pub(crate) use stream::parse_int;
