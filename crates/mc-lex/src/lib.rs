//! mc-lex - Lexical analysis for M.
//!
//! Turns source text into a stream of [`SpannedToken`]s. Malformed input
//! (unterminated strings/comments, malformed numeric literals, stray
//! characters) is reported to the shared diagnostics handler and recovered
//! from rather than treated as fatal, so the rest of the file still lexes.

mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{SpannedToken, Token};
