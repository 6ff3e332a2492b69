//! Recursive-descent parser building the element tree.
//!
//! # Recovery Strategy
//!
//! The parser never fails. It always builds some element and attaches the
//! problem to it:
//!
//! 1. Missing delimiters become zero-width markers; parsing continues as if
//!    they were present
//! 2. A `]` where `}` was expected ends the body without being consumed, so
//!    the enclosing rule sees it
//! 3. Misspelled node and field names are corrected by spelling distance and
//!    still flagged
//! 4. Unknown nodes skip their `{ ... }` block
//! 5. On recursion limit, the offending body is skipped as one marker

mod core;
mod grammar;

#[cfg(test)]
mod tests;

pub(crate) use core::Parser;

use crate::scene::Scene;

/// Parses the whole token stream into `scene`'s root.
pub(crate) fn parse_root(scene: &mut Scene) {
    let mut parser = Parser::new(scene);
    parser.parse_root();
}
