//! Grammar productions, one file per family of rules.
//!
//! Each file adds `parse_*` methods to [`Parser`](super::Parser). A rule
//! consumes tokens, appends elements to the parent it is given and leaves
//! the stream at the first token after what it recognized.

mod fields;
mod nodes;
mod protos;
mod routes;
mod script;
mod statements;
mod values;
