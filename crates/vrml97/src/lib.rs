//! VRML97 parser and validator.
//!
//! Parsing never fails: malformed input produces a scene whose elements
//! carry errors and warnings.
//!
//! # Example
//!
//! ```
//! let source = "#VRML V2.0 utf8\nDEF A Group {}\nUSE B\n";
//! let scene = vrml97::parse(source);
//!
//! let diagnostics = scene.diagnostics();
//! assert_eq!(diagnostics.error_count(), 1);
//! eprintln!("{}", diagnostics.printer(scene.source()).render());
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod diagnostics;
pub mod scene;
pub mod tokens;
pub mod values;

mod parser;
mod verify;

pub use config::{DefNameGenerator, ParseConfig, WarningBudget};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use scene::{Element, ElementId, ElementKind, Scene, ScenePrinter, TokenSpan, Visitor};
pub use values::FieldValue;
pub use vrml97_core::{FieldType, InterfaceKind, NodeClass};

/// Parses `source` with the default configuration.
pub fn parse(source: &str) -> Scene {
    Scene::parse(source, ParseConfig::default())
}

/// Token stream misuse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token {pos} out of range ({len} tokens)")]
    OutOfRange { pos: usize, len: usize },

    #[error("`{text}` is not a number")]
    NotANumber { text: String },
}

/// Rejected scene edit. The scene is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("element {0:?} does not exist or is detached")]
    NoSuchElement(ElementId),

    #[error("element {0:?} is a generated PROTO instance copy")]
    Generated(ElementId),

    #[error("element {0:?} lies inside a PROTO declaration")]
    InsidePrototype(ElementId),

    #[error("element {0:?} is not a statement, field or ROUTE")]
    NotRemovable(ElementId),

    #[error("DEF `{name}` is still referenced")]
    StillReferenced { name: String },

    #[error("element {0:?} is not a node with a body")]
    NotANode(ElementId),

    #[error("`{node}` has no field `{field}`")]
    UnknownField { node: String, field: String },

    #[error("field `{field}` does not hold nodes")]
    NotANodeField { field: String },

    #[error("field `{field}` holds nodes, use `add_node`")]
    NodeField { field: String },

    #[error("field `{field}` already holds a node")]
    FieldOccupied { field: String },

    #[error("invalid text: {reason}")]
    InvalidText { reason: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Errors surfaced by the public API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

pub type Result<T> = std::result::Result<T, Error>;
