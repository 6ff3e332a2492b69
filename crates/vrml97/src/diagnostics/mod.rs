//! Errors and warnings attached to scene elements.
//!
//! The annotated tree is the primary reporting surface. [`Diagnostics`] is a
//! flattened, document-ordered copy for hosts and tests.

mod kind;
mod printer;


use std::fmt;
use std::ops::Range;

pub use kind::{DiagnosticKind, Severity, WARNING_PREFIX};
pub use printer::DiagnosticsPrinter;

use crate::scene::{ElementId, Scene, TokenSpan};

/// A message attached to one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub(crate) kind: DiagnosticKind,
    pub(crate) message: String,
    /// Attached by a verifier; dropped when verification reruns.
    pub(crate) verified: bool,
}

impl Note {
    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// A note together with where it sits in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub element: ElementId,
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: TokenSpan,
    /// Byte range in the source; empty for zero-width markers.
    pub range: Range<usize>,
    /// Zero-based line of the first token.
    pub line: usize,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}: {}", self.severity(), self.line + 1, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_warning())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Number of diagnostics of `kind`.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    /// All messages in document order.
    pub fn messages(&self) -> Vec<&str> {
        self.items.iter().map(|d| d.message.as_str()).collect()
    }

    pub fn printer<'a>(&'a self, source: &'a str) -> DiagnosticsPrinter<'a> {
        DiagnosticsPrinter::new(self, source)
    }

    pub fn render(&self, source: &str) -> String {
        self.printer(source).render()
    }
}

/// Pending diagnostic; nothing is attached until [`emit`](Report::emit).
#[must_use = "diagnostic not emitted, call .emit()"]
pub(crate) struct Report<'a> {
    scene: &'a mut Scene,
    element: ElementId,
    kind: DiagnosticKind,
    detail: Option<String>,
    verified: bool,
}

impl<'a> Report<'a> {
    pub(crate) fn new(scene: &'a mut Scene, element: ElementId, kind: DiagnosticKind) -> Self {
        Self {
            scene,
            element,
            kind,
            detail: None,
            verified: false,
        }
    }

    /// Fill the kind's message template with `detail`.
    pub(crate) fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Mark as produced by a verifier.
    pub(crate) fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    /// Attaches the note. Returns whether it was kept.
    pub(crate) fn emit(self) -> bool {
        let note = Note {
            kind: self.kind,
            message: self.kind.message(self.detail.as_deref()),
            verified: self.verified,
        };
        self.scene.attach(self.element, note)
    }
}
