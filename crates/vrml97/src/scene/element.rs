//! Scene-graph elements.
//!
//! Every construct lives in one arena owned by the [`Scene`](super::Scene).
//! Children are owned index lists; parents and USE targets are plain indices
//! that never own anything.

use std::ops::Range;

use vrml97_core::{FieldType, InterfaceKind, Symbol};

use crate::diagnostics::Note;
use crate::values::FieldValue;

/// Handle of an element in its scene's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u32);

impl ElementId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Half-open range of token positions. Zero-width spans mark a position
/// between tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Zero-width span before token `at`.
    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn single(at: usize) -> Self {
        Self {
            start: at,
            end: at + 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Moves positions at or after `boundary` by `delta` tokens. An end equal
    /// to `boundary` stays, since the token it excludes was not covered.
    pub(crate) fn shift(&mut self, boundary: usize, delta: isize) {
        if self.start >= boundary {
            self.start = self.start.saturating_add_signed(delta);
        }
        if self.end > boundary {
            self.end = self.end.saturating_add_signed(delta);
        }
        if self.end < self.start {
            self.end = self.start;
        }
    }
}

/// Where a node's type comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOrigin {
    BuiltIn,
    Script,
    /// Instance of the PROTO declaration element.
    Proto(ElementId),
    /// Instance of the EXTERNPROTO declaration element.
    ExternProto(ElementId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub name: Symbol,
    pub origin: NodeOrigin,
    /// Some field in this node's subtree is IS-connected.
    pub has_is: bool,
    /// Instance copy of a node that had IS fields.
    pub from_is: bool,
    /// Script with a `javascript:` or `vrmlscript:` url.
    pub inline_script: bool,
    /// Function names found in a Script's inline url.
    pub functions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefData {
    pub name: String,
    pub used: bool,
    pub used_by_route: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseData {
    pub name: String,
    /// The DEF element this USE borrows from.
    pub target: Option<ElementId>,
    /// The target is an ancestor; traversal must not follow it.
    pub loops: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldData {
    pub name: String,
    pub kind: InterfaceKind,
    pub data_type: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsData {
    pub name: String,
    /// The interface declaration the field is connected to.
    pub interface: Option<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoData {
    pub name: String,
    pub external: bool,
    /// Type of the first node in the body; instances stand in for it.
    pub builtin_type: Option<String>,
    /// The body scene; `None` for EXTERNPROTO.
    pub body: Option<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceData {
    pub kind: InterfaceKind,
    pub data_type: FieldType,
    pub name: String,
    pub used: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointData {
    pub node_name: String,
    pub field: String,
    pub def: Option<ElementId>,
    pub kind: Option<InterfaceKind>,
    pub data_type: Option<FieldType>,
}

/// Placeholders that stand for something missing or wrong in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Header,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    /// Tokens that could not be used.
    Unexpected,
    /// One bad token inside a value.
    Invalid,
    /// Values stopped before the required count.
    Short,
    /// First value past a base-profile ceiling.
    Limit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// The file root, or a PROTO body.
    Scene,
    Node(NodeData),
    Def(DefData),
    Use(UseData),
    /// A field instance inside a node body.
    Field(FieldData),
    Value(FieldValue),
    Is(IsData),
    Proto(ProtoData),
    /// A PROTO, EXTERNPROTO or Script interface declaration.
    Interface(InterfaceData),
    /// Generated copy of a PROTO body inside an instance.
    InstanceBody,
    Route,
    Endpoint(EndpointData),
    Marker(MarkerKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub(crate) kind: ElementKind,
    pub(crate) span: TokenSpan,
    pub(crate) generated: bool,
    /// Created by a verifier; removed when verification reruns.
    pub(crate) verified: bool,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) error: Option<Note>,
    pub(crate) warnings: Vec<Note>,
}

impl Element {
    pub(crate) fn new(kind: ElementKind, span: TokenSpan) -> Self {
        Self {
            kind,
            span,
            generated: false,
            verified: false,
            parent: None,
            children: Vec::new(),
            error: None,
            warnings: Vec::new(),
        }
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn span(&self) -> TokenSpan {
        self.span
    }

    /// Part of an instance copy rather than the source text.
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_ref().map(|note| note.message.as_str())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.warnings.iter().map(|note| note.message.as_str())
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.error.iter().chain(self.warnings.iter())
    }

    /// First token, `None` for generated elements.
    pub fn first_token_offset(&self) -> Option<usize> {
        (!self.generated).then_some(self.span.start)
    }

    /// Last token, `None` for generated and zero-width elements.
    pub fn last_token_offset(&self) -> Option<usize> {
        if self.generated || self.span.is_empty() {
            return None;
        }
        Some(self.span.end - 1)
    }

    pub fn as_node(&self) -> Option<&NodeData> {
        match &self.kind {
            ElementKind::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&FieldValue> {
        match &self.kind {
            ElementKind::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldData> {
        match &self.kind {
            ElementKind::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_def(&self) -> Option<&DefData> {
        match &self.kind {
            ElementKind::Def(def) => Some(def),
            _ => None,
        }
    }

    pub fn as_use(&self) -> Option<&UseData> {
        match &self.kind {
            ElementKind::Use(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_proto(&self) -> Option<&ProtoData> {
        match &self.kind {
            ElementKind::Proto(proto) => Some(proto),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceData> {
        match &self.kind {
            ElementKind::Interface(interface) => Some(interface),
            _ => None,
        }
    }

    pub fn as_endpoint(&self) -> Option<&EndpointData> {
        match &self.kind {
            ElementKind::Endpoint(endpoint) => Some(endpoint),
            _ => None,
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self.kind, ElementKind::Marker(_))
    }
}
