//! The scene graph: an element arena plus the registries built while parsing.

mod adjust;
mod copy;
mod dump;
mod edit;
mod element;
mod numbers;
mod visitor;


use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::ops::Index;

use indexmap::IndexMap;
use vrml97_core::{Interner, NodeSpec, Symbol, vrml97};

use crate::config::ParseConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Note, Report};
use crate::tokens::TokenStream;

pub use dump::ScenePrinter;
pub use element::{
    DefData, Element, ElementId, ElementKind, EndpointData, FieldData, InterfaceData, IsData,
    MarkerKind, NodeData, NodeOrigin, ProtoData, TokenSpan, UseData,
};
pub use visitor::{UsePath, Visitor, walk_children, walk_element, walk_use};

/// DEF and PROTO names visible in the file root or in one PROTO body.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scope {
    pub(crate) defs: IndexMap<String, ElementId>,
    pub(crate) protos: IndexMap<String, ElementId>,
}

/// Identity of a ROUTE within one scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RouteKey {
    pub(crate) scope: ElementId,
    pub(crate) from_node: String,
    pub(crate) from_field: String,
    pub(crate) to_node: String,
    pub(crate) to_field: String,
}

/// Result of checking one IndexedFaceSet or IndexedLineSet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexedReport {
    /// Faces (IndexedFaceSet) or polylines (IndexedLineSet).
    pub faces: usize,
    /// Coordinates available, when the coord node could be resolved.
    pub coords: Option<usize>,
}

#[derive(Debug)]
pub struct Scene {
    pub(crate) elements: Vec<Element>,
    pub(crate) stream: TokenStream,
    pub(crate) interner: Interner,
    pub(crate) root: ElementId,
    pub(crate) scopes: HashMap<ElementId, Scope>,
    pub(crate) routes: HashSet<RouteKey>,
    /// Used-entry bits per coord/color/normal/texCoord value element.
    pub(crate) usage: IndexMap<ElementId, Vec<bool>>,
    pub(crate) indexed: HashMap<ElementId, IndexedReport>,
    pub(crate) config: ParseConfig,
    /// Sparse `(logical offset, token position)` checkpoints per MF value.
    pub(crate) number_index: RefCell<HashMap<ElementId, Vec<(usize, usize)>>>,
}

impl Scene {
    /// Parses and verifies `source`.
    pub fn parse(source: &str, config: ParseConfig) -> Self {
        let mut scene = Self::new(TokenStream::new(source), config);
        log::debug!("parse: {} tokens", scene.stream.len());
        crate::parser::parse_root(&mut scene);
        crate::verify::run(&mut scene);
        log::debug!(
            "parse: done, {} elements, {} DEFs, {} ROUTEs",
            scene.elements.len(),
            scene.scopes.get(&scene.root).map_or(0, |s| s.defs.len()),
            scene.routes.len()
        );
        scene
    }

    pub(crate) fn new(stream: TokenStream, config: ParseConfig) -> Self {
        let root_span = TokenSpan::new(0, stream.len());
        let mut scene = Self {
            elements: Vec::new(),
            stream,
            interner: Interner::with_builtins(vrml97()),
            root: ElementId::new(0),
            scopes: HashMap::new(),
            routes: HashSet::new(),
            usage: IndexMap::new(),
            indexed: HashMap::new(),
            config,
            number_index: RefCell::new(HashMap::new()),
        };
        let root = scene.alloc(ElementKind::Scene, root_span);
        scene.root = root;
        scene.scopes.insert(root, Scope::default());
        scene
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn source(&self) -> &str {
        self.stream.source()
    }

    pub fn stream(&self) -> &TokenStream {
        &self.stream
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index())
    }

    /// Number of elements ever allocated, detached ones included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn resolve_symbol(&self, symbol: Symbol) -> &str {
        self.interner.resolve(symbol)
    }

    /// Type name of a Node element.
    pub fn node_name(&self, id: ElementId) -> Option<&str> {
        let node = self.get(id)?.as_node()?;
        Some(self.interner.resolve(node.name))
    }

    /// Built-in descriptor for a Node element, if its type is built in.
    pub fn node_spec(&self, id: ElementId) -> Option<&'static NodeSpec> {
        let node = self.get(id)?.as_node()?;
        if !self.interner.is_builtin(node.name) {
            return None;
        }
        vrml97().node(self.interner.resolve(node.name), true)
    }

    /// DEF element registered under `name` in the file root.
    pub fn def(&self, name: &str) -> Option<ElementId> {
        self.scopes.get(&self.root)?.defs.get(name).copied()
    }

    /// PROTO or EXTERNPROTO declared under `name` in the file root.
    pub fn proto(&self, name: &str) -> Option<ElementId> {
        self.scopes.get(&self.root)?.protos.get(name).copied()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Index report of an IndexedFaceSet/IndexedLineSet node.
    pub fn indexed_report(&self, node: ElementId) -> Option<&IndexedReport> {
        self.indexed.get(&node)
    }

    /// Entries of a coord/color/normal/texCoord value never referenced by an
    /// index. `None` when no indexed geometry used the value.
    pub fn unused_values(&self, value: ElementId) -> Option<Vec<usize>> {
        let bits = self.usage.get(&value)?;
        Some(
            bits.iter()
                .enumerate()
                .filter(|(_, used)| !**used)
                .map(|(i, _)| i)
                .collect(),
        )
    }

    /// Whether `ancestor` is `id` or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// `id` followed by its parents up to the root.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(Some(id), move |&current| self[current].parent)
    }

    /// Field child of `node` named `name`.
    pub fn field(&self, node: ElementId, name: &str) -> Option<ElementId> {
        self[node]
            .children
            .iter()
            .copied()
            .find(|&child| self[child].as_field().is_some_and(|f| f.name == name))
    }

    /// Value of field `name` on `node`.
    pub fn field_value(&self, node: ElementId, name: &str) -> Option<ElementId> {
        let field = self.field(node, name)?;
        self.value_of(field)
    }

    /// Value child of a Field or Interface element.
    pub fn value_of(&self, field: ElementId) -> Option<ElementId> {
        self[field]
            .children
            .iter()
            .copied()
            .find(|&child| self[child].as_value().is_some())
    }

    /// The Node an element stands for: itself, a DEF's node, a USE target's
    /// node, or the node held by an SFNode value.
    pub fn resolve_node(&self, id: ElementId) -> Option<ElementId> {
        let mut current = id;
        // DEF/USE chains are short; the bound only guards against bad input.
        for _ in 0..64 {
            let element = self.get(current)?;
            current = match &element.kind {
                ElementKind::Node(_) => return Some(current),
                ElementKind::Use(data) => data.target?,
                ElementKind::Def(_) | ElementKind::Value(_) => {
                    *element.children.iter().find(|&&child| {
                        matches!(
                            self[child].kind,
                            ElementKind::Node(_) | ElementKind::Def(_) | ElementKind::Use(_)
                        )
                    })?
                }
                _ => return None,
            };
        }
        None
    }

    /// Contents of every string in a string value, continuation lines joined.
    pub fn strings(&self, value: ElementId) -> Vec<String> {
        let Some(element) = self.get(value) else {
            return Vec::new();
        };
        let mut out: Vec<String> = Vec::new();
        let mut raw: Option<String> = None;
        for pos in element.span.range() {
            let text = self.stream.text(pos);
            if self.stream.is_quoted_string(pos) {
                if let Some(done) = raw.take() {
                    out.push(crate::values::unquote(&done));
                }
                raw = Some(text.to_owned());
            } else if self.stream.is_continuation(pos) {
                if let Some(current) = raw.as_mut() {
                    current.push('\n');
                    current.push_str(text);
                }
            }
        }
        out.extend(raw.map(|done| crate::values::unquote(&done)));
        out
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    pub(crate) fn alloc(&mut self, kind: ElementKind, span: TokenSpan) -> ElementId {
        let id = ElementId::new(self.elements.len());
        self.elements.push(Element::new(kind, span));
        id
    }

    /// Allocates an element as the last child of `parent`.
    pub(crate) fn push(&mut self, parent: ElementId, kind: ElementKind, span: TokenSpan) -> ElementId {
        let id = self.alloc(kind, span);
        self.adopt(parent, id);
        id
    }

    pub(crate) fn adopt(&mut self, parent: ElementId, child: ElementId) {
        self.elements[child.index()].parent = Some(parent);
        self.elements[parent.index()].children.push(child);
    }

    /// Unlinks `id` from its parent. The element stays in the arena.
    pub(crate) fn detach(&mut self, id: ElementId) {
        if let Some(parent) = self.elements[id.index()].parent.take() {
            self.elements[parent.index()].children.retain(|&c| c != id);
        }
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.index()]
    }

    pub(crate) fn kind_mut(&mut self, id: ElementId) -> &mut ElementKind {
        &mut self.elements[id.index()].kind
    }

    pub(crate) fn set_end(&mut self, id: ElementId, end: usize) {
        let span = &mut self.elements[id.index()].span;
        span.end = end.max(span.start);
    }

    pub(crate) fn intern(&mut self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    pub(crate) fn report(&mut self, id: ElementId, kind: DiagnosticKind) -> Report<'_> {
        Report::new(self, id, kind)
    }

    /// Attaches `note` to `id`, or to its closest non-generated ancestor.
    ///
    /// Only the first error of an element is kept. Warnings pass through the
    /// warning budget.
    pub(crate) fn attach(&mut self, id: ElementId, note: Note) -> bool {
        let target = self
            .ancestors(id)
            .find(|&a| !self[a].generated)
            .unwrap_or(id);
        if note.kind.is_warning() {
            if !self.config.allow_warning(note.kind) {
                return false;
            }
            self.elements[target.index()].warnings.push(note);
            return true;
        }
        let slot = &mut self.elements[target.index()].error;
        if slot.is_some() {
            return false;
        }
        *slot = Some(note);
        true
    }

    /// Errors and warnings of the attached tree, in document order.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let element = &self[id];
            for note in element.notes() {
                diagnostics.push(self.diagnostic(id, note));
            }
            stack.extend(element.children.iter().rev().copied());
        }
        diagnostics
    }

    fn diagnostic(&self, id: ElementId, note: &Note) -> Diagnostic {
        let span = self[id].span;
        let line = self
            .stream
            .line(span.start)
            .or_else(|| self.stream.line(self.stream.len().checked_sub(1)?))
            .unwrap_or(0);
        Diagnostic {
            element: id,
            kind: note.kind,
            message: note.message.clone(),
            span,
            range: self.stream.byte_range_of(span.range()),
            line,
        }
    }

    /// Drops every note and marker a verifier produced.
    pub(crate) fn clear_verification(&mut self) {
        let markers: Vec<ElementId> = (0..self.elements.len())
            .map(ElementId::new)
            .filter(|&id| self[id].verified)
            .collect();
        for id in markers {
            self.detach(id);
        }
        for element in &mut self.elements {
            element.warnings.retain(|note| !note.verified);
            if element.error.as_ref().is_some_and(|note| note.verified) {
                element.error = None;
            }
        }
        self.usage.clear();
        self.indexed.clear();
    }

    pub fn dump(&self) -> String {
        ScenePrinter::new(self).dump()
    }

    pub fn printer(&self) -> ScenePrinter<'_> {
        ScenePrinter::new(self)
    }
}

impl Index<ElementId> for Scene {
    type Output = Element;

    fn index(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }
}
