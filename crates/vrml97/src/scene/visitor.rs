//! Scene visitor.
//!
//! # Usage
//!
//! Implement `Visitor` for your struct. Override `visit_*` methods to add logic.
//! Call `walk_*` within your override to continue recursion (or omit it to stop).
//!
//! ```ignore
//! impl Visitor for NodeCounter {
//!     fn visit_node(&mut self, scene: &Scene, id: ElementId) {
//!         self.count += 1;
//!         walk_children(self, scene, id);
//!     }
//! }
//! ```
//!
//! USE elements are leaves unless the visitor hands out a [`UsePath`], in
//! which case [`walk_use`] descends into the DEF's node whenever that node is
//! not already on the path being walked.

use super::{ElementId, ElementKind, Scene};

/// Nodes entered through USE edges on the current walk.
#[derive(Debug, Clone, Default)]
pub struct UsePath {
    stack: Vec<ElementId>,
}

impl UsePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn contains(&self, id: ElementId) -> bool {
        self.stack.contains(&id)
    }
}

pub trait Visitor: Sized {
    /// Path state used to follow USE edges; `None` keeps USE elements leaves.
    fn use_path(&mut self) -> Option<&mut UsePath> {
        None
    }

    fn visit_element(&mut self, scene: &Scene, id: ElementId) {
        walk_element(self, scene, id);
    }

    fn visit_scene(&mut self, scene: &Scene, id: ElementId) {
        walk_children(self, scene, id);
    }

    fn visit_node(&mut self, scene: &Scene, id: ElementId) {
        walk_children(self, scene, id);
    }

    fn visit_def(&mut self, scene: &Scene, id: ElementId) {
        walk_children(self, scene, id);
    }

    fn visit_use(&mut self, scene: &Scene, id: ElementId) {
        walk_use(self, scene, id);
    }

    fn visit_field(&mut self, scene: &Scene, id: ElementId) {
        walk_children(self, scene, id);
    }

    fn visit_value(&mut self, scene: &Scene, id: ElementId) {
        walk_children(self, scene, id);
    }

    fn visit_proto(&mut self, scene: &Scene, id: ElementId) {
        walk_children(self, scene, id);
    }

    fn visit_route(&mut self, scene: &Scene, id: ElementId) {
        walk_children(self, scene, id);
    }

    fn visit_other(&mut self, scene: &Scene, id: ElementId) {
        walk_children(self, scene, id);
    }
}

pub fn walk_element<V: Visitor>(visitor: &mut V, scene: &Scene, id: ElementId) {
    match scene[id].kind {
        ElementKind::Scene => visitor.visit_scene(scene, id),
        ElementKind::Node(_) => visitor.visit_node(scene, id),
        ElementKind::Def(_) => visitor.visit_def(scene, id),
        ElementKind::Use(_) => visitor.visit_use(scene, id),
        ElementKind::Field(_) => visitor.visit_field(scene, id),
        ElementKind::Value(_) => visitor.visit_value(scene, id),
        ElementKind::Proto(_) => visitor.visit_proto(scene, id),
        ElementKind::Route => visitor.visit_route(scene, id),
        ElementKind::Is(_)
        | ElementKind::Interface(_)
        | ElementKind::InstanceBody
        | ElementKind::Endpoint(_)
        | ElementKind::Marker(_) => visitor.visit_other(scene, id),
    }
}

pub fn walk_children<V: Visitor>(visitor: &mut V, scene: &Scene, id: ElementId) {
    for &child in &scene[id].children {
        visitor.visit_element(scene, child);
    }
}

/// Descends into a USE target's node unless that would revisit a node on
/// the current path.
pub fn walk_use<V: Visitor>(visitor: &mut V, scene: &Scene, id: ElementId) {
    let Some(data) = scene[id].as_use() else {
        return;
    };
    let Some(target) = data.target.and_then(|def| scene.resolve_node(def)) else {
        return;
    };
    // Tree ancestors and nodes entered through earlier USE edges both count.
    if data.loops || scene.is_ancestor(target, id) {
        return;
    }
    let Some(path) = visitor.use_path() else {
        return;
    };
    if path.contains(target) {
        return;
    }
    path.stack.push(target);
    visitor.visit_element(scene, target);
    if let Some(path) = visitor.use_path() {
        path.stack.pop();
    }
}
