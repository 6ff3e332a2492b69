//! Post-parse verification.
//!
//! Runs once the whole tree exists, PROTO instance copies included. Each
//! verifier reads field values back from the token stream and attaches its
//! findings as verified notes and markers, which [`run`] clears before
//! verifying again after an edit.
//!
//! A node with an IS field anywhere below it is not verified: its real
//! values live in the instances, whose copies are verified instead.

mod background;
mod elevation_grid;
mod indexed;
mod interpolators;
mod lod;
mod unused;

#[cfg(test)]
mod verify_tests;

use crate::diagnostics::DiagnosticKind;
use crate::scene::{ElementId, ElementKind, MarkerKind, NodeOrigin, Scene, TokenSpan, Visitor, walk_children};
use crate::values::FieldValue;

/// Verifies every node of `scene` and refreshes the usage tables.
pub(crate) fn run(scene: &mut Scene) {
    scene.clear_verification();

    let mut collector = NodeCollector::default();
    let root = scene.root();
    collector.visit_element(scene, root);
    let mut verified = 0usize;
    for node in collector.nodes {
        if !should_verify(scene, node) {
            continue;
        }
        let Some(name) = scene.node_name(node).map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "IndexedFaceSet" => indexed::check(scene, node, true),
            "IndexedLineSet" => indexed::check(scene, node, false),
            "LOD" => lod::check(scene, node),
            "Background" => background::check(scene, node),
            "ElevationGrid" => elevation_grid::check(scene, node),
            name => match interpolators::shape(name) {
                Some(shape) => interpolators::check(scene, node, shape),
                None => continue,
            },
        }
        verified += 1;
    }
    indexed::sweep_unused(scene);
    unused::check(scene);
    log::debug!(
        "verify: {verified} nodes checked, {} values tracked",
        scene.usage.len()
    );
}

fn should_verify(scene: &Scene, node: ElementId) -> bool {
    let element = &scene[node];
    let Some(data) = element.as_node() else {
        return false;
    };
    if data.origin != NodeOrigin::BuiltIn || data.has_is {
        return false;
    }
    // Plain copies repeat their declaration, which is verified on its own.
    !element.is_generated() || data.from_is
}

/// Nodes of the tree in document order, instance copies included.
#[derive(Default)]
struct NodeCollector {
    nodes: Vec<ElementId>,
}

impl Visitor for NodeCollector {
    fn visit_node(&mut self, scene: &Scene, id: ElementId) {
        self.nodes.push(id);
        walk_children(self, scene, id);
    }
}

// ----------------------------------------------------------------------
// Reading values
// ----------------------------------------------------------------------

/// Value of the field `sub_field` on the node held by `field` of `node`,
/// e.g. `coord` then `point`.
pub(super) fn nested_value(scene: &Scene, node: ElementId, field: &str, sub_field: &str) -> Option<ElementId> {
    let held = scene.field_value(node, field)?;
    let inner = scene.resolve_node(held)?;
    scene.field_value(inner, sub_field)
}

pub(super) fn bool_field(scene: &Scene, node: ElementId, field: &str, default: bool) -> bool {
    match scene.field_value(node, field).and_then(|v| scene[v].as_value()) {
        Some(FieldValue::Bool(Some(value))) => *value,
        _ => default,
    }
}

pub(super) fn int_field(scene: &Scene, node: ElementId, field: &str) -> Option<i32> {
    match scene.field_value(node, field).and_then(|v| scene[v].as_value()) {
        Some(FieldValue::Int32(value)) => *value,
        _ => None,
    }
}

/// Entries in an MF value, `arity` numbers each.
pub(super) fn entry_count(scene: &Scene, value: ElementId, arity: usize) -> usize {
    scene.number_count(value) / arity.max(1)
}

/// Nodes held by an MFNode value.
pub(super) fn node_count(scene: &Scene, value: ElementId) -> usize {
    match scene[value].as_value() {
        Some(FieldValue::Multi(multi)) => multi.count,
        Some(FieldValue::Node(count)) => *count,
        _ => 0,
    }
}

/// Floats of a value, skipping numbers that do not convert.
pub(super) fn floats(scene: &Scene, value: ElementId) -> Vec<(usize, f64)> {
    scene
        .floats(value)
        .into_iter()
        .filter_map(|(pos, float)| Some((pos, float?)))
        .collect()
}

// ----------------------------------------------------------------------
// Reporting
// ----------------------------------------------------------------------

/// Verified note on `id`.
pub(super) fn report(scene: &mut Scene, id: ElementId, kind: DiagnosticKind, detail: Option<String>) {
    let report = scene.report(id, kind).verified(true);
    match detail {
        Some(detail) => report.detail(detail).emit(),
        None => report.emit(),
    };
}

/// Verified marker over token `pos` of `value`, carrying the note.
pub(super) fn mark(
    scene: &mut Scene,
    value: ElementId,
    pos: usize,
    kind: DiagnosticKind,
    detail: Option<String>,
) -> ElementId {
    let generated = scene[value].is_generated();
    let marker = scene.push(value, ElementKind::Marker(MarkerKind::Invalid), TokenSpan::single(pos));
    let element = scene.element_mut(marker);
    element.verified = true;
    element.generated = generated;
    report(scene, marker, kind, detail);
    marker
}

/// Reports a non-increasing entry of `values`, the first one only.
pub(super) fn check_increasing(scene: &mut Scene, value: ElementId, field: &str, strict: bool) {
    let numbers = floats(scene, value);
    let bad = numbers.windows(2).find(|pair| {
        let (previous, current) = (pair[0].1, pair[1].1);
        if strict { current <= previous } else { current < previous }
    });
    if let Some(pair) = bad {
        let kind = if strict {
            DiagnosticKind::NotIncreasing
        } else {
            DiagnosticKind::KeysDecreasing
        };
        let detail = strict.then(|| field.to_owned());
        mark(scene, value, pair[1].0, kind, detail);
    }
}

/// Compares a value count with the count a node's structure asks for:
/// fewer is an error, more is a warning.
pub(super) fn check_count(
    scene: &mut Scene,
    node: ElementId,
    value: Option<ElementId>,
    field: &str,
    actual: usize,
    needed: usize,
    reason: &str,
) {
    if actual == needed {
        return;
    }
    let target = value.unwrap_or(node);
    if actual < needed {
        let detail = format!("{field} has {actual} values, needs {needed} ({reason})");
        report(scene, target, DiagnosticKind::CountMismatch, Some(detail));
    } else {
        let detail = format!("{field} has {actual} values, only {needed} used ({reason})");
        report(scene, target, DiagnosticKind::ExtraValues, Some(detail));
    }
}
