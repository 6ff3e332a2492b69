//! DEF names and PROTO interface fields nothing refers to.
//!
//! Recomputed from the attached tree on every run, so edits that drop the
//! last USE of a DEF are picked up.

use std::collections::HashSet;

use super::report;
use crate::diagnostics::DiagnosticKind;
use crate::scene::{ElementId, ElementKind, Scene};

pub(super) fn check(scene: &mut Scene) {
    let mut referenced = HashSet::new();
    let mut defs = Vec::new();
    let mut interfaces = Vec::new();

    let mut stack = vec![scene.root()];
    while let Some(id) = stack.pop() {
        let element = &scene[id];
        match &element.kind {
            ElementKind::Use(data) => referenced.extend(data.target),
            ElementKind::Endpoint(data) => referenced.extend(data.def),
            ElementKind::Is(data) => referenced.extend(data.interface),
            ElementKind::Def(data) if !element.is_generated() => defs.push((id, data.name.clone())),
            ElementKind::Proto(data) if !data.external => {
                interfaces.extend(element.children.iter().copied().filter_map(|child| {
                    let interface = scene[child].as_interface()?;
                    Some((child, interface.name.clone()))
                }));
            }
            _ => {}
        }
        stack.extend(element.children.iter().rev().copied());
    }

    if scene.config.unused_def_warnings() {
        warn_unreferenced(scene, &referenced, defs, DiagnosticKind::UnusedDef);
    }
    warn_unreferenced(scene, &referenced, interfaces, DiagnosticKind::UnusedInterface);
}

fn warn_unreferenced(
    scene: &mut Scene,
    referenced: &HashSet<ElementId>,
    declared: Vec<(ElementId, String)>,
    kind: DiagnosticKind,
) {
    for (id, name) in declared {
        if !referenced.contains(&id) {
            report(scene, id, kind, Some(name));
        }
    }
}
