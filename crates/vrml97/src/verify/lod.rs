//! LOD level/range consistency.

use super::{check_increasing, floats, node_count, report};
use crate::diagnostics::DiagnosticKind;
use crate::scene::{ElementId, Scene};

pub(super) fn check(scene: &mut Scene, node: ElementId) {
    let Some(range) = scene.field_value(node, "range") else {
        return;
    };
    let ranges = floats(scene, range).len();
    // Without ranges the browser picks levels itself.
    if ranges == 0 {
        return;
    }
    check_increasing(scene, range, "range", true);

    let level = scene.field_value(node, "level");
    let levels = level.map_or(0, |value| node_count(scene, value));
    if levels != ranges + 1 {
        let detail = format!("LOD has {levels} levels, needs {} for {ranges} ranges", ranges + 1);
        report(scene, level.unwrap_or(node), DiagnosticKind::CountMismatch, Some(detail));
    }
}
