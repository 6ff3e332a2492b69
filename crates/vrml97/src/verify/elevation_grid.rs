//! ElevationGrid dimensions against its per-vertex and per-cell values.

use super::{bool_field, check_count, entry_count, int_field, nested_value, report};
use crate::diagnostics::DiagnosticKind;
use crate::scene::{ElementId, Scene};

pub(super) fn check(scene: &mut Scene, node: ElementId) {
    let x = dimension(scene, node, "xDimension");
    let z = dimension(scene, node, "zDimension");
    let (Some(x), Some(z)) = (x, z) else {
        return;
    };
    let vertices = x * z;
    let cells = (x - 1) * (z - 1);

    let height = scene.field_value(node, "height");
    let heights = height.map_or(0, |value| scene.number_count(value));
    check_count(scene, node, height, "height", heights, vertices, "xDimension * zDimension");

    for (field, values, arity, per_vertex) in [
        ("color", "color", 3, Some("colorPerVertex")),
        ("normal", "vector", 3, Some("normalPerVertex")),
        ("texCoord", "point", 2, None),
    ] {
        let Some(value) = nested_value(scene, node, field, values) else {
            continue;
        };
        let count = entry_count(scene, value, arity);
        let by_vertex = per_vertex.is_none_or(|flag| bool_field(scene, node, flag, true));
        let (needed, reason) = if by_vertex {
            (vertices, "one per vertex")
        } else {
            (cells, "one per cell")
        };
        check_count(scene, node, Some(value), field, count, needed, reason);
    }
}

/// A grid dimension of at least 2, reported otherwise.
fn dimension(scene: &mut Scene, node: ElementId, field: &str) -> Option<usize> {
    let value = int_field(scene, node, field);
    match value.and_then(|v| usize::try_from(v).ok()).filter(|&v| v >= 2) {
        Some(v) => Some(v),
        None => {
            let target = scene.field_value(node, field).unwrap_or(node);
            report(scene, target, DiagnosticKind::GridTooSmall, Some(field.to_owned()));
            None
        }
    }
}
