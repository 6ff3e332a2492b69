//! key/keyValue checks for the six interpolators.

use super::{check_increasing, floats, mark, report};
use crate::diagnostics::DiagnosticKind;
use crate::scene::{ElementId, Scene};

/// How keyValue relates to key for one interpolator type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Shape {
    /// Floats per keyValue entry.
    pub(super) factor: usize,
    /// Each key maps to a whole set of entries (Coordinate, Normal).
    pub(super) multi: bool,
}

pub(super) fn shape(node_name: &str) -> Option<Shape> {
    let (factor, multi) = match node_name {
        "ColorInterpolator" | "PositionInterpolator" => (3, false),
        "OrientationInterpolator" => (4, false),
        "ScalarInterpolator" => (1, false),
        "CoordinateInterpolator" | "NormalInterpolator" => (3, true),
        _ => return None,
    };
    Some(Shape { factor, multi })
}

pub(super) fn check(scene: &mut Scene, node: ElementId, shape: Shape) {
    let key_value = scene.field_value(node, "keyValue");
    let keys = match scene.field_value(node, "key") {
        Some(key) => {
            check_increasing(scene, key, "key", false);
            let keys = floats(scene, key);
            unnecessary_entries(scene, key, &keys, 1, "key");
            keys.len()
        }
        None => 0,
    };
    let Some(key_value) = key_value else {
        return;
    };
    let values = floats(scene, key_value);
    let count = values.len();

    if shape.multi {
        let frame = keys * shape.factor;
        if keys > 0 && (count == 0 || count % frame != 0) {
            let detail = format!(
                "keyValue has {count} values, expected a multiple of {frame} for {keys} keys"
            );
            report(scene, key_value, DiagnosticKind::CountMismatch, Some(detail));
        }
        return;
    }

    let expected = keys * shape.factor;
    if count != expected {
        let detail = format!("keyValue has {count} values, expected {expected} for {keys} keys");
        report(scene, key_value, DiagnosticKind::CountMismatch, Some(detail));
        return;
    }
    unnecessary_entries(scene, key_value, &values, shape.factor, "keyValue");
}

/// Flags the inner entries of every run of three or more identical
/// consecutive entries of `width` numbers each.
fn unnecessary_entries(scene: &mut Scene, value: ElementId, numbers: &[(usize, f64)], width: usize, field: &str) {
    let entries: Vec<&[(usize, f64)]> = numbers.chunks_exact(width).collect();
    let same = |a: &[(usize, f64)], b: &[(usize, f64)]| a.iter().zip(b).all(|(x, y)| x.1 == y.1);
    let inner: Vec<(usize, usize)> = entries
        .windows(3)
        .enumerate()
        .filter(|(_, run)| same(run[0], run[1]) && same(run[1], run[2]))
        .map(|(i, run)| (i + 1, run[1][0].0))
        .collect();
    for (entry, pos) in inner {
        mark(
            scene,
            value,
            pos,
            DiagnosticKind::UnnecessaryKey,
            Some(format!("{field} {entry}")),
        );
    }
}
