//! Background sky and ground gradients.

use super::{check_increasing, entry_count, floats, report};
use crate::diagnostics::DiagnosticKind;
use crate::scene::{ElementId, Scene};

pub(super) fn check(scene: &mut Scene, node: ElementId) {
    check_gradient(scene, node, "skyColor", "skyAngle");
    check_gradient(scene, node, "groundColor", "groundAngle");
}

/// One color more than angles, angles strictly increasing.
fn check_gradient(scene: &mut Scene, node: ElementId, color_field: &str, angle_field: &str) {
    let color = scene.field_value(node, color_field);
    let angle = scene.field_value(node, angle_field);
    let colors = color.map_or(0, |value| entry_count(scene, value, 3));
    let angles = angle.map_or(0, |value| floats(scene, value).len());
    if let Some(angle) = angle {
        check_increasing(scene, angle, angle_field, true);
    }
    if colors == 0 && angles == 0 {
        return;
    }
    if colors != angles + 1 {
        let detail = format!(
            "{color_field} has {colors} colors, needs {} for {angles} {angle_field} values",
            angles + 1
        );
        let target = color.or(angle).unwrap_or(node);
        report(scene, target, DiagnosticKind::CountMismatch, Some(detail));
    }
}
