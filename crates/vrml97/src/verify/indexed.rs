//! IndexedFaceSet and IndexedLineSet index checks.
//!
//! Every coord/color/normal/texCoord value referenced by an index gets a
//! usage bitset in the scene. Bits are merged across all geometry sharing a
//! value (through USE), and [`sweep_unused`] reports what no index reached.

use vrml97_core::limits::{MAX_FACES, MAX_VERTICES_PER_FACE};

use super::{bool_field, entry_count, mark, nested_value, report};
use crate::diagnostics::DiagnosticKind;
use crate::scene::{ElementId, IndexedReport, Scene};

/// A per-vertex or per-face attribute and the index field selecting it.
struct Attribute {
    field: &'static str,
    values: &'static str,
    arity: usize,
    index: &'static str,
    /// Field choosing per-vertex binding; `None` when always per vertex.
    per_vertex: Option<&'static str>,
}

const FACE_SET_ATTRIBUTES: &[Attribute] = &[
    Attribute {
        field: "color",
        values: "color",
        arity: 3,
        index: "colorIndex",
        per_vertex: Some("colorPerVertex"),
    },
    Attribute {
        field: "normal",
        values: "vector",
        arity: 3,
        index: "normalIndex",
        per_vertex: Some("normalPerVertex"),
    },
    Attribute {
        field: "texCoord",
        values: "point",
        arity: 2,
        index: "texCoordIndex",
        per_vertex: None,
    },
];

const LINE_SET_ATTRIBUTES: &[Attribute] = &[Attribute {
    field: "color",
    values: "color",
    arity: 3,
    index: "colorIndex",
    per_vertex: Some("colorPerVertex"),
}];

/// State while walking coordIndex one face at a time.
struct FaceWalk {
    faces: bool,
    count: usize,
    edges: usize,
    previous: Option<i32>,
    /// Every vertex entry, separators excluded.
    vertices: Vec<i32>,
}

impl FaceWalk {
    fn close(&mut self, scene: &mut Scene, value: ElementId, pos: usize) {
        if self.edges > 0 {
            self.count += 1;
            if self.faces && self.edges < 3 {
                mark(scene, value, pos, DiagnosticKind::ShortFace, None);
            }
        }
        self.edges = 0;
        self.previous = None;
    }
}

pub(super) fn check(scene: &mut Scene, node: ElementId, faces: bool) {
    let coord_value = nested_value(scene, node, "coord", "point");
    let coords = coord_value.map(|value| entry_count(scene, value, 3));
    let Some(index_value) = scene.field_value(node, "coordIndex") else {
        scene.indexed.insert(node, IndexedReport { faces: 0, coords });
        return;
    };

    let entries = scene.ints(index_value);
    let mut used = vec![false; coords.unwrap_or(0)];
    let mut walk = FaceWalk {
        faces,
        count: 0,
        edges: 0,
        previous: None,
        vertices: Vec::new(),
    };
    let mut last = None;
    for &(pos, index) in &entries {
        // Tokens that are not integers were reported while parsing.
        let Some(index) = index else {
            continue;
        };
        last = Some(pos);
        if index == -1 {
            walk.close(scene, index_value, pos);
            continue;
        }
        walk.vertices.push(index);
        walk.edges += 1;

        match usize::try_from(index).ok().filter(|&i| coords.is_none_or(|n| i < n)) {
            Some(i) => {
                if let Some(bit) = used.get_mut(i) {
                    *bit = true;
                }
            }
            None => {
                mark(scene, index_value, pos, DiagnosticKind::IndexOutOfRange, None);
            }
        }
        if faces && walk.previous == Some(index) {
            mark(scene, index_value, pos, DiagnosticKind::RepeatedIndex, None);
        }
        if faces && walk.edges == MAX_VERTICES_PER_FACE + 1 {
            let detail = format!("face with more than {MAX_VERTICES_PER_FACE} vertices");
            mark(scene, index_value, pos, DiagnosticKind::TooManyVertices, Some(detail));
        }
        walk.previous = Some(index);
    }
    if let Some(pos) = last {
        walk.close(scene, index_value, pos);
    }

    if faces && walk.count > MAX_FACES {
        let detail = format!("{} faces, more than {MAX_FACES}", walk.count);
        report(scene, index_value, DiagnosticKind::TooManyFaces, Some(detail));
    }
    if let Some(value) = coord_value {
        merge_usage(scene, value, &used);
    }

    let attributes = if faces {
        FACE_SET_ATTRIBUTES
    } else {
        LINE_SET_ATTRIBUTES
    };
    let index_entries = entries.len();
    for attribute in attributes {
        check_attribute(scene, node, attribute, &walk, index_entries);
    }

    log::trace!(
        "verify: {} with {} faces over {coords:?} coordinates",
        scene.node_name(node).unwrap_or("?"),
        walk.count
    );
    scene.indexed.insert(
        node,
        IndexedReport {
            faces: walk.count,
            coords,
        },
    );
}

fn check_attribute(
    scene: &mut Scene,
    node: ElementId,
    attribute: &Attribute,
    walk: &FaceWalk,
    index_entries: usize,
) {
    let Some(values) = nested_value(scene, node, attribute.field, attribute.values) else {
        return;
    };
    let count = entry_count(scene, values, attribute.arity);
    let per_vertex = attribute
        .per_vertex
        .is_none_or(|field| bool_field(scene, node, field, true));
    let own_index = scene
        .field_value(node, attribute.index)
        .filter(|&value| scene.number_count(value) > 0);
    let mut used = vec![false; count];

    match own_index {
        Some(index_value) => {
            let entries = scene.ints(index_value);
            for &(pos, index) in &entries {
                let Some(index) = index else {
                    continue;
                };
                if per_vertex && index == -1 {
                    continue;
                }
                match usize::try_from(index).ok().filter(|&i| i < count) {
                    Some(i) => used[i] = true,
                    None => {
                        mark(scene, index_value, pos, DiagnosticKind::IndexOutOfRange, None);
                    }
                }
            }
            let (needed, reason) = if per_vertex {
                (index_entries, "one per coordIndex entry")
            } else {
                (walk.count, "one per face")
            };
            if entries.len() < needed {
                let detail = format!(
                    "{} has {} values, needs {needed} ({reason})",
                    attribute.index,
                    entries.len()
                );
                report(scene, index_value, DiagnosticKind::CountMismatch, Some(detail));
            }
        }
        None if per_vertex => {
            for &index in &walk.vertices {
                if let Some(bit) = usize::try_from(index).ok().and_then(|i| used.get_mut(i)) {
                    *bit = true;
                }
            }
            let needed = walk
                .vertices
                .iter()
                .filter_map(|&i| usize::try_from(i).ok())
                .max()
                .map_or(0, |max| max + 1);
            if count < needed {
                let detail = format!(
                    "{} has {count} values, needs {needed} (one per coordinate used)",
                    attribute.field
                );
                report(scene, values, DiagnosticKind::CountMismatch, Some(detail));
            }
        }
        None => {
            for bit in used.iter_mut().take(walk.count) {
                *bit = true;
            }
            if count < walk.count {
                let detail = format!(
                    "{} has {count} values, needs {} (one per face)",
                    attribute.field, walk.count
                );
                report(scene, values, DiagnosticKind::CountMismatch, Some(detail));
            }
        }
    }
    merge_usage(scene, values, &used);
}

fn merge_usage(scene: &mut Scene, value: ElementId, used: &[bool]) {
    let bits = scene
        .usage
        .entry(value)
        .or_insert_with(|| vec![false; used.len()]);
    for (bit, &now) in bits.iter_mut().zip(used) {
        *bit |= now;
    }
}

/// Warns about every tracked entry no index referenced.
pub(super) fn sweep_unused(scene: &mut Scene) {
    let unused: Vec<(ElementId, usize)> = scene
        .usage
        .iter()
        .flat_map(|(&value, bits)| {
            bits.iter()
                .enumerate()
                .filter(|(_, used)| !**used)
                .map(move |(entry, _)| (value, entry))
        })
        .collect();
    for (value, entry) in unused {
        let arity = scene[value]
            .as_value()
            .map_or(1, |v| v.field_type().arity().max(1));
        let Some(pos) = scene.number_token(value, entry * arity) else {
            continue;
        };
        let name = scene[value]
            .parent()
            .and_then(|field| scene[field].as_field())
            .map_or_else(|| "value".to_owned(), |field| field.name.clone());
        mark(scene, value, pos, DiagnosticKind::UnusedValue, Some(format!("{name} {entry}")));
    }
}
