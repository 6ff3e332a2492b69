use indoc::{formatdoc, indoc};

use crate::scene::IndexedReport;
use crate::{DiagnosticKind, ElementId, Scene, parse};

fn find_node(scene: &Scene, name: &str) -> ElementId {
    (0..scene.len())
        .map(ElementId::new)
        .find(|&id| scene.node_name(id) == Some(name) && !scene[id].is_generated())
        .unwrap_or_else(|| panic!("no {name} node"))
}

fn face_set(points: &str, index: &str) -> Scene {
    parse(&formatdoc! {r#"
        #VRML V2.0 utf8
        Shape {{
          geometry IndexedFaceSet {{
            coord Coordinate {{ point [ {points} ] }}
            coordIndex [ {index} ]
          }}
        }}
        "#,
        points = points,
        index = index,
    })
}

const TRIANGLE: &str = "0 0 0, 1 0 0, 0 1 0";

#[test]
fn single_triangle() {
    let scene = face_set(TRIANGLE, "0, 1, 2, -1");
    let ifs = find_node(&scene, "IndexedFaceSet");
    assert_eq!(
        scene.indexed_report(ifs),
        Some(&IndexedReport {
            faces: 1,
            coords: Some(3)
        })
    );
    let coordinate = find_node(&scene, "Coordinate");
    let point = scene.field_value(coordinate, "point").unwrap();
    assert_eq!(scene.unused_values(point), Some(vec![]));
    assert_eq!(scene.diagnostics().error_count(), 0);
}

#[test]
fn trailing_face_without_separator() {
    let scene = face_set("0 0 0, 1 0 0, 0 1 0, 1 1 0", "0 1 2 -1 1 3 2");
    let ifs = find_node(&scene, "IndexedFaceSet");
    assert_eq!(scene.indexed_report(ifs).unwrap().faces, 2);
    assert!(scene.diagnostics().is_empty());
}

#[test]
fn index_out_of_range() {
    let scene = face_set(TRIANGLE, "0, 1, 5, -1");
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::IndexOutOfRange), 1);
    assert!(diagnostics.messages().contains(&"index out of range"));

    let coordinate = find_node(&scene, "Coordinate");
    let point = scene.field_value(coordinate, "point").unwrap();
    assert_eq!(scene.unused_values(point), Some(vec![2]));
    assert!(diagnostics.messages().contains(&"Warning, point 2 not used"));
}

#[test]
fn negative_index_other_than_separator() {
    let scene = face_set(TRIANGLE, "0, 1, -2, 2, -1");
    assert_eq!(scene.diagnostics().count(DiagnosticKind::IndexOutOfRange), 1);
}

#[test]
fn short_and_repeated_faces() {
    let scene = face_set(TRIANGLE, "0, 1, -1, 0, 1, 1, 2, -1");
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::ShortFace), 1);
    assert_eq!(diagnostics.count(DiagnosticKind::RepeatedIndex), 1);
}

#[test]
fn face_vertex_ceiling() {
    let points: Vec<String> = (0..12).map(|i| format!("{i} 0 0")).collect();
    let index: Vec<String> = (0..12).map(|i| i.to_string()).collect();
    let scene = face_set(&points.join(", "), &index.join(" "));
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::TooManyVertices), 1);
    assert!(
        diagnostics
            .messages()
            .contains(&"Warning, face with more than 10 vertices (base profile)")
    );
}

#[test]
fn line_set_allows_two_point_lines() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Shape {
          geometry IndexedLineSet {
            coord Coordinate { point [ 0 0 0, 1 0 0 ] }
            coordIndex [ 0 1 -1 1 1 ]
          }
        }
    "#});
    let ils = find_node(&scene, "IndexedLineSet");
    assert_eq!(scene.indexed_report(ils).unwrap().faces, 2);
    assert!(scene.diagnostics().is_empty());
}

#[test]
fn shared_coordinates_merge_usage() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Shape {
          geometry IndexedFaceSet {
            coord DEF C Coordinate { point [ 0 0 0, 1 0 0, 0 1 0, 1 1 0 ] }
            coordIndex [ 0 1 2 -1 ]
          }
        }
        Shape {
          geometry IndexedLineSet {
            coord USE C
            coordIndex [ 1 3 ]
          }
        }
    "#});
    let coordinate = find_node(&scene, "Coordinate");
    let point = scene.field_value(coordinate, "point").unwrap();
    assert_eq!(scene.unused_values(point), Some(vec![]));
    assert_eq!(scene.diagnostics().count(DiagnosticKind::UnusedValue), 0);
}

#[test]
fn color_per_face_needs_one_per_face() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Shape {
          geometry IndexedFaceSet {
            coord Coordinate { point [ 0 0 0, 1 0 0, 0 1 0, 1 1 0 ] }
            coordIndex [ 0 1 2 -1 1 3 2 -1 ]
            color Color { color [ 1 0 0 ] }
            colorPerVertex FALSE
          }
        }
    "#});
    let messages = scene.diagnostics();
    assert!(
        messages
            .messages()
            .contains(&"color has 1 values, needs 2 (one per face)")
    );
}

#[test]
fn color_index_out_of_range() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Shape {
          geometry IndexedFaceSet {
            coord Coordinate { point [ 0 0 0, 1 0 0, 0 1 0 ] }
            coordIndex [ 0 1 2 -1 ]
            color Color { color [ 1 0 0, 0 1 0 ] }
            colorIndex [ 0 1 4 -1 ]
          }
        }
    "#});
    assert_eq!(scene.diagnostics().count(DiagnosticKind::IndexOutOfRange), 1);
}

#[test]
fn orientation_interpolator_value_count() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        OrientationInterpolator {
          key [ 0 1 ]
          keyValue [ 0 0 1 0, 0 0 1 ]
        }
    "#});
    let messages = scene.diagnostics();
    assert!(
        messages
            .messages()
            .contains(&"keyValue has 7 values, expected 8 for 2 keys")
    );
}

#[test]
fn interpolator_keys_must_not_decrease() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        ScalarInterpolator { key [ 0 0.5 0.5 0.2 ] keyValue [ 0 1 2 3 ] }
    "#});
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::KeysDecreasing), 1);
    assert!(
        diagnostics
            .messages()
            .contains(&"key values must be non-decreasing")
    );
}

#[test]
fn repeated_keyframes_are_unnecessary() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        PositionInterpolator {
          key [ 0 0.25 0.5 1 ]
          keyValue [ 0 0 0, 1 1 1, 1 1 1, 1 1 1 ]
        }
    "#});
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.error_count(), 0);
    assert_eq!(
        diagnostics.messages(),
        vec!["Warning, unnecessary keyValue 2"]
    );
}

#[test]
fn coordinate_interpolator_needs_whole_frames() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        CoordinateInterpolator {
          key [ 0 1 ]
          keyValue [ 0 0 0, 1 1 1, 2 2 2, 3 3 3, 4 4 4 ]
        }
    "#});
    assert!(
        scene
            .diagnostics()
            .messages()
            .contains(&"keyValue has 15 values, expected a multiple of 6 for 2 keys")
    );
}

#[test]
fn lod_levels_follow_ranges() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        LOD { range [ 10 ] level [ Group {} ] }
    "#});
    assert!(
        scene
            .diagnostics()
            .messages()
            .contains(&"LOD has 1 levels, needs 2 for 1 ranges")
    );

    let fine = parse("#VRML V2.0 utf8\nLOD { range [ 10 20 ] level [ Group {} Group {} Group {} ] }\n");
    assert!(fine.diagnostics().is_empty());

    let no_ranges = parse("#VRML V2.0 utf8\nLOD { level [ Group {} Group {} ] }\n");
    assert!(no_ranges.diagnostics().is_empty());
}

#[test]
fn lod_ranges_strictly_increase() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        LOD { range [ 10 10 ] level [ Group {} Group {} Group {} ] }
    "#});
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::NotIncreasing), 1);
    assert!(diagnostics.messages().contains(&"range values must be increasing"));
}

#[test]
fn background_gradients() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Background {
          skyColor [ 0 0 1 ]
          skyAngle [ 1.5 ]
          groundColor [ 0 1 0, 0 0.5 0 ]
          groundAngle [ 1.57 ]
        }
    "#});
    let diagnostics = scene.diagnostics();
    assert_eq!(
        diagnostics.messages(),
        vec!["skyColor has 1 colors, needs 2 for 1 skyAngle values"]
    );
}

#[test]
fn elevation_grid_dimensions() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Shape { geometry ElevationGrid { xDimension 1 zDimension 2 } }
    "#});
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::GridTooSmall), 1);
    assert!(diagnostics.messages().contains(&"xDimension must be at least 2"));
}

#[test]
fn elevation_grid_heights() {
    let short = parse(indoc! {r#"
        #VRML V2.0 utf8
        Shape { geometry ElevationGrid { xDimension 2 zDimension 2 height [ 0 0 0 ] } }
    "#});
    assert!(
        short
            .diagnostics()
            .messages()
            .contains(&"height has 3 values, needs 4 (xDimension * zDimension)")
    );

    let long = parse(indoc! {r#"
        #VRML V2.0 utf8
        Shape { geometry ElevationGrid { xDimension 2 zDimension 2 height [ 0 0 0 0 0 ] } }
    "#});
    let diagnostics = long.diagnostics();
    assert_eq!(diagnostics.error_count(), 0);
    assert_eq!(diagnostics.count(DiagnosticKind::ExtraValues), 1);
}

#[test]
fn elevation_grid_colors_per_cell() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Shape {
          geometry ElevationGrid {
            xDimension 3 zDimension 3
            height [ 0 0 0 0 0 0 0 0 0 ]
            colorPerVertex FALSE
            color Color { color [ 1 0 0, 0 1 0, 0 0 1, 1 1 1 ] }
          }
        }
    "#});
    assert!(scene.diagnostics().is_empty());
}

#[test]
fn proto_instances_are_verified_with_their_values() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO Mesh [ field MFInt32 idx [] ] {
          Shape {
            geometry IndexedFaceSet {
              coord Coordinate { point [ 0 0 0, 1 0 0, 0 1 0 ] }
              coordIndex IS idx
            }
          }
        }
        Mesh { idx [ 0 1 7 -1 ] }
        Mesh { idx [ 0 1 2 -1 ] }
    "#});
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::IndexOutOfRange), 1);
}

#[test]
fn values_pass_through_nested_instances() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO Inner [ field MFInt32 idx [ 0 1 8 -1 ] ] {
          Shape {
            geometry IndexedFaceSet {
              coord Coordinate { point [ 0 0 0, 1 0 0, 0 1 0 ] }
              coordIndex IS idx
            }
          }
        }
        PROTO Outer [ field MFInt32 oidx [ 0 1 2 -1 ] ] {
          Inner { idx IS oidx }
        }
        Outer { oidx [ 0 1 9 -1 ] }
        Outer {}
    "#});
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::IndexOutOfRange), 1);
    assert_eq!(diagnostics.error_count(), 1);
}

#[test]
fn unused_declarations() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO Ball [ field SFFloat r 1 field SFFloat spare 0 ] { Sphere { radius IS r } }
        DEF Kept Shape { geometry Ball {} }
        DEF Lonely Group {}
        Transform { children USE Kept }
    "#});
    let messages = scene.diagnostics();
    let messages = messages.messages();
    assert!(messages.contains(&"Warning, unused interface field \"spare\""));
    assert!(messages.contains(&"Warning, unused DEF \"Lonely\""));
    assert!(!messages.contains(&"Warning, unused DEF \"Kept\""));
}

#[test]
fn reverification_drops_stale_findings() {
    let mut scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        DEF A Group {}
        Transform { children [ USE A ] }
    "#});
    assert!(scene.diagnostics().is_empty());

    let transform = find_node(&scene, "Transform");
    scene.remove_element(transform).unwrap();
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["Warning, unused DEF \"A\""]
    );
}
