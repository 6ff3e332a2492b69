use indoc::{formatdoc, indoc};

use crate::parser::tests::find_node;
use crate::values::FieldValue;
use crate::{DiagnosticKind, Scene, parse};

fn material(color: &str) -> Scene {
    parse(&formatdoc! {r#"
        #VRML V2.0 utf8
        Shape {{ appearance Appearance {{ material Material {{ diffuseColor {color} }} }} }}
        "#,
        color = color,
    })
}

fn sphere_radius(radius: &str) -> Scene {
    parse(&formatdoc! {r#"
        #VRML V2.0 utf8
        Shape {{ geometry Sphere {{ radius {radius} }} }}
        "#,
        radius = radius,
    })
}

#[test]
fn float_forms() {
    for (text, expected) in [("2", 2.0), ("2.5", 2.5), (".5", 0.5), ("5.", 5.0), ("1e1", 10.0), ("+2.5E-1", 0.25)] {
        let scene = sphere_radius(text);
        assert!(scene.diagnostics().is_empty(), "{text}");
        let sphere = find_node(&scene, "Sphere");
        let radius = scene.field_value(sphere, "radius").unwrap();
        assert_eq!(scene[radius].as_value(), Some(&FieldValue::Float(Some(expected))), "{text}");
    }
}

#[test]
fn float_rejects() {
    let scene = sphere_radius("1e");
    assert_eq!(scene.diagnostics().count(DiagnosticKind::InvalidValue), 1);
    let sphere = find_node(&scene, "Sphere");
    let radius = scene.field_value(sphere, "radius").unwrap();
    assert_eq!(scene[radius].as_value(), Some(&FieldValue::Float(None)));
}

#[test]
fn positive_constraint() {
    let scene = sphere_radius("-1");
    assert_eq!(scene.diagnostics().messages(), vec!["value must be positive"]);
}

#[test]
fn color_components_in_range() {
    for text in ["1 0 0", "1.000 0.5 .25", "2e-1 0 1", "0 0 -0"] {
        assert!(material(text).diagnostics().is_empty(), "{text}");
    }
}

#[test]
fn color_components_out_of_range() {
    for text in ["1.5 0 0", "0 1e1 0", "0 0 -0.5"] {
        let scene = material(text);
        let diagnostics = scene.diagnostics();
        assert_eq!(diagnostics.count(DiagnosticKind::ColorOutOfRange), 1, "{text}");
        assert_eq!(
            diagnostics.messages(),
            vec!["color component must be between 0 and 1"],
            "{text}"
        );
    }
}

#[test]
fn partial_color_before_bracket_is_silent() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Shape { geometry IndexedFaceSet { color Color { color [ 1 0 0, 0 1 ] } } }
    "#});
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::NotEnoughValues), 0);
    assert_eq!(diagnostics.error_count(), 0);
}

#[test]
fn partial_vector_is_short() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Shape { geometry PointSet { coord Coordinate { point [ 1 0 0, 0 1 ] } } }
    "#});
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["not enough values"]
    );
}

#[test]
fn mf_single_item_without_brackets() {
    let scene = parse("#VRML V2.0 utf8\nWorldInfo { info \"one\" }\n");
    let info = find_node(&scene, "WorldInfo");
    let value = scene.field_value(info, "info").unwrap();
    assert_eq!(scene[value].as_value().unwrap().number_values(), 1);
    assert_eq!(scene.strings(value), vec!["one"]);
}

#[test]
fn mf_missing_closing_bracket() {
    let scene = parse("#VRML V2.0 utf8\nWorldInfo { title \"t\" info [ \"a\" \"b\" }\nGroup {}\n");
    assert_eq!(scene.diagnostics().messages(), vec!["expected \"]\""]);
    let info = find_node(&scene, "WorldInfo");
    let value = scene.field_value(info, "info").unwrap();
    assert_eq!(scene.strings(value), vec!["a", "b"]);
    find_node(&scene, "Group");
}

#[test]
fn stray_word_in_list_is_skipped() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Shape {
          geometry IndexedFaceSet {
            coord Coordinate { point [ 0 0 0, 1 0 0 oops 0 1 0 ] }
            coordIndex [ 0 1 2 -1 ]
          }
        }
    "#});
    assert_eq!(scene.diagnostics().messages(), vec!["invalid SFVec3f \"oops\""]);
    let coordinate = find_node(&scene, "Coordinate");
    let point = scene.field_value(coordinate, "point").unwrap();
    assert_eq!(scene.number_count(point), 9);
    let ifs = find_node(&scene, "IndexedFaceSet");
    assert!(scene.field_value(ifs, "coordIndex").is_some());
}

#[test]
fn int32_out_of_range() {
    let scene = parse("#VRML V2.0 utf8\nSwitch { whichChoice 2147483647 }\n");
    assert!(scene.diagnostics().is_empty());

    let scene = parse("#VRML V2.0 utf8\nSwitch { whichChoice 4294967295 }\n");
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["invalid SFInt32 \"4294967295\""]
    );
}

#[test]
fn booleans() {
    let scene = parse("#VRML V2.0 utf8\nDirectionalLight { on FALSE }\n");
    let light = find_node(&scene, "DirectionalLight");
    let on = scene.field_value(light, "on").unwrap();
    assert_eq!(scene[on].as_value(), Some(&FieldValue::Bool(Some(false))));

    let scene = parse("#VRML V2.0 utf8\nDirectionalLight { on true }\n");
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["invalid SFBool \"true\""]
    );
}

#[test]
fn null_must_stand_alone() {
    let scene = parse("#VRML V2.0 utf8\nGroup { children [ Shape {} NULL ] }\n");
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["NULL must be the only value"]
    );

    let alone = parse("#VRML V2.0 utf8\nGroup { children [ NULL ] }\n");
    assert!(alone.diagnostics().is_empty());
}

#[test]
fn images() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Shape { appearance Appearance { texture PixelTexture { image 2 2 1 0xFF 0xFF 0xFF 0x00 } } }
    "#});
    assert!(scene.diagnostics().is_empty());
    let texture = find_node(&scene, "PixelTexture");
    let image = scene.field_value(texture, "image").unwrap();
    let image = scene[image].as_value().and_then(FieldValue::as_image).unwrap();
    assert_eq!((image.width, image.height, image.depth), (2, 2, 1));
    assert_eq!(image.pixels, 4);
    assert_eq!(image.longest_run, 3);
}

#[test]
fn image_errors() {
    let short = parse(indoc! {r#"
        #VRML V2.0 utf8
        Shape { appearance Appearance { texture PixelTexture { image 2 2 1 0xFF } } }
    "#});
    assert_eq!(short.diagnostics().messages(), vec!["not enough values"]);

    let deep = parse(indoc! {r#"
        #VRML V2.0 utf8
        Shape { appearance Appearance { texture PixelTexture { image 1 1 5 0 } } }
    "#});
    assert_eq!(
        deep.diagnostics().messages(),
        vec!["image depth must be between 0 and 4"]
    );
}

#[test]
fn unterminated_string() {
    let scene = parse("#VRML V2.0 utf8\nWorldInfo { title \"open\n}\n");
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::UnterminatedString), 1);
}

#[test]
fn bbox_size() {
    let fine = parse("#VRML V2.0 utf8\nGroup { bboxSize -1 -1 -1 }\n");
    assert!(fine.diagnostics().is_empty());
    let bad = parse("#VRML V2.0 utf8\nGroup { bboxSize -1 2 -1 }\n");
    assert_eq!(bad.diagnostics().count(DiagnosticKind::BadBboxSize), 1);
}
