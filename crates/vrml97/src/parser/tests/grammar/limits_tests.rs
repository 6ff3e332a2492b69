use indoc::formatdoc;
use vrml97_core::limits::{MAX_IMAGE_DIMENSION, MAX_PROTO_NESTING, MAX_STRING_LENGTH};

use crate::parser::tests::find_node;
use crate::values::FieldValue;
use crate::{DiagnosticKind, Scene, parse};

fn text_strings(count: usize) -> Scene {
    let strings = vec!["\"a\""; count].join(" ");
    parse(&formatdoc! {r#"
        #VRML V2.0 utf8
        Shape {{ geometry Text {{ string [ {strings} ] }} }}
        "#,
        strings = strings,
    })
}

#[test]
fn mf_ceiling_is_flagged_once() {
    assert!(text_strings(100).diagnostics().is_empty());

    let scene = text_strings(101);
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["Warning, more than 100 values in string (base profile)"]
    );

    let scene = text_strings(250);
    assert_eq!(scene.diagnostics().count(DiagnosticKind::TooManyValues), 1);
    let text = find_node(&scene, "Text");
    let value = scene.field_value(text, "string").unwrap();
    assert_eq!(scene[value].as_value().unwrap().number_values(), 250);
}

fn world_title(len: usize) -> Scene {
    parse(&format!(
        "#VRML V2.0 utf8\nWorldInfo {{ title \"{}\" }}\n",
        "x".repeat(len)
    ))
}

#[test]
fn string_length_limit() {
    assert!(world_title(MAX_STRING_LENGTH).diagnostics().is_empty());
    assert_eq!(
        world_title(MAX_STRING_LENGTH + 1).diagnostics().messages(),
        vec!["Warning, string longer than 30000 characters (base profile)"]
    );
}

fn pixel_texture(width: i64, height: i64) -> Scene {
    let pixels = vec!["0"; (width * height) as usize].join(" ");
    parse(&formatdoc! {r#"
        #VRML V2.0 utf8
        Shape {{ appearance Appearance {{ texture PixelTexture {{ image {width} {height} 1 {pixels} }} }} }}
        "#,
        width = width,
        height = height,
        pixels = pixels,
    })
}

#[test]
fn image_size_limit() {
    let scene = pixel_texture(MAX_IMAGE_DIMENSION, 1);
    assert!(scene.diagnostics().is_empty());

    for (width, height) in [(MAX_IMAGE_DIMENSION + 1, 1), (1, MAX_IMAGE_DIMENSION + 1)] {
        let scene = pixel_texture(width, height);
        assert_eq!(
            scene.diagnostics().messages(),
            vec!["Warning, image larger than 256x256 (base profile)"],
            "{width}x{height}"
        );
        let texture = find_node(&scene, "PixelTexture");
        let image = scene.field_value(texture, "image").unwrap();
        let image = scene[image].as_value().and_then(FieldValue::as_image).unwrap();
        assert_eq!(image.pixels, MAX_IMAGE_DIMENSION as usize + 1);
    }
}

/// `levels` PROTO declarations, each declared inside the previous body.
fn nested_protos(levels: usize) -> Scene {
    let mut body = String::from("Group {}");
    for level in (0..levels).rev() {
        body = format!("PROTO P{level} [] {{ {body} Group {{}} }} Group {{}}");
    }
    parse(&format!("#VRML V2.0 utf8\n{body}\n"))
}

#[test]
fn proto_nesting_is_flagged_at_the_first_excess_level() {
    assert!(nested_protos(MAX_PROTO_NESTING).diagnostics().is_empty());

    let scene = nested_protos(MAX_PROTO_NESTING + 1);
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["Warning, PROTO nesting deeper than 5 (base profile)"]
    );

    let scene = nested_protos(MAX_PROTO_NESTING + 2);
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::ProtoNesting), 1);
    let flagged = diagnostics
        .iter()
        .find(|d| d.kind == DiagnosticKind::ProtoNesting)
        .unwrap();
    assert_eq!(
        scene[flagged.element].as_proto().map(|p| p.name.as_str()),
        Some(&*format!("P{MAX_PROTO_NESTING}"))
    );
}
