use indoc::indoc;

use crate::parser::tests::find_node;
use crate::values::FieldValue;
use crate::{DiagnosticKind, ParseConfig, Scene, parse};

#[test]
fn unknown_field_is_skipped_with_its_value() {
    let scene = parse("#VRML V2.0 utf8\nTransform { bogus 1 2 3 translation 1 0 0 }\n");
    assert_eq!(scene.diagnostics().messages(), vec!["unknown field \"bogus\""]);
    let transform = find_node(&scene, "Transform");
    let translation = scene.field_value(transform, "translation").unwrap();
    assert_eq!(
        scene[translation].as_value(),
        Some(&FieldValue::Vec3f(Some([1.0, 0.0, 0.0])))
    );
}

#[test]
fn misspelled_field_is_corrected() {
    let scene = parse("#VRML V2.0 utf8\nTransform { translaton 1 0 0 }\n");
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["unknown field \"translaton\", assuming \"translation\""]
    );
    let transform = find_node(&scene, "Transform");
    assert!(scene.field(transform, "translation").is_some());
}

#[test]
fn repeated_field() {
    let scene = parse("#VRML V2.0 utf8\nTransform { scale 1 1 2 scale 2 2 2 }\n");
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["Warning, repeated field \"scale\""]
    );
}

#[test]
fn event_takes_no_value() {
    let scene = parse("#VRML V2.0 utf8\nTransform { addChildren [ Group {} ] scale 2 2 2 }\n");
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["event \"addChildren\" cannot have a value"]
    );
    let transform = find_node(&scene, "Transform");
    assert!(scene.field(transform, "scale").is_some());
}

#[test]
fn exposed_field_events_resolve() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        DEF T Transform {}
        DEF P PositionInterpolator {}
        ROUTE P.value_changed TO T.set_translation
        ROUTE P.value_changed TO T.translation
    "#});
    assert!(scene.diagnostics().is_empty());
    assert_eq!(scene.route_count(), 2);
}

#[test]
fn default_values_warn_when_enabled() {
    let source = "#VRML V2.0 utf8\nTransform { scale 1 1.0 1 translation 0 1 0 }\n";
    assert!(parse(source).diagnostics().is_empty());

    let scene = Scene::parse(source, ParseConfig::new().with_default_value_warnings(true));
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::DefaultValue), 1);
    assert_eq!(
        diagnostics.messages(),
        vec!["Warning, scale equals the default value"]
    );
}

#[test]
fn fields_keep_source_order() {
    let scene = parse("#VRML V2.0 utf8\nMaterial { shininess 0.5 diffuseColor 1 0 0 }\n");
    let material = find_node(&scene, "Material");
    let names: Vec<&str> = scene[material]
        .children()
        .iter()
        .filter_map(|&c| scene[c].as_field())
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["shininess", "diffuseColor"]);
}
