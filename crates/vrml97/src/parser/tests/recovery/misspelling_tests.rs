use indoc::indoc;

use crate::parser::tests::find_node;
use crate::scene::NodeOrigin;
use crate::{DiagnosticKind, parse};

#[test]
fn misspelled_node_is_corrected() {
    let scene = parse("#VRML V2.0 utf8\nTransfrm { translation 1 2 3 }\n");
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["unknown node or PROTO \"Transfrm\", assuming \"Transform\""]
    );
    let transform = find_node(&scene, "Transform");
    assert!(scene.field(transform, "translation").is_some());
}

#[test]
fn node_case_is_corrected() {
    let scene = parse("#VRML V2.0 utf8\ngroup {}\n");
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["unknown node or PROTO \"group\", assuming \"Group\""]
    );
}

#[test]
fn misspelled_proto_name() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO Ball [] { Transform {} }
        Bal {}
    "#});
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["unknown node or PROTO \"Bal\", assuming \"Ball\""]
    );
    let proto = scene.proto("Ball").unwrap();
    let ball = find_node(&scene, "Ball");
    assert_eq!(scene[ball].as_node().unwrap().origin, NodeOrigin::Proto(proto));
}

#[test]
fn distant_names_are_not_corrected() {
    let scene = parse("#VRML V2.0 utf8\nGadget { size 1 }\nGroup {}\n");
    assert_eq!(scene.diagnostics().messages(), vec!["unknown node or PROTO \"Gadget\""]);
    assert_eq!(scene.diagnostics().count(DiagnosticKind::MisspelledNode), 0);
}

#[test]
fn misspelled_field_keeps_its_value() {
    let scene = parse("#VRML V2.0 utf8\nTransform { scal 2 2 2 }\n");
    assert_eq!(scene.diagnostics().count(DiagnosticKind::MisspelledField), 1);
    let transform = find_node(&scene, "Transform");
    let value = scene.field_value(transform, "scale").unwrap();
    assert_eq!(scene[value].as_value().unwrap().number_values(), 1);
}

#[test]
fn misspelled_interface_kind() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO P [ feild SFFloat a 1 ] { Group {} }
    "#});
    let diagnostics = scene.diagnostics();
    let messages = diagnostics.messages();
    assert!(
        messages.contains(
            &"expected eventIn, eventOut, field or exposedField: \"feild\", did you mean \"field\""
        ),
        "{messages:?}"
    );
}
