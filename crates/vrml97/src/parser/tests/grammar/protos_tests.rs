use indoc::indoc;

use crate::parser::tests::find_node;
use crate::scene::NodeOrigin;
use crate::{DiagnosticKind, parse};

#[test]
fn proto_declaration_and_instance() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO Ball [ field SFFloat size 1 ] { Sphere { radius IS size } }
        Shape { geometry Ball { size 2 } }
    "#});
    assert!(scene.diagnostics().is_empty(), "{:?}", scene.diagnostics().messages());

    let proto = scene.proto("Ball").unwrap();
    let data = scene[proto].as_proto().unwrap();
    assert!(!data.external);
    assert_eq!(data.builtin_type.as_deref(), Some("Sphere"));

    let ball = find_node(&scene, "Ball");
    assert_eq!(scene[ball].as_node().unwrap().origin, NodeOrigin::Proto(proto));
}

#[test]
fn builtin_type_follows_nested_instances() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO Inner [] { Transform {} }
        PROTO Outer [] { Inner {} }
        Outer {}
    "#});
    let outer = scene.proto("Outer").unwrap();
    assert_eq!(scene[outer].as_proto().unwrap().builtin_type.as_deref(), Some("Transform"));
}

#[test]
fn proto_is_not_known_inside_its_own_body() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO Loop [] { Loop {} }
    "#});
    let diagnostics = scene.diagnostics();
    let messages = diagnostics.messages();
    assert!(messages.contains(&"unknown node or PROTO \"Loop\""), "{messages:?}");
    assert_eq!(scene.diagnostics().count(DiagnosticKind::ProtoMissingNode), 1);
}

#[test]
fn proto_without_node() {
    let scene = parse("#VRML V2.0 utf8\nPROTO Empty [] { }\n");
    assert_eq!(scene.diagnostics().messages(), vec!["node missing from PROTO body"]);
}

#[test]
fn duplicate_proto_keeps_first() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO A [] { Group {} }
        PROTO A [] { Transform {} }
    "#});
    assert_eq!(scene.diagnostics().messages(), vec!["Warning, duplicate PROTO \"A\""]);
    let proto = scene.proto("A").unwrap();
    assert_eq!(scene[proto].as_proto().unwrap().builtin_type.as_deref(), Some("Group"));
}

#[test]
fn is_outside_proto() {
    let scene = parse("#VRML V2.0 utf8\nTransform { translation IS t }\n");
    assert_eq!(scene.diagnostics().messages(), vec!["IS outside PROTO"]);
}

#[test]
fn is_unknown_interface() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO P [ field SFFloat size 1 ] { Sphere { radius IS bogus } }
    "#});
    let diagnostics = scene.diagnostics();
    let messages = diagnostics.messages();
    assert!(messages.contains(&"unknown interface field \"bogus\""), "{messages:?}");
    assert!(messages.contains(&"Warning, unused interface field \"size\""), "{messages:?}");
}

#[test]
fn is_mismatches() {
    let types = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO P [ field SFInt32 n 1 ] { Sphere { radius IS n } }
    "#});
    assert_eq!(types.diagnostics().count(DiagnosticKind::IsTypeMismatch), 1);

    let kinds = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO P [ eventIn SFFloat set_r ] { Sphere { radius IS set_r } }
    "#});
    assert_eq!(kinds.diagnostics().count(DiagnosticKind::IsKindMismatch), 1);
}

#[test]
fn is_marks_enclosing_nodes() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO P [ field SFFloat r 1 ] {
            Shape { geometry Sphere { radius IS r } }
        }
    "#});
    let shape = find_node(&scene, "Shape");
    let sphere = find_node(&scene, "Sphere");
    assert!(scene[shape].as_node().unwrap().has_is);
    assert!(scene[sphere].as_node().unwrap().has_is);
}

#[test]
fn duplicate_interface() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO P [ field SFFloat a 1 field SFFloat a 2 ] { Sphere { radius IS a } }
    "#});
    assert_eq!(scene.diagnostics().count(DiagnosticKind::DuplicateInterface), 1);
}

#[test]
fn unknown_interface_type() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        PROTO P [ field SFFlot a 1 ] { Group {} }
    "#});
    assert_eq!(scene.diagnostics().count(DiagnosticKind::UnknownType), 1);
}

#[test]
fn externproto_declaration_and_instance() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        EXTERNPROTO Far [ field SFFloat size ] "far.wrl"
        Far { size 3 }
    "#});
    assert!(scene.diagnostics().is_empty(), "{:?}", scene.diagnostics().messages());

    let proto = scene.proto("Far").unwrap();
    assert!(scene[proto].as_proto().unwrap().external);
    assert!(scene[proto].as_proto().unwrap().body.is_none());
    let far = find_node(&scene, "Far");
    assert_eq!(scene[far].as_node().unwrap().origin, NodeOrigin::ExternProto(proto));
}

#[test]
fn externproto_needs_url() {
    let scene = parse("#VRML V2.0 utf8\nEXTERNPROTO Far [ field SFFloat size ]\n");
    assert_eq!(scene.diagnostics().messages(), vec!["expected EXTERNPROTO url value"]);
}
