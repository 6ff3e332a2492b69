use indoc::indoc;

use crate::parser::tests::find_node;
use crate::{DiagnosticKind, parse};

#[test]
fn unclosed_at_end_of_file() {
    let scene = parse("#VRML V2.0 utf8\nGroup { children [ Shape {}\n");
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::MissingRightBracket), 1);
    assert_eq!(diagnostics.count(DiagnosticKind::MissingRightBrace), 1);

    let group = find_node(&scene, "Group");
    let shape = find_node(&scene, "Shape");
    assert!(scene.is_ancestor(group, shape));
}

#[test]
fn bracket_ends_an_unclosed_body() {
    let scene = parse(indoc! {"
        #VRML V2.0 utf8
        Group { children [ Shape { ] }
        Transform {}
    "});
    assert_eq!(scene.diagnostics().messages(), vec!["expected \"}\""]);

    let group = find_node(&scene, "Group");
    let transform = find_node(&scene, "Transform");
    assert_eq!(scene[transform].parent(), Some(scene.root()));
    assert!(scene.field(group, "children").is_some());
}

#[test]
fn missing_left_brace() {
    let scene = parse("#VRML V2.0 utf8\nGroup children [] }\n");
    assert_eq!(scene.diagnostics().messages(), vec!["expected \"{\""]);
}

#[test]
fn unclosed_proto_body() {
    let scene = parse("#VRML V2.0 utf8\nPROTO P [] { Group {}\n");
    assert_eq!(scene.diagnostics().messages(), vec!["expected \"}\""]);
    assert!(scene.proto("P").is_some());
}
