use indoc::indoc;

use crate::parser::tests::find_node;
use crate::{DiagnosticKind, parse};

#[test]
fn nested_nodes() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Group { children [ Shape { geometry Box { size 1 2 3 } } ] }
    "#});
    assert!(scene.diagnostics().is_empty());
    insta::assert_snapshot!(scene.dump(), @r"
    Scene
      Node Group
        Field exposedField MFNode children
          Value MFNode count=1
            Node Shape
              Field exposedField SFNode geometry
                Value SFNode nodes=1
                  Node Box
                    Field field SFVec3f size
                      Value SFVec3f 1 2 3
    ");
}

#[test]
fn empty_file() {
    let scene = parse("#VRML V2.0 utf8\n");
    assert!(scene.diagnostics().is_empty());
    assert!(scene[scene.root()].children().is_empty());
}

#[test]
fn unknown_node_is_skipped_with_its_body() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Gadget { size 1 children [ Group {} ] }
        Group {}
    "#});
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.messages(), vec!["unknown node or PROTO \"Gadget\""]);
    assert_eq!(scene[scene.root()].children().len(), 2);
    let group = find_node(&scene, "Group");
    assert_eq!(scene.stream().text(scene[group].span().start), "Group");
    assert_eq!(scene[group].span().start, 11);
}

#[test]
fn duplicate_def_warns_on_both() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        DEF A Group {}
        DEF A Transform {}
        Group { children USE A }
    "#});
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::DuplicateDef), 2);
    assert!(diagnostics.messages().contains(&"Warning, duplicate DEF \"A\""));

    // The first DEF keeps the name.
    let def = scene.def("A").unwrap();
    assert_eq!(scene.node_name(scene.resolve_node(def).unwrap()), Some("Group"));
}

#[test]
fn use_before_def() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Group { children USE A }
        DEF A Group {}
    "#});
    let messages = scene.diagnostics();
    assert!(messages.messages().contains(&"No DEF for A"));
}

#[test]
fn use_of_ancestor_is_a_loop() {
    let scene = parse("#VRML V2.0 utf8\nDEF A Transform { children [ USE A ] }\n");
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["USE referring to parent node"]
    );
}

#[test]
fn node_not_allowed_at_top() {
    let scene = parse("#VRML V2.0 utf8\nBox {}\n");
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["node \"Box\" not allowed at top level"]
    );
}

#[test]
fn node_not_allowed_in_field() {
    let scene = parse("#VRML V2.0 utf8\nShape { geometry Material {} }\n");
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["node \"Material\" not allowed in field \"geometry\""]
    );
}

#[test]
fn node_in_place_of_field() {
    let scene = parse("#VRML V2.0 utf8\nGroup { Shape {} }\n");
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.messages(), vec!["misplaced node \"Shape\""]);
    let group = find_node(&scene, "Group");
    let shape = find_node(&scene, "Shape");
    assert_eq!(scene[shape].parent(), Some(group));
}

#[test]
fn def_and_use_in_place_of_field() {
    let scene = parse("#VRML V2.0 utf8\nDEF B Shape {}\nGroup { DEF A Box {} USE B children [] }\n");
    let diagnostics = scene.diagnostics();
    let messages = diagnostics.messages();
    assert_eq!(diagnostics.count(DiagnosticKind::MisplacedNode), 2);
    assert!(messages.contains(&"misplaced node \"Box\""));
    assert!(messages.contains(&"misplaced node \"Shape\""));
    assert!(!messages.iter().any(|m| m.starts_with("unknown field")));
    assert!(!messages.contains(&"Warning, unused DEF \"B\""));

    let group = find_node(&scene, "Group");
    assert!(scene.field(group, "children").is_some());
    let box_node = find_node(&scene, "Box");
    assert!(scene.is_ancestor(group, box_node));
}

#[test]
fn nurbs_nodes_need_the_extension() {
    let source = "#VRML V2.0 utf8\nShape { geometry NurbsSurface {} }\n";
    let plain = parse(source);
    assert!(plain.diagnostics().has_errors());

    let scene = crate::Scene::parse(source, crate::ParseConfig::new().with_nurbs(true));
    assert_eq!(scene.diagnostics().error_count(), 0);
    assert_eq!(scene.node_name(find_node(&scene, "NurbsSurface")), Some("NurbsSurface"));
}
