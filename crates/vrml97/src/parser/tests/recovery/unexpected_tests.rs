use indoc::indoc;

use crate::config::DEFAULT_RECURSION_LIMIT;
use crate::parser::tests::find_node;
use crate::{DiagnosticKind, ParseConfig, Scene, parse};

#[test]
fn stray_closer_at_top() {
    let scene = parse("#VRML V2.0 utf8\nGroup {} }\nTransform {}\n");
    assert_eq!(scene.diagnostics().messages(), vec!["unexpected token: \"}\""]);
    find_node(&scene, "Transform");
}

#[test]
fn number_at_top() {
    let scene = parse("#VRML V2.0 utf8\nGroup {} 42\n");
    assert_eq!(scene.diagnostics().messages(), vec!["expected node"]);
}

#[test]
fn number_in_node_body() {
    let scene = parse("#VRML V2.0 utf8\nGroup { 42 children [] }\n");
    assert_eq!(scene.diagnostics().messages(), vec!["expected field name"]);
    let group = find_node(&scene, "Group");
    assert!(scene.field(group, "children").is_some());
}

#[test]
fn missing_header() {
    let scene = parse("Group {}\n");
    assert_eq!(scene.diagnostics().count(DiagnosticKind::MissingHeader), 1);
    find_node(&scene, "Group");
}

#[test]
fn recursion_limit_skips_deep_bodies() {
    let source = indoc! {"
        #VRML V2.0 utf8
        Group { children [ Group { children [ Group { children [ Shape {} ] } ] } ] }
        Transform {}
    "};
    let scene = Scene::parse(source, ParseConfig::new().with_recursion_limit(2));
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::RecursionLimit), 1);
    assert_eq!(diagnostics.messages(), vec!["nesting too deep"]);

    let shapes = (0..scene.len())
        .map(crate::ElementId::new)
        .filter(|&id| scene.node_name(id) == Some("Shape"))
        .count();
    assert_eq!(shapes, 0);
    find_node(&scene, "Transform");
}

fn nested_groups(levels: usize) -> String {
    format!(
        "#VRML V2.0 utf8\n{}{}\nTransform {{}}\n",
        "Group { children [ ".repeat(levels),
        "] } ".repeat(levels)
    )
}

#[test]
fn default_limit_allows_its_own_depth() {
    let levels = DEFAULT_RECURSION_LIMIT as usize;
    let scene = parse(&nested_groups(levels));
    assert!(scene.diagnostics().is_empty());
}

#[test]
fn default_limit_stops_deep_nesting() {
    let levels = DEFAULT_RECURSION_LIMIT as usize + 1;
    let scene = parse(&nested_groups(levels));
    assert_eq!(scene.diagnostics().messages(), vec!["nesting too deep"]);

    let scene = parse(&nested_groups(5000));
    let diagnostics = scene.diagnostics();
    assert_eq!(diagnostics.count(DiagnosticKind::RecursionLimit), 1);
    find_node(&scene, "Transform");
}
