use indoc::indoc;

use crate::parser::tests::find_node;
use crate::scene::{NodeOrigin, ScenePrinter};
use crate::parse;

#[test]
fn functions_from_inline_code() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        DEF S Script {
            eventIn SFBool go
            url "javascript: function go(v) { } function stop_now (v) { }"
        }
        DEF T TouchSensor {}
        ROUTE T.isActive TO S.go
    "#});
    assert!(scene.diagnostics().is_empty(), "{:?}", scene.diagnostics().messages());

    let script = find_node(&scene, "Script");
    let data = scene[script].as_node().unwrap();
    assert_eq!(data.origin, NodeOrigin::Script);
    assert!(data.inline_script);
    assert_eq!(data.functions, vec!["go", "stop_now"]);

    let dump = ScenePrinter::new(&scene).dump();
    assert!(dump.contains("Node Script (Script) functions=go,stop_now"), "{dump}");
}

#[test]
fn missing_function() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        DEF S Script {
            eventIn SFBool go
            url "vrmlscript: function other(v) { }"
        }
        DEF T TouchSensor {}
        ROUTE T.isActive TO S.go
    "#});
    assert_eq!(scene.diagnostics().messages(), vec!["no function \"go\" in Script"]);
}

#[test]
fn external_code_is_not_scanned() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        DEF S Script {
            eventIn SFBool go
            url "logic.js"
        }
        DEF T TouchSensor {}
        ROUTE T.isActive TO S.go
    "#});
    assert!(scene.diagnostics().is_empty());
    let script = find_node(&scene, "Script");
    assert!(!scene[script].as_node().unwrap().inline_script);
}

#[test]
fn exposed_field_in_script() {
    let scene = parse("#VRML V2.0 utf8\nScript { exposedField SFFloat x 1 }\n");
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["exposedField not allowed in Script"]
    );
}

#[test]
fn script_fields_and_declarations_mix() {
    let scene = parse(indoc! {r#"
        #VRML V2.0 utf8
        Script {
            field SFInt32 count 3
            directOutput TRUE
            eventOut SFBool done
        }
    "#});
    assert!(scene.diagnostics().is_empty(), "{:?}", scene.diagnostics().messages());
    let script = find_node(&scene, "Script");
    let interfaces = scene[script]
        .children()
        .iter()
        .filter(|&&child| scene[child].as_interface().is_some())
        .count();
    assert_eq!(interfaces, 2);
    assert!(scene.field(script, "directOutput").is_some());
}
