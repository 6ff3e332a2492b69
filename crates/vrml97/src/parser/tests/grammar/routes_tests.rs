use indoc::indoc;

use crate::{DiagnosticKind, parse};

const SENSORS: &str = "#VRML V2.0 utf8\nDEF T TimeSensor {}\nDEF U TimeSensor {}\n";

fn with_sensors(route: &str) -> crate::Scene {
    parse(&format!("{SENSORS}{route}\n"))
}

#[test]
fn valid_route() {
    let scene = with_sensors("ROUTE T.startTime TO U.stopTime");
    assert!(scene.diagnostics().is_empty(), "{:?}", scene.diagnostics().messages());
    assert_eq!(scene.route_count(), 1);
}

#[test]
fn endpoints_without_def() {
    let scene = parse("#VRML V2.0 utf8\nROUTE A.x TO B.y\n");
    assert_eq!(scene.diagnostics().messages(), vec!["No DEF for A", "No DEF for B"]);
    assert_eq!(scene.route_count(), 0);
}

#[test]
fn unknown_field() {
    let scene = with_sensors("ROUTE T.bogus TO U.startTime");
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["unknown field \"bogus\" in ROUTE"]
    );
}

#[test]
fn bad_source_and_destination() {
    let source = with_sensors("ROUTE T.set_enabled TO U.enabled");
    assert_eq!(
        source.diagnostics().messages(),
        vec!["ROUTE source must be an eventOut or exposedField"]
    );

    let destination = with_sensors("ROUTE T.isActive TO U.isActive");
    assert_eq!(
        destination.diagnostics().messages(),
        vec!["ROUTE destination must be an eventIn or exposedField"]
    );
}

#[test]
fn type_mismatch() {
    let scene = with_sensors("ROUTE T.fraction_changed TO U.startTime");
    assert_eq!(
        scene.diagnostics().messages(),
        vec!["ROUTE connects different types: SFFloat to SFTime"]
    );
}

#[test]
fn repeated_route_in_same_scope() {
    let scene = with_sensors(indoc! {"
        ROUTE T.startTime TO U.startTime
        ROUTE U.startTime TO T.startTime
        ROUTE T.startTime TO U.startTime
    "});
    assert_eq!(scene.route_count(), 2);
    assert_eq!(scene.diagnostics().messages(), vec!["Warning, repeated ROUTE"]);
}

#[test]
fn malformed_routes() {
    let missing_to = with_sensors("ROUTE T.isActive U.enabled");
    assert_eq!(missing_to.diagnostics().count(DiagnosticKind::ExpectedTo), 1);

    let bare_name = with_sensors("ROUTE T TO U.enabled");
    assert_eq!(bare_name.diagnostics().count(DiagnosticKind::ExpectedEndpoint), 1);
}

#[test]
fn route_inside_children() {
    let scene = parse(indoc! {"
        #VRML V2.0 utf8
        Group {
            children [
                DEF T TimeSensor {}
                DEF U TimeSensor {}
                ROUTE T.startTime TO U.startTime
            ]
        }
    "});
    assert!(scene.diagnostics().is_empty(), "{:?}", scene.diagnostics().messages());
    assert_eq!(scene.route_count(), 1);
}
