mod grammar {
    mod fields_tests;
    mod limits_tests;
    mod nodes_tests;
    mod protos_tests;
    mod routes_tests;
    mod script_tests;
    mod values_tests;
}

mod recovery {
    mod misspelling_tests;
    mod unclosed_tests;
    mod unexpected_tests;
}

use crate::{ElementId, Scene};

/// First authored node of type `name`.
fn find_node(scene: &Scene, name: &str) -> ElementId {
    (0..scene.len())
        .map(ElementId::new)
        .find(|&id| scene.node_name(id) == Some(name) && !scene[id].is_generated())
        .unwrap_or_else(|| panic!("no {name} node"))
}
