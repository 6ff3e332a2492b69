//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

pub(crate) fn bad_table(err: &serde_json::Error) -> ! {
    panic!("vrml97.json: embedded table does not deserialize: {err}")
}

pub(crate) fn bad_field_line(node: &str, line: &str) -> ! {
    panic!("vrml97.json: node {node} has malformed field line `{line}`")
}
