//! Loop rendering tests

use super::helpers::{render, shop};
use serde_json::json;

#[test]
fn test_render_for_loop() {
    let src = "[% for item in items %][[ item.name ]],[% endfor %]";
    assert_eq!(render(src, shop()).unwrap(), "Pen,Ink,Pad,");
}

#[test]
fn test_render_for_loop_multiline() {
    let src = "[% for item in items %]\n- [[ item.name ]]\n[% endfor %]";
    let result = render(src, shop()).unwrap();
    assert!(result.contains("- Pen"));
    assert!(result.contains("- Pad"));
}

#[test]
fn test_render_nested_loops() {
    let data = json!({
        "groups": [
            { "name": "a", "members": ["x", "y"] },
            { "name": "b", "members": ["z"] }
        ]
    });
    let src = "[% for g in groups %][[ g.name ]]:[% for m in g.members %][[ m ]][% endfor %];[% endfor %]";
    assert_eq!(render(src, data).unwrap(), "a:xy;b:z;");
}

#[test]
fn test_loop_binding_shadows_global() {
    let data = json!({ "x": "outer", "xs": ["inner"] });
    let src = "[[ x ]][% for x in xs %][[ x ]][% endfor %][[ x ]]";
    assert_eq!(render(src, data).unwrap(), "outerinnerouter");
}

#[test]
fn test_loop_metadata() {
    let src = "[% for i in items %][[ loop.index ]]/[[ loop.length ]][% if loop.first %]F[% endif %][% if loop.last %]L[% endif %] [% endfor %]";
    assert_eq!(render(src, shop()).unwrap(), "1/3F 2/3 3/3L ");
}

#[test]
fn test_loop_index0() {
    let src = "[% for i in items %][[ loop.index0 ]][% endfor %]";
    assert_eq!(render(src, shop()).unwrap(), "012");
}

#[test]
fn test_loop_over_missing_path_runs_zero_times() {
    let src = "a[% for x in nothing.here %]X[% endfor %]b";
    assert_eq!(render(src, shop()).unwrap(), "ab");
}

#[test]
fn test_loop_over_scalar_runs_zero_times() {
    let src = "[% for c in title %]X[% endfor %]";
    assert_eq!(render(src, shop()).unwrap(), "");
}

#[test]
fn test_loop_over_empty_array() {
    let src = "[% for x in empty %]X[% endfor %]done";
    assert_eq!(render(src, shop()).unwrap(), "done");
}

#[test]
fn test_loop_over_object_values() {
    let data = json!({ "map": { "a": 1, "b": 2 } });
    let src = "[% for v in map %][[ v ]][% endfor %]";
    assert_eq!(render(src, data).unwrap(), "12");
}

#[test]
fn test_loop_over_object_keeps_insertion_order() {
    let data = json!({ "map": { "z": 1, "a": 2, "m": 3 } });
    let src = "[% for v in map %][[ v ]][% endfor %]";
    assert_eq!(render(src, data).unwrap(), "123");
}
