//! Basic rendering tests

use super::helpers::{render, shop};
use serde_json::json;

#[test]
fn test_render_simple_interpolation() {
    let result = render("Hello [[ name ]]!", json!({ "name": "World" })).unwrap();
    assert_eq!(result, "Hello World!");
}

#[test]
fn test_render_without_spaces() {
    let result = render("[[name]]", json!({ "name": "x" })).unwrap();
    assert_eq!(result, "x");
}

#[test]
fn test_render_nested_path() {
    let result = render("User: [[ user.name ]]", shop()).unwrap();
    assert_eq!(result, "User: Ada");
}

#[test]
fn test_render_numeric_segment_indexes_array() {
    let result = render("[[ items.1.name ]]", shop()).unwrap();
    assert_eq!(result, "Ink");
}

#[test]
fn test_render_scalars() {
    let data = json!({ "count": 42, "price": 9.99, "on": true, "off": false, "none": null });
    let result = render("[[count]]|[[price]]|[[on]]|[[off]]|[[none]]", data).unwrap();
    assert_eq!(result, "42|9.99|true|false|");
}

#[test]
fn test_render_missing_path_is_empty() {
    let result = render("a[[ nope ]]b[[ user.missing.deeper ]]c", shop()).unwrap();
    assert_eq!(result, "abc");
}

#[test]
fn test_render_literal_operand() {
    let result = render(r#"[[ "text" ]] [[ 7 ]]"#, json!({})).unwrap();
    assert_eq!(result, "text 7");
}

#[test]
fn test_render_filter_chain() {
    let result = render("[[ title | upper | truncate(3) ]]", shop()).unwrap();
    assert_eq!(result, "SHO");
}

#[test]
fn test_render_filter_with_path_argument() {
    let data = json!({ "missing_label": "n/a" });
    let result = render("[[ nothing | default(missing_label) ]]", data).unwrap();
    assert_eq!(result, "n/a");
}

#[test]
fn test_render_text_with_lone_brackets() {
    let src = "list[0] and ## heading and [% if x %]yes[% endif %]";
    let result = render(src, json!({ "x": 1 })).unwrap();
    assert_eq!(result, "list[0] and ## heading and yes");
}

#[test]
fn test_render_multiline_template() {
    let src = "Title: [[ title ]]\nUser: [[ user.name ]]\n";
    let result = render(src, shop()).unwrap();
    assert_eq!(result, "Title: Shop\nUser: Ada\n");
}

#[test]
fn test_render_is_deterministic() {
    let src = "[% for i in items %][[ i.name ]][% endfor %]";
    let first = render(src, shop()).unwrap();
    let second = render(src, shop()).unwrap();
    assert_eq!(first, second);
}
