//! Conditional rendering tests

use super::helpers::{render, shop};
use serde_json::json;

#[test]
fn test_if_true_branch() {
    let src = "[% if user.admin %]admin[% endif %]";
    assert_eq!(render(src, shop()).unwrap(), "admin");
}

#[test]
fn test_if_else_on_list() {
    let src = "[% if items %][% for i in items %]<li>[[ i.name ]]</li>[% endfor %][% else %]Empty[% endif %]";
    assert_eq!(
        render(src, shop()).unwrap(),
        "<li>Pen</li><li>Ink</li><li>Pad</li>"
    );
    assert_eq!(render(src, json!({ "items": [] })).unwrap(), "Empty");
    assert_eq!(render(src, json!({})).unwrap(), "Empty");
}

#[test]
fn test_elseif_chain_takes_first_match() {
    let src = "[% if a %]A[% elseif b %]B[% else if c %]C[% else %]D[% endif %]";
    assert_eq!(render(src, json!({ "b": 1, "c": 1 })).unwrap(), "B");
    assert_eq!(render(src, json!({ "c": "yes" })).unwrap(), "C");
    assert_eq!(render(src, json!({})).unwrap(), "D");
}

#[test]
fn test_empty_values_are_false() {
    let src = "[% if v %]T[% else %]F[% endif %]";
    for value in [json!(null), json!(false), json!(0), json!(""), json!("0"), json!([]), json!({})] {
        assert_eq!(
            render(src, json!({ "v": value.clone() })).unwrap(),
            "F",
            "{} should be empty",
            value
        );
    }
    for value in [json!(true), json!(1), json!("no"), json!([0]), json!({ "k": 0 })] {
        assert_eq!(
            render(src, json!({ "v": value.clone() })).unwrap(),
            "T",
            "{} should be non-empty",
            value
        );
    }
}

#[test]
fn test_logical_operators() {
    let data = json!({ "t": true, "f": false });
    assert_eq!(render("[% if t and f %]x[% else %]y[% endif %]", data.clone()).unwrap(), "y");
    assert_eq!(render("[% if t or f %]x[% endif %]", data.clone()).unwrap(), "x");
    assert_eq!(render("[% if not f %]x[% endif %]", data.clone()).unwrap(), "x");
    assert_eq!(render("[% if !t || (t && !f) %]x[% endif %]", data).unwrap(), "x");
}

#[test]
fn test_comparisons() {
    let data = json!({ "n": 5, "role": "admin" });
    assert_eq!(render("[% if n > 3 %]big[% endif %]", data.clone()).unwrap(), "big");
    assert_eq!(render("[% if n <= 4 %]small[% endif %]", data.clone()).unwrap(), "");
    assert_eq!(render("[% if n == 5.0 %]eq[% endif %]", data.clone()).unwrap(), "eq");
    assert_eq!(
        render(r#"[% if role == "admin" %]yes[% endif %]"#, data.clone()).unwrap(),
        "yes"
    );
    assert_eq!(render("[% if role != 'guest' %]yes[% endif %]", data).unwrap(), "yes");
}

#[test]
fn test_quoted_keywords_are_literal() {
    let data = json!({ "word": "and or not" });
    let src = r#"[% if word == "and or not" %]same[% endif %]"#;
    assert_eq!(render(src, data).unwrap(), "same");
}

#[test]
fn test_comparison_with_missing_value() {
    assert_eq!(render("[% if missing > 1 %]x[% else %]y[% endif %]", json!({})).unwrap(), "y");
    assert_eq!(render("[% if missing == null %]x[% endif %]", json!({})).unwrap(), "x");
}

#[test]
fn test_nested_conditionals_in_loop() {
    let src = "[% for i in items %][% if i.price > 4 %][[ i.name ]][% endif %][% endfor %]";
    assert_eq!(render(src, shop()).unwrap(), "InkPad");
}
