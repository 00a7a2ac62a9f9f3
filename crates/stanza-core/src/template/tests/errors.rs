//! Error handling tests

use super::helpers::{render, shop};
use crate::error::{CallableKind, StanzaError};
use serde_json::json;

#[test]
fn test_error_unregistered_filter() {
    let err = render("[[ title | shout ]]", shop()).unwrap_err();
    assert!(matches!(
        err,
        StanzaError::UnregisteredCallable { kind: CallableKind::Filter, ref name } if name == "shout"
    ));
}

#[test]
fn test_error_filter_failure() {
    let err = render("[[ title | truncate('x') ]]", shop()).unwrap_err();
    assert!(matches!(
        err,
        StanzaError::ExecutionFailure { kind: CallableKind::Filter, .. }
    ));
}

#[test]
fn test_error_unclosed_interpolation() {
    let err = render("Hello [[ name", json!({})).unwrap_err();
    match err {
        StanzaError::Syntax { line, message, .. } => {
            assert_eq!(line, 1);
            assert!(message.contains("Unclosed"), "got: {}", message);
        }
        other => panic!("Expected Syntax error, got {:?}", other),
    }
}

#[test]
fn test_error_unclosed_if_reports_line() {
    let err = render("one\ntwo\n[% if x %]never", json!({})).unwrap_err();
    assert!(matches!(err, StanzaError::Syntax { line: 3, .. }));
}

#[test]
fn test_error_unclosed_for() {
    let err = render("[% for x in xs %]", json!({})).unwrap_err();
    assert!(matches!(err, StanzaError::Syntax { .. }));
}

#[test]
fn test_error_stray_endif() {
    let err = render("text [% endif %]", json!({})).unwrap_err();
    match err {
        StanzaError::Syntax { message, .. } => assert!(message.contains("endif")),
        other => panic!("Expected Syntax error, got {:?}", other),
    }
}

#[test]
fn test_error_unknown_directive() {
    let err = render("[% include 'header' %]", json!({})).unwrap_err();
    match err {
        StanzaError::Syntax { message, .. } => assert!(message.contains("include")),
        other => panic!("Expected Syntax error, got {:?}", other),
    }
}

#[test]
fn test_error_bad_expression() {
    assert!(render("[[ a b ]]", json!({})).is_err());
    assert!(render("[% if a = b %]x[% endif %]", json!({})).is_err());
}

#[test]
fn test_no_partial_output_on_failure() {
    let result = render("lots of text [[ x | nope ]] more", json!({ "x": 1 }));
    assert!(result.is_err());
}

#[test]
fn test_error_malformed_for() {
    let err = render("[% for in items %][% endfor %]", shop()).unwrap_err();
    assert!(matches!(err, StanzaError::Syntax { .. }));
}
