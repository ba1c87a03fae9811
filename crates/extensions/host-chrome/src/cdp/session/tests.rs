use serde_json::json;

use super::core::PageSession;
use crate::cdp::CdpError;

#[test]
fn test_evaluation_value() {
    let value = PageSession::evaluation_value(json!({
        "result": {"type": "boolean", "value": true}
    }))
    .unwrap();
    assert_eq!(value, json!(true));
}

#[test]
fn test_evaluation_undefined_is_null() {
    let value = PageSession::evaluation_value(json!({
        "result": {"type": "undefined"}
    }))
    .unwrap();
    assert!(value.is_null());
}

#[test]
fn test_evaluation_exception_prefers_description() {
    let err = PageSession::evaluation_value(json!({
        "result": {"type": "object", "subtype": "error"},
        "exceptionDetails": {
            "text": "Uncaught",
            "exception": {"description": "TypeError: el.click is not a function"}
        }
    }))
    .unwrap_err();
    assert!(matches!(err, CdpError::JavaScript(msg) if msg.starts_with("TypeError")));
}

#[test]
fn test_evaluation_exception_text_fallback() {
    let err = PageSession::evaluation_value(json!({
        "exceptionDetails": {"text": "Uncaught SyntaxError"}
    }))
    .unwrap_err();
    assert_eq!(err.to_string(), "JavaScript error: Uncaught SyntaxError");
}
