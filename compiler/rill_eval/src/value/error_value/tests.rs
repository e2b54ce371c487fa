use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_display_untraced() {
    assert_eq!(ErrorValue::new("boom").to_string(), "error(boom)");
}

#[test]
fn test_display_traced() {
    let err = ErrorValue::new("division by zero").with_trace("main.rill", 4);
    assert_eq!(
        err.to_string(),
        "error(at main.rill at line 4: division by zero)"
    );
}

#[test]
fn test_display_fatal() {
    let err = ErrorValue::fatal("stack exhausted").with_trace("lib.rill", 12);
    assert_eq!(
        err.to_string(),
        "fatal error(at lib.rill at line 12: stack exhausted)"
    );
}

#[test]
fn test_halting_rules() {
    assert!(ErrorValue::new("x").halts());
    assert!(!ErrorValue::new("x").ignorable(true).halts());
    assert!(ErrorValue::fatal("x").ignorable(true).halts());
}
