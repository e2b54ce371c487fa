use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_line_of_offsets() {
    let script = ScriptInfo::new("main.rill", "a: 1\nb: 2\n\nc: 3");
    assert_eq!(script.line_of(0), 1);
    assert_eq!(script.line_of(4), 1);
    assert_eq!(script.line_of(5), 2);
    assert_eq!(script.line_of(10), 3);
    assert_eq!(script.line_of(11), 4);
    assert_eq!(script.line_count(), 4);
}

#[test]
fn test_slice_in_and_out_of_range() {
    let script = ScriptInfo::new("s", "chipotle sauce");
    assert_eq!(script.slice(Span::new(0, 8)), "chipotle");
    assert_eq!(script.slice(Span::new(9, 14)), "sauce");
    assert_eq!(script.slice(Span::new(9, 40)), "");
}

#[test]
fn test_synthetic_script_is_empty() {
    let script = ScriptInfo::synthetic("<host>");
    assert_eq!(script.name(), "<host>");
    assert_eq!(script.source(), "");
    assert_eq!(script.line_of(100), 1);
}
