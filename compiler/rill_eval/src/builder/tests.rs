use pretty_assertions::assert_eq;
use rill_ir::{ScriptInfo, Span, SyntaxKind, SyntaxNode};
use rill_parse::parse;

use super::*;
use crate::call::CallTarget;

fn build_source(source: &str) -> Block {
    let script = ScriptInfo::shared("test", source);
    let tree = match parse(source) {
        Ok(tree) => tree,
        Err(error) => panic!("parse failed: {error}"),
    };
    match build(&tree, &script) {
        Ok(block) => block,
        Err(error) => panic!("build failed: {error}"),
    }
}

fn only_call(block: &Block) -> &Call {
    match block.calls() {
        [call] => call,
        calls => panic!("expected one call, got {}", calls.len()),
    }
}

fn target_value(call: &Call) -> &Value {
    match call.target() {
        CallTarget::Expr(arg) => arg.value(),
        CallTarget::Bound(native) => panic!("unexpected bound target {}", native.name()),
    }
}

fn identifier_text(value: &Value) -> String {
    value
        .as_identifier()
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn nested_call(value: &Value) -> &Call {
    match value {
        Value::Call(call) => call,
        other => panic!("expected a call, got {other:?}"),
    }
}

#[test]
fn test_plain_call() {
    let block = build_source("chipotle sauce");
    let call = only_call(&block);
    assert_eq!(identifier_text(target_value(call)), "chipotle");
    assert_eq!(call.args().len(), 1);
    assert_eq!(identifier_text(call.args()[0].value()), "sauce");
    assert!(call.pipe().is_none());
}

#[test]
fn test_one_call_per_line() {
    let block = build_source("a\nb c\n\nd");
    let lines: Vec<u32> = block.calls().iter().map(Call::line).collect();
    assert_eq!(lines, vec![1, 2, 4]);
}

#[test]
fn test_literals() {
    let block = build_source("f 42 1_000 2.5");
    let call = only_call(&block);
    let args = call.args();
    assert_eq!(args[0].value().as_int(), Some(42));
    assert_eq!(args[1].value().as_int(), Some(1000));
    assert_eq!(args[2].value().as_float(), Some(2.5));
    assert!(args.iter().all(|arg| !arg.is_resolved()));
}

#[test]
fn test_colon_with_bare_value_becomes_set() {
    let block = build_source("a: 3");
    let call = only_call(&block);
    assert_eq!(identifier_text(target_value(call)), "set");
    assert_eq!(identifier_text(call.args()[0].value()), "a");
    assert_eq!(call.args()[1].value().as_int(), Some(3));
}

#[test]
fn test_colon_with_call_wraps_the_rhs() {
    let block = build_source("total: plus 1 2");
    let call = only_call(&block);
    assert_eq!(identifier_text(target_value(call)), "set");
    let rhs = nested_call(call.args()[1].value());
    assert_eq!(rhs.target_name(), "plus");
    assert_eq!(rhs.args().len(), 2);
}

#[test]
fn test_dot_path_on_target() {
    let block = build_source("a.b.c 1");
    let call = only_call(&block);
    let path = target_value(call).as_identifier().cloned();
    let segments = path.map(|p| p.segments().to_vec()).unwrap_or_default();
    assert_eq!(segments, vec!["a", "b", "c"]);
    assert_eq!(call.args().len(), 1);
}

#[test]
fn test_dot_path_on_argument() {
    let block = build_source("print point.x");
    let call = only_call(&block);
    assert_eq!(call.args().len(), 1);
    assert_eq!(identifier_text(call.args()[0].value()), "point.x");
}

#[test]
fn test_colon_on_dotted_target() {
    let block = build_source("point.x: 4");
    let call = only_call(&block);
    assert_eq!(identifier_text(target_value(call)), "set");
    assert_eq!(identifier_text(call.args()[0].value()), "point.x");
}

#[test]
fn test_pipe_attaches_next_call() {
    let block = build_source("f 1 | g 2 | h");
    let call = only_call(&block);
    assert_eq!(call.target_name(), "f");
    let g = call.pipe();
    assert_eq!(g.map(Call::target_name).as_deref(), Some("g"));
    assert_eq!(g.map(|c| c.args().len()), Some(1));
    let h = g.and_then(Call::pipe);
    assert_eq!(h.map(Call::target_name).as_deref(), Some("h"));
    assert!(h.and_then(Call::pipe).is_none());
}

#[test]
fn test_list_literal_binds_the_constructor() {
    let block = build_source("f [1 a.b (g)]");
    let call = only_call(&block);
    let list = nested_call(call.args()[0].value());
    assert!(matches!(list.target(), CallTarget::Bound(_)));
    assert_eq!(list.target_name(), "list");
    let items = list.args();
    assert_eq!(items.len(), 3);
    assert_eq!(identifier_text(items[1].value()), "a.b");
    assert_eq!(nested_call(items[2].value()).target_name(), "g");
}

#[test]
fn test_block_argument() {
    let block = build_source("if x { a 1\n b 2 }");
    let call = only_call(&block);
    let body = call.args()[1].value().as_block().map(|b| b.calls().len());
    assert_eq!(body, Some(2));
}

#[test]
fn test_string_escapes() {
    let block = build_source(r#"print "a\nb\t\"c\" \\ \{d\}""#);
    let call = only_call(&block);
    assert_eq!(call.args()[0].value().as_str(), Some("a\nb\t\"c\" \\ {d}"));
}

#[test]
fn test_string_interpolation_offsets() {
    let block = build_source(r#"print "x{y}z{w 1}""#);
    let call = only_call(&block);
    let Value::String(text) = call.args()[0].value() else {
        panic!("expected a string");
    };
    assert_eq!(text.text(), "xz");
    let parts: Vec<(usize, String)> = text
        .interpolations()
        .iter()
        .map(|i| (i.offset, only_call(&i.block).target_name()))
        .collect();
    assert_eq!(parts, vec![(1, "y".to_string()), (2, "w".to_string())]);
}

#[test]
fn test_spans_point_into_the_source() {
    let source = "a 1\nbb 22";
    let block = build_source(source);
    let second = &block.calls()[1];
    assert_eq!(second.script().slice(second.args()[0].span()), "22");
}

#[test]
fn test_root_must_be_a_script() {
    let script = ScriptInfo::shared("test", "x");
    let node = SyntaxNode::leaf(SyntaxKind::Identifier, Span::new(0, 1));
    assert!(matches!(
        build(&node, &script),
        Err(BuildError::UnexpectedNode {
            expected: "Script",
            ..
        })
    ));
}

#[test]
fn test_script_children_must_be_calls() {
    let script = ScriptInfo::shared("test", "1");
    let span = Span::new(0, 1);
    let tree = SyntaxNode::new(
        SyntaxKind::Script,
        span,
        vec![SyntaxNode::leaf(SyntaxKind::Integer, span)],
    );
    assert_eq!(
        build(&tree, &script).err(),
        Some(BuildError::UnexpectedNode {
            expected: "Call",
            found: SyntaxKind::Integer,
            span,
        })
    );
}

#[test]
fn test_empty_call_is_malformed() {
    let script = ScriptInfo::shared("test", "");
    let span = Span::new(0, 0);
    let tree = SyntaxNode::new(
        SyntaxKind::Script,
        span,
        vec![SyntaxNode::leaf(SyntaxKind::Call, span)],
    );
    assert!(matches!(
        build(&tree, &script),
        Err(BuildError::Malformed { .. })
    ));
}

#[test]
fn test_dot_after_literal_is_malformed() {
    let script = ScriptInfo::shared("test", "f 1.x");
    let ident = SyntaxNode::leaf(SyntaxKind::Identifier, Span::new(0, 1));
    let one = SyntaxNode::leaf(SyntaxKind::Integer, Span::new(2, 3));
    let dot = SyntaxNode::new(
        SyntaxKind::DotShortcut,
        Span::new(3, 5),
        vec![SyntaxNode::leaf(SyntaxKind::Identifier, Span::new(4, 5))],
    );
    let call = SyntaxNode::new(SyntaxKind::Call, Span::new(0, 5), vec![ident, one, dot]);
    let tree = SyntaxNode::new(SyntaxKind::Script, Span::new(0, 5), vec![call]);
    assert!(matches!(
        build(&tree, &script),
        Err(BuildError::Malformed { .. })
    ));
}

#[test]
fn test_out_of_range_integer_is_invalid() {
    let source = "f 99999999999999999999";
    let script = ScriptInfo::shared("test", source);
    let call = SyntaxNode::new(
        SyntaxKind::Call,
        Span::new(0, 22),
        vec![
            SyntaxNode::leaf(SyntaxKind::Identifier, Span::new(0, 1)),
            SyntaxNode::leaf(SyntaxKind::Integer, Span::new(2, 22)),
        ],
    );
    let tree = SyntaxNode::new(SyntaxKind::Script, Span::new(0, 22), vec![call]);
    assert!(matches!(
        build(&tree, &script),
        Err(BuildError::InvalidLiteral {
            what: "integer",
            ..
        })
    ));
}
