use pretty_assertions::assert_eq;

use super::builtin_names;
use crate::value::Value;
use crate::{buffer_handler, FnModule, Runtime};

fn runtime() -> Runtime {
    Runtime::builder().print_handler(buffer_handler()).build()
}

fn eval(rt: &Runtime, source: &str) -> Value {
    match rt.eval("test", source) {
        Ok(value) => value,
        Err(error) => panic!("script failed to compile: {error}"),
    }
}

fn eval_fresh(source: &str) -> Value {
    eval(&runtime(), source)
}

fn message(value: &Value) -> String {
    match value.as_error() {
        Some(error) => error.message().to_string(),
        None => panic!("expected an error, got {value:?}"),
    }
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_list()
        .map(|list| list.snapshot().iter().map(ToString::to_string).collect())
        .unwrap_or_default()
}

#[test]
fn test_builtin_names_are_sorted() {
    let names = builtin_names();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    for expected in ["set", "func", "list", "try", "freeze"] {
        assert!(names.contains(&expected), "missing {expected}");
    }
}

#[test]
fn test_constants() {
    assert_eq!(eval_fresh("true").as_bool(), Some(true));
    assert_eq!(eval_fresh("false").as_bool(), Some(false));
    assert!(eval_fresh("nil").is_nil());
}

#[test]
fn test_set_accepts_a_string_name() {
    assert_eq!(eval_fresh("set \"a\" 4\na").as_int(), Some(4));
}

#[test]
fn test_set_into_missing_dictionary() {
    let value = eval_fresh("set nowhere.x 1");
    assert!(message(&value).contains("no such dictionary"));
}

#[test]
fn test_unset() {
    let rt = runtime();
    assert_eq!(eval(&rt, "a: 1\nunset a").as_int(), Some(1));
    assert!(eval(&rt, "get a").is_error());
    assert!(eval(&rt, "unset a").is_nil());
    assert_eq!(eval(&rt, "d: (dict k 1)\nunset d.k\nlen d").as_int(), Some(0));
}

#[test]
fn test_func_parameters_must_be_names() {
    let value = eval_fresh("func 1 {2}");
    assert!(message(&value).starts_with("func parameters must be names"));
}

#[test]
fn test_func_arity_is_checked() {
    assert!(eval_fresh("f: (func a {a})\nf 1 2").is_error());
}

#[test]
fn test_if_branches() {
    let rt = runtime();
    assert_eq!(eval(&rt, "if true {1} {2}").as_int(), Some(1));
    assert_eq!(eval(&rt, "if false {1} else {2}").as_int(), Some(2));
    assert_eq!(eval(&rt, "if 0 1 2").as_int(), Some(2));
    assert!(eval(&rt, "if \"\" {1}").is_nil());
}

#[test]
fn test_if_binds_in_the_calling_scope() {
    assert_eq!(eval_fresh("if true {x: 5}\nx").as_int(), Some(5));
}

#[test]
fn test_each_over_list_dict_and_string() {
    let rt = runtime();
    let sum = eval(&rt, "sum: 0\neach [1 2 3] n {sum: plus sum n}\nsum");
    assert_eq!(sum.as_int(), Some(6));
    let keys = eval(&rt, "out: \"\"\neach (dict b 2 a 1) k {out: plus out k}\nout");
    assert_eq!(keys.as_str(), Some("ab"));
    let chars = eval(&rt, "n: 0\neach \"abc\" c {n: plus n 1}\nn");
    assert_eq!(chars.as_int(), Some(3));
}

#[test]
fn test_each_stops_on_error() {
    let rt = runtime();
    let value = eval(&rt, "each [1 2 3] n {if (eq n 2) {fail \"two\"}; println n}");
    assert_eq!(message(&value), "two");
    assert_eq!(rt.print_handler().output(), "1\n");
}

#[test]
fn test_and_or_are_lazy() {
    let rt = runtime();
    assert_eq!(eval(&rt, "and false (fail \"x\")").as_bool(), Some(false));
    assert_eq!(eval(&rt, "or true (fail \"x\")").as_bool(), Some(true));
    assert_eq!(eval(&rt, "and 1 \"a\" [0]").as_bool(), Some(true));
    assert!(eval(&rt, "or false (fail \"x\")").is_error());
}

#[test]
fn test_arithmetic() {
    let rt = runtime();
    assert_eq!(eval(&rt, "times 2 3 4").as_int(), Some(24));
    assert_eq!(eval(&rt, "minus 5").as_int(), Some(-5));
    assert_eq!(eval(&rt, "minus 10 3 2").as_int(), Some(5));
    assert_eq!(eval(&rt, "div 7 2").as_int(), Some(3));
    assert_eq!(eval(&rt, "mod 7 3").as_int(), Some(1));
    assert_eq!(eval(&rt, "plus 1.5 2.5").as_float(), Some(4.0));
    assert_eq!(eval(&rt, "plus \"a\" \"b\"").as_str(), Some("ab"));
    assert_eq!(strings(&eval(&rt, "plus [1] [2]")), vec!["1", "2"]);
}

#[test]
fn test_arithmetic_errors() {
    let rt = runtime();
    assert_eq!(message(&eval(&rt, "mod 1 0")), "modulo by zero");
    assert!(message(&eval(&rt, "plus 9223372036854775807 1")).contains("overflow"));
    assert!(eval(&rt, "plus 1 2.0").is_error());
    assert!(eval(&rt, "times \"a\" 2").is_error());
}

#[test]
fn test_comparisons() {
    let rt = runtime();
    assert_eq!(eval(&rt, "lt 1 2").as_bool(), Some(true));
    assert_eq!(eval(&rt, "ge 2 2").as_bool(), Some(true));
    assert_eq!(eval(&rt, "gt \"a\" \"b\"").as_bool(), Some(false));
    assert!(message(&eval(&rt, "lt 1 \"a\"")).starts_with("cannot compare"));
}

#[test]
fn test_structural_equality() {
    let rt = runtime();
    assert_eq!(eval(&rt, "eq [1 [2]] [1 [2]]").as_bool(), Some(true));
    assert_eq!(eval(&rt, "eq (dict a 1) (dict a 1)").as_bool(), Some(true));
    assert_eq!(eval(&rt, "ne 1 2").as_bool(), Some(true));
    assert_eq!(eval(&rt, "eq 1 1.0").as_bool(), Some(false));
    assert_eq!(eval(&rt, "not 0").as_bool(), Some(true));
}

#[test]
fn test_type_and_is() {
    let rt = runtime();
    assert_eq!(eval(&rt, "type 1.5").as_str(), Some("float"));
    assert_eq!(eval(&rt, "type (dict)").as_str(), Some("dictionary"));
    assert_eq!(eval(&rt, "type plus").as_str(), Some("function"));
    assert_eq!(eval(&rt, "is [1] list").as_bool(), Some(true));
    assert_eq!(eval(&rt, "is (fail \"x\") error").as_bool(), Some(true));
    assert!(message(&eval(&rt, "is 1 widget")).contains("unknown type"));
}

#[test]
fn test_help() {
    let rt = runtime();
    let plus = eval(&rt, "help plus");
    assert!(plus.as_str().is_some_and(|text| text.starts_with("plus a b")));
    let all = eval(&rt, "help");
    assert!(all.as_str().is_some_and(|text| text.contains("freeze")));
    assert_eq!(eval(&rt, "help 1").as_str(), Some("integer value"));
}

#[test]
fn test_print_and_println() {
    let rt = runtime();
    eval(&rt, "print \"a\" 1\nprintln [1 \"b\"]\nprintln (dict k \"v\")");
    assert_eq!(rt.print_handler().take_output(), "a 1[1 \"b\"]\n{k: \"v\"}\n");
    assert_eq!(rt.print_handler().output(), "");
}

#[test]
fn test_fail_joins_its_arguments() {
    assert_eq!(eval_fresh("try {fail \"a\" 1} {error}").as_str(), Some("a 1"));
}

#[test]
fn test_try_with_function_handler() {
    let value = eval_fresh("h: (func e {type e})\ntry {fail \"x\"} h");
    assert_eq!(value.as_str(), Some("error"));
}

#[test]
fn test_list_builtins() {
    let rt = runtime();
    assert_eq!(strings(&eval(&rt, "list 1 (plus 1 1)")), vec!["1", "2"]);
    assert_eq!(strings(&eval(&rt, "l: []\npush l 1 2\nl")), vec!["1", "2"]);
    assert_eq!(eval(&rt, "at [1 2 3] 1").as_int(), Some(2));
    assert_eq!(eval(&rt, "len \"héllo\"").as_int(), Some(5));
}

#[test]
fn test_dictionary_builtins() {
    let rt = runtime();
    eval(&rt, "base: (dict b 1 a 2)\nchild: (new base)\nchild.c: 3");
    assert_eq!(strings(&eval(&rt, "keys base")), vec!["a", "b"]);
    assert_eq!(strings(&eval(&rt, "keys child")), vec!["a", "b", "c"]);
    assert_eq!(eval(&rt, "len child").as_int(), Some(1));
    assert_eq!(eval(&rt, "child.a").as_int(), Some(2));
    assert_eq!(eval(&rt, "at child z 5\nchild.z").as_int(), Some(5));
    assert!(eval(&rt, "dict a").is_error());
    assert!(eval(&rt, "new 1").is_error());
}

#[test]
fn test_keys_without_arguments_lists_the_scope() {
    let rt = Runtime::builder()
        .without_core_library()
        .print_handler(buffer_handler())
        .build();
    rt.root().set("b", Value::int(1));
    super::register(rt.root());
    let names = strings(&eval(&rt, "keys"));
    assert!(names.contains(&"b".to_string()));
    assert!(names.contains(&"set".to_string()));
}

#[test]
fn test_freeze_is_deep() {
    let rt = runtime();
    eval(&rt, "l: [[1] (dict)]\nfreeze l");
    assert_eq!(eval(&rt, "frozen? (l 0)").as_bool(), Some(true));
    assert_eq!(eval(&rt, "frozen? (l 1)").as_bool(), Some(true));
    assert!(eval(&rt, "push (l 0) 2").is_error());
    assert_eq!(eval(&rt, "frozen? [1]").as_bool(), Some(false));
}

#[test]
fn test_import() {
    let rt = Runtime::builder()
        .print_handler(buffer_handler())
        .module(FnModule::new("math", |_ctx| {
            Ok(Value::dict_from([("pi", Value::int(3))]))
        }))
        .build();
    assert_eq!(eval(&rt, "m: (import math)\nm.pi").as_int(), Some(3));
    assert_eq!(eval(&rt, "eq (import math) m").as_bool(), Some(true));
    assert_eq!(message(&eval(&rt, "import nope")), "no module named «nope»");
}
