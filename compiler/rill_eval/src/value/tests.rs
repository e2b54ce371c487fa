use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn ints(values: &[i64]) -> Value {
    Value::list(values.iter().copied().map(Value::int).collect())
}

fn push(list: &Value, item: Value) {
    let Some(cell) = list.as_list() else {
        panic!("not a list: {list:?}");
    };
    assert!(cell.push(item).is_ok());
}

fn dict_cell(value: &Value) -> &Heap<DictCell> {
    let Some(cell) = value.as_dict() else {
        panic!("not a dictionary: {value:?}");
    };
    cell
}

#[test]
fn test_nil_is_a_singleton() {
    assert_eq!(Value::nil().identity(), Value::nil().identity());
    assert!(Value::nil().is_nil());
}

#[test]
fn test_identity_is_lazy_and_stable() {
    let list = ints(&[1, 2]);
    let copy = list.clone();
    assert_eq!(list.identity(), copy.identity());
    assert_ne!(list.identity(), ints(&[1, 2]).identity());
}

#[test]
fn test_type_tag_codes_are_stable() {
    assert_eq!(TypeTag::Nil.code(), 0);
    assert_eq!(TypeTag::Dictionary.code(), 7);
    assert_eq!(TypeTag::Internal.code(), 14);
    for tag in TypeTag::ALL {
        assert_eq!(TypeTag::from_code(tag.code()), Some(tag));
        assert_eq!(TypeTag::from_name(tag.name()), Some(tag));
    }
    assert_eq!(TypeTag::from_code(15), None);
    assert_eq!(TypeTag::from_code(-1), None);
    assert!(TypeTag::Dictionary.is_serializable());
    assert!(!TypeTag::Block.is_serializable());
}

#[test]
fn test_display_forms() {
    assert_eq!(Value::int(42).to_string(), "42");
    assert_eq!(Value::float(2.0).to_string(), "2.0");
    assert_eq!(Value::string("raw").to_string(), "raw");
    assert_eq!(
        Value::list(vec![Value::int(1), Value::string("a"), Value::boolean(true)]).to_string(),
        "[1 \"a\" true]"
    );
    let dict = Value::dict_from([("b", Value::int(2)), ("a", Value::int(1))]);
    assert_eq!(dict.to_string(), "{a: 1, b: 2}");
    assert_eq!(Value::returns(vec![Value::int(3), Value::int(4)]).to_string(), "3 4");
    assert_eq!(Value::block(crate::call::Block::empty()).to_string(), "{...}");
    assert_eq!(Value::identifier("a.b").to_string(), "a.b");
    assert_eq!(Value::error_msg("boom").to_string(), "error(boom)");
}

#[test]
fn test_display_of_cyclic_list_terminates() {
    let list = ints(&[1]);
    push(&list, list.clone());
    assert_eq!(list.to_string(), "[1 [...]]");
}

#[test]
fn test_equality_is_structural() {
    assert!(ints(&[1, 2, 3]).equals(&ints(&[1, 2, 3])));
    assert!(!ints(&[1, 2]).equals(&ints(&[1, 2, 3])));
    assert!(Value::string("x").equals(&Value::string("x")));
    let a = Value::dict_from([("k", ints(&[1]))]);
    let b = Value::dict_from([("k", ints(&[1]))]);
    assert!(a.equals(&b));
}

#[test]
fn test_equality_across_types_is_false() {
    assert!(!Value::int(1).equals(&Value::float(1.0)));
    assert!(!Value::string("1").equals(&Value::int(1)));
    assert!(!Value::nil().equals(&Value::boolean(false)));
}

#[test]
fn test_equality_of_cyclic_lists_terminates() {
    let a = ints(&[1]);
    let b = ints(&[1]);
    push(&a, a.clone());
    push(&b, b.clone());
    assert!(a.equals(&b));
}

#[test]
fn test_compare_same_type() {
    assert_eq!(Value::int(1).compare(&Value::int(2)), Ok(std::cmp::Ordering::Less));
    assert_eq!(
        Value::string("b").compare(&Value::string("a")),
        Ok(std::cmp::Ordering::Greater)
    );
}

#[test]
fn test_compare_across_types_is_an_error() {
    let err = Value::int(1).compare(&Value::string("1"));
    assert_eq!(
        err.map_err(|e| e.message().to_string()),
        Err("cannot compare integer with string".to_string())
    );
}

#[test]
fn test_checked_integer_arithmetic() {
    assert_eq!(Value::int(2).add(&Value::int(3)).ok().and_then(|v| v.as_int()), Some(5));
    let overflow = Value::int(i64::MAX).add(&Value::int(1));
    assert!(overflow.is_err());
    let min_div = Value::int(i64::MIN).div(&Value::int(-1));
    assert!(min_div.is_err());
}

#[test]
fn test_division_by_zero_is_an_error() {
    let err = Value::int(5).div(&Value::int(0)).err();
    assert_eq!(err.map(|e| e.message().to_string()), Some("division by zero".into()));
    let err = Value::int(5).rem(&Value::int(0)).err();
    assert_eq!(err.map(|e| e.message().to_string()), Some("modulo by zero".into()));
    assert!(Value::float(1.0).div(&Value::float(0.0)).is_err());
}

#[test]
fn test_non_finite_float_is_an_error() {
    assert!(Value::float(f64::MAX).mul(&Value::float(2.0)).is_err());
}

#[test]
fn test_mixed_arithmetic_is_an_error() {
    assert!(Value::int(1).add(&Value::float(1.0)).is_err());
    assert!(Value::string("a").sub(&Value::string("b")).is_err());
}

#[test]
fn test_concatenation() {
    let joined = Value::string("ab").add(&Value::string("cd")).ok();
    assert_eq!(joined.map(|v| v.to_string()), Some("abcd".into()));
    let joined = ints(&[1]).add(&ints(&[2, 3])).ok();
    assert!(joined.is_some_and(|v| v.equals(&ints(&[1, 2, 3]))));
}

#[test]
fn test_truthiness() {
    for falsy in [
        Value::boolean(false),
        Value::nil(),
        Value::int(0),
        Value::string(""),
        Value::list(Vec::new()),
    ] {
        assert!(!falsy.is_truthy(), "{falsy:?} should be false");
    }
    for truthy in [Value::int(-1), Value::string("0"), ints(&[0]), Value::dict()] {
        assert!(truthy.is_truthy(), "{truthy:?} should be true");
    }
}

#[test]
fn test_frozen_list_rejects_push_and_is_unchanged() {
    let list = ints(&[1, 2]);
    list.freeze();
    let cell = list.as_list().map(|l| l.push(Value::int(3)));
    assert!(matches!(cell, Some(Err(_))));
    assert!(list.equals(&ints(&[1, 2])));
}

#[test]
fn test_freeze_is_deep() {
    let inner = ints(&[1]);
    let dict = Value::dict_from([("inner", inner.clone())]);
    let outer = Value::list(vec![dict.clone()]);
    outer.freeze();
    assert!(dict.is_frozen());
    assert!(inner.is_frozen());
    assert!(dict.as_dict().is_some_and(|d| d.insert("x", Value::nil()).is_err()));
}

#[test]
fn test_freeze_terminates_on_cycles() {
    let list = ints(&[1]);
    push(&list, list.clone());
    list.freeze();
    assert!(list.is_frozen());
}

#[test]
fn test_freeze_leaves_parent_untouched() {
    let parent = Value::dict();
    let child = Value::dict_with_parent(dict_cell(&parent).clone());
    child.freeze();
    assert!(child.is_frozen());
    assert!(!parent.is_frozen());

    // Inherited keys follow the still-mutable prototype.
    assert!(dict_cell(&parent).insert("late", Value::int(1)).is_ok());
    assert_eq!(
        dict_cell(&child).resolve("late").and_then(|v| v.as_int()),
        Some(1)
    );
    assert!(dict_cell(&child).insert("own", Value::nil()).is_err());
}

#[test]
fn test_dictionary_prototype_lookup() {
    let base = Value::dict_from([("greet", Value::string("hi")), ("name", Value::string("base"))]);
    let child = Value::dict_with_parent(dict_cell(&base).clone());
    let child_cell = dict_cell(&child);
    assert!(child_cell.insert("name", Value::string("child")).is_ok());

    assert_eq!(child_cell.resolve("greet").map(|v| v.to_string()), Some("hi".into()));
    assert_eq!(child_cell.resolve("name").map(|v| v.to_string()), Some("child".into()));
    assert!(child_cell.get_own("greet").is_none());
    assert_eq!(child_cell.keys(), vec!["greet".to_string(), "name".to_string()]);
}

#[test]
fn test_parent_cycle_is_rejected() {
    let a = Value::dict();
    let b = Value::dict_with_parent(dict_cell(&a).clone());
    let (a_cell, b_cell) = (dict_cell(&a), dict_cell(&b));
    assert!(DictCell::set_parent(a_cell, Some(b_cell.clone())).is_err());
    assert!(DictCell::set_parent(a_cell, Some(a_cell.clone())).is_err());
    assert!(DictCell::set_parent(b_cell, None).is_ok());
}

#[test]
fn test_with_identity_copies_payload() {
    let id = Identity::from_raw(ints(&[]).identity().raw() + 500);
    let list = ints(&[7]);
    list.freeze();
    let copy = list.with_identity(id);
    assert_eq!(copy.identity(), id);
    assert!(copy.equals(&list));
    assert!(copy.is_frozen());
}

#[test]
fn test_identifier_paths() {
    let ident = Identifier::parse("a.b.c");
    assert_eq!(ident.as_ref().map(ToString::to_string), Some("a.b.c".into()));
    assert_eq!(ident.as_ref().map(|i| i.first().to_string()), Some("a".into()));
    assert_eq!(ident.as_ref().map(|i| i.rest().len()), Some(2));
    assert!(Identifier::parse("a..b").is_none());
    assert!(Identifier::parse("").is_none());
}

#[test]
fn test_help_and_runnable() {
    assert_eq!(Value::int(1).help(), "integer value");
    assert!(Value::list(Vec::new()).is_runnable());
    assert!(!Value::int(1).is_runnable());
}

proptest! {
    #[test]
    fn prop_integer_ordering_matches_i64(a: i64, b: i64) {
        prop_assert_eq!(Value::int(a).compare(&Value::int(b)), Ok(a.cmp(&b)));
    }

    #[test]
    fn prop_ordering_is_antisymmetric(a in "[a-z]{0,6}", b in "[a-z]{0,6}") {
        let ab = Value::string(a.clone()).compare(&Value::string(b.clone()));
        let ba = Value::string(b).compare(&Value::string(a));
        prop_assert_eq!(ab.map(std::cmp::Ordering::reverse), ba);
    }

    #[test]
    fn prop_checked_add_matches_i64(a: i64, b: i64) {
        let result = Value::int(a).add(&Value::int(b)).ok().and_then(|v| v.as_int());
        prop_assert_eq!(result, a.checked_add(b));
    }
}
