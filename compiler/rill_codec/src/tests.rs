use pretty_assertions::assert_eq;
use rill_eval::value::{Heap, Interpolation};
use rill_eval::{Block, ErrorValue, Value};

use super::*;

fn round_trip(value: &Value) -> Value {
    let bytes = to_bytes(value).unwrap_or_else(|e| panic!("encode failed: {e}"));
    from_bytes(&bytes).unwrap_or_else(|e| panic!("decode failed: {e}"))
}

fn element(list: &Value, index: usize) -> Value {
    list.as_list()
        .and_then(|l| l.get(index))
        .unwrap_or_else(|| panic!("no element {index} in {list:?}"))
}

fn push(list: &Value, item: Value) {
    let pushed = list.as_list().map(|l| l.push(item));
    assert!(matches!(pushed, Some(Ok(()))));
}

fn same_list(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::List(x), Value::List(y)) => Heap::ptr_eq(x, y),
        _ => false,
    }
}

#[test]
fn test_scalars_round_trip() {
    for value in [
        Value::nil(),
        Value::boolean(true),
        Value::int(-42),
        Value::float(2.5),
        Value::string("héllo"),
        Value::identifier("name"),
        Value::binary(6, vec![1, 2, 3]),
    ] {
        let decoded = round_trip(&value);
        assert!(decoded.equals(&value), "{value:?} became {decoded:?}");
        assert_eq!(decoded.identity(), value.identity());
    }
}

#[test]
fn test_error_round_trip() {
    let value = Value::error(ErrorValue::fatal("boom").with_trace("main", 3).ignorable(true));
    let decoded = round_trip(&value);
    assert_eq!(decoded.as_error(), value.as_error());
}

#[test]
fn test_event_shape() {
    let inner = Value::list(vec![Value::int(2)]);
    let one = Value::int(1);
    let outer = Value::list(vec![one.clone(), inner.clone()]);
    let snapshot = encode(&outer).unwrap_or_else(|e| panic!("{e}"));
    let two = element(&inner, 0);
    assert_eq!(
        snapshot.events,
        vec![
            Event::OpenList {
                id: outer.identity().raw(),
                frozen: false
            },
            Event::Value(one.identity().raw()),
            Event::OpenList {
                id: inner.identity().raw(),
                frozen: false
            },
            Event::Value(two.identity().raw()),
            Event::CloseList,
            Event::CloseList,
        ]
    );
    assert_eq!(snapshot.leaves.len(), 2);
}

#[test]
fn test_nested_containers_keep_identity() {
    let inner = Value::dict_from([("k", Value::string("v"))]);
    let outer = Value::list(vec![Value::int(1), inner.clone()]);
    let decoded = round_trip(&outer);
    assert!(decoded.equals(&outer));
    assert_eq!(decoded.identity(), outer.identity());
    assert_eq!(element(&decoded, 1).identity(), inner.identity());
}

#[test]
fn test_shared_list_is_decoded_once() {
    let shared = Value::list(vec![Value::int(7)]);
    let outer = Value::list(vec![shared.clone(), shared]);
    let snapshot = encode(&outer).unwrap_or_else(|e| panic!("{e}"));
    assert!(snapshot
        .events
        .iter()
        .any(|event| matches!(event, Event::ListRef(_))));

    let decoded = decode(&snapshot).unwrap_or_else(|e| panic!("{e}"));
    assert!(same_list(&element(&decoded, 0), &element(&decoded, 1)));
}

#[test]
fn test_shared_leaf_is_stored_once() {
    let text = Value::string("same");
    let outer = Value::list(vec![text.clone(), text]);
    let snapshot = encode(&outer).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(snapshot.leaves.len(), 1);
    let decoded = decode(&snapshot).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(element(&decoded, 0).identity(), element(&decoded, 1).identity());
}

/// A value decoded from a foreign snapshot that reuses `local`'s identity.
fn foreign_leaf(local: &Value, foreign: &Value) -> Value {
    let id = local.identity().raw();
    let record = BinaryRecord::from_value(foreign)
        .and_then(|record| record.to_bytes())
        .unwrap_or_else(|e| panic!("{e}"));
    let snapshot = Snapshot {
        leaves: std::collections::BTreeMap::from([(id, record)]),
        events: vec![Event::Value(id)],
    };
    decode(&snapshot).unwrap_or_else(|e| panic!("{e}"))
}

#[test]
fn test_leaves_clashing_on_identity_stay_apart() {
    let local = Value::string("local");
    let foreign = foreign_leaf(&local, &Value::int(7));
    assert_eq!(foreign.identity(), local.identity());

    let outer = Value::list(vec![local.clone(), foreign.clone(), foreign]);
    let snapshot = encode(&outer).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(snapshot.leaves.len(), 2);
    let decoded = decode(&snapshot).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(decoded.to_string(), outer.to_string());
    assert!(decoded.equals(&outer));
    assert_eq!(element(&decoded, 0).identity(), local.identity());
    assert_eq!(element(&decoded, 1).identity(), element(&decoded, 2).identity());
}

#[test]
fn test_containers_clashing_on_identity_stay_apart() {
    let local = Value::list(vec![Value::int(1)]);
    let id = local.identity().raw();
    let foreign = decode(&Snapshot {
        leaves: std::collections::BTreeMap::new(),
        events: vec![Event::OpenList { id, frozen: false }, Event::CloseList],
    })
    .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(foreign.identity(), local.identity());

    let outer = Value::list(vec![local.clone(), foreign.clone(), foreign]);
    let decoded = round_trip(&outer);
    assert_eq!(decoded.to_string(), "[[1] [] []]");
    assert!(!same_list(&element(&decoded, 0), &element(&decoded, 1)));
    assert!(same_list(&element(&decoded, 1), &element(&decoded, 2)));
    assert_eq!(element(&decoded, 0).identity(), local.identity());
}

#[test]
fn test_nil_decodes_to_the_singleton() {
    let outer = Value::list(vec![Value::nil(), Value::int(1)]);
    let decoded = round_trip(&outer);
    assert!(element(&decoded, 0).is_nil());
    assert_eq!(element(&decoded, 0).identity(), Value::nil().identity());
    assert_eq!(round_trip(&Value::nil()).identity(), Value::nil().identity());
}

#[test]
fn test_self_referencing_list() {
    let list = Value::list(vec![Value::int(1)]);
    push(&list, list.clone());
    let decoded = round_trip(&list);
    assert_eq!(decoded.as_list().map(|l| l.len()), Some(2));
    assert!(same_list(&element(&decoded, 1), &decoded));
    assert_eq!(decoded.to_string(), "[1 [...]]");
}

#[test]
fn test_mutually_referencing_dictionaries() {
    let a = Value::dict();
    let b = Value::dict_from([("a", a.clone())]);
    let inserted = a.as_dict().map(|d| d.insert("b", b.clone()));
    assert!(matches!(inserted, Some(Ok(()))));

    let decoded = round_trip(&a);
    let back = decoded
        .as_dict()
        .and_then(|d| d.get_own("b"))
        .and_then(|b| b.as_dict().and_then(|d| d.get_own("a")));
    assert_eq!(back.map(|v| v.identity()), Some(decoded.identity()));
}

#[test]
fn test_frozen_flags_survive() {
    let outer = Value::list(vec![Value::list(vec![Value::int(1)])]);
    outer.freeze();
    let decoded = round_trip(&outer);
    assert!(decoded.is_frozen());
    assert!(element(&decoded, 0).is_frozen());
}

#[test]
fn test_frozen_cycle_decodes() {
    let list = Value::list(Vec::new());
    push(&list, list.clone());
    list.freeze();
    let decoded = round_trip(&list);
    assert!(decoded.is_frozen());
    assert!(same_list(&element(&decoded, 0), &decoded));
}

#[test]
fn test_dictionary_parent_survives() {
    let base = Value::dict_from([("greeting", Value::string("hi"))]);
    let Some(base_cell) = base.as_dict().cloned() else {
        panic!("not a dictionary");
    };
    let child = Value::dict_with_parent(base_cell);
    let decoded = round_trip(&child);
    let Some(cell) = decoded.as_dict() else {
        panic!("not a dictionary");
    };
    assert_eq!(
        cell.resolve("greeting").and_then(|v| v.as_str().map(str::to_string)),
        Some("hi".to_string())
    );
    assert_eq!(
        cell.parent().map(|p| p.identity()),
        Some(base.identity())
    );
    assert!(!cell.contains_own("greeting"));
}

#[test]
fn test_code_is_not_serializable() {
    let value = Value::list(vec![Value::block(Block::empty())]);
    assert!(matches!(
        encode(&value),
        Err(CodecError::NotSerializable { type_name: "block" })
    ));
}

#[test]
fn test_interpolated_string_is_not_serializable() {
    let value = Value::interpolated(
        "x",
        vec![Interpolation {
            offset: 0,
            block: Block::empty(),
        }],
    );
    assert!(matches!(
        encode(&value),
        Err(CodecError::NotSerializable { type_name: "string" })
    ));
}

fn decode_events(events: Vec<Event>) -> Result<Value, CodecError> {
    decode(&Snapshot {
        leaves: std::collections::BTreeMap::new(),
        events,
    })
}

#[test]
fn test_corrupt_streams_are_rejected() {
    let cases = vec![
        vec![],
        vec![Event::CloseList],
        vec![Event::OpenList { id: 1, frozen: false }],
        vec![Event::Value(99)],
        vec![Event::ListRef(5)],
        vec![Event::OpenDict { id: 1, frozen: false }, Event::CloseList],
        vec![
            Event::OpenDict { id: 1, frozen: false },
            Event::DictKey("k".to_string()),
            Event::CloseDict,
        ],
        vec![
            Event::OpenList { id: 1, frozen: false },
            Event::DictKey("k".to_string()),
        ],
        vec![
            Event::OpenList { id: 1, frozen: false },
            Event::OpenList { id: 1, frozen: false },
        ],
        vec![
            Event::OpenList { id: 1, frozen: false },
            Event::DictRef(1),
        ],
        vec![
            Event::OpenList { id: 1, frozen: false },
            Event::CloseList,
            Event::ListRef(1),
        ],
    ];
    for events in cases {
        let result = decode_events(events.clone());
        assert!(
            matches!(result, Err(CodecError::CorruptStream(_))),
            "{events:?} gave {result:?}"
        );
    }
}

#[test]
fn test_parent_cycle_is_corrupt() {
    let result = decode_events(vec![
        Event::OpenDict { id: 1, frozen: false },
        Event::DictParent,
        Event::DictRef(1),
    ]);
    assert!(matches!(result, Err(CodecError::CorruptStream(_))));
}

#[test]
fn test_truncated_bytes() {
    let bytes = to_bytes(&Value::list(vec![Value::int(1)])).unwrap_or_else(|e| panic!("{e}"));
    let result = from_bytes(&bytes[..bytes.len() / 2]);
    assert!(matches!(result, Err(CodecError::Bincode(_))));
}

#[test]
fn test_codec_errors_become_error_values() {
    let error: ErrorValue = CodecError::corrupt("bad").into();
    assert_eq!(error.message(), "corrupt event stream: bad");
    assert!(!error.is_fatal());
}
