use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::call::Block;
use crate::module::Module;
use crate::{silent_handler, Runtime};

fn runtime() -> Runtime {
    Runtime::builder()
        .without_core_library()
        .print_handler(silent_handler())
        .build()
}

fn int(value: Option<Value>) -> Option<i64> {
    value.and_then(|v| v.as_int())
}

#[test]
fn test_sub_context_sees_ancestor_bindings() {
    let rt = runtime();
    rt.root().set("x", Value::int(1));
    let sub = rt.root().create_sub_context();
    let deeper = sub.create_sub_context();
    assert_eq!(int(deeper.get("x")), Some(1));
    assert!(deeper.contains("x"));
    assert!(!deeper.contains_own("x"));
}

#[test]
fn test_set_shadows_instead_of_aliasing() {
    let rt = runtime();
    rt.root().set("x", Value::int(1));
    let sub = rt.root().create_sub_context();
    sub.set("x", Value::int(2));
    assert_eq!(int(sub.get("x")), Some(2));
    assert_eq!(int(rt.root().get("x")), Some(1));
}

#[test]
fn test_remove_only_touches_own_bindings() {
    let rt = runtime();
    rt.root().set("x", Value::int(1));
    let sub = rt.root().create_sub_context();
    assert!(sub.remove("x").is_none());
    assert_eq!(int(sub.get("x")), Some(1));
    assert_eq!(int(rt.root().remove("x")), Some(1));
    assert!(sub.get("x").is_none());
}

#[test]
fn test_keys_are_own_and_ancestor_keys() {
    let rt = runtime();
    rt.root().set("b", Value::nil());
    rt.root().set("a", Value::nil());
    let sub = rt.root().create_sub_context();
    sub.set("c", Value::nil());
    sub.set("a", Value::nil());
    assert_eq!(sub.keys(), vec!["a", "b", "c"]);
    assert_eq!(rt.root().keys(), vec!["a", "b"]);
}

#[test]
fn test_join_prefers_parent_chain_over_captured() {
    let rt = runtime();
    let captured = rt.root().create_sub_context();
    captured.set("x", Value::int(1));
    captured.set("only_captured", Value::int(10));

    let caller = rt.root().create_sub_context();
    caller.set("x", Value::int(2));

    let joined = caller.join(captured.id());
    assert_eq!(int(joined.get("x")), Some(2));
    assert_eq!(int(joined.get("only_captured")), Some(10));
    assert!(caller.get("only_captured").is_none());
}

#[test]
fn test_this_is_rebound_and_restored() {
    let rt = runtime();
    let sub = rt.root().create_sub_context();
    assert!(sub.this().is_none());

    let receiver = Value::dict();
    let previous = rt.root().set_this(Some(receiver.clone()));
    assert!(previous.is_none());
    assert!(sub.this().is_some_and(|this| this.equals(&receiver)));

    let restored = rt.root().set_this(previous);
    assert!(restored.is_some());
    assert!(sub.this().is_none());
}

#[test]
fn test_stop_is_local_to_the_frame() {
    let rt = runtime();
    let sub = rt.root().create_sub_context();
    assert!(!sub.is_stopped());
    sub.stop();
    assert!(sub.is_stopped());
    assert!(!rt.root().is_stopped());
    assert!(!sub.create_sub_context().is_stopped());
}

struct Counter {
    inits: AtomicUsize,
}

impl Module for Counter {
    fn name(&self) -> &str {
        "counter"
    }

    fn content(&self, _ctx: &RunContext) -> crate::EvalResult {
        let n = self.inits.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Value::int(i64::try_from(n).unwrap_or(i64::MAX)))
    }
}

#[test]
fn test_modules_chain_and_memoize() {
    let rt = runtime();
    let counter = Arc::new(Counter {
        inits: AtomicUsize::new(0),
    });
    rt.root().register_module(counter.clone());

    let sub = rt.root().create_sub_context();
    let slot = sub.module("counter");
    assert!(slot.is_some());
    let first = slot.as_ref().map(|s| s.content(&sub));
    let second = slot.as_ref().map(|s| s.content(&sub));
    assert_eq!(first.and_then(Result::ok).and_then(|v| v.as_int()), Some(1));
    assert_eq!(second.and_then(Result::ok).and_then(|v| v.as_int()), Some(1));
    assert_eq!(counter.inits.load(Ordering::SeqCst), 1);
    assert!(sub.module("missing").is_none());
    assert_eq!(sub.module_names(), vec!["counter"]);
}

#[test]
fn test_call_depth_limit() {
    let rt = Runtime::builder()
        .without_core_library()
        .max_call_depth(2)
        .build();
    let one = rt.root().enter_call();
    let two = one.as_ref().ok().map(RunContext::enter_call);
    assert!(matches!(two, Some(Ok(_))));
    let three = two.and_then(Result::ok).map(|ctx| ctx.enter_call());
    let Some(Err(error)) = three else {
        panic!("depth limit not enforced");
    };
    assert!(error.is_fatal());
}

#[test]
fn test_collect_reclaims_dropped_frames() {
    let rt = runtime();
    let before = rt.frame_count();
    {
        let sub = rt.root().create_sub_context();
        let _deeper = sub.create_sub_context();
        assert_eq!(rt.frame_count(), before + 2);
        assert_eq!(rt.collect_frames(&[]), 0);
    }
    assert_eq!(rt.collect_frames(&[]), 2);
    assert_eq!(rt.frame_count(), before);
}

#[test]
fn test_captured_frames_survive_until_unreachable() {
    let rt = runtime();
    let captured = rt.root().create_sub_context();
    captured.set("x", Value::int(7));
    let id = captured.id();
    rt.root().set("f", Value::block(Block::empty().capture(id)));
    drop(captured);

    assert_eq!(rt.collect_frames(&[]), 0);
    assert_eq!(int(rt.root().join(id).get("x")), Some(7));

    rt.root().remove("f");
    // The captured frame and the joined frame from the lookup above.
    assert_eq!(rt.collect_frames(&[]), 2);
    assert!(rt.root().join(id).get("x").is_none());
}

#[test]
fn test_extra_roots_keep_frames_alive() {
    let rt = runtime();
    let captured = rt.root().create_sub_context();
    let closure = Value::block(Block::empty().capture(captured.id()));
    drop(captured);
    assert_eq!(rt.collect_frames(std::slice::from_ref(&closure)), 0);
    assert_eq!(rt.collect_frames(&[]), 1);
}

#[test]
fn test_background_work_defers_collection() {
    let rt = runtime();
    drop(rt.root().create_sub_context());
    let guard = rt.root().background_guard();
    assert_eq!(rt.collect_frames(&[]), 0);
    drop(guard);
    assert_eq!(rt.collect_frames(&[]), 1);
}

#[test]
fn test_reused_slot_gets_new_generation() {
    let rt = runtime();
    let stale = rt.root().create_sub_context().id();
    assert_eq!(rt.collect_frames(&[]), 1);
    let fresh = rt.root().create_sub_context();
    assert_eq!(fresh.id().index(), stale.index());
    assert_ne!(fresh.id(), stale);
}
