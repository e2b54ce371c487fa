//! Mark-and-sweep reclamation of unreachable frames.
//!
//! Roots are frames with live `RunContext` handles plus the frames
//! captured by any extra root values the caller passes in. Marking follows
//! frame parents and fallbacks and every captured context reachable from a
//! frame's bindings, receiver and memoized module contents.

use rustc_hash::FxHashSet;

use super::arena::{ContextId, Frame, FrameArena};
use crate::call::Block;
use crate::value::Value;

struct Marker<'a> {
    arena: &'a FrameArena,
    marked: Vec<bool>,
    pending: Vec<ContextId>,
    seen_containers: FxHashSet<usize>,
}

impl<'a> Marker<'a> {
    fn new(arena: &'a FrameArena) -> Self {
        Marker {
            arena,
            marked: vec![false; arena.slot_count()],
            pending: Vec::new(),
            seen_containers: FxHashSet::default(),
        }
    }

    fn mark_block(&mut self, block: &Block) {
        if let Some(id) = block.captured() {
            self.pending.push(id);
        }
    }

    fn mark_value(&mut self, value: &Value) {
        match value {
            Value::Block(block) => self.mark_block(block),
            Value::Native(native) => {
                if let Some(body) = native.body() {
                    self.mark_block(body);
                }
            }
            Value::String(s) => {
                for interpolation in s.interpolations() {
                    self.mark_block(&interpolation.block);
                }
            }
            Value::List(list) => {
                if self.seen_containers.insert(list.addr()) {
                    for item in list.snapshot() {
                        self.mark_value(&item);
                    }
                }
            }
            Value::Dictionary(dict) => {
                if self.seen_containers.insert(dict.addr()) {
                    for (_, item) in dict.entries() {
                        self.mark_value(&item);
                    }
                    if let Some(parent) = dict.parent() {
                        self.mark_value(&Value::Dictionary(parent));
                    }
                }
            }
            Value::Return(values) => {
                for item in values.iter() {
                    self.mark_value(item);
                }
            }
            _ => {}
        }
    }

    fn mark_frame(&mut self, frame: &Frame) {
        if let Some(parent) = frame.parent {
            self.pending.push(parent);
        }
        if let Some(fallback) = frame.fallback {
            self.pending.push(fallback);
        }
        for value in frame.bindings.values() {
            self.mark_value(value);
        }
        if let Some(this) = &frame.this {
            self.mark_value(this);
        }
        for slot in frame.modules.values() {
            if let Some(content) = slot.cached() {
                self.mark_value(&content);
            }
        }
    }

    fn drain(&mut self) {
        while let Some(id) = self.pending.pop() {
            let index = id.index() as usize;
            if self.marked.get(index).copied().unwrap_or(true) {
                continue;
            }
            let arena = self.arena;
            let Some(frame) = arena.get(id) else {
                continue;
            };
            if let Some(flag) = self.marked.get_mut(index) {
                *flag = true;
            }
            self.mark_frame(frame);
        }
    }
}

impl FrameArena {
    /// Sweep frames unreachable from pinned frames and `roots`.
    ///
    /// Returns the removed frames so the caller can drop them after
    /// releasing the arena lock.
    pub(crate) fn collect(&mut self, roots: &[Value]) -> Vec<Frame> {
        let mut marker = Marker::new(self);
        for index in 0..self.slot_count() {
            if let Some((id, frame)) = self.frame_at(index) {
                if frame.is_pinned() {
                    marker.pending.push(id);
                }
            }
        }
        for root in roots {
            marker.mark_value(root);
        }
        marker.drain();
        let marked = marker.marked;

        let mut released = Vec::new();
        for (index, keep) in marked.into_iter().enumerate() {
            if !keep {
                if let Some(frame) = self.release(index) {
                    released.push(frame);
                }
            }
        }
        released
    }
}
