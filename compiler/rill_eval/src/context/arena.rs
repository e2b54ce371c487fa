//! Frame storage.
//!
//! Frames live in a slot vector and are addressed by `ContextId`
//! (index plus generation). Frames only point at older frames, so the frame
//! graph is acyclic; lookups still remember visited frames because parent
//! and fallback chains can share ancestors.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::module::ModuleSlot;
use crate::value::Value;

/// Handle to one frame. Stale after its frame has been collected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContextId {
    index: u32,
    generation: u32,
}

impl ContextId {
    pub fn index(self) -> u32 {
        self.index
    }
}

/// One scope frame.
pub(crate) struct Frame {
    pub(crate) bindings: FxHashMap<String, Value>,
    pub(crate) this: Option<Value>,
    pub(crate) parent: Option<ContextId>,
    /// Captured context of a closure, searched after the parent chain.
    pub(crate) fallback: Option<ContextId>,
    pub(crate) modules: FxHashMap<String, Arc<ModuleSlot>>,
    pub(crate) stopped: AtomicBool,
    /// Live `RunContext` handles pointing at this frame.
    pub(crate) handles: AtomicUsize,
}

impl Frame {
    fn new(parent: Option<ContextId>, fallback: Option<ContextId>) -> Self {
        Frame {
            bindings: FxHashMap::default(),
            this: None,
            parent,
            fallback,
            modules: FxHashMap::default(),
            stopped: AtomicBool::new(false),
            handles: AtomicUsize::new(1),
        }
    }

    pub(crate) fn is_pinned(&self) -> bool {
        self.handles.load(Ordering::Acquire) > 0
    }
}

struct Slot {
    generation: u32,
    frame: Option<Frame>,
}

#[derive(Default)]
pub(crate) struct FrameArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl FrameArena {
    /// Allocate a frame holding one handle for its creator.
    pub(crate) fn alloc(
        &mut self,
        parent: Option<ContextId>,
        fallback: Option<ContextId>,
    ) -> ContextId {
        let frame = Frame::new(parent, fallback);
        self.live += 1;
        if let Some(index) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index as usize) {
                slot.frame = Some(frame);
                return ContextId {
                    index,
                    generation: slot.generation,
                };
            }
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            frame: Some(frame),
        });
        ContextId {
            index,
            generation: 0,
        }
    }

    pub(crate) fn get(&self, id: ContextId) -> Option<&Frame> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.frame.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: ContextId) -> Option<&mut Frame> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.frame.as_mut())
    }

    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Visit frames in lookup order (own, parent chain, fallback chain)
    /// until `visit` returns a result.
    pub(crate) fn walk<T>(
        &self,
        start: ContextId,
        mut visit: impl FnMut(&Frame) -> Option<T>,
    ) -> Option<T> {
        let mut stack: SmallVec<[ContextId; 8]> = SmallVec::new();
        stack.push(start);
        let mut seen: FxHashSet<ContextId> = FxHashSet::default();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(frame) = self.get(id) else {
                continue;
            };
            if let Some(found) = visit(frame) {
                return Some(found);
            }
            if let Some(fallback) = frame.fallback {
                stack.push(fallback);
            }
            if let Some(parent) = frame.parent {
                stack.push(parent);
            }
        }
        None
    }

    pub(crate) fn lookup(&self, start: ContextId, key: &str) -> Option<Value> {
        self.walk(start, |frame| frame.bindings.get(key).cloned())
    }

    /// Number of slots, occupied or free.
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn frame_at(&self, index: usize) -> Option<(ContextId, &Frame)> {
        let slot = self.slots.get(index)?;
        let frame = slot.frame.as_ref()?;
        let id = ContextId {
            index: u32::try_from(index).ok()?,
            generation: slot.generation,
        };
        Some((id, frame))
    }

    /// Remove the frame at `index`, bumping the slot generation.
    pub(crate) fn release(&mut self, index: usize) -> Option<Frame> {
        let slot = self.slots.get_mut(index)?;
        let frame = slot.frame.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(u32::try_from(index).ok()?);
        self.live = self.live.saturating_sub(1);
        Some(frame)
    }
}
