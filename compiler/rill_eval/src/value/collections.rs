//! Mutable, freezable containers.
//!
//! Both containers guard their contents with a `parking_lot::RwLock` and
//! carry a frozen flag. Readers take snapshots instead of holding a guard
//! while recursing, so self-referencing structures never re-enter a lock.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{ErrorValue, Heap, Value};
use crate::errors::{frozen_container, prototype_cycle};

/// Ordered, growable sequence of values.
pub struct ListCell {
    items: RwLock<Vec<Value>>,
    frozen: AtomicBool,
}

impl ListCell {
    pub(crate) fn new(items: Vec<Value>) -> Self {
        ListCell {
            items: RwLock::new(items),
            frozen: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.read().get(index).cloned()
    }

    /// Copy of the current elements.
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    pub fn push(&self, value: Value) -> Result<(), ErrorValue> {
        if self.is_frozen() {
            return Err(frozen_container("list"));
        }
        self.items.write().push(value);
        Ok(())
    }

    pub fn set(&self, index: usize, value: Value) -> Result<(), ErrorValue> {
        if self.is_frozen() {
            return Err(frozen_container("list"));
        }
        let mut items = self.items.write();
        let len = items.len();
        match items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(crate::errors::index_out_of_bounds(index, len)),
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Freeze this list alone, returning whether it was already frozen.
    /// Elements are left as they are; `Value::freeze` is the deep form.
    pub fn mark_frozen(&self) -> bool {
        self.frozen.swap(true, Ordering::AcqRel)
    }
}

impl std::fmt::Debug for ListCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ListCell(len={}, frozen={})", self.len(), self.is_frozen())
    }
}

/// String-keyed mapping with an optional prototype parent.
pub struct DictCell {
    entries: RwLock<FxHashMap<String, Value>>,
    parent: RwLock<Option<Heap<DictCell>>>,
    frozen: AtomicBool,
}

impl DictCell {
    pub(crate) fn new(parent: Option<Heap<DictCell>>) -> Self {
        DictCell {
            entries: RwLock::new(FxHashMap::default()),
            parent: RwLock::new(parent),
            frozen: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Own entry only, ignoring the parent chain.
    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    pub fn contains_own(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Look up `key` here, then along the parent chain.
    pub fn resolve(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.get_own(key) {
            return Some(value);
        }
        let mut next = self.parent();
        while let Some(dict) = next {
            if let Some(value) = dict.get_own(key) {
                return Some(value);
            }
            next = dict.parent();
        }
        None
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) -> Result<(), ErrorValue> {
        if self.is_frozen() {
            return Err(frozen_container("dictionary"));
        }
        self.entries.write().insert(key.into(), value);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<Option<Value>, ErrorValue> {
        if self.is_frozen() {
            return Err(frozen_container("dictionary"));
        }
        Ok(self.entries.write().remove(key))
    }

    /// Own and inherited keys, sorted and deduplicated.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        let mut next = self.parent();
        while let Some(dict) = next {
            keys.extend(dict.entries.read().keys().cloned());
            next = dict.parent();
        }
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Own entries sorted by key.
    pub fn entries(&self) -> Vec<(String, Value)> {
        let mut entries: Vec<(String, Value)> = self
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn parent(&self) -> Option<Heap<DictCell>> {
        self.parent.read().clone()
    }

    /// Install a prototype parent. Chains that would loop back are rejected.
    pub fn set_parent(
        this: &Heap<DictCell>,
        parent: Option<Heap<DictCell>>,
    ) -> Result<(), ErrorValue> {
        if this.is_frozen() {
            return Err(frozen_container("dictionary"));
        }
        let mut next = parent.clone();
        while let Some(dict) = next {
            if Heap::ptr_eq(&dict, this) {
                return Err(prototype_cycle());
            }
            next = dict.parent();
        }
        *this.parent.write() = parent;
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Freeze this dictionary alone; see `ListCell::mark_frozen`.
    pub fn mark_frozen(&self) -> bool {
        self.frozen.swap(true, Ordering::AcqRel)
    }
}

impl std::fmt::Debug for DictCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DictCell(len={}, frozen={})", self.len(), self.is_frozen())
    }
}
