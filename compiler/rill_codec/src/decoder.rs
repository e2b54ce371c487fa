//! Snapshot to value graph.
//!
//! Events drive a stack of containers under construction. A container is
//! registered under its identity as soon as it opens, so references to it
//! from inside itself resolve to the same instance. Frozen flags are
//! applied when the container closes.

use rill_eval::value::{DictCell, Heap, Identity};
use rill_eval::Value;
use rustc_hash::FxHashMap;

use crate::{BinaryRecord, CodecError, Event, Snapshot};

/// Rebuild the value described by `snapshot`.
#[tracing::instrument(level = "debug", skip_all, fields(events = snapshot.events.len()))]
pub fn decode(snapshot: &Snapshot) -> Result<Value, CodecError> {
    let mut decoder = Decoder {
        snapshot,
        containers: FxHashMap::default(),
        leaves: FxHashMap::default(),
        stack: Vec::new(),
        root: None,
    };
    for event in &snapshot.events {
        decoder.step(event)?;
    }
    if !decoder.stack.is_empty() {
        return Err(CodecError::corrupt("stream ends inside a container"));
    }
    decoder
        .root
        .ok_or_else(|| CodecError::corrupt("stream has no value"))
}

/// Where the next item of an open dictionary goes.
enum Slot {
    Empty,
    Key(String),
    Parent,
}

enum Open {
    List {
        value: Value,
        frozen: bool,
    },
    Dict {
        value: Value,
        frozen: bool,
        slot: Slot,
    },
}

struct Decoder<'a> {
    snapshot: &'a Snapshot,
    containers: FxHashMap<u64, Value>,
    leaves: FxHashMap<u64, Value>,
    stack: Vec<Open>,
    root: Option<Value>,
}

impl Decoder<'_> {
    fn step(&mut self, event: &Event) -> Result<(), CodecError> {
        match event {
            Event::OpenList { id, frozen } => {
                let value = self.register(*id, Value::list_with_identity)?;
                self.stack.push(Open::List {
                    value,
                    frozen: *frozen,
                });
                Ok(())
            }
            Event::OpenDict { id, frozen } => {
                let value = self.register(*id, Value::dict_with_identity)?;
                self.stack.push(Open::Dict {
                    value,
                    frozen: *frozen,
                    slot: Slot::Empty,
                });
                Ok(())
            }
            Event::CloseList => match self.stack.pop() {
                Some(Open::List { value, frozen }) => {
                    if let Some(list) = value.as_list().filter(|_| frozen) {
                        list.mark_frozen();
                    }
                    self.place(value)
                }
                _ => Err(CodecError::corrupt("CloseList without an open list")),
            },
            Event::CloseDict => match self.stack.pop() {
                Some(Open::Dict {
                    value,
                    frozen,
                    slot: Slot::Empty,
                }) => {
                    if let Some(dict) = value.as_dict().filter(|_| frozen) {
                        dict.mark_frozen();
                    }
                    self.place(value)
                }
                Some(Open::Dict { .. }) => {
                    Err(CodecError::corrupt("dictionary closed before its entry"))
                }
                _ => Err(CodecError::corrupt("CloseDict without an open dictionary")),
            },
            Event::DictKey(key) => self.fill_slot(Slot::Key(key.clone())),
            Event::DictParent => self.fill_slot(Slot::Parent),
            Event::Value(id) => {
                let value = self.leaf(*id)?;
                self.place(value)
            }
            Event::ListRef(id) => {
                let value = self.reference(*id)?;
                if value.as_list().is_none() {
                    return Err(CodecError::corrupt(format!("#{id} is not a list")));
                }
                self.place(value)
            }
            Event::DictRef(id) => {
                let value = self.reference(*id)?;
                if value.as_dict().is_none() {
                    return Err(CodecError::corrupt(format!("#{id} is not a dictionary")));
                }
                self.place(value)
            }
        }
    }

    fn register(&mut self, id: u64, make: fn(Identity) -> Value) -> Result<Value, CodecError> {
        if self.containers.contains_key(&id) {
            return Err(CodecError::corrupt(format!("container #{id} opened twice")));
        }
        let value = make(Identity::from_raw(id));
        self.containers.insert(id, value.clone());
        Ok(value)
    }

    fn reference(&self, id: u64) -> Result<Value, CodecError> {
        self.containers
            .get(&id)
            .cloned()
            .ok_or_else(|| CodecError::corrupt(format!("reference to unknown container #{id}")))
    }

    /// Leaf value for `id`, decoded once and shared by every use.
    fn leaf(&mut self, id: u64) -> Result<Value, CodecError> {
        if let Some(value) = self.leaves.get(&id) {
            return Ok(value.clone());
        }
        let bytes = self
            .snapshot
            .leaves
            .get(&id)
            .ok_or_else(|| CodecError::corrupt(format!("missing leaf record #{id}")))?;
        let value = BinaryRecord::from_bytes(bytes)?.to_value()?;
        // Nil stays the process-wide singleton.
        let value = if value.is_nil() {
            Value::nil()
        } else {
            value.with_identity(Identity::from_raw(id))
        };
        self.leaves.insert(id, value.clone());
        Ok(value)
    }

    fn fill_slot(&mut self, next: Slot) -> Result<(), CodecError> {
        match self.stack.last_mut() {
            Some(Open::Dict { slot, .. }) if matches!(slot, Slot::Empty) => {
                *slot = next;
                Ok(())
            }
            Some(Open::Dict { .. }) => Err(CodecError::corrupt("dictionary entry without a value")),
            _ => Err(CodecError::corrupt("dictionary event outside a dictionary")),
        }
    }

    /// Put a finished item into the innermost open container, or make it
    /// the root.
    fn place(&mut self, item: Value) -> Result<(), CodecError> {
        match self.stack.last_mut() {
            None if self.root.is_some() => Err(CodecError::corrupt("more than one root value")),
            None => {
                self.root = Some(item);
                Ok(())
            }
            Some(Open::List { value, .. }) => {
                let Some(list) = value.as_list() else {
                    return Err(CodecError::corrupt("list frame holds a non-list"));
                };
                list.push(item).map_err(|e| CodecError::corrupt(e.message()))
            }
            Some(Open::Dict { value, slot, .. }) => {
                let Some(dict) = value.as_dict() else {
                    return Err(CodecError::corrupt("dictionary frame holds a non-dictionary"));
                };
                match std::mem::replace(slot, Slot::Empty) {
                    Slot::Key(key) => dict
                        .insert(key, item)
                        .map_err(|e| CodecError::corrupt(e.message())),
                    Slot::Parent => {
                        let Value::Dictionary(parent) = item else {
                            return Err(CodecError::corrupt("dictionary parent is not a dictionary"));
                        };
                        set_parent(dict, parent)
                    }
                    Slot::Empty => Err(CodecError::corrupt("dictionary value without a key")),
                }
            }
        }
    }
}

fn set_parent(dict: &Heap<DictCell>, parent: Heap<DictCell>) -> Result<(), CodecError> {
    DictCell::set_parent(dict, Some(parent)).map_err(|e| CodecError::corrupt(e.message()))
}
