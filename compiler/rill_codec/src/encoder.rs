//! Value graph to snapshot.
//!
//! Stream ids are the values' own identities. Identities installed by the
//! decoder can coincide with ones already handed to unrelated local values;
//! when two different containers, or two leaves with different records,
//! claim one identity, the later one is written under a fresh identity.

use rill_eval::value::{Heap, Identity};
use rill_eval::{ensure_sufficient_stack, Value};
use rustc_hash::FxHashMap;

use crate::{BinaryRecord, CodecError, Event, Snapshot};

/// Encode `value` and everything reachable from it.
///
/// Fails with `NotSerializable` on code values, host functions and
/// objects, `Return` bundles and strings with pending interpolations.
#[tracing::instrument(level = "debug", skip_all)]
pub fn encode(value: &Value) -> Result<Snapshot, CodecError> {
    let mut encoder = Encoder::default();
    encoder.item(value)?;
    tracing::debug!(
        leaves = encoder.snapshot.leaves.len(),
        events = encoder.snapshot.events.len(),
        rekeyed = encoder.rekeyed.len(),
        "encoded snapshot"
    );
    Ok(encoder.snapshot)
}

#[derive(Default)]
struct Encoder {
    snapshot: Snapshot,
    /// Containers already opened, by stream id; later sightings become
    /// references.
    containers: FxHashMap<u64, Value>,
    /// Own identity to the extra stream ids given to values that clashed
    /// on it.
    rekeyed: FxHashMap<u64, Vec<u64>>,
}

/// Whether two container values are one allocation.
fn same_container(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::List(x), Value::List(y)) => Heap::ptr_eq(x, y),
        (Value::Dictionary(x), Value::Dictionary(y)) => Heap::ptr_eq(x, y),
        _ => false,
    }
}

impl Encoder {
    fn emit(&mut self, event: Event) {
        self.snapshot.events.push(event);
    }

    fn item(&mut self, value: &Value) -> Result<(), CodecError> {
        ensure_sufficient_stack(|| match value {
            Value::List(list) => {
                let (id, seen) = self.container_id(list.identity().raw(), value);
                if seen {
                    self.emit(Event::ListRef(id));
                    return Ok(());
                }
                self.emit(Event::OpenList {
                    id,
                    frozen: list.is_frozen(),
                });
                for element in list.snapshot() {
                    self.item(&element)?;
                }
                self.emit(Event::CloseList);
                Ok(())
            }
            Value::Dictionary(dict) => {
                let (id, seen) = self.container_id(dict.identity().raw(), value);
                if seen {
                    self.emit(Event::DictRef(id));
                    return Ok(());
                }
                self.emit(Event::OpenDict {
                    id,
                    frozen: dict.is_frozen(),
                });
                for (key, entry) in dict.entries() {
                    self.emit(Event::DictKey(key));
                    self.item(&entry)?;
                }
                if let Some(parent) = dict.parent() {
                    self.emit(Event::DictParent);
                    self.item(&Value::Dictionary(parent))?;
                }
                self.emit(Event::CloseDict);
                Ok(())
            }
            leaf => self.leaf(leaf),
        })
    }

    /// Stream id for a container and whether it was already written.
    fn container_id(&mut self, own: u64, value: &Value) -> (u64, bool) {
        let Some(existing) = self.containers.get(&own) else {
            self.containers.insert(own, value.clone());
            return (own, false);
        };
        if same_container(existing, value) {
            return (own, true);
        }
        let aliases = self.rekeyed.get(&own).cloned().unwrap_or_default();
        for alias in aliases {
            if self
                .containers
                .get(&alias)
                .is_some_and(|seen| same_container(seen, value))
            {
                return (alias, true);
            }
        }
        let alias = self.alias(own);
        self.containers.insert(alias, value.clone());
        (alias, false)
    }

    /// Leaves sharing an identity and a record are one value; a different
    /// record under a taken identity gets its own stream id.
    fn leaf(&mut self, value: &Value) -> Result<(), CodecError> {
        let own = value.identity().raw();
        let record = BinaryRecord::from_value(value)?.to_bytes()?;
        let candidates = std::iter::once(own)
            .chain(self.rekeyed.get(&own).into_iter().flatten().copied())
            .collect::<Vec<_>>();

        let mut id = None;
        for candidate in candidates {
            match self.snapshot.leaves.get(&candidate) {
                None if candidate == own => {
                    self.snapshot.leaves.insert(own, record.clone());
                    id = Some(own);
                    break;
                }
                Some(stored) if *stored == record => {
                    id = Some(candidate);
                    break;
                }
                _ => {}
            }
        }
        let id = match id {
            Some(id) => id,
            None => {
                let alias = self.alias(own);
                self.snapshot.leaves.insert(alias, record);
                alias
            }
        };
        self.emit(Event::Value(id));
        Ok(())
    }

    fn alias(&mut self, own: u64) -> u64 {
        let alias = Identity::fresh().raw();
        tracing::debug!(identity = own, alias, "identity clash, writing under a fresh id");
        self.rekeyed.entry(own).or_default().push(alias);
        alias
    }
}
