//! Snapshot layout.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CodecError;

/// One step of the structural event stream.
///
/// Identities are raw `Identity` slot numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    OpenList { id: u64, frozen: bool },
    CloseList,
    OpenDict { id: u64, frozen: bool },
    /// Key of the next entry; the entry value follows as one item.
    DictKey(String),
    /// The next item is the dictionary's parent.
    DictParent,
    CloseDict,
    /// A leaf from the snapshot's record table.
    Value(u64),
    ListRef(u64),
    DictRef(u64),
}

/// An encoded value graph.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Leaf identity to bincode-encoded `BinaryRecord`.
    pub leaves: BTreeMap<u64, Vec<u8>>,
    pub events: Vec<Event>,
}

impl Snapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
