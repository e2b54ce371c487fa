//! Serialization of Rill value graphs.
//!
//! A value is written as a [`Snapshot`]: a table of leaf records keyed by
//! identity plus an ordered stream of [`Event`]s describing the container
//! structure. Containers seen a second time are written as references,
//! which keeps shared substructure shared and makes cycles finite.
//! Decoding rebuilds every container under its original identity.
//!
//! ```text
//! [1 [2] x]         leaves: #4 -> 1, #5 -> 2, #7 -> x
//!                   events: OpenList #3, Value #4, OpenList #6, Value #5,
//!                           CloseList, Value #7, CloseList
//! ```

mod decoder;
mod encoder;
mod error;
mod event;
mod module;
mod record;

pub use decoder::decode;
pub use encoder::encode;
pub use error::CodecError;
pub use event::{Event, Snapshot};
pub use module::CodecModule;
pub use record::BinaryRecord;

use rill_eval::Value;

/// Encode `value` straight to bytes.
pub fn to_bytes(value: &Value) -> Result<Vec<u8>, CodecError> {
    encode(value)?.to_bytes()
}

/// Decode a value from bytes produced by [`to_bytes`].
pub fn from_bytes(bytes: &[u8]) -> Result<Value, CodecError> {
    decode(&Snapshot::from_bytes(bytes)?)
}

#[cfg(test)]
mod tests;
