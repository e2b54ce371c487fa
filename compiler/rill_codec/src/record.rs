//! Self-contained leaf records.
//!
//! Every non-container value in a snapshot is stored once as a
//! `BinaryRecord`: the stable type tag code, the type name, and a bincode
//! payload whose layout depends on the tag.

use rill_eval::value::{Identifier, TypeTag};
use rill_eval::{ErrorValue, Value};
use serde::{Deserialize, Serialize};

use crate::CodecError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryRecord {
    pub type_tag: i64,
    /// Name matching `type_tag`; checked when reading.
    pub type_name: String,
    pub payload: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct ErrorPayload {
    fatal: bool,
    message: String,
    trace: Option<(String, u32)>,
    ignorable: bool,
}

impl BinaryRecord {
    /// Record for a leaf value.
    pub fn from_value(value: &Value) -> Result<Self, CodecError> {
        let tag = value.type_tag();
        let payload = match value {
            Value::Nil(_) => Vec::new(),
            Value::Boolean(b) => bincode::serialize(&**b)?,
            Value::Integer(n) => bincode::serialize(&**n)?,
            Value::Float(f) => bincode::serialize(&**f)?,
            Value::String(s) if s.is_plain() => bincode::serialize(s.text())?,
            Value::Identifier(ident) => bincode::serialize(ident.segments())?,
            Value::Error(error) => bincode::serialize(&ErrorPayload {
                fatal: error.is_fatal(),
                message: error.message().to_string(),
                trace: error.trace().map(|t| (t.script.clone(), t.line)),
                ignorable: error.is_ignorable(),
            })?,
            Value::Binary(binary) => bincode::serialize(&(binary.origin, &binary.bytes))?,
            Value::List(_) | Value::Dictionary(_) => {
                return Err(CodecError::corrupt("containers are not leaf records"))
            }
            _ => {
                return Err(CodecError::NotSerializable {
                    type_name: tag.name(),
                })
            }
        };
        Ok(BinaryRecord {
            type_tag: tag.code(),
            type_name: tag.name().to_string(),
            payload,
        })
    }

    /// Rebuild the leaf value. The result carries a fresh identity.
    pub fn to_value(&self) -> Result<Value, CodecError> {
        let tag = TypeTag::from_code(self.type_tag)
            .ok_or_else(|| CodecError::corrupt(format!("unknown type tag {}", self.type_tag)))?;
        if !self.type_name.is_empty() && self.type_name != tag.name() {
            return Err(CodecError::corrupt(format!(
                "type name «{}» does not match tag {}",
                self.type_name, self.type_tag
            )));
        }
        let payload = self.payload.as_slice();
        Ok(match tag {
            TypeTag::Nil => Value::nil(),
            TypeTag::Boolean => Value::boolean(bincode::deserialize(payload)?),
            TypeTag::Integer => Value::int(bincode::deserialize(payload)?),
            TypeTag::Float => Value::float(bincode::deserialize(payload)?),
            TypeTag::String => Value::string(bincode::deserialize::<String>(payload)?),
            TypeTag::Identifier => {
                let segments: Vec<String> = bincode::deserialize(payload)?;
                let ident = Identifier::from_segments(segments)
                    .ok_or_else(|| CodecError::corrupt("identifier without segments"))?;
                Value::path(ident)
            }
            TypeTag::Error => {
                let decoded: ErrorPayload = bincode::deserialize(payload)?;
                let mut error = if decoded.fatal {
                    ErrorValue::fatal(decoded.message)
                } else {
                    ErrorValue::new(decoded.message)
                };
                if let Some((script, line)) = decoded.trace {
                    error = error.with_trace(script, line);
                }
                Value::error(error.ignorable(decoded.ignorable))
            }
            TypeTag::Binary => {
                let (origin, bytes): (i64, Vec<u8>) = bincode::deserialize(payload)?;
                Value::binary(origin, bytes)
            }
            TypeTag::List | TypeTag::Dictionary => {
                return Err(CodecError::corrupt("containers are not leaf records"))
            }
            other => {
                return Err(CodecError::NotSerializable {
                    type_name: other.name(),
                })
            }
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
