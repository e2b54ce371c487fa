//! Payloads of the non-container value variants.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::call::Block;

/// Possibly namespaced name (`a.b.c`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identifier {
    segments: SmallVec<[String; 2]>,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        let mut segments = SmallVec::new();
        segments.push(name.into());
        Identifier { segments }
    }

    /// Build from dot-separated segments. Returns `None` when empty.
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: SmallVec<[String; 2]> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            None
        } else {
            Some(Identifier { segments })
        }
    }

    /// Split a dotted path such as `config.db.port`.
    pub fn parse(path: &str) -> Option<Self> {
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return None;
        }
        Identifier::from_segments(path.split('.'))
    }

    pub fn first(&self) -> &str {
        // Construction guarantees at least one segment.
        self.segments.first().map_or("", String::as_str)
    }

    pub fn rest(&self) -> &[String] {
        self.segments.get(1..).unwrap_or(&[])
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_namespaced(&self) -> bool {
        self.segments.len() > 1
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Interpolated segment of a string literal.
#[derive(Clone, Debug)]
pub struct Interpolation {
    /// Byte offset into the literal text where the result is spliced.
    pub offset: usize,
    pub block: Block,
}

/// String payload: text plus pending interpolations.
#[derive(Clone, Debug)]
pub struct StringValue {
    text: String,
    interpolations: Vec<Interpolation>,
}

impl StringValue {
    pub fn plain(text: impl Into<String>) -> Self {
        StringValue {
            text: text.into(),
            interpolations: Vec::new(),
        }
    }

    /// Interpolations are sorted by offset.
    pub fn interpolated(text: impl Into<String>, mut interpolations: Vec<Interpolation>) -> Self {
        interpolations.sort_by_key(|i| i.offset);
        StringValue {
            text: text.into(),
            interpolations,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn interpolations(&self) -> &[Interpolation] {
        &self.interpolations
    }

    pub fn is_plain(&self) -> bool {
        self.interpolations.is_empty()
    }
}

/// Opaque bytes tagged with the type they were produced from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BinaryValue {
    pub origin: i64,
    pub bytes: Vec<u8>,
}

/// Host object carried through scripts without interpretation.
#[derive(Clone)]
pub struct InternalValue {
    type_name: String,
    payload: Arc<dyn Any + Send + Sync>,
}

impl InternalValue {
    pub fn new<T: Any + Send + Sync>(type_name: impl Into<String>, payload: T) -> Self {
        InternalValue {
            type_name: type_name.into(),
            payload: Arc::new(payload),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    pub(crate) fn same_payload(&self, other: &InternalValue) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for InternalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<internal {}>", self.type_name)
    }
}
