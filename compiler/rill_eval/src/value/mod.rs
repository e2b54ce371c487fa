//! Runtime values.
//!
//! Every variant is backed by a `Heap` cell so each value carries a stable
//! identity. Values are created through the factory methods here; the
//! `Heap` constructor is crate-private.
//!
//! Containers are mutable until frozen. Freezing is deep and idempotent, and
//! traversals (display, equality, freezing) remember the containers they
//! have entered so cyclic structures terminate.

mod collections;
mod error_value;
mod heap;
mod identity;
mod ops;
mod scalars;
mod type_tag;

use std::fmt;
use std::sync::OnceLock;

pub use collections::{DictCell, ListCell};
pub use error_value::{ErrorKind, ErrorValue, TracePoint};
pub use heap::Heap;
pub use identity::Identity;
pub use scalars::{BinaryValue, Identifier, InternalValue, Interpolation, StringValue};
pub use ops::ArithOp;
pub use type_tag::TypeTag;

use crate::call::{Block, Call, NativeFunction};

/// Result of evaluating a native or engine operation.
///
/// `Err` carries an error destined to become a `Value::Error`; the engine
/// performs that conversion at the call boundary.
pub type EvalResult = Result<Value, ErrorValue>;

/// A script value.
#[derive(Clone)]
pub enum Value {
    Nil(Heap<()>),
    Boolean(Heap<bool>),
    Integer(Heap<i64>),
    Float(Heap<f64>),
    String(Heap<StringValue>),
    Identifier(Heap<Identifier>),
    List(Heap<ListCell>),
    Dictionary(Heap<DictCell>),
    Block(Heap<Block>),
    Call(Heap<Call>),
    Native(Heap<NativeFunction>),
    Error(Heap<ErrorValue>),
    /// Multiple results of a single call, expanded when piped.
    Return(Heap<Vec<Value>>),
    Binary(Heap<BinaryValue>),
    Internal(Heap<InternalValue>),
}

static NIL: OnceLock<Value> = OnceLock::new();

// Factory methods
impl Value {
    /// The shared nil value.
    pub fn nil() -> Value {
        NIL.get_or_init(|| Value::Nil(Heap::new(()))).clone()
    }

    pub fn boolean(b: bool) -> Value {
        Value::Boolean(Heap::new(b))
    }

    pub fn int(n: i64) -> Value {
        Value::Integer(Heap::new(n))
    }

    pub fn float(f: f64) -> Value {
        Value::Float(Heap::new(f))
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Heap::new(StringValue::plain(s)))
    }

    pub fn interpolated(text: impl Into<String>, interpolations: Vec<Interpolation>) -> Value {
        Value::String(Heap::new(StringValue::interpolated(text, interpolations)))
    }

    pub fn identifier(name: impl Into<String>) -> Value {
        Value::Identifier(Heap::new(Identifier::new(name)))
    }

    pub fn path(identifier: Identifier) -> Value {
        Value::Identifier(Heap::new(identifier))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Heap::new(ListCell::new(items)))
    }

    pub fn dict() -> Value {
        Value::Dictionary(Heap::new(DictCell::new(None)))
    }

    /// Dictionary whose lookups fall back to `parent`.
    pub fn dict_with_parent(parent: Heap<DictCell>) -> Value {
        Value::Dictionary(Heap::new(DictCell::new(Some(parent))))
    }

    pub fn dict_from<I, K>(entries: I) -> Value
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let cell = DictCell::new(None);
        for (key, value) in entries {
            // A fresh dictionary is never frozen.
            let _ = cell.insert(key, value);
        }
        Value::Dictionary(Heap::new(cell))
    }

    pub fn block(block: Block) -> Value {
        Value::Block(Heap::new(block))
    }

    pub fn call(call: Call) -> Value {
        Value::Call(Heap::new(call))
    }

    pub fn native(function: NativeFunction) -> Value {
        Value::Native(Heap::new(function))
    }

    pub fn error(error: ErrorValue) -> Value {
        Value::Error(Heap::new(error))
    }

    /// Shorthand for a plain runtime error value.
    pub fn error_msg(message: impl Into<String>) -> Value {
        Value::error(ErrorValue::new(message))
    }

    pub fn returns(values: Vec<Value>) -> Value {
        Value::Return(Heap::new(values))
    }

    pub fn binary(origin: i64, bytes: Vec<u8>) -> Value {
        Value::Binary(Heap::new(BinaryValue { origin, bytes }))
    }

    pub fn internal(internal: InternalValue) -> Value {
        Value::Internal(Heap::new(internal))
    }

    /// Empty list carrying a fixed identity.
    pub fn list_with_identity(identity: Identity) -> Value {
        Value::List(Heap::with_identity(ListCell::new(Vec::new()), identity))
    }

    /// Empty dictionary carrying a fixed identity.
    pub fn dict_with_identity(identity: Identity) -> Value {
        Value::Dictionary(Heap::with_identity(DictCell::new(None), identity))
    }

    /// Copy of this value in a fresh cell carrying `identity`.
    ///
    /// Containers are copied shallowly: elements are shared with the
    /// original, the frozen flag and the dictionary parent carry over.
    #[must_use]
    pub fn with_identity(&self, identity: Identity) -> Value {
        match self {
            Value::Nil(_) => Value::Nil(Heap::with_identity((), identity)),
            Value::Boolean(b) => Value::Boolean(Heap::with_identity(**b, identity)),
            Value::Integer(n) => Value::Integer(Heap::with_identity(**n, identity)),
            Value::Float(f) => Value::Float(Heap::with_identity(**f, identity)),
            Value::String(s) => Value::String(Heap::with_identity((**s).clone(), identity)),
            Value::Identifier(i) => {
                Value::Identifier(Heap::with_identity((**i).clone(), identity))
            }
            Value::List(l) => {
                let cell = ListCell::new(l.snapshot());
                if l.is_frozen() {
                    cell.mark_frozen();
                }
                Value::List(Heap::with_identity(cell, identity))
            }
            Value::Dictionary(d) => {
                let cell = DictCell::new(d.parent());
                for (key, value) in d.entries() {
                    let _ = cell.insert(key, value);
                }
                if d.is_frozen() {
                    cell.mark_frozen();
                }
                Value::Dictionary(Heap::with_identity(cell, identity))
            }
            Value::Block(b) => Value::Block(Heap::with_identity((**b).clone(), identity)),
            Value::Call(c) => Value::Call(Heap::with_identity((**c).clone(), identity)),
            Value::Native(n) => Value::Native(Heap::with_identity((**n).clone(), identity)),
            Value::Error(e) => Value::Error(Heap::with_identity((**e).clone(), identity)),
            Value::Return(r) => Value::Return(Heap::with_identity((**r).clone(), identity)),
            Value::Binary(b) => Value::Binary(Heap::with_identity((**b).clone(), identity)),
            Value::Internal(i) => {
                Value::Internal(Heap::with_identity((**i).clone(), identity))
            }
        }
    }
}

// Introspection
impl Value {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Nil(_) => TypeTag::Nil,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Integer(_) => TypeTag::Integer,
            Value::Float(_) => TypeTag::Float,
            Value::String(_) => TypeTag::String,
            Value::Identifier(_) => TypeTag::Identifier,
            Value::List(_) => TypeTag::List,
            Value::Dictionary(_) => TypeTag::Dictionary,
            Value::Block(_) => TypeTag::Block,
            Value::Call(_) => TypeTag::Call,
            Value::Native(_) => TypeTag::NativeFunction,
            Value::Error(_) => TypeTag::Error,
            Value::Return(_) => TypeTag::Return,
            Value::Binary(_) => TypeTag::Binary,
            Value::Internal(_) => TypeTag::Internal,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_tag().name()
    }

    pub fn is_type(&self, tag: TypeTag) -> bool {
        self.type_tag() == tag
    }

    /// Stable identity of this value, assigned on first request.
    pub fn identity(&self) -> Identity {
        match self {
            Value::Nil(h) => h.identity(),
            Value::Boolean(h) => h.identity(),
            Value::Integer(h) => h.identity(),
            Value::Float(h) => h.identity(),
            Value::String(h) => h.identity(),
            Value::Identifier(h) => h.identity(),
            Value::List(h) => h.identity(),
            Value::Dictionary(h) => h.identity(),
            Value::Block(h) => h.identity(),
            Value::Call(h) => h.identity(),
            Value::Native(h) => h.identity(),
            Value::Error(h) => h.identity(),
            Value::Return(h) => h.identity(),
            Value::Binary(h) => h.identity(),
            Value::Internal(h) => h.identity(),
        }
    }

    /// Whether the engine can invoke this value when it appears as a call
    /// target with arguments.
    pub fn is_runnable(&self) -> bool {
        matches!(
            self,
            Value::Native(_)
                | Value::Block(_)
                | Value::List(_)
                | Value::Dictionary(_)
                | Value::String(_)
        )
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// The error payload if this value must stop the running block.
    pub fn halting_error(&self) -> Option<&ErrorValue> {
        match self {
            Value::Error(e) if e.halts() => Some(e),
            _ => None,
        }
    }

    /// Help text shown by the `help` builtin.
    pub fn help(&self) -> String {
        match self {
            Value::Native(f) => f
                .help()
                .map_or_else(|| format!("function «{}»", f.name()), str::to_string),
            Value::Block(b) => format!("block of {} calls", b.calls().len()),
            other => format!("{} value", other.type_name()),
        }
    }
}

// Accessors
impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(**n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(**f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(**b),
            _ => None,
        }
    }

    /// Text of a string value, interpolations left pending.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.text()),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Value::Identifier(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Heap<ListCell>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Heap<DictCell>> {
        match self {
            Value::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Value::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }
}

// Freezing
impl Value {
    /// Freeze this value and everything reachable from it.
    ///
    /// Already-frozen containers are not re-entered, which also makes this
    /// terminate on cycles. Dictionary parents are left untouched.
    pub fn freeze(&self) {
        match self {
            Value::List(l) => {
                if !l.mark_frozen() {
                    for item in l.snapshot() {
                        item.freeze();
                    }
                }
            }
            Value::Dictionary(d) => {
                if !d.mark_frozen() {
                    for (_, value) in d.entries() {
                        value.freeze();
                    }
                }
            }
            Value::Return(values) => {
                for value in values.iter() {
                    value.freeze();
                }
            }
            _ => {}
        }
    }

    /// Containers report their flag; every other value is immutable.
    pub fn is_frozen(&self) -> bool {
        match self {
            Value::List(l) => l.is_frozen(),
            Value::Dictionary(d) => d.is_frozen(),
            _ => true,
        }
    }
}

// Equality
impl Value {
    /// Structural equality. Values of different types are never equal.
    pub fn equals(&self, other: &Value) -> bool {
        let mut seen = Vec::new();
        equals_inner(self, other, &mut seen)
    }
}

fn equals_inner(a: &Value, b: &Value, seen: &mut Vec<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Nil(_), Value::Nil(_)) => true,
        (Value::Boolean(x), Value::Boolean(y)) => **x == **y,
        (Value::Integer(x), Value::Integer(y)) => **x == **y,
        #[allow(clippy::float_cmp)]
        (Value::Float(x), Value::Float(y)) => **x == **y,
        (Value::String(x), Value::String(y)) => {
            Heap::ptr_eq(x, y) || (x.is_plain() && y.is_plain() && x.text() == y.text())
        }
        (Value::Identifier(x), Value::Identifier(y)) => **x == **y,
        (Value::List(x), Value::List(y)) => {
            if Heap::ptr_eq(x, y) || seen.contains(&(x.addr(), y.addr())) {
                return true;
            }
            seen.push((x.addr(), y.addr()));
            let (xs, ys) = (x.snapshot(), y.snapshot());
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys.iter())
                    .all(|(l, r)| equals_inner(l, r, seen))
        }
        (Value::Dictionary(x), Value::Dictionary(y)) => {
            if Heap::ptr_eq(x, y) || seen.contains(&(x.addr(), y.addr())) {
                return true;
            }
            seen.push((x.addr(), y.addr()));
            let parents_match = match (x.parent(), y.parent()) {
                (None, None) => true,
                (Some(p), Some(q)) => Heap::ptr_eq(&p, &q),
                _ => false,
            };
            let (xs, ys) = (x.entries(), y.entries());
            parents_match
                && xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys.iter())
                    .all(|((kx, vx), (ky, vy))| kx == ky && equals_inner(vx, vy, seen))
        }
        (Value::Block(x), Value::Block(y)) => Heap::ptr_eq(x, y) || x.same_code(y),
        (Value::Call(x), Value::Call(y)) => Heap::ptr_eq(x, y),
        (Value::Native(x), Value::Native(y)) => Heap::ptr_eq(x, y) || x.same_function(y),
        (Value::Error(x), Value::Error(y)) => **x == **y,
        (Value::Return(x), Value::Return(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .zip(y.iter())
                    .all(|(l, r)| equals_inner(l, r, seen))
        }
        (Value::Binary(x), Value::Binary(y)) => **x == **y,
        (Value::Internal(x), Value::Internal(y)) => x.same_payload(y),
        _ => false,
    }
}

// Display
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut seen = Vec::new();
        write_value(f, self, false, &mut seen)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut seen = Vec::new();
        write!(f, "{}(", self.type_name())?;
        write_value(f, self, true, &mut seen)?;
        f.write_str(")")
    }
}

fn write_value(
    f: &mut fmt::Formatter<'_>,
    value: &Value,
    nested: bool,
    seen: &mut Vec<usize>,
) -> fmt::Result {
    match value {
        Value::Nil(_) => f.write_str("nil"),
        Value::Boolean(b) => write!(f, "{}", **b),
        Value::Integer(n) => write!(f, "{}", **n),
        Value::Float(x) => write!(f, "{:?}", **x),
        Value::String(s) if nested => write!(f, "{:?}", s.text()),
        Value::String(s) => f.write_str(s.text()),
        Value::Identifier(i) => write!(f, "{i}"),
        Value::List(l) => {
            if seen.contains(&l.addr()) {
                return f.write_str("[...]");
            }
            seen.push(l.addr());
            f.write_str("[")?;
            for (i, item) in l.snapshot().iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write_value(f, item, true, seen)?;
            }
            seen.pop();
            f.write_str("]")
        }
        Value::Dictionary(d) => {
            if seen.contains(&d.addr()) {
                return f.write_str("{...}");
            }
            seen.push(d.addr());
            f.write_str("{")?;
            for (i, (key, item)) in d.entries().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{key}: ")?;
                write_value(f, item, true, seen)?;
            }
            seen.pop();
            f.write_str("}")
        }
        Value::Block(_) => f.write_str("{...}"),
        Value::Call(c) => write!(f, "<call {}>", c.target_name()),
        Value::Native(n) => write!(f, "<function {}>", n.name()),
        Value::Error(e) => write!(f, "{e}"),
        Value::Return(values) => {
            for (i, item) in values.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write_value(f, item, nested, seen)?;
            }
            Ok(())
        }
        Value::Binary(b) => write!(f, "<binary {} bytes>", b.bytes.len()),
        Value::Internal(i) => write!(f, "<internal {}>", i.type_name()),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<ErrorValue> for Value {
    fn from(e: ErrorValue) -> Self {
        Value::error(e)
    }
}

#[cfg(test)]
mod tests;
