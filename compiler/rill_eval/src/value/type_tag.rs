//! Numeric type tags.

use std::fmt;

/// Runtime type of a value, with a stable numeric code.
///
/// The codes are part of the serialized leaf format and must not be
/// renumbered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TypeTag {
    Nil = 0,
    Boolean = 1,
    Integer = 2,
    Float = 3,
    String = 4,
    Identifier = 5,
    List = 6,
    Dictionary = 7,
    Block = 8,
    Call = 9,
    NativeFunction = 10,
    Error = 11,
    Return = 12,
    Binary = 13,
    Internal = 14,
}

impl TypeTag {
    pub const ALL: [TypeTag; 15] = [
        TypeTag::Nil,
        TypeTag::Boolean,
        TypeTag::Integer,
        TypeTag::Float,
        TypeTag::String,
        TypeTag::Identifier,
        TypeTag::List,
        TypeTag::Dictionary,
        TypeTag::Block,
        TypeTag::Call,
        TypeTag::NativeFunction,
        TypeTag::Error,
        TypeTag::Return,
        TypeTag::Binary,
        TypeTag::Internal,
    ];

    pub fn code(self) -> i64 {
        i64::from(self as u8)
    }

    pub fn from_code(code: i64) -> Option<TypeTag> {
        usize::try_from(code)
            .ok()
            .and_then(|index| TypeTag::ALL.get(index).copied())
    }

    /// Name used in scripts (`is x integer`) and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Nil => "nil",
            TypeTag::Boolean => "boolean",
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::String => "string",
            TypeTag::Identifier => "identifier",
            TypeTag::List => "list",
            TypeTag::Dictionary => "dictionary",
            TypeTag::Block => "block",
            TypeTag::Call => "call",
            TypeTag::NativeFunction => "function",
            TypeTag::Error => "error",
            TypeTag::Return => "return",
            TypeTag::Binary => "binary",
            TypeTag::Internal => "internal",
        }
    }

    pub fn from_name(name: &str) -> Option<TypeTag> {
        TypeTag::ALL.into_iter().find(|tag| tag.name() == name)
    }

    /// Whether values of this type can be written by the codec.
    ///
    /// Code, host functions and host objects cannot. Strings can only
    /// while they carry no interpolations; that is checked per value.
    pub fn is_serializable(self) -> bool {
        !matches!(
            self,
            TypeTag::Block
                | TypeTag::Call
                | TypeTag::NativeFunction
                | TypeTag::Return
                | TypeTag::Internal
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
