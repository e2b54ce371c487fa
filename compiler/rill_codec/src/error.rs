use rill_eval::ErrorValue;

/// Failure to write or read a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("cannot serialize a {type_name} value")]
    NotSerializable { type_name: &'static str },
    #[error("corrupt event stream: {0}")]
    CorruptStream(String),
    #[error("malformed snapshot bytes: {0}")]
    Bincode(#[from] bincode::Error),
}

impl CodecError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        CodecError::CorruptStream(reason.into())
    }
}

impl From<CodecError> for ErrorValue {
    fn from(error: CodecError) -> Self {
        ErrorValue::new(error.to_string())
    }
}
