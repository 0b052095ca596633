use std::io::{self, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Value {value} exceeds the representable range of `{codec}` (max {max})")]
    ValueOutOfRange { codec: &'static str, value: u64, max: u64 },

    #[error("Failed to write into the encoder sink: '{0}'")]
    SinkError(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Encoded stream ended unexpectedly")]
    Truncated,

    #[error("Encoded stream is corrupted: '{0}'")]
    Corrupted(String),

    #[error("Encoded stream still holds values after the last expected one")]
    TrailingData,

    #[error("Decoded value mismatch, expected: {expected}, actual: {actual}")]
    ValueMismatch { expected: u64, actual: u64 },

    #[error("Decoded count mismatch, expected: {expected}, actual: {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl From<io::Error> for DecodeError {
    fn from(io_err: io::Error) -> Self {
        match io_err.kind() {
            ErrorKind::UnexpectedEof => DecodeError::Truncated,
            _ => DecodeError::Corrupted(io_err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Cursor read before `advance` returned true")]
    CursorNotPositioned,

    #[error("Cursor read after it was exhausted")]
    CursorExhausted,
}
