use super::{DecodeError, EncodeError, LifecycleError};

/// Byte oriented variable-length encoder writing values one at a time.
///
/// `close` consumes the encoder, so an encoder can't be written after it was flushed.
pub trait StreamVarEncoder: Sized {
    /// Returns the number of bytes `value` took.
    fn put_u64(&mut self, value: u64) -> Result<usize, EncodeError>;

    fn put_u32(&mut self, value: u32) -> Result<usize, EncodeError>;

    /// Flushes buffered state and returns the encoded bytes.
    fn close(self) -> Result<Vec<u8>, EncodeError>;
}

pub trait StreamVarDecoder {
    fn get_u64(&mut self) -> Result<u64, DecodeError>;

    fn get_u32(&mut self) -> Result<u32, DecodeError>;

    /// Whether every encoded byte has been consumed.
    fn is_exhausted(&self) -> bool;
}

pub trait StreamVarCodec: Default {
    const NAME: &'static str;

    type Encoder: StreamVarEncoder;
    type Decoder<'a>: StreamVarDecoder;

    fn encoder(&self) -> Self::Encoder;

    fn decoder<'a>(&self, encoded: &'a [u8]) -> Self::Decoder<'a>;
}

/// Word packing encoder. It is single use: `finalize` is the only way to get the bytes
/// and it consumes the encoder.
pub trait StreamPackedEncoder: Sized {
    /// Fails with [`EncodeError::ValueOutOfRange`] when `value` can't be packed.
    fn write(&mut self, value: u64) -> Result<(), EncodeError>;

    fn finalize(self) -> Result<Vec<u8>, EncodeError>;
}

/// Forward cursor over packed values.
pub trait StreamPackedCursor {
    /// Moves to the next value, `false` once the stream is exhausted.
    fn advance(&mut self) -> Result<bool, DecodeError>;

    /// Value under the cursor, only valid while the last `advance` returned true.
    fn read(&self) -> Result<u64, LifecycleError>;
}

pub trait StreamPackedCodec: Default {
    const NAME: &'static str;

    /// Largest value `write` accepts.
    const MAX_VALUE: u64;

    type Encoder: StreamPackedEncoder;
    type Cursor<'a>: StreamPackedCursor;

    fn encoder(&self) -> Self::Encoder;

    fn cursor<'a>(&self, encoded: &'a [u8]) -> Result<Self::Cursor<'a>, DecodeError>;
}

/// Codec consuming a complete sequence in one call.
pub trait WholeSequenceCodec: Sized {
    const NAME: &'static str;

    fn encode(values: &[u64]) -> Result<Self, EncodeError>;

    fn size_in_bytes(&self) -> usize;

    fn decode(&self) -> Result<Vec<u64>, DecodeError>;
}
