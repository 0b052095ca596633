use log::error;
use posting_bitpacker::{Simple8bDecoder, Simple8bEncoder, SIMPLE8B_MAX_VALUE};

use super::{DecodeError, EncodeError, LifecycleError, StreamPackedCodec, StreamPackedCursor, StreamPackedEncoder};

/// Simple-8b packing, up to 240 integers per 64-bit word, values below 2^60.
#[derive(Debug, Default, Clone, Copy)]
pub struct Simple8bCodec;

pub struct Simple8bWordEncoder {
    inner: Simple8bEncoder,
}

pub struct Simple8bCursor<'a> {
    inner: Simple8bDecoder<'a>,
    exhausted: bool,
}

impl StreamPackedEncoder for Simple8bWordEncoder {
    fn write(&mut self, value: u64) -> Result<(), EncodeError> {
        if value > SIMPLE8B_MAX_VALUE {
            let err = EncodeError::ValueOutOfRange { codec: Simple8bCodec::NAME, value, max: SIMPLE8B_MAX_VALUE };
            error!("[Simple8bWordEncoder] {}", err);
            return Err(err);
        }
        Ok(self.inner.write(value)?)
    }

    fn finalize(self) -> Result<Vec<u8>, EncodeError> {
        Ok(self.inner.bytes()?)
    }
}

impl<'a> StreamPackedCursor for Simple8bCursor<'a> {
    fn advance(&mut self) -> Result<bool, DecodeError> {
        if self.exhausted {
            return Ok(false);
        }
        let has_value = self.inner.advance();
        self.exhausted = !has_value;
        Ok(has_value)
    }

    fn read(&self) -> Result<u64, LifecycleError> {
        match self.inner.read() {
            Some(value) => Ok(value),
            None if self.exhausted => Err(LifecycleError::CursorExhausted),
            None => Err(LifecycleError::CursorNotPositioned),
        }
    }
}

impl StreamPackedCodec for Simple8bCodec {
    const NAME: &'static str = "simple8b";
    const MAX_VALUE: u64 = SIMPLE8B_MAX_VALUE;

    type Encoder = Simple8bWordEncoder;
    type Cursor<'a> = Simple8bCursor<'a>;

    fn encoder(&self) -> Self::Encoder {
        Simple8bWordEncoder { inner: Simple8bEncoder::new() }
    }

    fn cursor<'a>(&self, encoded: &'a [u8]) -> Result<Self::Cursor<'a>, DecodeError> {
        Ok(Simple8bCursor { inner: Simple8bDecoder::new(encoded)?, exhausted: false })
    }
}
