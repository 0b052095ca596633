use common::{VIntDecoder, VIntEncoder};

use super::{DecodeError, EncodeError, StreamVarCodec, StreamVarDecoder, StreamVarEncoder};

/// Base-128 varint: 7 payload bits per byte, high bit marks continuation.
#[derive(Debug, Default, Clone, Copy)]
pub struct Base128Codec;

pub struct Base128Encoder {
    inner: VIntEncoder<Vec<u8>>,
}

pub struct Base128Decoder<'a> {
    inner: VIntDecoder<&'a [u8]>,
}

impl StreamVarEncoder for Base128Encoder {
    fn put_u64(&mut self, value: u64) -> Result<usize, EncodeError> {
        Ok(self.inner.put_u64(value)?)
    }

    fn put_u32(&mut self, value: u32) -> Result<usize, EncodeError> {
        Ok(self.inner.put_u32(value)?)
    }

    fn close(self) -> Result<Vec<u8>, EncodeError> {
        Ok(self.inner.close()?)
    }
}

impl<'a> StreamVarDecoder for Base128Decoder<'a> {
    fn get_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(self.inner.get_u64()?)
    }

    fn get_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(self.inner.get_u32()?)
    }

    fn is_exhausted(&self) -> bool {
        self.inner.is_exhausted()
    }
}

impl StreamVarCodec for Base128Codec {
    const NAME: &'static str = "base128_varint";

    type Encoder = Base128Encoder;
    type Decoder<'a> = Base128Decoder<'a>;

    fn encoder(&self) -> Self::Encoder {
        Base128Encoder { inner: VIntEncoder::new(Vec::new()) }
    }

    fn decoder<'a>(&self, encoded: &'a [u8]) -> Self::Decoder<'a> {
        Base128Decoder { inner: VIntDecoder::new(encoded) }
    }
}
