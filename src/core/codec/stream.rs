use super::{DecodeError, EncodeError, StreamPackedCodec, StreamPackedCursor, StreamPackedEncoder, StreamVarCodec, StreamVarDecoder, StreamVarEncoder};

/// Single-use writer for one chunk stream, consumed by [`ChunkStreamWriter::finish`].
pub trait ChunkStreamWriter: Sized {
    fn put_u64(&mut self, value: u64) -> Result<(), EncodeError>;

    fn put_u32(&mut self, value: u32) -> Result<(), EncodeError>;

    fn finish(self) -> Result<Vec<u8>, EncodeError>;
}

/// Reads back a chunk stream in write order.
pub trait ChunkStreamReader {
    fn next_u64(&mut self) -> Result<u64, DecodeError>;

    fn next_u32(&mut self) -> Result<u32, DecodeError>;

    /// Fails with [`DecodeError::TrailingData`] if values remain.
    fn ensure_exhausted(&mut self) -> Result<(), DecodeError>;
}

/// Any codec the chunked stream pipeline can drive.
pub trait ChunkStreamCodec: Default {
    const NAME: &'static str;

    type Writer: ChunkStreamWriter;
    type Reader<'a>: ChunkStreamReader;

    fn writer(&self) -> Self::Writer;

    fn reader<'a>(&self, encoded: &'a [u8]) -> Result<Self::Reader<'a>, DecodeError>;
}

/// Drives a [`StreamVarCodec`] as a chunk stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct VarStream<C: StreamVarCodec>(pub C);

pub struct VarStreamWriter<E: StreamVarEncoder>(E);

pub struct VarStreamReader<D: StreamVarDecoder>(D);

impl<E: StreamVarEncoder> ChunkStreamWriter for VarStreamWriter<E> {
    fn put_u64(&mut self, value: u64) -> Result<(), EncodeError> {
        self.0.put_u64(value).map(|_| ())
    }

    fn put_u32(&mut self, value: u32) -> Result<(), EncodeError> {
        self.0.put_u32(value).map(|_| ())
    }

    fn finish(self) -> Result<Vec<u8>, EncodeError> {
        self.0.close()
    }
}

impl<D: StreamVarDecoder> ChunkStreamReader for VarStreamReader<D> {
    fn next_u64(&mut self) -> Result<u64, DecodeError> {
        self.0.get_u64()
    }

    fn next_u32(&mut self) -> Result<u32, DecodeError> {
        self.0.get_u32()
    }

    fn ensure_exhausted(&mut self) -> Result<(), DecodeError> {
        match self.0.is_exhausted() {
            true => Ok(()),
            false => Err(DecodeError::TrailingData),
        }
    }
}

impl<C: StreamVarCodec> ChunkStreamCodec for VarStream<C> {
    const NAME: &'static str = C::NAME;

    type Writer = VarStreamWriter<C::Encoder>;
    type Reader<'a> = VarStreamReader<C::Decoder<'a>>;

    fn writer(&self) -> Self::Writer {
        VarStreamWriter(self.0.encoder())
    }

    fn reader<'a>(&self, encoded: &'a [u8]) -> Result<Self::Reader<'a>, DecodeError> {
        Ok(VarStreamReader(self.0.decoder(encoded)))
    }
}

/// Drives a [`StreamPackedCodec`] as a chunk stream. `u32` values are widened to `u64`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PackedStream<C: StreamPackedCodec>(pub C);

pub struct PackedStreamWriter<E: StreamPackedEncoder>(E);

pub struct PackedStreamReader<R: StreamPackedCursor>(R);

impl<E: StreamPackedEncoder> ChunkStreamWriter for PackedStreamWriter<E> {
    fn put_u64(&mut self, value: u64) -> Result<(), EncodeError> {
        self.0.write(value)
    }

    fn put_u32(&mut self, value: u32) -> Result<(), EncodeError> {
        self.0.write(u64::from(value))
    }

    fn finish(self) -> Result<Vec<u8>, EncodeError> {
        self.0.finalize()
    }
}

impl<R: StreamPackedCursor> ChunkStreamReader for PackedStreamReader<R> {
    fn next_u64(&mut self) -> Result<u64, DecodeError> {
        if !self.0.advance()? {
            return Err(DecodeError::Truncated);
        }
        Ok(self.0.read()?)
    }

    fn next_u32(&mut self) -> Result<u32, DecodeError> {
        let value = self.next_u64()?;
        u32::try_from(value).map_err(|_| DecodeError::Corrupted(format!("value {} doesn't fit in u32", value)))
    }

    fn ensure_exhausted(&mut self) -> Result<(), DecodeError> {
        match self.0.advance()? {
            true => Err(DecodeError::TrailingData),
            false => Ok(()),
        }
    }
}

impl<C: StreamPackedCodec> ChunkStreamCodec for PackedStream<C> {
    const NAME: &'static str = C::NAME;

    type Writer = PackedStreamWriter<C::Encoder>;
    type Reader<'a> = PackedStreamReader<C::Cursor<'a>>;

    fn writer(&self) -> Self::Writer {
        PackedStreamWriter(self.0.encoder())
    }

    fn reader<'a>(&self, encoded: &'a [u8]) -> Result<Self::Reader<'a>, DecodeError> {
        Ok(PackedStreamReader(self.0.cursor(encoded)?))
    }
}
