use std::io::{self, ErrorKind, Read, Write};

/// Max bytes a `u64` occupies once varint encoded.
pub const MAX_VINT_U64_LEN: usize = 10;

/// Buffered bytes are pushed to the sink once they exceed this size.
const FLUSH_THRESHOLD: usize = 4096;

/// Appends `val` to `output` as a base-128 varint (little-endian groups of 7 bits,
/// high bit set on every byte but the last).
///
/// Returns the number of bytes written.
pub fn serialize_vint_u64(mut val: u64, output: &mut Vec<u8>) -> usize {
    let start = output.len();
    while val >= 0x80 {
        output.push((val as u8) | 0x80);
        val >>= 7;
    }
    output.push(val as u8);
    output.len() - start
}

/// Reads one varint from the front of `data` and advances the slice past it.
pub fn read_vint_u64(data: &mut &[u8]) -> io::Result<u64> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    for (idx, &byte) in data.iter().enumerate() {
        // The 10th byte can only carry the top bit of a u64.
        if idx == MAX_VINT_U64_LEN - 1 && byte > 1 {
            return Err(io::Error::new(ErrorKind::InvalidData, "varint overflows u64"));
        }
        result |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            *data = &data[idx + 1..];
            return Ok(result);
        }
        shift += 7;
    }
    Err(io::Error::new(ErrorKind::UnexpectedEof, "reach end of buffer while reading varint"))
}

/// Streaming base-128 varint writer.
///
/// Values are staged in an internal buffer and handed to the sink in batches,
/// so [`VIntEncoder::close`] must be called to get the complete output.
pub struct VIntEncoder<W: Write> {
    sink: W,
    buffer: Vec<u8>,
}

impl<W: Write> VIntEncoder<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, buffer: Vec::with_capacity(FLUSH_THRESHOLD + MAX_VINT_U64_LEN) }
    }

    pub fn put_u64(&mut self, val: u64) -> io::Result<usize> {
        let written = serialize_vint_u64(val, &mut self.buffer);
        if self.buffer.len() >= FLUSH_THRESHOLD {
            self.flush_buffer()?;
        }
        Ok(written)
    }

    pub fn put_u32(&mut self, val: u32) -> io::Result<usize> {
        self.put_u64(u64::from(val))
    }

    fn flush_buffer(&mut self) -> io::Result<()> {
        self.sink.write_all(&self.buffer)?;
        self.buffer.clear();
        Ok(())
    }

    /// Flushes every staged byte and returns the sink.
    pub fn close(mut self) -> io::Result<W> {
        self.flush_buffer()?;
        self.sink.flush()?;
        Ok(self.sink)
    }
}

/// Streaming base-128 varint reader, values come back in write order.
pub struct VIntDecoder<R: Read> {
    source: R,
}

impl<R: Read> VIntDecoder<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn get_u64(&mut self) -> io::Result<u64> {
        let mut result: u64 = 0;
        let mut shift: u32 = 0;
        let mut byte = [0u8; 1];
        for idx in 0..MAX_VINT_U64_LEN {
            self.source.read_exact(&mut byte)?;
            if idx == MAX_VINT_U64_LEN - 1 && byte[0] > 1 {
                return Err(io::Error::new(ErrorKind::InvalidData, "varint overflows u64"));
            }
            result |= u64::from(byte[0] & 0x7F) << shift;
            if byte[0] & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
        Err(io::Error::new(ErrorKind::InvalidData, "varint overflows u64"))
    }

    pub fn get_u32(&mut self) -> io::Result<u32> {
        let val = self.get_u64()?;
        u32::try_from(val).map_err(|_| io::Error::new(ErrorKind::InvalidData, format!("varint {} doesn't fit in u32", val)))
    }
}

impl<'a> VIntDecoder<&'a [u8]> {
    /// Whether every byte of the underlying slice has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.source.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{read_vint_u64, serialize_vint_u64, VIntDecoder, VIntEncoder, MAX_VINT_U64_LEN};
    use proptest::prelude::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::io::ErrorKind;

    fn encode_all(values: &[u64]) -> Vec<u8> {
        let mut encoder = VIntEncoder::new(Vec::new());
        for &val in values {
            encoder.put_u64(val).unwrap();
        }
        encoder.close().unwrap()
    }

    #[test]
    fn test_vint_sizes() {
        let mut buffer = Vec::new();
        assert_eq!(serialize_vint_u64(0, &mut buffer), 1);
        assert_eq!(serialize_vint_u64(127, &mut buffer), 1);
        assert_eq!(serialize_vint_u64(128, &mut buffer), 2);
        assert_eq!(serialize_vint_u64(16383, &mut buffer), 2);
        assert_eq!(serialize_vint_u64(16384, &mut buffer), 3);
        assert_eq!(serialize_vint_u64(1 << 32, &mut buffer), 5);
        assert_eq!(serialize_vint_u64(u64::MAX, &mut buffer), MAX_VINT_U64_LEN);
        assert_eq!(buffer.len(), 1 + 1 + 2 + 2 + 3 + 5 + MAX_VINT_U64_LEN);
    }

    #[test]
    fn test_vint_boundaries() {
        let values = vec![0, 1, 127, 128, u32::MAX as u64, 1 << 32, (1 << 60) - 1, u64::MAX];
        let encoded = encode_all(&values);

        let mut decoder = VIntDecoder::new(&encoded[..]);
        for &expected in &values {
            assert_eq!(decoder.get_u64().unwrap(), expected);
        }
        assert!(decoder.is_exhausted());

        let mut data = &encoded[..];
        for &expected in &values {
            assert_eq!(read_vint_u64(&mut data).unwrap(), expected);
        }
        assert!(data.is_empty());
    }

    #[test]
    fn test_vint_basic_usecase() {
        let values: Vec<u64> = vec![280, 105, 215, 690, 240, 578, 101, 320, 755, 325, 375, 480, 260, 218, 290];
        let encoded = encode_all(&values);
        // 105 and 101 take one byte, the rest sit in [128, 16384).
        assert_eq!(encoded.len(), 2 + 13 * 2);
        assert!(encoded.len() < values.len() * 8);

        let mut decoder = VIntDecoder::new(&encoded[..]);
        for &expected in &values {
            assert_eq!(decoder.get_u64().unwrap(), expected);
        }
    }

    #[test]
    fn test_vint_large_stream_flushes() {
        let values: Vec<u64> = (0..10_000u64).map(|e| e * 7919).collect();
        let encoded = encode_all(&values);
        let mut decoder = VIntDecoder::new(&encoded[..]);
        for &expected in &values {
            assert_eq!(decoder.get_u64().unwrap(), expected);
        }
        assert!(decoder.is_exhausted());
    }

    #[test]
    fn test_vint_random_widths() {
        let mut rng = StdRng::seed_from_u64(42);
        let values: Vec<u64> = (0..2_000).map(|_| rng.gen::<u64>() >> rng.gen_range(0..64)).collect();
        let encoded = encode_all(&values);

        let mut buffer = Vec::new();
        let expected_len: usize = values.iter().map(|&val| serialize_vint_u64(val, &mut buffer)).sum();
        assert_eq!(encoded.len(), expected_len);
        assert_eq!(encoded, buffer);

        let mut decoder = VIntDecoder::new(&encoded[..]);
        for &expected in &values {
            assert_eq!(decoder.get_u64().unwrap(), expected);
        }
        assert!(decoder.is_exhausted());
    }

    #[test]
    fn test_vint_truncated() {
        let encoded = encode_all(&[1 << 32]);
        let mut decoder = VIntDecoder::new(&encoded[..encoded.len() - 1]);
        assert_eq!(decoder.get_u64().unwrap_err().kind(), ErrorKind::UnexpectedEof);

        let mut data = &encoded[..encoded.len() - 1];
        assert_eq!(read_vint_u64(&mut data).unwrap_err().kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_vint_overflow() {
        let corrupted = [0xFFu8; MAX_VINT_U64_LEN + 1];
        let mut decoder = VIntDecoder::new(&corrupted[..]);
        assert_eq!(decoder.get_u64().unwrap_err().kind(), ErrorKind::InvalidData);

        let mut data = &corrupted[..];
        assert_eq!(read_vint_u64(&mut data).unwrap_err().kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_vint_get_u32_rejects_wide_value() {
        let encoded = encode_all(&[u32::MAX as u64, 1 << 32]);
        let mut decoder = VIntDecoder::new(&encoded[..]);
        assert_eq!(decoder.get_u32().unwrap(), u32::MAX);
        assert_eq!(decoder.get_u32().unwrap_err().kind(), ErrorKind::InvalidData);
    }

    proptest! {
        #[test]
        fn proptest_vint_stream(values in proptest::collection::vec(any::<u64>(), 0..512)) {
            let encoded = encode_all(&values);
            let mut decoder = VIntDecoder::new(&encoded[..]);
            for &expected in &values {
                prop_assert_eq!(decoder.get_u64().unwrap(), expected);
            }
            prop_assert!(decoder.is_exhausted());
        }
    }
}
