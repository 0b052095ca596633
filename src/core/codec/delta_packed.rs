use posting_bitpacker::{compress_sequence, decompress_sequence};

use super::{DecodeError, EncodeError, WholeSequenceCodec};

/// Whole-sequence codec: zigzag deltas bit-packed in blocks of 32.
///
/// Unsorted input is fine, deltas are signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaPackedSequence {
    encoded: Vec<u8>,
}

impl DeltaPackedSequence {
    pub fn as_bytes(&self) -> &[u8] {
        &self.encoded
    }
}

impl WholeSequenceCodec for DeltaPackedSequence {
    const NAME: &'static str = "delta_packed";

    fn encode(values: &[u64]) -> Result<Self, EncodeError> {
        let mut encoded = Vec::new();
        compress_sequence(values, &mut encoded);
        Ok(Self { encoded })
    }

    fn size_in_bytes(&self) -> usize {
        self.encoded.len()
    }

    fn decode(&self) -> Result<Vec<u64>, DecodeError> {
        Ok(decompress_sequence(&self.encoded)?)
    }
}
