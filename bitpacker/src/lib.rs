mod delta;
mod simple8b;

pub use delta::{compress_sequence, decompress_sequence, DELTA_BLOCK_LEN, WIDE_BLOCK_MARKER};
pub use simple8b::{Simple8bDecoder, Simple8bEncoder, SIMPLE8B_MAX_VALUE, SIMPLE8B_MAX_VALUES_PER_WORD};
