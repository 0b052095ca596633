//! Delta compression of whole integer sequences.
//!
//! Layout: `vint(count)`, then one record per full block of [`DELTA_BLOCK_LEN`] zigzag
//! deltas, then the remainder deltas as plain varints.
//! A block record is `num_bits` followed by the bit-packed deltas, or [`WIDE_BLOCK_MARKER`]
//! followed by varints when some delta doesn't fit in 32 bits.

use std::io::{self, ErrorKind};

use bitpacking::{BitPacker, BitPacker1x};
use common::{read_vint_u64, serialize_vint_u64};

pub const DELTA_BLOCK_LEN: usize = BitPacker1x::BLOCK_LEN;

/// Block header announcing varint encoded deltas.
pub const WIDE_BLOCK_MARKER: u8 = u8::MAX;

fn zigzag(delta: i64) -> u64 {
    ((delta << 1) ^ (delta >> 63)) as u64
}

fn unzigzag(encoded: u64) -> i64 {
    ((encoded >> 1) as i64) ^ -((encoded & 1) as i64)
}

/// Zigzag deltas between consecutive values, the first one taken against `0`.
fn zigzag_deltas(values: &[u64]) -> Vec<u64> {
    let mut previous = 0u64;
    values
        .iter()
        .map(|&value| {
            let delta = value.wrapping_sub(previous) as i64;
            previous = value;
            zigzag(delta)
        })
        .collect()
}

/// Compresses `values` and appends the result to `output`.
///
/// Returns the number of bytes appended.
pub fn compress_sequence(values: &[u64], output: &mut Vec<u8>) -> usize {
    let start = output.len();
    serialize_vint_u64(values.len() as u64, output);

    let bitpacker = BitPacker1x::new();
    let deltas = zigzag_deltas(values);
    let blocks = deltas.chunks_exact(DELTA_BLOCK_LEN);
    let remainder = blocks.remainder();

    let mut narrow = [0u32; DELTA_BLOCK_LEN];
    let mut packed = [0u8; DELTA_BLOCK_LEN * 4];
    for block in blocks {
        let fits_u32 = block.iter().all(|&d| d <= u64::from(u32::MAX));
        if !fits_u32 {
            output.push(WIDE_BLOCK_MARKER);
            for &delta in block {
                serialize_vint_u64(delta, output);
            }
            continue;
        }
        for (slot, &delta) in narrow.iter_mut().zip(block) {
            *slot = delta as u32;
        }
        let num_bits = bitpacker.num_bits(&narrow);
        let size = bitpacker.compress(&narrow, &mut packed, num_bits);
        output.push(num_bits);
        output.extend_from_slice(&packed[..size]);
    }
    for &delta in remainder {
        serialize_vint_u64(delta, output);
    }
    output.len() - start
}

/// Restores the sequence written by [`compress_sequence`].
///
/// `data` must hold exactly one compressed sequence.
pub fn decompress_sequence(data: &[u8]) -> io::Result<Vec<u64>> {
    let mut data = data;
    let count = usize::try_from(read_vint_u64(&mut data)?).map_err(|_| io::Error::new(ErrorKind::InvalidData, "sequence length overflows usize"))?;

    let bitpacker = BitPacker1x::new();
    let mut deltas: Vec<u64> = Vec::with_capacity(count.min(data.len() * 8 + DELTA_BLOCK_LEN));
    let mut narrow = [0u32; DELTA_BLOCK_LEN];
    for _ in 0..count / DELTA_BLOCK_LEN {
        let (&num_bits, rest) = data.split_first().ok_or_else(|| io::Error::new(ErrorKind::UnexpectedEof, "missing delta block header"))?;
        data = rest;
        if num_bits == WIDE_BLOCK_MARKER {
            for _ in 0..DELTA_BLOCK_LEN {
                deltas.push(read_vint_u64(&mut data)?);
            }
            continue;
        }
        if num_bits > 32 {
            return Err(io::Error::new(ErrorKind::InvalidData, format!("invalid delta block num_bits {}", num_bits)));
        }
        let size = BitPacker1x::compressed_block_size(num_bits);
        if data.len() < size {
            return Err(io::Error::new(ErrorKind::UnexpectedEof, "delta block is truncated"));
        }
        bitpacker.decompress(&data[..size], &mut narrow, num_bits);
        data = &data[size..];
        deltas.extend(narrow.iter().map(|&d| u64::from(d)));
    }
    for _ in 0..count % DELTA_BLOCK_LEN {
        deltas.push(read_vint_u64(&mut data)?);
    }
    if !data.is_empty() {
        return Err(io::Error::new(ErrorKind::InvalidData, format!("{} trailing bytes after delta sequence", data.len())));
    }

    let mut previous = 0u64;
    Ok(deltas
        .into_iter()
        .map(|encoded| {
            previous = previous.wrapping_add(unzigzag(encoded) as u64);
            previous
        })
        .collect())
}
