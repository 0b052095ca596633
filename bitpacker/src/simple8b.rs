//! Simple-8b word packing.
//!
//! Every 64-bit word carries a 4-bit selector in its top bits and a 60-bit payload.
//! The selector decides how many integers share the payload and how wide each one is.
//! Selectors `0` and `1` are reserved for runs of the value `1` (240 and 120 of them).

use std::io::{self, ErrorKind};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

/// Largest value a Simple-8b word can carry.
pub const SIMPLE8B_MAX_VALUE: u64 = (1 << 60) - 1;

/// Most integers a single word can hold (selector `0`).
pub const SIMPLE8B_MAX_VALUES_PER_WORD: usize = 240;

const SELECTOR_SHIFT: u32 = 60;
const WORD_BYTES: usize = 8;

/// `(values per word, bits per value)` indexed by selector.
const SELECTORS: [(usize, u32); 16] = [
    (240, 0),
    (120, 0),
    (60, 1),
    (30, 2),
    (20, 3),
    (15, 4),
    (12, 5),
    (10, 6),
    (8, 7),
    (7, 8),
    (6, 10),
    (5, 12),
    (4, 15),
    (3, 20),
    (2, 30),
    (1, 60),
];

/// Packs as many leading `values` as possible into one word.
///
/// Returns the word and the count of values consumed.
fn pack_word(values: &[u64]) -> io::Result<(u64, usize)> {
    for (selector, &(count, bits)) in SELECTORS.iter().enumerate() {
        if values.len() < count {
            continue;
        }
        let candidates = &values[..count];
        if bits == 0 {
            if candidates.iter().all(|&v| v == 1) {
                return Ok(((selector as u64) << SELECTOR_SHIFT, count));
            }
            continue;
        }
        let max = (1u64 << bits) - 1;
        if candidates.iter().any(|&v| v > max) {
            continue;
        }
        let mut word = (selector as u64) << SELECTOR_SHIFT;
        for (idx, &v) in candidates.iter().enumerate() {
            word |= v << (idx as u32 * bits);
        }
        return Ok((word, count));
    }
    Err(io::Error::new(ErrorKind::InvalidInput, format!("value {:?} can't be packed with simple8b", values.first())))
}

/// Unpacks one word into `output`, returns the count of values written.
fn unpack_word(word: u64, output: &mut [u64; SIMPLE8B_MAX_VALUES_PER_WORD]) -> usize {
    let selector = (word >> SELECTOR_SHIFT) as usize;
    let (count, bits) = SELECTORS[selector];
    if bits == 0 {
        output[..count].fill(1);
        return count;
    }
    let mask = (1u64 << bits) - 1;
    for (idx, slot) in output[..count].iter_mut().enumerate() {
        *slot = (word >> (idx as u32 * bits)) & mask;
    }
    count
}

/// Single-use Simple-8b writer.
///
/// Values are staged until a full selector-0 run could be decided, then packed
/// greedily word by word. [`Simple8bEncoder::bytes`] consumes the encoder.
#[derive(Debug, Default)]
pub struct Simple8bEncoder {
    pending: Vec<u64>,
    words: Vec<u64>,
}

impl Simple8bEncoder {
    pub fn new() -> Self {
        Self { pending: Vec::with_capacity(SIMPLE8B_MAX_VALUES_PER_WORD), words: vec![] }
    }

    pub fn write(&mut self, value: u64) -> io::Result<()> {
        if value > SIMPLE8B_MAX_VALUE {
            return Err(io::Error::new(ErrorKind::InvalidInput, format!("value {} exceeds simple8b max value {}", value, SIMPLE8B_MAX_VALUE)));
        }
        self.pending.push(value);
        if self.pending.len() >= SIMPLE8B_MAX_VALUES_PER_WORD {
            self.pack_pending_word()?;
        }
        Ok(())
    }

    fn pack_pending_word(&mut self) -> io::Result<()> {
        let (word, consumed) = pack_word(&self.pending)?;
        self.words.push(word);
        self.pending.drain(..consumed);
        Ok(())
    }

    /// Count of values written so far.
    pub fn len(&self) -> usize {
        self.words.iter().map(|&w| SELECTORS[(w >> SELECTOR_SHIFT) as usize].0).sum::<usize>() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.pending.is_empty()
    }

    /// Packs the remaining values and serializes all words big-endian.
    pub fn bytes(mut self) -> io::Result<Vec<u8>> {
        while !self.pending.is_empty() {
            self.pack_pending_word()?;
        }
        let mut output = Vec::with_capacity(self.words.len() * WORD_BYTES);
        for &word in &self.words {
            output.write_u64::<BigEndian>(word)?;
        }
        Ok(output)
    }
}

/// Cursor over Simple-8b encoded bytes.
///
/// [`Simple8bDecoder::read`] only yields a value after [`Simple8bDecoder::advance`]
/// returned `true`.
#[derive(Debug, Clone)]
pub struct Simple8bDecoder<'a> {
    data: &'a [u8],
    unpacked: [u64; SIMPLE8B_MAX_VALUES_PER_WORD],
    unpacked_len: usize,
    next_idx: usize,
    current: Option<u64>,
}

impl<'a> Simple8bDecoder<'a> {
    pub fn new(data: &'a [u8]) -> io::Result<Self> {
        if data.len() % WORD_BYTES != 0 {
            return Err(io::Error::new(ErrorKind::InvalidData, format!("simple8b data size {} isn't a multiple of {}", data.len(), WORD_BYTES)));
        }
        Ok(Self { data, unpacked: [0u64; SIMPLE8B_MAX_VALUES_PER_WORD], unpacked_len: 0, next_idx: 0, current: None })
    }

    /// Moves to the next value, returns `false` once every word is consumed.
    pub fn advance(&mut self) -> bool {
        if self.next_idx == self.unpacked_len {
            if self.data.is_empty() {
                self.current = None;
                return false;
            }
            let word = BigEndian::read_u64(&self.data[..WORD_BYTES]);
            self.data = &self.data[WORD_BYTES..];
            self.unpacked_len = unpack_word(word, &mut self.unpacked);
            self.next_idx = 0;
        }
        self.current = Some(self.unpacked[self.next_idx]);
        self.next_idx += 1;
        true
    }

    /// Value under the cursor, `None` before the first `advance` or after exhaustion.
    pub fn read(&self) -> Option<u64> {
        self.current
    }
}
