use std::mem::size_of;

/// One term occurrence inside a posting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occurrence {
    /// Field id, widened to `u64` on the wire.
    pub field: u16,

    /// Token position within the field.
    pub position: u64,

    /// Start offset.
    pub start: u64,

    /// End offset.
    pub end: u64,

    /// Positions of sub-tokens, may be empty.
    pub sub_positions: Vec<u64>,
}

impl Occurrence {
    pub fn new(field: u16, position: u64, start: u64, end: u64, sub_positions: Vec<u64>) -> Self {
        Self { field, position, start, end, sub_positions }
    }

    /// Uncompressed byte cost of this occurrence.
    pub fn raw_footprint(&self) -> usize {
        size_of::<u16>() + size_of::<u64>() * 3 + self.sub_positions.len() * size_of::<u64>()
    }
}

/// Per-document record: frequency, norm and one [`Occurrence`] per frequency unit.
#[derive(Debug, Clone, Default)]
pub struct Posting {
    pub frequency: u64,
    pub norm: f32,
    pub occurrences: Vec<Occurrence>,
}

impl Posting {
    pub fn new(frequency: u64, norm: f32, occurrences: Vec<Occurrence>) -> Self {
        Self { frequency, norm, occurrences }
    }

    /// Norm bit pattern, this is what travels through integer codecs.
    pub fn norm_bits(&self) -> u32 {
        self.norm.to_bits()
    }

    pub fn raw_footprint(&self) -> usize {
        size_of::<u64>() + size_of::<f32>() + self.occurrences.iter().map(|o| o.raw_footprint()).sum::<usize>()
    }
}

/// Norms compare by bit pattern, so `NaN == NaN` and `0.0 != -0.0`.
impl PartialEq for Posting {
    fn eq(&self, other: &Self) -> bool {
        self.frequency == other.frequency && self.norm_bits() == other.norm_bits() && self.occurrences == other.occurrences
    }
}

impl Eq for Posting {}
