use std::{fmt, time::Duration};

/// Result of one codec run over one corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingReport {
    pub codec: String,
    pub num_postings: usize,
    pub num_chunks: usize,
    pub raw_footprint: usize,
    pub encoded_footprint: usize,

    /// Time spent in the encoding pass only.
    pub elapsed: Duration,

    /// Whether the decode pass ran and matched the corpus.
    pub verified: bool,
}

impl EncodingReport {
    /// `(raw - encoded) * 100 / raw`, negative when encoding inflates the data.
    pub fn reduction_pct(&self) -> f64 {
        if self.raw_footprint == 0 {
            return 0.0;
        }
        (self.raw_footprint as f64 - self.encoded_footprint as f64) * 100.0 / self.raw_footprint as f64
    }
}

impl fmt::Display for EncodingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] actual footprint: {} bytes", self.codec, self.raw_footprint)?;
        writeln!(f, "[{}] encoded footprint: {} bytes", self.codec, self.encoded_footprint)?;
        writeln!(f, "[{}] reduction: {:.2}%", self.codec, self.reduction_pct())?;
        write!(f, "[{}] encode time: {:?}", self.codec, self.elapsed)
    }
}
