use log::error;
use std::ops::Range;
use thiserror::Error;

use super::Posting;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Posting {posting} has frequency {frequency} but holds {occurrences} occurrences")]
    FrequencyMismatch { posting: usize, frequency: u64, occurrences: usize },

    #[error("Invalid fixture parameter: '{0}'")]
    InvalidParameter(String),
}

/// Immutable, validated list of postings used for one benchmark run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingCorpus {
    postings: Vec<Posting>,
}

impl PostingCorpus {
    pub fn new(postings: Vec<Posting>) -> Result<Self, CorpusError> {
        for (idx, posting) in postings.iter().enumerate() {
            if posting.frequency != posting.occurrences.len() as u64 {
                let err = CorpusError::FrequencyMismatch { posting: idx, frequency: posting.frequency, occurrences: posting.occurrences.len() };
                error!("[PostingCorpus] {}", err);
                return Err(err);
            }
        }
        Ok(Self { postings })
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    pub fn slice(&self, range: Range<usize>) -> &[Posting] {
        &self.postings[range]
    }

    /// Total occurrence records over all postings.
    pub fn total_occurrences(&self) -> usize {
        self.postings.iter().map(|p| p.occurrences.len()).sum()
    }

    /// ## brief
    /// Uncompressed byte cost of the corpus, the baseline for reduction reports.
    /// ## detail
    /// 8 bytes per frequency, 4 per norm, 2 per field id, 8 for each of position,
    /// start and end, 8 per sub-position. Occurrences are counted per posting.
    pub fn raw_footprint(&self) -> usize {
        self.postings.iter().map(|p| p.raw_footprint()).sum()
    }
}
