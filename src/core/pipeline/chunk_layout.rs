use log::error;
use std::ops::Range;

use super::PipelineError;

/// Splits `num_postings` postings into chunks of `chunk_factor`, the last one may be short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLayout {
    num_postings: usize,
    chunk_factor: usize,
}

impl ChunkLayout {
    pub fn new(num_postings: usize, chunk_factor: usize) -> Result<Self, PipelineError> {
        if chunk_factor == 0 {
            let error_msg = "[ChunkLayout] chunk_factor must be greater than 0";
            error!("{}", error_msg);
            return Err(PipelineError::InvalidParameter(error_msg.to_string()));
        }
        Ok(Self { num_postings, chunk_factor })
    }

    pub fn num_postings(&self) -> usize {
        self.num_postings
    }

    pub fn num_chunks(&self) -> usize {
        self.num_postings.div_ceil(self.chunk_factor)
    }

    pub fn chunk_of(&self, posting: usize) -> usize {
        posting / self.chunk_factor
    }

    /// Posting indexes owned by `chunk`.
    pub fn postings(&self, chunk: usize) -> Range<usize> {
        let start = (chunk * self.chunk_factor).min(self.num_postings);
        let end = (start + self.chunk_factor).min(self.num_postings);
        start..end
    }

    pub fn chunks(&self) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        (0..self.num_chunks()).map(|chunk| (chunk, self.postings(chunk)))
    }
}
