use log::{debug, error};
use std::ops::Range;

use super::{ChunkLayout, FaultContext, FieldKind, PipelineError};
use crate::core::{ChunkStreamCodec, ChunkStreamWriter, Posting, PostingCorpus};

/// Finalized streams of one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChunk {
    pub chunk: usize,

    /// Corpus-wide indexes of the postings held by this chunk.
    pub postings: Range<usize>,

    /// `(frequency, norm bits)` per posting.
    pub scalar: Vec<u8>,

    /// Occurrence records, no count prefix.
    pub location: Vec<u8>,
}

impl EncodedChunk {
    pub fn footprint(&self) -> usize {
        self.scalar.len() + self.location.len()
    }
}

/// Output of one stream pipeline pass.
#[derive(Debug, Clone)]
pub struct ChunkedStreams {
    codec: &'static str,
    layout: ChunkLayout,
    chunks: Vec<EncodedChunk>,
}

impl ChunkedStreams {
    pub fn codec_name(&self) -> &'static str {
        self.codec
    }

    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    pub fn chunks(&self) -> &[EncodedChunk] {
        &self.chunks
    }

    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Sum of every stream's encoded length.
    pub fn footprint(&self) -> usize {
        self.chunks.iter().map(|c| c.footprint()).sum()
    }
}

struct ActiveChunk<W: ChunkStreamWriter> {
    chunk: usize,
    start: usize,
    scalar: W,
    location: W,
}

/// Feeds postings in order into one scalar and one location stream per chunk.
///
/// Writers of a chunk are opened when its first posting arrives and finished when the
/// next chunk starts or in [`StreamChunkEncoder::finish`].
pub struct StreamChunkEncoder<C: ChunkStreamCodec> {
    codec: C,
    layout: ChunkLayout,
    next_posting: usize,
    active: Option<ActiveChunk<C::Writer>>,
    chunks: Vec<EncodedChunk>,
}

impl<C: ChunkStreamCodec> StreamChunkEncoder<C> {
    pub fn new(codec: C, layout: ChunkLayout) -> Self {
        Self { codec, layout, next_posting: 0, active: None, chunks: Vec::with_capacity(layout.num_chunks()) }
    }

    /// Encodes the whole corpus in one pass.
    pub fn encode_corpus(codec: C, corpus: &PostingCorpus, chunk_factor: usize) -> Result<ChunkedStreams, PipelineError> {
        let layout = ChunkLayout::new(corpus.len(), chunk_factor)?;
        let mut encoder = Self::new(codec, layout);
        for posting in corpus.postings() {
            encoder.add(posting)?;
        }
        encoder.finish()
    }

    pub fn add(&mut self, posting: &Posting) -> Result<(), PipelineError> {
        let idx = self.next_posting;
        if idx >= self.layout.num_postings() {
            let error_msg = format!("[StreamChunkEncoder] posting {} is beyond the layout of {} postings", idx, self.layout.num_postings());
            error!("{}", error_msg);
            return Err(PipelineError::InvalidParameter(error_msg));
        }
        let chunk = self.layout.chunk_of(idx);
        if self.active.as_ref().is_some_and(|a| a.chunk != chunk) {
            self.close_active()?;
        }
        let codec = &self.codec;
        let active = self.active.get_or_insert_with(|| {
            debug!("[StreamChunkEncoder] `{}` opening chunk {} at posting {}", C::NAME, chunk, idx);
            ActiveChunk { chunk, start: idx, scalar: codec.writer(), location: codec.writer() }
        });
        Self::write_posting(active, idx, posting)?;
        self.next_posting += 1;
        Ok(())
    }

    fn write_posting(active: &mut ActiveChunk<C::Writer>, idx: usize, posting: &Posting) -> Result<(), PipelineError> {
        let chunk = active.chunk;
        active.scalar.put_u64(posting.frequency).map_err(|e| PipelineError::encode(FaultContext::posting(chunk, idx, FieldKind::Frequency), e))?;
        active.scalar.put_u32(posting.norm_bits()).map_err(|e| PipelineError::encode(FaultContext::posting(chunk, idx, FieldKind::Norm), e))?;

        let loc = &mut active.location;
        for (j, occ) in posting.occurrences.iter().enumerate() {
            let header = [
                (FieldKind::Field, u64::from(occ.field)),
                (FieldKind::Position, occ.position),
                (FieldKind::Start, occ.start),
                (FieldKind::End, occ.end),
                (FieldKind::SubPositionCount, occ.sub_positions.len() as u64),
            ];
            for (field, value) in header {
                loc.put_u64(value).map_err(|e| PipelineError::encode(FaultContext::occurrence(chunk, idx, j, field), e))?;
            }
            for (k, &sp) in occ.sub_positions.iter().enumerate() {
                loc.put_u64(sp)
                    .map_err(|e| PipelineError::encode(FaultContext::occurrence(chunk, idx, j, FieldKind::SubPosition).with_sub_position(k), e))?;
            }
        }
        Ok(())
    }

    fn close_active(&mut self) -> Result<(), PipelineError> {
        let Some(active) = self.active.take() else {
            return Ok(());
        };
        let postings = active.start..self.next_posting;
        let scalar = active.scalar.finish().map_err(|e| PipelineError::encode(FaultContext::chunk(active.chunk, FieldKind::ScalarStream), e))?;
        let location = active.location.finish().map_err(|e| PipelineError::encode(FaultContext::chunk(active.chunk, FieldKind::LocationStream), e))?;
        debug!("[StreamChunkEncoder] `{}` closed chunk {} ({:?}), scalar: {} bytes, location: {} bytes", C::NAME, active.chunk, postings, scalar.len(), location.len());
        self.chunks.push(EncodedChunk { chunk: active.chunk, postings, scalar, location });
        Ok(())
    }

    /// Finishes the last open chunk. Fails if fewer postings than the layout expects were added.
    pub fn finish(mut self) -> Result<ChunkedStreams, PipelineError> {
        if self.next_posting != self.layout.num_postings() {
            let error_msg = format!("[StreamChunkEncoder] only {} of {} postings were added", self.next_posting, self.layout.num_postings());
            error!("{}", error_msg);
            return Err(PipelineError::InvalidParameter(error_msg));
        }
        self.close_active()?;
        Ok(ChunkedStreams { codec: C::NAME, layout: self.layout, chunks: self.chunks })
    }
}
