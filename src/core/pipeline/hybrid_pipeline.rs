use log::debug;
use serde::{Deserialize, Serialize};
use std::{marker::PhantomData, ops::Range};

use super::{ChunkLayout, FaultContext, FieldKind, PipelineError};
use crate::core::{ChunkStreamCodec, ChunkStreamReader, ChunkStreamWriter, DecodeError, Occurrence, Posting, PostingCorpus, StreamVarCodec, VarStream, WholeSequenceCodec};

/// How occurrence data is cut into whole sequences.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Default, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum DeltaGranularity {
    /// One sequence per posting for each occurrence field, one per occurrence for its sub-positions.
    #[default]
    #[serde(rename = "per_posting")]
    PerPosting,

    /// One sequence per chunk for each occurrence field, sub-position counts and values flattened.
    #[serde(rename = "per_chunk")]
    PerChunk,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubPositionBlock<S> {
    /// One sequence per occurrence, its length is the sub-position count.
    PerOccurrence(Vec<S>),

    Flattened { counts: S, values: S },
}

/// Occurrence fields of a group of occurrences, each field as its own sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationBlock<S> {
    pub fields: S,
    pub positions: S,
    pub starts: S,
    pub ends: S,
    pub sub_positions: SubPositionBlock<S>,
}

impl<S: WholeSequenceCodec> LocationBlock<S> {
    pub fn size_in_bytes(&self) -> usize {
        let sub_positions = match &self.sub_positions {
            SubPositionBlock::PerOccurrence(seqs) => seqs.iter().map(|s| s.size_in_bytes()).sum(),
            SubPositionBlock::Flattened { counts, values } => counts.size_in_bytes() + values.size_in_bytes(),
        };
        self.fields.size_in_bytes() + self.positions.size_in_bytes() + self.starts.size_in_bytes() + self.ends.size_in_bytes() + sub_positions
    }
}

/// One chunk of the hybrid encoding: varint frequency and norm streams plus location blocks.
#[derive(Debug, Clone)]
pub struct HybridChunk<V, S> {
    pub chunk: usize,
    pub postings: Range<usize>,
    pub freqs: Vec<u8>,
    pub norms: Vec<u8>,

    /// One block per posting for [`DeltaGranularity::PerPosting`], a single block otherwise.
    pub locations: Vec<LocationBlock<S>>,
    pub granularity: DeltaGranularity,
    _phantom: PhantomData<V>,
}

fn encode_sequence<S: WholeSequenceCodec>(values: &[u64], context: FaultContext) -> Result<S, PipelineError> {
    S::encode(values).map_err(|e| PipelineError::encode(context, e))
}

fn decode_sequence<S: WholeSequenceCodec>(seq: &S, expected: usize, context: FaultContext) -> Result<Vec<u64>, PipelineError> {
    let values = seq.decode().map_err(|e| PipelineError::decode(context, e))?;
    if values.len() != expected {
        return Err(PipelineError::decode(context, DecodeError::CountMismatch { expected, actual: values.len() }));
    }
    Ok(values)
}

/// Sums decoded occurrence counts, rejecting totals that don't fit in `usize`.
fn checked_total(counts: impl IntoIterator<Item = u64>, context: FaultContext) -> Result<usize, PipelineError> {
    counts
        .into_iter()
        .try_fold(0usize, |total, count| usize::try_from(count).ok().and_then(|count| total.checked_add(count)))
        .ok_or_else(|| PipelineError::decode(context, DecodeError::Corrupted("occurrence count overflows usize".to_string())))
}

impl<V: StreamVarCodec, S: WholeSequenceCodec> HybridChunk<V, S> {
    pub fn encode(chunk: usize, first_posting: usize, postings: &[Posting], granularity: DeltaGranularity) -> Result<Self, PipelineError> {
        let codec = VarStream::<V>::default();
        let mut freqs = codec.writer();
        let mut norms = codec.writer();
        for (i, posting) in postings.iter().enumerate() {
            let idx = first_posting + i;
            freqs.put_u64(posting.frequency).map_err(|e| PipelineError::encode(FaultContext::posting(chunk, idx, FieldKind::Frequency), e))?;
            norms.put_u32(posting.norm_bits()).map_err(|e| PipelineError::encode(FaultContext::posting(chunk, idx, FieldKind::Norm), e))?;
        }
        let freqs = freqs.finish().map_err(|e| PipelineError::encode(FaultContext::chunk(chunk, FieldKind::Frequency), e))?;
        let norms = norms.finish().map_err(|e| PipelineError::encode(FaultContext::chunk(chunk, FieldKind::Norm), e))?;

        let locations = match granularity {
            DeltaGranularity::PerPosting => {
                postings.iter().enumerate().map(|(i, posting)| Self::encode_posting_block(chunk, first_posting + i, posting)).collect::<Result<Vec<_>, _>>()?
            }
            DeltaGranularity::PerChunk => vec![Self::encode_chunk_block(chunk, postings)?],
        };
        Ok(Self { chunk, postings: first_posting..first_posting + postings.len(), freqs, norms, locations, granularity, _phantom: PhantomData })
    }

    fn encode_posting_block(chunk: usize, idx: usize, posting: &Posting) -> Result<LocationBlock<S>, PipelineError> {
        let occs = &posting.occurrences;
        let ctx = |field| FaultContext::posting(chunk, idx, field);
        let fields: Vec<u64> = occs.iter().map(|o| u64::from(o.field)).collect();
        let positions: Vec<u64> = occs.iter().map(|o| o.position).collect();
        let starts: Vec<u64> = occs.iter().map(|o| o.start).collect();
        let ends: Vec<u64> = occs.iter().map(|o| o.end).collect();
        let sub_positions = occs
            .iter()
            .enumerate()
            .map(|(j, o)| encode_sequence(&o.sub_positions, FaultContext::occurrence(chunk, idx, j, FieldKind::SubPosition)))
            .collect::<Result<Vec<S>, _>>()?;
        Ok(LocationBlock {
            fields: encode_sequence(&fields, ctx(FieldKind::Field))?,
            positions: encode_sequence(&positions, ctx(FieldKind::Position))?,
            starts: encode_sequence(&starts, ctx(FieldKind::Start))?,
            ends: encode_sequence(&ends, ctx(FieldKind::End))?,
            sub_positions: SubPositionBlock::PerOccurrence(sub_positions),
        })
    }

    fn encode_chunk_block(chunk: usize, postings: &[Posting]) -> Result<LocationBlock<S>, PipelineError> {
        let occs = || postings.iter().flat_map(|p| p.occurrences.iter());
        let ctx = |field| FaultContext::chunk(chunk, field);
        let fields: Vec<u64> = occs().map(|o| u64::from(o.field)).collect();
        let positions: Vec<u64> = occs().map(|o| o.position).collect();
        let starts: Vec<u64> = occs().map(|o| o.start).collect();
        let ends: Vec<u64> = occs().map(|o| o.end).collect();
        let counts: Vec<u64> = occs().map(|o| o.sub_positions.len() as u64).collect();
        let values: Vec<u64> = occs().flat_map(|o| o.sub_positions.iter().copied()).collect();
        Ok(LocationBlock {
            fields: encode_sequence(&fields, ctx(FieldKind::Field))?,
            positions: encode_sequence(&positions, ctx(FieldKind::Position))?,
            starts: encode_sequence(&starts, ctx(FieldKind::Start))?,
            ends: encode_sequence(&ends, ctx(FieldKind::End))?,
            sub_positions: SubPositionBlock::Flattened {
                counts: encode_sequence(&counts, ctx(FieldKind::SubPositionCount))?,
                values: encode_sequence(&values, ctx(FieldKind::SubPosition))?,
            },
        })
    }

    /// Varint stream bytes plus every sequence's `size_in_bytes`.
    pub fn footprint(&self) -> usize {
        self.freqs.len() + self.norms.len() + self.locations.iter().map(|b| b.size_in_bytes()).sum::<usize>()
    }

    /// Decodes every posting of this chunk, checking that all encoded values were consumed.
    pub fn decode_postings(&self) -> Result<Vec<Posting>, PipelineError> {
        let chunk = self.chunk;
        let codec = VarStream::<V>::default();
        let mut freqs = codec.reader(&self.freqs).map_err(|e| PipelineError::decode(FaultContext::chunk(chunk, FieldKind::Frequency), e))?;
        let mut norms = codec.reader(&self.norms).map_err(|e| PipelineError::decode(FaultContext::chunk(chunk, FieldKind::Norm), e))?;

        let mut scalars = Vec::with_capacity(self.postings.len());
        for idx in self.postings.clone() {
            let frequency = freqs.next_u64().map_err(|e| PipelineError::decode(FaultContext::posting(chunk, idx, FieldKind::Frequency), e))?;
            let norm_bits = norms.next_u32().map_err(|e| PipelineError::decode(FaultContext::posting(chunk, idx, FieldKind::Norm), e))?;
            scalars.push((frequency, norm_bits));
        }
        freqs.ensure_exhausted().map_err(|e| PipelineError::decode(FaultContext::chunk(chunk, FieldKind::Frequency), e))?;
        norms.ensure_exhausted().map_err(|e| PipelineError::decode(FaultContext::chunk(chunk, FieldKind::Norm), e))?;

        let expected_blocks = match self.granularity {
            DeltaGranularity::PerPosting => self.postings.len(),
            DeltaGranularity::PerChunk => 1,
        };
        if self.locations.len() != expected_blocks {
            let err = DecodeError::CountMismatch { expected: expected_blocks, actual: self.locations.len() };
            return Err(PipelineError::decode(FaultContext::chunk(chunk, FieldKind::LocationStream), err));
        }

        match self.granularity {
            DeltaGranularity::PerPosting => self
                .postings
                .clone()
                .zip(scalars)
                .zip(self.locations.iter())
                .map(|((idx, (frequency, norm_bits)), block)| -> Result<Posting, PipelineError> {
                    let num_occurrences = checked_total([frequency], FaultContext::posting(chunk, idx, FieldKind::Frequency))?;
                    let occurrences = Self::decode_block(block, chunk, Some(idx), num_occurrences)?;
                    Ok(Posting::new(frequency, f32::from_bits(norm_bits), occurrences))
                })
                .collect(),
            DeltaGranularity::PerChunk => {
                let total = checked_total(scalars.iter().map(|&(frequency, _)| frequency), FaultContext::chunk(chunk, FieldKind::Frequency))?;
                let mut occurrences = Self::decode_block(&self.locations[0], chunk, None, total)?.into_iter();
                Ok(scalars
                    .into_iter()
                    .map(|(frequency, norm_bits)| Posting::new(frequency, f32::from_bits(norm_bits), occurrences.by_ref().take(frequency as usize).collect()))
                    .collect())
            }
        }
    }

    fn decode_block(block: &LocationBlock<S>, chunk: usize, posting: Option<usize>, num_occurrences: usize) -> Result<Vec<Occurrence>, PipelineError> {
        let ctx = |field| FaultContext { posting, ..FaultContext::chunk(chunk, field) };
        let fields = decode_sequence(&block.fields, num_occurrences, ctx(FieldKind::Field))?;
        let positions = decode_sequence(&block.positions, num_occurrences, ctx(FieldKind::Position))?;
        let starts = decode_sequence(&block.starts, num_occurrences, ctx(FieldKind::Start))?;
        let ends = decode_sequence(&block.ends, num_occurrences, ctx(FieldKind::End))?;

        let sub_positions: Vec<Vec<u64>> = match &block.sub_positions {
            SubPositionBlock::PerOccurrence(seqs) => {
                if seqs.len() != num_occurrences {
                    let err = DecodeError::CountMismatch { expected: num_occurrences, actual: seqs.len() };
                    return Err(PipelineError::decode(ctx(FieldKind::SubPositionCount), err));
                }
                seqs.iter()
                    .enumerate()
                    .map(|(j, seq)| seq.decode().map_err(|e| PipelineError::decode(FaultContext { occurrence: Some(j), ..ctx(FieldKind::SubPosition) }, e)))
                    .collect::<Result<_, _>>()?
            }
            SubPositionBlock::Flattened { counts, values } => {
                let counts = decode_sequence(counts, num_occurrences, ctx(FieldKind::SubPositionCount))?;
                let total = checked_total(counts.iter().copied(), ctx(FieldKind::SubPositionCount))?;
                let values = decode_sequence(values, total, ctx(FieldKind::SubPosition))?;
                let mut values = values.into_iter();
                counts.iter().map(|&c| values.by_ref().take(c as usize).collect()).collect()
            }
        };

        fields
            .into_iter()
            .zip(positions)
            .zip(starts)
            .zip(ends)
            .zip(sub_positions)
            .enumerate()
            .map(|(j, ((((field, position), start), end), sub_positions))| -> Result<Occurrence, PipelineError> {
                let field = u16::try_from(field)
                    .map_err(|_| PipelineError::decode(FaultContext { occurrence: Some(j), ..ctx(FieldKind::Field) }, DecodeError::Corrupted(format!("field id {} exceeds u16", field))))?;
                Ok(Occurrence::new(field, position, start, end, sub_positions))
            })
            .collect()
    }
}

/// Output of one hybrid pipeline pass.
#[derive(Debug, Clone)]
pub struct HybridChunks<V, S> {
    layout: ChunkLayout,
    chunks: Vec<HybridChunk<V, S>>,
}

impl<V: StreamVarCodec, S: WholeSequenceCodec> HybridChunks<V, S> {
    pub fn codec_name() -> String {
        format!("{}_{}", V::NAME, S::NAME)
    }

    pub fn encode_corpus(corpus: &PostingCorpus, chunk_factor: usize, granularity: DeltaGranularity) -> Result<Self, PipelineError> {
        let layout = ChunkLayout::new(corpus.len(), chunk_factor)?;
        let chunks = layout
            .chunks()
            .map(|(chunk, range)| -> Result<HybridChunk<V, S>, PipelineError> {
                let encoded = HybridChunk::encode(chunk, range.start, corpus.slice(range.clone()), granularity)?;
                debug!("[HybridChunks] `{}` encoded chunk {} ({:?}), {} bytes", Self::codec_name(), chunk, range, encoded.footprint());
                Ok(encoded)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { layout, chunks })
    }

    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    pub fn chunks(&self) -> &[HybridChunk<V, S>] {
        &self.chunks
    }

    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn footprint(&self) -> usize {
        self.chunks.iter().map(|c| c.footprint()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{DeltaGranularity, HybridChunk, HybridChunks, SubPositionBlock};
    use common::serialize_vint_u64;
    use crate::core::{
        Base128Codec, CorpusFixture, DecodeError, DeltaPackedSequence, FieldKind, FixtureBounds, Occurrence, PipelineError, Posting, PostingCorpus, WholeSequenceCodec,
        LARGE_SCENARIO_DOC_IDS, SMALL_SCENARIO_DOC_IDS,
    };

    type Hybrid = HybridChunks<Base128Codec, DeltaPackedSequence>;

    fn small_corpus() -> PostingCorpus {
        PostingCorpus::new(vec![
            Posting::new(2, -0.0, vec![Occurrence::new(4, 10, 100, 104, vec![3, 1, 2]), Occurrence::new(2, 9, 90, 95, vec![])]),
            Posting::new(0, f32::NAN, vec![]),
            Posting::new(1, 0.5, vec![Occurrence::new(7, 1 << 32, 0, 7, vec![9])]),
        ])
        .unwrap()
    }

    fn inner_test_hybrid_round_trip(corpus: &PostingCorpus, chunk_factor: usize, granularity: DeltaGranularity) {
        let hybrid = Hybrid::encode_corpus(corpus, chunk_factor, granularity).unwrap();
        assert_eq!(hybrid.num_chunks(), corpus.len().div_ceil(chunk_factor));
        let mut decoded = vec![];
        for chunk in hybrid.chunks() {
            decoded.extend(chunk.decode_postings().unwrap());
        }
        assert_eq!(decoded, corpus.postings());
        assert_eq!(hybrid.footprint(), hybrid.chunks().iter().map(|c| c.footprint()).sum::<usize>());
    }

    #[test]
    fn test_hybrid_round_trip() {
        let large = CorpusFixture::builder().doc_ids(&LARGE_SCENARIO_DOC_IDS).seed(5).build().build().unwrap();
        let small = CorpusFixture::builder().doc_ids(&SMALL_SCENARIO_DOC_IDS).seed(5).bounds(FixtureBounds::small()).build().build().unwrap();
        for granularity in [DeltaGranularity::PerPosting, DeltaGranularity::PerChunk] {
            inner_test_hybrid_round_trip(&small_corpus(), 2, granularity);
            inner_test_hybrid_round_trip(&large, 5, granularity);
            inner_test_hybrid_round_trip(&small, 5, granularity);
        }
    }

    #[test]
    fn test_hybrid_block_shape() {
        let corpus = small_corpus();
        let per_posting = Hybrid::encode_corpus(&corpus, 5, DeltaGranularity::PerPosting).unwrap();
        let chunk = &per_posting.chunks()[0];
        assert_eq!(chunk.locations.len(), 3);
        match &chunk.locations[0].sub_positions {
            SubPositionBlock::PerOccurrence(seqs) => assert_eq!(seqs.len(), 2),
            other => panic!("unexpected block: {:?}", other),
        }

        let per_chunk = Hybrid::encode_corpus(&corpus, 5, DeltaGranularity::PerChunk).unwrap();
        assert_eq!(per_chunk.chunks()[0].locations.len(), 1);
        assert!(matches!(per_chunk.chunks()[0].locations[0].sub_positions, SubPositionBlock::Flattened { .. }));
    }

    #[test]
    fn test_hybrid_codec_name() {
        assert_eq!(Hybrid::codec_name(), "base128_varint_delta_packed");
    }

    #[test]
    fn test_hybrid_detects_count_mismatch() {
        let corpus = small_corpus();
        let mut chunk = HybridChunk::<Base128Codec, DeltaPackedSequence>::encode(0, 0, corpus.postings(), DeltaGranularity::PerPosting).unwrap();
        chunk.locations[0].positions = DeltaPackedSequence::encode(&[10]).unwrap();
        match chunk.decode_postings() {
            Err(PipelineError::Decode { context, source: DecodeError::CountMismatch { expected: 2, actual: 1 } }) => {
                assert_eq!(context.posting, Some(0));
                assert_eq!(context.field, FieldKind::Position);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_hybrid_rejects_overflowing_frequencies() {
        let corpus = PostingCorpus::new(vec![Posting::new(0, 1.0, vec![]), Posting::new(0, 2.0, vec![])]).unwrap();
        let mut chunk = HybridChunk::<Base128Codec, DeltaPackedSequence>::encode(0, 0, corpus.postings(), DeltaGranularity::PerChunk).unwrap();
        chunk.freqs.clear();
        serialize_vint_u64(u64::MAX, &mut chunk.freqs);
        serialize_vint_u64(u64::MAX, &mut chunk.freqs);
        match chunk.decode_postings() {
            Err(PipelineError::Decode { context, source: DecodeError::Corrupted(_) }) => {
                assert_eq!(context.posting, None);
                assert_eq!(context.field, FieldKind::Frequency);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_hybrid_rejects_overflowing_sub_position_counts() {
        let corpus = small_corpus();
        let mut chunk = HybridChunk::<Base128Codec, DeltaPackedSequence>::encode(0, 0, corpus.postings(), DeltaGranularity::PerChunk).unwrap();
        let counts = DeltaPackedSequence::encode(&[u64::MAX, u64::MAX, 1]).unwrap();
        let values = DeltaPackedSequence::encode(&[]).unwrap();
        chunk.locations[0].sub_positions = SubPositionBlock::Flattened { counts, values };
        match chunk.decode_postings() {
            Err(PipelineError::Decode { context, source: DecodeError::Corrupted(_) }) => assert_eq!(context.field, FieldKind::SubPositionCount),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_hybrid_detects_missing_location_block() {
        let corpus = small_corpus();
        let mut chunk = HybridChunk::<Base128Codec, DeltaPackedSequence>::encode(0, 0, corpus.postings(), DeltaGranularity::PerPosting).unwrap();
        chunk.locations.pop();
        match chunk.decode_postings() {
            Err(PipelineError::Decode { context, source: DecodeError::CountMismatch { expected: 3, actual: 2 } }) => assert_eq!(context.field, FieldKind::LocationStream),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_hybrid_detects_trailing_frequency() {
        let corpus = small_corpus();
        let mut chunk = HybridChunk::<Base128Codec, DeltaPackedSequence>::encode(0, 0, corpus.postings(), DeltaGranularity::PerChunk).unwrap();
        chunk.freqs.push(1);
        assert!(matches!(chunk.decode_postings(), Err(PipelineError::Decode { source: DecodeError::TrailingData, .. })));
    }
}
