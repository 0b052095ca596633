use super::{EncodedChunk, FaultContext, FieldKind, PipelineError};
use crate::core::{ChunkStreamCodec, ChunkStreamReader, DecodeError, Occurrence, Posting};

/// Reads postings back out of one [`EncodedChunk`].
///
/// The scalar stream is read first for every posting, its frequency then decides how many
/// occurrence records are pulled from the location stream.
pub struct ChunkDecoder<'a, C: ChunkStreamCodec> {
    chunk: &'a EncodedChunk,
    next_posting: usize,
    scalar: C::Reader<'a>,
    location: C::Reader<'a>,
}

impl<'a, C: ChunkStreamCodec> ChunkDecoder<'a, C> {
    pub fn open(codec: &C, chunk: &'a EncodedChunk) -> Result<Self, PipelineError> {
        let scalar = codec.reader(&chunk.scalar).map_err(|e| PipelineError::decode(FaultContext::chunk(chunk.chunk, FieldKind::ScalarStream), e))?;
        let location = codec.reader(&chunk.location).map_err(|e| PipelineError::decode(FaultContext::chunk(chunk.chunk, FieldKind::LocationStream), e))?;
        Ok(Self { chunk, next_posting: chunk.postings.start, scalar, location })
    }

    /// Returns `None` once every posting of the chunk was read.
    pub fn next_posting(&mut self) -> Result<Option<Posting>, PipelineError> {
        let idx = self.next_posting;
        if idx >= self.chunk.postings.end {
            return Ok(None);
        }
        let chunk = self.chunk.chunk;
        let frequency = self.scalar.next_u64().map_err(|e| PipelineError::decode(FaultContext::posting(chunk, idx, FieldKind::Frequency), e))?;
        let norm_bits = self.scalar.next_u32().map_err(|e| PipelineError::decode(FaultContext::posting(chunk, idx, FieldKind::Norm), e))?;

        let mut occurrences = Vec::new();
        for j in 0..frequency as usize {
            occurrences.push(self.next_occurrence(idx, j)?);
        }
        self.next_posting += 1;
        Ok(Some(Posting::new(frequency, f32::from_bits(norm_bits), occurrences)))
    }

    fn next_occurrence(&mut self, idx: usize, j: usize) -> Result<Occurrence, PipelineError> {
        let chunk = self.chunk.chunk;
        let loc = &mut self.location;
        let mut read = |field: FieldKind| loc.next_u64().map_err(|e| PipelineError::decode(FaultContext::occurrence(chunk, idx, j, field), e));

        let field_id = read(FieldKind::Field)?;
        let field = u16::try_from(field_id)
            .map_err(|_| PipelineError::decode(FaultContext::occurrence(chunk, idx, j, FieldKind::Field), DecodeError::Corrupted(format!("field id {} exceeds u16", field_id))))?;
        let position = read(FieldKind::Position)?;
        let start = read(FieldKind::Start)?;
        let end = read(FieldKind::End)?;
        let count = read(FieldKind::SubPositionCount)?;

        let mut sub_positions = Vec::new();
        for k in 0..count as usize {
            let sp = loc
                .next_u64()
                .map_err(|e| PipelineError::decode(FaultContext::occurrence(chunk, idx, j, FieldKind::SubPosition).with_sub_position(k), e))?;
            sub_positions.push(sp);
        }
        Ok(Occurrence::new(field, position, start, end, sub_positions))
    }

    /// Checks that every posting was read and both streams are fully consumed.
    pub fn finish(mut self) -> Result<(), PipelineError> {
        let chunk = self.chunk.chunk;
        if self.next_posting != self.chunk.postings.end {
            let err = DecodeError::CountMismatch { expected: self.chunk.postings.len(), actual: self.next_posting - self.chunk.postings.start };
            return Err(PipelineError::decode(FaultContext::chunk(chunk, FieldKind::Frequency), err));
        }
        self.scalar.ensure_exhausted().map_err(|e| PipelineError::decode(FaultContext::chunk(chunk, FieldKind::ScalarStream), e))?;
        self.location.ensure_exhausted().map_err(|e| PipelineError::decode(FaultContext::chunk(chunk, FieldKind::LocationStream), e))?;
        Ok(())
    }
}

#[cfg(test)]
#[generic_tests::define]
mod tests {
    use super::ChunkDecoder;
    use crate::core::{
        Base128Codec, ChunkStreamCodec, ChunkStreamWriter, DecodeError, EncodedChunk, FieldKind, Occurrence, PackedStream, PipelineError, Posting, PostingCorpus,
        Simple8bCodec, StreamChunkEncoder, VarStream,
    };

    #[instantiate_tests(<VarStream<Base128Codec>>)]
    mod base128 {}

    #[instantiate_tests(<PackedStream<Simple8bCodec>>)]
    mod simple8b {}

    fn lockstep_corpus() -> PostingCorpus {
        PostingCorpus::new(vec![
            Posting::new(2, 0.5, vec![Occurrence::new(1, 10, 100, 104, vec![3, 4]), Occurrence::new(2, 11, 110, 115, vec![])]),
            Posting::new(0, 0.25, vec![]),
            Posting::new(1, 1.0, vec![Occurrence::new(7, 1 << 32, 0, (1 << 60) - 1, vec![9])]),
        ])
        .unwrap()
    }

    #[test]
    fn test_lockstep_decode<C: ChunkStreamCodec>() {
        let corpus = lockstep_corpus();
        let codec = C::default();
        let streams = StreamChunkEncoder::encode_corpus(C::default(), &corpus, 5).unwrap();
        assert_eq!(streams.num_chunks(), 1);

        let mut decoder = ChunkDecoder::open(&codec, &streams.chunks()[0]).unwrap();
        let mut decoded = vec![];
        while let Some(posting) = decoder.next_posting().unwrap() {
            decoded.push(posting);
        }
        decoder.finish().unwrap();
        assert_eq!(decoded, corpus.postings());
    }

    #[test]
    fn test_float_bit_exactness<C: ChunkStreamCodec>() {
        let norms = [0.0f32, -0.0, f32::NAN, f32::from_bits(0x7FC0_1234), f32::from_bits(1), f32::MIN_POSITIVE / 2.0, 1.0, f32::INFINITY];
        let corpus = PostingCorpus::new(norms.iter().map(|&n| Posting::new(0, n, vec![])).collect()).unwrap();
        let codec = C::default();
        let streams = StreamChunkEncoder::encode_corpus(C::default(), &corpus, 3).unwrap();

        let mut decoded_bits = vec![];
        for chunk in streams.chunks() {
            let mut decoder = ChunkDecoder::open(&codec, chunk).unwrap();
            while let Some(posting) = decoder.next_posting().unwrap() {
                decoded_bits.push(posting.norm.to_bits());
            }
            decoder.finish().unwrap();
        }
        assert_eq!(decoded_bits, norms.iter().map(|n| n.to_bits()).collect::<Vec<_>>());
    }

    fn encode_locations<C: ChunkStreamCodec>(codec: &C, postings: &[Posting], trailing: &[u64]) -> Vec<u8> {
        let mut writer = codec.writer();
        for occ in postings.iter().flat_map(|p| p.occurrences.iter()) {
            for value in [u64::from(occ.field), occ.position, occ.start, occ.end, occ.sub_positions.len() as u64] {
                writer.put_u64(value).unwrap();
            }
            for &sp in &occ.sub_positions {
                writer.put_u64(sp).unwrap();
            }
        }
        for &value in trailing {
            writer.put_u64(value).unwrap();
        }
        writer.finish().unwrap()
    }

    #[test]
    fn test_trailing_location_values<C: ChunkStreamCodec>() {
        let corpus = lockstep_corpus();
        let codec = C::default();
        let streams = StreamChunkEncoder::encode_corpus(C::default(), &corpus, 5).unwrap();
        assert_eq!(encode_locations(&codec, corpus.postings(), &[]), streams.chunks()[0].location);

        let chunk = EncodedChunk { location: encode_locations(&codec, corpus.postings(), &[42]), ..streams.chunks()[0].clone() };
        let mut decoder = ChunkDecoder::open(&codec, &chunk).unwrap();
        while decoder.next_posting().unwrap().is_some() {}
        match decoder.finish() {
            Err(PipelineError::Decode { context, source: DecodeError::TrailingData }) => {
                assert_eq!(context.field, FieldKind::LocationStream);
                assert_eq!(context.posting, None);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_trailing_scalar_values<C: ChunkStreamCodec>() {
        let corpus = lockstep_corpus();
        let codec = C::default();
        let streams = StreamChunkEncoder::encode_corpus(C::default(), &corpus, 5).unwrap();
        let mut writer = codec.writer();
        for posting in corpus.postings() {
            writer.put_u64(posting.frequency).unwrap();
            writer.put_u32(posting.norm_bits()).unwrap();
        }
        writer.put_u64(7).unwrap();
        let chunk = EncodedChunk { scalar: writer.finish().unwrap(), ..streams.chunks()[0].clone() };

        let mut decoder = ChunkDecoder::open(&codec, &chunk).unwrap();
        while decoder.next_posting().unwrap().is_some() {}
        match decoder.finish() {
            Err(PipelineError::Decode { context, source: DecodeError::TrailingData }) => assert_eq!(context.field, FieldKind::ScalarStream),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_truncated_location<C: ChunkStreamCodec>() {
        let corpus = lockstep_corpus();
        let codec = C::default();
        let streams = StreamChunkEncoder::encode_corpus(C::default(), &corpus, 5).unwrap();
        let chunk = EncodedChunk { location: codec.writer().finish().unwrap(), ..streams.chunks()[0].clone() };

        let mut decoder = ChunkDecoder::open(&codec, &chunk).unwrap();
        match decoder.next_posting() {
            Err(PipelineError::Decode { context, source: DecodeError::Truncated }) => {
                assert_eq!(context.posting, Some(0));
                assert_eq!(context.occurrence, Some(0));
                assert_eq!(context.field, FieldKind::Field);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_finish_before_last_posting<C: ChunkStreamCodec>() {
        let corpus = lockstep_corpus();
        let codec = C::default();
        let streams = StreamChunkEncoder::encode_corpus(C::default(), &corpus, 5).unwrap();
        let mut decoder = ChunkDecoder::open(&codec, &streams.chunks()[0]).unwrap();
        decoder.next_posting().unwrap();
        assert!(matches!(decoder.finish(), Err(PipelineError::Decode { source: DecodeError::CountMismatch { expected: 3, actual: 1 }, .. })));
    }
}
