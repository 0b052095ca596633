use itertools::{EitherOrBoth, Itertools};
use log::info;

use crate::core::{
    ChunkDecoder, ChunkStreamCodec, ChunkedStreams, DecodeError, FaultContext, FieldKind, HybridChunks, PipelineError, Posting, PostingCorpus, StreamVarCodec,
    WholeSequenceCodec,
};

fn check(expected: u64, actual: u64, context: FaultContext) -> Result<(), PipelineError> {
    match expected == actual {
        true => Ok(()),
        false => Err(PipelineError::decode(context, DecodeError::ValueMismatch { expected, actual })),
    }
}

/// Compares a decoded posting with its source, norms by bit pattern.
pub fn compare_posting(chunk: usize, idx: usize, expected: &Posting, actual: &Posting) -> Result<(), PipelineError> {
    check(expected.frequency, actual.frequency, FaultContext::posting(chunk, idx, FieldKind::Frequency))?;
    check(u64::from(expected.norm_bits()), u64::from(actual.norm_bits()), FaultContext::posting(chunk, idx, FieldKind::Norm))?;

    for (j, pair) in expected.occurrences.iter().zip_longest(actual.occurrences.iter()).enumerate() {
        let (exp, act) = match pair {
            EitherOrBoth::Both(exp, act) => (exp, act),
            _ => {
                let err = DecodeError::CountMismatch { expected: expected.occurrences.len(), actual: actual.occurrences.len() };
                return Err(PipelineError::decode(FaultContext::occurrence(chunk, idx, j, FieldKind::Field), err));
            }
        };
        let ctx = |field| FaultContext::occurrence(chunk, idx, j, field);
        check(u64::from(exp.field), u64::from(act.field), ctx(FieldKind::Field))?;
        check(exp.position, act.position, ctx(FieldKind::Position))?;
        check(exp.start, act.start, ctx(FieldKind::Start))?;
        check(exp.end, act.end, ctx(FieldKind::End))?;
        check(exp.sub_positions.len() as u64, act.sub_positions.len() as u64, ctx(FieldKind::SubPositionCount))?;
        for (k, (&e, &a)) in exp.sub_positions.iter().zip(act.sub_positions.iter()).enumerate() {
            check(e, a, ctx(FieldKind::SubPosition).with_sub_position(k))?;
        }
    }
    Ok(())
}

fn compare_chunk(chunk: usize, expected: &[Posting], first_posting: usize, decoded: Vec<Posting>) -> Result<(), PipelineError> {
    for (i, pair) in expected.iter().zip_longest(decoded.iter()).enumerate() {
        match pair {
            EitherOrBoth::Both(exp, act) => compare_posting(chunk, first_posting + i, exp, act)?,
            _ => {
                let err = DecodeError::CountMismatch { expected: expected.len(), actual: decoded.len() };
                return Err(PipelineError::decode(FaultContext::chunk(chunk, FieldKind::Frequency), err));
            }
        }
    }
    Ok(())
}

fn check_chunk_count(expected: usize, actual: usize) -> Result<(), PipelineError> {
    if expected != actual {
        return Err(PipelineError::decode(FaultContext::chunk(expected.min(actual), FieldKind::Frequency), DecodeError::CountMismatch { expected, actual }));
    }
    Ok(())
}

/// Decodes every chunk of a stream pipeline pass and compares it with the corpus.
pub fn verify_stream_chunks<C: ChunkStreamCodec>(codec: &C, corpus: &PostingCorpus, streams: &ChunkedStreams) -> Result<(), PipelineError> {
    check_chunk_count(streams.layout().num_chunks(), streams.num_chunks())?;
    for encoded in streams.chunks() {
        let mut decoder = ChunkDecoder::open(codec, encoded)?;
        let mut decoded = Vec::with_capacity(encoded.postings.len());
        while let Some(posting) = decoder.next_posting()? {
            decoded.push(posting);
        }
        decoder.finish()?;
        let expected = corpus.postings().get(encoded.postings.clone()).unwrap_or_default();
        compare_chunk(encoded.chunk, expected, encoded.postings.start, decoded)?;
    }
    info!("[Verify] `{}` decoded {} postings in {} chunks", C::NAME, corpus.len(), streams.num_chunks());
    Ok(())
}

/// Same as [`verify_stream_chunks`] for the hybrid encoding.
pub fn verify_hybrid_chunks<V: StreamVarCodec, S: WholeSequenceCodec>(corpus: &PostingCorpus, hybrid: &HybridChunks<V, S>) -> Result<(), PipelineError> {
    check_chunk_count(hybrid.layout().num_chunks(), hybrid.num_chunks())?;
    for encoded in hybrid.chunks() {
        let decoded = encoded.decode_postings()?;
        let expected = corpus.postings().get(encoded.postings.clone()).unwrap_or_default();
        compare_chunk(encoded.chunk, expected, encoded.postings.start, decoded)?;
    }
    info!("[Verify] `{}` decoded {} postings in {} chunks", HybridChunks::<V, S>::codec_name(), corpus.len(), hybrid.num_chunks());
    Ok(())
}
