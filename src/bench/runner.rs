use log::info;
use std::time::Instant;

use super::{BenchConfig, CodecKind};
use crate::common::BenchError;
use crate::core::{
    verify_hybrid_chunks, verify_stream_chunks, Base128Codec, ChunkStreamCodec, CorpusFixture, DeltaPackedSequence, EncodingReport, HybridChunks, PackedStream,
    PostingCorpus, Simple8bCodec, StreamChunkEncoder, StreamVarCodec, VarStream, WholeSequenceCodec,
};

/// Runs the configured codecs over one generated corpus.
pub struct BenchRunner<'a> {
    config: &'a BenchConfig,
    corpus: PostingCorpus,
}

impl<'a> BenchRunner<'a> {
    pub fn new(config: &'a BenchConfig) -> Result<Self, BenchError> {
        config.validate()?;
        let corpus = CorpusFixture::builder().doc_ids(config.scenario.doc_ids()).seed(config.seed).bounds(config.scenario.bounds()).build().build()?;
        info!(
            "[BenchRunner] scenario {:?}: {} postings, {} occurrences, raw footprint {} bytes, chunk_factor {}",
            config.scenario,
            corpus.len(),
            corpus.total_occurrences(),
            corpus.raw_footprint(),
            config.chunk_factor
        );
        Ok(Self { config, corpus })
    }

    /// Builds the corpus once and runs every configured codec on it.
    pub fn run(config: &BenchConfig) -> Result<Vec<EncodingReport>, BenchError> {
        let runner = BenchRunner::new(config)?;
        config.codecs.iter().map(|&kind| runner.run_codec(kind)).collect()
    }

    pub fn corpus(&self) -> &PostingCorpus {
        &self.corpus
    }

    pub fn run_codec(&self, kind: CodecKind) -> Result<EncodingReport, BenchError> {
        let report = match kind {
            CodecKind::Base128Varint => self.run_stream::<VarStream<Base128Codec>>(),
            CodecKind::Simple8b => self.run_stream::<PackedStream<Simple8bCodec>>(),
            CodecKind::Base128VarintDeltaPacked => self.run_hybrid::<Base128Codec, DeltaPackedSequence>(),
        }?;
        for line in report.to_string().lines() {
            info!("{}", line);
        }
        Ok(report)
    }

    fn run_stream<C: ChunkStreamCodec>(&self) -> Result<EncodingReport, BenchError> {
        let start = Instant::now();
        let streams = StreamChunkEncoder::encode_corpus(C::default(), &self.corpus, self.config.chunk_factor).map_err(BenchError::from_pipeline)?;
        let elapsed = start.elapsed();

        if self.config.verify {
            verify_stream_chunks(&C::default(), &self.corpus, &streams).map_err(BenchError::from_pipeline)?;
        }
        Ok(EncodingReport {
            codec: C::NAME.to_string(),
            num_postings: self.corpus.len(),
            num_chunks: streams.num_chunks(),
            raw_footprint: self.corpus.raw_footprint(),
            encoded_footprint: streams.footprint(),
            elapsed,
            verified: self.config.verify,
        })
    }

    fn run_hybrid<V: StreamVarCodec, S: WholeSequenceCodec>(&self) -> Result<EncodingReport, BenchError> {
        let start = Instant::now();
        let hybrid = HybridChunks::<V, S>::encode_corpus(&self.corpus, self.config.chunk_factor, self.config.delta_granularity).map_err(BenchError::from_pipeline)?;
        let elapsed = start.elapsed();

        if self.config.verify {
            verify_hybrid_chunks(&self.corpus, &hybrid).map_err(BenchError::from_pipeline)?;
        }
        Ok(EncodingReport {
            codec: HybridChunks::<V, S>::codec_name(),
            num_postings: self.corpus.len(),
            num_chunks: hybrid.num_chunks(),
            raw_footprint: self.corpus.raw_footprint(),
            encoded_footprint: hybrid.footprint(),
            elapsed,
            verified: self.config.verify,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::BenchRunner;
    use crate::bench::{BenchConfig, CodecKind, ScenarioKind};
    use crate::common::{init_test_logger, BenchError};
    use crate::core::DeltaGranularity;

    #[test]
    fn test_run_large_scenario() {
        init_test_logger();
        let config = BenchConfig::default();
        let reports = BenchRunner::run(&config).unwrap();
        assert_eq!(reports.len(), 3);
        let names: Vec<&str> = reports.iter().map(|r| r.codec.as_str()).collect();
        assert_eq!(names, vec!["base128_varint", "simple8b", "base128_varint_delta_packed"]);
        for report in &reports {
            assert_eq!(report.num_postings, 35);
            assert_eq!(report.num_chunks, 7);
            assert!(report.verified);
            assert_eq!(report.raw_footprint, reports[0].raw_footprint);
        }
    }

    #[test]
    fn test_small_values_shrink() {
        init_test_logger();
        for granularity in [DeltaGranularity::PerPosting, DeltaGranularity::PerChunk] {
            let config = BenchConfig { scenario: ScenarioKind::Small, delta_granularity: granularity, ..BenchConfig::default() };
            for report in BenchRunner::run(&config).unwrap() {
                assert!(report.encoded_footprint < report.raw_footprint, "{}", report);
                assert!(report.reduction_pct() > 0.0);
            }
        }
    }

    #[test]
    fn test_simple8b_beats_raw_on_large_scenario() {
        init_test_logger();
        let config = BenchConfig { codecs: vec![CodecKind::Simple8b], ..BenchConfig::default() };
        let report = BenchRunner::run(&config).unwrap().remove(0);
        assert!(report.encoded_footprint < report.raw_footprint);
    }

    #[test]
    fn test_run_rejects_invalid_config() {
        let config = BenchConfig { chunk_factor: 0, ..BenchConfig::default() };
        assert!(matches!(BenchRunner::run(&config), Err(BenchError::InvalidConfig(_))));
    }

    #[test]
    fn test_chunk_factor_changes_layout() {
        let config = BenchConfig { chunk_factor: 4, codecs: vec![CodecKind::Base128Varint], ..BenchConfig::default() };
        let runner = BenchRunner::new(&config).unwrap();
        let report = runner.run_codec(CodecKind::Base128Varint).unwrap();
        assert_eq!(report.num_chunks, 9);
        assert_eq!(runner.corpus().len(), 35);
    }
}
