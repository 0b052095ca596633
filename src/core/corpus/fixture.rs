use log::{debug, error};
use rand::{rngs::StdRng, Rng, SeedableRng};
use typed_builder::TypedBuilder;

use super::{CorpusError, Occurrence, Posting, PostingCorpus};

/// Doc id seeds of the large scenario, only their count drives the corpus size.
pub const LARGE_SCENARIO_DOC_IDS: [u64; 35] = [
    1400, 1592, 1946, 2000, 2239, 34, 556, 600, 1234, 1270, 4780, 5290, 6992, 7000, 8262, 29590, 39200, 59109, 82693, 100351, 2500, 2501, 2503, 3991, 4728, 13892, 15001, 15002,
    18269, 28651, 9618, 9762, 9872, 10021, 10245,
];

pub const SMALL_SCENARIO_DOC_IDS: [u64; 15] = [280, 105, 215, 690, 240, 578, 101, 320, 755, 325, 375, 480, 260, 218, 290];

/// Exclusive upper bounds of the generated values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureBounds {
    pub frequency: u64,
    pub field: u16,
    pub offset: u64,
    pub sub_position_count: usize,
    pub sub_position: u64,
}

impl FixtureBounds {
    pub fn large() -> Self {
        Self { frequency: 1000, field: 100, offset: 1000, sub_position_count: 25, sub_position: 1000 }
    }

    pub fn small() -> Self {
        Self { frequency: 100, field: 100, offset: 100, sub_position_count: 10, sub_position: 100 }
    }

    fn validate(&self) -> Result<(), CorpusError> {
        if self.field == 0 || self.offset == 0 || self.sub_position == 0 {
            let error_msg = format!("[CorpusFixture] field, offset and sub-position bounds must be positive, got {:?}", self);
            error!("{}", error_msg);
            return Err(CorpusError::InvalidParameter(error_msg));
        }
        Ok(())
    }
}

impl Default for FixtureBounds {
    fn default() -> Self {
        Self::large()
    }
}

/// Deterministic posting generator, the same seed always yields the same corpus.
#[derive(TypedBuilder)]
pub struct CorpusFixture<'a> {
    /// One posting is generated per doc id.
    doc_ids: &'a [u64],

    #[builder(default = 0)]
    seed: u64,

    #[builder(default)]
    bounds: FixtureBounds,
}

impl<'a> CorpusFixture<'a> {
    pub fn build(&self) -> Result<PostingCorpus, CorpusError> {
        self.bounds.validate()?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let bounds = &self.bounds;

        let postings = self
            .doc_ids
            .iter()
            .map(|_| {
                let frequency = if bounds.frequency == 0 { 0 } else { rng.gen_range(0..bounds.frequency) };
                let norm = rng.gen::<f32>();
                let occurrences = (0..frequency)
                    .map(|_| {
                        let field = rng.gen_range(0..bounds.field);
                        let position = rng.gen_range(0..bounds.offset);
                        let start = rng.gen_range(0..bounds.offset);
                        let end = rng.gen_range(0..bounds.offset);
                        let count = if bounds.sub_position_count == 0 { 0 } else { rng.gen_range(0..bounds.sub_position_count) };
                        let sub_positions = (0..count).map(|_| rng.gen_range(0..bounds.sub_position)).collect();
                        Occurrence::new(field, position, start, end, sub_positions)
                    })
                    .collect();
                Posting::new(frequency, norm, occurrences)
            })
            .collect();

        let corpus = PostingCorpus::new(postings)?;
        debug!("[CorpusFixture] generated {} postings with {} occurrences, seed: {}", corpus.len(), corpus.total_occurrences(), self.seed);
        Ok(corpus)
    }
}
