mod fixture;
mod posting;
mod posting_corpus;

pub use fixture::{CorpusFixture, FixtureBounds, LARGE_SCENARIO_DOC_IDS, SMALL_SCENARIO_DOC_IDS};
pub use posting::{Occurrence, Posting};
pub use posting_corpus::{CorpusError, PostingCorpus};
