pub mod bench;
pub mod common;
pub mod core;

pub use crate::bench::{BenchConfig, BenchRunner, CodecKind, ScenarioKind};
pub use crate::common::{get_logger, BenchError};
pub use crate::core::{EncodingReport, Occurrence, Posting, PostingCorpus};
