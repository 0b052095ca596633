mod report;
mod verify;

pub use report::EncodingReport;
pub use verify::{compare_posting, verify_hybrid_chunks, verify_stream_chunks};
