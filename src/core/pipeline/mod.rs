mod chunk_decoder;
mod chunk_layout;
mod fault;
mod hybrid_pipeline;
mod stream_pipeline;

pub use chunk_decoder::ChunkDecoder;
pub use chunk_layout::ChunkLayout;
pub use fault::{FaultContext, FieldKind, PipelineError};
pub use hybrid_pipeline::{DeltaGranularity, HybridChunk, HybridChunks, LocationBlock, SubPositionBlock};
pub use stream_pipeline::{ChunkedStreams, EncodedChunk, StreamChunkEncoder};
