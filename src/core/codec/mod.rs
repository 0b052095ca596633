mod base128;
mod delta_packed;
mod errors;
mod simple8b;
mod stream;
mod traits;

pub use base128::{Base128Codec, Base128Decoder, Base128Encoder};
pub use delta_packed::DeltaPackedSequence;
pub use errors::{DecodeError, EncodeError, LifecycleError};
pub use simple8b::{Simple8bCodec, Simple8bCursor, Simple8bWordEncoder};
pub use stream::{ChunkStreamCodec, ChunkStreamReader, ChunkStreamWriter, PackedStream, VarStream};
pub use traits::*;
