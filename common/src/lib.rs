mod vint;

pub use vint::{read_vint_u64, serialize_vint_u64, VIntDecoder, VIntEncoder, MAX_VINT_U64_LEN};
