mod codec;
mod corpus;
mod measure;
mod pipeline;

pub use codec::*;
pub use corpus::*;
pub use measure::*;
pub use pipeline::*;
