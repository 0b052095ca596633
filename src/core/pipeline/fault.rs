use log::error;
use std::fmt;
use thiserror::Error;

use crate::core::{DecodeError, EncodeError};

/// Posting attribute a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Frequency,
    Norm,
    Field,
    Position,
    Start,
    End,
    SubPositionCount,
    SubPosition,

    /// A whole scalar stream, for failures not tied to one value.
    ScalarStream,

    /// A whole location stream or block list.
    LocationStream,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Frequency => "frequency",
            FieldKind::Norm => "norm",
            FieldKind::Field => "field",
            FieldKind::Position => "position",
            FieldKind::Start => "start",
            FieldKind::End => "end",
            FieldKind::SubPositionCount => "sub_position_count",
            FieldKind::SubPosition => "sub_position",
            FieldKind::ScalarStream => "scalar_stream",
            FieldKind::LocationStream => "location_stream",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where in the corpus a codec failure happened.
///
/// `posting` is the corpus-wide posting index. It is `None` for sequences spanning a whole chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultContext {
    pub chunk: usize,
    pub posting: Option<usize>,
    pub occurrence: Option<usize>,
    pub sub_position: Option<usize>,
    pub field: FieldKind,
}

impl FaultContext {
    pub fn chunk(chunk: usize, field: FieldKind) -> Self {
        Self { chunk, posting: None, occurrence: None, sub_position: None, field }
    }

    pub fn posting(chunk: usize, posting: usize, field: FieldKind) -> Self {
        Self { posting: Some(posting), ..Self::chunk(chunk, field) }
    }

    pub fn occurrence(chunk: usize, posting: usize, occurrence: usize, field: FieldKind) -> Self {
        Self { occurrence: Some(occurrence), ..Self::posting(chunk, posting, field) }
    }

    pub fn with_sub_position(self, sub_position: usize) -> Self {
        Self { sub_position: Some(sub_position), ..self }
    }
}

impl fmt::Display for FaultContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk {}", self.chunk)?;
        if let Some(posting) = self.posting {
            write!(f, ", posting {}", posting)?;
        }
        if let Some(occurrence) = self.occurrence {
            write!(f, ", occurrence {}", occurrence)?;
        }
        if let Some(sub_position) = self.sub_position {
            write!(f, ", sub-position {}", sub_position)?;
        }
        write!(f, ", field `{}`", self.field)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Encoding failed at {context}: {source}")]
    Encode {
        context: FaultContext,
        #[source]
        source: EncodeError,
    },

    #[error("Decoding failed at {context}: {source}")]
    Decode {
        context: FaultContext,
        #[source]
        source: DecodeError,
    },

    #[error("Invalid pipeline parameter: '{0}'")]
    InvalidParameter(String),
}

impl PipelineError {
    pub(crate) fn encode(context: FaultContext, source: EncodeError) -> Self {
        let err = PipelineError::Encode { context, source };
        error!("[Pipeline] {}", err);
        err
    }

    pub(crate) fn decode(context: FaultContext, source: DecodeError) -> Self {
        let err = PipelineError::Decode { context, source };
        error!("[Pipeline] {}", err);
        err
    }

    pub fn context(&self) -> Option<&FaultContext> {
        match self {
            PipelineError::Encode { context, .. } | PipelineError::Decode { context, .. } => Some(context),
            PipelineError::InvalidParameter(_) => None,
        }
    }
}
