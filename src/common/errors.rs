use thiserror::Error;

use super::FileOperationError;
use crate::core::{CorpusError, DecodeError, FaultContext, LifecycleError, PipelineError};

/// Top level error of a benchmark run, every variant aborts the scenario.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Cursor lifecycle violated at {context}: {source}")]
    Lifecycle {
        context: FaultContext,
        #[source]
        source: LifecycleError,
    },

    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("Invalid bench config: '{0}'")]
    InvalidConfig(String),

    #[error(transparent)]
    FileOperation(#[from] FileOperationError),
}

impl BenchError {
    /// Lifts cursor misuse out of the decode errors so it is reported on its own.
    pub fn from_pipeline(err: PipelineError) -> Self {
        match err {
            PipelineError::Decode { context, source: DecodeError::Lifecycle(source) } => BenchError::Lifecycle { context, source },
            other => BenchError::Pipeline(other),
        }
    }

    pub fn context(&self) -> Option<&FaultContext> {
        match self {
            BenchError::Pipeline(err) => err.context(),
            BenchError::Lifecycle { context, .. } => Some(context),
            _ => None,
        }
    }
}
