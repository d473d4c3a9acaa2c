use thiserror::Error;
use toprank_core::PipelineError;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Pipeline(PipelineError::Validation(_)) => 2,
            Self::Pipeline(PipelineError::Fetch(_)) => 3,
            Self::Pipeline(PipelineError::Extract(_)) => 3,
            Self::Pipeline(PipelineError::Store(_)) => 4,
            Self::Pipeline(PipelineError::TaskFailed(_)) => 5,
            Self::Logging(_) => 2,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
