use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("stage `{stage}`: {message}")]
    Stage { stage: &'static str, message: String },

    #[error("stage `{stage}` returned {actual} outputs for {expected} inputs")]
    BatchSizeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("processor `{stage}` emitted {actual} outcomes for {expected} inputs")]
    Cardinality {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{pending} batches were still unfinished at the termination deadline")]
    Incomplete { pending: usize },

    #[error("{0}")]
    Message(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn stage(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            message: message.into(),
        }
    }

    pub fn batch_size_mismatch(stage: &'static str, expected: usize, actual: usize) -> Self {
        Self::BatchSizeMismatch {
            stage,
            expected,
            actual,
        }
    }

    pub fn cardinality(stage: &'static str, expected: usize, actual: usize) -> Self {
        Self::Cardinality {
            stage,
            expected,
            actual,
        }
    }
}
