use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoizeError {

    #[error("argument key encoding error: {0}")]
    KeyEncoding(#[from] bincode::Error),

    #[error("invalid concurrency policy: {0}")]
    InvalidConcurrency(String),

    #[error("logger error: {0}")]
    Logger(#[from] log::SetLoggerError),
}
