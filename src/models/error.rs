use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletScoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cannot score an empty wallet population")]
    EmptyPopulation,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Malformed score table at line {line}: {message}")]
    MalformedScoreTable { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, WalletScoreError>;
