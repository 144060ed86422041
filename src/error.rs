use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParaprintError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    #[error("No registry at {0}; run `init` first")]
    RegistryNotFound(String),

    #[error("Submission not found: {0}")]
    SubmissionNotFound(String),

    #[error("Submission already recorded: {0}")]
    DuplicateSubmission(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Corruption: {0}")]
    Corruption(String),
}

/// Failure to obtain text from an uploaded document.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },

    #[error("document is not valid UTF-8 text")]
    Decode,

    #[error("no text could be extracted from {0}")]
    NoText(String),
}

pub type Result<T> = std::result::Result<T, ParaprintError>;
