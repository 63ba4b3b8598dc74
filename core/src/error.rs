use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No data: table '{table}' has no records")]
    NoData { table: &'static str },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
