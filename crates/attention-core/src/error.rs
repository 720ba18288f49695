use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
