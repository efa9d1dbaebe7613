use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Job failed to start: {job}")]
    JobStart { job: String },

    #[error("Empty result set: {0}")]
    EmptyResultSet(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
