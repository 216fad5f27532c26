use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolisError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("metric source error: {0}")]
    Metric(String),

    #[error("scaling policy error: {0}")]
    Policy(String),

    #[error("workload adapter error: {0}")]
    Workload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PolisError>;
