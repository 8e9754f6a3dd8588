use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("API error {status} on {endpoint}")]
    Api { status: u16, endpoint: String },
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ScopeError>;
