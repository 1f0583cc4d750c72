use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The provider returned HTTP {0}")]
    Status(u16),

    #[error("The provider rejected the request [{code}]: {description}")]
    Provider { code: String, description: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("The provider returned no data")]
    NoData,

    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),
}
