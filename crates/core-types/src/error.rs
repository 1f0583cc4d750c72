use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Series for '{symbol}' is not strictly increasing at {date}")]
    UnorderedSeries { symbol: String, date: NaiveDate },

    #[error("Table shape mismatch: {0}")]
    ShapeMismatch(String),
}
