use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("No series with usable prices to align")]
    NoUsableSeries,

    #[error("Cannot normalize a series whose first value is {0}")]
    InvalidBaseline(f64),

    #[error("Failed to build result table: {0}")]
    Table(#[from] core_types::CoreError),
}
