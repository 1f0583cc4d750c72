use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from file: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    #[error("Unknown time range '{0}' (expected one of 7d, 30d, 180d, 365d)")]
    UnknownRange(String),

    #[error("Unknown language '{0}' (expected 'en' or 'zh-TW')")]
    UnknownLanguage(String),

    #[error("Unknown theme '{0}' (expected 'light' or 'dark')")]
    UnknownTheme(String),
}
