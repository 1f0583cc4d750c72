use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod labels;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use labels::Labels;
pub use settings::{
    Config, DashboardConfig, Language, MACrossoverParams, ProviderConfig, ServerConfig, Theme,
    TimeRange,
};

/// Loads the application configuration from a TOML file.
///
/// Values can be overridden with environment variables prefixed `TRENDLENS__`,
/// e.g. `TRENDLENS__DASHBOARD__RANGE=30d` or `TRENDLENS__DASHBOARD__SYMBOLS=SPY,QQQ`.
/// The result is validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with(path, environment())
}

/// The `TRENDLENS__` environment source. List-valued keys are comma-separated.
fn environment() -> config::Environment {
    config::Environment::with_prefix("TRENDLENS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("dashboard.symbols")
}

fn load_config_with(path: &Path, env: config::Environment) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(env)
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(
        assets = config.assets.len(),
        range = %config.dashboard.range,
        "Configuration loaded from {}",
        path.display()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_and_validates_toml() {
        let dir = std::env::temp_dir().join(format!("trendlens-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(
            &path,
            r#"
[dashboard]
symbols = ["BTC-USD", "COIN"]
range = "30d"
theme = "dark"
language = "en"

[[assets]]
symbol = "BTC-USD"
name = "Bitcoin"

[technicals]
ma_fast_period = 5
ma_slow_period = 10
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.dashboard.range, TimeRange::Month);
        assert_eq!(config.dashboard.theme, Theme::Dark);
        assert_eq!(config.dashboard.language, Language::English);
        assert_eq!(config.dashboard.refresh_interval_secs, 300);
        assert_eq!(config.technicals.ma_slow_period, 10);
        assert_eq!(config.assets.len(), 1);
        assert_eq!(config.provider.request_timeout_secs, None);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn environment_overrides_the_file() {
        let dir = std::env::temp_dir().join(format!("trendlens-env-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(
            &path,
            r#"
[dashboard]
symbols = ["BTC-USD"]
range = "180d"

[server]
host = "127.0.0.1"
port = 3000
"#,
        )
        .unwrap();

        let vars: config::Map<String, String> = [
            ("TRENDLENS__DASHBOARD__SYMBOLS", "SPY,QQQ"),
            ("TRENDLENS__DASHBOARD__RANGE", "7d"),
            ("TRENDLENS__SERVER__PORT", "8080"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = load_config_with(&path, environment().source(Some(vars))).unwrap();
        assert_eq!(config.dashboard.symbols, vec!["SPY".to_string(), "QQQ".to_string()]);
        assert_eq!(config.dashboard.range, TimeRange::Week);
        assert_eq!(config.server.port, 8080);

        fs::remove_dir_all(&dir).ok();
    }
}
