use crate::error::ConfigError;
use core_types::Asset;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// The fixed symbol-to-display-name mapping.
    #[serde(default = "default_assets")]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub technicals: MACrossoverParams,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// What the dashboard shows when no overrides are given.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Symbols selected by default (e.g., "BTC-USD").
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub range: TimeRange,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub language: Language,
    /// Seconds between pipeline runs in `watch` mode.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

/// Parameters for the moving-average crossover used by the technicals and backtest views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MACrossoverParams {
    pub ma_fast_period: usize,
    pub ma_slow_period: usize,
}

impl Default for MACrossoverParams {
    fn default() -> Self {
        Self {
            ma_fast_period: 20,
            ma_slow_period: 50,
        }
    }
}

/// Settings for the remote market-data provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub user_agent: String,
    /// No timeout is applied when this is absent.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Bind address for the JSON API.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_symbols() -> Vec<String> {
    default_assets().into_iter().map(|a| a.symbol).collect()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            range: TimeRange::default(),
            theme: Theme::default(),
            language: Language::default(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dashboard: DashboardConfig::default(),
            assets: default_assets(),
            technicals: MACrossoverParams::default(),
            provider: ProviderConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

fn default_assets() -> Vec<Asset> {
    vec![
        Asset::new("BTC-USD", "Bitcoin"),
        Asset::new("COIN", "Coinbase"),
        Asset::new("MSTR", "MicroStrategy"),
    ]
}

impl Config {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ma = &self.technicals;
        if ma.ma_fast_period == 0 {
            return Err(ConfigError::ValidationError(
                "ma_fast_period must be greater than zero".to_string(),
            ));
        }
        if ma.ma_fast_period >= ma.ma_slow_period {
            return Err(ConfigError::ValidationError(
                "ma_fast_period must be less than ma_slow_period".to_string(),
            ));
        }
        if self.dashboard.refresh_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "refresh_interval_secs must be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for asset in &self.assets {
            if asset.symbol.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "asset symbols must not be blank".to_string(),
                ));
            }
            if !seen.insert(asset.symbol.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "asset '{}' is listed more than once",
                    asset.symbol
                )));
            }
        }
        Ok(())
    }

    /// Resolves symbols to assets using the configured display names.
    ///
    /// Unknown symbols are kept and displayed by their symbol. Duplicates are dropped.
    pub fn resolve_assets(&self, symbols: &[String]) -> Vec<Asset> {
        let mut seen = HashSet::new();
        symbols
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty() && seen.insert(s.to_string()))
            .map(|symbol| {
                self.assets
                    .iter()
                    .find(|a| a.symbol == symbol)
                    .cloned()
                    .unwrap_or_else(|| Asset::unnamed(symbol))
            })
            .collect()
    }
}

/// The lookback window of a dashboard run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum TimeRange {
    #[serde(rename = "7d")]
    #[cfg_attr(feature = "clap", value(name = "7d"))]
    Week,
    #[serde(rename = "30d")]
    #[cfg_attr(feature = "clap", value(name = "30d"))]
    Month,
    #[default]
    #[serde(rename = "180d")]
    #[cfg_attr(feature = "clap", value(name = "180d"))]
    HalfYear,
    #[serde(rename = "365d")]
    #[cfg_attr(feature = "clap", value(name = "365d"))]
    Year,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Week,
        TimeRange::Month,
        TimeRange::HalfYear,
        TimeRange::Year,
    ];

    pub fn days(&self) -> u32 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::HalfYear => 180,
            TimeRange::Year => 365,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
            TimeRange::HalfYear => "180d",
            TimeRange::Year => "365d",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownRange(s.to_string()))
    }
}

/// Display theme. Affects rendering only, never computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(ConfigError::UnknownTheme(s.to_string())),
        }
    }
}

/// Language of every user-facing label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Language {
    #[serde(rename = "en")]
    #[cfg_attr(feature = "clap", value(name = "en"))]
    English,
    #[default]
    #[serde(rename = "zh-TW")]
    #[cfg_attr(feature = "clap", value(name = "zh-TW"))]
    TraditionalChinese,
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::English),
            "zh-tw" | "zh" => Ok(Language::TraditionalChinese),
            _ => Err(ConfigError::UnknownLanguage(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            dashboard: DashboardConfig {
                symbols: vec!["BTC-USD".to_string()],
                range: TimeRange::default(),
                theme: Theme::default(),
                language: Language::default(),
                refresh_interval_secs: 60,
            },
            assets: default_assets(),
            technicals: MACrossoverParams::default(),
            provider: ProviderConfig::default(),
            server: ServerConfig::default(),
        }
    }

    #[test]
    fn range_labels_map_to_day_counts() {
        let days: Vec<u32> = TimeRange::ALL.iter().map(|r| r.days()).collect();
        assert_eq!(days, vec![7, 30, 180, 365]);
        assert_eq!("30d".parse::<TimeRange>().unwrap(), TimeRange::Month);
        assert!("90d".parse::<TimeRange>().is_err());
    }

    #[test]
    fn default_range_is_half_year() {
        assert_eq!(TimeRange::default().days(), 180);
    }

    #[test]
    fn rejects_fast_period_not_below_slow() {
        let mut config = base_config();
        config.technicals = MACrossoverParams {
            ma_fast_period: 50,
            ma_slow_period: 50,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_duplicate_assets() {
        let mut config = base_config();
        config.assets.push(Asset::new("COIN", "Coinbase again"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolves_names_and_falls_back_to_symbol() {
        let config = base_config();
        let assets = config.resolve_assets(&[
            "MSTR".to_string(),
            "SPY".to_string(),
            "MSTR".to_string(),
            " ".to_string(),
        ]);
        assert_eq!(
            assets,
            vec![Asset::new("MSTR", "MicroStrategy"), Asset::unnamed("SPY")]
        );
    }

    #[test]
    fn parses_language_and_theme() {
        assert_eq!("zh-TW".parse::<Language>().unwrap(), Language::TraditionalChinese);
        assert_eq!("EN".parse::<Language>().unwrap(), Language::English);
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }
}
