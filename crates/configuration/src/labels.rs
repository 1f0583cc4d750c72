use crate::settings::Language;
use serde::Serialize;

/// Every user-facing string of the dashboard in one language.
#[derive(Debug, Clone, Serialize)]
pub struct Labels {
    pub title: &'static str,
    pub trend_tab: &'static str,
    pub correlation_tab: &'static str,
    pub technicals_tab: &'static str,
    pub backtest_tab: &'static str,
    pub warnings_heading: &'static str,
    pub date: &'static str,
    pub asset: &'static str,
    pub normalized: &'static str,
    pub trend: &'static str,
    pub latest_close: &'static str,
    pub signal: &'static str,
    pub long: &'static str,
    pub flat: &'static str,
    pub strategy_return: &'static str,
    pub buy_and_hold_return: &'static str,
    pub not_available: &'static str,
    pub no_symbols_selected: &'static str,
    pub no_data: &'static str,
    pub insufficient_data: &'static str,
    pub single_asset: &'static str,
    language: Language,
}

impl Labels {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::English => Self {
                title: "Asset Trends & Correlation Analysis",
                trend_tab: "Normalized Price Trend",
                correlation_tab: "Daily Return Correlation",
                technicals_tab: "Technical Analysis",
                backtest_tab: "MA Crossover Backtest",
                warnings_heading: "Warnings",
                date: "Date",
                asset: "Asset",
                normalized: "Normalized",
                trend: "Trend",
                latest_close: "Close",
                signal: "Signal",
                long: "Long",
                flat: "Flat",
                strategy_return: "Strategy Return",
                buy_and_hold_return: "Buy & Hold Return",
                not_available: "n/a",
                no_symbols_selected: "No assets selected; nothing to show.",
                no_data: "No data available for any selected asset.",
                insufficient_data: "Not enough aligned data to compute correlations.",
                single_asset: "At least two assets are needed for a correlation matrix.",
                language,
            },
            Language::TraditionalChinese => Self {
                title: "資產走勢與相關性分析",
                trend_tab: "標準化價格走勢比較",
                correlation_tab: "日報酬率相關係數",
                technicals_tab: "技術分析",
                backtest_tab: "均線交叉策略回測",
                warnings_heading: "警告",
                date: "日期",
                asset: "資產",
                normalized: "標準化價格",
                trend: "走勢",
                latest_close: "收盤價",
                signal: "訊號",
                long: "持有",
                flat: "空手",
                strategy_return: "策略報酬",
                buy_and_hold_return: "買進持有報酬",
                not_available: "無",
                no_symbols_selected: "未選擇任何資產，無資料可顯示。",
                no_data: "所選資產皆無可用資料。",
                insufficient_data: "對齊後資料不足，無法計算相關係數。",
                single_asset: "至少需要兩項資產才能計算相關係數矩陣。",
                language,
            },
        }
    }

    /// The data-source line shown under the title.
    pub fn source_note(&self, days: u32) -> String {
        match self.language {
            Language::English => format!("Source: Yahoo Finance | Period: past {} days", days),
            Language::TraditionalChinese => {
                format!("資料來源：Yahoo Finance | 期間：過去 {} 天", days)
            }
        }
    }

    pub fn moving_average(&self, window: usize) -> String {
        match self.language {
            Language::English => format!("MA{}", window),
            Language::TraditionalChinese => format!("{}日均線", window),
        }
    }

    /// Warning text for a symbol that was dropped from the run.
    pub fn symbol_unavailable(&self, symbol: &str, detail: &str) -> String {
        match self.language {
            Language::English => format!("No usable data for {} ({})", symbol, detail),
            Language::TraditionalChinese => format!("無法取得 {} 的資料（{}）", symbol, detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_language() {
        let en = Labels::for_language(Language::English);
        let zh = Labels::for_language(Language::TraditionalChinese);
        assert_eq!(en.source_note(180), "Source: Yahoo Finance | Period: past 180 days");
        assert_eq!(zh.source_note(180), "資料來源：Yahoo Finance | 期間：過去 180 天");
        assert_eq!(en.moving_average(20), "MA20");
        assert!(zh.symbol_unavailable("COIN", "timeout").contains("COIN"));
    }
}
