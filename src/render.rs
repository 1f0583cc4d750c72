use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use configuration::{Labels, Theme};
use core_types::Position;
use engine::{CorrelationView, EngineError, NoDataCause, PipelineWarning, Snapshot};
use std::fmt;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_WIDTH: usize = 40;

/// Colors and borders for one theme. Rendering only; values are never affected.
struct Palette {
    preset: &'static str,
    heading: Color,
    positive: Color,
    negative: Color,
    muted: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                preset: presets::UTF8_FULL_CONDENSED,
                heading: Color::DarkBlue,
                positive: Color::DarkGreen,
                negative: Color::DarkRed,
                muted: Color::DarkGrey,
            },
            Theme::Dark => Self {
                preset: presets::UTF8_BORDERS_ONLY,
                heading: Color::Cyan,
                positive: Color::Green,
                negative: Color::Red,
                muted: Color::Grey,
            },
        }
    }

    fn table(&self, header: Vec<String>) -> Table {
        let mut table = Table::new();
        table
            .load_preset(self.preset)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header.into_iter().map(|h| {
                Cell::new(h)
                    .fg(self.heading)
                    .add_attribute(Attribute::Bold)
            }));
        table
    }

    fn signed(&self, value: f64, text: String) -> Cell {
        let color = if value > 0.0 {
            self.positive
        } else if value < 0.0 {
            self.negative
        } else {
            self.muted
        };
        Cell::new(text).fg(color).set_alignment(CellAlignment::Right)
    }
}

/// Every dashboard view of a snapshot, displayed as text.
struct DashboardView<'a> {
    snapshot: &'a Snapshot,
    labels: &'a Labels,
    palette: Palette,
}

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (snapshot, labels, palette) = (self.snapshot, self.labels, &self.palette);

        writeln!(f, "{}", labels.title)?;
        writeln!(
            f,
            "{} | {} → {}",
            labels.source_note(snapshot.range.days()),
            snapshot.start,
            snapshot.as_of
        )?;

        if !snapshot.warnings.is_empty() {
            writeln!(f, "\n{}", labels.warnings_heading)?;
            for warning in &snapshot.warnings {
                writeln!(f, "  ! {}", warning_text(warning, labels))?;
            }
        }

        writeln!(f, "\n{}\n{}", labels.trend_tab, trend_table(snapshot, labels, palette))?;
        writeln!(
            f,
            "\n{}\n{}",
            labels.correlation_tab,
            correlation_section(&snapshot.correlation, labels, palette)
        )?;
        writeln!(
            f,
            "\n{}\n{}",
            labels.technicals_tab,
            technicals_table(snapshot, labels, palette)
        )?;
        writeln!(
            f,
            "\n{} ({})\n{}",
            labels.backtest_tab,
            snapshot.strategy,
            backtest_section(snapshot, labels, palette)
        )
    }
}

/// Renders every dashboard view of a snapshot as text.
pub fn render_snapshot(snapshot: &Snapshot, labels: &Labels, theme: Theme) -> String {
    DashboardView {
        snapshot,
        labels,
        palette: Palette::for_theme(theme),
    }
    .to_string()
}

/// The message shown instead of the views when the pipeline had nothing to show.
pub fn render_error(err: &EngineError, labels: &Labels) -> Option<String> {
    match err {
        EngineError::NoDataAvailable(NoDataCause::NothingSelected) => {
            Some(labels.no_symbols_selected.to_string())
        }
        EngineError::NoDataAvailable(NoDataCause::AllSymbolsUnusable(_)) => {
            Some(labels.no_data.to_string())
        }
        _ => None,
    }
}

fn warning_text(warning: &PipelineWarning, labels: &Labels) -> String {
    match warning {
        PipelineWarning::PartialDataUnavailable { symbol, reason } => {
            labels.symbol_unavailable(symbol, &reason.to_string())
        }
        PipelineWarning::InsufficientAlignedData { .. } => labels.insufficient_data.to_string(),
        PipelineWarning::NormalizationUnavailable { symbol, detail } => {
            labels.symbol_unavailable(symbol, detail)
        }
    }
}

fn trend_table(snapshot: &Snapshot, labels: &Labels, palette: &Palette) -> Table {
    let mut table = palette.table(vec![
        labels.asset.to_string(),
        labels.normalized.to_string(),
        labels.trend.to_string(),
    ]);
    for series in &snapshot.normalized {
        let latest = series.values.last().copied().unwrap_or(f64::NAN);
        table.add_row(vec![
            Cell::new(display_name(snapshot, &series.symbol)),
            palette.signed(latest - 1.0, format_number(latest, 3, labels)),
            Cell::new(sparkline(&series.values, SPARK_WIDTH)),
        ]);
    }
    table
}

fn correlation_section(view: &CorrelationView, labels: &Labels, palette: &Palette) -> String {
    match view {
        CorrelationView::Matrix { display, .. } => {
            let mut header = vec![String::new()];
            header.extend(display.symbols().iter().cloned());
            let mut table = palette.table(header);
            for (symbol, row) in display.symbols().iter().zip(display.values()) {
                let mut cells = vec![Cell::new(symbol).add_attribute(Attribute::Bold)];
                cells.extend(
                    row.iter()
                        .map(|v| palette.signed(*v, format_number(*v, 3, labels))),
                );
                table.add_row(cells);
            }
            table.to_string()
        }
        CorrelationView::SingleAsset { .. } => labels.single_asset.to_string(),
        CorrelationView::InsufficientData { .. } => labels.insufficient_data.to_string(),
    }
}

fn technicals_table(snapshot: &Snapshot, labels: &Labels, palette: &Palette) -> Table {
    let (fast, slow) = snapshot
        .technicals
        .first()
        .map(|t| (t.ma_fast.window, t.ma_slow.window))
        .unwrap_or((20, 50));
    let mut table = palette.table(vec![
        labels.asset.to_string(),
        labels.latest_close.to_string(),
        labels.moving_average(fast),
        labels.moving_average(slow),
        labels.signal.to_string(),
    ]);
    for view in &snapshot.technicals {
        let optional = |v: Option<f64>| match v {
            Some(v) => format_number(v, 2, labels),
            None => labels.not_available.to_string(),
        };
        let signal = match view.latest_signal {
            Some(Position::Long) => Cell::new(labels.long).fg(palette.positive),
            Some(Position::Flat) => Cell::new(labels.flat).fg(palette.muted),
            None => Cell::new(labels.not_available).fg(palette.muted),
        };
        table.add_row(vec![
            Cell::new(display_name(snapshot, &view.symbol)),
            Cell::new(optional(view.latest_close())).set_alignment(CellAlignment::Right),
            Cell::new(optional(view.ma_fast.latest())).set_alignment(CellAlignment::Right),
            Cell::new(optional(view.ma_slow.latest())).set_alignment(CellAlignment::Right),
            signal,
        ]);
    }
    table
}

fn backtest_section(snapshot: &Snapshot, labels: &Labels, palette: &Palette) -> String {
    if snapshot.backtests.is_empty() {
        return labels.insufficient_data.to_string();
    }
    let mut table = palette.table(vec![
        labels.asset.to_string(),
        labels.strategy_return.to_string(),
        labels.buy_and_hold_return.to_string(),
        labels.trend.to_string(),
    ]);
    for backtest in &snapshot.backtests {
        let percent = |v: Option<f64>| match v {
            Some(v) => palette.signed(v, format_percent(v)),
            None => Cell::new(labels.not_available),
        };
        table.add_row(vec![
            Cell::new(display_name(snapshot, &backtest.symbol)),
            percent(backtest.total_return()),
            percent(backtest.buy_and_hold_return()),
            Cell::new(sparkline(&backtest.cumulative, SPARK_WIDTH)),
        ]);
    }
    table.to_string()
}

fn display_name(snapshot: &Snapshot, symbol: &str) -> String {
    snapshot
        .assets
        .iter()
        .find(|a| a.symbol == symbol)
        .filter(|a| a.name != a.symbol)
        .map(|a| format!("{} ({})", a.name, a.symbol))
        .unwrap_or_else(|| symbol.to_string())
}

fn format_number(value: f64, decimals: usize, labels: &Labels) -> String {
    if value.is_finite() {
        format!("{:.*}", decimals, value)
    } else {
        labels.not_available.to_string()
    }
}

fn format_percent(value: f64) -> String {
    format!("{:+.2}%", value * 100.0)
}

/// A one-line chart of `values`, resampled to at most `width` characters.
///
/// Non-finite values are drawn as spaces.
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }
    let step = values.len().div_ceil(width);
    let sampled: Vec<f64> = values.chunks(step).map(|c| c[c.len() - 1]).collect();

    let finite = sampled.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let span = max - min;

    sampled
        .iter()
        .map(|v| {
            if !v.is_finite() {
                ' '
            } else if span <= 0.0 {
                SPARK_LEVELS[SPARK_LEVELS.len() / 2]
            } else {
                let level = ((v - min) / span * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
                SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::Language;
    use std::sync::Arc;

    #[test]
    fn sparkline_spans_lowest_to_highest_level() {
        assert_eq!(sparkline(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 8), "▁▂▃▄▅▆▇█");
        assert_eq!(sparkline(&[5.0, 5.0], 8), "▅▅");
        assert_eq!(sparkline(&[], 8), "");
    }

    #[test]
    fn sparkline_is_resampled_to_width() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let line = sparkline(&values, 40);
        assert!(line.chars().count() <= 40);
        assert!(line.ends_with('█'));
    }

    #[test]
    fn undefined_numbers_are_labelled() {
        let en = Labels::for_language(Language::English);
        assert_eq!(format_number(f64::NAN, 3, &en), "n/a");
        assert_eq!(format_number(0.94104, 3, &en), "0.941");
        assert_eq!(format_percent(0.125), "+12.50%");
        assert_eq!(format_percent(-0.5), "-50.00%");
    }

    #[test]
    fn snapshot_renders_every_view_and_warning() {
        use api_client::{FetchOutcome, FixtureSource};
        use chrono::{Days, NaiveDate};
        use configuration::{MACrossoverParams, TimeRange};
        use core_types::{Asset, PricePoint, PriceSeries};
        use engine::{DashboardEngine, RunRequest};

        let as_of = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let series = |symbol: &str, closes: &[f64]| {
            let points = closes
                .iter()
                .enumerate()
                .map(|(i, c)| PricePoint::new(as_of - Days::new(3 - i as u64), *c))
                .collect();
            FetchOutcome::Series(PriceSeries::new(symbol, points).unwrap())
        };
        let assets = vec![Asset::unnamed("A"), Asset::unnamed("B"), Asset::unnamed("C")];
        let request = RunRequest::new(assets.clone(), TimeRange::Week, as_of);
        let engine =
            DashboardEngine::new(Arc::new(FixtureSource::default()), MACrossoverParams::default())
                .unwrap();
        let snapshot = engine
            .analyze(
                &request,
                vec![
                    (assets[0].clone(), series("A", &[10.0, 20.0, 30.0, 40.0])),
                    (assets[1].clone(), series("B", &[100.0, 90.0, 80.0, 70.0])),
                    (assets[2].clone(), FetchOutcome::Empty),
                ],
            )
            .unwrap();

        let en = Labels::for_language(Language::English);
        let text = render_snapshot(&snapshot, &en, Theme::Dark);
        for heading in [en.title, en.trend_tab, en.correlation_tab, en.technicals_tab, en.backtest_tab] {
            assert!(text.contains(heading), "missing {}", heading);
        }
        assert!(text.contains("No usable data for C"));
        assert!(text.contains("0.941"));
    }

    #[test]
    fn no_data_errors_have_localized_messages() {
        let zh = Labels::for_language(Language::TraditionalChinese);
        let err = EngineError::NoDataAvailable(NoDataCause::NothingSelected);
        assert_eq!(render_error(&err, &zh), Some(zh.no_symbols_selected.to_string()));
    }
}
