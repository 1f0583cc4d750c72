//! # TrendLens Engine
//!
//! Wires a `DataSource` to the analytics, strategy and backtest crates and turns
//! one refresh request into a `Snapshot` the presentation layer can render.
//!
//! Fetching is the only asynchronous step. Everything after it is a pure
//! function of the fetched series, so a frozen source always yields the same
//! snapshot.

use analytics::{align, AnalyticsEngine, AnalyticsError};
use api_client::{DataSource, FetchOutcome};
use backtester::Backtester;
use configuration::MACrossoverParams;
use core_types::{Asset, PriceSeries};
use indicatif::ProgressBar;
use std::sync::Arc;
use strategies::{crossover_signal, MACrossover, Strategy};

pub mod error;
pub mod snapshot;

pub use error::{EngineError, NoDataCause};
pub use snapshot::{
    CorrelationView, NormalizedSeries, PipelineWarning, RunRequest, Snapshot, TechnicalView,
    UnavailableReason, CORRELATION_DISPLAY_DECIMALS,
};

/// The central orchestrator behind every dashboard surface.
pub struct DashboardEngine {
    source: Arc<dyn DataSource>,
    analytics: AnalyticsEngine,
    crossover: MACrossover,
    progress: Option<ProgressBar>,
}

impl DashboardEngine {
    pub fn new(source: Arc<dyn DataSource>, params: MACrossoverParams) -> Result<Self, EngineError> {
        Ok(Self {
            source,
            analytics: AnalyticsEngine::new(),
            crossover: MACrossover::new(params)?,
            progress: None,
        })
    }

    /// Reports each symbol fetch on the given progress bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn strategy_name(&self) -> String {
        self.crossover.name()
    }

    /// Fetches every selected symbol and computes the snapshot.
    ///
    /// Symbols are fetched one at a time in selection order. A symbol that
    /// fails or comes back empty becomes a warning; the run only fails when no
    /// symbol at all is usable.
    pub async fn run(&self, request: &RunRequest) -> Result<Snapshot, EngineError> {
        if request.assets.is_empty() {
            return Err(EngineError::NoDataAvailable(NoDataCause::NothingSelected));
        }

        let start = request.start();
        tracing::info!(
            symbols = request.assets.len(),
            range = %request.range,
            %start,
            end = %request.as_of,
            "Starting dashboard refresh"
        );

        let mut fetched = Vec::with_capacity(request.assets.len());
        for asset in &request.assets {
            if let Some(pb) = &self.progress {
                pb.set_message(format!("Fetching {}...", asset.symbol));
            }
            let outcome = self.source.fetch(&asset.symbol, start, request.as_of).await;
            if let Some(pb) = &self.progress {
                pb.inc(1);
            }
            fetched.push((asset.clone(), outcome));
        }

        self.analyze(request, fetched)
    }

    /// The synchronous half of `run`: everything downstream of fetching.
    pub fn analyze(
        &self,
        request: &RunRequest,
        fetched: Vec<(Asset, FetchOutcome)>,
    ) -> Result<Snapshot, EngineError> {
        if fetched.is_empty() {
            return Err(EngineError::NoDataAvailable(NoDataCause::NothingSelected));
        }

        let requested: Vec<String> = fetched.iter().map(|(a, _)| a.symbol.clone()).collect();
        let mut warnings = Vec::new();
        let mut candidates: Vec<(Asset, PriceSeries)> = Vec::new();

        for (asset, outcome) in fetched {
            let reason = match outcome {
                FetchOutcome::Series(series) => {
                    candidates.push((asset, series));
                    continue;
                }
                FetchOutcome::Empty => UnavailableReason::Empty,
                FetchOutcome::Fault(err) => UnavailableReason::ProviderFault(err.to_string()),
            };
            tracing::warn!(symbol = %asset.symbol, %reason, "Dropping symbol from this refresh");
            warnings.push(PipelineWarning::PartialDataUnavailable {
                symbol: asset.symbol,
                reason,
            });
        }

        let raw: Vec<PriceSeries> = candidates.iter().map(|(_, s)| s.clone()).collect();
        let alignment = match align(&raw) {
            Ok(alignment) => alignment,
            Err(AnalyticsError::NoUsableSeries) => {
                tracing::warn!(symbols = ?requested, "No selected symbol returned usable prices");
                return Err(EngineError::NoDataAvailable(NoDataCause::AllSymbolsUnusable(
                    requested,
                )));
            }
            Err(e) => return Err(e.into()),
        };

        for symbol in &alignment.excluded {
            tracing::warn!(%symbol, "Dropping symbol without finite prices");
            warnings.push(PipelineWarning::PartialDataUnavailable {
                symbol: symbol.clone(),
                reason: UnavailableReason::NoUsablePrices,
            });
        }
        let included: Vec<(Asset, PriceSeries)> = candidates
            .into_iter()
            .filter(|(asset, _)| !alignment.excluded.contains(&asset.symbol))
            .collect();

        let table = alignment.table;

        let mut normalized = Vec::with_capacity(table.symbols().len());
        for (symbol, column) in table.symbols().iter().zip(table.columns()) {
            match self.analytics.normalize(column) {
                Ok(values) => normalized.push(NormalizedSeries {
                    symbol: symbol.clone(),
                    values,
                }),
                Err(e) => {
                    tracing::warn!(%symbol, error = %e, "Cannot normalize series");
                    warnings.push(PipelineWarning::NormalizationUnavailable {
                        symbol: symbol.clone(),
                        detail: e.to_string(),
                    });
                }
            }
        }

        let returns = self.analytics.returns(&table)?;
        if returns.row_count() < 2 {
            tracing::warn!(return_rows = returns.row_count(), "Not enough aligned data");
            warnings.push(PipelineWarning::InsufficientAlignedData {
                return_rows: returns.row_count(),
            });
        }

        let correlation = if let [only] = table.symbols() {
            CorrelationView::SingleAsset {
                symbol: only.clone(),
            }
        } else {
            match self.analytics.correlate(&returns) {
                Ok(matrix) => CorrelationView::Matrix {
                    display: matrix.rounded(CORRELATION_DISPLAY_DECIMALS),
                    matrix,
                },
                Err(AnalyticsError::NotEnoughData(_)) => CorrelationView::InsufficientData {
                    return_rows: returns.row_count(),
                },
                Err(e) => return Err(e.into()),
            }
        };

        let mut technicals = Vec::with_capacity(included.len());
        for (_, series) in &included {
            let closes = series.closes();
            let (ma_fast, ma_slow) = self.crossover.moving_averages(&closes)?;
            let latest_signal = crossover_signal(&ma_fast, &ma_slow)
                .last()
                .copied()
                .flatten();
            technicals.push(TechnicalView {
                symbol: series.symbol().to_string(),
                dates: series.dates(),
                closes,
                ma_fast,
                ma_slow,
                latest_signal,
            });
        }

        let backtester = Backtester::new(Box::new(self.crossover.clone()));
        let mut backtests = Vec::new();
        if !returns.is_empty() {
            for (_, series) in &included {
                backtests.push(backtester.run(series)?);
            }
        }

        tracing::info!(
            symbols = table.symbols().len(),
            rows = table.row_count(),
            warnings = warnings.len(),
            "Dashboard refresh complete"
        );

        Ok(Snapshot {
            as_of: request.as_of,
            start: request.start(),
            range: request.range,
            assets: included.into_iter().map(|(asset, _)| asset).collect(),
            warnings,
            prices: table,
            returns,
            normalized,
            correlation,
            technicals,
            strategy: backtester.strategy_name(),
            backtests,
        })
    }
}
