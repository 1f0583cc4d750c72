use crate::{error::AppError, AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use configuration::{Labels, Language, TimeRange};
use core_types::Asset;
use engine::{RunRequest, Snapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query string of `GET /api/snapshot`.
///
/// Every field is optional and falls back to the configured dashboard defaults.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotQuery {
    /// Comma-separated symbols, e.g. `BTC-USD,COIN`.
    pub symbols: Option<String>,
    /// One of `7d`, `30d`, `180d`, `365d`.
    pub range: Option<String>,
    /// `en` or `zh-TW`.
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub labels: Labels,
    pub snapshot: Snapshot,
}

/// # GET /api/assets
/// The configured symbol-to-name mapping.
pub async fn get_assets(State(state): State<Arc<AppState>>) -> Json<Vec<Asset>> {
    Json(state.config.assets.clone())
}

/// # GET /api/snapshot
/// Runs the pipeline for the requested selection and returns every view's data.
pub async fn get_snapshot(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<SnapshotResponse>, AppError> {
    let dashboard = &state.config.dashboard;

    let range = match query.range.as_deref() {
        Some(raw) => raw
            .parse::<TimeRange>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => dashboard.range,
    };
    let language = match query.lang.as_deref() {
        Some(raw) => raw
            .parse::<Language>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => dashboard.language,
    };
    let symbols: Vec<String> = match query.symbols.as_deref() {
        Some(raw) => raw.split(',').map(str::to_string).collect(),
        None => dashboard.symbols.clone(),
    };

    let request = RunRequest::new(
        state.config.resolve_assets(&symbols),
        range,
        state.as_of(),
    );
    tracing::debug!(?symbols, %range, "Serving snapshot");
    let snapshot = state.engine.run(&request).await?;

    Ok(Json(SnapshotResponse {
        labels: Labels::for_language(language),
        snapshot,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::{DataSource, FetchOutcome};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use chrono::{Days, NaiveDate};
    use configuration::{Config, MACrossoverParams};
    use core_types::{PricePoint, PriceSeries};
    use engine::DashboardEngine;

    /// Every symbol except `DOWN` has a steadily rising history.
    struct Rising;

    #[async_trait]
    impl DataSource for Rising {
        async fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> FetchOutcome {
            if symbol == "DOWN" {
                return FetchOutcome::Empty;
            }
            let days = (end - start).num_days() as u64;
            let points = (0..=days)
                .map(|i| PricePoint::new(start + Days::new(i), 100.0 + (i * i) as f64))
                .collect();
            FetchOutcome::Series(PriceSeries::new(symbol, points).unwrap())
        }
    }

    fn state() -> Arc<AppState> {
        let engine = DashboardEngine::new(Arc::new(Rising), MACrossoverParams::default()).unwrap();
        Arc::new(AppState::new(
            engine,
            Config::default(),
            NaiveDate::from_ymd_opt(2024, 6, 30),
        ))
    }

    fn query(symbols: Option<&str>, range: Option<&str>, lang: Option<&str>) -> Query<SnapshotQuery> {
        Query(SnapshotQuery {
            symbols: symbols.map(str::to_string),
            range: range.map(str::to_string),
            lang: lang.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn defaults_come_from_the_configuration() {
        let Json(response) = get_snapshot(State(state()), query(None, None, None))
            .await
            .unwrap();
        assert_eq!(response.snapshot.assets.len(), 3);
        assert_eq!(response.snapshot.range, TimeRange::HalfYear);
        assert_eq!(response.labels.title, Labels::for_language(Language::TraditionalChinese).title);
    }

    #[tokio::test]
    async fn selection_and_language_follow_the_query() {
        let Json(response) = get_snapshot(
            State(state()),
            query(Some("COIN,DOWN"), Some("30d"), Some("en")),
        )
        .await
        .unwrap();
        assert_eq!(response.snapshot.prices.symbols(), &["COIN"]);
        assert_eq!(response.snapshot.warnings.len(), 1);
        assert_eq!(response.labels.title, Labels::for_language(Language::English).title);
    }

    #[tokio::test]
    async fn unknown_range_is_a_bad_request() {
        let err = get_snapshot(State(state()), query(None, Some("90d"), None))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn nothing_usable_is_not_found() {
        let err = get_snapshot(State(state()), query(Some("DOWN"), None, None))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = get_snapshot(State(state()), query(Some(""), None, None))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn assets_lists_the_configured_mapping() {
        let Json(assets) = get_assets(State(state())).await;
        assert_eq!(assets[0].symbol, "BTC-USD");
    }
}
