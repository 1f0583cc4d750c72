use crate::error::ApiError;
use crate::responses::ChartResponse;
use crate::{DataSource, FetchOutcome};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use configuration::ProviderConfig;
use core_types::{PricePoint, PriceSeries};
use std::collections::BTreeMap;
use std::time::Duration;

/// A `DataSource` backed by the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches daily closes for `symbol` between `start` and `end`, both inclusive.
    pub async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ApiError> {
        let url = format!("{}/{}", self.base_url, symbol);
        let (period1, period2) = period_bounds(start, end);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        // Unknown symbols come back as a 404 carrying a chart error body, so the
        // body is inspected before the status.
        match parse_chart(&text) {
            Err(ApiError::Deserialization(_)) if !status.is_success() => {
                Err(ApiError::Status(status.as_u16()))
            }
            other => other,
        }
    }
}

#[async_trait]
impl DataSource for YahooClient {
    async fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> FetchOutcome {
        tracing::debug!(symbol, %start, %end, "Requesting daily closes from Yahoo Finance");
        match self.fetch_daily_closes(symbol, start, end).await {
            Ok(points) if points.is_empty() => FetchOutcome::Empty,
            Ok(points) => match PriceSeries::new(symbol, points) {
                Ok(series) => FetchOutcome::Series(series),
                Err(e) => FetchOutcome::Fault(ApiError::InvalidData(e.to_string())),
            },
            Err(ApiError::NoData) => FetchOutcome::Empty,
            Err(e) => FetchOutcome::Fault(e),
        }
    }
}

/// Converts the inclusive date range into the provider's `[period1, period2)` seconds.
fn period_bounds(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
    let to_secs = |d: NaiveDate| d.and_hms_opt(0, 0, 0).map(|t| t.and_utc().timestamp());
    let period1 = to_secs(start).unwrap_or_default();
    let period2 = end
        .succ_opt()
        .and_then(to_secs)
        .unwrap_or(period1);
    (period1, period2)
}

/// Parses a chart response body into date-ordered closes.
///
/// Null closes are skipped. When the provider reports more than one bar for the same
/// local date (the live bar next to the settled one), the last one wins.
pub(crate) fn parse_chart(body: &str) -> Result<Vec<PricePoint>, ApiError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    if let Some(error) = response.chart.error {
        return Err(ApiError::Provider {
            code: error.code,
            description: error.description,
        });
    }

    let results = response.chart.result.ok_or(ApiError::NoData)?;
    let data = results.into_iter().next().ok_or(ApiError::NoData)?;
    let offset = data.meta.as_ref().map(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = data.timestamp.unwrap_or_default();
    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut by_date = BTreeMap::new();
    for (ts, close) in timestamps.iter().zip(closes) {
        let Some(close) = close.filter(|c| c.is_finite()) else {
            continue;
        };
        let date = DateTime::from_timestamp(ts + offset, 0)
            .ok_or_else(|| ApiError::InvalidData(format!("Invalid timestamp: {}", ts)))?
            .date_naive();
        by_date.insert(date, close);
    }

    Ok(by_date
        .into_iter()
        .map(|(date, close)| PricePoint::new(date, close))
        .collect())
}
