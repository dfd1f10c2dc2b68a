use crate::error::PipelineError;
use crate::models::{CanonicalForecast, ForecastHorizon, ForecastPoint, ValidatedSeries};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

pub mod service;

/// One raw output row as the external model returns it (Prophet column names).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RawForecastRow {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// The curve-fitting black box. Implementations own transport and timeouts;
/// the pipeline only shapes the request and normalizes the response.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fit on `series` and predict `horizon` days past its last observation.
    /// Returns one row per date in history + future.
    async fn fit_predict(
        &self,
        series: &ValidatedSeries,
        horizon: ForecastHorizon,
    ) -> Result<Vec<RawForecastRow>, PipelineError>;
}

/// The future index: `horizon` consecutive calendar days after the last
/// observed date. Calendar refinements (trading days, holidays) belong to
/// the external service; this is the plain daily default. Used by providers
/// that build the index client-side (in-process models, test stubs); the
/// HTTP service derives its own index server-side from `periods`.
pub fn future_dates(last_observed: NaiveDate, horizon: ForecastHorizon) -> Vec<NaiveDate> {
    (1..=horizon.days() as u64)
        .map(|d| last_observed + Days::new(d))
        .collect()
}

/// Request a forecast and normalize the raw rows into a `CanonicalForecast`.
/// No retry: a provider failure surfaces as-is.
pub async fn run_forecast(
    provider: &dyn ForecastProvider,
    series: &ValidatedSeries,
    horizon: ForecastHorizon,
) -> Result<CanonicalForecast, PipelineError> {
    info!(
        provider = provider.name(),
        points = series.len(),
        horizon_days = horizon.days(),
        "requesting forecast"
    );

    let rows = provider.fit_predict(series, horizon).await?;
    normalize(rows, horizon)
}

/// The model should never emit a mean outside its own interval, but that is
/// asserted here rather than assumed.
pub(crate) fn normalize(
    rows: Vec<RawForecastRow>,
    horizon: ForecastHorizon,
) -> Result<CanonicalForecast, PipelineError> {
    if rows.is_empty() {
        return Err(PipelineError::ForecastService(
            "service returned an empty forecast".to_string(),
        ));
    }

    let mut points = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        if !(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper) {
            return Err(PipelineError::ForecastInvariant {
                row: i,
                date: row.ds,
                lower: row.yhat_lower,
                predicted: row.yhat,
                upper: row.yhat_upper,
            });
        }
        points.push(ForecastPoint {
            timestamp: row.ds,
            predicted: row.yhat,
            lower: row.yhat_lower,
            upper: row.yhat_upper,
        });
    }

    Ok(CanonicalForecast::new(points, horizon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(d: &str, lower: f64, mean: f64, upper: f64) -> RawForecastRow {
        RawForecastRow {
            ds: date(d),
            yhat: mean,
            yhat_lower: lower,
            yhat_upper: upper,
        }
    }

    #[test]
    fn test_future_dates_start_and_len() {
        let horizon = ForecastHorizon::new(30).unwrap();
        let dates = future_dates(date("2023-06-30"), horizon);
        assert_eq!(dates.len(), 30);
        assert_eq!(dates[0], date("2023-07-01"));
        assert_eq!(dates[29], date("2023-07-30"));
    }

    #[test]
    fn test_future_dates_cross_year() {
        let horizon = ForecastHorizon::new(60).unwrap();
        let dates = future_dates(date("2023-12-15"), horizon);
        assert_eq!(dates[16], date("2023-12-31"));
        assert_eq!(dates[17], date("2024-01-01"));
    }

    #[test]
    fn test_normalize_keeps_all_rows_in_order() {
        let horizon = ForecastHorizon::new(30).unwrap();
        let rows = vec![
            row("2023-01-01", 90.0, 100.0, 110.0),
            row("2023-01-02", 95.0, 105.0, 115.0),
        ];
        let forecast = normalize(rows, horizon).unwrap();
        assert_eq!(forecast.len(), 2);
        assert_eq!(forecast.points()[0].predicted, 100.0);
        assert_eq!(forecast.points()[1].timestamp, date("2023-01-02"));
    }

    #[test]
    fn test_normalize_rejects_mean_below_lower() {
        let horizon = ForecastHorizon::new(30).unwrap();
        let rows = vec![
            row("2023-01-01", 90.0, 100.0, 110.0),
            row("2023-01-02", 106.0, 105.0, 115.0),
        ];
        match normalize(rows, horizon).unwrap_err() {
            PipelineError::ForecastInvariant { row, date: d, .. } => {
                assert_eq!(row, 1);
                assert_eq!(d, date("2023-01-02"));
            }
            other => panic!("expected ForecastInvariant, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_rejects_mean_above_upper() {
        let horizon = ForecastHorizon::new(30).unwrap();
        let rows = vec![row("2023-01-01", 90.0, 120.0, 110.0)];
        assert!(matches!(
            normalize(rows, horizon).unwrap_err(),
            PipelineError::ForecastInvariant { row: 0, .. }
        ));
    }

    #[test]
    fn test_normalize_accepts_degenerate_interval() {
        // lower == mean == upper is a valid (if overconfident) row.
        let horizon = ForecastHorizon::new(30).unwrap();
        let rows = vec![row("2023-01-01", 100.0, 100.0, 100.0)];
        assert!(normalize(rows, horizon).is_ok());
    }

    #[test]
    fn test_normalize_empty_is_service_error() {
        let horizon = ForecastHorizon::new(30).unwrap();
        assert!(matches!(
            normalize(vec![], horizon).unwrap_err(),
            PipelineError::ForecastService(_)
        ));
    }
}
