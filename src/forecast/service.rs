use super::{ForecastProvider, RawForecastRow};
use crate::error::PipelineError;
use crate::models::{ForecastHorizon, ValidatedSeries};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// HTTP client for a Prophet-style forecasting service.
///
/// Request: `POST {base_url}/forecast` with the observed series and the
/// number of future periods. Response: a `forecast` array of rows with
/// `ds` / `yhat` / `yhat_lower` / `yhat_upper` columns covering history
/// plus future.
pub struct HttpForecastService {
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct SeriesRow {
    ds: NaiveDate,
    y: f64,
}

#[derive(Debug, Serialize)]
struct ForecastRequest {
    series: Vec<SeriesRow>,
    periods: u32,
}

impl HttpForecastService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("RevenueForecaster/1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn parse_rows(json: &Value) -> Result<Vec<RawForecastRow>, PipelineError> {
        let rows = json["forecast"].as_array().ok_or_else(|| {
            PipelineError::ForecastService("no 'forecast' array in response".to_string())
        })?;

        rows.iter()
            .map(|row| {
                serde_json::from_value(row.clone()).map_err(|e| {
                    PipelineError::ForecastService(format!("bad forecast row: {}", e))
                })
            })
            .collect()
    }
}

#[async_trait]
impl ForecastProvider for HttpForecastService {
    fn name(&self) -> &str {
        "http"
    }

    async fn fit_predict(
        &self,
        series: &ValidatedSeries,
        horizon: ForecastHorizon,
    ) -> Result<Vec<RawForecastRow>, PipelineError> {
        let request = ForecastRequest {
            series: series
                .points()
                .iter()
                .map(|p| SeriesRow {
                    ds: p.timestamp,
                    y: p.value,
                })
                .collect(),
            periods: horizon.days(),
        };

        let url = format!("{}/forecast", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::ForecastService(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::ForecastService(format!(
                "service error ({}): {}",
                status, body
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| PipelineError::ForecastService(format!("invalid JSON: {}", e)))?;

        Self::parse_rows(&json)
    }
}
