use crate::error::PipelineError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observed (date, revenue) pair after validation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub timestamp: NaiveDate,
    pub value: f64,
}

/// The cleaned two-column series handed to the forecasting stage.
/// Guaranteed non-empty with no missing timestamps or values; row order is
/// exactly the upload's row order (sorting is the forecast service's job).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSeries {
    points: Vec<TimeSeriesPoint>,
}

impl ValidatedSeries {
    pub fn new(points: Vec<TimeSeriesPoint>) -> Result<Self, PipelineError> {
        if points.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The forecast anchor. History is usually chronological, but the anchor
    /// must be the maximum date even when the upload is not sorted.
    pub fn last_observed(&self) -> NaiveDate {
        self.points
            .iter()
            .map(|p| p.timestamp)
            .max()
            .unwrap_or_default()
    }
}

pub const MIN_HORIZON_DAYS: u32 = 30;
pub const MAX_HORIZON_DAYS: u32 = 365;

/// Number of future days to forecast, bounded to 30..=365 like the UI slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForecastHorizon(u32);

impl ForecastHorizon {
    pub fn new(days: u32) -> Result<Self, PipelineError> {
        if !(MIN_HORIZON_DAYS..=MAX_HORIZON_DAYS).contains(&days) {
            return Err(PipelineError::InvalidHorizon {
                days,
                min: MIN_HORIZON_DAYS,
                max: MAX_HORIZON_DAYS,
            });
        }
        Ok(Self(days))
    }

    pub fn days(&self) -> u32 {
        self.0
    }
}

/// One row of normalized model output.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastPoint {
    pub timestamp: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

/// The full normalized forecast (history + future). Construction goes
/// through `forecast::run_forecast`, which checks lower <= predicted <= upper
/// for every point.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalForecast {
    points: Vec<ForecastPoint>,
    horizon: ForecastHorizon,
}

impl CanonicalForecast {
    pub(crate) fn new(points: Vec<ForecastPoint>, horizon: ForecastHorizon) -> Self {
        Self { points, horizon }
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn horizon(&self) -> ForecastHorizon {
        self.horizon
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The future tail: the last `horizon` points, or everything when the
    /// forecast is shorter than the horizon.
    pub fn future_tail(&self) -> &[ForecastPoint] {
        let n = self.points.len();
        let take = (self.horizon.0 as usize).min(n);
        &self.points[n - take..]
    }
}

/// One (date, predicted) record of the payload embedded in the prompt.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SummaryEntry {
    pub date: NaiveDate,
    pub predicted: f64,
}

/// The bounded-size slice of forecast data sent to the text service.
/// At most `horizon` entries, so never more than 365.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SummaryPayload {
    entries: Vec<SummaryEntry>,
}

impl SummaryPayload {
    pub fn from_forecast(forecast: &CanonicalForecast) -> Self {
        let entries = forecast
            .future_tail()
            .iter()
            .map(|p| SummaryEntry {
                date: p.timestamp,
                predicted: p.predicted,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[SummaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Generated commentary plus the provenance the caller displays next to it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Commentary {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub generated_at: String,
}

/// Everything a successful run produces. On failure nothing partial is
/// returned; the error alone comes back.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub series: ValidatedSeries,
    pub forecast: CanonicalForecast,
    pub commentary: Commentary,
}
