//! Revenue forecasting pipeline.
//!
//! Takes uploaded tabular revenue history, validates it into a clean
//! two-column time series, delegates curve-fitting to an external
//! forecasting service, and asks an external chat-completions endpoint for
//! natural-language commentary on the result. One linear run per upload,
//! no persistence, no retries.
//!
//! Both external services sit behind injected traits
//! ([`forecast::ForecastProvider`], [`llm::TextProvider`]) so the pipeline
//! runs against deterministic stubs in tests.

pub mod error;
pub mod forecast;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod pipeline;

pub use error::{PipelineError, PipelineStage};
pub use models::{
    CanonicalForecast, Commentary, ForecastHorizon, ForecastPoint, PipelineOutput,
    SummaryEntry, SummaryPayload, TimeSeriesPoint, ValidatedSeries,
};
pub use pipeline::{Pipeline, PipelineConfig};
