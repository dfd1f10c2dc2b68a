use thiserror::Error;

/// Which pipeline stage an error belongs to.
/// The pipeline is linear (ingest -> forecast -> summarize), so every
/// failure maps to exactly one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Ingesting,
    Forecasting,
    Summarizing,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Ingesting => "ingesting",
            PipelineStage::Forecasting => "forecasting",
            PipelineStage::Summarizing => "summarizing",
        }
    }
}

/// Every failure the pipeline can surface. One variant per failure kind so
/// callers can branch on the kind instead of parsing a message string.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Upload is not readable as CSV: {0}")]
    Malformed(#[from] csv::Error),

    #[error("File must contain 'Date' and 'Revenue' columns (missing: {})", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("No usable rows left after dropping blanks")]
    EmptyDataset,

    #[error("Row {row}: '{value}' is not a recognized date")]
    DateParse { row: usize, value: String },

    #[error("Forecast horizon must be between {min} and {max} days, got {days}")]
    InvalidHorizon { days: u32, min: u32, max: u32 },

    #[error("Forecast service failed: {0}")]
    ForecastService(String),

    #[error("Forecast row {row} ({date}) violates lower <= predicted <= upper ({lower}, {predicted}, {upper})")]
    ForecastInvariant {
        row: usize,
        date: chrono::NaiveDate,
        lower: f64,
        predicted: f64,
        upper: f64,
    },

    #[error("Text generation service failed: {0}")]
    SummaryService(String),

    #[error("API key is missing! Set {var} in the environment or a .env file")]
    MissingApiKey { var: String },
}

impl PipelineError {
    /// The stage this error aborts. Lets a caller render where the linear
    /// run stopped without inspecting every variant.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Malformed(_)
            | PipelineError::MissingColumns { .. }
            | PipelineError::EmptyDataset
            | PipelineError::DateParse { .. } => PipelineStage::Ingesting,
            PipelineError::InvalidHorizon { .. }
            | PipelineError::ForecastService(_)
            | PipelineError::ForecastInvariant { .. } => PipelineStage::Forecasting,
            PipelineError::SummaryService(_) => PipelineStage::Summarizing,
            // Config errors are raised before the first stage runs; report
            // them against ingestion since nothing later ever started.
            PipelineError::MissingApiKey { .. } => PipelineStage::Ingesting,
        }
    }
}
