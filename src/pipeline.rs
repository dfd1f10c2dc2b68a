use crate::error::PipelineError;
use crate::forecast::{self, service::HttpForecastService, ForecastProvider};
use crate::ingest;
use crate::llm::openai::{ChatCompletionsClient, DEFAULT_MODEL, GROQ_BASE_URL};
use crate::llm::prompt::{build_commentary_prompt, SYSTEM_PROMPT};
use crate::llm::TextProvider;
use crate::models::{Commentary, ForecastHorizon, PipelineOutput, SummaryPayload};
use std::sync::Arc;
use tracing::info;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const MODEL_VAR: &str = "LLM_MODEL";
pub const LLM_BASE_URL_VAR: &str = "LLM_BASE_URL";
pub const FORECAST_URL_VAR: &str = "FORECAST_SERVICE_URL";

const DEFAULT_FORECAST_URL: &str = "http://localhost:8000";

/// Explicit configuration for one pipeline instance. Passed in rather than
/// read from globals at call time, so differently-configured pipelines can
/// coexist in one process.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api_key: String,
    pub model: String,
    pub llm_base_url: String,
    pub forecast_url: String,
}

impl PipelineConfig {
    /// Load from the environment (and a `.env` file when present). A missing
    /// or blank API key fails here, at startup, not on the first request.
    pub fn from_env() -> Result<Self, PipelineError> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| PipelineError::MissingApiKey {
                var: API_KEY_VAR.to_string(),
            })?;

        Ok(Self {
            api_key,
            model: std::env::var(MODEL_VAR).unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            llm_base_url: std::env::var(LLM_BASE_URL_VAR)
                .unwrap_or_else(|_| GROQ_BASE_URL.to_string()),
            forecast_url: std::env::var(FORECAST_URL_VAR)
                .unwrap_or_else(|_| DEFAULT_FORECAST_URL.to_string()),
        })
    }
}

/// The whole run, strictly sequential: ingest -> forecast -> summarize.
/// Any stage failure short-circuits the rest; nothing partial is returned.
pub struct Pipeline {
    forecaster: Arc<dyn ForecastProvider>,
    writer: Arc<dyn TextProvider>,
}

impl Pipeline {
    /// Inject the two external collaborators. Tests pass deterministic stubs
    /// here instead of live clients.
    pub fn new(forecaster: Arc<dyn ForecastProvider>, writer: Arc<dyn TextProvider>) -> Self {
        Self { forecaster, writer }
    }

    /// Live clients wired from config: the HTTP forecast service plus an
    /// OpenAI-compatible chat endpoint.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            Arc::new(HttpForecastService::new(config.forecast_url.clone())),
            Arc::new(ChatCompletionsClient::new(
                config.api_key.clone(),
                config.llm_base_url.clone(),
                config.model.clone(),
            )),
        )
    }

    pub async fn run(
        &self,
        raw: &[u8],
        horizon_days: u32,
    ) -> Result<PipelineOutput, PipelineError> {
        let horizon = ForecastHorizon::new(horizon_days)?;

        info!(stage = "ingesting", bytes = raw.len(), "pipeline run started");
        let series = ingest::validate(raw)?;

        info!(stage = "forecasting", points = series.len(), "series validated");
        let forecast =
            forecast::run_forecast(self.forecaster.as_ref(), &series, horizon).await?;

        info!(stage = "summarizing", rows = forecast.len(), "forecast normalized");
        let payload = SummaryPayload::from_forecast(&forecast);
        let prompt = build_commentary_prompt(&payload);
        let text = self.writer.generate(SYSTEM_PROMPT, &prompt).await?;

        let commentary = Commentary {
            text,
            provider: self.writer.name().to_string(),
            model: self.writer.model().to_string(),
            generated_at: chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        };

        info!(stage = "done", "pipeline run finished");
        Ok(PipelineOutput {
            series,
            forecast,
            commentary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Set and unset inside one test so nothing races on the process env.
    #[test]
    fn test_from_env_requires_api_key() {
        // Defaults below only hold with the overrides cleared.
        std::env::remove_var(MODEL_VAR);
        std::env::remove_var(LLM_BASE_URL_VAR);
        std::env::remove_var(FORECAST_URL_VAR);

        std::env::set_var(API_KEY_VAR, "test-key");
        let config = PipelineConfig::from_env().unwrap();
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.llm_base_url, GROQ_BASE_URL);

        std::env::set_var(API_KEY_VAR, "   ");
        assert!(matches!(
            PipelineConfig::from_env().unwrap_err(),
            PipelineError::MissingApiKey { .. }
        ));

        std::env::remove_var(API_KEY_VAR);
        assert!(matches!(
            PipelineConfig::from_env().unwrap_err(),
            PipelineError::MissingApiKey { .. }
        ));
    }
}
