use crate::models::SummaryPayload;

/// System role sent with every commentary request.
pub const SYSTEM_PROMPT: &str =
    "You are a financial analyst skilled in forecasting interpretation.";

/// Build the commentary prompt: the fixed FP&A instruction template with the
/// forecast payload embedded as JSON. The payload is opaque data inside the
/// prompt; no analysis happens here.
pub fn build_commentary_prompt(payload: &SummaryPayload) -> String {
    let json_data =
        serde_json::to_string(payload.entries()).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"You are a financial planning and analysis (FP&A) expert. You have been given a time series forecast of revenue.
Please analyze it and provide:
- Key trends and inflection points.
- Potential business implications.
- A short, clear summary a CFO would care about.
Forecast data (in JSON): {}"#,
        json_data
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonicalForecast, ForecastHorizon, ForecastPoint};
    use chrono::{Days, NaiveDate};

    fn forecast(len: usize, horizon_days: u32) -> CanonicalForecast {
        let horizon = ForecastHorizon::new(horizon_days).unwrap();
        let start = NaiveDate::parse_from_str("2023-01-01", "%Y-%m-%d").unwrap();
        let points = (0..len)
            .map(|i| ForecastPoint {
                timestamp: start + Days::new(i as u64),
                predicted: 100.0 + i as f64,
                lower: 90.0 + i as f64,
                upper: 110.0 + i as f64,
            })
            .collect();
        CanonicalForecast::new(points, horizon)
    }

    #[test]
    fn test_payload_len_equals_horizon_with_enough_history() {
        let payload = SummaryPayload::from_forecast(&forecast(400, 90));
        assert_eq!(payload.len(), 90);
    }

    #[test]
    fn test_payload_len_capped_by_forecast() {
        let payload = SummaryPayload::from_forecast(&forecast(20, 30));
        assert_eq!(payload.len(), 20);
    }

    #[test]
    fn test_prompt_embeds_payload_and_instructions() {
        let payload = SummaryPayload::from_forecast(&forecast(40, 30));
        let prompt = build_commentary_prompt(&payload);

        assert!(prompt.contains("Key trends and inflection points"));
        assert!(prompt.contains("a CFO would care about"));
        // Tail of a 40-point forecast at horizon 30 starts at index 10.
        assert!(prompt.contains(r#""date":"2023-01-11""#));
        assert!(prompt.contains(r#""predicted":110.0"#));
        // History before the tail stays out of the payload.
        assert!(!prompt.contains("2023-01-01"));
    }
}
