//! Gemini `generateContent` adapter.

use std::time::Duration;

use chrono::NaiveTime;
use reqwest::{Client, StatusCode};
use serde_json::json;
use url::Url;

use super::{parse_reorder, strip_fences, Advisor, Estimate, EstimateRequest, ScheduleCandidate};
use crate::error::AdvisoryError;
use crate::record::{hhmm, RecordId};
use crate::storage::AdvisoryConfig;

const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Clone)]
pub struct GeminiAdvisor {
    client: Client,
    base_url: Url,
    model: String,
    api_key: Option<String>,
}

impl GeminiAdvisor {
    /// Build from config, resolving the API key from the environment or keyring.
    pub fn from_config(config: &AdvisoryConfig) -> Result<Self, AdvisoryError> {
        Self::new(config, super::api_key())
    }

    pub fn new(config: &AdvisoryConfig, api_key: Option<String>) -> Result<Self, AdvisoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        let mut base_url = Url::parse(&config.endpoint)
            .map_err(|e| AdvisoryError::Malformed(format!("bad endpoint '{}': {e}", config.endpoint)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client,
            base_url,
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> Result<Url, AdvisoryError> {
        self.base_url
            .join(&format!("v1beta/models/{}:generateContent", self.model))
            .map_err(|e| AdvisoryError::Malformed(format!("bad model name '{}': {e}", self.model)))
    }

    /// Send one prompt and return the parsed JSON answer.
    async fn generate(&self, prompt: &str) -> Result<serde_json::Value, AdvisoryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AdvisoryError::MissingCredentials)?;

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        tracing::debug!(model = %self.model, "advisory request");
        let resp = self
            .client
            .post(self.endpoint()?)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => AdvisoryError::RateLimited,
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AdvisoryError::MissingCredentials,
                _ => AdvisoryError::Upstream {
                    status: status.as_u16(),
                    message: text.chars().take(MAX_ERROR_BODY).collect(),
                },
            });
        }

        let envelope: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| AdvisoryError::Malformed(e.to_string()))?;
        let text = envelope["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| AdvisoryError::Malformed("no text in response".into()))?;

        serde_json::from_str(&strip_fences(text))
            .map_err(|e| AdvisoryError::Malformed(format!("answer is not JSON: {e}")))
    }
}

fn estimate_prompt(request: &EstimateRequest) -> String {
    format!(
        "Analyze task: \"{text}\"\n\
         Domain: \"{domain}\"\n\
         Current Date: \"{today}\"\n\
         Scales 1-5 (5 is highest). Estimate 'duration' in minutes.\n\
         Output JSON only: {{ \"importance\": int, \"urgency\": int, \"duration\": int, \"reasoning\": \"one short sentence\" }}",
        text = request.text,
        domain = request.domain.label(),
        today = request.today.format("%Y-%m-%d"),
    )
}

fn reorder_prompt(candidates: &[ScheduleCandidate], start: NaiveTime) -> String {
    let tasks = serde_json::to_string(candidates).unwrap_or_else(|_| "[]".into());
    format!(
        "You are a master scheduler. Organize these tasks into an optimal daily schedule starting at {start}.\n\
         Rules:\n\
         1. High importance \"Deep Work\" (Study/Work) should generally be earlier in the day when energy is high.\n\
         2. \"Household\" or low importance tasks can be later or used as breaks.\n\
         3. Group similar domains if logical.\n\n\
         Tasks: {tasks}\n\n\
         Return ONLY a JSON array of task IDs in the optimal order.",
        start = hhmm::format_time(start),
    )
}

impl Advisor for GeminiAdvisor {
    async fn estimate(&self, request: &EstimateRequest) -> Result<Estimate, AdvisoryError> {
        let answer = self.generate(&estimate_prompt(request)).await?;
        Estimate::from_json(&answer)
    }

    async fn reorder(
        &self,
        candidates: &[ScheduleCandidate],
        start: NaiveTime,
    ) -> Result<Vec<RecordId>, AdvisoryError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let answer = self.generate(&reorder_prompt(candidates, start)).await?;
        parse_reorder(&answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Domain;

    #[test]
    fn endpoint_appends_model_path() {
        let config = AdvisoryConfig {
            endpoint: "http://localhost:9999/proxy".into(),
            ..Default::default()
        };
        let advisor = GeminiAdvisor::new(&config, None).unwrap();
        assert_eq!(
            advisor.endpoint().unwrap().as_str(),
            "http://localhost:9999/proxy/v1beta/models/gemini-2.5-flash-lite:generateContent"
        );
    }

    #[test]
    fn prompts_carry_inputs() {
        let request = EstimateRequest {
            text: "Finish thesis chapter".into(),
            domain: Domain::Family,
            today: "2025-12-14".parse().unwrap(),
        };
        let prompt = estimate_prompt(&request);
        assert!(prompt.contains("Finish thesis chapter"));
        assert!(prompt.contains("Family & friends"));
        assert!(prompt.contains("2025-12-14"));

        let prompt = reorder_prompt(&[], hhmm::parse_time("08:30").unwrap());
        assert!(prompt.contains("starting at 08:30"));
    }
}
