//! OpenAI-compatible content provider.
//!
//! Works with any endpoint exposing `/v1/chat/completions` (OpenAI,
//! OpenRouter, Ollama, vLLM, ...). Exercises and grades are requested as JSON
//! objects and parsed straight into the core types.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use studyplan_core::{
    ContentProvider, EvaluationRequest, EvaluationResult, ExercisePayload, GenerationRequest,
    ProviderError,
};
use tracing::{debug, warn};

const GENERATION_SYSTEM_PROMPT: &str = "You write study exercises. Reply with a single JSON object with fields: \
\"prompt\" (string), \"options\" (array of strings, multiple choice only), \
\"answer\" (object tagged by \"kind\": {\"kind\":\"choice\",\"index\":n} | {\"kind\":\"boolean\",\"value\":b} | \
{\"kind\":\"text\",\"value\":s} | {\"kind\":\"numeric\",\"value\":x,\"tolerance\":t} | {\"kind\":\"self_report\"}), \
\"rubric\" (string, open-ended exercises only). Difficulty runs from 1 (easiest) to 5 (hardest).";

const EVALUATION_SYSTEM_PROMPT: &str = "You grade a learner's answer to a study exercise. Reply with a single JSON object \
with fields: \"correct\" (bool), \"score\" (number from 0 to 1), \"feedback\" (one or two sentences addressed to the learner). \
Follow the rubric when one is given.";

/// An OpenAI-compatible content provider.
pub struct OpenAiCompatContentProvider {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    /// Applied to every request, so it holds whatever client is in use
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiCompatContentProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.7,
            timeout: Duration::from_secs(120),
            client: reqwest::Client::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the chat completions body for a system/user message pair.
    fn chat_body(&self, system: &str, user: String, temperature: f32) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": temperature,
            "response_format": { "type": "json_object" },
            "stream": false,
        })
    }

    fn chat_request(&self, body: &serde_json::Value) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/chat/completions", self.base_url))
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
    }

    /// Send a chat completion request and return the assistant's text.
    async fn chat(&self, body: serde_json::Value) -> Result<String, ProviderError> {
        let response = self
            .chat_request(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::NotConfigured(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })
    }
}

/// Pull the JSON object out of a model reply, tolerating ```json fences.
fn parse_json_reply<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ProviderError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(unfenced)
        .map_err(|e| ProviderError::InvalidPayload(format!("model reply is not valid JSON: {e}")))
}

#[async_trait]
impl ContentProvider for OpenAiCompatContentProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: GenerationRequest) -> Result<ExercisePayload, ProviderError> {
        let user = format!(
            "Template: {}\nTier: {}\nTopic: {}\nDifficulty: {}\nAssessment: {}",
            request.template, request.tier, request.topic, request.difficulty, request.assessment
        );

        debug!(
            provider = %self.name,
            model = %self.model,
            template = %request.template,
            topic = %request.topic,
            "Requesting exercise content"
        );

        let content = self
            .chat(self.chat_body(GENERATION_SYSTEM_PROMPT, user, self.temperature))
            .await?;
        parse_json_reply(&content)
    }

    async fn evaluate(&self, request: EvaluationRequest) -> Result<EvaluationResult, ProviderError> {
        let exercise = serde_json::to_string(&request.exercise)
            .map_err(|e| ProviderError::InvalidPayload(e.to_string()))?;
        let response = serde_json::to_string(&request.response)
            .map_err(|e| ProviderError::InvalidPayload(e.to_string()))?;
        let user = format!("Exercise: {exercise}\nLearner answer: {response}");

        debug!(
            provider = %self.name,
            model = %self.model,
            template = %request.exercise.template,
            "Requesting grade"
        );

        // Grading should be repeatable
        let content = self
            .chat(self.chat_body(EVALUATION_SYSTEM_PROMPT, user, 0.0))
            .await?;
        let mut result: EvaluationResult = parse_json_reply(&content)?;
        result.graded_by = self.name.clone();
        Ok(result.normalized())
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- OpenAI API types ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyplan_core::AnswerKey;

    #[test]
    fn parses_plain_and_fenced_json() {
        let plain: ExercisePayload = parse_json_reply(
            r#"{"prompt": "2+2?", "answer": {"kind": "numeric", "value": 4}}"#,
        )
        .unwrap();
        assert_eq!(plain.answer, Some(AnswerKey::Numeric { value: 4.0, tolerance: None }));

        let fenced: EvaluationResult = parse_json_reply(
            "```json\n{\"correct\": true, \"score\": 0.9, \"feedback\": \"Good\"}\n```",
        )
        .unwrap();
        assert!(fenced.correct);
        assert_eq!(fenced.graded_by, "");
    }

    #[test]
    fn garbage_reply_is_invalid_payload() {
        let err = parse_json_reply::<ExercisePayload>("Sure! Here's a question:").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidPayload(_)));
    }

    #[test]
    fn chat_body_requests_json() {
        let provider = OpenAiCompatContentProvider::new("openai", "https://api.openai.com/v1/", "sk", "gpt-4o-mini");
        assert_eq!(provider.base_url, "https://api.openai.com/v1");
        let body = provider.chat_body("sys", "user".into(), 0.0);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][1]["content"], "user");
    }

    #[test]
    fn every_request_carries_the_timeout() {
        let provider = OpenAiCompatContentProvider::new("openai", "https://api.openai.com/v1", "sk", "m");
        let body = provider.chat_body("sys", "user".into(), 0.0);
        let request = provider.chat_request(&body).build().unwrap();
        assert_eq!(request.timeout(), Some(&Duration::from_secs(120)));
        assert_eq!(request.url().as_str(), "https://api.openai.com/v1/chat/completions");

        let provider = provider.with_timeout(Duration::from_secs(7));
        let request = provider.chat_request(&body).build().unwrap();
        assert_eq!(request.timeout(), Some(&Duration::from_secs(7)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let provider = OpenAiCompatContentProvider::new("openai", "http://127.0.0.1:9", "sk", "m")
            .with_timeout(Duration::from_secs(2));
        let request = GenerationRequest {
            template: "flashcard".into(),
            tier: studyplan_core::Tier::Recall,
            topic: "limits".into(),
            difficulty: studyplan_core::Difficulty::clamped(2),
            assessment: studyplan_core::AssessmentKind::Quiz,
        };
        let err = provider.generate(request).await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_) | ProviderError::Timeout(_)));
    }
}
