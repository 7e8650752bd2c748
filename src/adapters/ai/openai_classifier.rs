//! OpenAI-compatible semantic classifier.
//!
//! Sends one chat completion per classification, asking the model for a JSON
//! object `{"label": ..., "confidence": ...}` restricted to the request's
//! allowed labels. Works against any endpoint speaking the OpenAI chat
//! completions protocol.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::foundation::HistoryRole;
use crate::ports::{ClassifierError, SemanticClassifier, SemanticLabel, SemanticRequest};

/// History entries included in the prompt, newest last.
const MAX_HISTORY_MESSAGES: usize = 6;

/// Configuration for the OpenAI classifier.
#[derive(Debug)]
pub struct OpenAiClassifierConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenAiClassifierConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

pub struct OpenAiSemanticClassifier {
    config: OpenAiClassifierConfig,
    client: Client,
}

impl OpenAiSemanticClassifier {
    pub fn new(config: OpenAiClassifierConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassifierError::Unavailable(format!("HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_openai_request(&self, request: &SemanticRequest) -> OpenAIRequest {
        let system = format!(
            "You classify customer support messages. Answer with a JSON object \
             {{\"label\": string, \"confidence\": number between 0 and 1}}. \
             The label must be exactly one of: {}. Use \"none\" when no label clearly applies.",
            request.allowed_labels.join(", ")
        );

        let mut messages = vec![OpenAIMessage {
            role: "system".to_string(),
            content: system,
        }];

        let skip = request.history.len().saturating_sub(MAX_HISTORY_MESSAGES);
        for entry in request.history.iter().skip(skip) {
            let role = match entry.role {
                HistoryRole::User => "user",
                HistoryRole::Assistant => "assistant",
                HistoryRole::System | HistoryRole::Other => continue,
            };
            messages.push(OpenAIMessage {
                role: role.to_string(),
                content: entry.content.clone(),
            });
        }

        messages.push(OpenAIMessage {
            role: "user".to_string(),
            content: request.message.clone(),
        });

        OpenAIRequest {
            model: self.config.model.clone(),
            messages,
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
        }
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, ClassifierError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClassifierError::Unavailable(format!("status {}: {}", status, body)))
    }

    /// Parses the model's reply, tolerating prose around the JSON object.
    pub(crate) fn parse_label(content: &str) -> Result<SemanticLabel, ClassifierError> {
        let start = content.find('{');
        let end = content.rfind('}');
        let json = match (start, end) {
            (Some(s), Some(e)) if s < e => &content[s..=e],
            _ => return Err(ClassifierError::InvalidResponse(content.to_string())),
        };

        let reply: LabelReply = serde_json::from_str(json)
            .map_err(|e| ClassifierError::InvalidResponse(format!("{}: {}", e, json)))?;
        Ok(SemanticLabel::new(
            reply.label.trim().to_string(),
            reply.confidence.clamp(0.0, 1.0),
        ))
    }
}

#[async_trait]
impl SemanticClassifier for OpenAiSemanticClassifier {
    async fn classify(&self, request: SemanticRequest) -> Result<SemanticLabel, ClassifierError> {
        let body = self.to_openai_request(&request);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout
                } else {
                    ClassifierError::Unavailable(e.to_string())
                }
            })?;

        let response = self.handle_response_status(response).await?;
        let parsed: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ClassifierError::InvalidResponse("no choices".to_string()))?;

        let label = Self::parse_label(&content)?;
        tracing::debug!(label = %label.label, confidence = label.confidence, "Semantic classification");
        Ok(label)
    }
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct LabelReply {
    label: String,
    #[serde(default)]
    confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::HistoryEntry;

    fn classifier() -> OpenAiSemanticClassifier {
        OpenAiSemanticClassifier::new(
            OpenAiClassifierConfig::new("sk-test").with_base_url("http://localhost:9/v1/"),
        )
        .unwrap()
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        assert_eq!(classifier().completions_url(), "http://localhost:9/v1/chat/completions");
    }

    #[test]
    fn request_lists_allowed_labels_and_skips_system_history() {
        let request = SemanticRequest::new("where is my money", vec!["deposit".to_string()])
            .with_history(vec![
                HistoryEntry::user("hi"),
                HistoryEntry {
                    role: HistoryRole::System,
                    content: "internal".into(),
                },
                HistoryEntry::assistant("hello"),
            ]);

        let body = classifier().to_openai_request(&request);
        assert!(body.messages[0].content.contains("deposit, none"));
        let roles: Vec<&str> = body.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(body.messages.last().unwrap().content, "where is my money");
    }

    #[test]
    fn parses_json_reply_with_surrounding_text() {
        let label = OpenAiSemanticClassifier::parse_label(
            "Sure: {\"label\": \"withdrawal\", \"confidence\": 0.83} done",
        )
        .unwrap();
        assert_eq!(label, SemanticLabel::new("withdrawal", 0.83));
    }

    #[test]
    fn clamps_confidence() {
        let label = OpenAiSemanticClassifier::parse_label(r#"{"label":"none","confidence":7}"#).unwrap();
        assert!((label.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_json_reply() {
        assert!(matches!(
            OpenAiSemanticClassifier::parse_label("deposit"),
            Err(ClassifierError::InvalidResponse(_))
        ));
    }
}
