//! LLM-backed question classifier
//!
//! Sends free text to an OpenAI-compatible chat completions endpoint with a
//! forced `classify_and_extract` function call, and parses the call arguments
//! into a [`Classification`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tabdeck_common::config::LlmConfig;
use thiserror::Error;

const USER_AGENT: &str = concat!("tabdeck/", env!("CARGO_PKG_VERSION"));
const FUNCTION_NAME: &str = "classify_and_extract";

/// Classifier errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("No API key configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Function not called")]
    FunctionNotCalled,

    #[error("Parse error: {0}")]
    Parse(String),
}

/// How a piece of text should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Table,
    Graph,
    Text,
}

/// One extracted row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistancePoint {
    pub date: String,
    pub distance: f64,
}

/// Structured result of a classification call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub data: Vec<DistancePoint>,
}

/// Narrow interface the HTTP layer depends on
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, input: &str) -> Result<Classification, ClassifierError>;
}

/// OpenAI chat completions client
pub struct OpenAiClassifier {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAiClassifier {
    pub fn new(config: &LlmConfig) -> Result<Self, ClassifierError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Whether an API key is available
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_body(&self, input: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": input }],
            "functions": [function_schema()],
            "function_call": { "name": FUNCTION_NAME },
        })
    }
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    async fn classify(&self, input: &str) -> Result<Classification, ClassifierError> {
        let api_key = self.api_key.as_deref().ok_or(ClassifierError::NotConfigured)?;
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(model = %self.model, chars = input.len(), "Requesting classification");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request_body(input))
            .send()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api(status.as_u16(), error_text));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(e.to_string()))?;

        parse_function_call(&data)
    }
}

/// Pull the forced function call's arguments out of a completion response
pub fn parse_function_call(response: &Value) -> Result<Classification, ClassifierError> {
    let arguments = response["choices"][0]["message"]["function_call"]["arguments"]
        .as_str()
        .ok_or(ClassifierError::FunctionNotCalled)?;

    serde_json::from_str(arguments).map_err(|e| ClassifierError::Parse(e.to_string()))
}

/// JSON schema of `classify_and_extract`
fn function_schema() -> Value {
    json!({
        "name": FUNCTION_NAME,
        "description": "Classify input as table, graph, or text and extract date-distance pairs",
        "parameters": {
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "description": "One of table, graph, or text",
                    "enum": ["table", "graph", "text"],
                },
                "data": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "date": { "type": "string", "format": "date" },
                            "distance": { "type": "number" },
                        },
                        "required": ["date", "distance"],
                    },
                },
            },
            "required": ["type", "data"],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_function_call() {
        let response = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "function_call": {
                        "name": "classify_and_extract",
                        "arguments": "{\"type\":\"graph\",\"data\":[{\"date\":\"2021-03-12\",\"distance\":3}]}"
                    }
                }
            }]
        });

        let classification = parse_function_call(&response).unwrap();
        assert_eq!(classification.kind, ComponentKind::Graph);
        assert_eq!(classification.data.len(), 1);
        assert_eq!(classification.data[0].distance, 3.0);
    }

    #[test]
    fn test_missing_function_call() {
        let response = json!({
            "choices": [{ "message": { "role": "assistant", "content": "hello" } }]
        });
        assert!(matches!(
            parse_function_call(&response),
            Err(ClassifierError::FunctionNotCalled)
        ));
    }

    #[test]
    fn test_unknown_kind_is_parse_error() {
        let response = json!({
            "choices": [{ "message": { "function_call": {
                "name": "classify_and_extract",
                "arguments": "{\"type\":\"pie\",\"data\":[]}"
            } } }]
        });
        assert!(matches!(
            parse_function_call(&response),
            Err(ClassifierError::Parse(_))
        ));
    }

    #[test]
    fn test_request_body_forces_function() {
        let classifier = OpenAiClassifier::new(&LlmConfig::default()).unwrap();
        let body = classifier.request_body("a graph please");

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["content"], "a graph please");
        assert_eq!(body["function_call"]["name"], "classify_and_extract");
        assert_eq!(body["functions"][0]["parameters"]["required"][0], "type");
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_fast() {
        let classifier = OpenAiClassifier::new(&LlmConfig::default()).unwrap();
        assert!(!classifier.is_configured());
        assert!(matches!(
            classifier.classify("anything").await,
            Err(ClassifierError::NotConfigured)
        ));
    }
}
