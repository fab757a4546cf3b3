//! xAI / Grok completion provider.
//!
//! The xAI API is OpenAI-compatible at `https://api.x.ai/v1`; this provider
//! speaks the Chat Completions format via `reqwest`.
//!
//! # Environment Variables
//!
//! - `XAI_API_KEY` — xAI API key (required at first use)
//! - `XAI_BASE_URL` — Custom base URL (defaults to `https://api.x.ai/v1`)

use async_trait::async_trait;
use serde_json::Value;

use crate::oracle::providers::ChatCompletion;
use crate::utilities::errors::OracleError;

/// Default xAI API base URL.
pub const XAI_DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";

/// xAI completion implementation.
#[derive(Debug, Clone)]
pub struct XAICompletion {
    /// Model identifier (e.g. "grok-3").
    pub model: String,
    /// API key; `None` means unconfigured.
    pub api_key: Option<String>,
    /// Custom base URL override.
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout: f64,
}

impl XAICompletion {
    /// Create a new xAI provider.
    ///
    /// # Arguments
    ///
    /// * `model` - xAI model name (e.g. "grok-3").
    /// * `api_key` - Optional API key (defaults to `XAI_API_KEY` env var).
    /// * `base_url` - Optional custom base URL.
    pub fn new(
        model: impl Into<String>,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        let api_key = api_key.or_else(|| std::env::var("XAI_API_KEY").ok());
        Self {
            model: model.into(),
            api_key,
            base_url,
            timeout: 60.0,
        }
    }

    /// Get the API base URL.
    pub fn api_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| XAI_DEFAULT_BASE_URL.to_string())
    }

    /// Build the Chat Completions request body.
    pub fn build_request_body(&self, system_prompt: &str, user_message: &str) -> Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_message}
            ],
        })
    }

    /// Pull the first choice's message content out of a response.
    fn parse_response(&self, response: &Value) -> Result<String, OracleError> {
        response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| OracleError::provider("xAI", "no message content in response"))
    }
}

#[async_trait]
impl ChatCompletion for XAICompletion {
    fn provider_name(&self) -> &str {
        "xAI"
    }

    async fn chat(&self, system_prompt: &str, user_message: &str) -> Result<String, OracleError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| OracleError::missing_key("XAI_API_KEY"))?;

        let body = self.build_request_body(system_prompt, user_message);
        let endpoint = format!("{}/chat/completions", self.api_base_url());

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs_f64(self.timeout))
            .build()
            .map_err(|e| OracleError::provider("xAI", e.to_string()))?;

        let response = client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::provider("xAI", e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OracleError::provider("xAI", e.to_string()))?;
        if !status.is_success() {
            return Err(OracleError::provider(
                "xAI",
                format!("{} - {}", status.as_u16(), text),
            ));
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| OracleError::provider("xAI", format!("unparseable response: {}", e)))?;
        self.parse_response(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> XAICompletion {
        XAICompletion {
            model: "grok-3".to_string(),
            api_key: None,
            base_url: None,
            timeout: 60.0,
        }
    }

    #[test]
    fn test_api_base_url_default() {
        assert_eq!(unconfigured().api_base_url(), "https://api.x.ai/v1");
    }

    #[test]
    fn test_api_base_url_custom() {
        let provider = XAICompletion {
            base_url: Some("https://custom.api.com/v1".to_string()),
            ..unconfigured()
        };
        assert_eq!(provider.api_base_url(), "https://custom.api.com/v1");
    }

    #[test]
    fn test_default_timeout_is_one_minute() {
        let provider = XAICompletion::new("grok-3", Some("key".to_string()), None);
        assert_eq!(provider.timeout, 60.0);
    }

    #[test]
    fn test_build_request_body() {
        let body = unconfigured().build_request_body("be poetic", "what is love?");
        assert_eq!(body["model"], "grok-3");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "what is love?");
    }

    #[test]
    fn test_parse_response() {
        let response = serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Love flows like the Nile."}
            }]
        });
        let answer = unconfigured().parse_response(&response).unwrap();
        assert_eq!(answer, "Love flows like the Nile.");
    }

    #[tokio::test]
    async fn test_chat_without_key_is_configuration_error() {
        let err = unconfigured().chat("s", "u").await.unwrap_err();
        assert!(matches!(err, OracleError::Configuration { .. }));
        assert!(err.to_string().contains("XAI_API_KEY"));
    }
}
