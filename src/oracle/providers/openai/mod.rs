//! OpenAI provider: chat completions, whisper transcription and speech
//! synthesis via `reqwest`.
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY` — OpenAI API key (required at first use)
//! - `OPENAI_BASE_URL` — Custom base URL (defaults to `https://api.openai.com/v1`)

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::oracle::providers::{AudioGateway, ChatCompletion};
use crate::utilities::errors::OracleError;

/// Default OpenAI API base URL.
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used for speech-to-text.
pub const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Model used for text-to-speech.
pub const SPEECH_MODEL: &str = "tts-1";

/// OpenAI completion implementation.
///
/// One instance is bound to one model. The API key is optional at
/// construction; a missing key surfaces as a configuration error when the
/// provider is first exercised, never at startup.
#[derive(Debug, Clone)]
pub struct OpenAICompletion {
    /// Model identifier (e.g. "gpt-4o").
    pub model: String,
    /// API key; `None` means unconfigured.
    pub api_key: Option<String>,
    /// Custom base URL override.
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout: f64,
    /// Sampling temperature, when set.
    pub temperature: Option<f64>,
    /// Completion token cap, when set.
    pub max_tokens: Option<u32>,
}

impl OpenAICompletion {
    /// Create a new OpenAI provider.
    ///
    /// # Arguments
    ///
    /// * `model` - OpenAI model name (e.g. "gpt-4o").
    /// * `api_key` - Optional API key (defaults to `OPENAI_API_KEY` env var).
    /// * `base_url` - Optional custom base URL.
    pub fn new(
        model: impl Into<String>,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        let api_key = api_key.or_else(|| std::env::var("OPENAI_API_KEY").ok());
        Self {
            model: model.into(),
            api_key,
            base_url,
            timeout: 120.0,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Builder: set sampling parameters.
    pub fn with_sampling(mut self, temperature: f64, max_tokens: u32) -> Self {
        self.temperature = Some(temperature);
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Get the API base URL.
    pub fn api_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| OPENAI_DEFAULT_BASE_URL.to_string())
    }

    fn require_key(&self) -> Result<&str, OracleError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| OracleError::missing_key("OPENAI_API_KEY"))
    }

    fn client(&self) -> Result<reqwest::Client, OracleError> {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs_f64(self.timeout))
            .build()
            .map_err(|e| OracleError::provider("OpenAI", e.to_string()))
    }

    /// Build the Chat Completions request body.
    pub fn build_request_body(&self, system_prompt: &str, user_message: &str) -> Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_message}
            ],
        });
        if let Some(temp) = self.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        body
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
            .ok_or_else(|| OracleError::provider("OpenAI", "no message content in response"))
    }
}

#[async_trait]
impl ChatCompletion for OpenAICompletion {
    fn provider_name(&self) -> &str {
        "OpenAI"
    }

    async fn chat(&self, system_prompt: &str, user_message: &str) -> Result<String, OracleError> {
        let api_key = self.require_key()?;
        let body = self.build_request_body(system_prompt, user_message);
        let endpoint = format!("{}/chat/completions", self.api_base_url());

        let response = self
            .client()?
            .post(&endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::provider("OpenAI", e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OracleError::provider("OpenAI", e.to_string()))?;
        if !status.is_success() {
            return Err(OracleError::provider(
                "OpenAI",
                format!("{} - {}", status.as_u16(), text),
            ));
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| OracleError::provider("OpenAI", format!("unparseable response: {}", e)))?;
        self.parse_response(&json)
    }
}

#[async_trait]
impl AudioGateway for OpenAICompletion {
    async fn transcribe(&self, path: &Path) -> Result<String, OracleError> {
        let api_key = self.require_key()?;
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.webm".to_string());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .text("model", TRANSCRIPTION_MODEL)
            .part("file", part);

        let endpoint = format!("{}/audio/transcriptions", self.api_base_url());
        let response = self
            .client()?
            .post(&endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| OracleError::provider("OpenAI", e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OracleError::provider("OpenAI", e.to_string()))?;
        if !status.is_success() {
            return Err(OracleError::provider(
                "OpenAI",
                format!("{} - {}", status.as_u16(), text),
            ));
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| OracleError::provider("OpenAI", format!("unparseable response: {}", e)))?;
        json.get("text")
            .and_then(|t| t.as_str())
            .map(|t| t.trim().to_string())
            .ok_or_else(|| OracleError::provider("OpenAI", "no text in transcription response"))
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, OracleError> {
        let api_key = self.require_key()?;
        let body = serde_json::json!({
            "model": SPEECH_MODEL,
            "voice": voice,
            "input": text,
        });

        let endpoint = format!("{}/audio/speech", self.api_base_url());
        let response = self
            .client()?
            .post(&endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::provider("OpenAI", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::provider(
                "OpenAI",
                format!("{} - {}", status.as_u16(), body),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| OracleError::provider("OpenAI", e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured(model: &str) -> OpenAICompletion {
        OpenAICompletion {
            model: model.to_string(),
            api_key: None,
            base_url: None,
            timeout: 120.0,
            temperature: None,
            max_tokens: None,
        }
    }

    #[test]
    fn test_api_base_url_default() {
        let provider = unconfigured("gpt-4o");
        assert_eq!(provider.api_base_url(), "https://api.openai.com/v1");
    }

    #[test]
    fn test_api_base_url_custom() {
        let provider = OpenAICompletion {
            base_url: Some("https://proxy.example.com/v1".to_string()),
            ..unconfigured("gpt-4o")
        };
        assert_eq!(provider.api_base_url(), "https://proxy.example.com/v1");
    }

    #[test]
    fn test_build_request_body() {
        let provider = unconfigured("gpt-4o").with_sampling(0.7, 1000);
        let body = provider.build_request_body("be wise", "what is truth?");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be wise");
        assert_eq!(body["messages"][1]["content"], "what is truth?");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn test_build_request_body_without_sampling() {
        let provider = unconfigured("gpt-4o");
        let body = provider.build_request_body("s", "u");
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_parse_response() {
        let provider = unconfigured("gpt-4o");
        let response = serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Justice is..."},
                "finish_reason": "stop"
            }]
        });
        assert_eq!(provider.parse_response(&response).unwrap(), "Justice is...");
    }

    #[test]
    fn test_parse_response_missing_content() {
        let provider = unconfigured("gpt-4o");
        let response = serde_json::json!({"choices": []});
        assert!(provider.parse_response(&response).is_err());
    }

    #[tokio::test]
    async fn test_chat_without_key_is_configuration_error() {
        let provider = unconfigured("gpt-4o");
        let err = provider.chat("s", "u").await.unwrap_err();
        assert!(matches!(err, OracleError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_synthesize_without_key_is_configuration_error() {
        let provider = unconfigured("gpt-4o");
        let err = provider.synthesize("hello", "onyx").await.unwrap_err();
        assert!(matches!(err, OracleError::Configuration { .. }));
    }
}
