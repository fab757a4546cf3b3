//! External AI provider integrations.
//!
//! Two seams: [`ChatCompletion`] for one-shot question answering and
//! [`AudioGateway`] for speech-to-text / text-to-speech. Request handlers
//! and the dispatcher only ever see the traits, so tests can substitute
//! counting stubs and assert that a misconfigured persona performs zero
//! network calls.

pub mod openai;
pub mod xai;

use std::path::Path;

use async_trait::async_trait;

use crate::utilities::errors::OracleError;

pub use openai::OpenAICompletion;
pub use xai::XAICompletion;

/// A chat-completion backend for one persona.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Name recorded as the serving source in the transcript
    /// (e.g. `"OpenAI"`, `"xAI"`).
    fn provider_name(&self) -> &str;

    /// Issue a single chat completion: fixed system prompt plus the
    /// seeker's question, answer text back.
    ///
    /// Fails with a configuration error before any network call when the
    /// provider's key is missing, and with a provider error on a
    /// non-success response or transport failure. No retries.
    async fn chat(&self, system_prompt: &str, user_message: &str) -> Result<String, OracleError>;
}

/// Speech-to-text and text-to-speech backend.
#[async_trait]
pub trait AudioGateway: Send + Sync {
    /// Transcribe the audio file at `path` to text.
    async fn transcribe(&self, path: &Path) -> Result<String, OracleError>;

    /// Synthesize speech for `text` in the named voice, returning encoded
    /// audio bytes (mp3).
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, OracleError>;
}
