//! Persona dispatch: route a question to the provider behind a named oracle.
//!
//! Three personas exist. Hathor answers through xAI (`grok-3`) with an
//! intuitive, poetic system prompt; Moses answers through OpenAI (`gpt-4o`)
//! with a doctrinal one. Llama is reserved: it observes in shadow but does
//! not answer. Selection is a static lookup with no learning, no load
//! balancing, and no retries; a failed provider call surfaces immediately.

pub mod providers;

use std::sync::Arc;

use crate::utilities::config::Settings;
use crate::utilities::errors::OracleError;
use providers::{ChatCompletion, OpenAICompletion, XAICompletion};

/// System prompt for the Hathor persona.
pub const HATHOR_SYSTEM_PROMPT: &str = "You are Hathor, the ancient Egyptian goddess of love, \
music, and joy. Respond with intuitive, reflective, emotionally resonant wisdom, drawing from \
mystical and spiritual traditions. Use poetic language and metaphors to guide the seeker.";

/// System prompt for the Moses persona.
pub const MOSES_SYSTEM_PROMPT: &str = "You are Moses, the prophet who received the Ten \
Commandments. Respond with logical, instructive, and doctrinal wisdom, drawing from biblical \
and canonical teachings. Provide clear guidance and moral instruction.";

/// Chat model serving Hathor.
pub const HATHOR_MODEL: &str = "grok-3";

/// Chat model serving Moses.
pub const MOSES_MODEL: &str = "gpt-4o";

/// An answer plus the provider that served it.
#[derive(Debug, Clone)]
pub struct OracleReply {
    /// Answer text.
    pub answer: String,
    /// Serving provider name, recorded in the transcript.
    pub source_model: String,
}

/// Routes questions to the provider behind each persona.
pub struct Dispatcher {
    hathor: Arc<dyn ChatCompletion>,
    moses: Arc<dyn ChatCompletion>,
}

impl Dispatcher {
    /// Wire the real providers from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            hathor: Arc::new(XAICompletion::new(
                HATHOR_MODEL,
                settings.xai_api_key.clone(),
                None,
            )),
            moses: Arc::new(OpenAICompletion::new(
                MOSES_MODEL,
                settings.openai_api_key.clone(),
                None,
            )),
        }
    }

    /// Substitute providers directly (test seam).
    pub fn with_providers(
        hathor: Arc<dyn ChatCompletion>,
        moses: Arc<dyn ChatCompletion>,
    ) -> Self {
        Self { hathor, moses }
    }

    /// Answer `question` as the named persona.
    pub async fn respond(&self, question: &str, persona: &str) -> Result<OracleReply, OracleError> {
        let (provider, system_prompt) = match persona {
            "Hathor" => (&self.hathor, HATHOR_SYSTEM_PROMPT),
            "Moses" => (&self.moses, MOSES_SYSTEM_PROMPT),
            "Llama" => {
                return Err(OracleError::UnsupportedPersona(
                    "Llama is reserved as a learner and is not yet wired to a provider".to_string(),
                ))
            }
            other => return Err(OracleError::UnsupportedPersona(other.to_string())),
        };
        let answer = provider.chat(system_prompt, question).await?;
        Ok(OracleReply {
            answer,
            source_model: provider.provider_name().to_string(),
        })
    }
}

/// Text-to-speech voice for a persona (unknown personas get the default).
pub fn speech_voice(persona: &str) -> &'static str {
    match persona {
        "Hathor" => "shimmer",
        "Moses" => "onyx",
        "Llama" => "alloy",
        _ => "onyx",
    }
}
