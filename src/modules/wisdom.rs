//! Wisdom module: prompt-profile AI responses with a deterministic fallback.
//!
//! Each inquiry type maps to a fixed system prompt. When the provider is
//! unconfigured or errors, the module degrades to a built-in response at
//! lower confidence instead of failing the request.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modules::inquiry::InquiryType;
use crate::oracle::providers::{ChatCompletion, OpenAICompletion};
use crate::utilities::config::Settings;

/// Chat model backing the wisdom module.
pub const WISDOM_MODEL: &str = "gpt-4";

/// An answer with a confidence estimate and its sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WisdomReply {
    pub answer: String,
    pub confidence: f64,
    pub sources: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// AI-backed wisdom generation.
pub struct WisdomModule {
    provider: Option<Arc<dyn ChatCompletion>>,
}

impl WisdomModule {
    /// Wire the OpenAI provider when a key is configured.
    pub fn from_settings(settings: &Settings) -> Self {
        let provider = settings.openai_api_key.as_ref().map(|key| {
            Arc::new(
                OpenAICompletion::new(WISDOM_MODEL, Some(key.clone()), None)
                    .with_sampling(0.7, 1000),
            ) as Arc<dyn ChatCompletion>
        });
        Self { provider }
    }

    /// Substitute a provider directly (test seam).
    pub fn with_provider(provider: Option<Arc<dyn ChatCompletion>>) -> Self {
        Self { provider }
    }

    /// Whether an AI provider is wired in.
    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// System prompt for an inquiry type.
    pub fn system_prompt(inquiry_type: InquiryType) -> &'static str {
        match inquiry_type {
            InquiryType::Wisdom => {
                "You are a wise oracle providing thoughtful, philosophical insights and wisdom. \
                 Draw from various philosophical traditions and offer deep, meaningful perspectives."
            }
            InquiryType::Guidance => {
                "You are a helpful guide providing practical advice and direction. Focus on \
                 actionable steps and clear guidance."
            }
            InquiryType::Insight => {
                "You are an insightful analyst providing deep understanding and clarity. Help \
                 uncover hidden patterns and meanings."
            }
            InquiryType::General => {
                "You are a knowledgeable assistant providing helpful, accurate, and thoughtful \
                 responses."
            }
        }
    }

    /// Generate a reply for a question, falling back on any provider
    /// failure.
    pub async fn generate(
        &self,
        question: &str,
        inquiry_type: InquiryType,
        context: Option<&str>,
    ) -> WisdomReply {
        if let Some(provider) = &self.provider {
            let user_message = match context {
                Some(ctx) => format!("Context: {}\n\nQuestion: {}", ctx, question),
                None => question.to_string(),
            };
            match provider
                .chat(Self::system_prompt(inquiry_type), &user_message)
                .await
            {
                Ok(answer) => {
                    return WisdomReply {
                        answer,
                        confidence: 0.85,
                        sources: vec!["OpenAI GPT".to_string()],
                        timestamp: Utc::now(),
                    }
                }
                Err(e) => {
                    tracing::error!("wisdom provider call failed: {}", e);
                }
            }
        }
        self.fallback(question, inquiry_type)
    }

    fn fallback(&self, question: &str, inquiry_type: InquiryType) -> WisdomReply {
        let answer = match inquiry_type {
            InquiryType::Wisdom => format!(
                "Thank you for your inquiry about: '{}'. In wisdom, we find that understanding \
                 comes from contemplation and reflection. Consider what this question means to \
                 you personally.",
                question
            ),
            InquiryType::Guidance => format!(
                "Thank you for seeking guidance on: '{}'. The path forward often reveals itself \
                 through careful consideration of your goals and values.",
                question
            ),
            InquiryType::Insight => format!(
                "Your inquiry about '{}' invites deeper examination. Look beneath the surface to \
                 find the patterns and connections.",
                question
            ),
            InquiryType::General => format!(
                "Thank you for your question about: '{}'. This is an interesting inquiry that \
                 deserves thoughtful consideration.",
                question
            ),
        };
        WisdomReply {
            answer,
            confidence: 0.5,
            sources: vec!["Built-in responses".to_string()],
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::errors::OracleError;
    use async_trait::async_trait;

    struct FailingChat;

    #[async_trait]
    impl ChatCompletion for FailingChat {
        fn provider_name(&self) -> &str {
            "OpenAI"
        }
        async fn chat(&self, _s: &str, _u: &str) -> Result<String, OracleError> {
            Err(OracleError::provider("OpenAI", "boom"))
        }
    }

    struct EchoChat;

    #[async_trait]
    impl ChatCompletion for EchoChat {
        fn provider_name(&self) -> &str {
            "OpenAI"
        }
        async fn chat(&self, _s: &str, user: &str) -> Result<String, OracleError> {
            Ok(format!("echo: {}", user))
        }
    }

    #[tokio::test]
    async fn test_unconfigured_module_uses_fallback() {
        let module = WisdomModule::with_provider(None);
        assert!(!module.is_available());
        let reply = module.generate("what is truth?", InquiryType::Wisdom, None).await;
        assert_eq!(reply.confidence, 0.5);
        assert!(reply.answer.contains("what is truth?"));
        assert_eq!(reply.sources, vec!["Built-in responses"]);
    }

    #[tokio::test]
    async fn test_provider_error_degrades_to_fallback() {
        let module = WisdomModule::with_provider(Some(Arc::new(FailingChat)));
        let reply = module.generate("why?", InquiryType::General, None).await;
        assert_eq!(reply.confidence, 0.5);
    }

    #[tokio::test]
    async fn test_provider_answer_carries_high_confidence() {
        let module = WisdomModule::with_provider(Some(Arc::new(EchoChat)));
        let reply = module.generate("why?", InquiryType::Insight, None).await;
        assert_eq!(reply.confidence, 0.85);
        assert_eq!(reply.answer, "echo: why?");
        assert_eq!(reply.sources, vec!["OpenAI GPT"]);
    }

    #[tokio::test]
    async fn test_context_is_prefixed() {
        let module = WisdomModule::with_provider(Some(Arc::new(EchoChat)));
        let reply = module
            .generate("why?", InquiryType::General, Some("a garden"))
            .await;
        assert_eq!(reply.answer, "echo: Context: a garden\n\nQuestion: why?");
    }

    #[test]
    fn test_each_inquiry_type_has_a_distinct_prompt() {
        let prompts = [
            WisdomModule::system_prompt(InquiryType::Wisdom),
            WisdomModule::system_prompt(InquiryType::Guidance),
            WisdomModule::system_prompt(InquiryType::Insight),
            WisdomModule::system_prompt(InquiryType::General),
        ];
        for (i, a) in prompts.iter().enumerate() {
            for b in prompts.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
