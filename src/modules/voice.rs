//! Voice module: capability flags plus a thin transcription front.
//!
//! Capabilities are computed once at startup from configuration and exposed
//! as a plain queryable struct. No runtime probing, no nested fallback
//! handling.

use std::io::Write;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::oracle::providers::AudioGateway;
use crate::utilities::config::Settings;
use crate::utilities::errors::OracleError;

/// What the voice module can do, decided at startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VoiceCapabilities {
    /// Module switched on at all.
    pub enabled: bool,
    /// Speech synthesis available (provider key configured).
    pub tts_available: bool,
    /// Transcription available (provider key configured).
    pub stt_available: bool,
}

/// Result of a voice interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceReply {
    pub text: String,
    pub audio_url: Option<String>,
}

/// Voice interaction module.
pub struct VoiceModule {
    capabilities: VoiceCapabilities,
    audio: Arc<dyn AudioGateway>,
}

impl VoiceModule {
    /// Compute capabilities from settings; both directions need the OpenAI
    /// key.
    pub fn from_settings(settings: &Settings, audio: Arc<dyn AudioGateway>) -> Self {
        let has_key = settings.openai_api_key.is_some();
        Self {
            capabilities: VoiceCapabilities {
                enabled: settings.enable_voice,
                tts_available: settings.enable_voice && has_key,
                stt_available: settings.enable_voice && has_key,
            },
            audio,
        }
    }

    /// Build with explicit capabilities (test seam).
    pub fn with_capabilities(capabilities: VoiceCapabilities, audio: Arc<dyn AudioGateway>) -> Self {
        Self { capabilities, audio }
    }

    /// Startup-computed capability flags.
    pub fn capabilities(&self) -> VoiceCapabilities {
        self.capabilities
    }

    /// Usable iff enabled and at least one direction works.
    pub fn is_available(&self) -> bool {
        self.capabilities.enabled
            && (self.capabilities.tts_available || self.capabilities.stt_available)
    }

    /// Process a voice interaction: transcribe the audio when present and
    /// transcription is available, otherwise report readiness.
    ///
    /// Audio bytes pass through a scoped temp file that is removed on every
    /// exit path.
    pub async fn process(&self, audio: Option<&[u8]>) -> Result<VoiceReply, OracleError> {
        let text = match audio {
            Some(bytes) if self.capabilities.stt_available => {
                let mut tmp = tempfile::NamedTempFile::with_suffix(".webm")?;
                tmp.write_all(bytes)?;
                self.audio.transcribe(tmp.path()).await?
            }
            _ => "Voice interaction is available".to_string(),
        };
        Ok(VoiceReply {
            text,
            audio_url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;

    struct StubAudio;

    #[async_trait]
    impl AudioGateway for StubAudio {
        async fn transcribe(&self, _path: &Path) -> Result<String, OracleError> {
            Ok("what is justice?".to_string())
        }
        async fn synthesize(&self, _text: &str, _voice: &str) -> Result<Vec<u8>, OracleError> {
            Ok(vec![1, 2, 3])
        }
    }

    fn caps(enabled: bool, tts: bool, stt: bool) -> VoiceCapabilities {
        VoiceCapabilities {
            enabled,
            tts_available: tts,
            stt_available: stt,
        }
    }

    #[test]
    fn test_availability_requires_enabled_and_one_direction() {
        let audio: Arc<dyn AudioGateway> = Arc::new(StubAudio);
        assert!(!VoiceModule::with_capabilities(caps(false, true, true), audio.clone())
            .is_available());
        assert!(!VoiceModule::with_capabilities(caps(true, false, false), audio.clone())
            .is_available());
        assert!(VoiceModule::with_capabilities(caps(true, true, false), audio).is_available());
    }

    #[tokio::test]
    async fn test_process_transcribes_when_possible() {
        let module = VoiceModule::with_capabilities(caps(true, true, true), Arc::new(StubAudio));
        let reply = module.process(Some(b"fake webm")).await.unwrap();
        assert_eq!(reply.text, "what is justice?");
        assert!(reply.audio_url.is_none());
    }

    #[tokio::test]
    async fn test_process_without_audio_reports_ready() {
        let module = VoiceModule::with_capabilities(caps(true, true, true), Arc::new(StubAudio));
        let reply = module.process(None).await.unwrap();
        assert_eq!(reply.text, "Voice interaction is available");
    }

    #[tokio::test]
    async fn test_process_ignores_audio_without_stt() {
        let module = VoiceModule::with_capabilities(caps(true, true, false), Arc::new(StubAudio));
        let reply = module.process(Some(b"fake")).await.unwrap();
        assert_eq!(reply.text, "Voice interaction is available");
    }
}
