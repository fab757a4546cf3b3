//! Environment-backed settings for the temple oracle service.
//!
//! Read once at startup. Provider keys are stored as `Option` and checked at
//! first use: a missing key is a per-request configuration error, never a
//! startup crash.
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY` — OpenAI key (Moses oracle, transcription, speech)
//! - `XAI_API_KEY` — xAI key (Hathor oracle)
//! - `LLAMA_ENABLED` — enable shadow observation records (default: false)
//! - `TEMPLE_DATA_DIR` — collections, uploads and audio (default: ./data)
//! - `PORT` — HTTP port (default: 8000)
//! - `ENABLE_PAYMENTS` — value-for-value processing switch (default: false)
//! - `ENABLE_VOICE` — voice module switch (default: true)

use std::env;
use std::path::PathBuf;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// OpenAI API key, if configured.
    pub openai_api_key: Option<String>,
    /// xAI API key, if configured.
    pub xai_api_key: Option<String>,
    /// Whether shadow observation records are enabled.
    pub llama_enabled: bool,
    /// Root directory for persisted collections, uploads and audio.
    pub data_dir: PathBuf,
    /// HTTP port.
    pub port: u16,
    /// Whether value-for-value contributions are actually processed.
    pub enable_payments: bool,
    /// Whether the voice module is enabled at all.
    pub enable_voice: bool,
}

impl Settings {
    /// Load settings from the environment.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: non_empty(env::var("OPENAI_API_KEY").ok()),
            xai_api_key: non_empty(env::var("XAI_API_KEY").ok()),
            llama_enabled: env_flag("LLAMA_ENABLED", false),
            data_dir: env::var("TEMPLE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            enable_payments: env_flag("ENABLE_PAYMENTS", false),
            enable_voice: env_flag("ENABLE_VOICE", true),
        }
    }

    /// Directory where uploaded scroll files are stored.
    pub fn upload_dir(&self) -> PathBuf {
        self.data_dir.join("scrolls_uploads")
    }

    /// Directory where synthesized speech files are stored.
    pub fn audio_dir(&self) -> PathBuf {
        self.data_dir.join("audio")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            xai_api_key: None,
            llama_enabled: false,
            data_dir: PathBuf::from("./data"),
            port: 8000,
            enable_payments: false,
            enable_voice: true,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_flag(var: &str, default: bool) -> bool {
    match env::var(var) {
        Ok(v) => v.to_lowercase() == "true",
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.openai_api_key.is_none());
        assert!(settings.xai_api_key.is_none());
        assert!(!settings.llama_enabled);
        assert_eq!(settings.port, 8000);
        assert!(!settings.enable_payments);
        assert!(settings.enable_voice);
    }

    #[test]
    fn test_sub_directories() {
        let settings = Settings {
            data_dir: PathBuf::from("/tmp/temple"),
            ..Settings::default()
        };
        assert_eq!(settings.upload_dir(), PathBuf::from("/tmp/temple/scrolls_uploads"));
        assert_eq!(settings.audio_dir(), PathBuf::from("/tmp/temple/audio"));
    }

    #[test]
    fn test_non_empty_filters_blank() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("sk-abc".to_string())), Some("sk-abc".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
