//! Modular API: inquiry, wisdom, voice and value-for-value.
//!
//! All module state lives in a [`ModuleRegistry`] constructed once at
//! startup and handed to request handlers through axum state; there are no
//! module-level globals. In-memory maps are `DashMap`s, with lifecycle
//! scoped to the process.

pub mod inquiry;
pub mod value;
pub mod voice;
pub mod wisdom;

use std::sync::Arc;

use crate::oracle::providers::AudioGateway;
use crate::utilities::config::Settings;

/// Explicitly constructed module set, injected into handlers.
pub struct ModuleRegistry {
    pub inquiry: inquiry::InquiryModule,
    pub wisdom: wisdom::WisdomModule,
    pub voice: voice::VoiceModule,
    pub value: value::ValueModule,
}

impl ModuleRegistry {
    /// Build every module from settings.
    pub fn from_settings(settings: &Settings, audio: Arc<dyn AudioGateway>) -> Self {
        Self {
            inquiry: inquiry::InquiryModule::new(),
            wisdom: wisdom::WisdomModule::from_settings(settings),
            voice: voice::VoiceModule::from_settings(settings, audio),
            value: value::ValueModule::new(settings.enable_payments),
        }
    }
}
