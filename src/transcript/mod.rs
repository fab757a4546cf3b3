//! Append-only interaction log.
//!
//! One entry per question/answer exchange, in a single JSON array file.
//! Entries are never mutated or removed; the file is the entire ordered
//! history. Appending loads the whole array and rewrites it, which holds up
//! only while the working set stays small.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::UsageClass;
use crate::observer::{AffinityObservation, ArchitectObservation};
use crate::store::{Collection, TempleStore};

/// One logged question/answer exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEntry {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub seeker_id: Option<String>,
    pub visitor_id: Option<String>,
    pub question: String,
    pub oracle_used: String,
    pub answer: String,
    pub architect_observation: ArchitectObservation,
    pub llama_observation: Option<AffinityObservation>,
    pub source_model: String,
    pub phase: String,
    pub corpus_intent: String,
    // Influence fields reserved for future scoring; no writer exists.
    pub personal_retrieval_score: Option<f64>,
    pub global_retrieval_score: Option<f64>,
    pub shadow_delta: Option<f64>,
    pub influence_state: String,
    pub estimated_tokens: u64,
    pub usage_class: UsageClass,
}

/// Inputs that vary per interaction; everything else is fixed by design.
pub struct InteractionParams {
    pub session_id: String,
    pub seeker_id: Option<String>,
    pub visitor_id: Option<String>,
    pub question: String,
    pub oracle_used: String,
    pub answer: String,
    pub architect_observation: ArchitectObservation,
    pub llama_observation: Option<AffinityObservation>,
    pub source_model: String,
    pub estimated_tokens: u64,
    pub usage_class: UsageClass,
}

impl InteractionEntry {
    /// Assemble an entry, stamping the current time and the fixed
    /// phase/intent/influence defaults.
    pub fn new(params: InteractionParams) -> Self {
        Self {
            timestamp: Utc::now(),
            session_id: params.session_id,
            seeker_id: params.seeker_id,
            visitor_id: params.visitor_id,
            question: params.question,
            oracle_used: params.oracle_used,
            answer: params.answer,
            architect_observation: params.architect_observation,
            llama_observation: params.llama_observation,
            source_model: params.source_model,
            phase: "3.0".to_string(),
            corpus_intent: "authoritative_training_data".to_string(),
            personal_retrieval_score: None,
            global_retrieval_score: None,
            shadow_delta: None,
            influence_state: "disabled".to_string(),
            estimated_tokens: params.estimated_tokens,
            usage_class: params.usage_class,
        }
    }
}

/// Append one entry to the log.
///
/// Best effort: the answer has already been produced by the time this runs,
/// so a failed append is logged and swallowed rather than failing the
/// request.
pub fn append(store: &TempleStore, entry: InteractionEntry) {
    if let Err(e) = store.update_array(Collection::Transcript, |entries| entries.push(entry)) {
        tracing::warn!("failed to append interaction log entry: {}", e);
    }
}

/// Read the full ordered history.
pub fn entries(store: &TempleStore) -> Vec<InteractionEntry> {
    store.read_array(Collection::Transcript)
}
