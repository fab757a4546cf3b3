//! Diagnostic observation records attached to each transcript entry.
//!
//! Both records are pure: the architect observation is constant-shaped and
//! always reports full compliance, and the affinity observation is a fixed
//! keyword table over the question text. Neither ever influences routing or
//! response content; they give a future learner labeled history to train
//! against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scrolls::ScrollRecord;

/// Who chose the oracle and whether anything overrode that choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityContext {
    pub seeker_choice_explicit: bool,
    pub oracle_selected: String,
    pub override_attempted: bool,
    pub override_performed: bool,
}

/// Snapshot of which subsystems were active for this interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemState {
    pub llama_status: String,
    pub architect_status: String,
    pub routing_active: bool,
    pub synthetic_generation: bool,
}

/// Compliance assertions; constant until an enforcement phase exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub phase_compliant: bool,
    pub authority_compliant: bool,
    pub oracle_authoritative: bool,
    pub notes: String,
}

/// When the observation was taken and for which session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalContext {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub interaction_id: String,
}

/// Architect-compliance record, one per interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchitectObservation {
    pub phase: String,
    pub role: String,
    pub authority_context: AuthorityContext,
    pub system_state: SystemState,
    pub compliance_check: ComplianceCheck,
    pub temporal_context: TemporalContext,
}

/// Build the architect-compliance record for one interaction.
///
/// The question is accepted for signature stability but not yet inspected.
/// Never fails.
pub fn architect_observation(
    _question: &str,
    persona: &str,
    session_id: &str,
    llama_enabled: bool,
) -> ArchitectObservation {
    ArchitectObservation {
        phase: "3.0".to_string(),
        role: "observer".to_string(),
        authority_context: AuthorityContext {
            seeker_choice_explicit: true,
            oracle_selected: persona.to_string(),
            override_attempted: false,
            override_performed: false,
        },
        system_state: SystemState {
            llama_status: if llama_enabled { "shadow" } else { "disabled" }.to_string(),
            architect_status: "observer_only".to_string(),
            routing_active: false,
            synthetic_generation: false,
        },
        compliance_check: ComplianceCheck {
            phase_compliant: true,
            authority_compliant: true,
            oracle_authoritative: true,
            notes: "All constraints honored".to_string(),
        },
        temporal_context: TemporalContext {
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
            interaction_id: Uuid::new_v4().to_string(),
        },
    }
}

/// Shadow suggestion of which oracle a question leans toward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffinityObservation {
    pub suggested_oracle: String,
    pub confidence: f64,
    pub reason: String,
    pub phase: String,
    pub mode: String,
}

/// Poetic/emotional keywords that lean Hathor.
const EMOTION_KEYWORDS: [&str; 5] = ["love", "joy", "beauty", "emotion", "heart"];

/// Doctrinal/moral keywords that lean Moses.
const DOCTRINE_KEYWORDS: [&str; 5] = ["law", "command", "sin", "righteous", "god"];

/// Keyword-table affinity suggestion over the question text.
///
/// Returns `None` when the shadow observer is disabled. The answer and the
/// scroll corpus are accepted but not yet inspected (reserved inputs for a
/// learned router). Case-insensitive substring match, question only.
pub fn affinity_observation(
    question: &str,
    _persona_used: &str,
    _answer: &str,
    _corpus: &[ScrollRecord],
    enabled: bool,
) -> Option<AffinityObservation> {
    if !enabled {
        return None;
    }

    let lowered = question.to_lowercase();
    let (suggested_oracle, confidence, reason) =
        if EMOTION_KEYWORDS.iter().any(|w| lowered.contains(w)) {
            (
                "Hathor",
                0.8,
                "Question contains poetic or emotional keywords aligning with Hathor's domain",
            )
        } else if DOCTRINE_KEYWORDS.iter().any(|w| lowered.contains(w)) {
            (
                "Moses",
                0.8,
                "Question contains doctrinal or moral keywords aligning with Moses' domain",
            )
        } else {
            ("none", 0.5, "No strong stylistic indicators detected")
        };

    Some(AffinityObservation {
        suggested_oracle: suggested_oracle.to_string(),
        confidence,
        reason: reason.to_string(),
        phase: "3.0".to_string(),
        mode: "shadow".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_architect_observation_reports_full_compliance() {
        let obs = architect_observation("why?", "Moses", "session-1", false);
        assert_eq!(obs.phase, "3.0");
        assert_eq!(obs.role, "observer");
        assert!(obs.authority_context.seeker_choice_explicit);
        assert_eq!(obs.authority_context.oracle_selected, "Moses");
        assert!(!obs.authority_context.override_performed);
        assert_eq!(obs.system_state.llama_status, "disabled");
        assert!(obs.compliance_check.phase_compliant);
        assert!(obs.compliance_check.authority_compliant);
        assert_eq!(obs.temporal_context.session_id, "session-1");
    }

    #[test]
    fn test_architect_observation_shadow_when_enabled() {
        let obs = architect_observation("why?", "Hathor", "s", true);
        assert_eq!(obs.system_state.llama_status, "shadow");
    }

    #[test]
    fn test_architect_interaction_ids_are_fresh() {
        let a = architect_observation("q", "Moses", "s", false);
        let b = architect_observation("q", "Moses", "s", false);
        assert_ne!(a.temporal_context.interaction_id, b.temporal_context.interaction_id);
    }

    #[test]
    fn test_affinity_none_when_disabled() {
        assert!(affinity_observation("love and beauty", "Hathor", "", &[], false).is_none());
    }

    #[test]
    fn test_affinity_emotional_question_suggests_hathor() {
        let obs =
            affinity_observation("Tell me about love and beauty", "Moses", "", &[], true).unwrap();
        assert_eq!(obs.suggested_oracle, "Hathor");
        assert_eq!(obs.confidence, 0.8);
        assert_eq!(obs.mode, "shadow");
    }

    #[test]
    fn test_affinity_doctrinal_question_suggests_moses() {
        let obs = affinity_observation("What does the law command?", "Hathor", "", &[], true)
            .unwrap();
        assert_eq!(obs.suggested_oracle, "Moses");
        assert_eq!(obs.confidence, 0.8);
    }

    #[test]
    fn test_affinity_match_is_case_insensitive() {
        let obs = affinity_observation("LOVE conquers", "Moses", "", &[], true).unwrap();
        assert_eq!(obs.suggested_oracle, "Hathor");
    }

    #[test]
    fn test_affinity_neutral_question_suggests_none() {
        let obs = affinity_observation("What time is it?", "Moses", "", &[], true).unwrap();
        assert_eq!(obs.suggested_oracle, "none");
        assert_eq!(obs.confidence, 0.5);
    }

    #[test]
    fn test_affinity_emotional_wins_over_doctrinal() {
        // Both keyword sets present: the emotional set is checked first.
        let obs = affinity_observation("a law of love", "Moses", "", &[], true).unwrap();
        assert_eq!(obs.suggested_oracle, "Hathor");
    }
}
