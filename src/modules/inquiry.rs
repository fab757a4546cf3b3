//! Inquiry module: question submission and retrieval.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of response the seeker is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryType {
    Wisdom,
    Guidance,
    Insight,
    #[default]
    General,
}

/// A submitted inquiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryRecord {
    pub id: String,
    pub question: String,
    pub inquiry_type: InquiryType,
    pub context: Option<String>,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: String,
}

/// In-memory inquiry store.
#[derive(Debug, Default)]
pub struct InquiryModule {
    inquiries: DashMap<String, InquiryRecord>,
}

impl InquiryModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// A question must be non-empty after trimming.
    pub fn validate(question: &str) -> bool {
        !question.trim().is_empty()
    }

    /// Store a new inquiry, returning its id.
    pub fn submit(
        &self,
        question: String,
        inquiry_type: InquiryType,
        context: Option<String>,
        user_id: Option<String>,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        self.inquiries.insert(
            id.clone(),
            InquiryRecord {
                id: id.clone(),
                question,
                inquiry_type,
                context,
                user_id,
                timestamp: Utc::now(),
                status: "submitted".to_string(),
            },
        );
        id
    }

    /// Fetch an inquiry by id.
    pub fn get(&self, id: &str) -> Option<InquiryRecord> {
        self.inquiries.get(id).map(|r| r.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_blank_questions() {
        assert!(!InquiryModule::validate(""));
        assert!(!InquiryModule::validate("   "));
        assert!(InquiryModule::validate("what is truth?"));
    }

    #[test]
    fn test_submit_and_get() {
        let module = InquiryModule::new();
        let id = module.submit(
            "what is truth?".to_string(),
            InquiryType::Wisdom,
            None,
            Some("user-1".to_string()),
        );
        let record = module.get(&id).unwrap();
        assert_eq!(record.question, "what is truth?");
        assert_eq!(record.inquiry_type, InquiryType::Wisdom);
        assert_eq!(record.status, "submitted");
        assert!(module.get("missing").is_none());
    }

    #[test]
    fn test_inquiry_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(InquiryType::Guidance).unwrap(),
            serde_json::json!("guidance")
        );
        assert_eq!(InquiryType::default(), InquiryType::General);
    }
}
