//! Seeker registry, visitor ledger and token metering.
//!
//! Seekers are registered identities with a persistent profile. Visitors are
//! anonymous callers identified only by a client-supplied token, tracked
//! solely so their usage carries across requests. Both live in flat JSON
//! maps behind [`TempleStore`].
//!
//! Token costs are a character-count heuristic, not a real tokenizer. The
//! per-visitor daily counter rolls over lazily: the first touch on a new
//! calendar date relative to the entry's own stored date zeroes it. There is
//! no global reset job.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Collection, TempleStore};

/// Registered seeker profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeekerRecord {
    /// Unique id, generated at registration.
    pub seeker_id: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Fixed default title.
    pub title: String,
    /// Number of scrolls this seeker has uploaded.
    pub scroll_count: u64,
    /// Reserved; no mutator exists, stays 0.0.
    pub donation_total: f64,
    /// Reserved; influence scoring is not active.
    pub influence_state: String,
    /// Reserved; always empty.
    pub eligibility_flags: Vec<String>,
}

/// Per-visitor usage ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorRecord {
    /// First time this visitor token was seen.
    pub created_at: DateTime<Utc>,
    /// Last request time.
    pub last_seen: DateTime<Utc>,
    /// Calendar date of the last request, drives the daily rollover.
    pub last_seen_date: NaiveDate,
    /// Cumulative estimated tokens.
    pub token_used_total: u64,
    /// Estimated tokens on `last_seen_date`.
    pub token_used_today: u64,
    /// Reserved; limits are not enforced yet.
    pub limit_state: String,
}

/// How an interaction is classified for the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageClass {
    /// A seeker id accompanied the request.
    Registered,
    /// No seeker id; visitor continuity alone does not register anyone.
    Anonymous,
}

impl UsageClass {
    /// Classification depends only on whether a seeker id was supplied.
    pub fn classify(seeker_id: Option<&str>) -> Self {
        match seeker_id {
            Some(id) if !id.is_empty() => UsageClass::Registered,
            _ => UsageClass::Anonymous,
        }
    }
}

/// Rough token estimate for a question/answer pair.
///
/// Deliberately approximate: a quarter of the character count per side.
pub fn estimate_tokens(question: &str, answer: &str) -> u64 {
    (question.chars().count() / 4 + answer.chars().count() / 4) as u64
}

/// Register a new seeker and persist the registry. Returns the fresh id.
pub fn register_seeker(
    store: &TempleStore,
    display_name: Option<String>,
) -> std::io::Result<String> {
    let seeker_id = Uuid::new_v4().to_string();
    let record = SeekerRecord {
        seeker_id: seeker_id.clone(),
        created_at: Utc::now(),
        display_name,
        title: "Seeker".to_string(),
        scroll_count: 0,
        donation_total: 0.0,
        influence_state: "disabled".to_string(),
        eligibility_flags: Vec::new(),
    };
    store.update_map(Collection::Seekers, |seekers| {
        seekers.insert(seeker_id.clone(), record);
    })?;
    Ok(seeker_id)
}

/// Increment a seeker's scroll count, if the seeker exists.
///
/// Unknown ids are ignored: scroll uploader references are by convention
/// only and must tolerate dangling ids.
pub fn credit_scroll_upload(store: &TempleStore, seeker_id: &str) -> std::io::Result<()> {
    store.update_map::<SeekerRecord, _>(Collection::Seekers, |seekers| {
        if let Some(seeker) = seekers.get_mut(seeker_id) {
            seeker.scroll_count += 1;
        }
    })
}

/// Record estimated token usage against a visitor token.
///
/// A missing or empty id is a no-op: the caller stays anonymous without
/// continuity.
pub fn record_usage(
    store: &TempleStore,
    visitor_id: Option<&str>,
    tokens: u64,
) -> std::io::Result<()> {
    match visitor_id {
        Some(id) if !id.is_empty() => record_usage_on(store, id, tokens, Local::now().date_naive()),
        _ => Ok(()),
    }
}

/// Date-parameterized body of [`record_usage`].
pub fn record_usage_on(
    store: &TempleStore,
    visitor_id: &str,
    tokens: u64,
    today: NaiveDate,
) -> std::io::Result<()> {
    store.update_map(Collection::Visitors, |visitors| {
        let now = Utc::now();
        let visitor = visitors
            .entry(visitor_id.to_string())
            .or_insert_with(|| VisitorRecord {
                created_at: now,
                last_seen: now,
                last_seen_date: today,
                token_used_total: 0,
                token_used_today: 0,
                limit_state: "ok".to_string(),
            });
        if visitor.last_seen_date != today {
            visitor.token_used_today = 0;
            visitor.last_seen_date = today;
        }
        visitor.last_seen = now;
        visitor.token_used_total += tokens;
        visitor.token_used_today += tokens;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, TempleStore) {
        let dir = TempDir::new().unwrap();
        let store = TempleStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_estimate_tokens_quarter_of_chars() {
        assert_eq!(estimate_tokens("", ""), 0);
        assert_eq!(estimate_tokens("abcd", "abcdefgh"), 1 + 2);
        // Floors each side independently.
        assert_eq!(estimate_tokens("abc", "abcde"), 0 + 1);
    }

    #[test]
    fn test_usage_class_depends_on_seeker_only() {
        assert_eq!(UsageClass::classify(Some("abc")), UsageClass::Registered);
        assert_eq!(UsageClass::classify(Some("")), UsageClass::Anonymous);
        assert_eq!(UsageClass::classify(None), UsageClass::Anonymous);
    }

    #[test]
    fn test_register_seeker_defaults() {
        let (_dir, store) = store();
        let id = register_seeker(&store, Some("Neferu".to_string())).unwrap();
        let seekers = store.read_map::<SeekerRecord>(Collection::Seekers);
        let seeker = seekers.get(&id).unwrap();
        assert_eq!(seeker.display_name.as_deref(), Some("Neferu"));
        assert_eq!(seeker.title, "Seeker");
        assert_eq!(seeker.scroll_count, 0);
        assert_eq!(seeker.donation_total, 0.0);
        assert_eq!(seeker.influence_state, "disabled");
        assert!(seeker.eligibility_flags.is_empty());
    }

    #[test]
    fn test_credit_scroll_upload_increments_known_seeker() {
        let (_dir, store) = store();
        let id = register_seeker(&store, None).unwrap();
        credit_scroll_upload(&store, &id).unwrap();
        let seekers = store.read_map::<SeekerRecord>(Collection::Seekers);
        assert_eq!(seekers.get(&id).unwrap().scroll_count, 1);
        assert_eq!(seekers.get(&id).unwrap().donation_total, 0.0);
    }

    #[test]
    fn test_credit_scroll_upload_ignores_unknown_seeker() {
        let (_dir, store) = store();
        credit_scroll_upload(&store, "no-such-id").unwrap();
        let seekers = store.read_map::<SeekerRecord>(Collection::Seekers);
        assert!(seekers.is_empty());
    }

    #[test]
    fn test_record_usage_new_visitor_seeds_both_counters() {
        let (_dir, store) = store();
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        record_usage_on(&store, "v1", 40, today).unwrap();
        let visitors = store.read_map::<VisitorRecord>(Collection::Visitors);
        let v = visitors.get("v1").unwrap();
        assert_eq!(v.token_used_total, 40);
        assert_eq!(v.token_used_today, 40);
        assert_eq!(v.limit_state, "ok");
    }

    #[test]
    fn test_record_usage_same_day_accumulates() {
        let (_dir, store) = store();
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        record_usage_on(&store, "v1", 40, today).unwrap();
        record_usage_on(&store, "v1", 10, today).unwrap();
        let visitors = store.read_map::<VisitorRecord>(Collection::Visitors);
        let v = visitors.get("v1").unwrap();
        assert_eq!(v.token_used_total, 50);
        assert_eq!(v.token_used_today, 50);
    }

    #[test]
    fn test_record_usage_next_day_resets_daily_counter() {
        let (_dir, store) = store();
        let day_one = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let day_two = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        record_usage_on(&store, "v1", 40, day_one).unwrap();
        record_usage_on(&store, "v1", 15, day_two).unwrap();
        let visitors = store.read_map::<VisitorRecord>(Collection::Visitors);
        let v = visitors.get("v1").unwrap();
        assert_eq!(v.token_used_total, 55);
        assert_eq!(v.token_used_today, 15);
        assert_eq!(v.last_seen_date, day_two);
    }

    #[test]
    fn test_record_usage_without_visitor_is_noop() {
        let (_dir, store) = store();
        record_usage(&store, None, 99).unwrap();
        record_usage(&store, Some(""), 99).unwrap();
        let visitors = store.read_map::<VisitorRecord>(Collection::Visitors);
        assert!(visitors.is_empty());
    }
}
