//! Scroll ingestion: uploaded documents plus their extracted plain text.
//!
//! A scroll is immutable once ingested; the corpus only ever shrinks through
//! a full reset. The raw upload is kept on disk under a collision-safe name
//! so repeated uploads of `wisdom.txt` never clobber each other.

pub mod extract;

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger;
use crate::store::{Collection, TempleStore};
use crate::utilities::errors::OracleError;

/// One ingested scroll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollRecord {
    /// Unique scroll id.
    pub scroll_id: String,
    /// Seeker id if one was supplied at upload, else a generated stand-in.
    pub uploader_id: String,
    /// Original file name, for display.
    pub filename: String,
    /// Collision-safe stored file name.
    pub safe_filename: String,
    /// Extracted plain text; empty when extraction found nothing or failed.
    pub extracted_text: String,
    /// Ingestion time.
    pub timestamp: DateTime<Utc>,
}

/// Ingest an uploaded document. Returns the new scroll id.
///
/// Extraction failures are absorbed (the scroll is stored with empty text);
/// only filesystem writes can fail the ingestion itself. A supplied seeker
/// id is credited iff it exists in the registry.
pub fn ingest(
    store: &TempleStore,
    upload_dir: &Path,
    file_name: &str,
    bytes: &[u8],
    seeker_id: Option<&str>,
) -> Result<String, OracleError> {
    let seeker_id = seeker_id.filter(|id| !id.is_empty());
    let uploader_id = seeker_id
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let safe_filename = format!("{}_{}", Uuid::new_v4(), file_name);
    fs::create_dir_all(upload_dir)?;
    fs::write(upload_dir.join(&safe_filename), bytes)?;

    let extracted_text = extract::extract_text(file_name, bytes);

    let record = ScrollRecord {
        scroll_id: Uuid::new_v4().to_string(),
        uploader_id,
        filename: file_name.to_string(),
        safe_filename,
        extracted_text,
        timestamp: Utc::now(),
    };
    let scroll_id = record.scroll_id.clone();

    store.update_array(Collection::Scrolls, |scrolls| scrolls.push(record))?;

    if let Some(id) = seeker_id {
        ledger::credit_scroll_upload(store, id)?;
    }

    Ok(scroll_id)
}

/// The full scroll corpus, oldest first.
pub fn corpus(store: &TempleStore) -> Vec<ScrollRecord> {
    store.read_array(Collection::Scrolls)
}

/// Delete every uploaded file and truncate the corpus.
///
/// Seekers and visitors are untouched.
pub fn reset(store: &TempleStore, upload_dir: &Path) -> std::io::Result<()> {
    if upload_dir.is_dir() {
        for entry in fs::read_dir(upload_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
            }
        }
    }
    store.replace(Collection::Scrolls, &Vec::<ScrollRecord>::new())
}
