//! # Temple Oracle
//!
//! An oracle question-answering backend fronting two external chat
//! providers, with scroll uploads, seeker/visitor ledgers and an
//! append-only interaction transcript.
//!
//! Questions are routed by persona: Hathor answers through xAI, Moses
//! through OpenAI, and Llama is reserved as a future learner that only
//! observes. Every answered question is metered (character-count token
//! estimate, per-visitor daily ledger) and logged with diagnostic
//! observation records. Persistence is four flat JSON files, guarded
//! in-process and written atomically.

pub mod ledger;
pub mod modules;
pub mod observer;
pub mod oracle;
pub mod scrolls;
pub mod server;
pub mod store;
pub mod transcript;
pub mod utilities;

pub use ledger::UsageClass;
pub use oracle::{Dispatcher, OracleReply};
pub use scrolls::ScrollRecord;
pub use server::{app_router, AppState};
pub use store::{Collection, TempleStore};
pub use transcript::InteractionEntry;
pub use utilities::{OracleError, Settings};

/// Library version.
pub const VERSION: &str = "0.3.1";
