//! HTTP server for the temple oracle.
//!
//! Exposes the oracle pipeline, scroll ingestion, seeker registration and
//! the modular inquiry/voice/value API over axum.

pub mod routes;

pub use routes::{app_router, AppState};
