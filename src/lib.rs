// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod content;
pub mod metrics;
pub mod monitor;
pub mod report;
pub mod secrets;
pub mod sources;
pub mod summarize;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::monitor::{EnrichPolicy, Monitor, RunResult, Windows, CONTENT_UNAVAILABLE};
pub use crate::sources::types::{Category, Record, SourceAdapter};
