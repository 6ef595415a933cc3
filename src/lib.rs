//! Lyrics acquisition for slide generation.
//!
//! [`orchestrator::SourceOrchestrator`] walks the fallback chain (cached songs,
//! an injected text generator, then web search and scraping) and hands back
//! lyrics that went through [`normalize::clean`].

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod generate;
pub mod normalize;
pub mod orchestrator;
pub mod paths;
pub mod search;
pub mod store;

pub use cache::{CacheAdapter, UpsertOutcome};
pub use config::Config;
pub use error::{LyricsError, Result};
pub use normalize::{clean, NormalizedText};
pub use orchestrator::{LyricsQuery, LyricsResult, Provenance, SourceOrchestrator};
