pub mod sqlite;

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

pub use sqlite::SqliteSongStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    pub id: i64,
    pub title: String,
    pub artist: Option<String>,
    pub lyrics: String,
    pub source: Option<String>,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSong {
    pub title: String,
    pub artist: Option<String>,
    pub lyrics: String,
    pub source: Option<String>,
}

/// Fields to change on an existing song; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongUpdate {
    pub lyrics: Option<String>,
    pub source: Option<String>,
}

/// The song store the lyrics pipeline reads from and writes to
#[async_trait]
pub trait SongStore: Send + Sync {
    /// Songs whose title matches exactly, case included
    async fn find_by_exact_title(&self, title: &str) -> Result<Vec<SongRecord>>;

    /// Songs whose title contains `title`; a broad match for further filtering
    async fn find_by_title(&self, title: &str) -> Result<Vec<SongRecord>>;

    async fn get_by_id(&self, id: i64) -> Result<Option<SongRecord>>;

    /// Returns the new song's id
    async fn insert(&self, song: NewSong) -> Result<i64>;

    async fn update(&self, id: i64, update: SongUpdate) -> Result<()>;
}
