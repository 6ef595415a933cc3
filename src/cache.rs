use crate::error::Result;
use crate::normalize;
use crate::store::{NewSong, SongRecord, SongStore, SongUpdate};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertOutcome {
    pub success: bool,
    pub song_id: i64,
}

/// Lyrics cache on top of the song store.
///
/// Owns the update-or-insert decision; nothing else in the system prevents
/// duplicate songs.
#[derive(Clone)]
pub struct CacheAdapter {
    store: Arc<dyn SongStore>,
}

impl CacheAdapter {
    pub fn new(store: Arc<dyn SongStore>) -> Self {
        Self { store }
    }

    /// Cached songs with exactly this title
    pub async fn lookup(&self, title: &str) -> Result<Vec<SongRecord>> {
        self.store.find_by_exact_title(title).await
    }

    /// Store lyrics for a song, updating the matching record if one exists.
    ///
    /// Lyrics are cleaned before they are written. Concurrent upserts of the same
    /// song both land on the matched record and the last write wins.
    pub async fn upsert(
        &self,
        title: &str,
        artist: Option<&str>,
        lyrics: &str,
        source: &str,
    ) -> Result<UpsertOutcome> {
        let cleaned = normalize::clean(lyrics);
        let source = Some(source.to_string()).filter(|s| !s.is_empty());

        let candidates = self.store.find_by_title(title).await?;
        let existing = candidates
            .iter()
            .find(|record| is_same_song(record, title, artist));

        if let Some(record) = existing {
            self.store
                .update(
                    record.id,
                    SongUpdate {
                        lyrics: Some(cleaned),
                        source,
                    },
                )
                .await?;
            tracing::info!("Updated cached lyrics for \"{}\" (song {})", title, record.id);
            return Ok(UpsertOutcome {
                success: true,
                song_id: record.id,
            });
        }

        let song_id = self
            .store
            .insert(NewSong {
                title: title.to_string(),
                artist: artist
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string),
                lyrics: cleaned,
                source,
            })
            .await?;
        tracing::info!("Cached lyrics for \"{}\" as new song {}", title, song_id);

        Ok(UpsertOutcome {
            success: true,
            song_id,
        })
    }
}

/// Title equal ignoring case, and artists either both blank or equal ignoring case
pub fn is_same_song(record: &SongRecord, title: &str, artist: Option<&str>) -> bool {
    if record.title.to_lowercase() != title.to_lowercase() {
        return false;
    }

    let stored = record.artist.as_deref().map(str::trim).unwrap_or_default();
    let wanted = artist.map(str::trim).unwrap_or_default();
    match (stored.is_empty(), wanted.is_empty()) {
        (true, true) => true,
        (false, false) => stored.to_lowercase() == wanted.to_lowercase(),
        _ => false,
    }
}
