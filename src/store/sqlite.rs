use super::{NewSong, SongRecord, SongStore, SongUpdate};
use crate::error::{LyricsError, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use tokio::sync::Mutex;

const SONG_COLUMNS: &str = "id, title, artist, lyrics, source, updated_at";

pub struct SqliteSongStore {
    conn: Mutex<Connection>,
}

impl SqliteSongStore {
    /// Open or create the SQLite database
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        tracing::debug!("Opened song store at {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS songs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                title_key TEXT NOT NULL,
                artist TEXT,
                lyrics TEXT NOT NULL,
                source TEXT,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;
        add_title_key(&conn)?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS songs_title ON songs (title)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS songs_title_key ON songs (title_key)",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn query(conn: &Connection, sql: &str, arg: &str) -> Result<Vec<SongRecord>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([arg], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<SongRecord> {
    Ok(SongRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        lyrics: row.get(3)?,
        source: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Folded title used by the broad search. SQLite's LIKE only folds ASCII.
fn title_key(title: &str) -> String {
    title.to_lowercase()
}

/// Databases created before the folded title existed get the column and a backfill
fn add_title_key(conn: &Connection) -> Result<()> {
    let has_column = conn
        .prepare("SELECT 1 FROM pragma_table_info('songs') WHERE name = 'title_key'")?
        .exists([])?;
    if has_column {
        return Ok(());
    }

    conn.execute("ALTER TABLE songs ADD COLUMN title_key TEXT NOT NULL DEFAULT ''", [])?;
    let titles: Vec<(i64, String)> = conn
        .prepare("SELECT id, title FROM songs")?
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<std::result::Result<_, _>>()?;
    for (id, title) in &titles {
        conn.execute(
            "UPDATE songs SET title_key = ?1 WHERE id = ?2",
            params![title_key(title), id],
        )?;
    }
    tracing::info!("Backfilled title keys for {} songs", titles.len());
    Ok(())
}

fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl SongStore for SqliteSongStore {
    async fn find_by_exact_title(&self, title: &str) -> Result<Vec<SongRecord>> {
        let conn = self.conn.lock().await;
        Self::query(
            &conn,
            &format!("SELECT {} FROM songs WHERE title = ?1 ORDER BY id", SONG_COLUMNS),
            title,
        )
    }

    async fn find_by_title(&self, title: &str) -> Result<Vec<SongRecord>> {
        let conn = self.conn.lock().await;
        let pattern = format!("%{}%", escape_like(&title_key(title)));
        Self::query(
            &conn,
            &format!(
                "SELECT {} FROM songs WHERE title_key LIKE ?1 ESCAPE '\\' ORDER BY id",
                SONG_COLUMNS
            ),
            &pattern,
        )
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<SongRecord>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM songs WHERE id = ?1", SONG_COLUMNS))?;
        let mut rows = stmt.query_map([id], row_to_record)?;
        Ok(rows.next().transpose()?)
    }

    async fn insert(&self, song: NewSong) -> Result<i64> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO songs (title, title_key, artist, lyrics, source, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                song.title,
                title_key(&song.title),
                song.artist,
                song.lyrics,
                song.source,
                now_secs()
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!("Inserted song {} \"{}\"", id, song.title);
        Ok(id)
    }

    async fn update(&self, id: i64, update: SongUpdate) -> Result<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE songs SET lyrics = COALESCE(?1, lyrics), source = COALESCE(?2, source), updated_at = ?3 WHERE id = ?4",
            params![update.lyrics, update.source, now_secs(), id],
        )?;
        if changed == 0 {
            return Err(LyricsError::Store(format!("no song with id {}", id)));
        }
        tracing::info!("Updated song {}", id);
        Ok(())
    }
}
