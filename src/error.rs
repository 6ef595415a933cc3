use thiserror::Error;

pub type Result<T> = std::result::Result<T, LyricsError>;

#[derive(Debug, Error)]
pub enum LyricsError {
    /// Missing or unusable settings, e.g. search credentials
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The search API answered with an error payload
    #[error("Search API error: {0}")]
    Upstream(String),

    /// Transport failure, timeout or non-2xx page response
    #[error("Network error: {0}")]
    Network(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Lyrics not found for \"{0}\"")]
    NotFound(String),
}

impl From<reqwest::Error> for LyricsError {
    fn from(err: reqwest::Error) -> Self {
        LyricsError::Network(err.to_string())
    }
}

impl From<rusqlite::Error> for LyricsError {
    fn from(err: rusqlite::Error) -> Self {
        LyricsError::Store(err.to_string())
    }
}
