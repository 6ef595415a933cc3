use anyhow::Result;
use async_trait::async_trait;

/// Generated text shorter than this (after trimming) is a refusal or a stub, not lyrics
pub const MIN_GENERATED_LENGTH: usize = 20;

/// A configured text-generation provider.
///
/// The application decides which provider is active and injects it; a missing
/// generator means the provider is "none".
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name, recorded as the result's source
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub fn lyrics_prompt(title: &str, artist: Option<&str>) -> String {
    match artist.map(str::trim).filter(|a| !a.is_empty()) {
        Some(artist) => format!(
            "Provide the complete lyrics of the song \"{}\" by {}. Lyrics only, no explanation.",
            title, artist
        ),
        None => format!(
            "Provide the complete lyrics of the song \"{}\". Lyrics only, no explanation.",
            title
        ),
    }
}

/// Whether a generated response is long enough to be taken as lyrics
pub fn is_acceptable(response: &str) -> bool {
    response.trim().chars().count() >= MIN_GENERATED_LENGTH
}
