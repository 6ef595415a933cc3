use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lyricsfetch::store::SqliteSongStore;
use lyricsfetch::{Config, LyricsQuery, Provenance, SourceOrchestrator};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lyricsfetch", version, about = "Find and clean song lyrics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up lyrics through the cache, then the web
    Search {
        title: String,
        #[arg(long)]
        artist: Option<String>,
        /// Fetch fresh lyrics even if the title is cached
        #[arg(long)]
        refresh: bool,
        /// Store the freshly acquired lyrics in the song database
        #[arg(long)]
        save: bool,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clean lyrics from a file, or stdin when no file is given
    Clean { file: Option<PathBuf> },
    /// Store lyrics from a file in the song database
    Save {
        title: String,
        file: PathBuf,
        #[arg(long)]
        artist: Option<String>,
        #[arg(long, default_value = "manual")]
        source: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Cleaning is a pure filter and needs neither logging nor a database
    if let Command::Clean { file } = &cli.command {
        return run_clean(file.as_ref());
    }

    let log_dir = lyricsfetch::paths::get_log_dir()?;
    let file_appender = tracing_appender::rolling::never(&log_dir, "lyricsfetch.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lyricsfetch=debug,reqwest=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    let config = Config::from_env().context("Invalid configuration")?;
    let db_path = match &config.db_path {
        Some(path) => path.clone(),
        None => lyricsfetch::paths::get_song_db_path()?,
    };
    tracing::info!("Song database: {}", db_path.display());
    let store = Arc::new(
        SqliteSongStore::open(&db_path)
            .with_context(|| format!("Failed to open song database {}", db_path.display()))?,
    );
    let orchestrator = SourceOrchestrator::from_config(&config, store)?;

    match cli.command {
        Command::Search {
            title,
            artist,
            refresh,
            save,
            json,
        } => {
            let mut query = LyricsQuery::new(title);
            query.artist = artist;
            query.refresh = refresh;
            run_search(&orchestrator, &query, save, json).await
        }
        Command::Save {
            title,
            file,
            artist,
            source,
        } => {
            let lyrics = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let outcome = orchestrator
                .cache()
                .upsert(&title, artist.as_deref(), &lyrics, &source)
                .await?;
            println!("Saved \"{}\" as song {}", title, outcome.song_id);
            Ok(())
        }
        Command::Clean { .. } => Ok(()),
    }
}

async fn run_search(
    orchestrator: &SourceOrchestrator,
    query: &LyricsQuery,
    save: bool,
    json: bool,
) -> Result<()> {
    let results = orchestrator.search_lyrics(query).await?;

    if save {
        if let Some(fresh) = results.iter().find(|r| r.provenance == Provenance::Api) {
            let outcome = orchestrator
                .cache()
                .upsert(
                    &fresh.title,
                    fresh.artist.as_deref(),
                    fresh.lyrics.as_str(),
                    &fresh.source,
                )
                .await?;
            eprintln!("Cached as song {}", outcome.song_id);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for (idx, result) in results.iter().enumerate() {
        if idx > 0 {
            println!("\n----------------------------------------\n");
        }
        let origin = match result.provenance {
            Provenance::Cache => "cache",
            Provenance::Api => "fresh",
        };
        println!("# {} [{}: {}]\n", result.title, origin, result.source);
        println!("{}", result.lyrics);
    }
    Ok(())
}

fn run_clean(file: Option<&PathBuf>) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    println!("{}", lyricsfetch::clean(&text));
    Ok(())
}
