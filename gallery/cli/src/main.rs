//! Gallery - Art Catalog Browser
//!
//! Command-line surface over `gallery-core`: browse and search the remote
//! catalog, open artwork and artist cards, and manage local favorites.
//!
//! # Usage
//!
//! ```bash
//! # First two pages of the browse feed
//! gallery browse --pages 2
//!
//! # Search
//! gallery search "water lilies"
//!
//! # Cards
//! gallery show 16568
//! gallery artist 35809
//!
//! # Favorites
//! gallery fav toggle 16568
//! gallery favorites
//!
//! # Throwaway session with debug logging
//! gallery --ephemeral -v browse
//! RUST_LOG=gallery_core=trace gallery browse
//! ```

mod app;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gallery_core::config::{load_config_from_path, ConfigOverrides};
use gallery_core::{ArticGateway, FileStore, KeyValueStore, MemoryStore};
use tracing::info;

use app::{App, FavAction};

/// Gallery - browse the Art Institute of Chicago catalog
#[derive(Parser, Debug)]
#[command(name = "gallery")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "GALLERY_CONFIG", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Catalog API root
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,

    /// Artworks per page
    #[arg(long, value_name = "N", global = true)]
    page_size: Option<u32>,

    /// Favorites storage file
    #[arg(long, value_name = "FILE", global = true)]
    storage: Option<PathBuf>,

    /// Keep favorites in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the unfiltered catalog feed
    Browse {
        /// Pages to load (at least 1)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,
    },
    /// Full-text search
    Search {
        /// Search terms
        query: String,
        /// Pages to load (at least 1)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,
    },
    /// Show an artwork card
    Show {
        /// Artwork id
        id: String,
    },
    /// Show an artist card
    Artist {
        /// Artist id
        id: String,
    },
    /// List favorites with full records
    Favorites,
    /// Manage favorites
    Fav {
        #[command(subcommand)]
        action: FavCommand,
    },
}

#[derive(Subcommand, Debug)]
enum FavCommand {
    /// Mark an artwork as favorite
    Add {
        /// Artwork id
        id: String,
    },
    /// Unmark an artwork
    Remove {
        /// Artwork id
        id: String,
    },
    /// Flip an artwork's favorite state
    Toggle {
        /// Artwork id
        id: String,
    },
    /// Remove every favorite
    Clear,
    /// Print persisted favorite ids
    Ids,
}

impl From<FavCommand> for FavAction {
    fn from(command: FavCommand) -> Self {
        match command {
            FavCommand::Add { id } => Self::Add(id),
            FavCommand::Remove { id } => Self::Remove(id),
            FavCommand::Toggle { id } => Self::Toggle(id),
            FavCommand::Clear => Self::Clear,
            FavCommand::Ids => Self::Ids,
        }
    }
}

/// Initialize logging to stderr so command output stays pipeable
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("gallery={level},gallery_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config_path = args
        .config
        .clone()
        .or_else(gallery_core::default_config_path);
    let mut config = load_config_from_path(config_path).context("failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(url) = args.api_url.clone() {
        overrides = overrides.with_api_url(url);
    }
    if let Some(size) = args.page_size {
        overrides = overrides.with_page_size(size);
    }
    if let Some(path) = args.storage.clone() {
        overrides = overrides.with_storage_path(path);
    }
    overrides.apply(&mut config);
    config.validate()?;
    info!(source = %config.source(), api = %config.api_url, "Configuration resolved");

    let storage: Arc<dyn KeyValueStore> = if args.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        let path = config
            .resolved_storage_path()
            .context("no storage path configured and no data directory available")?;
        info!(path = %path.display(), "Favorites storage");
        Arc::new(FileStore::new(path))
    };

    let gateway = Arc::new(ArticGateway::from_config(&config)?);
    let app = App::new(gateway, storage, config.page_size, config.artist_works_limit);

    let output = match args.command {
        Command::Browse { pages } => app.browse(pages).await?,
        Command::Search { query, pages } => app.search(&query, pages).await?,
        Command::Show { id } => app.show(&id).await?,
        Command::Artist { id } => app.artist(&id).await?,
        Command::Favorites => app.list_favorites().await?,
        Command::Fav { action } => app.fav(action.into()).await?,
    };
    print!("{output}");

    Ok(())
}
