use anyhow::{Context, Result};
use canto::config::Config;
use canto::feeds::{FeedSource, Snapshot};
use canto::keybindings::KeybindingRegistry;
use canto::launcher::SystemLauncher;
use canto::tag::Tag;
use canto::theme::ThemeVariant;
use canto::view::columns::Columns;
use canto::view::render::StoryRenderer;
use canto::view::{ViewController, ViewError, ViewStack, STATUS_ROWS};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Get the config directory path (~/.config/canto/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("canto"))
}

#[derive(Parser, Debug)]
#[command(name = "canto", about = "Terminal feed reader")]
struct Args {
    /// Config file (default: ~/.config/canto/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Story snapshot kept up to date by the fetcher (default: ~/.config/canto/feeds.toml)
    #[arg(long, value_name = "FILE")]
    feeds: Option<PathBuf>,

    /// Log file (default: ~/.config/canto/canto.log)
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Number of story columns, overriding the config
    #[arg(long, value_name = "N")]
    columns: Option<u16>,
}

/// Log to a file: the terminal belongs to the UI.
fn init_tracing(path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Tags named in the config, or one per feed in snapshot order.
fn build_tags(names: &[String], snapshot: &Snapshot) -> Vec<Tag> {
    let mut tags: Vec<Tag> = if names.is_empty() {
        snapshot.feeds.iter().map(|f| Tag::for_feed(&f.name)).collect()
    } else {
        names
            .iter()
            .map(|name| match name.as_str() {
                "*" => Tag::all(),
                feed => Tag::for_feed(feed),
            })
            .collect()
    };
    for tag in &mut tags {
        tag.extend(&snapshot.stories);
    }
    tags
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    let log_path = args.log.unwrap_or_else(|| config_dir.join("canto.log"));
    init_tracing(&log_path)?;

    let config_path = args.config.unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let feeds_path = args.feeds.unwrap_or_else(|| config_dir.join("feeds.toml"));
    let snapshot = Snapshot::load(&feeds_path).context("Failed to load stories")?;

    let palette = match ThemeVariant::from_str_name(&config.theme) {
        Some(variant) => variant.palette(),
        None => {
            tracing::warn!(theme = %config.theme, "Unknown theme, using dark");
            ThemeVariant::Dark.palette()
        }
    };

    let mut bindings = KeybindingRegistry::new();
    for warning in bindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
    }

    let (width, height) = crossterm::terminal::size().context("Failed to read terminal size")?;
    let columns = Columns::new(
        height.saturating_sub(STATUS_ROWS),
        width,
        args.columns.unwrap_or(config.columns),
    );
    let tags = build_tags(&config.tags, &snapshot);
    let renderer = Rc::new(StoryRenderer::new(palette.clone()));
    let root = match ViewController::new(columns, tags, renderer) {
        Ok(view) => view,
        Err(ViewError::NoStories) => {
            eprintln!("No stories in {}", feeds_path.display());
            eprintln!("Point --feeds at a snapshot written by your fetcher.");
            std::process::exit(1);
        }
    };

    let default_interval = Duration::from_secs(config.refresh_interval_minutes * 60);
    let source = FeedSource::new(feeds_path, default_interval, &snapshot.feeds, Instant::now());
    let launcher = SystemLauncher::new(config.browser.clone());
    let mut stack = ViewStack::new(root, bindings, Box::new(launcher), palette);

    tracing::info!(
        stories = snapshot.stories.len(),
        columns = columns.count(),
        "Starting"
    );
    canto::ui::run(&mut stack, source).await?;

    tracing::info!("Exiting");
    Ok(())
}
