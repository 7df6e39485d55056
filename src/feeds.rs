//! Story snapshots and feed freshness.
//!
//! Fetching lives outside this program: an external fetcher keeps a TOML
//! snapshot of every feed's stories up to date. This module loads that file,
//! carries the user's read/marked state across reloads, and tracks when each
//! feed is due for another look.
use crate::story::{Story, StoryId};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Maximum snapshot size (16 MB).
const MAX_FILE_SIZE: u64 = 16 * 1_048_576;

#[derive(Debug, Error)]
pub enum FeedFileError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid story snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Story snapshot {path} is {size} bytes (max {max} bytes)")]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Loading {path} did not finish: {source}")]
    Task {
        path: PathBuf,
        #[source]
        source: tokio::task::JoinError,
    },
}

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    feed: Vec<FeedEntry>,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    name: String,
    refresh_minutes: Option<u64>,
    #[serde(default)]
    story: Vec<Story>,
}

/// A feed as listed in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedInfo {
    pub name: String,
    /// Per-feed override of the freshness interval.
    pub refresh: Option<Duration>,
}

/// Every feed and story in one snapshot, in file order.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub feeds: Vec<FeedInfo>,
    pub stories: Vec<Story>,
}

impl Snapshot {
    /// Parse snapshot text. Each story is stamped with its feed's name.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let file: SnapshotFile = toml::from_str(content)?;
        let mut snapshot = Snapshot::default();
        for entry in file.feed {
            for mut story in entry.story {
                story.feed = entry.name.clone();
                snapshot.stories.push(story);
            }
            snapshot.feeds.push(FeedInfo {
                refresh: entry.refresh_minutes.map(|m| Duration::from_secs(m * 60)),
                name: entry.name,
            });
        }
        Ok(snapshot)
    }

    pub fn load(path: &Path) -> Result<Self, FeedFileError> {
        let io_err = |source| FeedFileError::Io {
            path: path.to_path_buf(),
            source,
        };

        let size = std::fs::metadata(path).map_err(io_err)?.len();
        if size > MAX_FILE_SIZE {
            return Err(FeedFileError::TooLarge {
                path: path.to_path_buf(),
                size,
                max: MAX_FILE_SIZE,
            });
        }

        let content = std::fs::read_to_string(path).map_err(io_err)?;
        let snapshot = Self::parse(&content).map_err(|source| FeedFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            feeds = snapshot.feeds.len(),
            stories = snapshot.stories.len(),
            "Loaded story snapshot"
        );
        Ok(snapshot)
    }

    /// Carry read/marked flags over from stories the user has already seen.
    pub fn merge_state(&mut self, known: &HashMap<StoryId, Story>) {
        for story in &mut self.stories {
            if let Some(old) = known.get(&story.id) {
                story.adopt_state(old);
            }
        }
    }
}

// ============================================================================
// Freshness
// ============================================================================

#[derive(Debug, Clone)]
struct FeedTimer {
    name: String,
    interval: Duration,
    /// `None` once expired.
    checked: Option<Instant>,
}

/// When each feed was last looked at, and how stale it may get.
#[derive(Debug, Clone, Default)]
pub struct FreshnessTimers {
    timers: Vec<FeedTimer>,
}

impl FreshnessTimers {
    /// Timers for `feeds`, all fresh as of `now`.
    pub fn new(feeds: &[FeedInfo], default_interval: Duration, now: Instant) -> Self {
        let mut timers = Self::default();
        timers.sync(feeds, default_interval, now);
        timers
    }

    /// Match the timers to a new feed list. Feeds still present keep their
    /// state, new ones start fresh as of `now`, and vanished ones are dropped.
    pub fn sync(&mut self, feeds: &[FeedInfo], default_interval: Duration, now: Instant) {
        let mut old: HashMap<String, FeedTimer> = self
            .timers
            .drain(..)
            .map(|t| (t.name.clone(), t))
            .collect();
        self.timers = feeds
            .iter()
            .map(|feed| {
                let interval = feed.refresh.unwrap_or(default_interval);
                match old.remove(&feed.name) {
                    Some(timer) => FeedTimer { interval, ..timer },
                    None => FeedTimer {
                        name: feed.name.clone(),
                        interval,
                        checked: Some(now),
                    },
                }
            })
            .collect();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Make every feed due.
    pub fn expire_all(&mut self) {
        for timer in &mut self.timers {
            timer.checked = None;
        }
    }

    /// Names of feeds that are due at `now`. A zero interval never comes due
    /// on its own.
    pub fn due(&self, now: Instant) -> Vec<&str> {
        self.timers
            .iter()
            .filter(|t| match t.checked {
                None => true,
                Some(_) if t.interval.is_zero() => false,
                Some(checked) => now.saturating_duration_since(checked) >= t.interval,
            })
            .map(|t| t.name.as_str())
            .collect()
    }

    /// Every feed was just looked at.
    pub fn touch_all(&mut self, now: Instant) {
        for timer in &mut self.timers {
            timer.checked = Some(now);
        }
    }
}

/// Where stories come from and when to look again.
#[derive(Debug, Clone)]
pub struct FeedSource {
    path: PathBuf,
    default_interval: Duration,
    timers: FreshnessTimers,
}

impl FeedSource {
    pub fn new(path: PathBuf, default_interval: Duration, feeds: &[FeedInfo], now: Instant) -> Self {
        Self {
            timers: FreshnessTimers::new(feeds, default_interval, now),
            path,
            default_interval,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn expire_all(&mut self) {
        self.timers.expire_all();
    }

    pub fn is_due(&self, now: Instant) -> bool {
        let due = self.timers.due(now);
        if !due.is_empty() {
            tracing::debug!(feeds = ?due, "Feeds due for refresh");
        }
        !due.is_empty()
    }

    /// A reload succeeded: follow its feed list and restart every timer.
    pub fn loaded(&mut self, feeds: &[FeedInfo], now: Instant) {
        self.timers.sync(feeds, self.default_interval, now);
        self.timers.touch_all(now);
    }

    /// A reload failed: wait a full interval before trying again.
    pub fn failed(&mut self, now: Instant) {
        self.timers.touch_all(now);
    }
}
