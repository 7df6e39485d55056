//! Story records — one feed item with read/marked/selected flags.
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identity
// ============================================================================

/// Stable identity of a story across refreshes (the feed item's guid).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub String);

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ============================================================================
// Story
// ============================================================================

/// A single feed item.
///
/// `selected` is view state, never persisted: exactly one story is selected
/// in each list view, and the owning controller is the only thing that
/// flips it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    /// Name of the feed this story came from. Filled in by the snapshot
    /// loader, so it is optional in the file itself.
    #[serde(default)]
    pub feed: String,
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub published: Option<i64>,
    #[serde(default)]
    read: bool,
    #[serde(default)]
    marked: bool,
    #[serde(skip)]
    selected: bool,
}

impl Story {
    pub fn new(
        id: impl Into<String>,
        feed: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            id: StoryId(id.into()),
            feed: feed.into(),
            title: title.into(),
            link: link.into(),
            description: None,
            published: None,
            read: false,
            marked: false,
            selected: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_published(mut self, published: i64) -> Self {
        self.published = Some(published);
        self
    }

    pub fn select(&mut self) {
        self.selected = true;
    }

    pub fn unselect(&mut self) {
        self.selected = false;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn mark(&mut self) {
        self.marked = true;
    }

    pub fn unmark(&mut self) {
        self.marked = false;
    }

    pub fn marked(&self) -> bool {
        self.marked
    }

    pub fn set_read(&mut self) {
        self.read = true;
    }

    pub fn set_unread(&mut self) {
        self.read = false;
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    /// Copy the user-facing flags (read, marked) from another copy of the
    /// same story. Selection is deliberately left alone.
    pub fn adopt_state(&mut self, other: &Story) {
        self.read = other.read;
        self.marked = other.marked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_story_is_unread_unmarked_unselected() {
        let story = Story::new("1", "feed", "Title", "https://example.com/1");
        assert!(!story.is_read());
        assert!(!story.marked());
        assert!(!story.is_selected());
    }

    #[test]
    fn test_adopt_state_leaves_selection() {
        let mut a = Story::new("1", "feed", "Title", "");
        a.select();
        let mut b = a.clone();
        b.unselect();
        b.set_read();
        b.mark();

        a.adopt_state(&b);
        assert!(a.is_read());
        assert!(a.marked());
        assert!(a.is_selected());
    }

    #[test]
    fn test_selected_is_not_deserialized() {
        let story: Story = toml::from_str(
            r#"
id = "x"
title = "T"
selected = true
"#,
        )
        .unwrap();
        assert!(!story.is_selected());
        assert_eq!(story.id, StoryId::from("x"));
        assert!(story.link.is_empty());
    }
}
