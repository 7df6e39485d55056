//! Tags — named, collapsible groups of stories.
//!
//! A tag does not own its membership rule implicitly: a [`TagFilter`] decides
//! which stories from a refresh it keeps, so the same tag object can be
//! cleared and refilled from new data without losing its collapse state.
use crate::story::{Story, StoryId};
use regex::Regex;
use std::ops::Index;

/// Membership rule applied by [`Tag::extend`].
#[derive(Debug, Clone)]
pub enum TagFilter {
    /// Every story ("*").
    All,
    /// Stories whose `feed` matches exactly.
    Feed(String),
    /// Stories whose title matches (collect-search results).
    Title(Regex),
}

impl TagFilter {
    pub fn accepts(&self, story: &Story) -> bool {
        match self {
            Self::All => true,
            Self::Feed(name) => story.feed == *name,
            Self::Title(re) => re.is_match(&story.title),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tag {
    name: String,
    filter: TagFilter,
    stories: Vec<Story>,
    pub collapsed: bool,
}

impl Tag {
    pub fn new(name: impl Into<String>, filter: TagFilter) -> Self {
        Self {
            name: name.into(),
            filter,
            stories: Vec::new(),
            collapsed: false,
        }
    }

    /// A tag holding one feed's stories, named after the feed.
    pub fn for_feed(feed: impl Into<String>) -> Self {
        let feed = feed.into();
        Self::new(feed.clone(), TagFilter::Feed(feed))
    }

    /// The catch-all tag, conventionally named "*".
    pub fn all() -> Self {
        Self::new("*", TagFilter::All)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter(&self) -> &TagFilter {
        &self.filter
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Story> {
        self.stories.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Story> {
        self.stories.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Story> {
        self.stories.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Story> {
        self.stories.iter_mut()
    }

    /// Position of a story with the same identity, if this tag holds one.
    pub fn search_position(&self, id: &StoryId) -> Option<usize> {
        self.stories.iter().position(|s| s.id == *id)
    }

    pub fn set_read(&mut self, index: usize) {
        if let Some(story) = self.stories.get_mut(index) {
            story.set_read();
        }
    }

    pub fn set_unread(&mut self, index: usize) {
        if let Some(story) = self.stories.get_mut(index) {
            story.set_unread();
        }
    }

    pub fn all_read(&mut self) {
        self.stories.iter_mut().for_each(Story::set_read);
    }

    pub fn all_unread(&mut self) {
        self.stories.iter_mut().for_each(Story::set_unread);
    }

    pub fn unread_count(&self) -> usize {
        self.stories.iter().filter(|s| !s.is_read()).count()
    }

    pub fn clear(&mut self) {
        self.stories.clear();
    }

    /// Append every story the filter accepts, in order.
    pub fn extend<'a>(&mut self, items: impl IntoIterator<Item = &'a Story>) {
        let filter = &self.filter;
        self.stories
            .extend(items.into_iter().filter(|s| filter.accepts(s)).cloned());
    }
}

impl Index<usize> for Tag {
    type Output = Story;

    fn index(&self, index: usize) -> &Story {
        &self.stories[index]
    }
}

impl<'a> IntoIterator for &'a Tag {
    type Item = &'a Story;
    type IntoIter = std::slice::Iter<'a, Story>;

    fn into_iter(self) -> Self::IntoIter {
        self.stories.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stories() -> Vec<Story> {
        vec![
            Story::new("1", "lwn", "Kernel", ""),
            Story::new("2", "hn", "Show HN", ""),
            Story::new("3", "lwn", "Distros", ""),
        ]
    }

    #[test]
    fn test_feed_tag_keeps_only_its_feed() {
        let mut tag = Tag::for_feed("lwn");
        tag.extend(&stories());
        assert_eq!(tag.len(), 2);
        assert_eq!(tag[0].title, "Kernel");
        assert_eq!(tag[1].title, "Distros");
    }

    #[test]
    fn test_all_tag_keeps_everything() {
        let mut tag = Tag::all();
        tag.extend(&stories());
        assert_eq!(tag.len(), 3);
        assert_eq!(tag.name(), "*");
    }

    #[test]
    fn test_title_filter() {
        let mut tag = Tag::new("*", TagFilter::Title(Regex::new("(?i)^s").unwrap()));
        tag.extend(&stories());
        assert_eq!(tag.len(), 1);
        assert_eq!(tag[0].title, "Show HN");
    }

    #[test]
    fn test_search_position_by_identity() {
        let mut tag = Tag::for_feed("lwn");
        tag.extend(&stories());
        assert_eq!(tag.search_position(&StoryId::from("3")), Some(1));
        assert_eq!(tag.search_position(&StoryId::from("2")), None);
    }

    #[test]
    fn test_bulk_read_unread() {
        let mut tag = Tag::all();
        tag.extend(&stories());
        tag.all_read();
        assert_eq!(tag.unread_count(), 0);
        tag.set_unread(1);
        assert_eq!(tag.unread_count(), 1);
        tag.all_unread();
        assert_eq!(tag.unread_count(), 3);
    }

    #[test]
    fn test_set_read_out_of_range_is_noop() {
        let mut tag = Tag::all();
        tag.set_read(5);
        assert!(tag.is_empty());
    }

    #[test]
    fn test_clear_keeps_collapse_state() {
        let mut tag = Tag::all();
        tag.extend(&stories());
        tag.collapsed = true;
        tag.clear();
        assert!(tag.is_empty());
        assert!(tag.collapsed);
    }
}
