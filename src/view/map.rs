//! The visible-item map: a flat, laid-out snapshot of every story a list
//! view currently shows.
//!
//! The map is a value. It is rebuilt whole from the tag list and swapped in,
//! never patched in place.
use super::columns::Measure;
use super::render::ItemRenderer;
use crate::tag::Tag;

/// One visible story and the rows it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEntry {
    pub tag: usize,
    pub story: usize,
    pub row: usize,
    pub rows: usize,
}

impl MapEntry {
    /// First row past this entry.
    pub fn end(&self) -> usize {
        self.row + self.rows
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemMap {
    entries: Vec<MapEntry>,
    total_rows: usize,
}

impl ItemMap {
    /// Lay out `tags` in order. A collapsed tag contributes only its head
    /// story; stories the renderer reports as zero rows are left out.
    pub fn build(tags: &[Tag], renderer: &dyn ItemRenderer, width: u16) -> Self {
        let mut measure = Measure::new(width);
        let mut entries = Vec::new();
        let mut row = 0;

        for (t, tag) in tags.iter().enumerate() {
            let shown = if tag.collapsed {
                tag.len().min(1)
            } else {
                tag.len()
            };
            for s in 0..shown {
                let rows = renderer.print_item(tag, s, row as isize, &mut measure);
                if rows == 0 {
                    continue;
                }
                entries.push(MapEntry {
                    tag: t,
                    story: s,
                    row,
                    rows,
                });
                row += rows;
            }
        }

        Self {
            entries,
            total_rows: row,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MapEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MapEntry> {
        self.entries.iter()
    }

    /// Index of the last entry.
    pub fn last_index(&self) -> Option<usize> {
        self.entries.len().checked_sub(1)
    }

    /// End row of the last entry.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn position(&self, tag: usize, story: usize) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.tag == tag && e.story == story)
    }

    pub fn first_of_tag(&self, tag: usize) -> Option<usize> {
        self.entries.iter().position(|e| e.tag == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::Story;
    use crate::view::columns::Surface;
    use pretty_assertions::assert_eq;

    /// One row per story, except titles starting with '-' which are hidden.
    struct OneRow;

    impl ItemRenderer for OneRow {
        fn print_item(&self, tag: &Tag, index: usize, _row: isize, _s: &mut dyn Surface) -> usize {
            match tag.get(index) {
                Some(story) if story.title.starts_with('-') => 0,
                Some(_) => 1,
                None => 0,
            }
        }
    }

    fn tag(name: &str, titles: &[&str]) -> Tag {
        let stories: Vec<Story> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| Story::new(format!("{name}{i}"), name, *t, ""))
            .collect();
        let mut tag = Tag::for_feed(name);
        tag.extend(&stories);
        tag
    }

    #[test]
    fn test_rows_are_contiguous() {
        let tags = vec![tag("a", &["1", "2", "3"]), tag("b", &["4", "5", "6"])];
        let map = ItemMap::build(&tags, &OneRow, 80);
        assert_eq!(map.len(), 6);
        let rows: Vec<usize> = map.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(map.total_rows(), 6);
        assert_eq!(map.last_index(), Some(5));
    }

    #[test]
    fn test_collapsed_tag_keeps_only_head() {
        let mut tags = vec![tag("a", &["1", "2", "3"]), tag("b", &["4", "5"])];
        tags[0].collapsed = true;
        let map = ItemMap::build(&tags, &OneRow, 80);
        assert_eq!(
            map.entries(),
            &[
                MapEntry { tag: 0, story: 0, row: 0, rows: 1 },
                MapEntry { tag: 1, story: 0, row: 1, rows: 1 },
                MapEntry { tag: 1, story: 1, row: 2, rows: 1 },
            ]
        );
    }

    #[test]
    fn test_zero_row_stories_are_omitted() {
        let tags = vec![tag("a", &["1", "-hidden", "3"])];
        let map = ItemMap::build(&tags, &OneRow, 80);
        assert_eq!(map.len(), 2);
        assert_eq!(map.position(0, 1), None);
        assert_eq!(map.position(0, 2), Some(1));
        assert_eq!(map.get(1).map(|e| e.row), Some(1));
    }

    #[test]
    fn test_empty_tags_produce_empty_map() {
        let tags = vec![tag("a", &[]), tag("b", &[])];
        let map = ItemMap::build(&tags, &OneRow, 80);
        assert!(map.is_empty());
        assert_eq!(map.last_index(), None);
        assert_eq!(map.first_of_tag(0), None);
    }
}
