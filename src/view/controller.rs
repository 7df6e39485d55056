//! The list view: a scrollable, multi-column window over tagged stories with
//! a single selection cursor.
use super::columns::{Canvas, Columns};
use super::map::{ItemMap, MapEntry};
use super::reader::ReaderView;
use super::render::ItemRenderer;
use super::search::{SearchKind, SearchPrompt};
use super::{Command, Effects, Flow, View};
use crate::keybindings::Action;
use crate::story::{Story, StoryId};
use crate::tag::{Tag, TagFilter};
use ratatui::{buffer::Buffer, layout::Rect};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("No stories to display")]
    NoStories,
}

pub struct ViewController {
    tags: Vec<Tag>,
    renderer: Rc<dyn ItemRenderer>,
    columns: Columns,
    map: ItemMap,
    cursor: usize,
    offset: usize,
}

impl ViewController {
    /// Build a view over `tags`, selecting the first story of the first
    /// non-empty tag.
    pub fn new(
        columns: Columns,
        tags: Vec<Tag>,
        renderer: Rc<dyn ItemRenderer>,
    ) -> Result<Self, ViewError> {
        let first = tags
            .iter()
            .position(|t| !t.is_empty())
            .ok_or(ViewError::NoStories)?;

        let mut view = Self {
            tags,
            renderer,
            columns,
            map: ItemMap::default(),
            cursor: 0,
            offset: 0,
        };
        view.clear_selection();
        view.rebuild_map();
        if view.map.is_empty() {
            return Err(ViewError::NoStories);
        }
        view.cursor = view.map.position(first, 0).unwrap_or(0);
        view.select();
        Ok(view)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn columns(&self) -> Columns {
        self.columns
    }

    pub fn map(&self) -> &ItemMap {
        &self.map
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// The map entry under the cursor.
    pub fn current(&self) -> Option<MapEntry> {
        self.map.get(self.cursor).copied()
    }

    pub fn selected_story(&self) -> Option<&Story> {
        let entry = self.current()?;
        self.tags.get(entry.tag)?.get(entry.story)
    }

    fn story_at_mut(&mut self, index: usize) -> Option<&mut Story> {
        let entry = *self.map.get(index)?;
        self.tags.get_mut(entry.tag)?.get_mut(entry.story)
    }

    fn selected_story_mut(&mut self) -> Option<&mut Story> {
        self.story_at_mut(self.cursor)
    }

    fn select(&mut self) {
        if let Some(story) = self.selected_story_mut() {
            story.select();
        }
    }

    fn unselect(&mut self) {
        if let Some(story) = self.selected_story_mut() {
            story.unselect();
        }
    }

    fn clear_selection(&mut self) {
        for tag in &mut self.tags {
            tag.iter_mut().for_each(Story::unselect);
        }
    }

    fn move_to(&mut self, index: usize) {
        self.unselect();
        self.cursor = index;
        self.select();
    }

    // ------------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------------

    /// Lay out the tags again and swap the new map in.
    pub fn rebuild_map(&mut self) {
        self.map = ItemMap::build(
            &self.tags,
            self.renderer.as_ref(),
            self.columns.column_width(),
        );
        tracing::debug!(
            entries = self.map.len(),
            rows = self.map.total_rows(),
            "Rebuilt item map"
        );
    }

    /// New window geometry. The selected story keeps the cursor if it is
    /// still laid out, else the cursor goes to the top of its tag.
    pub fn resize(&mut self, height: u16, width: u16) {
        self.columns = Columns::new(height, width, self.columns.count());
        let before = self.current();
        self.unselect();
        self.rebuild_map();
        match before {
            Some(entry) => match self.map.position(entry.tag, entry.story) {
                Some(index) => {
                    self.cursor = index;
                    self.select();
                }
                None => self.top_of_tag(entry.tag),
            },
            None => {
                self.cursor = 0;
                self.select();
            }
        }
    }

    /// Scroll so the selected entry's rows are inside the window. Returns
    /// whether the offset moved.
    pub fn check_scroll(&mut self) -> bool {
        let Some(entry) = self.current() else {
            return false;
        };
        let lines = self.columns.visible_lines();

        if entry.row < self.offset {
            self.offset = entry.row;
            return true;
        }
        if entry.end() > self.offset + lines {
            self.offset = entry.end() - lines;
            return true;
        }
        false
    }

    /// Paint the visible window into `area` of `buf`.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        self.check_scroll();

        let offset = self.offset;
        let lines = self.columns.visible_lines();
        let renderer = Rc::clone(&self.renderer);
        let mut canvas = Canvas::new(buf, area, self.columns);
        let mut reached = offset;

        for entry in self.map.iter() {
            if entry.end() <= offset {
                continue;
            }
            if entry.row > offset + lines {
                break;
            }
            let row = entry.row as isize - offset as isize;
            if let Some(tag) = self.tags.get(entry.tag) {
                renderer.print_item(tag, entry.story, row, &mut canvas);
            }
            reached = entry.end();
        }

        canvas.clear_unpainted(reached - offset);
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Run one list action.
    pub fn perform(&mut self, action: Action, fx: &mut Effects) -> Flow {
        match action {
            Action::NextItem => self.next_item(),
            Action::PrevItem => self.prev_item(),
            Action::NextTag => self.next_tag(),
            Action::PrevTag => self.prev_tag(),
            Action::NextMark => self.next_mark(),
            Action::PrevMark => self.prev_mark(),
            Action::ToggleMark => self.mark_toggle(),
            Action::JustRead => self.mark_read(),
            Action::JustUnread => self.mark_unread(),
            Action::ToggleCollapse => self.collapse_toggle(),
            Action::CollapseAll => self.collapse_all_set(true),
            Action::ExpandAll => self.collapse_all_set(false),
            Action::TagRead => self.tag_read_all(),
            Action::TagUnread => self.tag_unread_all(),
            Action::AllRead => self.global_read_all(),
            Action::AllUnread => self.global_unread_all(),
            Action::Search => return self.collect_search(fx),
            Action::InlineSearch => return self.inline_search(fx),
            Action::Goto => return self.open_link(fx),
            Action::Reader => return self.open_reader(fx),
            Action::Help => return self.help(fx),
            Action::ForceUpdate => return self.force_update(fx),
            Action::Quit => return self.quit(fx),
            Action::ScrollDown
            | Action::ScrollUp
            | Action::PageDown
            | Action::PageUp
            | Action::Commit
            | Action::Cancel => {}
        }
        Flow::Redraw
    }

    // ------------------------------------------------------------------------
    // Cursor movement
    // ------------------------------------------------------------------------

    pub fn next_item(&mut self) {
        if self.map.last_index().is_some_and(|last| self.cursor < last) {
            self.move_to(self.cursor + 1);
        }
    }

    pub fn prev_item(&mut self) {
        if self.cursor > 0 {
            self.move_to(self.cursor - 1);
        }
    }

    /// First entry of the previous tag, or the very first entry when already
    /// in the first tag.
    pub fn prev_tag(&mut self) {
        let Some(current) = self.current() else {
            return;
        };
        let dest = self
            .map
            .iter()
            .rposition(|e| e.tag < current.tag)
            .and_then(|i| self.map.first_of_tag(self.map.entries()[i].tag))
            .unwrap_or(0);
        self.move_to(dest);
    }

    /// First entry of the next tag. Scrolls so that tag's head is at the top
    /// of the window unless that would scroll past the end of the map.
    pub fn next_tag(&mut self) {
        let Some(current) = self.current() else {
            return;
        };
        let Some(dest) = self.map.iter().position(|e| e.tag > current.tag) else {
            return;
        };
        let row = self.map.entries()[dest].row;
        let max_offset = self
            .map
            .total_rows()
            .saturating_sub(self.columns.visible_lines());
        self.offset = row.min(max_offset);
        self.move_to(dest);
    }

    /// Select the first laid-out entry of `tag`, or the nearest one after it
    /// when the tag has nothing laid out.
    pub fn top_of_tag(&mut self, tag: usize) {
        self.cursor = self
            .map
            .first_of_tag(tag)
            .or_else(|| self.map.iter().position(|e| e.tag > tag))
            .or_else(|| self.map.last_index())
            .unwrap_or(0);
        tracing::debug!(tag, cursor = self.cursor, "Cursor moved to top of tag");
        self.select();
    }

    fn is_marked_at(&self, index: usize) -> bool {
        self.map
            .get(index)
            .and_then(|e| self.tags.get(e.tag)?.get(e.story))
            .is_some_and(Story::marked)
    }

    /// Next marked story after the cursor, if any.
    pub fn next_mark(&mut self) {
        let found = (self.cursor + 1..self.map.len()).find(|&i| self.is_marked_at(i));
        if let Some(index) = found {
            self.move_to(index);
        }
    }

    /// Previous marked story before the cursor, if any.
    pub fn prev_mark(&mut self) {
        let found = (0..self.cursor).rev().find(|&i| self.is_marked_at(i));
        if let Some(index) = found {
            self.move_to(index);
        }
    }

    // ------------------------------------------------------------------------
    // State changes
    // ------------------------------------------------------------------------

    pub fn mark_toggle(&mut self) {
        if let Some(story) = self.selected_story_mut() {
            if story.marked() {
                story.unmark();
            } else {
                story.mark();
            }
        }
        self.share_selected();
    }

    pub fn mark_read(&mut self) {
        if let Some(story) = self.selected_story_mut() {
            story.set_read();
        }
        self.share_selected();
    }

    pub fn mark_unread(&mut self) {
        if let Some(story) = self.selected_story_mut() {
            story.set_unread();
        }
        self.share_selected();
    }

    pub fn collapse_toggle(&mut self) {
        let Some(current) = self.current() else {
            return;
        };
        if let Some(tag) = self.tags.get_mut(current.tag) {
            tag.collapsed = !tag.collapsed;
        }
        self.unselect();
        self.rebuild_map();
        self.top_of_tag(current.tag);
    }

    pub fn collapse_all_set(&mut self, collapsed: bool) {
        let Some(current) = self.current() else {
            return;
        };
        for tag in &mut self.tags {
            tag.collapsed = collapsed;
        }
        self.unselect();
        self.rebuild_map();
        self.top_of_tag(current.tag);
    }

    pub fn tag_read_all(&mut self) {
        let Some(current) = self.current() else {
            return;
        };
        if let Some(tag) = self.tags.get_mut(current.tag) {
            tag.all_read();
        }
        self.share_tag(current.tag);
    }

    pub fn tag_unread_all(&mut self) {
        let Some(current) = self.current() else {
            return;
        };
        if let Some(tag) = self.tags.get_mut(current.tag) {
            tag.all_unread();
        }
        self.share_tag(current.tag);
    }

    /// Copy the selected story's flags onto its copies in other tags.
    fn share_selected(&mut self) {
        if let Some(story) = self.selected_story().cloned() {
            self.adopt_flags([&story]);
        }
    }

    fn share_tag(&mut self, tag: usize) {
        if let Some(source) = self.tags.get(tag).cloned() {
            self.adopt_flags(&source);
        }
    }

    pub fn global_read_all(&mut self) {
        self.tags.iter_mut().for_each(Tag::all_read);
    }

    pub fn global_unread_all(&mut self) {
        self.tags.iter_mut().for_each(Tag::all_unread);
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    pub fn collect_search(&mut self, fx: &mut Effects) -> Flow {
        fx.push(Command::Push(Box::new(View::Search(SearchPrompt::new(
            SearchKind::Collect,
        )))));
        Flow::Handled
    }

    pub fn inline_search(&mut self, fx: &mut Effects) -> Flow {
        fx.push(Command::Push(Box::new(View::Search(SearchPrompt::new(
            SearchKind::Inline,
        )))));
        Flow::Handled
    }

    /// Apply a committed search pattern.
    pub fn on_search(&mut self, kind: SearchKind, pattern: &Regex, fx: &mut Effects) -> Flow {
        match kind {
            SearchKind::Collect => self.collect_matches(pattern, fx),
            SearchKind::Inline => {
                for story in self.tags.iter_mut().flat_map(|t| t.iter_mut()) {
                    if pattern.is_match(&story.title) {
                        story.mark();
                    } else {
                        story.unmark();
                    }
                }
                Flow::Redraw
            }
        }
    }

    /// Open a new view over a single "*" tag of every matching story. A
    /// story listed under several tags appears once.
    fn collect_matches(&mut self, pattern: &Regex, fx: &mut Effects) -> Flow {
        let mut seen: HashSet<&StoryId> = HashSet::new();
        let matches: Vec<&Story> = self
            .tags
            .iter()
            .flat_map(|t| t.iter())
            .filter(|s| pattern.is_match(&s.title))
            .filter(|s| seen.insert(&s.id))
            .collect();

        tracing::debug!(pattern = %pattern, matches = matches.len(), "Collect search");
        if matches.is_empty() {
            fx.push(Command::Status("No matching stories".to_string()));
            return Flow::Redraw;
        }

        let mut tag = Tag::new("*", TagFilter::Title(pattern.clone()));
        tag.extend(matches);
        match ViewController::new(self.columns, vec![tag], Rc::clone(&self.renderer)) {
            Ok(view) => fx.push(Command::Push(Box::new(View::List(view)))),
            Err(e) => fx.push(Command::Status(e.to_string())),
        }
        Flow::Handled
    }

    // ------------------------------------------------------------------------
    // Leaving the list
    // ------------------------------------------------------------------------

    pub fn open_link(&mut self, fx: &mut Effects) -> Flow {
        if let Some(story) = self.selected_story_mut() {
            story.set_read();
            fx.push(Command::Goto(story.link.clone()));
        }
        self.share_selected();
        Flow::Redraw
    }

    pub fn open_reader(&mut self, fx: &mut Effects) -> Flow {
        if let Some(story) = self.selected_story_mut() {
            story.set_read();
            let reader = ReaderView::new(story.clone());
            fx.push(Command::Push(Box::new(View::Reader(reader))));
        }
        self.share_selected();
        Flow::Handled
    }

    pub fn help(&mut self, fx: &mut Effects) -> Flow {
        fx.push(Command::Help);
        Flow::Redraw
    }

    pub fn force_update(&mut self, fx: &mut Effects) -> Flow {
        tracing::info!("Forcing update");
        fx.push(Command::ForceUpdate);
        Flow::Redraw
    }

    pub fn quit(&mut self, fx: &mut Effects) -> Flow {
        fx.push(Command::Pop);
        Flow::Handled
    }

    // ------------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------------

    /// Refill every tag from fresh data, keeping the cursor on the same story
    /// when it survived the refresh, else on the top of its tag.
    pub fn reconcile(&mut self, stories: &[Story]) {
        let previous = self.current().and_then(|e| {
            let id = self.tags.get(e.tag)?.get(e.story)?.id.clone();
            Some((e.tag, id))
        });

        for tag in &mut self.tags {
            tag.clear();
            tag.extend(stories);
        }
        self.clear_selection();
        self.rebuild_map();

        let Some((tag, id)) = previous else {
            self.cursor = 0;
            self.select();
            return;
        };

        let found = self
            .tags
            .get(tag)
            .and_then(|t| t.search_position(&id))
            .and_then(|story| self.map.position(tag, story));
        match found {
            Some(index) => {
                self.cursor = index;
                self.select();
            }
            None => {
                tracing::debug!(story = %id, tag, "Selected story gone after refresh");
                self.top_of_tag(tag);
            }
        }
    }

    /// Copy read and marked flags from another view's stories, by identity.
    pub fn absorb(&mut self, tags: &[Tag]) {
        self.adopt_flags(tags.iter().flat_map(|t| t.iter()));
    }

    /// Every copy of a story, in any tag, takes the flags of `source`.
    fn adopt_flags<'a>(&mut self, source: impl IntoIterator<Item = &'a Story>) {
        let by_id: HashMap<&StoryId, &Story> = source.into_iter().map(|s| (&s.id, s)).collect();
        for story in self.tags.iter_mut().flat_map(|t| t.iter_mut()) {
            if let Some(other) = by_id.get(&story.id) {
                story.adopt_state(other);
            }
        }
    }
}
