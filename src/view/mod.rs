//! Views and the stack that owns them.
//!
//! The top of the [`ViewStack`] gets every key. Views never touch the stack
//! directly: they push [`Command`]s into an [`Effects`] sink, and the stack
//! applies them once the view returns.
//!
//! # Module Structure
//!
//! - `controller` - the story list view
//! - `map` - the laid-out snapshot a list view navigates
//! - `columns` - column geometry and painting surfaces
//! - `render` - how stories print themselves
//! - `search` - the modal search prompt
//! - `reader` - single-story view
//! - `help` - keybinding table

pub mod columns;
pub mod controller;
pub mod help;
pub mod map;
pub mod reader;
pub mod render;
pub mod search;

pub use controller::{ViewController, ViewError};

use crate::keybindings::{Action, Context, KeySpec, KeybindingRegistry};
use crate::launcher::Launcher;
use crate::story::{Story, StoryId};
use crate::theme::ColorPalette;
use crossterm::event::{KeyCode, KeyModifiers};
use help::HelpView;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    widgets::{Paragraph, Widget},
};
use reader::ReaderView;
use regex::Regex;
use search::{SearchKind, SearchPrompt};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Rows below the list views reserved for the status bar.
pub const STATUS_ROWS: u16 = 1;

/// How long a status message stays up.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Outcome of a handled key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// State changed in place; repaint.
    Redraw,
    /// The view already arranged what happens next (pushed or popped a view).
    Handled,
}

/// A request from a view to its surroundings.
pub enum Command {
    Push(Box<View>),
    Pop,
    /// Deliver a committed search to the list view on top.
    Search { kind: SearchKind, pattern: Regex },
    Goto(String),
    Help,
    ForceUpdate,
    Status(String),
}

/// Commands collected while a view handles one key, applied in order.
#[derive(Default)]
pub struct Effects {
    commands: Vec<Command>,
}

impl Effects {
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

pub enum View {
    List(ViewController),
    Search(SearchPrompt),
    Reader(ReaderView),
    Help(HelpView),
}

impl View {
    pub fn context(&self) -> Context {
        match self {
            Self::List(_) => Context::List,
            Self::Search(_) => Context::Prompt,
            Self::Reader(_) => Context::Reader,
            Self::Help(_) => Context::Help,
        }
    }

    /// Overlays paint on top of the view beneath instead of replacing it.
    pub fn is_overlay(&self) -> bool {
        matches!(self, Self::Search(_))
    }

    /// `None` when the key means nothing to this view.
    fn handle(&mut self, key: KeySpec, action: Option<Action>, fx: &mut Effects) -> Option<Flow> {
        match self {
            Self::List(list) => action.map(|a| list.perform(a, fx)),
            Self::Search(prompt) => Some(prompt.handle(key, action, fx)),
            Self::Reader(reader) => action.and_then(|a| reader.perform(a, fx)),
            Self::Help(help) => action.and_then(|a| help.perform(a, fx)),
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, palette: &ColorPalette) {
        match self {
            Self::List(list) => list.render(area, buf),
            Self::Search(prompt) => prompt.render(area, buf, palette),
            Self::Reader(reader) => reader.render(area, buf, palette),
            Self::Help(help) => help.render(area, buf, palette),
        }
    }

    fn status_text(&self) -> String {
        match self {
            Self::List(list) => match list.current() {
                Some(entry) => {
                    let tag = list.tags().get(entry.tag).map(|t| t.name()).unwrap_or("");
                    format!(" {}  [{}/{}]", tag, list.cursor() + 1, list.map().len())
                }
                None => " No stories".to_string(),
            },
            Self::Search(_) => " Enter search, Esc cancel".to_string(),
            Self::Reader(_) => " [j/k]scroll [g]open [q]back".to_string(),
            Self::Help(_) => " [j/k]scroll [q]close".to_string(),
        }
    }
}

/// The active views, bottom to top, plus what they share.
pub struct ViewStack {
    views: Vec<View>,
    bindings: KeybindingRegistry,
    launcher: Box<dyn Launcher>,
    palette: ColorPalette,
    status: Option<(String, Instant)>,
    needs_redraw: bool,
    refresh_requested: bool,
}

impl ViewStack {
    pub fn new(
        root: ViewController,
        bindings: KeybindingRegistry,
        launcher: Box<dyn Launcher>,
        palette: ColorPalette,
    ) -> Self {
        Self {
            views: vec![View::List(root)],
            bindings,
            launcher,
            palette,
            status: None,
            needs_redraw: true,
            refresh_requested: false,
        }
    }

    /// True once the last view has quit.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn top(&self) -> Option<&View> {
        self.views.last()
    }

    pub fn top_list(&self) -> Option<&ViewController> {
        match self.views.last() {
            Some(View::List(list)) => Some(list),
            _ => None,
        }
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn mark_drawn(&mut self) {
        self.needs_redraw = false;
    }

    /// Route one key to the top view.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let key = KeySpec::new(code, modifiers);
        let Some(top) = self.views.last_mut() else {
            return;
        };
        let action = self.bindings.action_for(key, top.context());
        let mut fx = Effects::default();
        match top.handle(key, action, &mut fx) {
            Some(Flow::Redraw) => self.needs_redraw = true,
            Some(Flow::Handled) => {}
            None => tracing::trace!(?code, ?modifiers, "Unbound key"),
        }
        self.apply(fx);
    }

    fn apply(&mut self, fx: Effects) {
        let mut queue: VecDeque<Command> = fx.into_commands().into();
        while let Some(command) = queue.pop_front() {
            self.needs_redraw = true;
            match command {
                Command::Push(view) => self.views.push(*view),
                Command::Pop => self.pop(),
                Command::Search { kind, pattern } => {
                    if let Some(View::List(list)) = self.views.last_mut() {
                        let mut fx = Effects::default();
                        list.on_search(kind, &pattern, &mut fx);
                        queue.extend(fx.into_commands());
                    }
                }
                Command::Goto(link) => {
                    if let Err(e) = self.launcher.goto(&link) {
                        tracing::warn!(link = %link, error = %e, "Failed to open link");
                        self.set_status(format!("Cannot open link: {}", e));
                    }
                }
                Command::Help => {
                    let help = HelpView::new(&self.bindings);
                    self.views.push(View::Help(help));
                }
                Command::ForceUpdate => self.refresh_requested = true,
                Command::Status(message) => self.set_status(message),
            }
        }
    }

    /// Drop the top view. A list view hands its read/marked changes down to
    /// the list beneath.
    fn pop(&mut self) {
        let Some(view) = self.views.pop() else {
            return;
        };
        if let (View::List(child), Some(View::List(parent))) = (&view, self.views.last_mut()) {
            parent.absorb(child.tags());
        }
    }

    /// Refill every list view from fresh stories.
    pub fn reconcile(&mut self, stories: &[Story]) {
        for view in &mut self.views {
            if let View::List(list) = view {
                list.reconcile(stories);
            }
        }
        self.needs_redraw = true;
    }

    /// Read/marked state as the user currently sees it, by story. Views
    /// higher in the stack win.
    pub fn known_stories(&self) -> HashMap<StoryId, Story> {
        let mut known = HashMap::new();
        for view in &self.views {
            if let View::List(list) = view {
                for story in list.tags().iter().flat_map(|t| t.iter()) {
                    known.insert(story.id.clone(), story.clone());
                }
            }
        }
        known
    }

    /// New terminal size.
    pub fn resize(&mut self, width: u16, height: u16) {
        let list_height = height.saturating_sub(STATUS_ROWS);
        for view in &mut self.views {
            if let View::List(list) = view {
                list.resize(list_height, width);
            }
        }
        self.needs_redraw = true;
    }

    /// Whether a list asked for an immediate refresh since the last call.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
        self.needs_redraw = true;
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status.as_ref().map(|(m, _)| m.as_str())
    }

    /// Drop the status message once it has been up long enough. Returns
    /// whether it was dropped.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, since)) = &self.status {
            if since.elapsed() >= STATUS_TTL {
                self.status = None;
                self.needs_redraw = true;
                return true;
            }
        }
        false
    }

    /// Paint the top view (and the view beneath an overlay) and the status
    /// bar.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let [body, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_ROWS)]).areas(area);

        let base = self
            .views
            .iter()
            .rposition(|v| !v.is_overlay())
            .unwrap_or(0);
        for view in self.views.iter_mut().skip(base) {
            view.render(body, buf, &self.palette);
        }

        let text = match (&self.status, self.views.last()) {
            (Some((message, _)), _) => format!(" {}", message),
            (None, Some(view)) => view.status_text(),
            (None, None) => String::new(),
        };
        Paragraph::new(text)
            .style(self.palette.status_bar)
            .render(status, buf);
    }
}
