//! Modal search prompt.
//!
//! Takes over the keyboard until Enter or Esc, then pops itself and hands
//! the compiled pattern to the list view beneath it.
use super::{Command, Effects, Flow};
use crate::keybindings::{Action, KeySpec};
use crate::theme::ColorPalette;
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Clear, Widget},
};
use regex::{Regex, RegexBuilder};

/// Input starting with this is a raw regular expression.
const REGEX_PREFIX: &str = "rgx:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// Open a new view of the matching stories.
    Collect,
    /// Mark matches and unmark everything else in place.
    Inline,
}

impl SearchKind {
    fn label(self) -> &'static str {
        match self {
            Self::Collect => " Collect Search: ",
            Self::Inline => " Inline Search: ",
        }
    }
}

/// Turn prompt input into a title pattern.
///
/// Plain text matches case-insensitively anywhere in the title. `rgx:` input
/// is a regular expression anchored at the start of the title. Blank input
/// yields `None`.
///
/// ```
/// use canto::view::search::compile_pattern;
///
/// let re = compile_pattern("rust").unwrap().unwrap();
/// assert!(re.is_match("Learning Rust"));
///
/// let re = compile_pattern("rgx:[0-9]+").unwrap().unwrap();
/// assert!(re.is_match("2024 recap"));
/// assert!(!re.is_match("recap 2024"));
///
/// assert!(compile_pattern("   ").unwrap().is_none());
/// ```
pub fn compile_pattern(input: &str) -> Result<Option<Regex>, regex::Error> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    let re = match input.strip_prefix(REGEX_PREFIX) {
        Some(raw) => {
            // A pattern that parses alone cannot close the anchoring group.
            Regex::new(raw)?;
            Regex::new(&format!("^(?:{raw})"))?
        }
        None => RegexBuilder::new(&regex::escape(input))
            .case_insensitive(true)
            .build()?,
    };
    Ok(Some(re))
}

pub struct SearchPrompt {
    kind: SearchKind,
    input: String,
}

impl SearchPrompt {
    pub fn new(kind: SearchKind) -> Self {
        Self {
            kind,
            input: String::new(),
        }
    }

    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn handle(&mut self, key: KeySpec, action: Option<Action>, fx: &mut Effects) -> Flow {
        match action {
            Some(Action::Commit) => self.commit(fx),
            Some(Action::Cancel) => fx.push(Command::Pop),
            _ => self.edit(key),
        }
        Flow::Redraw
    }

    fn edit(&mut self, key: KeySpec) {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.input.chars().count() < MAX_SEARCH_QUERY_LENGTH {
                    self.input.push(c);
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            _ => {}
        }
    }

    fn commit(&mut self, fx: &mut Effects) {
        fx.push(Command::Pop);
        match compile_pattern(&self.input) {
            Ok(Some(pattern)) => fx.push(Command::Search {
                kind: self.kind,
                pattern,
            }),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(input = %self.input, error = %e, "Invalid search pattern");
                fx.push(Command::Status("Invalid search pattern".to_string()));
            }
        }
    }

    /// One line at the bottom of `area`, over whatever is beneath.
    pub fn render(&self, area: Rect, buf: &mut Buffer, palette: &ColorPalette) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let line_area = Rect {
            y: area.bottom() - 1,
            height: 1,
            ..area
        };
        Clear.render(line_area, buf);
        let line = Line::from(vec![
            Span::styled(self.kind.label(), palette.prompt),
            Span::raw(self.input.as_str()),
            Span::styled("_", palette.prompt),
        ]);
        buf.set_style(line_area, palette.prompt);
        buf.set_line(line_area.x, line_area.y, &line, line_area.width);
    }
}
