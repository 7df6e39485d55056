use super::{Command, Effects, Flow};
use crate::keybindings::Action;
use crate::story::Story;
use crate::theme::ColorPalette;
use crate::util::strip_control_chars;
use chrono::{DateTime, Utc};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Format a unix timestamp relative to `now`: "5m", "3h", "2d", then a date.
pub fn format_relative_time(timestamp: Option<i64>, now: i64) -> String {
    let Some(ts) = timestamp else {
        return String::new();
    };

    let diff = now - ts;
    if diff < 0 {
        return "now".to_string();
    }
    if diff < 3600 {
        return format!("{}m", diff / 60);
    }
    if diff < 86400 {
        return format!("{}h", diff / 3600);
    }
    if diff < 604800 {
        return format!("{}d", diff / 86400);
    }

    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%b %d").to_string())
        .unwrap_or_default()
}

/// Full-screen view of one story's text.
pub struct ReaderView {
    story: Story,
    scroll: u16,
    /// Body height seen at the last render; one page.
    page: u16,
}

impl ReaderView {
    pub fn new(story: Story) -> Self {
        Self {
            story,
            scroll: 0,
            page: 1,
        }
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn perform(&mut self, action: Action, fx: &mut Effects) -> Option<Flow> {
        match action {
            Action::ScrollDown => self.scroll = self.scroll.saturating_add(1),
            Action::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            Action::PageDown => self.scroll = self.scroll.saturating_add(self.page),
            Action::PageUp => self.scroll = self.scroll.saturating_sub(self.page),
            Action::Goto => fx.push(Command::Goto(self.story.link.clone())),
            Action::Quit => {
                fx.push(Command::Pop);
                return Some(Flow::Handled);
            }
            _ => return None,
        }
        Some(Flow::Redraw)
    }

    fn lines(&self, palette: &ColorPalette) -> Vec<Line<'static>> {
        let when = format_relative_time(self.story.published, Utc::now().timestamp());
        let meta = if when.is_empty() {
            strip_control_chars(&self.story.feed).into_owned()
        } else {
            format!("{} • {}", strip_control_chars(&self.story.feed), when)
        };

        let mut lines = vec![
            Line::from(Span::styled(
                strip_control_chars(&self.story.title).into_owned(),
                palette.reader_heading,
            )),
            Line::from(Span::styled(meta, palette.reader_metadata)),
            Line::from(Span::styled(
                strip_control_chars(&self.story.link).into_owned(),
                palette.reader_metadata,
            )),
            Line::from(""),
        ];

        match self.story.description.as_deref() {
            Some(body) if !body.trim().is_empty() => {
                let body = strip_control_chars(body);
                lines.extend(
                    body.lines()
                        .map(|l| Line::from(Span::styled(l.to_string(), palette.reader_body))),
                );
            }
            _ => lines.push(Line::from(Span::styled(
                "No description. Press g to open the link.",
                palette.reader_metadata,
            ))),
        }
        lines
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, palette: &ColorPalette) {
        if area.width < 3 || area.height < 3 {
            return;
        }
        self.page = area.height.saturating_sub(2).max(1);

        let lines = self.lines(palette);
        let last = u16::try_from(lines.len().saturating_sub(1)).unwrap_or(u16::MAX);
        self.scroll = self.scroll.min(last);

        Clear.render(area, buf);
        Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(palette.panel_border)
                    .title(" Story "),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}
