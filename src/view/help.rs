//! Help screen: a scrollable table of the active keybindings, user overrides
//! included, grouped by context.
use super::{Command, Effects, Flow};
use crate::keybindings::{Action, Context, KeybindingRegistry};
use crate::theme::ColorPalette;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Row, Table, Widget},
};

/// Context display order and labels.
const CONTEXT_ORDER: [(Context, &str); 4] = [
    (Context::List, "Story List"),
    (Context::Reader, "Reader"),
    (Context::Prompt, "Search Prompt"),
    (Context::Help, "Help"),
];

enum HelpRow {
    Section(&'static str),
    Binding(String, &'static str),
    Blank,
}

pub struct HelpView {
    rows: Vec<HelpRow>,
    scroll: usize,
}

impl HelpView {
    pub fn new(bindings: &KeybindingRegistry) -> Self {
        let mut rows = Vec::new();
        for (ctx, label) in CONTEXT_ORDER {
            let ctx_bindings = bindings.bindings_for(ctx);
            if ctx_bindings.is_empty() {
                continue;
            }
            if !rows.is_empty() {
                rows.push(HelpRow::Blank);
            }
            rows.push(HelpRow::Section(label));
            rows.extend(
                ctx_bindings
                    .into_iter()
                    .map(|(key, description)| HelpRow::Binding(key, description)),
            );
        }
        Self { rows, scroll: 0 }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn perform(&mut self, action: Action, fx: &mut Effects) -> Option<Flow> {
        match action {
            Action::ScrollDown => {
                if self.scroll + 1 < self.rows.len() {
                    self.scroll += 1;
                }
            }
            Action::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            Action::Quit => {
                fx.push(Command::Pop);
                return Some(Flow::Handled);
            }
            _ => return None,
        }
        Some(Flow::Redraw)
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, palette: &ColorPalette) {
        if area.width < 20 || area.height < 5 {
            return;
        }

        // -2 border, -2 header and its margin
        let visible = area.height.saturating_sub(4) as usize;
        let max_scroll = self.rows.len().saturating_sub(visible);
        self.scroll = self.scroll.min(max_scroll);

        let rows: Vec<Row> = self
            .rows
            .iter()
            .skip(self.scroll)
            .take(visible)
            .map(|row| match row {
                HelpRow::Section(label) => Row::new(vec![
                    Line::from(Span::styled(
                        format!("-- {} --", label),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                ])
                .style(palette.reader_heading),
                HelpRow::Binding(key, description) => {
                    Row::new(vec![format!("  {}", key), description.to_string()])
                }
                HelpRow::Blank => Row::new(vec![String::new(), String::new()]),
            })
            .collect();

        let title = if max_scroll > 0 {
            format!(" Help ({}/{}) ", self.scroll + 1, max_scroll + 1)
        } else {
            " Help (q to close) ".to_string()
        };

        Clear.render(area, buf);
        Table::new(rows, [Constraint::Length(16), Constraint::Min(20)])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(palette.panel_border)
                    .title(title),
            )
            .header(
                Row::new(vec!["Key", "Action"])
                    .style(
                        Style::default()
                            .add_modifier(Modifier::BOLD)
                            .add_modifier(Modifier::UNDERLINED),
                    )
                    .bottom_margin(1),
            )
            .style(palette.reader_body)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_for_every_context() {
        let help = HelpView::new(&KeybindingRegistry::new());
        let sections = help
            .rows
            .iter()
            .filter(|r| matches!(r, HelpRow::Section(_)))
            .count();
        assert_eq!(sections, 4);
    }

    #[test]
    fn test_scroll_bounds() {
        let mut help = HelpView::new(&KeybindingRegistry::new());
        let mut fx = Effects::default();
        help.perform(Action::ScrollUp, &mut fx);
        assert_eq!(help.scroll(), 0);
        for _ in 0..500 {
            help.perform(Action::ScrollDown, &mut fx);
        }
        assert_eq!(help.scroll(), help.row_count() - 1);
    }

    #[test]
    fn test_render_clamps_scroll_to_page() {
        let mut help = HelpView::new(&KeybindingRegistry::new());
        let mut fx = Effects::default();
        for _ in 0..500 {
            help.perform(Action::ScrollDown, &mut fx);
        }
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        help.render(area, &mut buf, &ColorPalette::default());
        assert_eq!(help.scroll(), help.row_count() - 16);
    }

    #[test]
    fn test_quit_pops() {
        let mut help = HelpView::new(&KeybindingRegistry::new());
        let mut fx = Effects::default();
        assert_eq!(help.perform(Action::Quit, &mut fx), Some(Flow::Handled));
        assert!(matches!(fx.into_commands()[0], Command::Pop));
    }
}
