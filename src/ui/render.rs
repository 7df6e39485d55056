//! Frame rendering: size guard, then the view stack.

use crate::view::ViewStack;
use ratatui::{layout::Alignment, widgets::Paragraph, Frame};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 20;
pub(super) const MIN_HEIGHT: u16 = 4;

pub(super) fn render(f: &mut Frame, stack: &mut ViewStack) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = Paragraph::new(format!("Too small\n{}x{}", area.width, area.height))
            .alignment(Alignment::Center);
        f.render_widget(msg, area);
        return;
    }

    stack.render(area, f.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybindings::KeybindingRegistry;
    use crate::launcher::SystemLauncher;
    use crate::story::Story;
    use crate::tag::Tag;
    use crate::theme::ColorPalette;
    use crate::view::columns::Columns;
    use crate::view::render::StoryRenderer;
    use crate::view::ViewController;
    use ratatui::{backend::TestBackend, Terminal};
    use std::rc::Rc;

    fn stack() -> ViewStack {
        let mut tag = Tag::for_feed("lwn");
        tag.extend(&[Story::new("1", "lwn", "Kernel", "")]);
        let root = ViewController::new(
            Columns::new(5, 30, 1),
            vec![tag],
            Rc::new(StoryRenderer::new(ColorPalette::default())),
        )
        .unwrap();
        ViewStack::new(
            root,
            KeybindingRegistry::new(),
            Box::new(SystemLauncher::default()),
            ColorPalette::default(),
        )
    }

    fn row(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buf = terminal.backend().buffer();
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_renders_list_and_status() {
        let mut terminal = Terminal::new(TestBackend::new(30, 6)).unwrap();
        let mut stack = stack();
        terminal.draw(|f| render(f, &mut stack)).unwrap();
        assert_eq!(row(&terminal, 0), "[-] lwn (1)");
        assert_eq!(row(&terminal, 1), "   Kernel");
        assert_eq!(row(&terminal, 5), " lwn  [1/1]");
    }

    #[test]
    fn test_too_small_terminal() {
        let mut terminal = Terminal::new(TestBackend::new(10, 3)).unwrap();
        let mut stack = stack();
        terminal.draw(|f| render(f, &mut stack)).unwrap();
        assert_eq!(row(&terminal, 0).trim(), "Too small");
    }
}
