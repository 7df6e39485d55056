use super::columns::Surface;
use crate::story::Story;
use crate::tag::Tag;
use crate::theme::ColorPalette;
use crate::util::{display_width, strip_control_chars, truncate_to_width};
use ratatui::text::{Line, Span};

/// How a story prints itself into a list view.
///
/// The same call measures and paints: the map is built by printing every
/// story onto a [`Measure`](super::columns::Measure) surface, and a render
/// pass prints the visible ones onto a [`Canvas`](super::columns::Canvas).
/// Implementations must return the same row count for both.
pub trait ItemRenderer {
    /// Print story `index` of `tag` starting at view-relative `row` and
    /// return how many rows it occupies. Zero hides the story.
    fn print_item(&self, tag: &Tag, index: usize, row: isize, surface: &mut dyn Surface) -> usize;
}

/// Default list renderer: the head story of each tag carries a header line
/// with the tag's name and unread count, then every story gets one title line.
#[derive(Debug, Clone)]
pub struct StoryRenderer {
    palette: ColorPalette,
}

const MARK_PREFIX: &str = " * ";
const PLAIN_PREFIX: &str = "   ";

impl StoryRenderer {
    pub fn new(palette: ColorPalette) -> Self {
        Self { palette }
    }

    fn header_line(&self, tag: &Tag, width: usize) -> Line<'static> {
        let marker = if tag.collapsed { "[+]" } else { "[-]" };
        let text = format!(
            "{} {} ({})",
            marker,
            strip_control_chars(tag.name()),
            tag.unread_count()
        );
        Line::from(Span::styled(
            truncate_to_width(&text, width).into_owned(),
            self.palette.tag_header,
        ))
    }

    fn story_line(&self, story: &Story, width: usize) -> Line<'static> {
        let prefix = if story.marked() {
            MARK_PREFIX
        } else {
            PLAIN_PREFIX
        };
        let style = if story.is_selected() {
            self.palette.story_selected
        } else if !story.is_read() {
            self.palette.story_unread
        } else {
            self.palette.story_read
        };
        let title = strip_control_chars(&story.title);
        let room = width.saturating_sub(display_width(prefix));
        Line::from(vec![
            Span::styled(prefix, self.palette.story_marked),
            Span::styled(truncate_to_width(&title, room).into_owned(), style),
        ])
    }
}

impl ItemRenderer for StoryRenderer {
    fn print_item(&self, tag: &Tag, index: usize, row: isize, surface: &mut dyn Surface) -> usize {
        let Some(story) = tag.get(index) else {
            return 0;
        };
        let width = surface.width() as usize;
        let mut used = 0;
        if index == 0 {
            surface.put(row, self.header_line(tag, width));
            used += 1;
        }
        surface.put(row + used as isize, self.story_line(story, width));
        used + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeVariant;
    use crate::view::columns::Measure;

    /// Records what was painted.
    struct Recorder(Vec<(isize, String)>);

    impl Surface for Recorder {
        fn width(&self) -> u16 {
            20
        }

        fn put(&mut self, row: isize, line: Line<'_>) {
            let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
            self.0.push((row, text));
        }
    }

    fn sample_tag() -> Tag {
        let mut tag = Tag::for_feed("lwn");
        let mut marked = Story::new("2", "lwn", "Second", "");
        marked.mark();
        tag.extend(&[Story::new("1", "lwn", "First", ""), marked]);
        tag
    }

    #[test]
    fn test_head_story_prints_header() {
        let renderer = StoryRenderer::new(ThemeVariant::Dark.palette());
        let tag = sample_tag();
        let mut rec = Recorder(Vec::new());
        assert_eq!(renderer.print_item(&tag, 0, 4, &mut rec), 2);
        assert_eq!(rec.0[0], (4, "[-] lwn (2)".to_string()));
        assert_eq!(rec.0[1], (5, "   First".to_string()));
    }

    #[test]
    fn test_marked_story_has_star() {
        let renderer = StoryRenderer::new(ThemeVariant::Dark.palette());
        let mut rec = Recorder(Vec::new());
        assert_eq!(renderer.print_item(&sample_tag(), 1, 0, &mut rec), 1);
        assert_eq!(rec.0[0].1, " * Second");
    }

    #[test]
    fn test_head_rows_unaffected_by_collapse() {
        let renderer = StoryRenderer::new(ThemeVariant::Dark.palette());
        let mut tag = sample_tag();
        let expanded = renderer.print_item(&tag, 0, 0, &mut Measure::new(20));
        tag.collapsed = true;
        let collapsed = renderer.print_item(&tag, 0, 0, &mut Measure::new(20));
        assert_eq!(expanded, collapsed);
    }

    #[test]
    fn test_missing_story_is_hidden() {
        let renderer = StoryRenderer::new(ThemeVariant::Dark.palette());
        assert_eq!(
            renderer.print_item(&sample_tag(), 9, 0, &mut Measure::new(20)),
            0
        );
    }
}
