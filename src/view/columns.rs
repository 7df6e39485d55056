//! Column geometry and the surfaces stories paint themselves onto.
//!
//! A list view is split into `count` equal-width column regions. Rows flow
//! continuously through them: view row `r` lands in column `r / height` at
//! line `r % height`, so the window shows `count * height` rows at once.
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Line,
    widgets::{Clear, Widget},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    height: u16,
    width: u16,
    count: u16,
}

impl Columns {
    /// `count` is clamped to at least one column.
    pub fn new(height: u16, width: u16, count: u16) -> Self {
        Self {
            height,
            width,
            count: count.max(1),
        }
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn count(&self) -> u16 {
        self.count
    }

    pub fn column_width(&self) -> u16 {
        self.width / self.count
    }

    /// Rows visible at once across all columns.
    pub fn visible_lines(&self) -> usize {
        self.count as usize * self.height as usize
    }

    /// Region of column `index`, relative to the view origin.
    pub fn region(&self, index: u16) -> Rect {
        let cw = self.column_width();
        Rect::new(index.saturating_mul(cw), 0, cw, self.height)
    }

    /// Map a view-relative row to `(column, line)`. Rows above the window or
    /// past its last line have no location.
    pub fn locate(&self, row: isize) -> Option<(u16, u16)> {
        if row < 0 || self.height == 0 {
            return None;
        }
        let row = row as usize;
        if row >= self.visible_lines() {
            return None;
        }
        let h = self.height as usize;
        Some(((row / h) as u16, (row % h) as u16))
    }
}

// ============================================================================
// Surfaces
// ============================================================================

/// Something a story can be printed onto.
pub trait Surface {
    /// Usable width of a single line, in terminal columns.
    fn width(&self) -> u16;

    /// Paint `line` at view-relative `row`. Rows outside the window are
    /// silently dropped.
    fn put(&mut self, row: isize, line: Line<'_>);
}

/// Counts rows without painting anything. Used while building the map.
#[derive(Debug, Clone, Copy)]
pub struct Measure {
    width: u16,
}

impl Measure {
    pub fn new(width: u16) -> Self {
        Self { width }
    }
}

impl Surface for Measure {
    fn width(&self) -> u16 {
        self.width
    }

    fn put(&mut self, _row: isize, _line: Line<'_>) {}
}

/// Buffer-backed column regions inside `area`.
pub struct Canvas<'a> {
    buf: &'a mut Buffer,
    area: Rect,
    columns: Columns,
}

impl<'a> Canvas<'a> {
    pub fn new(buf: &'a mut Buffer, area: Rect, columns: Columns) -> Self {
        Self { buf, area, columns }
    }

    fn region_in_area(&self, index: u16) -> Rect {
        let r = self.columns.region(index);
        Rect::new(
            self.area.x.saturating_add(r.x),
            self.area.y,
            r.width,
            r.height,
        )
        .intersection(self.area)
    }

    /// Blank whatever painting did not reach: a column the content never got
    /// to is cleared whole, the others from their last painted line down.
    pub fn clear_unpainted(&mut self, painted_rows: usize) {
        let h = self.columns.height() as usize;
        for index in 0..self.columns.count() {
            let region = self.region_in_area(index);
            let start = index as usize * h;
            if start > painted_rows {
                Clear.render(region, self.buf);
            } else {
                let used = (painted_rows - start).min(h) as u16;
                let rest = Rect {
                    y: region.y.saturating_add(used),
                    height: region.height.saturating_sub(used),
                    ..region
                };
                Clear.render(rest, self.buf);
            }
        }
    }
}

impl Surface for Canvas<'_> {
    fn width(&self) -> u16 {
        self.columns.column_width()
    }

    fn put(&mut self, row: isize, line: Line<'_>) {
        let Some((col, y)) = self.columns.locate(row) else {
            return;
        };
        let region = self.region_in_area(col);
        if y >= region.height {
            return;
        }
        self.buf
            .set_line(region.x, region.y + y, &line, region.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, y: u16, x: u16, width: u16) -> String {
        (x..x + width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect::<String>()
    }

    #[test]
    fn test_locate_flows_through_columns() {
        let cols = Columns::new(3, 20, 2);
        assert_eq!(cols.visible_lines(), 6);
        assert_eq!(cols.locate(0), Some((0, 0)));
        assert_eq!(cols.locate(2), Some((0, 2)));
        assert_eq!(cols.locate(3), Some((1, 0)));
        assert_eq!(cols.locate(5), Some((1, 2)));
        assert_eq!(cols.locate(6), None);
        assert_eq!(cols.locate(-1), None);
    }

    #[test]
    fn test_zero_columns_clamped_to_one() {
        let cols = Columns::new(10, 80, 0);
        assert_eq!(cols.count(), 1);
        assert_eq!(cols.column_width(), 80);
    }

    #[test]
    fn test_regions_split_width_evenly() {
        let cols = Columns::new(5, 30, 3);
        assert_eq!(cols.region(0), Rect::new(0, 0, 10, 5));
        assert_eq!(cols.region(2), Rect::new(20, 0, 10, 5));
    }

    #[test]
    fn test_canvas_put_lands_in_second_column() {
        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        let mut canvas = Canvas::new(&mut buf, area, Columns::new(2, 10, 2));
        canvas.put(2, Line::from("abc"));
        canvas.put(9, Line::from("dropped"));
        assert_eq!(row_text(&buf, 0, 5, 5), "abc  ");
        assert_eq!(row_text(&buf, 0, 0, 5), "     ");
    }

    #[test]
    fn test_clear_unpainted_keeps_painted_lines() {
        let area = Rect::new(0, 0, 4, 3);
        let mut buf = Buffer::empty(area);
        for y in 0..3 {
            buf.set_string(0, y, "xxxx", ratatui::style::Style::default());
        }
        let mut canvas = Canvas::new(&mut buf, area, Columns::new(3, 4, 1));
        canvas.clear_unpainted(1);
        assert_eq!(row_text(&buf, 0, 0, 4), "xxxx");
        assert_eq!(row_text(&buf, 1, 0, 4), "    ");
        assert_eq!(row_text(&buf, 2, 0, 4), "    ");
    }
}
