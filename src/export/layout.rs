//! Page layout for the catalog export.
//!
//! A `PageCursor` walks down the page from the top margin. Each record puts
//! its image first, then its text one line at a time, then a gap. The cursor
//! flushes to a new page when an image would cross the bottom margin, when a
//! text line would start below the text floor, and when too little room is
//! left to begin the next record.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.

use super::PageGeometry;

/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.52;

/// What the layout needs to know about one record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBlock {
    /// Pixel size of the decoded image.
    pub image_width: u32,
    pub image_height: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Draw image `index` (into the block list) with its bottom-left corner at
    /// `(x, y)`.
    Image {
        index: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// Draw one line of text with its baseline at `y`.
    Text { x: f32, y: f32, text: String },
}

/// Draw operations for one page, in drawing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub ops: Vec<DrawOp>,
}

impl PageLayout {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

struct PageCursor<'g> {
    geometry: &'g PageGeometry,
    done: Vec<PageLayout>,
    page: PageLayout,
    y: f32,
}

impl<'g> PageCursor<'g> {
    fn new(geometry: &'g PageGeometry) -> Self {
        Self {
            geometry,
            done: Vec::new(),
            page: PageLayout::default(),
            y: geometry.top(),
        }
    }

    fn new_page(&mut self) {
        self.done.push(std::mem::take(&mut self.page));
        self.y = self.geometry.top();
    }

    fn place_image(&mut self, index: usize, block: &RecordBlock) {
        let (width, height) = scaled_image_size(block, self.geometry);
        if self.y - height < self.geometry.margin && !self.page.is_empty() {
            self.new_page();
        }
        self.page.ops.push(DrawOp::Image {
            index,
            x: self.geometry.margin,
            y: self.y - height,
            width,
            height,
        });
        self.y -= height + self.geometry.image_gap;
    }

    fn place_text(&mut self, text: &str) {
        let max_chars = chars_per_line(self.geometry);
        for line in text.lines().flat_map(|l| wrap_line(l, max_chars)) {
            if self.y < self.geometry.text_floor {
                self.new_page();
            }
            if !line.is_empty() {
                self.page.ops.push(DrawOp::Text {
                    x: self.geometry.margin,
                    y: self.y,
                    text: line,
                });
            }
            self.y -= self.geometry.line_height;
        }
    }

    fn end_record(&mut self) {
        self.y -= self.geometry.record_gap;
        if self.y < self.geometry.min_record_space {
            self.new_page();
        }
    }

    fn finish(mut self) -> Vec<PageLayout> {
        if !self.page.is_empty() || self.done.is_empty() {
            self.done.push(self.page);
        }
        self.done
    }
}

/// Lay out every block, in order, into pages.
///
/// Always returns at least one page; with no blocks that page is blank.
pub fn layout_document(blocks: &[RecordBlock], geometry: &PageGeometry) -> Vec<PageLayout> {
    let mut cursor = PageCursor::new(geometry);
    for (index, block) in blocks.iter().enumerate() {
        cursor.place_image(index, block);
        cursor.place_text(&block.text);
        cursor.end_record();
    }
    cursor.finish()
}

/// Image size on the page: full printable width, aspect ratio kept, height
/// capped at `max_image_height` (width shrinks to match when capped).
pub fn scaled_image_size(block: &RecordBlock, geometry: &PageGeometry) -> (f32, f32) {
    let aspect = block.image_width.max(1) as f32 / block.image_height.max(1) as f32;
    let width = geometry.printable_width();
    let height = width / aspect;
    if height > geometry.max_image_height {
        (geometry.max_image_height * aspect, geometry.max_image_height)
    } else {
        (width, height)
    }
}

fn chars_per_line(geometry: &PageGeometry) -> usize {
    ((geometry.printable_width() / (geometry.font_size * AVG_GLYPH_EM)) as usize).max(1)
}

/// Break one line at word boundaries so no piece exceeds `max_chars`.
///
/// A line that already fits is returned untouched, indentation included.
/// Words longer than a line are split hard. An empty line stays one empty
/// line.
pub fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    if line.chars().count() <= max_chars {
        return vec![line.to_string()];
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut len = 0usize;

    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if len > 0 {
                out.push(std::mem::take(&mut current));
                len = 0;
            }
            let rest = word.split_off(max_chars);
            out.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        let needed = if len == 0 { word.len() } else { len + 1 + word.len() };
        if needed > max_chars {
            out.push(std::mem::take(&mut current));
            len = 0;
        }
        if len > 0 {
            current.push(' ');
            len += 1;
        }
        current.extend(word.iter());
        len += word.len();
    }

    if len > 0 || out.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(w: u32, h: u32, text: &str) -> RecordBlock {
        RecordBlock {
            image_width: w,
            image_height: h,
            text: text.to_string(),
        }
    }

    fn images(page: &PageLayout) -> Vec<(f32, f32, f32, f32)> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image {
                    x, y, width, height, ..
                } => Some((*x, *y, *width, *height)),
                _ => None,
            })
            .collect()
    }

    fn texts(page: &PageLayout) -> Vec<(f32, String)> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { y, text, .. } => Some((*y, text.clone())),
                _ => None,
            })
            .collect()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn no_records_one_blank_page() {
        let pages = layout_document(&[], &PageGeometry::default());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_empty());
    }

    #[test]
    fn wide_image_uses_printable_width() {
        let g = PageGeometry::default();
        let (w, h) = scaled_image_size(&block(1000, 500, ""), &g);
        assert!(close(w, 515.28));
        assert!(close(h, 257.64));
    }

    #[test]
    fn tall_image_capped_at_300() {
        let g = PageGeometry::default();
        let (w, h) = scaled_image_size(&block(500, 1000, ""), &g);
        assert!(close(h, 300.0));
        assert!(close(w, 150.0));
    }

    #[test]
    fn image_then_text_positions() {
        let g = PageGeometry::default();
        let pages = layout_document(&[block(500, 1000, "Line one\nLine two")], &g);
        assert_eq!(pages.len(), 1);

        let imgs = images(&pages[0]);
        assert_eq!(imgs.len(), 1);
        let (x, y, _, h) = imgs[0];
        assert!(close(x, 40.0));
        assert!(close(y, 801.89 - 300.0));
        assert!(close(h, 300.0));

        let lines = texts(&pages[0]);
        assert_eq!(lines.len(), 2);
        assert!(close(lines[0].0, 801.89 - 310.0));
        assert!(close(lines[1].0, 801.89 - 322.0));
        assert_eq!(lines[1].1, "Line two");
    }

    #[test]
    fn long_text_continues_on_next_page() {
        let g = PageGeometry::default();
        let text = (0..80).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let pages = layout_document(&[block(500, 1000, &text)], &g);

        assert_eq!(pages.len(), 2);
        let first = texts(&pages[0]);
        assert!(first.iter().all(|(y, _)| *y >= g.text_floor));
        let second = texts(&pages[1]);
        assert!(close(second[0].0, g.top()));
        assert_eq!(first.len() + second.len(), 80);
        assert_eq!(second.last().unwrap().1, "line 79");
        assert!(images(&pages[1]).is_empty());
    }

    #[test]
    fn records_share_a_page_while_room_remains() {
        let g = PageGeometry::default();
        let pages = layout_document(
            &[block(500, 1000, "a\nb\nc"), block(500, 1000, "d"), block(500, 1000, "e")],
            &g,
        );
        // First record leaves the cursor at 415.89, so the second image fits
        // above the bottom margin. After the second record less than 200pt is
        // left and the third starts a new page.
        assert_eq!(pages.len(), 2);
        let first = images(&pages[0]);
        assert_eq!(first.len(), 2);
        assert!(close(first[1].1, 115.89));
        assert!(close(images(&pages[1])[0].1, g.top() - 300.0));
    }

    #[test]
    fn image_crossing_bottom_margin_starts_new_page() {
        let g = PageGeometry::default();
        let ten_lines = (0..10).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let pages = layout_document(&[block(500, 1000, &ten_lines), block(500, 1000, "x")], &g);

        assert_eq!(pages.len(), 2);
        assert_eq!(images(&pages[0]).len(), 1);
        assert!(close(images(&pages[1])[0].1, g.top() - 300.0));
        assert_eq!(texts(&pages[1])[0].1, "x");
    }

    #[test]
    fn blank_lines_advance_without_ops() {
        let g = PageGeometry::default();
        let pages = layout_document(&[block(500, 1000, "a\n\nb")], &g);
        let lines = texts(&pages[0]);
        assert_eq!(lines.len(), 2);
        assert!(close(lines[0].0 - lines[1].0, 24.0));
    }

    #[test]
    fn wrap_at_word_boundaries() {
        assert_eq!(wrap_line("aaa bbb ccc", 7), vec!["aaa bbb", "ccc"]);
        assert_eq!(wrap_line("short", 10), vec!["short"]);
        assert_eq!(wrap_line("", 10), vec![""]);
    }

    #[test]
    fn fitting_lines_keep_their_spacing() {
        assert_eq!(wrap_line("  - nested spec", 80), vec!["  - nested spec"]);
        assert_eq!(wrap_line("Size:    M", 80), vec!["Size:    M"]);
    }

    #[test]
    fn wrap_splits_overlong_words() {
        assert_eq!(wrap_line("abcdefghij xy", 4), vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn long_line_wraps_within_printable_width() {
        let g = PageGeometry::default();
        let max = chars_per_line(&g);
        let text = "word ".repeat(100);
        let pages = layout_document(&[block(10, 10, &text)], &g);
        let lines = texts(&pages[0]);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|(_, t)| t.chars().count() <= max));
    }
}
