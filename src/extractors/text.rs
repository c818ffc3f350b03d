//! Plain text extraction from render events.
//!
//! [`SimpleTextExtractor`] writes strings in the order they are shown and
//! decides between them whether a space or a line break belongs in the
//! output. It does not reorder text, so columns and out-of-order content
//! streams come out as drawn.

use super::starts_new_line;
use crate::config::TextExtractionOptions;
use crate::content::{RenderListener, TextRenderInfo};
use crate::geometry::Point;

/// Baseline of the previous event, in user space.
#[derive(Debug, Clone, Copy)]
struct LastBaseline {
    start: Point,
    end: Point,
}

/// Listener that accumulates the text of a content stream.
///
/// Between consecutive events:
/// - if the new baseline start is more than
///   [`line_break_threshold`](TextExtractionOptions::line_break_threshold)
///   away from the line through the previous baseline, a line separator
///   is written;
/// - otherwise, if the gap between the previous baseline end and the new
///   start exceeds [`space_ratio`](TextExtractionOptions::space_ratio)
///   times the single-space width, one space is written, unless the
///   output already ends with a space or the new text starts with one.
///
/// # Examples
///
/// ```
/// use pdf_textflow::content::ContentProcessor;
/// use pdf_textflow::extractors::SimpleTextExtractor;
/// use pdf_textflow::fonts::{BaseEncoding, SimpleFont};
/// use pdf_textflow::resources::Resources;
/// use std::sync::Arc;
///
/// let font = SimpleFont::new("Courier", BaseEncoding::WinAnsi).with_default_width(600.0);
/// let resources = Arc::new(Resources::new().with_font("F1", Arc::new(font)));
///
/// let mut processor = ContentProcessor::new(SimpleTextExtractor::new());
/// processor
///     .process(b"BT /F1 10 Tf 0 700 Td (Hello) Tj 40 0 Td (World) Tj 0 -12 TD (Next) Tj ET", resources)
///     .unwrap();
/// assert_eq!(processor.listener().text(), "Hello World\nNext");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimpleTextExtractor {
    options: TextExtractionOptions,
    result: String,
    last: Option<LastBaseline>,
}

impl SimpleTextExtractor {
    /// Create an extractor with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with the given options.
    pub fn with_options(options: TextExtractionOptions) -> Self {
        Self {
            options,
            result: String::new(),
            last: None,
        }
    }

    /// Options in use.
    pub fn options(&self) -> &TextExtractionOptions {
        &self.options
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.result
    }

    /// Consume the extractor and return the accumulated text.
    pub fn into_text(self) -> String {
        self.result
    }
}

impl RenderListener for SimpleTextExtractor {
    fn reset(&mut self) {
        self.result.clear();
        self.last = None;
    }

    fn render_text(&mut self, info: TextRenderInfo) {
        if self.options.skip_invisible && !info.render_mode().is_visible() {
            return;
        }

        let start = info.baseline_start();
        let end = info.baseline_end();
        let text = info.text();

        if let Some(last) = self.last {
            if starts_new_line(&last.start, &last.end, &start, self.options.line_break_threshold) {
                self.result.push_str(&self.options.line_separator);
            } else if !text.is_empty()
                && !text.starts_with(' ')
                && !self.result.is_empty()
                && !self.result.ends_with(' ')
            {
                let gap = last.end.distance(&start);
                if gap > info.single_space_width() * self.options.space_ratio {
                    self.result.push(' ');
                }
            }
        }

        self.result.push_str(text);
        self.last = Some(LastBaseline { start, end });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentProcessor;
    use crate::fonts::{BaseEncoding, SimpleFont};
    use crate::resources::Resources;
    use std::sync::Arc;

    fn extract_with(options: TextExtractionOptions, content: &[u8]) -> String {
        let font = SimpleFont::new("Courier", BaseEncoding::WinAnsi).with_default_width(600.0);
        let resources = Arc::new(Resources::new().with_font("F1", Arc::new(font)));
        let mut processor = ContentProcessor::new(SimpleTextExtractor::with_options(options));
        processor.process(content, resources).unwrap();
        processor.into_listener().into_text()
    }

    fn extract(content: &[u8]) -> String {
        extract_with(TextExtractionOptions::default(), content)
    }

    #[test]
    fn test_adjacent_strings_join() {
        // Courier 10pt: 6 units per glyph, so (Hel) ends where (lo) starts
        assert_eq!(extract(b"BT /F1 10 Tf (Hel) Tj (lo) Tj ET"), "Hello");
    }

    #[test]
    fn test_gap_above_half_space_inserts_space() {
        // Space width is 6; a gap of 3.5 is above the 3.0 threshold
        assert_eq!(extract(b"BT /F1 10 Tf [(a) -350 (b)] TJ ET"), "a b");
    }

    #[test]
    fn test_gap_below_half_space_inserts_nothing() {
        assert_eq!(extract(b"BT /F1 10 Tf [(a) -200 (b)] TJ ET"), "ab");
    }

    #[test]
    fn test_existing_space_not_doubled() {
        assert_eq!(extract(b"BT /F1 10 Tf (a ) Tj 20 0 Td (b) Tj ET"), "a b");
        assert_eq!(extract(b"BT /F1 10 Tf (a) Tj 20 0 Td ( b) Tj ET"), "a b");
    }

    #[test]
    fn test_line_break() {
        assert_eq!(
            extract(b"BT /F1 10 Tf 12 TL (one) Tj T* (two) Tj ET"),
            "one\ntwo"
        );
    }

    #[test]
    fn test_small_vertical_shift_stays_on_line() {
        assert_eq!(extract(b"BT /F1 10 Tf (a) Tj 6 0.5 Td (b) Tj ET"), "ab");
    }

    #[test]
    fn test_custom_separator_and_threshold() {
        let options = TextExtractionOptions::new()
            .with_line_separator("\r\n")
            .with_line_break_threshold(5.0);
        assert_eq!(
            extract_with(options.clone(), b"BT /F1 10 Tf (a) Tj 0 -4 Td (b) Tj ET"),
            "a b"
        );
        assert_eq!(
            extract_with(options, b"BT /F1 10 Tf (a) Tj 0 -12 Td (b) Tj ET"),
            "a\r\nb"
        );
    }

    #[test]
    fn test_skip_invisible() {
        let content = b"BT /F1 10 Tf (seen) Tj 3 Tr (hidden) Tj ET";
        assert_eq!(extract(content), "seenhidden");
        let options = TextExtractionOptions::new().with_skip_invisible(true);
        assert_eq!(extract_with(options, content), "seen");
    }

    #[test]
    fn test_rotated_text_same_line() {
        // Baseline runs straight up; the second string continues it
        let content = b"BT /F1 10 Tf 0 1 -1 0 100 100 Tm (ab) Tj (cd) Tj ET";
        assert_eq!(extract(content), "abcd");
    }

    #[test]
    fn test_reset_clears_output() {
        let mut extractor = SimpleTextExtractor::new();
        extractor.result.push_str("stale");
        RenderListener::reset(&mut extractor);
        assert_eq!(extractor.text(), "");
    }
}
