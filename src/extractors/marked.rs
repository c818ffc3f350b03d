//! Word assembly grouped by marked content.
//!
//! Tagged PDFs bracket their real content in `BDC`/`EMC` sequences that
//! carry a marked-content ID, and bracket running heads, page numbers and
//! other decoration as `/Artifact`. [`MarkedContentExtractor`] drops the
//! artifacts, splits shown strings into words at space glyphs and keeps
//! the structure tag and MCID of every word so that text can be grouped
//! back into the sections the producer marked.

use super::starts_new_line;
use crate::config::TextExtractionOptions;
use crate::content::{RenderListener, TextRenderInfo};
use crate::fonts::text_space_width;
use crate::geometry::Point;
use serde::Serialize;

/// One assembled word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Word {
    /// Word text, without surrounding spaces
    pub text: String,
    /// Start of the word's baseline in user space
    pub start: Point,
    /// End of the word's baseline in user space
    pub end: Point,
    /// Innermost marked-content tag
    pub tag: Option<String>,
    /// Nearest marked-content ID
    pub mcid: Option<i64>,
    /// Whether a line break separates this word from the previous one
    pub line_break_before: bool,
}

impl Word {
    fn same_marking(&self, tag: Option<&str>, mcid: Option<i64>) -> bool {
        self.tag.as_deref() == tag && self.mcid == mcid
    }
}

/// Consecutive words sharing a tag and MCID.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkedSection {
    /// Marked-content tag, `None` for unmarked text
    pub tag: Option<String>,
    /// Marked-content ID
    pub mcid: Option<i64>,
    /// Words of the section joined by spaces and line separators
    pub text: String,
}

/// Piece of one shown string between space glyphs, in text space.
struct PartialWord {
    text: String,
    start_x: f32,
    end_x: f32,
    break_before: bool,
}

/// Listener that assembles words and groups them by marked content.
///
/// A word continues across shown strings while the gap between them stays
/// within [`space_ratio`](TextExtractionOptions::space_ratio) of a space
/// and the marked content is unchanged. Line breaks follow the same
/// baseline test as [`SimpleTextExtractor`](super::SimpleTextExtractor).
///
/// # Examples
///
/// ```
/// use pdf_textflow::content::ContentProcessor;
/// use pdf_textflow::extractors::MarkedContentExtractor;
/// use pdf_textflow::fonts::{BaseEncoding, SimpleFont};
/// use pdf_textflow::resources::Resources;
/// use std::sync::Arc;
///
/// let font = SimpleFont::new("Courier", BaseEncoding::WinAnsi).with_default_width(600.0);
/// let resources = Arc::new(Resources::new().with_font("F1", Arc::new(font)));
///
/// let content = b"/Artifact BMC BT /F1 10 Tf 0 800 Td (Page 3) Tj ET EMC \
///                 /H1 <</MCID 0>> BDC BT /F1 10 Tf 0 700 Td (Intro) Tj ET EMC";
/// let mut processor = ContentProcessor::new(MarkedContentExtractor::new().with_markup(true));
/// processor.process(content, resources).unwrap();
/// assert_eq!(processor.listener().text(), "<H1>Intro</H1>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarkedContentExtractor {
    options: TextExtractionOptions,
    markup: bool,
    words: Vec<Word>,
    /// The previous shown string ended in a space
    pending_break: bool,
}

impl MarkedContentExtractor {
    /// Create an extractor with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with the given options.
    pub fn with_options(options: TextExtractionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Wrap tagged sections in `<Tag>`…`</Tag>` in [`text`](Self::text).
    pub fn with_markup(mut self, markup: bool) -> Self {
        self.markup = markup;
        self
    }

    /// Options in use.
    pub fn options(&self) -> &TextExtractionOptions {
        &self.options
    }

    /// Words assembled so far, in content order.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Words grouped into runs of equal tag and MCID.
    pub fn sections(&self) -> Vec<MarkedSection> {
        let mut sections: Vec<MarkedSection> = Vec::new();
        for word in &self.words {
            match sections.last_mut() {
                Some(section) if word.same_marking(section.tag.as_deref(), section.mcid) => {
                    section.text.push_str(self.separator(word));
                    section.text.push_str(&word.text);
                },
                _ => sections.push(MarkedSection {
                    tag: word.tag.clone(),
                    mcid: word.mcid,
                    text: word.text.clone(),
                }),
            }
        }
        sections
    }

    /// All words as one string, with section tags when markup is enabled.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut previous: Option<&Word> = None;

        for word in &self.words {
            let same_section =
                previous.is_some_and(|p| p.same_marking(word.tag.as_deref(), word.mcid));
            if let Some(prev) = previous {
                if !same_section {
                    self.close_tag(&mut out, prev);
                }
                out.push_str(self.separator(word));
            }
            if !same_section {
                self.open_tag(&mut out, word);
            }
            out.push_str(&word.text);
            previous = Some(word);
        }
        if let Some(last) = previous {
            self.close_tag(&mut out, last);
        }

        out
    }

    fn separator(&self, word: &Word) -> &str {
        if word.line_break_before {
            &self.options.line_separator
        } else {
            " "
        }
    }

    fn open_tag(&self, out: &mut String, word: &Word) {
        if let (true, Some(tag)) = (self.markup, &word.tag) {
            out.push('<');
            out.push_str(tag);
            out.push('>');
        }
    }

    fn close_tag(&self, out: &mut String, word: &Word) {
        if let (true, Some(tag)) = (self.markup, &word.tag) {
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }

    /// Split a shown string at space glyphs.
    ///
    /// Returns the pieces and whether the string ended in a space; `None`
    /// for a string without glyphs.
    fn partial_words(info: &TextRenderInfo, break_first: bool) -> (Vec<PartialWord>, Option<bool>) {
        let state = info.graphics_state();
        let mut pieces = Vec::new();
        let mut text = String::new();
        let mut x = 0.0;
        let mut start_x = 0.0;
        let mut break_before = break_first;
        let mut trailing_space = None;

        for glyph in info.glyphs() {
            let advance = text_space_width(std::slice::from_ref(glyph), state);
            let is_space = !glyph.unicode.is_empty() && glyph.unicode.chars().all(char::is_whitespace);

            if is_space {
                if !text.is_empty() {
                    pieces.push(PartialWord {
                        text: std::mem::take(&mut text),
                        start_x,
                        end_x: x,
                        break_before,
                    });
                }
                break_before = true;
            } else if text.is_empty() {
                start_x = x;
            }
            if !is_space {
                text.push_str(&glyph.unicode);
            }
            trailing_space = Some(is_space);
            x += advance;
        }

        if !text.is_empty() {
            pieces.push(PartialWord {
                text,
                start_x,
                end_x: x,
                break_before,
            });
        }
        (pieces, trailing_space)
    }
}

impl RenderListener for MarkedContentExtractor {
    fn reset(&mut self) {
        self.words.clear();
        self.pending_break = false;
    }

    fn render_text(&mut self, info: TextRenderInfo) {
        if info.is_artifact() {
            return;
        }
        if self.options.skip_invisible && !info.render_mode().is_visible() {
            return;
        }

        let (pieces, trailing_space) = Self::partial_words(&info, self.pending_break);
        if let Some(trailing_space) = trailing_space {
            self.pending_break = trailing_space;
        }

        let to_user = info.text_to_user_matrix();
        let join_gap = info.single_space_width() * self.options.space_ratio;
        let tag = info.marked_tag();
        let mcid = info.mcid();

        for piece in pieces {
            let start = to_user.transform_point(piece.start_x, 0.0);
            let end = to_user.transform_point(piece.end_x, 0.0);

            let line_break_before = match self.words.last_mut() {
                None => false,
                Some(last) => {
                    let new_line = starts_new_line(
                        &last.start,
                        &last.end,
                        &start,
                        self.options.line_break_threshold,
                    );
                    if !new_line
                        && !piece.break_before
                        && last.same_marking(tag, mcid)
                        && last.end.distance(&start) <= join_gap
                    {
                        last.text.push_str(&piece.text);
                        last.end = end;
                        continue;
                    }
                    new_line
                },
            };

            self.words.push(Word {
                text: piece.text,
                start,
                end,
                tag: tag.map(str::to_string),
                mcid,
                line_break_before,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentProcessor;
    use crate::fonts::{BaseEncoding, SimpleFont};
    use crate::resources::Resources;
    use std::sync::Arc;

    fn run(extractor: MarkedContentExtractor, content: &[u8]) -> MarkedContentExtractor {
        let font = SimpleFont::new("Courier", BaseEncoding::WinAnsi).with_default_width(600.0);
        let resources = Arc::new(Resources::new().with_font("F1", Arc::new(font)));
        let mut processor = ContentProcessor::new(extractor);
        processor.process(content, resources).unwrap();
        processor.into_listener()
    }

    fn assert_near(point: Point, x: f32, y: f32) {
        assert!((point.x - x).abs() < 1e-3 && (point.y - y).abs() < 1e-3, "{:?}", point);
    }

    fn word_texts(extractor: &MarkedContentExtractor) -> Vec<&str> {
        extractor.words().iter().map(|w| w.text.as_str()).collect()
    }

    #[test]
    fn test_split_at_spaces_with_positions() {
        let extractor = run(MarkedContentExtractor::new(), b"BT /F1 10 Tf (Hello world) Tj ET");
        let words = extractor.words();
        assert_eq!(word_texts(&extractor), vec!["Hello", "world"]);
        assert_near(words[0].start, 0.0, 0.0);
        assert_near(words[0].end, 30.0, 0.0);
        assert_near(words[1].start, 36.0, 0.0);
        assert_near(words[1].end, 66.0, 0.0);
    }

    #[test]
    fn test_word_continues_across_strings() {
        let extractor = run(MarkedContentExtractor::new(), b"BT /F1 10 Tf (Hel) Tj (lo) Tj ET");
        assert_eq!(word_texts(&extractor), vec!["Hello"]);
        assert_near(extractor.words()[0].end, 30.0, 0.0);
    }

    #[test]
    fn test_trailing_space_breaks_next_string() {
        let extractor = run(MarkedContentExtractor::new(), b"BT /F1 10 Tf (one ) Tj (two) Tj ET");
        assert_eq!(word_texts(&extractor), vec!["one", "two"]);
        assert_eq!(extractor.text(), "one two");
    }

    #[test]
    fn test_kerning_gap_splits_words() {
        let extractor =
            run(MarkedContentExtractor::new(), b"BT /F1 10 Tf [(a) -100 (b) -600 (c)] TJ ET");
        assert_eq!(word_texts(&extractor), vec!["ab", "c"]);
    }

    #[test]
    fn test_artifacts_are_dropped() {
        let content = b"/Artifact BMC BT /F1 10 Tf (Header) Tj ET EMC \
                        BT /F1 10 Tf 0 -20 Td (Body) Tj ET";
        let extractor = run(MarkedContentExtractor::new(), content);
        assert_eq!(word_texts(&extractor), vec!["Body"]);
        assert!(!extractor.words()[0].line_break_before);
    }

    #[test]
    fn test_sections_by_mcid() {
        let content = b"/P <</MCID 0>> BDC BT /F1 10 Tf (First para) Tj ET EMC \
                        /P <</MCID 1>> BDC BT /F1 10 Tf 0 -12 Td (Second) Tj ET EMC";
        let extractor = run(MarkedContentExtractor::new(), content);
        let sections = extractor.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].tag.as_deref(), Some("P"));
        assert_eq!(sections[0].mcid, Some(0));
        assert_eq!(sections[0].text, "First para");
        assert_eq!(sections[1].mcid, Some(1));
        assert_eq!(sections[1].text, "Second");
        assert_eq!(extractor.text(), "First para\nSecond");
    }

    #[test]
    fn test_markup_wraps_sections() {
        let content = b"/P <</MCID 0>> BDC BT /F1 10 Tf (First para) Tj ET EMC \
                        /P <</MCID 1>> BDC BT /F1 10 Tf 0 -12 Td (Second) Tj ET EMC \
                        BT /F1 10 Tf 0 -24 Td (loose) Tj ET";
        let extractor = run(MarkedContentExtractor::new().with_markup(true), content);
        assert_eq!(extractor.text(), "<P>First para</P>\n<P>Second</P>\nloose");
    }

    #[test]
    fn test_touching_strings_in_different_sections_stay_apart() {
        let content = b"/Span <</MCID 2>> BDC BT /F1 10 Tf (ab) Tj ET EMC \
                        /Span <</MCID 3>> BDC BT /F1 10 Tf 12 0 Td (cd) Tj ET EMC";
        let extractor = run(MarkedContentExtractor::new(), content);
        assert_eq!(word_texts(&extractor), vec!["ab", "cd"]);
        assert_eq!(extractor.sections().len(), 2);
    }

    #[test]
    fn test_reset_clears_words() {
        let mut extractor = run(MarkedContentExtractor::new(), b"BT /F1 10 Tf (x ) Tj ET");
        RenderListener::reset(&mut extractor);
        assert!(extractor.words().is_empty());
        assert!(!extractor.pending_break);
        assert_eq!(extractor.text(), "");
    }
}
