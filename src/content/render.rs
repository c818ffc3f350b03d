//! Text render events and the listener boundary.

use super::graphics_state::{GraphicsState, Matrix, RenderMode};
use crate::fonts::{Glyph, text_space_width};
use crate::geometry::Point;

/// Marked-content context in effect when text is shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkedContent {
    /// Tag of the innermost `BMC`/`BDC` sequence
    pub tag: Option<String>,
    /// MCID of the innermost sequence that has one
    pub mcid: Option<i64>,
    /// Whether any enclosing sequence is tagged `/Artifact`
    pub in_artifact: bool,
}

/// Everything a listener learns about one shown string.
///
/// Built for each `Tj` operand and each string element of a `TJ` array.
/// Geometry is derived from the text matrix in effect *before* the text
/// matrix is advanced past the string.
#[derive(Debug, Clone)]
pub struct TextRenderInfo {
    text: String,
    glyphs: Vec<Glyph>,
    state: GraphicsState,
    text_matrix: Matrix,
    text_to_user: Matrix,
    unscaled_width: f32,
    marked: MarkedContent,
}

impl TextRenderInfo {
    pub(crate) fn new(
        glyphs: Vec<Glyph>,
        state: GraphicsState,
        text_matrix: Matrix,
        marked: MarkedContent,
    ) -> Self {
        let text = glyphs.iter().map(|g| g.unicode.as_str()).collect();
        let unscaled_width = text_space_width(&glyphs, &state);
        let text_to_user = text_matrix.multiply(&state.ctm);
        Self {
            text,
            glyphs,
            state,
            text_matrix,
            text_to_user,
            unscaled_width,
            marked,
        }
    }

    /// Decoded Unicode text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Decoded glyphs with their codes and widths.
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Graphics state snapshot at the time the text was shown.
    pub fn graphics_state(&self) -> &GraphicsState {
        &self.state
    }

    /// Text matrix at the start of the string.
    pub fn text_matrix(&self) -> Matrix {
        self.text_matrix
    }

    /// Text space to user space: text matrix followed by the CTM.
    pub fn text_to_user_matrix(&self) -> Matrix {
        self.text_to_user
    }

    /// Advance of the string in text space, before the CTM is applied.
    pub fn unscaled_width(&self) -> f32 {
        self.unscaled_width
    }

    /// Start of the baseline in user space.
    pub fn baseline_start(&self) -> Point {
        self.text_to_user.transform_point(0.0, 0.0)
    }

    /// End of the baseline in user space.
    pub fn baseline_end(&self) -> Point {
        self.text_to_user.transform_point(self.unscaled_width, 0.0)
    }

    /// Width of one space character of the current font and size, in
    /// user space. Zero when the font has no space width.
    pub fn single_space_width(&self) -> f32 {
        let Some(font) = self.state.font.as_deref() else {
            return 0.0;
        };
        let space = Glyph {
            code: 32,
            unicode: " ".to_string(),
            width: font.space_width(),
            is_word_space: true,
        };
        let width = text_space_width(std::slice::from_ref(&space), &self.state);
        let v = self.text_to_user.transform_vector(width, 0.0);
        v.x.hypot(v.y)
    }

    /// Text rendering mode.
    pub fn render_mode(&self) -> RenderMode {
        self.state.render_mode
    }

    /// Font size set by `Tf`.
    pub fn font_size(&self) -> f32 {
        self.state.font_size
    }

    /// Marked-content identifier of the enclosing sequence, if any.
    pub fn mcid(&self) -> Option<i64> {
        self.marked.mcid
    }

    /// Tag of the innermost marked-content sequence, if any.
    pub fn marked_tag(&self) -> Option<&str> {
        self.marked.tag.as_deref()
    }

    /// Whether the text lies inside an `/Artifact` sequence.
    pub fn is_artifact(&self) -> bool {
        self.marked.in_artifact
    }
}

/// Consumer of text render events.
///
/// `reset` is called once per content stream before the first event;
/// `render_text` once per shown string, in document order.
pub trait RenderListener {
    /// Clear any accumulated output.
    fn reset(&mut self);

    /// Receive one text render event.
    fn render_text(&mut self, info: TextRenderInfo);
}

impl<L: RenderListener + ?Sized> RenderListener for &mut L {
    fn reset(&mut self) {
        (**self).reset();
    }

    fn render_text(&mut self, info: TextRenderInfo) {
        (**self).render_text(info);
    }
}

/// Listener that keeps every event, mostly useful in tests and tools.
#[derive(Debug, Default, Clone)]
pub struct CollectingListener {
    /// Events in the order they were rendered
    pub events: Vec<TextRenderInfo>,
}

impl CollectingListener {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderListener for CollectingListener {
    fn reset(&mut self) {
        self.events.clear();
    }

    fn render_text(&mut self, info: TextRenderInfo) {
        self.events.push(info);
    }
}
