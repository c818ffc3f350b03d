//! Graphics and text state for content stream execution.
//!
//! [`Matrix`] is the 2-D affine transform used for the CTM and the text
//! matrices. [`GraphicsState`] holds the text-relevant parameters set by
//! `Tf`, `Tc`, `Tw`, `Tz`, `TL`, `Tr`, `Ts`, `cm` and `gs`, and
//! [`GraphicsStateStack`] implements `q`/`Q` over it.

use crate::error::{Error, Result};
use crate::fonts::Font;
use crate::geometry::Point;
use serde::Serialize;
use std::sync::Arc;

/// A 2D transformation matrix.
///
/// PDF uses matrices of the form:
/// ```text
/// [ a  b  0 ]
/// [ c  d  0 ]
/// [ e  f  1 ]
/// ```
///
/// Points are row vectors, so `p' = p × M`. `A.multiply(&B)` is the
/// transform that applies `A` first and then `B`; a new CTM is therefore
/// `new.multiply(&old)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Matrix {
    /// Horizontal scaling component
    pub a: f32,
    /// Rotation/skew component
    pub b: f32,
    /// Rotation/skew component
    pub c: f32,
    /// Vertical scaling component
    pub d: f32,
    /// Horizontal translation
    pub e: f32,
    /// Vertical translation
    pub f: f32,
}

impl Matrix {
    /// Create an identity matrix.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_textflow::content::Matrix;
    ///
    /// let m = Matrix::identity();
    /// assert_eq!(m, Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0));
    /// ```
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Create a matrix from its six coefficients.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Create a translation matrix.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_textflow::content::Matrix;
    ///
    /// let m = Matrix::translation(10.0, 20.0);
    /// assert_eq!(m.e, 10.0);
    /// assert_eq!(m.f, 20.0);
    /// ```
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Create a scaling matrix.
    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Compose two transforms: the result applies `self`, then `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_textflow::content::Matrix;
    ///
    /// let translate = Matrix::translation(10.0, 20.0);
    /// let scale = Matrix::scaling(2.0, 2.0);
    /// let p = translate.multiply(&scale).transform_point(5.0, 5.0);
    /// assert_eq!((p.x, p.y), (30.0, 50.0));
    /// ```
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_textflow::content::Matrix;
    ///
    /// let p = Matrix::translation(10.0, 20.0).transform_point(5.0, 10.0);
    /// assert_eq!((p.x, p.y), (15.0, 30.0));
    /// ```
    pub fn transform_point(&self, x: f32, y: f32) -> Point {
        Point {
            x: self.a * x + self.c * y + self.e,
            y: self.b * x + self.d * y + self.f,
        }
    }

    /// Transform a direction vector (translation ignored).
    pub fn transform_vector(&self, x: f32, y: f32) -> Point {
        Point {
            x: self.a * x + self.c * y,
            y: self.b * x + self.d * y,
        }
    }

    /// Translation component `(e, f)`.
    pub fn translation_part(&self) -> Point {
        Point::new(self.e, self.f)
    }

    /// Build a matrix from six numeric operands, as used by `cm`, `Tm`
    /// and the form `/Matrix` entry.
    pub(crate) fn from_operands(values: &[f32]) -> Option<Matrix> {
        match values {
            [a, b, c, d, e, f] => Some(Matrix::new(*a, *b, *c, *d, *e, *f)),
            _ => None,
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Text rendering mode set by `Tr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RenderMode {
    /// 0: fill glyph outlines
    #[default]
    Fill,
    /// 1: stroke glyph outlines
    Stroke,
    /// 2: fill, then stroke
    FillStroke,
    /// 3: neither fill nor stroke
    Invisible,
    /// 4: fill and add to clipping path
    FillClip,
    /// 5: stroke and add to clipping path
    StrokeClip,
    /// 6: fill, stroke and add to clipping path
    FillStrokeClip,
    /// 7: add to clipping path only
    Clip,
}

impl RenderMode {
    /// Map a `Tr` operand to a mode. Values outside 0-7 are rejected.
    pub fn from_code(code: i64) -> Option<RenderMode> {
        Some(match code {
            0 => RenderMode::Fill,
            1 => RenderMode::Stroke,
            2 => RenderMode::FillStroke,
            3 => RenderMode::Invisible,
            4 => RenderMode::FillClip,
            5 => RenderMode::StrokeClip,
            6 => RenderMode::FillStrokeClip,
            7 => RenderMode::Clip,
            _ => return None,
        })
    }

    /// Numeric `Tr` code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether glyphs are painted at all (modes 3 and 7 paint nothing).
    pub fn is_visible(self) -> bool {
        !matches!(self, RenderMode::Invisible | RenderMode::Clip)
    }
}

/// Graphics state parameters relevant to text.
///
/// Cloning is cheap: the font is shared behind an `Arc` and never mutated,
/// so a pushed copy is independent of the original.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    /// Current transformation matrix (user space to device space)
    pub ctm: Matrix,
    /// Active font (Tf or gs)
    pub font: Option<Arc<dyn Font>>,
    /// Font size (Tf)
    pub font_size: f32,
    /// Character spacing (Tc)
    pub char_spacing: f32,
    /// Word spacing (Tw)
    pub word_spacing: f32,
    /// Horizontal scaling as a fraction; `Tz 50` stores 0.5
    pub horizontal_scaling: f32,
    /// Text leading (TL)
    pub leading: f32,
    /// Text rendering mode (Tr)
    pub render_mode: RenderMode,
    /// Text rise (Ts)
    pub rise: f32,
}

impl GraphicsState {
    /// Create a graphics state with the initial values a page starts with.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_textflow::content::GraphicsState;
    ///
    /// let state = GraphicsState::new();
    /// assert_eq!(state.horizontal_scaling, 1.0);
    /// assert!(state.font.is_none());
    /// ```
    pub fn new() -> Self {
        Self {
            ctm: Matrix::identity(),
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            render_mode: RenderMode::Fill,
            rise: 0.0,
        }
    }

    /// Name of the active font, if any.
    pub fn font_name(&self) -> Option<&str> {
        self.font.as_deref().map(|font| font.name())
    }
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack of graphics states for `q`/`Q`.
///
/// The bottom entry is the base state of the content stream and can never
/// be popped, so the stack is never empty.
#[derive(Debug, Clone)]
pub struct GraphicsStateStack {
    base: GraphicsState,
    saved: Vec<GraphicsState>,
}

impl GraphicsStateStack {
    /// Create a stack holding one default state.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_textflow::content::GraphicsStateStack;
    ///
    /// let stack = GraphicsStateStack::new();
    /// assert_eq!(stack.depth(), 1);
    /// ```
    pub fn new() -> Self {
        Self::with_base(GraphicsState::new())
    }

    /// Create a stack whose base entry is `base`.
    pub fn with_base(base: GraphicsState) -> Self {
        Self {
            base,
            saved: Vec::new(),
        }
    }

    /// The current (top) graphics state.
    pub fn top(&self) -> &GraphicsState {
        self.saved.last().unwrap_or(&self.base)
    }

    /// Mutable access to the current (top) graphics state.
    pub fn top_mut(&mut self) -> &mut GraphicsState {
        self.saved.last_mut().unwrap_or(&mut self.base)
    }

    /// Duplicate the top state (`q`).
    pub fn push(&mut self) {
        let copy = self.top().clone();
        self.saved.push(copy);
    }

    /// Discard the top state (`Q`).
    ///
    /// # Errors
    ///
    /// [`Error::StackUnderflow`] when only the base state remains; the
    /// stack is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_textflow::content::GraphicsStateStack;
    ///
    /// let mut stack = GraphicsStateStack::new();
    /// stack.push();
    /// assert!(stack.pop().is_ok());
    /// assert!(stack.pop().is_err());
    /// assert_eq!(stack.depth(), 1);
    /// ```
    pub fn pop(&mut self) -> Result<()> {
        self.saved.pop().map(|_| ()).ok_or(Error::StackUnderflow)
    }

    /// Number of states on the stack, at least 1.
    pub fn depth(&self) -> usize {
        self.saved.len() + 1
    }
}

impl Default for GraphicsStateStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_multiply_applies_left_first() {
        let m1 = Matrix::translation(10.0, 20.0);
        let m2 = Matrix::scaling(2.0, 2.0);
        let p = m1.multiply(&m2).transform_point(5.0, 5.0);
        assert_eq!(p.x, 30.0);
        assert_eq!(p.y, 50.0);
    }

    #[test]
    fn test_matrix_multiply_not_commutative() {
        let m1 = Matrix::translation(10.0, 0.0);
        let m2 = Matrix::scaling(2.0, 1.0);
        let p1 = m1.multiply(&m2).transform_point(5.0, 0.0);
        let p2 = m2.multiply(&m1).transform_point(5.0, 0.0);
        assert_ne!(p1.x, p2.x);
    }

    #[test]
    fn test_translation_prepended_to_scaled_text_matrix() {
        // Td on a text matrix scaled by 2 moves twice as far in user space
        let tm = Matrix::scaling(2.0, 2.0);
        let moved = Matrix::translation(3.0, 0.0).multiply(&tm);
        assert_eq!(moved.e, 6.0);
        assert_eq!(moved.a, 2.0);
    }

    #[test]
    fn test_transform_vector_ignores_translation() {
        let m = Matrix::new(2.0, 0.0, 0.0, 3.0, 100.0, 100.0);
        let v = m.transform_vector(1.0, 1.0);
        assert_eq!((v.x, v.y), (2.0, 3.0));
    }

    #[test]
    fn test_from_operands() {
        assert_eq!(
            Matrix::from_operands(&[1.0, 0.0, 0.0, 1.0, 5.0, 6.0]),
            Some(Matrix::translation(5.0, 6.0))
        );
        assert_eq!(Matrix::from_operands(&[1.0, 0.0]), None);
    }

    #[test]
    fn test_render_mode_codes() {
        assert_eq!(RenderMode::from_code(3), Some(RenderMode::Invisible));
        assert_eq!(RenderMode::from_code(7).map(RenderMode::code), Some(7));
        assert_eq!(RenderMode::from_code(8), None);
        assert_eq!(RenderMode::from_code(-1), None);
        assert!(!RenderMode::Invisible.is_visible());
        assert!(RenderMode::FillClip.is_visible());
    }

    #[test]
    fn test_stack_push_copies_top() {
        let mut stack = GraphicsStateStack::new();
        stack.top_mut().font_size = 14.0;
        stack.push();
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.top().font_size, 14.0);

        stack.top_mut().font_size = 16.0;
        stack.pop().unwrap();
        assert_eq!(stack.top().font_size, 14.0);
    }

    #[test]
    fn test_stack_pop_base_is_underflow() {
        let mut stack = GraphicsStateStack::new();
        stack.top_mut().leading = 9.0;
        assert!(matches!(stack.pop(), Err(Error::StackUnderflow)));
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top().leading, 9.0);
    }

    #[test]
    fn test_stack_with_base() {
        let mut base = GraphicsState::new();
        base.ctm = Matrix::translation(1.0, 2.0);
        let stack = GraphicsStateStack::with_base(base);
        assert_eq!(stack.top().ctm.e, 1.0);
        assert_eq!(stack.depth(), 1);
    }
}
