//! Font handling for text extraction.
//!
//! The interpreter only needs two things from a font: the Unicode text
//! behind a run of character codes, and each glyph's advance width. The
//! [`Font`] trait provides both; [`SimpleFont`] covers single-byte fonts
//! (Type1, TrueType, Type3) and [`CompositeFont`] covers Type0 fonts.

pub mod cmap;
mod composite;
mod encoding;
mod glyph_names;
mod simple;

pub use cmap::{CMap, parse_tounicode_cmap};
pub use composite::CompositeFont;
pub use encoding::BaseEncoding;
pub use glyph_names::glyph_name_to_unicode;
pub use simple::SimpleFont;

use crate::content::GraphicsState;
use crate::error::{Error, Result};
use crate::object::{Dictionary, Object, ObjectResolver, resolve_entry, resolve_object};
use std::fmt;
use std::sync::Arc;

/// One decoded glyph of a shown string.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Character code as it appeared in the string
    pub code: u32,
    /// Unicode text for the code; empty when the code is unmapped
    pub unicode: String,
    /// Advance width in glyph space (1/1000 of text space)
    pub width: f32,
    /// Whether word spacing (`Tw`) applies to this glyph
    pub is_word_space: bool,
}

/// Font abstraction consumed by the content processor.
pub trait Font: Send + Sync + fmt::Debug {
    /// Font resource's `/BaseFont` name.
    fn name(&self) -> &str;

    /// Split `bytes` into character codes and decode each one.
    fn decode_glyphs(&self, bytes: &[u8]) -> Vec<Glyph>;

    /// Advance width of one character code in glyph space.
    fn code_width(&self, code: u32) -> f32;

    /// Decode `bytes` to Unicode text.
    fn decode(&self, bytes: &[u8]) -> String {
        self.decode_glyphs(bytes)
            .into_iter()
            .map(|glyph| glyph.unicode)
            .collect()
    }

    /// Width of a space in glyph space: code 32, or U+00A0 when the font
    /// has no width for code 32.
    fn space_width(&self) -> f32 {
        let width = self.code_width(32);
        if width == 0.0 {
            self.code_width(0xA0)
        } else {
            width
        }
    }
}

/// Advance of a run of glyphs in unscaled text space.
///
/// Each glyph contributes `(w / 1000 * Tfs + Tc + Tw?) * Th`, where word
/// spacing only applies to single-byte code 32.
///
/// # Examples
///
/// ```
/// use pdf_textflow::content::GraphicsState;
/// use pdf_textflow::fonts::{Glyph, text_space_width};
///
/// let mut state = GraphicsState::new();
/// state.font_size = 10.0;
/// let glyph = Glyph { code: 65, unicode: "A".into(), width: 500.0, is_word_space: false };
/// assert_eq!(text_space_width(&[glyph], &state), 5.0);
/// ```
pub fn text_space_width(glyphs: &[Glyph], state: &GraphicsState) -> f32 {
    glyphs
        .iter()
        .map(|glyph| {
            let word_spacing = if glyph.is_word_space {
                state.word_spacing
            } else {
                0.0
            };
            (glyph.width / 1000.0 * state.font_size + state.char_spacing + word_spacing)
                * state.horizontal_scaling
        })
        .sum()
}

/// Build a font from a font dictionary.
///
/// `Type0` fonts become a [`CompositeFont`]; every other subtype (or a
/// missing one) is treated as a single-byte [`SimpleFont`].
///
/// # Errors
///
/// [`Error::InvalidObjectType`] when `dict` is not a dictionary; reference
/// resolution failures are propagated.
pub fn load_font(dict: &Object, resolver: &dyn ObjectResolver) -> Result<Arc<dyn Font>> {
    let resolved = resolve_object(dict, resolver)?;
    let font_dict = resolved.as_dict().ok_or_else(|| Error::InvalidObjectType {
        expected: "Dictionary".to_string(),
        found: resolved.type_name().to_string(),
    })?;

    let font: Arc<dyn Font> = match font_dict.get("Subtype").and_then(Object::as_name) {
        Some("Type0") => Arc::new(CompositeFont::from_dict(font_dict, resolver)?),
        _ => Arc::new(SimpleFont::from_dict(font_dict, resolver)?),
    };
    log::debug!("Loaded font {:?}", font.name());
    Ok(font)
}

/// Parse the `/ToUnicode` stream of a font dictionary, if present.
///
/// A broken stream is logged and ignored so that extraction can fall back
/// to the font's encoding.
pub(crate) fn load_to_unicode(
    font_dict: &Dictionary,
    resolver: &dyn ObjectResolver,
) -> Result<Option<CMap>> {
    let Some(stream) = resolve_entry(font_dict, "ToUnicode", resolver)? else {
        return Ok(None);
    };
    if !matches!(stream, Object::Stream { .. }) {
        return Ok(None);
    }
    match stream.decode_stream_data() {
        Ok(data) => Ok(Some(parse_tounicode_cmap(&data)?)),
        Err(e) => {
            log::warn!("Ignoring unreadable ToUnicode CMap: {}", e);
            Ok(None)
        },
    }
}

/// `/BaseFont` of a font dictionary, or a placeholder.
pub(crate) fn base_font_name(font_dict: &Dictionary) -> String {
    font_dict
        .get("BaseFont")
        .and_then(Object::as_name)
        .unwrap_or("Unnamed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::NoReferences;

    #[test]
    fn test_text_space_width_applies_spacing_and_scaling() {
        let mut state = GraphicsState::new();
        state.font_size = 10.0;
        state.char_spacing = 1.0;
        state.word_spacing = 2.0;
        state.horizontal_scaling = 0.5;

        let glyphs = vec![
            Glyph {
                code: 65,
                unicode: "A".to_string(),
                width: 600.0,
                is_word_space: false,
            },
            Glyph {
                code: 32,
                unicode: " ".to_string(),
                width: 200.0,
                is_word_space: true,
            },
        ];
        // (6 + 1) * 0.5 + (2 + 1 + 2) * 0.5
        assert_eq!(text_space_width(&glyphs, &state), 6.0);
    }

    #[test]
    fn test_text_space_width_empty() {
        assert_eq!(text_space_width(&[], &GraphicsState::new()), 0.0);
    }

    #[test]
    fn test_load_font_dispatches_on_subtype() {
        let mut simple = Dictionary::new();
        simple.insert("Subtype".to_string(), Object::Name("Type1".to_string()));
        simple.insert("BaseFont".to_string(), Object::Name("Helvetica".to_string()));
        let font = load_font(&Object::Dictionary(simple), &NoReferences).unwrap();
        assert_eq!(font.name(), "Helvetica");
        assert_eq!(font.decode(b"Hi"), "Hi");

        let mut composite = Dictionary::new();
        composite.insert("Subtype".to_string(), Object::Name("Type0".to_string()));
        composite.insert("BaseFont".to_string(), Object::Name("Noto".to_string()));
        composite.insert("Encoding".to_string(), Object::Name("Identity-H".to_string()));
        let font = load_font(&Object::Dictionary(composite), &NoReferences).unwrap();
        assert_eq!(font.decode(&[0x00, 0x41]), "A");
    }

    #[test]
    fn test_load_font_rejects_non_dictionary() {
        let err = load_font(&Object::Integer(3), &NoReferences).unwrap_err();
        assert!(matches!(err, Error::InvalidObjectType { .. }));
    }

    #[test]
    fn test_space_width_falls_back_to_nbsp() {
        let font = SimpleFont::new("Test", BaseEncoding::WinAnsi)
            .with_widths(0xA0, vec![250.0])
            .with_default_width(0.0);
        assert_eq!(font.space_width(), 250.0);
    }
}
