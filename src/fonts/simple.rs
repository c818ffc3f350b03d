//! Single-byte fonts: Type1, MMType1, TrueType and Type3.

use super::cmap::CMap;
use super::encoding::BaseEncoding;
use super::glyph_names::glyph_name_to_unicode;
use super::{Font, Glyph, base_font_name, load_to_unicode};
use crate::error::Result;
use crate::object::{Dictionary, Object, ObjectResolver, resolve_entry, resolve_object};
use std::collections::HashMap;

/// Widths used for the standard 14 fonts when a dictionary omits `/Widths`.
const FIXED_PITCH_WIDTH: f32 = 600.0;
const PROPORTIONAL_WIDTH: f32 = 500.0;

const STANDARD_14: [&str; 14] = [
    "Courier",
    "Courier-Bold",
    "Courier-Oblique",
    "Courier-BoldOblique",
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-Oblique",
    "Helvetica-BoldOblique",
    "Times-Roman",
    "Times-Bold",
    "Times-Italic",
    "Times-BoldItalic",
    "Symbol",
    "ZapfDingbats",
];

/// A font whose character codes are single bytes.
///
/// Text decoding tries, in order: the `/ToUnicode` CMap, the
/// `/Differences` glyph names, and the base encoding. Codes none of them
/// define decode to an empty string but still advance by their width.
///
/// # Examples
///
/// ```
/// use pdf_textflow::fonts::{BaseEncoding, Font, SimpleFont};
///
/// let font = SimpleFont::new("Demo", BaseEncoding::WinAnsi)
///     .with_default_width(500.0)
///     .with_differences([(0x41, "Euro")]);
/// assert_eq!(font.decode(b"AB"), "€B");
/// assert_eq!(font.code_width(0x41), 500.0);
/// ```
#[derive(Debug, Clone)]
pub struct SimpleFont {
    name: String,
    encoding: BaseEncoding,
    differences: HashMap<u8, Option<char>>,
    to_unicode: Option<CMap>,
    first_char: u32,
    widths: Vec<f32>,
    default_width: f32,
    /// Glyph space to 1/1000 text space; 1.0 except for Type3 fonts
    width_scale: f32,
}

impl SimpleFont {
    /// Create a font with no widths and no overrides.
    pub fn new(name: impl Into<String>, encoding: BaseEncoding) -> Self {
        Self {
            name: name.into(),
            encoding,
            differences: HashMap::new(),
            to_unicode: None,
            first_char: 0,
            widths: Vec::new(),
            default_width: 0.0,
            width_scale: 1.0,
        }
    }

    /// Set the `/Widths` array starting at `first_char`.
    pub fn with_widths(mut self, first_char: u32, widths: Vec<f32>) -> Self {
        self.first_char = first_char;
        self.widths = widths;
        self
    }

    /// Width for codes outside the `/Widths` array.
    pub fn with_default_width(mut self, width: f32) -> Self {
        self.default_width = width;
        self
    }

    /// Override codes with glyph names, as a `/Differences` array does.
    /// Names with no known Unicode value make the code decode to nothing.
    pub fn with_differences<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (u8, S)>,
        S: AsRef<str>,
    {
        for (code, glyph_name) in entries {
            self.differences
                .insert(code, glyph_name_to_unicode(glyph_name.as_ref()));
        }
        self
    }

    /// Attach a ToUnicode map, which takes priority over the encoding.
    pub fn with_to_unicode(mut self, cmap: CMap) -> Self {
        self.to_unicode = Some(cmap);
        self
    }

    /// Build a font from a simple font dictionary.
    pub fn from_dict(font_dict: &Dictionary, resolver: &dyn ObjectResolver) -> Result<Self> {
        let name = base_font_name(font_dict);
        let subtype = font_dict.get("Subtype").and_then(Object::as_name);

        let default_encoding = match subtype {
            Some("TrueType") => BaseEncoding::WinAnsi,
            _ => BaseEncoding::Standard,
        };
        let mut font = SimpleFont::new(name, default_encoding);

        match resolve_entry(font_dict, "Encoding", resolver)? {
            Some(Object::Name(enc)) => {
                font.encoding = BaseEncoding::from_name(&enc).unwrap_or(default_encoding);
            },
            Some(Object::Dictionary(enc)) => {
                if let Some(base) = enc
                    .get("BaseEncoding")
                    .and_then(Object::as_name)
                    .and_then(BaseEncoding::from_name)
                {
                    font.encoding = base;
                }
                if let Some(diffs) = resolve_entry(&enc, "Differences", resolver)? {
                    font = font.with_differences(parse_differences(&diffs));
                }
            },
            _ => {},
        }

        font.first_char = font_dict
            .get("FirstChar")
            .and_then(Object::as_integer)
            .and_then(|c| u32::try_from(c).ok())
            .unwrap_or(0);

        let has_widths = match resolve_entry(font_dict, "Widths", resolver)? {
            Some(Object::Array(items)) => {
                font.widths = items
                    .iter()
                    .map(|w| {
                        resolve_object(w, resolver)
                            .ok()
                            .and_then(|w| w.as_number())
                            .unwrap_or(0.0)
                    })
                    .collect();
                true
            },
            _ => false,
        };

        let missing_width = match resolve_entry(font_dict, "FontDescriptor", resolver)? {
            Some(Object::Dictionary(descriptor)) => descriptor
                .get("MissingWidth")
                .and_then(Object::as_number),
            _ => None,
        };
        font.default_width = match missing_width {
            Some(width) => width,
            None if !has_widths && STANDARD_14.contains(&font.name.as_str()) => {
                if font.name.starts_with("Courier") {
                    FIXED_PITCH_WIDTH
                } else {
                    PROPORTIONAL_WIDTH
                }
            },
            None => 0.0,
        };

        if subtype == Some("Type3") {
            if let Some(Object::Array(matrix)) = resolve_entry(font_dict, "FontMatrix", resolver)? {
                if let Some(sx) = matrix.first().and_then(Object::as_number) {
                    font.width_scale = sx * 1000.0;
                }
            }
        }

        font.to_unicode = load_to_unicode(font_dict, resolver)?;
        Ok(font)
    }

    fn unicode_for(&self, code: u8) -> String {
        if let Some(text) = self
            .to_unicode
            .as_ref()
            .and_then(|cmap| cmap.get(&u32::from(code)))
        {
            return text.clone();
        }
        let ch = match self.differences.get(&code) {
            Some(mapped) => *mapped,
            None => self.encoding.decode(code),
        };
        ch.map(String::from).unwrap_or_default()
    }
}

/// Flatten a `/Differences` array into `(code, glyph name)` pairs.
fn parse_differences(diffs: &Object) -> Vec<(u8, String)> {
    let mut entries = Vec::new();
    let Some(items) = diffs.as_array() else {
        return entries;
    };

    let mut code: Option<i64> = None;
    for item in items {
        match item {
            Object::Integer(start) => code = Some(*start),
            Object::Name(glyph) => {
                if let Some(c) = code {
                    if let Ok(byte) = u8::try_from(c) {
                        entries.push((byte, glyph.clone()));
                    }
                    code = Some(c + 1);
                }
            },
            _ => {},
        }
    }
    entries
}

impl Font for SimpleFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode_glyphs(&self, bytes: &[u8]) -> Vec<Glyph> {
        bytes
            .iter()
            .map(|&byte| Glyph {
                code: u32::from(byte),
                unicode: self.unicode_for(byte),
                width: self.code_width(u32::from(byte)),
                is_word_space: byte == b' ',
            })
            .collect()
    }

    fn code_width(&self, code: u32) -> f32 {
        let width = code
            .checked_sub(self.first_char)
            .and_then(|index| self.widths.get(index as usize))
            .copied()
            .unwrap_or(self.default_width);
        width * self.width_scale
    }
}
