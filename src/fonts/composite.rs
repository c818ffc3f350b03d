//! Type0 (composite) fonts with two-byte character codes.

use super::cmap::CMap;
use super::{Font, Glyph, base_font_name, load_to_unicode};
use crate::error::{Error, Result};
use crate::object::{Dictionary, Object, ObjectResolver, resolve_entry, resolve_object};
use byteorder::{BigEndian, ByteOrder};
use std::collections::HashMap;

const DEFAULT_CID_WIDTH: f32 = 1000.0;

/// A Type0 font.
///
/// Codes are read as big-endian 16-bit values and used directly as CIDs,
/// which is exact for `Identity-H`/`Identity-V`. Without a `/ToUnicode`
/// map a code is taken to be a Unicode scalar value; for the `Uni*-UCS2`
/// and `Uni*-UTF16` CMaps surrogate pairs are joined.
#[derive(Debug, Clone)]
pub struct CompositeFont {
    name: String,
    to_unicode: Option<CMap>,
    utf16_codes: bool,
    widths: HashMap<u32, f32>,
    default_width: f32,
}

impl CompositeFont {
    /// Create a composite font with the default CID width and no maps.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            to_unicode: None,
            utf16_codes: false,
            widths: HashMap::new(),
            default_width: DEFAULT_CID_WIDTH,
        }
    }

    /// Set the width of one CID.
    pub fn with_width(mut self, cid: u32, width: f32) -> Self {
        self.widths.insert(cid, width);
        self
    }

    /// Set the `/DW` default width.
    pub fn with_default_width(mut self, width: f32) -> Self {
        self.default_width = width;
        self
    }

    /// Attach a ToUnicode map.
    pub fn with_to_unicode(mut self, cmap: CMap) -> Self {
        self.to_unicode = Some(cmap);
        self
    }

    /// Build a font from a Type0 font dictionary.
    ///
    /// # Errors
    ///
    /// [`Error::Font`] when `/DescendantFonts` is present but holds no
    /// CIDFont dictionary. Unresolvable references are propagated.
    pub fn from_dict(font_dict: &Dictionary, resolver: &dyn ObjectResolver) -> Result<Self> {
        let mut font = CompositeFont::new(base_font_name(font_dict));

        if let Some(Object::Name(encoding)) = resolve_entry(font_dict, "Encoding", resolver)? {
            font.utf16_codes = encoding.starts_with("Uni")
                && (encoding.contains("UCS2") || encoding.contains("UTF16"));
            if !encoding.starts_with("Identity") && !font.utf16_codes {
                log::debug!("CMap {} treated as two-byte identity", encoding);
            }
        }

        if let Some(descendants) = resolve_entry(font_dict, "DescendantFonts", resolver)? {
            let first = descendants
                .as_array()
                .and_then(|fonts| fonts.first())
                .ok_or_else(|| Error::Font(format!("{}: empty /DescendantFonts", font.name)))?;
            let cid_font = resolve_object(first, resolver)?;
            let cid_dict = cid_font.as_dict().ok_or_else(|| {
                Error::Font(format!("{}: descendant is {}", font.name, cid_font.type_name()))
            })?;

            if let Some(dw) = cid_dict.get("DW").and_then(Object::as_number) {
                font.default_width = dw;
            }
            if let Some(w) = resolve_entry(cid_dict, "W", resolver)? {
                font.widths = parse_cid_widths(&w, resolver)?;
            }
        }

        font.to_unicode = load_to_unicode(font_dict, resolver)?;
        Ok(font)
    }

    fn fallback_unicode(&self, codes: &[u32]) -> Vec<String> {
        if !self.utf16_codes {
            return codes
                .iter()
                .map(|&code| char::from_u32(code).map(String::from).unwrap_or_default())
                .collect();
        }

        let mut out = Vec::with_capacity(codes.len());
        let mut i = 0;
        while i < codes.len() {
            let code = codes[i];
            let next = codes.get(i + 1).copied();
            match next {
                Some(low) if (0xD800..0xDC00).contains(&code) && (0xDC00..0xE000).contains(&low) => {
                    let units = [code as u16, low as u16];
                    out.push(String::from_utf16_lossy(&units));
                    out.push(String::new());
                    i += 2;
                },
                _ => {
                    out.push(String::from_utf16_lossy(&[code as u16]));
                    i += 1;
                },
            }
        }
        out
    }
}

/// Parse a `/W` array.
///
/// Two forms may be mixed: `c [w1 w2 ...]` gives consecutive CIDs from
/// `c`, and `c_first c_last w` gives one width to a range.
fn parse_cid_widths(w: &Object, resolver: &dyn ObjectResolver) -> Result<HashMap<u32, f32>> {
    let mut widths = HashMap::new();
    let Some(items) = w.as_array() else {
        return Ok(widths);
    };

    let items = items
        .iter()
        .map(|item| resolve_object(item, resolver))
        .collect::<Result<Vec<_>>>()?;

    let mut i = 0;
    while i < items.len() {
        let Some(first) = items[i].as_integer().and_then(|c| u32::try_from(c).ok()) else {
            i += 1;
            continue;
        };

        match items.get(i + 1) {
            Some(Object::Array(list)) => {
                for (offset, width) in list.iter().enumerate() {
                    let cid = u32::try_from(offset).ok().and_then(|o| first.checked_add(o));
                    let Some(cid) = cid else {
                        break;
                    };
                    if let Some(width) = width.as_number() {
                        widths.insert(cid, width);
                    }
                }
                i += 2;
            },
            Some(last) => {
                let last = last.as_integer().and_then(|c| u32::try_from(c).ok());
                let width = items.get(i + 2).and_then(Object::as_number);
                if let (Some(last), Some(width)) = (last, width) {
                    if last >= first && last - first <= u32::from(u16::MAX) {
                        for cid in first..=last {
                            widths.insert(cid, width);
                        }
                    }
                }
                i += 3;
            },
            None => break,
        }
    }

    Ok(widths)
}

impl Font for CompositeFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode_glyphs(&self, bytes: &[u8]) -> Vec<Glyph> {
        let codes: Vec<u32> = bytes
            .chunks(2)
            .map(|chunk| match chunk.len() {
                2 => u32::from(BigEndian::read_u16(chunk)),
                _ => u32::from(chunk[0]),
            })
            .collect();

        let fallback = match &self.to_unicode {
            Some(_) => Vec::new(),
            None => self.fallback_unicode(&codes),
        };

        codes
            .iter()
            .enumerate()
            .map(|(i, &code)| {
                let unicode = match &self.to_unicode {
                    Some(cmap) => cmap.get(&code).cloned().unwrap_or_default(),
                    None => fallback.get(i).cloned().unwrap_or_default(),
                };
                Glyph {
                    code,
                    unicode,
                    width: self.code_width(code),
                    is_word_space: false,
                }
            })
            .collect()
    }

    fn code_width(&self, code: u32) -> f32 {
        self.widths.get(&code).copied().unwrap_or(self.default_width)
    }
}
