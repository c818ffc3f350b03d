//! ToUnicode CMap parser.
//!
//! A ToUnicode CMap maps character codes to the Unicode text they stand
//! for. Only the `bfchar` and `bfrange` sections matter for extraction.
//!
//! ```text
//! beginbfchar
//! <0041> <0041>
//! <0003> <00660069>        % one code to a ligature, "fi"
//! <0004> <D835DF0C>        % surrogate pair, U+1D70C
//! endbfchar
//! beginbfrange
//! <0020> <007E> <0020>
//! <0080> <0081> [<00C4> <00C5>]
//! endbfrange
//! ```

use crate::error::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Character code to Unicode string.
pub type CMap = HashMap<u32, String>;

/// Largest bfrange accepted; larger ranges are malformed or hostile.
const MAX_RANGE_LEN: u32 = 0x1_0000;

lazy_static! {
    static ref BFCHAR: Regex =
        Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f\s]*)>").unwrap();
    static ref BFRANGE: Regex = Regex::new(
        r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*(?:<([0-9A-Fa-f\s]*)>|\[([^\]]*)\])"
    )
    .unwrap();
    static ref HEX_ITEM: Regex = Regex::new(r"<([0-9A-Fa-f\s]*)>").unwrap();
}

/// Decode a destination hex string as UTF-16BE.
///
/// Surrogate pairs combine into one character; longer strings yield
/// ligature text ("fi"). Unpaired surrogates become U+FFFD.
fn utf16_hex_to_string(hex: &str) -> Option<String> {
    let digits: Vec<u8> = hex.bytes().filter(u8::is_ascii_hexdigit).collect();
    if digits.is_empty() {
        return None;
    }
    // Odd-length values are single-byte destinations; pad on the left
    let padded: Vec<u8> = if digits.len() % 4 == 0 {
        digits
    } else {
        let pad = 4 - digits.len() % 4;
        std::iter::repeat(b'0').take(pad).chain(digits).collect()
    };
    let units: Vec<u16> = padded
        .chunks(4)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .filter_map(|s| u16::from_str_radix(s, 16).ok())
        .collect();
    Some(String::from_utf16_lossy(&units))
}

/// Add `offset` to the last UTF-16 unit of a destination string.
fn offset_destination(base: &str, offset: u32) -> String {
    let mut units: Vec<u16> = base.encode_utf16().collect();
    if let Some(last) = units.last_mut() {
        *last = last.wrapping_add(offset as u16);
    }
    String::from_utf16_lossy(&units)
}

fn sections<'a>(content: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut remaining = content;

    while let Some(begin_pos) = remaining.find(begin) {
        let after_begin = &remaining[begin_pos + begin.len()..];
        match after_begin.find(end) {
            Some(end_pos) => {
                found.push(&after_begin[..end_pos]);
                remaining = &after_begin[end_pos + end.len()..];
            },
            None => break,
        }
    }

    found
}

fn parse_code(hex: &str) -> Option<u32> {
    u32::from_str_radix(hex, 16).ok()
}

/// Parse a ToUnicode CMap stream (already decoded).
///
/// Lines that do not parse are skipped.
///
/// # Examples
///
/// ```
/// use pdf_textflow::fonts::parse_tounicode_cmap;
///
/// let cmap = parse_tounicode_cmap(b"1 beginbfchar\n<01> <0041>\nendbfchar").unwrap();
/// assert_eq!(cmap.get(&0x01).map(String::as_str), Some("A"));
/// ```
pub fn parse_tounicode_cmap(data: &[u8]) -> Result<CMap> {
    let mut cmap = CMap::new();
    let content = String::from_utf8_lossy(data);

    for section in sections(&content, "beginbfchar", "endbfchar") {
        for caps in BFCHAR.captures_iter(section) {
            let (Some(src), Some(dst)) = (parse_code(&caps[1]), utf16_hex_to_string(&caps[2])) else {
                continue;
            };
            log::trace!("ToUnicode bfchar: 0x{:02X} -> {:?}", src, dst);
            cmap.insert(src, dst);
        }
    }

    for section in sections(&content, "beginbfrange", "endbfrange") {
        for caps in BFRANGE.captures_iter(section) {
            let (Some(lo), Some(hi)) = (parse_code(&caps[1]), parse_code(&caps[2])) else {
                continue;
            };
            if hi < lo || hi - lo >= MAX_RANGE_LEN {
                log::warn!("Ignoring bfrange <{:X}> <{:X}>", lo, hi);
                continue;
            }

            if let Some(dst) = caps.get(3) {
                let Some(base) = utf16_hex_to_string(dst.as_str()) else {
                    continue;
                };
                for code in lo..=hi {
                    cmap.insert(code, offset_destination(&base, code - lo));
                }
            } else if let Some(items) = caps.get(4) {
                let targets = HEX_ITEM
                    .captures_iter(items.as_str())
                    .filter_map(|item| utf16_hex_to_string(&item[1]));
                for (code, dst) in (lo..=hi).zip(targets) {
                    cmap.insert(code, dst);
                }
            }
        }
    }

    Ok(cmap)
}
