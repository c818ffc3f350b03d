//! Glyph name to Unicode lookup for `/Differences` arrays.
//!
//! Covers the Latin glyph set used by the standard simple-font encodings,
//! plus the `uniXXXX` and `uXXXX[XX]` naming conventions.

use phf::phf_map;

static GLYPH_NAMES: phf::Map<&'static str, char> = phf_map! {
    "space" => ' ', "exclam" => '!', "quotedbl" => '"', "numbersign" => '#',
    "dollar" => '$', "percent" => '%', "ampersand" => '&', "quotesingle" => '\'',
    "parenleft" => '(', "parenright" => ')', "asterisk" => '*', "plus" => '+',
    "comma" => ',', "hyphen" => '-', "period" => '.', "slash" => '/',
    "zero" => '0', "one" => '1', "two" => '2', "three" => '3', "four" => '4',
    "five" => '5', "six" => '6', "seven" => '7', "eight" => '8', "nine" => '9',
    "colon" => ':', "semicolon" => ';', "less" => '<', "equal" => '=',
    "greater" => '>', "question" => '?', "at" => '@',
    "A" => 'A', "B" => 'B', "C" => 'C', "D" => 'D', "E" => 'E', "F" => 'F',
    "G" => 'G', "H" => 'H', "I" => 'I', "J" => 'J', "K" => 'K', "L" => 'L',
    "M" => 'M', "N" => 'N', "O" => 'O', "P" => 'P', "Q" => 'Q', "R" => 'R',
    "S" => 'S', "T" => 'T', "U" => 'U', "V" => 'V', "W" => 'W', "X" => 'X',
    "Y" => 'Y', "Z" => 'Z',
    "bracketleft" => '[', "backslash" => '\\', "bracketright" => ']',
    "asciicircum" => '^', "underscore" => '_', "grave" => '`',
    "a" => 'a', "b" => 'b', "c" => 'c', "d" => 'd', "e" => 'e', "f" => 'f',
    "g" => 'g', "h" => 'h', "i" => 'i', "j" => 'j', "k" => 'k', "l" => 'l',
    "m" => 'm', "n" => 'n', "o" => 'o', "p" => 'p', "q" => 'q', "r" => 'r',
    "s" => 's', "t" => 't', "u" => 'u', "v" => 'v', "w" => 'w', "x" => 'x',
    "y" => 'y', "z" => 'z',
    "braceleft" => '{', "bar" => '|', "braceright" => '}', "asciitilde" => '~',
    "quoteleft" => '\u{2018}', "quoteright" => '\u{2019}',
    "quotesinglbase" => '\u{201A}', "quotedblleft" => '\u{201C}',
    "quotedblright" => '\u{201D}', "quotedblbase" => '\u{201E}',
    "guilsinglleft" => '\u{2039}', "guilsinglright" => '\u{203A}',
    "guillemotleft" => '\u{00AB}', "guillemotright" => '\u{00BB}',
    "endash" => '\u{2013}', "emdash" => '\u{2014}', "bullet" => '\u{2022}',
    "ellipsis" => '\u{2026}', "dagger" => '\u{2020}', "daggerdbl" => '\u{2021}',
    "perthousand" => '\u{2030}', "trademark" => '\u{2122}', "Euro" => '\u{20AC}',
    "florin" => '\u{0192}', "fraction" => '\u{2044}', "minus" => '\u{2212}',
    "fi" => '\u{FB01}', "fl" => '\u{FB02}', "ff" => '\u{FB00}',
    "ffi" => '\u{FB03}', "ffl" => '\u{FB04}',
    "circumflex" => '\u{02C6}', "tilde" => '\u{02DC}', "macron" => '\u{00AF}',
    "breve" => '\u{02D8}', "dotaccent" => '\u{02D9}', "ring" => '\u{02DA}',
    "cedilla" => '\u{00B8}', "hungarumlaut" => '\u{02DD}', "ogonek" => '\u{02DB}',
    "caron" => '\u{02C7}', "dieresis" => '\u{00A8}', "acute" => '\u{00B4}',
    "dotlessi" => '\u{0131}', "Lslash" => '\u{0141}', "lslash" => '\u{0142}',
    "OE" => '\u{0152}', "oe" => '\u{0153}', "Scaron" => '\u{0160}',
    "scaron" => '\u{0161}', "Ydieresis" => '\u{0178}', "Zcaron" => '\u{017D}',
    "zcaron" => '\u{017E}',
    "nbspace" => '\u{00A0}', "nonbreakingspace" => '\u{00A0}',
    "exclamdown" => '\u{00A1}', "cent" => '\u{00A2}', "sterling" => '\u{00A3}',
    "currency" => '\u{00A4}', "yen" => '\u{00A5}', "brokenbar" => '\u{00A6}',
    "section" => '\u{00A7}', "copyright" => '\u{00A9}', "ordfeminine" => '\u{00AA}',
    "logicalnot" => '\u{00AC}', "sfthyphen" => '\u{00AD}', "registered" => '\u{00AE}',
    "degree" => '\u{00B0}', "plusminus" => '\u{00B1}', "twosuperior" => '\u{00B2}',
    "threesuperior" => '\u{00B3}', "mu" => '\u{00B5}', "paragraph" => '\u{00B6}',
    "periodcentered" => '\u{00B7}', "onesuperior" => '\u{00B9}',
    "ordmasculine" => '\u{00BA}', "onequarter" => '\u{00BC}', "onehalf" => '\u{00BD}',
    "threequarters" => '\u{00BE}', "questiondown" => '\u{00BF}',
    "Agrave" => '\u{00C0}', "Aacute" => '\u{00C1}', "Acircumflex" => '\u{00C2}',
    "Atilde" => '\u{00C3}', "Adieresis" => '\u{00C4}', "Aring" => '\u{00C5}',
    "AE" => '\u{00C6}', "Ccedilla" => '\u{00C7}', "Egrave" => '\u{00C8}',
    "Eacute" => '\u{00C9}', "Ecircumflex" => '\u{00CA}', "Edieresis" => '\u{00CB}',
    "Igrave" => '\u{00CC}', "Iacute" => '\u{00CD}', "Icircumflex" => '\u{00CE}',
    "Idieresis" => '\u{00CF}', "Eth" => '\u{00D0}', "Ntilde" => '\u{00D1}',
    "Ograve" => '\u{00D2}', "Oacute" => '\u{00D3}', "Ocircumflex" => '\u{00D4}',
    "Otilde" => '\u{00D5}', "Odieresis" => '\u{00D6}', "multiply" => '\u{00D7}',
    "Oslash" => '\u{00D8}', "Ugrave" => '\u{00D9}', "Uacute" => '\u{00DA}',
    "Ucircumflex" => '\u{00DB}', "Udieresis" => '\u{00DC}', "Yacute" => '\u{00DD}',
    "Thorn" => '\u{00DE}', "germandbls" => '\u{00DF}',
    "agrave" => '\u{00E0}', "aacute" => '\u{00E1}', "acircumflex" => '\u{00E2}',
    "atilde" => '\u{00E3}', "adieresis" => '\u{00E4}', "aring" => '\u{00E5}',
    "ae" => '\u{00E6}', "ccedilla" => '\u{00E7}', "egrave" => '\u{00E8}',
    "eacute" => '\u{00E9}', "ecircumflex" => '\u{00EA}', "edieresis" => '\u{00EB}',
    "igrave" => '\u{00EC}', "iacute" => '\u{00ED}', "icircumflex" => '\u{00EE}',
    "idieresis" => '\u{00EF}', "eth" => '\u{00F0}', "ntilde" => '\u{00F1}',
    "ograve" => '\u{00F2}', "oacute" => '\u{00F3}', "ocircumflex" => '\u{00F4}',
    "otilde" => '\u{00F5}', "odieresis" => '\u{00F6}', "divide" => '\u{00F7}',
    "oslash" => '\u{00F8}', "ugrave" => '\u{00F9}', "uacute" => '\u{00FA}',
    "ucircumflex" => '\u{00FB}', "udieresis" => '\u{00FC}', "yacute" => '\u{00FD}',
    "thorn" => '\u{00FE}', "ydieresis" => '\u{00FF}',
    "notequal" => '\u{2260}', "infinity" => '\u{221E}', "lessequal" => '\u{2264}',
    "greaterequal" => '\u{2265}', "partialdiff" => '\u{2202}', "summation" => '\u{2211}',
    "product" => '\u{220F}', "pi" => '\u{03C0}', "integral" => '\u{222B}',
    "Omega" => '\u{2126}', "radical" => '\u{221A}', "approxequal" => '\u{2248}',
    "Delta" => '\u{2206}', "lozenge" => '\u{25CA}',
};

/// Resolve a glyph name to a Unicode character.
///
/// Suffixes after a period (`a.sc`, `one.oldstyle`) are ignored.
///
/// # Examples
///
/// ```
/// use pdf_textflow::fonts::glyph_name_to_unicode;
///
/// assert_eq!(glyph_name_to_unicode("eacute"), Some('é'));
/// assert_eq!(glyph_name_to_unicode("uni20AC"), Some('€'));
/// assert_eq!(glyph_name_to_unicode("g123"), None);
/// ```
pub fn glyph_name_to_unicode(name: &str) -> Option<char> {
    let base = name.split('.').next().unwrap_or(name);

    if let Some(&ch) = GLYPH_NAMES.get(base) {
        return Some(ch);
    }

    let hex = if let Some(hex) = base.strip_prefix("uni") {
        (hex.len() == 4).then_some(hex)
    } else if let Some(hex) = base.strip_prefix('u') {
        (4..=6).contains(&hex.len()).then_some(hex)
    } else {
        None
    }?;

    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}
