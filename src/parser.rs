//! Operand parser.
//!
//! Builds [`Object`] values from lexer tokens: numbers, decoded strings,
//! names, booleans, null, and (nested) arrays and dictionaries. Operator
//! keywords are not operands; meeting one where a value is expected is a
//! parse failure, which the content parser turns into a skip.

use crate::lexer::{self, Token, hex_value};
use crate::object::{Dictionary, Object};
use nom::IResult;

/// Maximum nesting of arrays and dictionaries inside one operand.
const MAX_NESTING: usize = 64;

/// Decode escape sequences in a literal string.
///
/// Handles `\n \r \t \b \f \( \) \\`, octal `\ddd` (1-3 digits), and line
/// continuation (backslash before an end-of-line). A backslash before any
/// other character is dropped.
pub fn decode_literal_string_escapes(raw: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] != b'\\' {
            result.push(raw[i]);
            i += 1;
            continue;
        }
        let Some(&next) = raw.get(i + 1) else {
            break;
        };
        i += 2;
        match next {
            b'n' => result.push(b'\n'),
            b'r' => result.push(b'\r'),
            b't' => result.push(b'\t'),
            b'b' => result.push(0x08),
            b'f' => result.push(0x0C),
            b'\n' => {},
            b'\r' => {
                if raw.get(i) == Some(&b'\n') {
                    i += 1;
                }
            },
            b'0'..=b'7' => {
                let mut octal = (next - b'0') as u32;
                for _ in 0..2 {
                    match raw.get(i) {
                        Some(&d @ b'0'..=b'7') => {
                            octal = octal * 8 + (d - b'0') as u32;
                            i += 1;
                        },
                        _ => break,
                    }
                }
                result.push((octal & 0xFF) as u8);
            },
            other => result.push(other),
        }
    }

    result
}

/// Decode a hexadecimal string body. Whitespace is ignored and an odd
/// trailing digit is padded with 0.
///
/// # Examples
///
/// ```
/// # use pdf_textflow::parser::decode_hex;
/// assert_eq!(decode_hex(b"48 65 6C"), b"Hel");
/// assert_eq!(decode_hex(b"901FA"), vec![0x90, 0x1F, 0xA0]);
/// ```
pub fn decode_hex(hex_bytes: &[u8]) -> Vec<u8> {
    let digits: Vec<u8> = hex_bytes
        .iter()
        .copied()
        .filter(u8::is_ascii_hexdigit)
        .map(hex_value)
        .collect();

    digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

fn fail(input: &[u8], kind: nom::error::ErrorKind) -> nom::Err<nom::error::Error<&[u8]>> {
    nom::Err::Error(nom::error::Error::new(input, kind))
}

/// Parse one operand value.
///
/// # Errors
///
/// Fails if the next token is an operator keyword, an unexpected closing
/// delimiter, or the input is exhausted inside an array or dictionary.
pub fn parse_operand(input: &[u8]) -> IResult<&[u8], Object> {
    let (rest, tok) = lexer::token(input)?;
    operand_from_token(tok, rest, input, 0)
}

/// Finish an operand whose first token has already been read.
pub(crate) fn operand_from_token<'a>(
    tok: Token<'a>,
    rest: &'a [u8],
    start: &'a [u8],
    depth: usize,
) -> IResult<&'a [u8], Object> {
    match tok {
        Token::Integer(i) => Ok((rest, Object::Integer(i))),
        Token::Real(r) => Ok((rest, Object::Real(r))),
        Token::LiteralString(raw) => Ok((rest, Object::String(decode_literal_string_escapes(raw)))),
        Token::HexString(raw) => Ok((rest, Object::String(decode_hex(raw)))),
        Token::Name(name) => Ok((rest, Object::Name(name))),
        Token::True => Ok((rest, Object::Boolean(true))),
        Token::False => Ok((rest, Object::Boolean(false))),
        Token::Null => Ok((rest, Object::Null)),
        Token::ArrayStart => parse_array_body(rest, depth + 1),
        Token::DictStart => parse_dictionary_body(rest, depth + 1),
        Token::ArrayEnd | Token::DictEnd | Token::Keyword(_) => {
            Err(fail(start, nom::error::ErrorKind::Verify))
        },
    }
}

fn parse_array_body(input: &[u8], depth: usize) -> IResult<&[u8], Object> {
    if depth > MAX_NESTING {
        return Err(fail(input, nom::error::ErrorKind::TooLarge));
    }
    let mut items = Vec::new();
    let mut remaining = input;
    loop {
        let (rest, tok) = lexer::token(remaining)?;
        if tok == Token::ArrayEnd {
            return Ok((rest, Object::Array(items)));
        }
        let (rest, item) = operand_from_token(tok, rest, remaining, depth)?;
        items.push(item);
        remaining = rest;
    }
}

fn parse_dictionary_body(input: &[u8], depth: usize) -> IResult<&[u8], Object> {
    if depth > MAX_NESTING {
        return Err(fail(input, nom::error::ErrorKind::TooLarge));
    }
    let mut dict = Dictionary::new();
    let mut remaining = input;
    loop {
        let (rest, tok) = lexer::token(remaining)?;
        let key = match tok {
            Token::DictEnd => return Ok((rest, Object::Dictionary(dict))),
            Token::Name(key) => key,
            _ => return Err(fail(remaining, nom::error::ErrorKind::Verify)),
        };
        let (rest, value) = parse_nested(rest, depth)?;
        dict.insert(key, value);
        remaining = rest;
    }
}

fn parse_nested(input: &[u8], depth: usize) -> IResult<&[u8], Object> {
    let (rest, tok) = lexer::token(input)?;
    operand_from_token(tok, rest, input, depth)
}
