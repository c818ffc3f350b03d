//! Content-stream lexer.
//!
//! Splits raw page-description bytes into tokens: numbers, literal and
//! hexadecimal strings, names, array/dictionary delimiters, and bare
//! keywords. Operators (`Tj`, `T*`, `'`, ...) are bare keywords; so are
//! `true`, `false` and `null`, which the lexer classifies separately so
//! the operand parser can turn them into values.
//!
//! Whitespace (space, \t, \r, \n, \0, \f) and comments (% to EOL) are skipped.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_till, take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{map, opt, value},
    sequence::{delimited, preceded},
};

/// Token types recognized in a content stream.
#[derive(Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Integer number (e.g., 42, -123)
    Integer(i64),

    /// Real number (e.g., 3.14, -.5)
    Real(f64),

    /// Literal string bytes, escapes not yet decoded
    LiteralString(&'a [u8]),

    /// Hexadecimal string digits, whitespace preserved
    HexString(&'a [u8]),

    /// Name without the leading slash, `#xx` escapes decoded
    Name(String),

    /// `true`
    True,

    /// `false`
    False,

    /// `null`
    Null,

    /// `[`
    ArrayStart,

    /// `]`
    ArrayEnd,

    /// `<<`
    DictStart,

    /// `>>`
    DictEnd,

    /// Any other run of regular characters: an operator mnemonic
    Keyword(&'a [u8]),
}

#[inline]
fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n' | 0x00 | 0x0C)
}

#[inline]
fn is_delimiter(c: u8) -> bool {
    matches!(c, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

/// Regular characters are everything that is neither whitespace nor a delimiter.
#[inline]
pub fn is_regular(c: u8) -> bool {
    !is_whitespace(c) && !is_delimiter(c)
}

fn comment(input: &[u8]) -> IResult<&[u8], ()> {
    value((), preceded(char('%'), take_till(|c| c == b'\r' || c == b'\n')))(input)
}

/// Skip all whitespace and comments. Never fails.
pub fn skip_ws(input: &[u8]) -> &[u8] {
    let mut remaining = input;
    loop {
        let (rest, ws) = match take_while::<_, _, nom::error::Error<&[u8]>>(is_whitespace)(remaining) {
            Ok(r) => r,
            Err(_) => return remaining,
        };
        remaining = rest;
        match comment(remaining) {
            Ok((rest, _)) => remaining = rest,
            Err(_) if ws.is_empty() => return remaining,
            Err(_) => {},
        }
    }
}

fn digit_error(input: &[u8]) -> nom::Err<nom::error::Error<&[u8]>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
}

/// Parse an integer or real number.
///
/// Accepts a leading sign and reals starting or ending with the decimal
/// point (`.5`, `5.`). A number must not run straight into further regular
/// characters, so `1st` is a keyword, not `1` followed by `st`.
fn parse_number(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let start = input;
    let (input, sign) = opt(one_of("+-"))(input)?;
    let (input, int_part) = opt(digit1)(input)?;
    let (input, frac_part) = opt(preceded(char('.'), opt(digit1)))(input)?;

    if int_part.is_none() && !matches!(frac_part, Some(Some(_))) {
        return Err(digit_error(start));
    }
    if input.first().is_some_and(|&c| is_regular(c)) {
        return Err(digit_error(start));
    }

    let negative = sign == Some('-');
    let int_str = match int_part {
        Some(digits) => std::str::from_utf8(digits).map_err(|_| digit_error(start))?,
        None => "0",
    };

    match frac_part {
        Some(frac) => {
            let frac_str = match frac {
                Some(digits) => std::str::from_utf8(digits).map_err(|_| digit_error(start))?,
                None => "0",
            };
            let num: f64 = format!("{}.{}", int_str, frac_str)
                .parse()
                .map_err(|_| digit_error(start))?;
            Ok((input, Token::Real(if negative { -num } else { num })))
        },
        None => match int_str.parse::<i64>() {
            Ok(num) => Ok((input, Token::Integer(if negative { -num } else { num }))),
            // Out of i64 range; keep the magnitude as a real
            Err(_) => {
                let num: f64 = int_str.parse().map_err(|_| digit_error(start))?;
                Ok((input, Token::Real(if negative { -num } else { num })))
            },
        },
    }
}

/// Parse a literal string enclosed in parentheses, tracking nesting depth.
///
/// Returns the raw bytes between the outer parentheses; escape sequences
/// are decoded by the operand parser.
fn parse_literal_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (remaining, _) = char('(')(input)?;
    let mut depth = 1;
    let mut pos = 0;

    while depth > 0 && pos < remaining.len() {
        match remaining[pos] {
            b'\\' => pos += 2,
            b'(' => {
                depth += 1;
                pos += 1;
            },
            b')' => {
                depth -= 1;
                pos += 1;
            },
            _ => pos += 1,
        }
    }

    if depth != 0 || pos > remaining.len() {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)));
    }

    Ok((&remaining[pos..], Token::LiteralString(&remaining[..pos - 1])))
}

/// Parse a hexadecimal string enclosed in angle brackets.
fn parse_hex_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    if input.starts_with(b"<<") {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)));
    }

    delimited(
        char('<'),
        map(
            take_while(|c: u8| c.is_ascii_hexdigit() || is_whitespace(c)),
            Token::HexString,
        ),
        char('>'),
    )(input)
}

/// Decode `#XX` escape sequences in names.
///
/// Invalid sequences are preserved literally.
///
/// # Examples
///
/// ```
/// # use pdf_textflow::lexer::decode_name_escapes;
/// assert_eq!(decode_name_escapes("A#20B#23C"), "A B#C");
/// assert_eq!(decode_name_escapes("F1"), "F1");
/// assert_eq!(decode_name_escapes("A#"), "A#");
/// ```
pub fn decode_name_escapes(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut result = String::with_capacity(name.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'#'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            let byte = (hex_value(bytes[i + 1]) << 4) | hex_value(bytes[i + 2]);
            result.push(byte as char);
            i += 3;
            continue;
        }
        // Push the full UTF-8 character starting here
        let ch_len = name[i..].chars().next().map(char::len_utf8).unwrap_or(1);
        result.push_str(&name[i..i + ch_len]);
        i += ch_len;
    }

    result
}

/// Value of an ASCII hex digit. Callers check `is_ascii_hexdigit` first.
#[inline]
pub(crate) fn hex_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

fn parse_name(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    preceded(
        char('/'),
        map(take_while(is_regular), |bytes: &[u8]| {
            let name_str = String::from_utf8_lossy(bytes);
            Token::Name(decode_name_escapes(&name_str))
        }),
    )(input)
}

fn parse_delimiter(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    alt((
        value(Token::DictStart, tag(b"<<")),
        value(Token::DictEnd, tag(b">>")),
        value(Token::ArrayStart, tag(b"[")),
        value(Token::ArrayEnd, tag(b"]")),
    ))(input)
}

fn parse_brace(input: &[u8]) -> IResult<&[u8], &[u8]> {
    alt((tag(b"{"), tag(b"}")))(input)
}

fn parse_keyword(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    map(alt((take_while1(is_regular), parse_brace)), |word: &[u8]| match word {
        b"true" => Token::True,
        b"false" => Token::False,
        b"null" => Token::Null,
        other => Token::Keyword(other),
    })(input)
}

/// Parse a single token after skipping whitespace and comments.
///
/// # Errors
///
/// Returns `Err` at end of input, or when the input starts with bytes
/// that cannot begin any token (a stray `)` or an unterminated string).
pub fn token(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let input = skip_ws(input);

    alt((
        parse_name,
        parse_number,
        parse_literal_string,
        parse_delimiter,
        parse_hex_string,
        parse_keyword,
    ))(input)
}
