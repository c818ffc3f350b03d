//! Content stream parser.
//!
//! Content streams use postfix notation: operands precede the operator.
//!
//! ```text
//! BT
//!   /F1 12 Tf
//!   100 700 Td
//!   (Hello, World!) Tj
//! ET
//! ```
//!
//! [`ContentParser`] walks the bytes once and yields one [`Operation`] per
//! operator, in document order. Bytes that cannot start any token are
//! skipped one at a time with a warning.

use crate::lexer::{self, Token, is_regular};
use crate::object::{Dictionary, Object};
use crate::parser::{operand_from_token, parse_operand};

/// One operator together with the operands that preceded it.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Operator mnemonic, e.g. "Tj"
    pub operator: String,
    /// Operands in stream order
    pub operands: Vec<Object>,
}

impl Operation {
    /// Create an operation.
    pub fn new(operator: impl Into<String>, operands: Vec<Object>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }
}

/// Streaming content parser.
///
/// # Examples
///
/// ```
/// use pdf_textflow::content::ContentParser;
///
/// let ops: Vec<_> = ContentParser::new(b"BT /F1 12 Tf (Hi) Tj ET").collect();
/// let names: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();
/// assert_eq!(names, vec!["BT", "Tf", "Tj", "ET"]);
/// ```
#[derive(Debug, Clone)]
pub struct ContentParser<'a> {
    data: &'a [u8],
    remaining: &'a [u8],
}

impl<'a> ContentParser<'a> {
    /// Create a parser over decoded content bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            remaining: data,
        }
    }

    /// Byte offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.data.len() - self.remaining.len()
    }

    fn skip_bad_byte(&mut self, at: &'a [u8]) {
        log::warn!(
            "Skipping unparseable content byte 0x{:02x} at offset {}",
            at[0],
            self.data.len() - at.len()
        );
        self.remaining = &at[1..];
    }

    fn parse_inline_image(&mut self) -> Operation {
        let mut dict = Dictionary::new();

        loop {
            let (rest, tok) = match lexer::token(self.remaining) {
                Ok(r) => r,
                Err(_) => {
                    log::warn!("Inline image dictionary not terminated by ID");
                    self.remaining = &[];
                    return Operation::new("BI", vec![Object::Dictionary(dict)]);
                },
            };
            match tok {
                Token::Keyword(b"ID") => {
                    self.remaining = rest;
                    break;
                },
                Token::Name(key) => match parse_operand(rest) {
                    Ok((rest, value)) => {
                        dict.insert(key, value);
                        self.remaining = rest;
                    },
                    Err(_) => self.remaining = rest,
                },
                _ => self.remaining = rest,
            }
        }

        // A single whitespace byte separates ID from the data
        if self.remaining.first().is_some_and(|c| c.is_ascii_whitespace()) {
            self.remaining = &self.remaining[1..];
        }

        let data = match find_end_image(self.remaining) {
            Some(pos) => {
                let data = self.remaining[..pos].to_vec();
                self.remaining = &self.remaining[pos + 3..];
                data
            },
            None => {
                log::warn!("Inline image data not terminated by EI");
                let data = self.remaining.to_vec();
                self.remaining = &[];
                data
            },
        };

        Operation::new("BI", vec![Object::Dictionary(dict), Object::String(data)])
    }
}

/// Position of the whitespace byte that precedes a standalone `EI`.
fn find_end_image(input: &[u8]) -> Option<usize> {
    input.windows(3).enumerate().find_map(|(i, window)| {
        let standalone = input.get(i + 3).map_or(true, |&c| !is_regular(c));
        (window[0].is_ascii_whitespace() && &window[1..] == b"EI" && standalone).then_some(i)
    })
}

impl<'a> Iterator for ContentParser<'a> {
    type Item = Operation;

    fn next(&mut self) -> Option<Operation> {
        let mut operands = Vec::new();

        loop {
            let start = lexer::skip_ws(self.remaining);
            if start.is_empty() {
                if !operands.is_empty() {
                    log::debug!("Discarding {} trailing operands", operands.len());
                }
                self.remaining = start;
                return None;
            }

            let (rest, tok) = match lexer::token(start) {
                Ok(r) => r,
                Err(_) => {
                    self.skip_bad_byte(start);
                    continue;
                },
            };

            if let Token::Keyword(keyword) = tok {
                self.remaining = rest;
                if keyword == b"BI" {
                    return Some(self.parse_inline_image());
                }
                let operator = String::from_utf8_lossy(keyword).into_owned();
                return Some(Operation::new(operator, operands));
            }

            match operand_from_token(tok, rest, start, 0) {
                Ok((rest, operand)) => {
                    operands.push(operand);
                    self.remaining = rest;
                },
                Err(_) => self.skip_bad_byte(start),
            }
        }
    }
}

/// Parse a whole content stream into operations.
pub fn parse_content_stream(data: &[u8]) -> Vec<Operation> {
    ContentParser::new(data).collect()
}
