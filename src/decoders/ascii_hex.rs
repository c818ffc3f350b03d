//! ASCIIHexDecode implementation.
//!
//! Whitespace is ignored, `>` ends the data, and an odd final digit is
//! padded with an implicit '0'.

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};

/// ASCIIHexDecode filter implementation.
pub struct AsciiHexDecoder;

impl StreamDecoder for AsciiHexDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len() / 2);
        let mut pending: Option<u8> = None;

        for &c in input {
            if c == b'>' {
                break;
            }
            if c.is_ascii_whitespace() || c == 0x00 {
                continue;
            }
            let nibble = hex_digit_to_value(c).ok_or_else(|| {
                Error::Decode(format!("ASCIIHexDecode: invalid hex digit '{}'", c as char))
            })?;
            match pending.take() {
                Some(high) => output.push((high << 4) | nibble),
                None => pending = Some(nibble),
            }
        }

        if let Some(high) = pending {
            output.push(high << 4);
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        "ASCIIHexDecode"
    }
}

fn hex_digit_to_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_whitespace() {
        let output = AsciiHexDecoder.decode(b"48 65 6C\n6C 6F").unwrap();
        assert_eq!(output, b"Hello");
    }

    #[test]
    fn test_decode_odd_length() {
        let output = AsciiHexDecoder.decode(b"486").unwrap();
        assert_eq!(output, vec![0x48, 0x60]);
    }

    #[test]
    fn test_decode_stops_at_eod() {
        let output = AsciiHexDecoder.decode(b"41>42").unwrap();
        assert_eq!(output, b"A");
    }

    #[test]
    fn test_decode_invalid_digit() {
        let result = AsciiHexDecoder.decode(b"4G");
        assert!(matches!(result, Err(Error::Decode(_))));
    }
}
