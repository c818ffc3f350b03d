//! FlateDecode (zlib/deflate) implementation.

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use std::io::Read;

/// FlateDecode filter implementation.
///
/// Tries a zlib stream first. If that fails outright, retries the data as
/// raw deflate, which recovers streams with a damaged zlib header. Data
/// recovered before a corruption point is kept.
pub struct FlateDecoder;

impl StreamDecoder for FlateDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let zlib_err = match ZlibDecoder::new(input).read_to_end(&mut output) {
            Ok(_) => return Ok(output),
            Err(e) => e,
        };

        if !output.is_empty() {
            log::warn!(
                "FlateDecode partial recovery: extracted {} bytes before corruption: {}",
                output.len(),
                zlib_err
            );
            return Ok(output);
        }

        log::info!("Zlib decode failed, trying raw deflate");
        output.clear();
        match DeflateDecoder::new(input).read_to_end(&mut output) {
            Ok(_) if !output.is_empty() => {
                log::info!("Raw deflate recovery succeeded: {} bytes", output.len());
                Ok(output)
            },
            Err(_) if !output.is_empty() => {
                log::warn!("Raw deflate partial recovery: {} bytes", output.len());
                Ok(output)
            },
            _ => Err(Error::Decode(format!("FlateDecode: {}", zlib_err))),
        }
    }

    fn name(&self) -> &str {
        "FlateDecode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::{DeflateEncoder, ZlibEncoder};
    use std::io::Write;

    #[test]
    fn test_flate_decode_zlib() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"BT /F1 12 Tf (Hello) Tj ET").unwrap();
        let compressed = encoder.finish().unwrap();

        let output = FlateDecoder.decode(&compressed).unwrap();
        assert_eq!(output, b"BT /F1 12 Tf (Hello) Tj ET");
    }

    #[test]
    fn test_flate_decode_raw_deflate_fallback() {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"q 1 0 0 1 0 0 cm Q").unwrap();
        let compressed = encoder.finish().unwrap();

        let output = FlateDecoder.decode(&compressed).unwrap();
        assert_eq!(output, b"q 1 0 0 1 0 0 cm Q");
    }

    #[test]
    fn test_flate_decode_garbage() {
        assert!(FlateDecoder.decode(b"\xff\xff\xff\xff").is_err());
    }
}
