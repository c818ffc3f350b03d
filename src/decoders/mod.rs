//! Stream filters needed to read page and form content.
//!
//! Content streams are almost always FlateDecode-compressed; ASCIIHexDecode
//! turns up in hand-written and test documents. Other filters apply to
//! images and are reported as [`Error::UnsupportedFilter`].

use crate::error::{Error, Result};

mod ascii_hex;
mod flate;

pub use ascii_hex::AsciiHexDecoder;
pub use flate::FlateDecoder;

/// Upper bound on decoded content size (decompression bomb protection).
const MAX_DECODED_SIZE: usize = 100 * 1024 * 1024;

/// A single PDF stream filter.
pub trait StreamDecoder {
    /// Decode the input data.
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Filter name as it appears in `/Filter` (e.g. "FlateDecode").
    fn name(&self) -> &str;
}

fn decoder_for(filter: &str) -> Result<Box<dyn StreamDecoder>> {
    match filter {
        "FlateDecode" | "Fl" => Ok(Box::new(FlateDecoder)),
        "ASCIIHexDecode" | "AHx" => Ok(Box::new(AsciiHexDecoder)),
        other => Err(Error::UnsupportedFilter(other.to_string())),
    }
}

/// Decode stream data by applying each filter in order.
///
/// # Examples
///
/// ```
/// use pdf_textflow::decoders::decode_stream_data;
///
/// let decoded = decode_stream_data(b"42 54 20 45 54>", &["ASCIIHexDecode".to_string()]).unwrap();
/// assert_eq!(decoded, b"BT ET");
/// ```
pub fn decode_stream_data(data: &[u8], filters: &[String]) -> Result<Vec<u8>> {
    let mut current = data.to_vec();

    for filter in filters {
        let decoder = decoder_for(filter)?;
        current = decoder.decode(&current)?;
        log::trace!("{} produced {} bytes", decoder.name(), current.len());

        if current.len() > MAX_DECODED_SIZE {
            return Err(Error::Decode(format!(
                "{} output exceeds {} bytes",
                decoder.name(),
                MAX_DECODED_SIZE
            )));
        }
    }

    Ok(current)
}
