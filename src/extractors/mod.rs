//! Render listeners that turn text events into extracted text.

pub mod marked;
pub mod text;

pub use marked::{MarkedContentExtractor, MarkedSection, Word};
pub use text::SimpleTextExtractor;

use crate::geometry::Point;

/// Whether `start` lies more than `threshold` off the line through the
/// previous baseline. A degenerate previous baseline falls back to the
/// distance between start points.
pub(crate) fn starts_new_line(last_start: &Point, last_end: &Point, start: &Point, threshold: f32) -> bool {
    let distance = start
        .distance_to_line(last_start, last_end)
        .unwrap_or_else(|| start.distance(last_start));
    distance > threshold
}
