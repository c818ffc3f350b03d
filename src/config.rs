//! Configuration for content stream processing and text extraction.

use serde::{Deserialize, Serialize};

/// Limits and switches for [`ContentProcessor`](crate::content::ContentProcessor).
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    /// Maximum number of operations dispatched per content stream.
    /// `None` means unbounded.
    pub max_operations: Option<usize>,

    /// Maximum nesting of form XObjects invoked through `Do`.
    pub max_form_depth: u32,

    /// Interpret form XObjects. When false, `Do` on a form is skipped.
    pub process_forms: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessorConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            max_operations: None,
            max_form_depth: 8,
            process_forms: true,
        }
    }

    /// Bound the number of operations per content stream.
    pub fn with_max_operations(mut self, limit: usize) -> Self {
        self.max_operations = Some(limit);
        self
    }

    /// Set the maximum form XObject nesting depth.
    pub fn with_max_form_depth(mut self, depth: u32) -> Self {
        self.max_form_depth = depth;
        self
    }

    /// Enable or disable form XObject interpretation.
    pub fn with_process_forms(mut self, enable: bool) -> Self {
        self.process_forms = enable;
        self
    }
}

/// Options for [`SimpleTextExtractor`](crate::extractors::SimpleTextExtractor).
///
/// # Examples
///
/// ```
/// use pdf_textflow::config::TextExtractionOptions;
///
/// let options = TextExtractionOptions::new()
///     .with_skip_invisible(true)
///     .with_line_separator("\r\n");
/// assert_eq!(options.space_ratio, 0.5);
/// assert!(options.skip_invisible);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextExtractionOptions {
    /// A gap wider than this fraction of the single-space width inserts a space.
    pub space_ratio: f32,

    /// Perpendicular offset (user space units) that starts a new line.
    pub line_break_threshold: f32,

    /// Ignore text drawn with the invisible render mode (e.g. OCR layers).
    pub skip_invisible: bool,

    /// Text written for a hard line break.
    pub line_separator: String,
}

impl Default for TextExtractionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractionOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self {
            space_ratio: 0.5,
            line_break_threshold: 1.0,
            skip_invisible: false,
            line_separator: "\n".to_string(),
        }
    }

    /// Set the space insertion ratio.
    pub fn with_space_ratio(mut self, ratio: f32) -> Self {
        self.space_ratio = ratio;
        self
    }

    /// Set the line break threshold.
    pub fn with_line_break_threshold(mut self, threshold: f32) -> Self {
        self.line_break_threshold = threshold;
        self
    }

    /// Skip or keep invisible text.
    pub fn with_skip_invisible(mut self, skip: bool) -> Self {
        self.skip_invisible = skip;
        self
    }

    /// Set the line separator.
    pub fn with_line_separator(mut self, separator: impl Into<String>) -> Self {
        self.line_separator = separator.into();
        self
    }
}
