// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::should_implement_trait)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # PDF Textflow
//!
//! Interpreter for PDF page content streams: it tracks the graphics and
//! text state that operators set up and reports every shown string, with
//! its decoded text and baseline geometry, to a pluggable listener.
//!
//! ## Core Features
//!
//! - **Content stream tokenizer**: operators and typed operands, inline images, comments
//! - **State machine**: graphics state stack (`q`/`Q`), CTM, text and line matrices
//! - **Text operators**: `Tf Tc Tw Tz TL Tr Ts Td TD Tm T* Tj TJ ' "`, plus `gs`
//! - **Forms and marked content**: `Do` on form XObjects, `BMC`/`BDC`/`EMC` with MCIDs
//! - **Fonts**: simple fonts (standard encodings, `/Differences`, `/Widths`) and
//!   Type0 fonts (`Identity-H`, `/W`), ToUnicode CMaps
//! - **Text extraction**: space and line-break heuristics over render events
//!
//! ## Quick Start
//!
//! ```
//! use pdf_textflow::content::ContentProcessor;
//! use pdf_textflow::extractors::SimpleTextExtractor;
//! use pdf_textflow::fonts::{BaseEncoding, SimpleFont};
//! use pdf_textflow::resources::Resources;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let font = SimpleFont::new("Helvetica", BaseEncoding::WinAnsi).with_default_width(500.0);
//! let resources = Arc::new(Resources::new().with_font("F1", Arc::new(font)));
//!
//! let mut processor = ContentProcessor::new(SimpleTextExtractor::new());
//! processor.process(b"BT /F1 12 Tf 72 720 Td (Hello, World!) Tj ET", resources)?;
//! assert_eq!(processor.listener().text(), "Hello, World!");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! document ─► page content + resources
//!                 │
//!                 ▼
//!   content::ContentParser ─► content::ContentProcessor ─► RenderListener
//!                                   │         ▲                 │
//!                         GraphicsStateStack  fonts::Font       ▼
//!                                                     extractors::SimpleTextExtractor
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Core object model and tokenizer
pub mod lexer;
pub mod object;
pub mod parser;

// Stream decoders
pub mod decoders;

// Geometry
pub mod geometry;

// Content stream interpretation
pub mod content;
pub mod fonts;
pub mod resources;

// Text extraction
pub mod document;
pub mod extractors;

// Re-exports
pub use config::{ProcessorConfig, TextExtractionOptions};
pub use content::{ContentProcessor, RenderListener, TextRenderInfo};
pub use document::{DocumentSource, MemoryDocument, extract_document_text, extract_text};
pub use error::{Error, Result};
pub use extractors::{MarkedContentExtractor, SimpleTextExtractor};
pub use object::{Object, ObjectRef, ObjectResolver};
pub use resources::Resources;
