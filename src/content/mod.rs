//! Content stream parsing and execution.
//!
//! Content streams are sequences of operators that describe what is
//! painted on a page or form. This module tokenizes them
//! ([`ContentParser`]), tracks the graphics and text state they set up
//! ([`GraphicsStateStack`], [`Matrix`]), and turns every shown string into
//! a [`TextRenderInfo`] for a [`RenderListener`] ([`ContentProcessor`]).

pub mod graphics_state;
pub mod operators;
pub mod parser;
pub mod processor;
pub mod render;

pub use graphics_state::{GraphicsState, GraphicsStateStack, Matrix, RenderMode};
pub use operators::{OperatorKind, OperatorRegistry};
pub use parser::{ContentParser, Operation, parse_content_stream};
pub use processor::ContentProcessor;
pub use render::{CollectingListener, MarkedContent, RenderListener, TextRenderInfo};
