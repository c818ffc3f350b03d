//! Content stream processor.
//!
//! [`ContentProcessor`] executes one content stream: it owns the graphics
//! state stack, the text matrices and the marked-content stack, dispatches
//! each operation through an [`OperatorRegistry`], and hands one
//! [`TextRenderInfo`] per shown string to a [`RenderListener`].
//!
//! ```text
//! bytes ─► ContentParser ─► (operator, operands) ─► registry lookup
//!                                                      │
//!        GraphicsStateStack / text matrices ◄──────────┤
//!                                                      ▼
//!                                     TextRenderInfo ─► RenderListener
//! ```

use super::graphics_state::{GraphicsState, GraphicsStateStack, Matrix, RenderMode};
use super::operators::{OperatorKind, OperatorRegistry};
use super::parser::{ContentParser, Operation};
use super::render::{MarkedContent, RenderListener, TextRenderInfo};
use crate::config::ProcessorConfig;
use crate::error::{Error, Result};
use crate::object::Object;
use crate::resources::{Resources, XObject};
use std::sync::Arc;

/// Text matrix and text line matrix; present only inside `BT`/`ET`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TextMatrices {
    text: Matrix,
    line: Matrix,
}

/// One open `BMC`/`BDC` sequence.
#[derive(Debug, Clone, PartialEq)]
struct MarkedSequence {
    tag: String,
    mcid: Option<i64>,
}

/// Interpreter for one content stream at a time.
///
/// # Examples
///
/// ```
/// use pdf_textflow::content::{CollectingListener, ContentProcessor};
/// use pdf_textflow::fonts::{BaseEncoding, SimpleFont};
/// use pdf_textflow::resources::Resources;
/// use std::sync::Arc;
///
/// let font = SimpleFont::new("Helvetica", BaseEncoding::WinAnsi).with_default_width(500.0);
/// let resources = Arc::new(Resources::new().with_font("F1", Arc::new(font)));
///
/// let mut processor = ContentProcessor::new(CollectingListener::new());
/// processor.process(b"BT /F1 12 Tf 100 700 Td (Hello) Tj ET", resources).unwrap();
///
/// let events = &processor.listener().events;
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].text(), "Hello");
/// ```
#[derive(Debug)]
pub struct ContentProcessor<L: RenderListener> {
    registry: Arc<OperatorRegistry>,
    config: ProcessorConfig,
    listener: L,
    initial_state: GraphicsState,
    stack: GraphicsStateStack,
    text: Option<TextMatrices>,
    resources: Option<Arc<Resources>>,
    marked: Vec<MarkedSequence>,
    form_depth: u32,
    operation_count: usize,
}

impl<L: RenderListener> ContentProcessor<L> {
    /// Create a processor with every supported operator registered.
    pub fn new(listener: L) -> Self {
        Self {
            registry: Arc::new(OperatorRegistry::with_defaults()),
            config: ProcessorConfig::default(),
            listener,
            initial_state: GraphicsState::new(),
            stack: GraphicsStateStack::new(),
            text: None,
            resources: None,
            marked: Vec::new(),
            form_depth: 0,
            operation_count: 0,
        }
    }

    /// Replace the operator registry.
    pub fn with_registry(mut self, registry: OperatorRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Replace the processing limits.
    pub fn with_config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    /// Graphics state each content stream starts from.
    pub fn with_initial_state(mut self, state: GraphicsState) -> Self {
        self.stack = GraphicsStateStack::with_base(state.clone());
        self.initial_state = state;
        self
    }

    /// Clear all per-stream state and the listener's output.
    pub fn reset(&mut self) {
        self.reset_state();
        self.listener.reset();
    }

    fn reset_state(&mut self) {
        self.stack = GraphicsStateStack::with_base(self.initial_state.clone());
        self.text = None;
        self.resources = None;
        self.marked.clear();
        self.operation_count = 0;
    }

    /// Tokenize and execute one content stream.
    ///
    /// # Errors
    ///
    /// The first operator error aborts the stream: malformed operands,
    /// stack underflow, text object violations, missing resources, or an
    /// exceeded operation or form nesting limit. Events delivered before
    /// the error stay with the listener.
    pub fn process(&mut self, content: &[u8], resources: Arc<Resources>) -> Result<()> {
        self.process_operations(ContentParser::new(content), resources)
    }

    /// Execute an already tokenized content stream.
    pub fn process_operations<I>(&mut self, operations: I, resources: Arc<Resources>) -> Result<()>
    where
        I: IntoIterator<Item = Operation>,
    {
        self.reset();
        self.resources = Some(resources);
        self.run(operations)
    }

    fn run<I>(&mut self, operations: I) -> Result<()>
    where
        I: IntoIterator<Item = Operation>,
    {
        for operation in operations {
            self.operation_count += 1;
            if let Some(limit) = self.config.max_operations {
                if self.operation_count > limit {
                    return Err(Error::OperationLimitExceeded(limit));
                }
            }
            self.invoke_operator(&operation.operator, &operation.operands)?;
        }
        Ok(())
    }

    /// Execute a single operator against the current state.
    ///
    /// Operators missing from the registry are skipped.
    pub fn invoke_operator(&mut self, operator: &str, operands: &[Object]) -> Result<()> {
        let Some(kind) = self.registry.lookup(operator) else {
            log::trace!("Skipping unregistered operator '{}'", operator);
            return Ok(());
        };

        if kind.requires_text_object() && self.text.is_none() {
            return Err(Error::TextObjectViolation {
                operator: operator.to_string(),
                reason: "outside of a BT/ET text object".to_string(),
            });
        }

        match kind {
            OperatorKind::SaveState => {
                arity(operator, operands, 0)?;
                self.stack.push();
            },
            OperatorKind::RestoreState => {
                arity(operator, operands, 0)?;
                self.stack.pop()?;
            },
            OperatorKind::ConcatMatrix => {
                let m = matrix_operand(operator, operands)?;
                let state = self.stack.top_mut();
                state.ctm = m.multiply(&state.ctm);
            },
            OperatorKind::SetExtGState => {
                arity(operator, operands, 1)?;
                let name = name_operand(operator, &operands[0])?;
                let resources = self.active_resources();
                let gs = resources
                    .ext_g_state(name)
                    .ok_or_else(|| Error::missing("ExtGState", name))?;
                if let Some((font, size)) = &gs.font {
                    let state = self.stack.top_mut();
                    state.font = Some(Arc::clone(font));
                    state.font_size = *size;
                }
            },

            OperatorKind::SetCharSpacing => {
                self.stack.top_mut().char_spacing = single_number(operator, operands)?;
            },
            OperatorKind::SetWordSpacing => {
                self.stack.top_mut().word_spacing = single_number(operator, operands)?;
            },
            OperatorKind::SetHorizontalScaling => {
                self.stack.top_mut().horizontal_scaling = single_number(operator, operands)? / 100.0;
            },
            OperatorKind::SetLeading => {
                self.stack.top_mut().leading = single_number(operator, operands)?;
            },
            OperatorKind::SetRise => {
                self.stack.top_mut().rise = single_number(operator, operands)?;
            },
            OperatorKind::SetRenderMode => {
                arity(operator, operands, 1)?;
                let mode = operands[0]
                    .as_integer()
                    .and_then(RenderMode::from_code)
                    .ok_or_else(|| Error::malformed(operator, "render mode must be an integer 0-7"))?;
                self.stack.top_mut().render_mode = mode;
            },
            OperatorKind::SetFont => {
                arity(operator, operands, 2)?;
                let name = name_operand(operator, &operands[0])?;
                let size = number_operand(operator, &operands[1])?;
                let resources = self.active_resources();
                let font = resources
                    .font(name)
                    .ok_or_else(|| Error::missing("Font", name))?;
                let state = self.stack.top_mut();
                state.font = Some(Arc::clone(font));
                state.font_size = size;
            },

            OperatorKind::BeginText => {
                arity(operator, operands, 0)?;
                if self.text.is_some() {
                    return Err(Error::TextObjectViolation {
                        operator: operator.to_string(),
                        reason: "nested BT".to_string(),
                    });
                }
                self.text = Some(TextMatrices {
                    text: Matrix::identity(),
                    line: Matrix::identity(),
                });
            },
            OperatorKind::EndText => {
                arity(operator, operands, 0)?;
                self.text = None;
            },
            OperatorKind::MoveText => {
                arity(operator, operands, 2)?;
                let tx = number_operand(operator, &operands[0])?;
                let ty = number_operand(operator, &operands[1])?;
                self.move_text(operator, tx, ty)?;
            },
            OperatorKind::MoveTextSetLeading => {
                arity(operator, operands, 2)?;
                let tx = number_operand(operator, &operands[0])?;
                let ty = number_operand(operator, &operands[1])?;
                self.stack.top_mut().leading = -ty;
                self.move_text(operator, tx, ty)?;
            },
            OperatorKind::SetTextMatrix => {
                let m = matrix_operand(operator, operands)?;
                self.text = Some(TextMatrices { text: m, line: m });
            },
            OperatorKind::NextLine => {
                arity(operator, operands, 0)?;
                self.next_line(operator)?;
            },

            OperatorKind::ShowText => {
                arity(operator, operands, 1)?;
                let bytes = string_operand(operator, &operands[0])?;
                self.show_text(operator, bytes)?;
            },
            OperatorKind::ShowTextArray => {
                arity(operator, operands, 1)?;
                let elements = operands[0]
                    .as_array()
                    .ok_or_else(|| Error::malformed(operator, "expected an array"))?;
                for element in elements {
                    match element {
                        Object::String(bytes) => self.show_text(operator, bytes)?,
                        Object::Integer(_) | Object::Real(_) => {
                            let n = number_operand(operator, element)?;
                            self.adjust_text_position(operator, n)?;
                        },
                        other => {
                            return Err(Error::malformed(
                                operator,
                                format!("array element is {}", other.type_name()),
                            ));
                        },
                    }
                }
            },
            OperatorKind::NextLineShowText => {
                arity(operator, operands, 1)?;
                let bytes = string_operand(operator, &operands[0])?;
                self.next_line(operator)?;
                self.show_text(operator, bytes)?;
            },
            OperatorKind::NextLineShowTextSpaced => {
                arity(operator, operands, 3)?;
                let aw = number_operand(operator, &operands[0])?;
                let ac = number_operand(operator, &operands[1])?;
                let bytes = string_operand(operator, &operands[2])?;
                let state = self.stack.top_mut();
                state.word_spacing = aw;
                state.char_spacing = ac;
                self.next_line(operator)?;
                self.show_text(operator, bytes)?;
            },

            OperatorKind::InvokeXObject => {
                arity(operator, operands, 1)?;
                let name = name_operand(operator, &operands[0])?;
                self.invoke_xobject(name)?;
            },
            OperatorKind::BeginMarkedContent => {
                arity(operator, operands, 1)?;
                let tag = name_operand(operator, &operands[0])?;
                self.marked.push(MarkedSequence {
                    tag: tag.to_string(),
                    mcid: None,
                });
            },
            OperatorKind::BeginMarkedContentWithProperties => {
                arity(operator, operands, 2)?;
                let tag = name_operand(operator, &operands[0])?;
                let mcid = self.marked_content_id(&operands[1]);
                self.marked.push(MarkedSequence {
                    tag: tag.to_string(),
                    mcid,
                });
            },
            OperatorKind::EndMarkedContent => {
                arity(operator, operands, 0)?;
                if self.marked.pop().is_none() {
                    log::warn!("EMC without matching BMC/BDC ignored");
                }
            },
        }

        Ok(())
    }

    fn active_resources(&self) -> Arc<Resources> {
        self.resources.clone().unwrap_or_default()
    }

    fn text_matrices(&mut self, operator: &str) -> Result<&mut TextMatrices> {
        self.text.as_mut().ok_or_else(|| Error::TextObjectViolation {
            operator: operator.to_string(),
            reason: "outside of a BT/ET text object".to_string(),
        })
    }

    /// `Td`: translate the line matrix and restart the text matrix there.
    fn move_text(&mut self, operator: &str, tx: f32, ty: f32) -> Result<()> {
        let matrices = self.text_matrices(operator)?;
        matrices.line = Matrix::translation(tx, ty).multiply(&matrices.line);
        matrices.text = matrices.line;
        Ok(())
    }

    /// `T*`: `Td(0, -leading)`.
    fn next_line(&mut self, operator: &str) -> Result<()> {
        let leading = self.stack.top().leading;
        self.move_text(operator, 0.0, -leading)
    }

    /// Numeric `TJ` element, in thousandths of a text space unit.
    fn adjust_text_position(&mut self, operator: &str, n: f32) -> Result<()> {
        let state = self.stack.top();
        let adjust = -n / 1000.0 * state.font_size * state.horizontal_scaling;
        let matrices = self.text_matrices(operator)?;
        matrices.text = Matrix::translation(adjust, 0.0).multiply(&matrices.text);
        Ok(())
    }

    fn show_text(&mut self, operator: &str, bytes: &[u8]) -> Result<()> {
        let state = self.stack.top().clone();
        let font = state
            .font
            .clone()
            .ok_or_else(|| Error::missing("Font", "<unset>"))?;
        let text_matrix = self.text_matrices(operator)?.text;

        let glyphs = font.decode_glyphs(bytes);
        let info = TextRenderInfo::new(glyphs, state, text_matrix, self.marked_content());
        let advance = info.unscaled_width();
        self.listener.render_text(info);

        let matrices = self.text_matrices(operator)?;
        matrices.text = Matrix::translation(advance, 0.0).multiply(&matrices.text);
        Ok(())
    }

    fn marked_content(&self) -> MarkedContent {
        MarkedContent {
            tag: self.marked.last().map(|seq| seq.tag.clone()),
            mcid: self.marked.iter().rev().find_map(|seq| seq.mcid),
            in_artifact: self.marked.iter().any(|seq| seq.tag == "Artifact"),
        }
    }

    /// MCID from an inline property dictionary or a `/Properties` name.
    fn marked_content_id(&self, properties: &Object) -> Option<i64> {
        let dict = match properties {
            Object::Dictionary(dict) => Some(dict),
            Object::Name(name) => {
                let found = self
                    .resources
                    .as_deref()
                    .and_then(|resources| resources.properties(name));
                if found.is_none() {
                    log::debug!("Property list /{} not in resources", name);
                }
                found
            },
            _ => None,
        };
        dict.and_then(|d| d.get("MCID")).and_then(Object::as_integer)
    }

    fn invoke_xobject(&mut self, name: &str) -> Result<()> {
        let resources = self.active_resources();
        let xobject = resources
            .xobject(name)
            .ok_or_else(|| Error::missing("XObject", name))?;

        match xobject {
            XObject::Form {
                content,
                matrix,
                resources: form_resources,
            } => {
                if !self.config.process_forms {
                    log::debug!("Form processing disabled, skipping /{}", name);
                    return Ok(());
                }
                if self.form_depth >= self.config.max_form_depth {
                    return Err(Error::RecursionLimitExceeded(self.config.max_form_depth));
                }

                let mut base = self.stack.top().clone();
                base.ctm = matrix.multiply(&base.ctm);
                let form_resources = form_resources
                    .clone()
                    .unwrap_or_else(|| Arc::clone(&resources));

                log::trace!("Entering form /{} at depth {}", name, self.form_depth + 1);
                let listener: &mut dyn RenderListener = &mut self.listener;
                let mut nested = ContentProcessor {
                    registry: Arc::clone(&self.registry),
                    config: self.config.clone(),
                    listener,
                    initial_state: base,
                    stack: GraphicsStateStack::new(),
                    text: None,
                    resources: None,
                    marked: Vec::new(),
                    form_depth: self.form_depth + 1,
                    operation_count: 0,
                };
                nested.reset_state();
                nested.resources = Some(form_resources);
                nested.marked = self.marked.clone();
                nested.run(ContentParser::new(content))
            },
            XObject::Other { subtype } => {
                let err = Error::UnsupportedContent(format!("XObject /{} of subtype /{}", name, subtype));
                log::debug!("Skipping: {}", err);
                Ok(())
            },
        }
    }

    /// The listener receiving events.
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Mutable access to the listener.
    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Consume the processor and return the listener.
    pub fn into_listener(self) -> L {
        self.listener
    }

    /// Current (top) graphics state.
    pub fn graphics_state(&self) -> &GraphicsState {
        self.stack.top()
    }

    /// Number of entries on the graphics state stack.
    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    /// Text matrix, if inside a text object.
    pub fn text_matrix(&self) -> Option<Matrix> {
        self.text.map(|m| m.text)
    }

    /// Text line matrix, if inside a text object.
    pub fn text_line_matrix(&self) -> Option<Matrix> {
        self.text.map(|m| m.line)
    }

    /// Resources of the stream being processed.
    pub fn resources(&self) -> Option<&Resources> {
        self.resources.as_deref()
    }

    /// Registered operators.
    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    /// Processing limits.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Number of open marked-content sequences.
    pub fn marked_content_depth(&self) -> usize {
        self.marked.len()
    }
}

fn arity(operator: &str, operands: &[Object], expected: usize) -> Result<()> {
    if operands.len() == expected {
        Ok(())
    } else {
        Err(Error::malformed(
            operator,
            format!("expected {} operands, found {}", expected, operands.len()),
        ))
    }
}

fn number_operand(operator: &str, operand: &Object) -> Result<f32> {
    operand.as_number().ok_or_else(|| {
        Error::malformed(operator, format!("expected a number, found {}", operand.type_name()))
    })
}

fn single_number(operator: &str, operands: &[Object]) -> Result<f32> {
    arity(operator, operands, 1)?;
    number_operand(operator, &operands[0])
}

fn name_operand<'a>(operator: &str, operand: &'a Object) -> Result<&'a str> {
    operand.as_name().ok_or_else(|| {
        Error::malformed(operator, format!("expected a name, found {}", operand.type_name()))
    })
}

fn string_operand<'a>(operator: &str, operand: &'a Object) -> Result<&'a [u8]> {
    operand.as_string().ok_or_else(|| {
        Error::malformed(operator, format!("expected a string, found {}", operand.type_name()))
    })
}

fn matrix_operand(operator: &str, operands: &[Object]) -> Result<Matrix> {
    arity(operator, operands, 6)?;
    let values = operands
        .iter()
        .map(|operand| number_operand(operator, operand))
        .collect::<Result<Vec<f32>>>()?;
    Matrix::from_operands(&values).ok_or_else(|| Error::malformed(operator, "expected 6 numbers"))
}
