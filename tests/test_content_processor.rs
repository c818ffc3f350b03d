//! Integration tests for content stream interpretation.
//!
//! Drives `ContentProcessor` through the public API with hand-built
//! resources and checks the events a listener receives.

use bytes::Bytes;
use pdf_textflow::content::{
    CollectingListener, ContentProcessor, Matrix, Operation, OperatorKind, OperatorRegistry,
    RenderListener, RenderMode, TextRenderInfo, parse_content_stream,
};
use pdf_textflow::fonts::{BaseEncoding, CMap, CompositeFont, Font, SimpleFont};
use pdf_textflow::geometry::Point;
use pdf_textflow::object::Object;
use pdf_textflow::resources::{ExtGState, Resources, XObject};
use pdf_textflow::{Error, ProcessorConfig};
use std::sync::Arc;

/// WinAnsi font with every glyph 500 units wide.
fn half_em_font() -> Arc<dyn Font> {
    Arc::new(SimpleFont::new("HalfEm", BaseEncoding::WinAnsi).with_default_width(500.0))
}

fn resources() -> Arc<Resources> {
    Arc::new(Resources::new().with_font("F1", half_em_font()))
}

fn collect(content: &[u8]) -> Vec<TextRenderInfo> {
    let mut processor = ContentProcessor::new(CollectingListener::new());
    processor.process(content, resources()).unwrap();
    processor.into_listener().events
}

#[test]
fn test_end_to_end_hello() {
    let events = collect(b"BT /F1 12 Tf 100 700 Td (Hello) Tj ET");

    assert_eq!(events.len(), 1, "one Tj should give one event");
    let event = &events[0];
    assert_eq!(event.text(), "Hello");
    assert_eq!(event.font_size(), 12.0);
    assert_eq!(event.text_matrix().translation_part(), Point::new(100.0, 700.0));
    assert_eq!(event.baseline_start(), Point::new(100.0, 700.0));
    // 5 glyphs * 500/1000 * 12
    assert_eq!(event.unscaled_width(), 30.0);
    assert_eq!(event.baseline_end(), Point::new(130.0, 700.0));
    assert_eq!(event.single_space_width(), 6.0);
}

#[test]
fn test_events_in_document_order() {
    let events = collect(b"BT /F1 10 Tf (a) Tj [(b) -100 (c)] TJ 14 TL (d) ' ET");
    let texts: Vec<&str> = events.iter().map(|e| e.text()).collect();
    assert_eq!(texts, vec!["a", "b", "c", "d"]);
    assert_eq!(events[3].baseline_start().y, -14.0);
}

#[test]
fn test_tj_adjustment_shifts_left() {
    let with_adjust = collect(b"BT /F1 12 Tf [(A) 250 (B)] TJ ET");
    let without = collect(b"BT /F1 12 Tf [(A) (B)] TJ ET");
    let shift = without[1].text_matrix().e - with_adjust[1].text_matrix().e;
    assert!((shift - 3.0).abs() < 1e-5, "250/1000 * 12 = 3, got {}", shift);
}

#[test]
fn test_horizontal_scaling_applies_to_advance_and_adjustment() {
    let events = collect(b"BT /F1 10 Tf 50 Tz [(ab) -1000 (c)] TJ ET");
    // 2 glyphs * 5 scaled by 0.5, then 10 * 0.5 for the adjustment
    assert_eq!(events[0].unscaled_width(), 5.0);
    assert_eq!(events[1].text_matrix().e, 10.0);
}

#[test]
fn test_word_spacing_only_for_single_byte_space() {
    let events = collect(b"BT /F1 10 Tf 4 Tw 1 Tc (a b) Tj ET");
    // 3 * (5 + 1) + 4
    assert_eq!(events[0].unscaled_width(), 22.0);
}

#[test]
fn test_ctm_and_rotation_in_baseline() {
    let events = collect(b"0 1 -1 0 300 0 cm BT /F1 10 Tf 10 20 Td (ab) Tj ET");
    let event = &events[0];
    assert_eq!(event.baseline_start(), Point::new(280.0, 10.0));
    assert_eq!(event.baseline_end(), Point::new(280.0, 20.0));
    assert_eq!(
        event.text_to_user_matrix(),
        event.text_matrix().multiply(&event.graphics_state().ctm)
    );
}

#[test]
fn test_stack_underflow_keeps_base_state() {
    let mut processor = ContentProcessor::new(CollectingListener::new());
    let result = processor.process(b"Q", resources());
    assert!(matches!(result, Err(Error::StackUnderflow)));
    assert_eq!(processor.stack_depth(), 1);
}

#[test]
fn test_text_object_bracketing() {
    let mut processor = ContentProcessor::new(CollectingListener::new());
    let err = processor.process(b"/F1 12 Tf (x) Tj", resources()).unwrap_err();
    assert_eq!(err.kind(), "TextObjectViolation");

    let err = processor
        .process(b"BT /F1 12 Tf (x) Tj ET (y) Tj", resources())
        .unwrap_err();
    assert_eq!(err.kind(), "TextObjectViolation");
    let texts: Vec<&str> = processor.listener().events.iter().map(|e| e.text()).collect();
    assert_eq!(texts, vec!["x"], "events before the violation are kept");
}

#[test]
fn test_missing_resources() {
    let mut processor = ContentProcessor::new(CollectingListener::new());
    let err = processor.process(b"BT /F2 9 Tf ET", resources()).unwrap_err();
    assert_eq!(err.to_string(), "Missing resource: /Font /F2");

    let err = processor.process(b"/G0 gs", resources()).unwrap_err();
    assert_eq!(err.to_string(), "Missing resource: /ExtGState /G0");
}

#[test]
fn test_gs_selects_font() {
    let resources = Arc::new(
        Resources::new().with_ext_g_state("G0", ExtGState::with_font(half_em_font(), 8.0)),
    );
    let mut processor = ContentProcessor::new(CollectingListener::new());
    processor.process(b"/G0 gs BT (x) Tj ET", resources).unwrap();
    assert_eq!(processor.listener().events[0].font_size(), 8.0);
}

#[test]
fn test_process_pre_tokenized_operations() {
    let operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name("F1".into()), Object::Integer(10)]),
        Operation::new("Tj", vec![Object::String(b"tokens".to_vec())]),
        Operation::new("ET", vec![]),
    ];
    let mut processor = ContentProcessor::new(CollectingListener::new());
    processor.process_operations(operations, resources()).unwrap();
    assert_eq!(processor.listener().events[0].text(), "tokens");
}

#[test]
fn test_invoke_operator_directly() {
    let mut processor = ContentProcessor::new(CollectingListener::new());
    processor.process(b"", resources()).unwrap();
    processor.invoke_operator("BT", &[]).unwrap();
    processor
        .invoke_operator("Td", &[Object::Integer(0), Object::Integer(-12)])
        .unwrap();
    assert_eq!(processor.text_matrix(), Some(Matrix::translation(0.0, -12.0)));
    // Unregistered operators are skipped
    processor.invoke_operator("sh", &[Object::Name("Sh0".into())]).unwrap();
}

#[test]
fn test_registry_rejects_duplicates() {
    let result = OperatorRegistry::from_entries([
        ("Tj", OperatorKind::ShowText),
        ("Tj", OperatorKind::ShowTextArray),
    ]);
    assert!(matches!(result, Err(Error::DuplicateOperator(ref m)) if m == "Tj"));
}

#[test]
fn test_renamed_operator() {
    let mut registry = OperatorRegistry::with_defaults();
    registry.register("show", OperatorKind::ShowText).unwrap();
    let mut processor = ContentProcessor::new(CollectingListener::new()).with_registry(registry);
    processor.process(b"BT /F1 10 Tf (a) show ET", resources()).unwrap();
    assert_eq!(processor.listener().events.len(), 1);
}

#[test]
fn test_invisible_text_still_reported() {
    let events = collect(b"BT /F1 10 Tf 3 Tr (ocr) Tj ET");
    assert_eq!(events[0].render_mode(), RenderMode::Invisible);
}

#[test]
fn test_composite_font_text() {
    let mut cmap = CMap::new();
    cmap.insert(0x0001, "\u{65E5}".to_string());
    cmap.insert(0x0002, "\u{672C}".to_string());
    let font = CompositeFont::new("HeiseiMin").with_to_unicode(cmap);
    let resources = Arc::new(Resources::new().with_font("F0", Arc::new(font)));

    let mut processor = ContentProcessor::new(CollectingListener::new());
    processor.process(b"BT /F0 10 Tf <00010002> Tj ET", resources).unwrap();
    let event = &processor.listener().events[0];
    assert_eq!(event.text(), "\u{65E5}\u{672C}");
    assert_eq!(event.unscaled_width(), 20.0);
}

#[test]
fn test_nested_form_events_share_listener() {
    let form = XObject::Form {
        content: Bytes::from_static(b"BT /F1 10 Tf (form) Tj ET"),
        matrix: Matrix::translation(0.0, 50.0),
        resources: None,
    };
    let resources = Arc::new(
        Resources::new()
            .with_font("F1", half_em_font())
            .with_xobject("X1", form),
    );
    let mut processor = ContentProcessor::new(CollectingListener::new());
    processor
        .process(b"q 1 0 0 1 10 0 cm /X1 Do Q BT /F1 10 Tf (page) Tj ET", resources)
        .unwrap();

    let events = &processor.listener().events;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].text(), "form");
    assert_eq!(events[0].baseline_start(), Point::new(10.0, 50.0));
    assert_eq!(events[1].baseline_start(), Point::new(0.0, 0.0));
}

#[test]
fn test_self_referencing_form_hits_depth_limit() {
    let resources = Arc::new(
        Resources::new().with_xobject("X1", XObject::form(&b"/X1 Do"[..])),
    );
    let mut processor = ContentProcessor::new(CollectingListener::new())
        .with_config(ProcessorConfig::new().with_max_form_depth(3));
    let result = processor.process(b"/X1 Do", resources);
    assert!(matches!(result, Err(Error::RecursionLimitExceeded(3))));
}

#[test]
fn test_operation_limit() {
    let content = "q Q ".repeat(100);
    let mut processor = ContentProcessor::new(CollectingListener::new())
        .with_config(ProcessorConfig::new().with_max_operations(50));
    let result = processor.process(content.as_bytes(), resources());
    assert!(matches!(result, Err(Error::OperationLimitExceeded(50))));
}

/// Counts calls so that per-stream resets can be checked.
#[derive(Default)]
struct CountingListener {
    resets: usize,
    events: usize,
}

impl RenderListener for CountingListener {
    fn reset(&mut self) {
        self.resets += 1;
    }

    fn render_text(&mut self, _info: TextRenderInfo) {
        self.events += 1;
    }
}

#[test]
fn test_listener_reset_once_per_stream() {
    let resources = Arc::new(
        Resources::new()
            .with_font("F1", half_em_font())
            .with_xobject("X1", XObject::form(&b"BT /F1 10 Tf (x) Tj ET"[..])),
    );
    let mut processor = ContentProcessor::new(CountingListener::default());
    processor.process(b"/X1 Do /X1 Do", Arc::clone(&resources)).unwrap();
    processor.process(b"/X1 Do", resources).unwrap();
    assert_eq!(processor.listener().resets, 2, "forms must not reset the listener");
    assert_eq!(processor.listener().events, 3);
}

#[test]
fn test_tokenizer_output_matches_operators() {
    let ops = parse_content_stream(b"q 1 0 0 1 0 0 cm BT /F1 12 Tf [(A) -20 (B)] TJ ET Q");
    let names: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();
    assert_eq!(names, vec!["q", "cm", "BT", "Tf", "TJ", "ET", "Q"]);
}
