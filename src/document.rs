//! Page-level entry points.
//!
//! A [`DocumentSource`] gives access to page dictionaries and resolves
//! indirect references; everything else (content decoding, resource
//! inheritance, running the processor) is done here. [`MemoryDocument`]
//! is an in-memory source for documents assembled by hand or by another
//! parser.

use crate::config::{ProcessorConfig, TextExtractionOptions};
use crate::content::{ContentProcessor, RenderListener};
use crate::error::{Error, Result};
use crate::extractors::{MarkedContentExtractor, MarkedSection, SimpleTextExtractor};
use crate::object::{Dictionary, Object, ObjectRef, ObjectResolver, resolve_entry, resolve_object};
use crate::resources::Resources;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;

/// Bound on `/Parent` links followed when looking for inherited resources.
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// A document whose pages can be interpreted.
pub trait DocumentSource: ObjectResolver {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Page dictionary at zero-based `index`.
    ///
    /// # Errors
    ///
    /// [`Error::PageNotFound`] (carrying `index`) when out of range.
    fn page(&self, index: usize) -> Result<Dictionary>;
}

/// Document held entirely in memory.
///
/// # Examples
///
/// ```
/// use pdf_textflow::document::{MemoryDocument, extract_text};
/// use pdf_textflow::object::{Dictionary, Object};
///
/// let mut font = Dictionary::new();
/// font.insert("Subtype".into(), Object::Name("Type1".into()));
/// font.insert("BaseFont".into(), Object::Name("Courier".into()));
/// let mut fonts = Dictionary::new();
/// fonts.insert("F1".into(), Object::Dictionary(font));
/// let mut resources = Dictionary::new();
/// resources.insert("Font".into(), Object::Dictionary(fonts));
///
/// let mut doc = MemoryDocument::new();
/// doc.push_page(b"BT /F1 12 Tf 72 720 Td (Hello) Tj ET", Object::Dictionary(resources));
///
/// assert_eq!(extract_text(&doc, 1).unwrap(), "Hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    objects: HashMap<ObjectRef, Object>,
    pages: Vec<Object>,
}

impl MemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an indirect object.
    pub fn insert(&mut self, reference: ObjectRef, object: Object) {
        self.objects.insert(reference, object);
    }

    /// Store an indirect object, builder style.
    pub fn with_object(mut self, reference: ObjectRef, object: Object) -> Self {
        self.insert(reference, object);
        self
    }

    /// Append a page (a dictionary or a reference to one) and return its
    /// zero-based index.
    pub fn add_page(&mut self, page: Object) -> usize {
        self.pages.push(page);
        self.pages.len() - 1
    }

    /// Append a page, builder style.
    pub fn with_page(mut self, page: Object) -> Self {
        self.add_page(page);
        self
    }

    /// Append a page with an unfiltered content stream and the given
    /// `/Resources` value.
    pub fn push_page(&mut self, content: &[u8], resources: Object) -> usize {
        let mut page = Dictionary::new();
        page.insert("Type".to_string(), Object::Name("Page".to_string()));
        page.insert(
            "Contents".to_string(),
            Object::Stream {
                dict: Dictionary::new(),
                data: Bytes::copy_from_slice(content),
            },
        );
        page.insert("Resources".to_string(), resources);
        self.add_page(Object::Dictionary(page))
    }
}

impl ObjectResolver for MemoryDocument {
    fn resolve(&self, reference: ObjectRef) -> Result<Object> {
        self.objects
            .get(&reference)
            .cloned()
            .ok_or(Error::ObjectNotFound(reference.id, reference.gen))
    }
}

impl DocumentSource for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<Dictionary> {
        let page = self.pages.get(index).ok_or(Error::PageNotFound(index))?;
        match resolve_object(page, self)? {
            Object::Dictionary(dict) => Ok(dict),
            other => Err(Error::InvalidObjectType {
                expected: "Dictionary".to_string(),
                found: other.type_name().to_string(),
            }),
        }
    }
}

/// Decoded content of a page.
///
/// `/Contents` may be one stream or an array of streams; array parts are
/// joined with a newline so that tokens never run together across a
/// stream boundary. A page without `/Contents` has empty content.
pub fn page_content<D: DocumentSource>(doc: &D, page: &Dictionary) -> Result<Vec<u8>> {
    let contents = match resolve_entry(page, "Contents", doc)? {
        None | Some(Object::Null) => return Ok(Vec::new()),
        Some(contents) => contents,
    };

    match contents {
        stream @ Object::Stream { .. } => stream.decode_stream_data(),
        Object::Array(parts) => {
            let mut content = Vec::new();
            for part in &parts {
                let stream = resolve_object(part, doc)?;
                if !content.is_empty() {
                    content.push(b'\n');
                }
                content.extend(stream.decode_stream_data()?);
            }
            Ok(content)
        },
        other => Err(Error::InvalidObjectType {
            expected: "Stream or Array".to_string(),
            found: other.type_name().to_string(),
        }),
    }
}

/// Resources of a page, inherited from the nearest ancestor in the page
/// tree when the page has none of its own.
pub fn page_resources<D: DocumentSource>(doc: &D, page: &Dictionary) -> Result<Resources> {
    let mut node = page.clone();
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Some(resources) = node.get("Resources") {
            return Resources::from_dict(resources, doc);
        }
        match resolve_entry(&node, "Parent", doc)? {
            Some(Object::Dictionary(parent)) => node = parent,
            _ => return Ok(Resources::new()),
        }
    }
    Err(Error::RecursionLimitExceeded(MAX_PAGE_TREE_DEPTH as u32))
}

/// Extract the text of one page with default options.
///
/// `page_number` is 1-based.
///
/// # Errors
///
/// [`Error::PageNotFound`] for page 0 or a number past the last page; any
/// error raised while decoding or interpreting the page.
pub fn extract_text<D: DocumentSource>(doc: &D, page_number: usize) -> Result<String> {
    extract_text_with(
        doc,
        page_number,
        &TextExtractionOptions::default(),
        &ProcessorConfig::default(),
    )
}

/// Extract the text of one page with explicit options and limits.
pub fn extract_text_with<D: DocumentSource>(
    doc: &D,
    page_number: usize,
    options: &TextExtractionOptions,
    config: &ProcessorConfig,
) -> Result<String> {
    let extractor = SimpleTextExtractor::with_options(options.clone());
    Ok(process_page(doc, page_number, extractor, config)?.into_text())
}

/// Extract the words of one page grouped by marked content.
///
/// `/Artifact` content is left out. Unmarked text forms sections with no
/// tag.
pub fn extract_marked_sections<D: DocumentSource>(
    doc: &D,
    page_number: usize,
    options: &TextExtractionOptions,
    config: &ProcessorConfig,
) -> Result<Vec<MarkedSection>> {
    let extractor = MarkedContentExtractor::with_options(options.clone());
    Ok(process_page(doc, page_number, extractor, config)?.sections())
}

/// Run `listener` over one page and hand it back.
fn process_page<D: DocumentSource, L: RenderListener>(
    doc: &D,
    page_number: usize,
    listener: L,
    config: &ProcessorConfig,
) -> Result<L> {
    if page_number == 0 || page_number > doc.page_count() {
        return Err(Error::PageNotFound(page_number));
    }

    let page = doc.page(page_number - 1)?;
    let content = page_content(doc, &page)?;
    let resources = page_resources(doc, &page)?;

    let mut processor = ContentProcessor::new(listener).with_config(config.clone());
    processor.process(&content, Arc::new(resources))?;
    Ok(processor.into_listener())
}

/// Extract every page, skipping pages that fail.
///
/// Returns `(page_number, text)` pairs for the pages that succeeded, in
/// page order. Failures are logged with their page number and error kind.
pub fn extract_document_text<D: DocumentSource>(doc: &D) -> Vec<(usize, String)> {
    (1..=doc.page_count())
        .filter_map(|page_number| match extract_text(doc, page_number) {
            Ok(text) => Some((page_number, text)),
            Err(e) => {
                log::warn!("Skipping page {} ({}): {}", page_number, e.kind(), e);
                None
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    fn name(s: &str) -> Object {
        Object::Name(s.to_string())
    }

    fn dict(entries: Vec<(&str, Object)>) -> Dictionary {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    fn courier_resources() -> Object {
        let font = dict(vec![("Subtype", name("Type1")), ("BaseFont", name("Courier"))]);
        Object::Dictionary(dict(vec![(
            "Font",
            Object::Dictionary(dict(vec![("F1", Object::Dictionary(font))])),
        )]))
    }

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    /// Pages node (1) holding resources, one page (2) with two content
    /// streams (3, compressed, and 4).
    fn tree_document() -> MemoryDocument {
        let pages = dict(vec![("Type", name("Pages")), ("Resources", courier_resources())]);
        let page = dict(vec![
            ("Type", name("Page")),
            ("Parent", Object::Reference(ObjectRef::new(1, 0))),
            (
                "Contents",
                Object::Array(vec![
                    Object::Reference(ObjectRef::new(3, 0)),
                    Object::Reference(ObjectRef::new(4, 0)),
                ]),
            ),
        ]);
        let first = Object::Stream {
            dict: dict(vec![("Filter", name("FlateDecode"))]),
            data: Bytes::from(deflate(b"BT /F1 10 Tf 0 700 Td (first) Tj")),
        };
        let second = Object::Stream {
            dict: Dictionary::new(),
            data: Bytes::from_static(b"T* 0 -20 Td (second) Tj ET"),
        };

        MemoryDocument::new()
            .with_object(ObjectRef::new(1, 0), Object::Dictionary(pages))
            .with_object(ObjectRef::new(2, 0), Object::Dictionary(page))
            .with_object(ObjectRef::new(3, 0), first)
            .with_object(ObjectRef::new(4, 0), second)
            .with_page(Object::Reference(ObjectRef::new(2, 0)))
    }

    #[test]
    fn test_inherited_resources_and_content_array() {
        let doc = tree_document();
        let page = doc.page(0).unwrap();
        assert!(page_resources(&doc, &page).unwrap().font("F1").is_some());

        let content = page_content(&doc, &page).unwrap();
        assert!(content.starts_with(b"BT /F1 10 Tf"));
        assert!(content.ends_with(b"ET"));

        assert_eq!(extract_text(&doc, 1).unwrap(), "first\nsecond");
    }

    #[test]
    fn test_page_numbers_are_one_based() {
        let doc = tree_document();
        assert!(matches!(extract_text(&doc, 0), Err(Error::PageNotFound(0))));
        assert!(matches!(extract_text(&doc, 2), Err(Error::PageNotFound(2))));
    }

    #[test]
    fn test_page_without_contents_or_resources() {
        let mut doc = MemoryDocument::new();
        doc.add_page(Object::Dictionary(dict(vec![("Type", name("Page"))])));
        let page = doc.page(0).unwrap();
        assert!(page_content(&doc, &page).unwrap().is_empty());
        assert_eq!(page_resources(&doc, &page).unwrap().font_names().count(), 0);
        assert_eq!(extract_text(&doc, 1).unwrap(), "");
    }

    #[test]
    fn test_document_extraction_skips_failed_pages() {
        let mut doc = MemoryDocument::new();
        doc.push_page(b"BT /F1 12 Tf (one) Tj ET", courier_resources());
        doc.push_page(b"BT /F2 12 Tf (two) Tj ET", courier_resources());
        doc.push_page(b"Q", courier_resources());
        doc.push_page(b"BT /F1 12 Tf (four) Tj ET", courier_resources());

        let pages = extract_document_text(&doc);
        assert_eq!(pages, vec![(1, "one".to_string()), (4, "four".to_string())]);
    }

    #[test]
    fn test_unsupported_filter_fails_page() {
        let mut page = dict(vec![("Resources", courier_resources())]);
        page.insert(
            "Contents".to_string(),
            Object::Stream {
                dict: dict(vec![("Filter", name("LZWDecode"))]),
                data: Bytes::from_static(b"\x80\x0b"),
            },
        );
        let doc = MemoryDocument::new().with_page(Object::Dictionary(page));
        assert!(matches!(extract_text(&doc, 1), Err(Error::UnsupportedFilter(_))));
    }

    #[test]
    fn test_page_must_be_dictionary() {
        let doc = MemoryDocument::new().with_page(Object::Integer(5));
        assert!(matches!(doc.page(0), Err(Error::InvalidObjectType { .. })));
        assert!(matches!(doc.page(1), Err(Error::PageNotFound(1))));
    }
}
