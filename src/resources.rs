//! Resource dictionaries.
//!
//! A page or form names the fonts, graphics state parameter sets, XObjects
//! and property lists it uses in its `/Resources` dictionary. [`Resources`]
//! holds them pre-resolved so that operator handlers only do map lookups.

use crate::content::Matrix;
use crate::error::{Error, Result};
use crate::fonts::{Font, load_font};
use crate::object::{Dictionary, Object, ObjectRef, ObjectResolver, resolve_entry, resolve_object};
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Nesting bound for form resources that contain further forms.
const MAX_RESOURCE_NESTING: u32 = 16;

/// Text-relevant part of an ExtGState parameter dictionary.
#[derive(Debug, Clone, Default)]
pub struct ExtGState {
    /// `/Font [fontRef size]`
    pub font: Option<(Arc<dyn Font>, f32)>,
}

impl ExtGState {
    /// Parameter set that selects a font.
    pub fn with_font(font: Arc<dyn Font>, size: f32) -> Self {
        Self {
            font: Some((font, size)),
        }
    }
}

/// An external object invoked by `Do`.
#[derive(Debug, Clone)]
pub enum XObject {
    /// A form XObject: a self-contained content stream
    Form {
        /// Decoded content bytes
        content: Bytes,
        /// `/Matrix`, form space to user space
        matrix: Matrix,
        /// The form's own resources; `None` means use the caller's
        resources: Option<Arc<Resources>>,
    },
    /// Any other subtype (images, PostScript)
    Other {
        /// `/Subtype` name
        subtype: String,
    },
}

impl XObject {
    /// Form XObject with identity matrix and no own resources.
    pub fn form(content: impl Into<Bytes>) -> Self {
        XObject::Form {
            content: content.into(),
            matrix: Matrix::identity(),
            resources: None,
        }
    }
}

/// Resources available to one content stream.
///
/// # Examples
///
/// ```
/// use pdf_textflow::fonts::{BaseEncoding, SimpleFont};
/// use pdf_textflow::resources::Resources;
/// use std::sync::Arc;
///
/// let resources = Resources::new()
///     .with_font("F1", Arc::new(SimpleFont::new("Helvetica", BaseEncoding::WinAnsi)));
/// assert!(resources.font("F1").is_some());
/// assert!(resources.font("F2").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Resources {
    fonts: HashMap<String, Arc<dyn Font>>,
    ext_g_states: HashMap<String, ExtGState>,
    xobjects: HashMap<String, XObject>,
    properties: HashMap<String, Dictionary>,
}

impl Resources {
    /// Empty resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a font under `name`.
    pub fn with_font(mut self, name: impl Into<String>, font: Arc<dyn Font>) -> Self {
        self.fonts.insert(name.into(), font);
        self
    }

    /// Add an ExtGState under `name`.
    pub fn with_ext_g_state(mut self, name: impl Into<String>, gs: ExtGState) -> Self {
        self.ext_g_states.insert(name.into(), gs);
        self
    }

    /// Add an XObject under `name`.
    pub fn with_xobject(mut self, name: impl Into<String>, xobject: XObject) -> Self {
        self.xobjects.insert(name.into(), xobject);
        self
    }

    /// Add a marked-content property list under `name`.
    pub fn with_properties(mut self, name: impl Into<String>, properties: Dictionary) -> Self {
        self.properties.insert(name.into(), properties);
        self
    }

    /// Font named `name` in `/Font`.
    pub fn font(&self, name: &str) -> Option<&Arc<dyn Font>> {
        self.fonts.get(name)
    }

    /// Parameter set named `name` in `/ExtGState`.
    pub fn ext_g_state(&self, name: &str) -> Option<&ExtGState> {
        self.ext_g_states.get(name)
    }

    /// XObject named `name` in `/XObject`.
    pub fn xobject(&self, name: &str) -> Option<&XObject> {
        self.xobjects.get(name)
    }

    /// Property list named `name` in `/Properties`.
    pub fn properties(&self, name: &str) -> Option<&Dictionary> {
        self.properties.get(name)
    }

    /// Names of all fonts.
    pub fn font_names(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }

    /// Build resources from a `/Resources` dictionary.
    ///
    /// Fonts that fail to load are logged and left out, so a page can still
    /// be processed until it actually selects one of them. Reference
    /// resolution failures on the sub-dictionaries themselves are
    /// propagated.
    pub fn from_dict(dict: &Object, resolver: &dyn ObjectResolver) -> Result<Self> {
        ResourceLoader::new(resolver).load(dict, 0)
    }
}

/// Shares fonts and indirect resource dictionaries between the page and
/// the forms it uses.
struct ResourceLoader<'a> {
    resolver: &'a dyn ObjectResolver,
    font_cache: HashMap<ObjectRef, Arc<dyn Font>>,
    resource_cache: HashMap<ObjectRef, Arc<Resources>>,
    /// Indirect resource dictionaries currently being loaded
    loading: HashSet<ObjectRef>,
}

impl<'a> ResourceLoader<'a> {
    fn new(resolver: &'a dyn ObjectResolver) -> Self {
        Self {
            resolver,
            font_cache: HashMap::new(),
            resource_cache: HashMap::new(),
            loading: HashSet::new(),
        }
    }

    fn sub_dict(&self, dict: &Dictionary, key: &str) -> Result<Dictionary> {
        match resolve_entry(dict, key, self.resolver)? {
            Some(Object::Dictionary(d)) => Ok(d),
            Some(other) if !other.is_null() => Err(Error::InvalidObjectType {
                expected: "Dictionary".to_string(),
                found: other.type_name().to_string(),
            }),
            _ => Ok(Dictionary::new()),
        }
    }

    fn font(&mut self, obj: &Object) -> Result<Arc<dyn Font>> {
        let Some(reference) = obj.as_reference() else {
            return load_font(obj, self.resolver);
        };
        if let Some(font) = self.font_cache.get(&reference) {
            return Ok(Arc::clone(font));
        }
        let font = load_font(obj, self.resolver)?;
        self.font_cache.insert(reference, Arc::clone(&font));
        Ok(font)
    }

    fn load(&mut self, dict: &Object, depth: u32) -> Result<Resources> {
        let reference = dict.as_reference();
        if let Some(reference) = reference {
            self.loading.insert(reference);
        }
        let result = self.load_entries(dict, depth);
        if let Some(reference) = reference {
            self.loading.remove(&reference);
        }
        result
    }

    /// Resources of a form XObject.
    ///
    /// `None` means the form runs with its caller's resources. That is the
    /// case when the form names a resource dictionary that is still being
    /// loaded, which is how pages usually share one dictionary with their
    /// forms.
    fn form_resources(
        &mut self,
        name: &str,
        res: &Object,
        depth: u32,
    ) -> Result<Option<Arc<Resources>>> {
        let reference = res.as_reference();
        if let Some(reference) = reference {
            if let Some(cached) = self.resource_cache.get(&reference) {
                return Ok(Some(Arc::clone(cached)));
            }
            if self.loading.contains(&reference) {
                log::debug!(
                    "Form /{} shares resources {} {} R with an enclosing stream",
                    name,
                    reference.id,
                    reference.gen
                );
                return Ok(None);
            }
        }
        if depth >= MAX_RESOURCE_NESTING {
            log::warn!("Form /{} resources nested too deeply", name);
            return Ok(None);
        }

        let loaded = Arc::new(self.load(res, depth + 1)?);
        if let Some(reference) = reference {
            self.resource_cache.insert(reference, Arc::clone(&loaded));
        }
        Ok(Some(loaded))
    }

    fn load_entries(&mut self, dict: &Object, depth: u32) -> Result<Resources> {
        let resolved = resolve_object(dict, self.resolver)?;
        let Some(dict) = resolved.as_dict() else {
            return Ok(Resources::new());
        };

        let mut resources = Resources::new();

        for (name, obj) in self.sub_dict(dict, "Font")? {
            match self.font(&obj) {
                Ok(font) => {
                    resources.fonts.insert(name, font);
                },
                Err(e) => log::warn!("Skipping font /{}: {}", name, e),
            }
        }

        for (name, obj) in self.sub_dict(dict, "ExtGState")? {
            let gs = resolve_object(&obj, self.resolver)?;
            let mut ext = ExtGState::default();
            if let Some(gs_dict) = gs.as_dict() {
                if let Some(Object::Array(pair)) = resolve_entry(gs_dict, "Font", self.resolver)? {
                    if let [font_obj, size] = pair.as_slice() {
                        match (self.font(font_obj), size.as_number()) {
                            (Ok(font), Some(size)) => ext.font = Some((font, size)),
                            (Err(e), _) => log::warn!("Skipping /Font of ExtGState /{}: {}", name, e),
                            _ => {},
                        }
                    }
                }
            }
            resources.ext_g_states.insert(name, ext);
        }

        for (name, obj) in self.sub_dict(dict, "Properties")? {
            if let Object::Dictionary(props) = resolve_object(&obj, self.resolver)? {
                resources.properties.insert(name, props);
            }
        }

        for (name, obj) in self.sub_dict(dict, "XObject")? {
            if let Some(xobject) = self.xobject(&name, &obj, depth)? {
                resources.xobjects.insert(name, xobject);
            }
        }

        Ok(resources)
    }

    fn xobject(&mut self, name: &str, obj: &Object, depth: u32) -> Result<Option<XObject>> {
        let stream = resolve_object(obj, self.resolver)?;
        let Object::Stream { dict, .. } = &stream else {
            log::debug!("XObject /{} is not a stream", name);
            return Ok(None);
        };

        let subtype = dict.get("Subtype").and_then(Object::as_name).unwrap_or("");
        if subtype != "Form" {
            return Ok(Some(XObject::Other {
                subtype: subtype.to_string(),
            }));
        }

        let content = match stream.decode_stream_data() {
            Ok(data) => Bytes::from(data),
            Err(e) => {
                log::warn!("Skipping form /{}: {}", name, e);
                return Ok(None);
            },
        };

        let matrix = match resolve_entry(dict, "Matrix", self.resolver)? {
            Some(Object::Array(values)) => {
                let values: Vec<f32> = values.iter().filter_map(Object::as_number).collect();
                Matrix::from_operands(&values).unwrap_or_default()
            },
            _ => Matrix::identity(),
        };

        let resources = match dict.get("Resources") {
            Some(res) => self.form_resources(name, res, depth)?,
            None => None,
        };

        Ok(Some(XObject::Form {
            content,
            matrix,
            resources,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::NoReferences;
    use std::cell::Cell;

    struct Objects(HashMap<u32, Object>);

    impl ObjectResolver for Objects {
        fn resolve(&self, reference: ObjectRef) -> Result<Object> {
            self.0
                .get(&reference.id)
                .cloned()
                .ok_or(Error::ObjectNotFound(reference.id, reference.gen))
        }
    }

    /// Resolver that counts lookups.
    struct CountingObjects {
        objects: HashMap<u32, Object>,
        lookups: Cell<usize>,
    }

    impl ObjectResolver for CountingObjects {
        fn resolve(&self, reference: ObjectRef) -> Result<Object> {
            self.lookups.set(self.lookups.get() + 1);
            self.objects
                .get(&reference.id)
                .cloned()
                .ok_or(Error::ObjectNotFound(reference.id, reference.gen))
        }
    }

    fn name(s: &str) -> Object {
        Object::Name(s.to_string())
    }

    fn dict(entries: Vec<(&str, Object)>) -> Object {
        Object::Dictionary(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn helvetica() -> Object {
        dict(vec![("Subtype", name("Type1")), ("BaseFont", name("Helvetica"))])
    }

    #[test]
    fn test_from_dict_fonts_and_ext_g_state() {
        let objects = Objects(HashMap::from([(5, helvetica())]));
        let font_ref = Object::Reference(ObjectRef::new(5, 0));
        let res = dict(vec![
            ("Font", dict(vec![("F1", font_ref.clone())])),
            (
                "ExtGState",
                dict(vec![(
                    "GS1",
                    dict(vec![("Font", Object::Array(vec![font_ref, Object::Integer(9)]))]),
                )]),
            ),
        ]);

        let resources = Resources::from_dict(&res, &objects).unwrap();
        let font = resources.font("F1").unwrap();
        assert_eq!(font.name(), "Helvetica");

        let (gs_font, size) = resources.ext_g_state("GS1").unwrap().font.clone().unwrap();
        assert_eq!(size, 9.0);
        // Both entries share the cached font
        assert!(Arc::ptr_eq(font, &gs_font));
    }

    #[test]
    fn test_broken_font_is_skipped() {
        let res = dict(vec![(
            "Font",
            dict(vec![
                ("F1", helvetica()),
                ("F2", Object::Reference(ObjectRef::new(99, 0))),
            ]),
        )]);
        let resources = Resources::from_dict(&res, &NoReferences).unwrap();
        assert!(resources.font("F1").is_some());
        assert!(resources.font("F2").is_none());
    }

    #[test]
    fn test_form_and_image_xobjects() {
        let form_dict: Dictionary = [
            ("Subtype".to_string(), name("Form")),
            (
                "Matrix".to_string(),
                Object::Array(
                    [1, 0, 0, 1, 50, 60].into_iter().map(Object::Integer).collect(),
                ),
            ),
            ("Resources".to_string(), dict(vec![("Font", dict(vec![("F9", helvetica())]))])),
        ]
        .into_iter()
        .collect();
        let image_dict: Dictionary =
            [("Subtype".to_string(), name("Image"))].into_iter().collect();

        let res = dict(vec![(
            "XObject",
            dict(vec![
                (
                    "Fm1",
                    Object::Stream {
                        dict: form_dict,
                        data: Bytes::from_static(b"BT ET"),
                    },
                ),
                (
                    "Im1",
                    Object::Stream {
                        dict: image_dict,
                        data: Bytes::new(),
                    },
                ),
            ]),
        )]);

        let resources = Resources::from_dict(&res, &NoReferences).unwrap();
        match resources.xobject("Fm1") {
            Some(XObject::Form {
                content,
                matrix,
                resources: Some(form_res),
            }) => {
                assert_eq!(&content[..], b"BT ET");
                assert_eq!(*matrix, Matrix::translation(50.0, 60.0));
                assert!(form_res.font("F9").is_some());
            },
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            resources.xobject("Im1"),
            Some(XObject::Other { subtype }) if subtype == "Image"
        ));
    }

    #[test]
    fn test_non_dictionary_resources_are_empty() {
        let resources = Resources::from_dict(&Object::Null, &NoReferences).unwrap();
        assert_eq!(resources.font_names().count(), 0);
    }

    #[test]
    fn test_properties() {
        let res = dict(vec![(
            "Properties",
            dict(vec![("MC0", dict(vec![("MCID", Object::Integer(3))]))]),
        )]);
        let resources = Resources::from_dict(&res, &NoReferences).unwrap();
        assert_eq!(
            resources.properties("MC0").and_then(|p| p.get("MCID")),
            Some(&Object::Integer(3))
        );
    }

    #[test]
    fn test_shared_resources_between_page_and_forms() {
        let shared = Object::Reference(ObjectRef::new(10, 0));
        let form = |id: u32| {
            let form_dict: Dictionary = [
                ("Subtype".to_string(), name("Form")),
                ("Resources".to_string(), shared.clone()),
            ]
            .into_iter()
            .collect();
            (id, Object::Stream {
                dict: form_dict,
                data: Bytes::from_static(b"/F1 Do"),
            })
        };
        let page_res = dict(vec![
            ("Font", dict(vec![("F1", helvetica())])),
            (
                "XObject",
                dict(
                    [("Fm0", 20), ("Fm1", 21), ("Fm2", 22)]
                        .into_iter()
                        .map(|(n, id)| (n, Object::Reference(ObjectRef::new(id, 0))))
                        .collect(),
                ),
            ),
        ]);
        let objects = CountingObjects {
            objects: HashMap::from([(10, page_res), form(20), form(21), form(22)]),
            lookups: Cell::new(0),
        };

        let resources = Resources::from_dict(&shared, &objects).unwrap();

        assert!(objects.lookups.get() < 20, "{} lookups", objects.lookups.get());
        for fm in ["Fm0", "Fm1", "Fm2"] {
            assert!(
                matches!(resources.xobject(fm), Some(XObject::Form { resources: None, .. })),
                "{} should run with the page's resources",
                fm
            );
        }
    }

    #[test]
    fn test_form_resources_cached_by_reference() {
        let form_res = Object::Reference(ObjectRef::new(30, 0));
        let form_dict: Dictionary = [
            ("Subtype".to_string(), name("Form")),
            ("Resources".to_string(), form_res),
        ]
        .into_iter()
        .collect();
        let form = Object::Stream {
            dict: form_dict,
            data: Bytes::from_static(b"BT ET"),
        };
        let objects = Objects(HashMap::from([
            (30, dict(vec![("Font", dict(vec![("F9", helvetica())]))])),
            (20, form),
        ]));
        let res = dict(vec![(
            "XObject",
            dict(vec![
                ("A", Object::Reference(ObjectRef::new(20, 0))),
                ("B", Object::Reference(ObjectRef::new(20, 0))),
            ]),
        )]);

        let resources = Resources::from_dict(&res, &objects).unwrap();
        let form_resources = |n: &str| match resources.xobject(n) {
            Some(XObject::Form {
                resources: Some(r), ..
            }) => Arc::clone(r),
            other => panic!("unexpected {:?}", other),
        };
        assert!(Arc::ptr_eq(&form_resources("A"), &form_resources("B")));
        assert!(form_resources("A").font("F9").is_some());
    }
}
