//! PDF object types.
//!
//! Operands handed to content operators, resource dictionaries and font
//! dictionaries are all represented as [`Object`] values. Indirect
//! references are resolved through an [`ObjectResolver`] supplied by the
//! surrounding document model.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Dictionary type used throughout the crate.
pub type Dictionary = HashMap<String, Object>;

/// Maximum number of reference hops followed by [`resolve_object`].
const MAX_REFERENCE_CHAIN: u32 = 32;

/// PDF object representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// String (byte array, escapes already decoded)
    String(Vec<u8>),
    /// Name (without the leading /)
    Name(String),
    /// Array of objects
    Array(Vec<Object>),
    /// Dictionary (key-value pairs)
    Dictionary(Dictionary),
    /// Stream (dictionary + raw, still-encoded data)
    Stream {
        /// Stream dictionary
        dict: Dictionary,
        /// Stream data
        data: bytes::Bytes,
    },
    /// Indirect object reference
    Reference(ObjectRef),
}

/// Reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}

impl Object {
    /// Get the type name of this object (without data).
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Boolean(_) => "Boolean",
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Dictionary(_) => "Dictionary",
            Object::Stream { .. } => "Stream",
            Object::Reference(_) => "Reference",
        }
    }

    /// Try to cast to integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to cast to a number. Integers and reals are both accepted.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Object::Integer(i) => Some(*i as f32),
            Object::Real(r) => Some(*r as f32),
            _ => None,
        }
    }

    /// Try to cast to name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Try to cast to string (bytes).
    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to cast to dictionary. Works for both Dictionary and Stream objects.
    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// Try to cast to array.
    pub fn as_array(&self) -> Option<&Vec<Object>> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to cast to reference.
    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Object::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Check if object is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    /// Decode stream data using the filters named in the stream dictionary.
    ///
    /// Returns an error if this is not a stream object or if a filter is
    /// not supported.
    pub fn decode_stream_data(&self) -> Result<Vec<u8>> {
        match self {
            Object::Stream { dict, data } => {
                let filters = dict
                    .get("Filter")
                    .map(extract_filter_names)
                    .unwrap_or_default();
                crate::decoders::decode_stream_data(data, &filters)
            },
            _ => Err(Error::InvalidObjectType {
                expected: "Stream".to_string(),
                found: self.type_name().to_string(),
            }),
        }
    }
}

/// Extract filter names from a Filter object.
///
/// The Filter entry can be either a single Name or an Array of Names.
fn extract_filter_names(filter_obj: &Object) -> Vec<String> {
    match filter_obj {
        Object::Name(name) => vec![name.clone()],
        Object::Array(arr) => arr
            .iter()
            .filter_map(|obj| obj.as_name().map(|s| s.to_string()))
            .collect(),
        _ => vec![],
    }
}

/// Source of indirect objects.
///
/// The interpreter never parses a PDF file itself; whoever owns the
/// document model implements this trait so that font, resource and form
/// dictionaries can follow `n g R` references.
pub trait ObjectResolver {
    /// Load the object identified by `reference`.
    fn resolve(&self, reference: ObjectRef) -> Result<Object>;
}

/// Resolver for content that never contains references.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReferences;

impl ObjectResolver for NoReferences {
    fn resolve(&self, reference: ObjectRef) -> Result<Object> {
        Err(Error::ObjectNotFound(reference.id, reference.gen))
    }
}

/// Follow a chain of references until a direct object is reached.
pub fn resolve_object(obj: &Object, resolver: &dyn ObjectResolver) -> Result<Object> {
    let mut current = obj.clone();
    for _ in 0..MAX_REFERENCE_CHAIN {
        match current {
            Object::Reference(r) => current = resolver.resolve(r)?,
            direct => return Ok(direct),
        }
    }
    Err(Error::RecursionLimitExceeded(MAX_REFERENCE_CHAIN))
}

/// Look up `key` in `dict` and resolve it if it is a reference.
pub fn resolve_entry(
    dict: &Dictionary,
    key: &str,
    resolver: &dyn ObjectResolver,
) -> Result<Option<Object>> {
    dict.get(key)
        .map(|obj| resolve_object(obj, resolver))
        .transpose()
}
