//! Operator registry.
//!
//! Every supported operator is one [`OperatorKind`] variant; the
//! [`OperatorRegistry`] maps mnemonics to kinds and is fixed once a
//! processor has been built. Mnemonics that are not registered are skipped
//! by the dispatcher.

use crate::error::{Error, Result};
use indexmap::IndexMap;

/// Behaviour attached to a registered operator mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    // Graphics state
    /// `q`: push a copy of the graphics state
    SaveState,
    /// `Q`: pop the graphics state
    RestoreState,
    /// `cm a b c d e f`: concatenate to the CTM
    ConcatMatrix,
    /// `gs name`: apply an ExtGState resource
    SetExtGState,

    // Text state
    /// `Tc charSpace`
    SetCharSpacing,
    /// `Tw wordSpace`
    SetWordSpacing,
    /// `Tz scale` (percentage)
    SetHorizontalScaling,
    /// `TL leading`
    SetLeading,
    /// `Tf font size`
    SetFont,
    /// `Tr mode`
    SetRenderMode,
    /// `Ts rise`
    SetRise,

    // Text objects and positioning
    /// `BT`
    BeginText,
    /// `ET`
    EndText,
    /// `Td tx ty`
    MoveText,
    /// `TD tx ty`
    MoveTextSetLeading,
    /// `Tm a b c d e f`
    SetTextMatrix,
    /// `T*`
    NextLine,

    // Text showing
    /// `Tj string`
    ShowText,
    /// `TJ array`
    ShowTextArray,
    /// `' string`
    NextLineShowText,
    /// `" aw ac string`
    NextLineShowTextSpaced,

    // XObjects and marked content
    /// `Do name`
    InvokeXObject,
    /// `BMC tag`
    BeginMarkedContent,
    /// `BDC tag properties`
    BeginMarkedContentWithProperties,
    /// `EMC`
    EndMarkedContent,
}

impl OperatorKind {
    /// All operator kinds, in registration order of the default registry.
    pub const ALL: [OperatorKind; 25] = [
        OperatorKind::SaveState,
        OperatorKind::RestoreState,
        OperatorKind::ConcatMatrix,
        OperatorKind::SetExtGState,
        OperatorKind::SetCharSpacing,
        OperatorKind::SetWordSpacing,
        OperatorKind::SetHorizontalScaling,
        OperatorKind::SetLeading,
        OperatorKind::SetFont,
        OperatorKind::SetRenderMode,
        OperatorKind::SetRise,
        OperatorKind::BeginText,
        OperatorKind::EndText,
        OperatorKind::MoveText,
        OperatorKind::MoveTextSetLeading,
        OperatorKind::SetTextMatrix,
        OperatorKind::NextLine,
        OperatorKind::ShowText,
        OperatorKind::ShowTextArray,
        OperatorKind::NextLineShowText,
        OperatorKind::NextLineShowTextSpaced,
        OperatorKind::InvokeXObject,
        OperatorKind::BeginMarkedContent,
        OperatorKind::BeginMarkedContentWithProperties,
        OperatorKind::EndMarkedContent,
    ];

    /// Standard content stream mnemonic for this operator.
    pub fn mnemonic(self) -> &'static str {
        match self {
            OperatorKind::SaveState => "q",
            OperatorKind::RestoreState => "Q",
            OperatorKind::ConcatMatrix => "cm",
            OperatorKind::SetExtGState => "gs",
            OperatorKind::SetCharSpacing => "Tc",
            OperatorKind::SetWordSpacing => "Tw",
            OperatorKind::SetHorizontalScaling => "Tz",
            OperatorKind::SetLeading => "TL",
            OperatorKind::SetFont => "Tf",
            OperatorKind::SetRenderMode => "Tr",
            OperatorKind::SetRise => "Ts",
            OperatorKind::BeginText => "BT",
            OperatorKind::EndText => "ET",
            OperatorKind::MoveText => "Td",
            OperatorKind::MoveTextSetLeading => "TD",
            OperatorKind::SetTextMatrix => "Tm",
            OperatorKind::NextLine => "T*",
            OperatorKind::ShowText => "Tj",
            OperatorKind::ShowTextArray => "TJ",
            OperatorKind::NextLineShowText => "'",
            OperatorKind::NextLineShowTextSpaced => "\"",
            OperatorKind::InvokeXObject => "Do",
            OperatorKind::BeginMarkedContent => "BMC",
            OperatorKind::BeginMarkedContentWithProperties => "BDC",
            OperatorKind::EndMarkedContent => "EMC",
        }
    }

    /// Whether the operator is only legal between `BT` and `ET`.
    pub fn requires_text_object(self) -> bool {
        matches!(
            self,
            OperatorKind::EndText
                | OperatorKind::MoveText
                | OperatorKind::MoveTextSetLeading
                | OperatorKind::SetTextMatrix
                | OperatorKind::NextLine
                | OperatorKind::ShowText
                | OperatorKind::ShowTextArray
                | OperatorKind::NextLineShowText
                | OperatorKind::NextLineShowTextSpaced
        )
    }
}

/// Mapping from operator mnemonic to behaviour.
///
/// # Examples
///
/// ```
/// use pdf_textflow::content::{OperatorKind, OperatorRegistry};
///
/// let registry = OperatorRegistry::with_defaults();
/// assert_eq!(registry.lookup("Tj"), Some(OperatorKind::ShowText));
/// assert_eq!(registry.lookup("re"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
    handlers: IndexMap<String, OperatorKind>,
}

impl OperatorRegistry {
    /// A registry with no operators; every operator is skipped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with every supported operator under its standard mnemonic.
    pub fn with_defaults() -> Self {
        let handlers = OperatorKind::ALL
            .iter()
            .map(|kind| (kind.mnemonic().to_string(), *kind))
            .collect();
        Self { handlers }
    }

    /// Build a registry from `(mnemonic, kind)` pairs.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateOperator`] if a mnemonic appears twice.
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, OperatorKind)>,
        S: Into<String>,
    {
        let mut registry = Self::empty();
        for (mnemonic, kind) in entries {
            registry.register(mnemonic, kind)?;
        }
        Ok(registry)
    }

    /// Register `kind` under `mnemonic`.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateOperator`] if the mnemonic is already registered;
    /// the existing entry is kept.
    pub fn register(&mut self, mnemonic: impl Into<String>, kind: OperatorKind) -> Result<()> {
        let mnemonic = mnemonic.into();
        if self.handlers.contains_key(&mnemonic) {
            return Err(Error::DuplicateOperator(mnemonic));
        }
        self.handlers.insert(mnemonic, kind);
        Ok(())
    }

    /// Look up the behaviour for a mnemonic.
    pub fn lookup(&self, mnemonic: &str) -> Option<OperatorKind> {
        self.handlers.get(mnemonic).copied()
    }

    /// Registered mnemonics in registration order.
    pub fn mnemonics(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Number of registered operators.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no operators are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_all_kinds() {
        let registry = OperatorRegistry::with_defaults();
        assert_eq!(registry.len(), OperatorKind::ALL.len());
        for kind in OperatorKind::ALL {
            assert_eq!(registry.lookup(kind.mnemonic()), Some(kind));
        }
    }

    #[test]
    fn test_quote_mnemonics() {
        let registry = OperatorRegistry::with_defaults();
        assert_eq!(registry.lookup("'"), Some(OperatorKind::NextLineShowText));
        assert_eq!(registry.lookup("\""), Some(OperatorKind::NextLineShowTextSpaced));
        assert_eq!(registry.lookup("T*"), Some(OperatorKind::NextLine));
    }

    #[test]
    fn test_register_duplicate_fails() {
        let mut registry = OperatorRegistry::empty();
        registry.register("Tj", OperatorKind::ShowText).unwrap();
        let err = registry.register("Tj", OperatorKind::ShowTextArray).unwrap_err();
        assert!(matches!(err, Error::DuplicateOperator(ref m) if m == "Tj"));
        assert_eq!(registry.lookup("Tj"), Some(OperatorKind::ShowText));
    }

    #[test]
    fn test_from_entries_duplicate_fails_fast() {
        let result = OperatorRegistry::from_entries([
            ("BT", OperatorKind::BeginText),
            ("ET", OperatorKind::EndText),
            ("BT", OperatorKind::BeginText),
        ]);
        assert!(matches!(result, Err(Error::DuplicateOperator(_))));
    }

    #[test]
    fn test_mnemonics_keep_registration_order() {
        let registry = OperatorRegistry::from_entries([
            ("ET", OperatorKind::EndText),
            ("BT", OperatorKind::BeginText),
        ])
        .unwrap();
        let names: Vec<&str> = registry.mnemonics().collect();
        assert_eq!(names, vec!["ET", "BT"]);
    }

    #[test]
    fn test_requires_text_object() {
        assert!(OperatorKind::ShowText.requires_text_object());
        assert!(OperatorKind::EndText.requires_text_object());
        assert!(!OperatorKind::BeginText.requires_text_object());
        assert!(!OperatorKind::SetFont.requires_text_object());
        assert!(!OperatorKind::SaveState.requires_text_object());
    }
}
