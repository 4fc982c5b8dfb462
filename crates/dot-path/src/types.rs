//! Type definitions for dot-path syntax.

use std::borrow::Cow;

/// A single path segment token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// A literal key or index token.
    Key(String),
    /// A by-value selector, written `{v}` in a path string. Addresses the
    /// first sequence element whose value equals `v`.
    Select(String),
}

impl Step {
    /// The raw token text as it appears in a path string.
    ///
    /// Map lookups also use this text: a by-value selector is not meaningful
    /// on a map, so `{v}` is treated as the literal key `{v}` there.
    pub fn raw(&self) -> Cow<'_, str> {
        match self {
            Step::Key(k) => Cow::Borrowed(k.as_str()),
            Step::Select(v) => Cow::Owned(format!("{{{v}}}")),
        }
    }

    /// Whether this step is a by-value selector.
    pub fn is_select(&self) -> bool {
        matches!(self, Step::Select(_))
    }
}

/// A normalized path: an ordered sequence of segment tokens.
///
/// Normalized paths carry no root symbol and no leading delimiter, and are
/// independent of the syntax that produced them.
pub type Path = Vec<Step>;

/// Path syntax configuration.
///
/// The delimiter joins segments (default `.`) and the root symbol may prefix
/// a path to denote the document root (default `$`). The by-value selector
/// braces are part of the token grammar and are not configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    /// Segment separator.
    pub delimiter: String,
    /// Document-root marker.
    pub root: String,
}

impl Syntax {
    pub fn new(delimiter: impl Into<String>, root: impl Into<String>) -> Self {
        Syntax {
            delimiter: delimiter.into(),
            root: root.into(),
        }
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Syntax::new(".", "$")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_raw_key() {
        let step = Step::Key("title".to_string());
        assert_eq!(step.raw(), "title");
        assert!(!step.is_select());
    }

    #[test]
    fn test_step_raw_select() {
        let step = Step::Select("English".to_string());
        assert_eq!(step.raw(), "{English}");
        assert!(step.is_select());
    }

    #[test]
    fn test_default_syntax() {
        let syntax = Syntax::default();
        assert_eq!(syntax.delimiter, ".");
        assert_eq!(syntax.root, "$");
    }
}
