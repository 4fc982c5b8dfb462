//! Dot-path syntax utilities.
//!
//! A dot-path addresses a node in a JSON-like tree with delimiter-separated
//! segment tokens, e.g. `schema.properties.title`. A path may start with a
//! root symbol (`$.schema.properties.title`), and a segment written `{v}`
//! selects a sequence element by its value instead of its index.
//!
//! This crate implements the pure string layer: turning raw path strings into
//! normalized token sequences and back. Resolution against a live tree lives
//! in the `object-path` crate.
//!
//! # Example
//!
//! ```
//! use dot_path::{normalize, format_path, Step, Syntax};
//!
//! let syntax = Syntax::default();
//!
//! let path = normalize("$.schema.enum.{Y}", "", &syntax);
//! assert_eq!(
//!     path,
//!     vec![
//!         Step::Key("schema".to_string()),
//!         Step::Key("enum".to_string()),
//!         Step::Select("Y".to_string()),
//!     ]
//! );
//!
//! assert_eq!(format_path(&path, &syntax), "schema.enum.{Y}");
//! ```

use std::borrow::Cow;

use thiserror::Error;

pub mod types;
pub use types::{Path, Step, Syntax};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DotPathError {
    #[error("root path has no parent")]
    NoParent,
}

/// Parse a single segment token.
///
/// A brace-wrapped token `{v}` parses to a by-value selector; anything else,
/// including the empty string, is a literal key token.
///
/// # Example
///
/// ```
/// use dot_path::{parse_step, Step};
///
/// assert_eq!(parse_step("title"), Step::Key("title".to_string()));
/// assert_eq!(parse_step("{Y}"), Step::Select("Y".to_string()));
/// assert_eq!(parse_step("{}"), Step::Select(String::new()));
/// assert_eq!(parse_step(""), Step::Key(String::new()));
/// ```
pub fn parse_step(token: &str) -> Step {
    if token.len() >= 2 && token.starts_with('{') && token.ends_with('}') {
        Step::Select(token[1..token.len() - 1].to_string())
    } else {
        Step::Key(token.to_string())
    }
}

/// Strip all leading occurrences of the root symbol and the delimiter, in any
/// combination.
///
/// # Example
///
/// ```
/// use dot_path::{strip_leading, Syntax};
///
/// let syntax = Syntax::default();
/// assert_eq!(strip_leading("$.form", &syntax), "form");
/// assert_eq!(strip_leading("$form", &syntax), "form");
/// assert_eq!(strip_leading(".form", &syntax), "form");
/// assert_eq!(strip_leading("$", &syntax), "");
/// assert_eq!(strip_leading("form", &syntax), "form");
/// ```
pub fn strip_leading<'a>(path: &'a str, syntax: &Syntax) -> &'a str {
    let mut rest = path;
    loop {
        if !syntax.root.is_empty() && rest.starts_with(syntax.root.as_str()) {
            rest = &rest[syntax.root.len()..];
        } else if !syntax.delimiter.is_empty() && rest.starts_with(syntax.delimiter.as_str()) {
            rest = &rest[syntax.delimiter.len()..];
        } else {
            return rest;
        }
    }
}

/// Normalize a raw path string into segment tokens.
///
/// Leading root-symbol/delimiter occurrences are stripped, the base path is
/// prepended unless the raw path already starts with it, and the result is
/// split on the delimiter. Empty segments produced by consecutive or trailing
/// delimiters are preserved as literal empty-string key tokens.
///
/// A path that is empty after stripping denotes the document root: it
/// normalizes to zero segments and the base path does not apply.
///
/// # Example
///
/// ```
/// use dot_path::{normalize, Step, Syntax};
///
/// let syntax = Syntax::default();
///
/// // The base path scopes relative paths...
/// let path = normalize("enum", "schema.language", &syntax);
/// assert_eq!(
///     path,
///     vec![
///         Step::Key("schema".to_string()),
///         Step::Key("language".to_string()),
///         Step::Key("enum".to_string()),
///     ]
/// );
///
/// // ...but is not applied twice to an already-absolute path.
/// assert_eq!(normalize("schema.language.enum", "schema.language", &syntax), path);
///
/// // The root symbol alone addresses the whole document.
/// assert_eq!(normalize("$", "schema.language", &syntax), Vec::<Step>::new());
/// ```
pub fn normalize(raw: &str, base: &str, syntax: &Syntax) -> Path {
    let stripped = strip_leading(raw, syntax);
    if stripped.is_empty() {
        return Vec::new();
    }
    let base = strip_leading(base, syntax);
    let joined: Cow<'_, str> = if base.is_empty() || starts_with_base(stripped, base, syntax) {
        Cow::Borrowed(stripped)
    } else {
        Cow::Owned(format!("{base}{}{stripped}", syntax.delimiter))
    };
    joined
        .split(syntax.delimiter.as_str())
        .map(parse_step)
        .collect()
}

/// True when `path` is exactly `base` or `base` followed by the delimiter.
fn starts_with_base(path: &str, base: &str, syntax: &Syntax) -> bool {
    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with(syntax.delimiter.as_str()),
        None => false,
    }
}

/// Format segment tokens back into a path string.
///
/// The inverse of [`normalize`] for paths without a base prefix; the root
/// symbol is never emitted.
pub fn format_path(path: &[Step], syntax: &Syntax) -> String {
    let mut out = String::new();
    for (i, step) in path.iter().enumerate() {
        if i > 0 {
            out.push_str(&syntax.delimiter);
        }
        out.push_str(&step.raw());
    }
    out
}

/// Get the parent path of a given path.
///
/// # Errors
///
/// Returns [`DotPathError::NoParent`] for the empty (root) path.
pub fn parent(path: &[Step]) -> Result<Path, DotPathError> {
    if path.is_empty() {
        return Err(DotPathError::NoParent);
    }
    Ok(path[..path.len() - 1].to_vec())
}

/// Check if `parent` path strictly contains the `child` path.
pub fn is_child(parent: &[Step], child: &[Step]) -> bool {
    parent.len() < child.len() && child[..parent.len()] == *parent
}

/// Check if two paths address the same node.
pub fn is_path_equal(p1: &[Step], p2: &[Step]) -> bool {
    p1 == p2
}

/// Check if a token is a strict non-negative sequence index.
///
/// Digits only, no leading zeros except `0` itself.
///
/// # Example
///
/// ```
/// use dot_path::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("42"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index(""));
/// ```
pub fn is_valid_index(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    let bytes = token.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}
