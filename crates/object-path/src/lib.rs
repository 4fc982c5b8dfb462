//! Path-addressable accessor over JSON trees.
//!
//! [`ObjectPath`] wraps a [`serde_json::Value`] and lets callers read, write,
//! test, copy, and delete any node in it through delimiter-separated path
//! strings, without walking intermediate containers by hand. Writes
//! auto-vivify missing intermediate maps, sequence elements can be addressed
//! by value with a `{v}` selector, and resolutions are memoized in a
//! per-instance cache that is invalidated on mutation.
//!
//! # Example
//!
//! ```
//! use object_path::ObjectPath;
//! use serde_json::json;
//!
//! let mut doc = ObjectPath::new(json!({
//!     "schema": {"language": {"enum": ["English", "Spanish"]}}
//! }))?;
//!
//! // Read and write by dot-path.
//! assert_eq!(doc.get("schema.language.enum.0"), Some(&json!("English")));
//! doc.set("schema.language.default", json!("English"))?;
//!
//! // Address a sequence element by its value.
//! doc.set("schema.language.enum.{Spanish}", json!("ES"))?;
//! assert_eq!(doc.get("schema.language.enum.1"), Some(&json!("ES")));
//!
//! // Deleting a sequence element keeps the sequence contiguous.
//! assert!(doc.unset("schema.language.enum.0"));
//! assert_eq!(doc.get("schema.language.enum.0"), Some(&json!("ES")));
//! # Ok::<(), object_path::ObjectPathError>(())
//! ```

use thiserror::Error;

mod cache;
mod engine;
mod resolve;

pub use engine::ObjectPath;

// Path syntax types, re-exported for callers that build or inspect paths.
pub use dot_path::{Path, Step, Syntax};

#[derive(Debug, Error)]
pub enum ObjectPathError {
    /// A write that requires the full path to exist did not find it.
    #[error("path does not exist: {path}")]
    PreconditionFailed { path: String },
    /// Resolution would have to descend through a scalar or null node.
    #[error("cannot descend into non-container at {path}")]
    InvalidStructure { path: String },
    /// A by-value selector matched no element; selectors cannot vivify.
    #[error("no sequence element matches {{{selector}}} under {path}")]
    SelectorUnmatched { selector: String, path: String },
    /// A token addressed a sequence but is not a valid index.
    #[error("{segment:?} is not a sequence index under {path}")]
    InvalidIndex { segment: String, path: String },
    /// A write index past the end of a sequence would leave a hole.
    #[error("index {index} is past the end of the sequence under {path} (len {len})")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        path: String,
    },
    /// The external JSON codec failed at load, reset, or serialize time.
    #[error(transparent)]
    Codec(#[from] serde_json::Error),
}
