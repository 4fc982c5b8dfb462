//! The accessor engine: working tree, snapshot, configuration, and cache.

use std::fmt;
use std::str::FromStr;

use dot_path::{format_path, normalize, Path, Step, Syntax};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::cache::ResolutionCache;
use crate::resolve::{apply_plan, follow, follow_mut, plan_write, resolve, ResolvedStep};
use crate::ObjectPathError;

/// Path-addressable accessor over a JSON tree.
///
/// The engine owns a working tree, a snapshot of the originally loaded text
/// (so [`reset`](ObjectPath::reset) can rebuild the tree), the path syntax
/// configuration, an optional base path applied to every operation, and a
/// resolution cache. It is a single-owner, single-threaded primitive: reads
/// take `&mut self` because they record cache entries.
#[derive(Debug, Clone)]
pub struct ObjectPath {
    working: Value,
    snapshot: String,
    syntax: Syntax,
    base: String,
    cache: ResolutionCache,
}

impl ObjectPath {
    /// Create an engine over a pre-decoded tree.
    ///
    /// The tree is serialized once to form the reset snapshot.
    pub fn new(data: Value) -> Result<Self, ObjectPathError> {
        let snapshot = serde_json::to_string(&data)?;
        Ok(ObjectPath {
            working: data,
            snapshot,
            syntax: Syntax::default(),
            base: String::new(),
            cache: ResolutionCache::default(),
        })
    }

    /// Create an engine from JSON text, which is retained verbatim as the
    /// reset snapshot.
    pub fn from_json(text: &str) -> Result<Self, ObjectPathError> {
        let working: Value = serde_json::from_str(text)?;
        Ok(ObjectPath {
            working,
            snapshot: text.to_string(),
            syntax: Syntax::default(),
            base: String::new(),
            cache: ResolutionCache::default(),
        })
    }

    /// Replace the working tree and its snapshot; clears the cache.
    pub fn set_data(&mut self, data: Value) -> Result<&mut Self, ObjectPathError> {
        self.snapshot = serde_json::to_string(&data)?;
        self.working = data;
        self.cache.clear();
        Ok(self)
    }

    /// Replace the working tree from JSON text; clears the cache.
    pub fn set_data_json(&mut self, text: &str) -> Result<&mut Self, ObjectPathError> {
        self.working = serde_json::from_str(text)?;
        self.snapshot = text.to_string();
        self.cache.clear();
        Ok(self)
    }

    /// Discard all mutations and rebuild the working tree from the snapshot.
    pub fn reset(&mut self) -> Result<&mut Self, ObjectPathError> {
        self.working = serde_json::from_str(&self.snapshot)?;
        self.cache.clear();
        Ok(self)
    }

    /// Return the value at `path`, or `None` when the path does not resolve.
    ///
    /// Not-found is a normal result, not an error; descending through a
    /// scalar simply fails to resolve. The empty path (or the root symbol
    /// alone) returns the whole tree.
    pub fn get(&mut self, path: &str) -> Option<&Value> {
        let norm = self.normalize_path(path);
        self.lookup_norm(norm)
    }

    /// Whether `path` resolves to a node, including one holding null.
    pub fn exists(&mut self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Write `value` at `path`, creating missing intermediate maps.
    ///
    /// A missing sequence index is created only at the append position; a
    /// by-value selector must already match an element, since there is no
    /// index to create for it. The empty path replaces the whole tree.
    ///
    /// # Errors
    ///
    /// [`SelectorUnmatched`](ObjectPathError::SelectorUnmatched),
    /// [`InvalidStructure`](ObjectPathError::InvalidStructure),
    /// [`InvalidIndex`](ObjectPathError::InvalidIndex), or
    /// [`IndexOutOfBounds`](ObjectPathError::IndexOutOfBounds); the tree is
    /// unchanged when an error is returned.
    pub fn set(&mut self, path: &str, value: Value) -> Result<&mut Self, ObjectPathError> {
        self.write(path, value, false)
    }

    /// Write `value` at `path`, requiring the full path to already exist.
    ///
    /// # Errors
    ///
    /// [`PreconditionFailed`](ObjectPathError::PreconditionFailed) when any
    /// segment of the path does not resolve; nothing is written.
    pub fn replace(&mut self, path: &str, value: Value) -> Result<&mut Self, ObjectPathError> {
        self.write(path, value, true)
    }

    /// Delete the node at `path`.
    ///
    /// Removing a sequence element re-packs the sequence so indices stay
    /// contiguous and zero-based; removing a map key preserves the order of
    /// the remaining keys. The empty path clears the whole tree to null.
    /// Returns whether a node was actually deleted, so callers can tell
    /// "deleted" from "nothing to delete".
    pub fn unset(&mut self, path: &str) -> bool {
        let norm = self.normalize_path(path);
        if norm.is_empty() {
            self.working = Value::Null;
            self.cache.clear();
            return true;
        }
        let concrete = {
            let resolution = resolve(&self.working, &norm);
            if !resolution.found {
                return false;
            }
            resolution.concrete
        };
        let Some((last, parents)) = concrete.split_last() else {
            return false;
        };
        let Some(parent) = follow_mut(&mut self.working, parents) else {
            return false;
        };
        match (parent, last) {
            (Value::Object(map), ResolvedStep::Key(key)) => {
                map.shift_remove(key);
            }
            (Value::Array(arr), ResolvedStep::Index(idx)) if *idx < arr.len() => {
                arr.remove(*idx);
            }
            _ => return false,
        }
        self.cache.invalidate_unset(&norm);
        true
    }

    /// Copy the subtree at `source` to `destination`.
    ///
    /// The copy is deep: later writes through one path are never visible
    /// through the other.
    ///
    /// # Errors
    ///
    /// [`PreconditionFailed`](ObjectPathError::PreconditionFailed) when the
    /// source does not resolve, plus any [`set`](ObjectPath::set) error for
    /// the destination.
    pub fn copy(&mut self, source: &str, destination: &str) -> Result<&mut Self, ObjectPathError> {
        let norm = self.normalize_path(source);
        let display = format_path(&norm, &self.syntax);
        let Some(value) = self.lookup_norm(norm).cloned() else {
            return Err(ObjectPathError::PreconditionFailed { path: display });
        };
        self.set(destination, value)
    }

    /// The normalized path minus its last segment; the root symbol when the
    /// path has at most one segment.
    pub fn parent_path(&self, path: &str) -> String {
        let norm = self.normalize_path(path);
        if norm.len() <= 1 {
            return self.syntax.root.clone();
        }
        format_path(&norm[..norm.len() - 1], &self.syntax)
    }

    /// Resolve the parent of `path`.
    ///
    /// The parent is resolved absolutely: it may climb above the configured
    /// base path, which is not re-applied to it.
    pub fn parent(&mut self, path: &str) -> Option<&Value> {
        let mut norm = self.normalize_path(path);
        norm.pop();
        self.lookup_norm(norm)
    }

    /// The concrete path a resolution landed on, with by-value selectors
    /// replaced by the index they matched, joined by the current delimiter.
    ///
    /// `None` when the path does not resolve.
    pub fn resolved_path(&mut self, path: &str) -> Option<String> {
        let norm = self.normalize_path(path);
        if norm.is_empty() {
            return Some(self.syntax.root.clone());
        }
        let cached = self.cache.lookup(&norm).cloned();
        if let Some(concrete) = cached {
            if follow(&self.working, &concrete).is_some() {
                return Some(format_concrete(&concrete, &self.syntax));
            }
            self.cache.remove(&norm);
        }
        let resolution = resolve(&self.working, &norm);
        if !resolution.found {
            return None;
        }
        let text = format_concrete(&resolution.concrete, &self.syntax);
        let concrete = resolution.concrete;
        self.cache.record(norm, concrete);
        Some(text)
    }

    /// Scope every subsequent path under `base`; an empty base clears the
    /// scope. Paths that already start with the base are not prefixed twice.
    pub fn from(&mut self, base: &str) -> &mut Self {
        self.base = base.to_string();
        self
    }

    /// The current base path.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Change the path delimiter. Cached resolutions stay valid: cache keys
    /// are token sequences, not strings.
    pub fn set_delimiter(&mut self, delimiter: &str) -> &mut Self {
        self.syntax.delimiter = delimiter.to_string();
        self
    }

    pub fn delimiter(&self) -> &str {
        &self.syntax.delimiter
    }

    /// Change the root symbol. Cached resolutions stay valid.
    pub fn set_root_symbol(&mut self, root: &str) -> &mut Self {
        self.syntax.root = root.to_string();
        self
    }

    pub fn root_symbol(&self) -> &str {
        &self.syntax.root
    }

    /// Whether a resolution for `path` is currently memoized.
    pub fn is_cached(&self, path: &str) -> bool {
        self.cache.contains(&self.normalize_path(path))
    }

    /// Serialize the working tree.
    pub fn to_json(&self) -> Result<String, ObjectPathError> {
        Ok(serde_json::to_string(&self.working)?)
    }

    /// The working tree.
    pub fn to_value(&self) -> &Value {
        &self.working
    }

    /// Consume the engine and take the working tree.
    pub fn into_value(self) -> Value {
        self.working
    }

    fn normalize_path(&self, raw: &str) -> Path {
        normalize(raw, &self.base, &self.syntax)
    }

    /// Cache-aware resolution of an already-normalized path.
    fn lookup_norm(&mut self, norm: Path) -> Option<&Value> {
        if norm.is_empty() {
            return Some(&self.working);
        }
        let cached = self.cache.lookup(&norm).cloned();
        if let Some(concrete) = cached {
            if follow(&self.working, &concrete).is_some() {
                return follow(&self.working, &concrete);
            }
            // Shape changed under the entry; fall back to a full traversal.
            self.cache.remove(&norm);
        }
        let resolution = resolve(&self.working, &norm);
        let value = resolution.value;
        if resolution.found {
            self.cache.record(norm, resolution.concrete);
        }
        value
    }

    fn write(&mut self, path: &str, value: Value, must_exist: bool) -> Result<&mut Self, ObjectPathError> {
        let norm = self.normalize_path(path);
        if norm.is_empty() {
            self.working = value;
            self.cache.clear();
            return Ok(self);
        }
        let plan = plan_write(&self.working, &norm, must_exist, &self.syntax)?;
        let slot = apply_plan(&mut self.working, &plan).ok_or_else(|| {
            ObjectPathError::InvalidStructure {
                path: format_path(&norm, &self.syntax),
            }
        })?;
        *slot = value;
        self.cache.invalidate_write(&norm);
        // By-value selectors are derived identifiers; writes never record them.
        if !norm.iter().any(Step::is_select) {
            self.cache.record(norm, plan.concrete);
        }
        Ok(self)
    }
}

fn format_concrete(steps: &[ResolvedStep], syntax: &Syntax) -> String {
    let mut out = String::new();
    for (i, step) in steps.iter().enumerate() {
        if i > 0 {
            out.push_str(&syntax.delimiter);
        }
        match step {
            ResolvedStep::Key(key) => out.push_str(key),
            ResolvedStep::Index(idx) => {
                out.push_str(&idx.to_string());
            }
        }
    }
    out
}

impl FromStr for ObjectPath {
    type Err = ObjectPathError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        ObjectPath::from_json(text)
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.working)
    }
}

impl Serialize for ObjectPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.working.serialize(serializer)
    }
}
