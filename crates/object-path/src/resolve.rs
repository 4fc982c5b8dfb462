//! Tree traversal: token resolution, write planning, and concrete-step replay.

use dot_path::{format_path, is_valid_index, Step, Syntax};
use serde_json::Value;

use crate::ObjectPathError;

/// A concrete location a segment token landed on after resolution.
///
/// By-value selectors are replaced by the index they matched, which makes a
/// `Vec<ResolvedStep>` a stable handle on a node for as long as the tree's
/// shape along it is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ResolvedStep {
    Key(String),
    Index(usize),
}

/// Outcome of a read resolution.
pub(crate) struct Resolution<'a> {
    pub value: Option<&'a Value>,
    pub concrete: Vec<ResolvedStep>,
    pub found: bool,
}

impl Resolution<'_> {
    fn miss() -> Self {
        Resolution {
            value: None,
            concrete: Vec::new(),
            found: false,
        }
    }
}

/// The comparison a by-value selector performs. Scalars compare by their
/// display text; null and containers never match.
pub(crate) fn scalar_matches(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s == needle,
        Value::Number(n) => n.to_string() == needle,
        Value::Bool(b) => needle == if *b { "true" } else { "false" },
        _ => false,
    }
}

/// Walk `path` against the tree without mutating it.
///
/// Sequences accept strict index tokens and by-value selectors; maps look the
/// raw token text up as a literal key, so a selector on a map is just the key
/// `{v}`. Descent stops at the first miss or at any scalar with segments
/// remaining, and the empty path always resolves to the whole tree.
pub(crate) fn resolve<'a>(root: &'a Value, path: &[Step]) -> Resolution<'a> {
    let mut current = root;
    let mut concrete = Vec::with_capacity(path.len());
    for step in path {
        match current {
            Value::Array(arr) => {
                let idx = match step {
                    Step::Key(k) => {
                        if !is_valid_index(k) {
                            return Resolution::miss();
                        }
                        match k.parse::<usize>() {
                            Ok(i) => i,
                            Err(_) => return Resolution::miss(),
                        }
                    }
                    Step::Select(v) => {
                        match arr.iter().position(|e| scalar_matches(e, v)) {
                            Some(i) => i,
                            None => return Resolution::miss(),
                        }
                    }
                };
                match arr.get(idx) {
                    Some(next) => {
                        concrete.push(ResolvedStep::Index(idx));
                        current = next;
                    }
                    None => return Resolution::miss(),
                }
            }
            Value::Object(map) => {
                let key = step.raw();
                match map.get(key.as_ref()) {
                    Some(next) => {
                        concrete.push(ResolvedStep::Key(key.into_owned()));
                        current = next;
                    }
                    None => return Resolution::miss(),
                }
            }
            _ => return Resolution::miss(),
        }
    }
    Resolution {
        value: Some(current),
        concrete,
        found: true,
    }
}

/// Replay previously resolved concrete steps.
pub(crate) fn follow<'a>(root: &'a Value, steps: &[ResolvedStep]) -> Option<&'a Value> {
    let mut current = root;
    for step in steps {
        current = match (current, step) {
            (Value::Array(arr), ResolvedStep::Index(i)) => arr.get(*i)?,
            (Value::Object(map), ResolvedStep::Key(k)) => map.get(k)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Replay previously resolved concrete steps, mutably.
pub(crate) fn follow_mut<'a>(root: &'a mut Value, steps: &[ResolvedStep]) -> Option<&'a mut Value> {
    let mut current = root;
    for step in steps {
        current = match (current, step) {
            (Value::Array(arr), ResolvedStep::Index(i)) => arr.get_mut(*i)?,
            (Value::Object(map), ResolvedStep::Key(k)) => map.get_mut(k)?,
            _ => return None,
        };
    }
    Some(current)
}

/// A validated write resolution: the concrete steps to follow and the
/// position from which missing containers must be created.
#[derive(Debug)]
pub(crate) struct WritePlan {
    pub concrete: Vec<ResolvedStep>,
    pub vivify_from: Option<usize>,
}

/// Validate a write path against the tree without mutating it.
///
/// All failure modes surface here, before anything is written, so a failed
/// write leaves the tree untouched. With `must_exist` every miss is a
/// precondition failure; otherwise the first missing map key or append-position
/// index starts vivification. A by-value selector cannot vivify (there is no
/// index to create for "the element equal to v"), and sequence writes past
/// the append position are rejected to keep sequences contiguous.
pub(crate) fn plan_write(
    root: &Value,
    path: &[Step],
    must_exist: bool,
    syntax: &Syntax,
) -> Result<WritePlan, ObjectPathError> {
    let mut current = root;
    let mut concrete = Vec::with_capacity(path.len());
    let mut vivify_from = None;
    for (pos, step) in path.iter().enumerate() {
        if vivify_from.is_some() {
            // Under a container created by this write every remaining token
            // is a fresh map key, selectors included.
            concrete.push(ResolvedStep::Key(step.raw().into_owned()));
            continue;
        }
        match current {
            Value::Array(arr) => match step {
                Step::Key(k) => {
                    if !is_valid_index(k) {
                        if must_exist {
                            return Err(precondition(path, pos, syntax));
                        }
                        return Err(ObjectPathError::InvalidIndex {
                            segment: k.clone(),
                            path: container_path(path, pos, syntax),
                        });
                    }
                    let idx: usize =
                        k.parse().map_err(|_| ObjectPathError::InvalidIndex {
                            segment: k.clone(),
                            path: container_path(path, pos, syntax),
                        })?;
                    if idx < arr.len() {
                        concrete.push(ResolvedStep::Index(idx));
                        current = &arr[idx];
                    } else if must_exist {
                        return Err(precondition(path, pos, syntax));
                    } else if idx == arr.len() {
                        concrete.push(ResolvedStep::Index(idx));
                        vivify_from = Some(pos);
                    } else {
                        return Err(ObjectPathError::IndexOutOfBounds {
                            index: idx,
                            len: arr.len(),
                            path: container_path(path, pos, syntax),
                        });
                    }
                }
                Step::Select(v) => match arr.iter().position(|e| scalar_matches(e, v)) {
                    Some(idx) => {
                        concrete.push(ResolvedStep::Index(idx));
                        current = &arr[idx];
                    }
                    None => {
                        if must_exist {
                            return Err(precondition(path, pos, syntax));
                        }
                        return Err(ObjectPathError::SelectorUnmatched {
                            selector: v.clone(),
                            path: container_path(path, pos, syntax),
                        });
                    }
                },
            },
            Value::Object(map) => {
                let key = step.raw();
                match map.get(key.as_ref()) {
                    Some(next) => {
                        concrete.push(ResolvedStep::Key(key.into_owned()));
                        current = next;
                    }
                    None => {
                        if must_exist {
                            return Err(precondition(path, pos, syntax));
                        }
                        concrete.push(ResolvedStep::Key(key.into_owned()));
                        vivify_from = Some(pos);
                    }
                }
            }
            _ => {
                if must_exist {
                    return Err(precondition(path, pos, syntax));
                }
                return Err(ObjectPathError::InvalidStructure {
                    path: container_path(path, pos, syntax),
                });
            }
        }
    }
    Ok(WritePlan {
        concrete,
        vivify_from,
    })
}

/// Materialize a validated plan, creating the planned containers, and return
/// a handle on the target slot.
///
/// `None` only if the plan no longer matches the tree shape.
pub(crate) fn apply_plan<'a>(root: &'a mut Value, plan: &WritePlan) -> Option<&'a mut Value> {
    let mut current = root;
    let len = plan.concrete.len();
    for (pos, step) in plan.concrete.iter().enumerate() {
        let creating = plan.vivify_from.is_some_and(|from| pos >= from);
        let leaf = pos + 1 == len;
        current = match (current, step) {
            (Value::Array(arr), ResolvedStep::Index(idx)) => {
                if creating && *idx == arr.len() {
                    arr.push(placeholder(leaf));
                }
                arr.get_mut(*idx)?
            }
            (Value::Object(map), ResolvedStep::Key(key)) => {
                if creating && !map.contains_key(key) {
                    map.insert(key.clone(), placeholder(leaf));
                }
                map.get_mut(key)?
            }
            _ => return None,
        };
    }
    Some(current)
}

// Intermediate vivified containers are maps; the leaf slot starts as null
// and is overwritten by the caller.
fn placeholder(leaf: bool) -> Value {
    if leaf {
        Value::Null
    } else {
        Value::Object(serde_json::Map::new())
    }
}

fn precondition(path: &[Step], pos: usize, syntax: &Syntax) -> ObjectPathError {
    ObjectPathError::PreconditionFailed {
        path: format_path(&path[..=pos], syntax),
    }
}

/// Display form of the container a segment failed in; the root symbol when
/// the failure is at the first segment.
fn container_path(path: &[Step], pos: usize, syntax: &Syntax) -> String {
    if pos == 0 {
        syntax.root.clone()
    } else {
        format_path(&path[..pos], syntax)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dot_path::normalize;
    use serde_json::json;

    fn path(raw: &str) -> Vec<Step> {
        normalize(raw, "", &Syntax::default())
    }

    #[test]
    fn test_resolve_map_and_index() {
        let doc = json!({"a": {"b": [10, 20, 30]}});
        let res = resolve(&doc, &path("a.b.1"));
        assert!(res.found);
        assert_eq!(res.value, Some(&json!(20)));
        assert_eq!(
            res.concrete,
            vec![
                ResolvedStep::Key("a".to_string()),
                ResolvedStep::Key("b".to_string()),
                ResolvedStep::Index(1),
            ]
        );
    }

    #[test]
    fn test_resolve_by_value() {
        let doc = json!(["A", "B", "C"]);
        let res = resolve(&doc, &path("{B}"));
        assert!(res.found);
        assert_eq!(res.concrete, vec![ResolvedStep::Index(1)]);

        let res = resolve(&doc, &path("{missing}"));
        assert!(!res.found);
        assert_eq!(res.value, None);
    }

    #[test]
    fn test_resolve_by_value_first_match_wins() {
        let doc = json!(["X", "X"]);
        let res = resolve(&doc, &path("{X}"));
        assert_eq!(res.concrete, vec![ResolvedStep::Index(0)]);
    }

    #[test]
    fn test_resolve_selector_is_literal_key_on_maps() {
        let doc = json!({"{Y}": "yes"});
        let res = resolve(&doc, &path("{Y}"));
        assert!(res.found);
        assert_eq!(res.value, Some(&json!("yes")));
    }

    #[test]
    fn test_resolve_scalar_stops_descent() {
        let doc = json!({"a": 5});
        let res = resolve(&doc, &path("a.b.c"));
        assert!(!res.found);
    }

    #[test]
    fn test_resolve_rejects_loose_indices() {
        let doc = json!([1, 2, 3]);
        assert!(!resolve(&doc, &path("01")).found);
        assert!(!resolve(&doc, &path("x")).found);
        assert!(!resolve(&doc, &path("3")).found);
    }

    #[test]
    fn test_plan_write_existing_path() {
        let doc = json!({"a": {"b": 1}});
        let plan = plan_write(&doc, &path("a.b"), false, &Syntax::default()).unwrap();
        assert_eq!(plan.vivify_from, None);
        assert_eq!(
            plan.concrete,
            vec![
                ResolvedStep::Key("a".to_string()),
                ResolvedStep::Key("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_plan_write_vivifies_from_first_miss() {
        let doc = json!({"a": {}});
        let plan = plan_write(&doc, &path("a.x.y"), false, &Syntax::default()).unwrap();
        assert_eq!(plan.vivify_from, Some(1));

        let mut doc = doc;
        let slot = apply_plan(&mut doc, &plan).unwrap();
        *slot = json!(7);
        assert_eq!(doc, json!({"a": {"x": {"y": 7}}}));
    }

    #[test]
    fn test_plan_write_sequence_append_only() {
        let doc = json!({"a": [1, 2]});
        let syntax = Syntax::default();

        let plan = plan_write(&doc, &path("a.2"), false, &syntax).unwrap();
        assert_eq!(plan.vivify_from, Some(1));

        let err = plan_write(&doc, &path("a.4"), false, &syntax).unwrap_err();
        assert!(matches!(
            err,
            ObjectPathError::IndexOutOfBounds { index: 4, len: 2, .. }
        ));
    }

    #[test]
    fn test_plan_write_selector_cannot_vivify() {
        let doc = json!({"a": ["X"]});
        let err = plan_write(&doc, &path("a.{Y}"), false, &Syntax::default()).unwrap_err();
        assert!(matches!(err, ObjectPathError::SelectorUnmatched { .. }));
    }

    #[test]
    fn test_plan_write_must_exist() {
        let doc = json!({});
        let err = plan_write(&doc, &path("x.y.z"), true, &Syntax::default()).unwrap_err();
        match err {
            ObjectPathError::PreconditionFailed { path } => assert_eq!(path, "x"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plan_write_scalar_in_the_way() {
        let doc = json!({"a": 5});
        let err = plan_write(&doc, &path("a.b"), false, &Syntax::default()).unwrap_err();
        assert!(matches!(err, ObjectPathError::InvalidStructure { .. }));
    }

    #[test]
    fn test_scalar_matches_display_text() {
        assert!(scalar_matches(&json!("Y"), "Y"));
        assert!(scalar_matches(&json!(42), "42"));
        assert!(scalar_matches(&json!(true), "true"));
        assert!(!scalar_matches(&json!(null), "null"));
        assert!(!scalar_matches(&json!([1]), "1"));
    }
}
