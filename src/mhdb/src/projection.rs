//! Client-supplied field projections.
//!
//! A projection is a set of dotted paths that are either all included or all
//! excluded. An empty projection allows everything.

use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error("Invalid projection: {0}")]
    Parse(String),

    #[error("Projection must be an object of field paths to booleans")]
    NotAnObject,

    #[error("Invalid projection value for {0}")]
    InvalidValue(String),

    #[error("Projection cannot mix included and excluded fields")]
    MixedModes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Include,
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    paths: BTreeSet<String>,
    mode: Mode,
}

impl Default for Projection {
    fn default() -> Self {
        Self::all()
    }
}

fn is_ancestor(ancestor: &str, path: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'.'
}

impl Projection {
    /// Allow every path
    pub fn all() -> Self {
        Self {
            paths: BTreeSet::new(),
            mode: Mode::Exclude,
        }
    }

    /// Parse `{"path": true, ...}` or `{"path": false, ...}` (1/0 also accepted)
    pub fn from_json(raw: &str) -> Result<Self, ProjectionError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ProjectionError::Parse(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, ProjectionError> {
        let object = value.as_object().ok_or(ProjectionError::NotAnObject)?;

        let mut included = BTreeSet::new();
        let mut excluded = BTreeSet::new();
        for (path, flag) in object {
            let allowed = match flag {
                Value::Bool(b) => *b,
                Value::Number(n) if n.as_i64() == Some(1) => true,
                Value::Number(n) if n.as_i64() == Some(0) => false,
                _ => return Err(ProjectionError::InvalidValue(path.clone())),
            };
            if allowed {
                included.insert(path.clone());
            } else {
                excluded.insert(path.clone());
            }
        }

        match (included.is_empty(), excluded.is_empty()) {
            (false, false) => Err(ProjectionError::MixedModes),
            (false, true) => Ok(Self {
                paths: included,
                mode: Mode::Include,
            }),
            _ => Ok(Self {
                paths: excluded,
                mode: Mode::Exclude,
            }),
        }
    }

    /// Parse a comma-separated list of included paths
    pub fn from_fields(raw: &str) -> Self {
        let paths: BTreeSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(String::from)
            .collect();

        if paths.is_empty() {
            Self::all()
        } else {
            Self {
                paths,
                mode: Mode::Include,
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether the subtree at `path` should be emitted.
    ///
    /// Including `a.b` allows `a` (so `a.b` can be reached), `a.b` and
    /// everything below it. Excluding `a.b` hides `a.b` and everything below.
    pub fn is_allowed(&self, path: &str) -> bool {
        match self.mode {
            Mode::Include => self.paths.iter().any(|included| {
                included == path || is_ancestor(included, path) || is_ancestor(path, included)
            }),
            Mode::Exclude => !self
                .paths
                .iter()
                .any(|excluded| excluded == path || is_ancestor(excluded, path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allows_everything() {
        let projection = Projection::all();
        assert!(projection.is_allowed("pieces"));
        assert!(projection.is_allowed("pieces.skills.skill"));
        assert!(Projection::from_json("{}").unwrap().is_allowed("bonus"));
    }

    #[test]
    fn test_inclusion() {
        let projection = Projection::from_json(r#"{"pieces.skills": true}"#).unwrap();
        assert!(projection.is_allowed("pieces"));
        assert!(projection.is_allowed("pieces.skills"));
        assert!(projection.is_allowed("pieces.skills.skillName"));
        assert!(!projection.is_allowed("pieces.slots"));
        assert!(!projection.is_allowed("bonus"));
    }

    #[test]
    fn test_exclusion() {
        let projection = Projection::from_json(r#"{"pieces.crafting": false}"#).unwrap();
        assert!(projection.is_allowed("pieces"));
        assert!(projection.is_allowed("pieces.skills"));
        assert!(!projection.is_allowed("pieces.crafting"));
        assert!(!projection.is_allowed("pieces.crafting.materials"));
    }

    #[test]
    fn test_prefix_is_not_ancestor() {
        let projection = Projection::from_fields("skills");
        assert!(projection.is_allowed("skills.skill"));
        assert!(!projection.is_allowed("skillsets"));
    }

    #[test]
    fn test_mixed_modes_rejected() {
        let err = Projection::from_json(r#"{"pieces": true, "bonus": false}"#).unwrap_err();
        assert_eq!(err, ProjectionError::MixedModes);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            Projection::from_json("[]").unwrap_err(),
            ProjectionError::NotAnObject
        );
        assert!(matches!(
            Projection::from_json("{nope"),
            Err(ProjectionError::Parse(_))
        ));
        assert_eq!(
            Projection::from_json(r#"{"pieces": "yes"}"#).unwrap_err(),
            ProjectionError::InvalidValue("pieces".to_string())
        );
    }

    #[test]
    fn test_fields_list() {
        let projection = Projection::from_fields("name, bonus.ranks ,");
        assert!(projection.is_allowed("bonus"));
        assert!(projection.is_allowed("bonus.ranks.skill"));
        assert!(!projection.is_allowed("pieces"));
        assert!(Projection::from_fields(" , ").is_empty());
    }
}
