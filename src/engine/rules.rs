//! Field predicates: closures supplied by callers, or declarative rules from a schema document.

use crate::engine::value::FieldValue;
use crate::error::SchemaError;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

type CheckFn = dyn Fn(Option<&FieldValue>) -> bool + Send + Sync;

/// A per-field `validate` predicate. Receives `None` for a field that was never edited.
#[derive(Clone)]
pub struct Predicate {
    label: String,
    check: Arc<CheckFn>,
}

impl Predicate {
    pub fn new<F>(label: impl Into<String>, check: F) -> Self
    where
        F: Fn(Option<&FieldValue>) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            check: Arc::new(check),
        }
    }

    /// Predicate over the string coercion of the value. Absent values fail.
    pub fn on_str<F>(label: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::new(label, move |v| {
            v.map(|v| check(&v.display_string())).unwrap_or(false)
        })
    }

    pub fn test(&self, value: Option<&FieldValue>) -> bool {
        (self.check)(value)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.label).finish()
    }
}

/// `validate:` as written in a document: a bare string is a regex pattern.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RuleDef {
    Pattern(String),
    Rule(Rule),
}

/// Declarative checks; every key present must hold.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub starts_with: Option<String>,
    #[serde(default)]
    pub ends_with: Option<String>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub one_of: Option<Vec<String>>,
}

impl RuleDef {
    pub fn into_rule(self) -> Rule {
        match self {
            RuleDef::Pattern(p) => Rule {
                pattern: Some(p),
                ..Default::default()
            },
            RuleDef::Rule(r) => r,
        }
    }
}

impl Rule {
    fn is_empty(&self) -> bool {
        self.pattern.is_none()
            && self.starts_with.is_none()
            && self.ends_with.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.min.is_none()
            && self.max.is_none()
            && self.one_of.is_none()
    }

    fn describe(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(p) = &self.pattern {
            parts.push(format!("pattern {p}"));
        }
        if let Some(s) = &self.starts_with {
            parts.push(format!("starts_with {s}"));
        }
        if let Some(s) = &self.ends_with {
            parts.push(format!("ends_with {s}"));
        }
        if let Some(n) = self.min_length {
            parts.push(format!("min_length {n}"));
        }
        if let Some(n) = self.max_length {
            parts.push(format!("max_length {n}"));
        }
        if let Some(n) = self.min {
            parts.push(format!("min {n}"));
        }
        if let Some(n) = self.max {
            parts.push(format!("max {n}"));
        }
        if let Some(list) = &self.one_of {
            parts.push(format!("one_of [{}]", list.join(", ")));
        }
        parts.join(", ")
    }

    /// Compile into a [`Predicate`]. `location` only feeds error messages.
    pub fn compile(self, location: &str) -> Result<Predicate, SchemaError> {
        if self.is_empty() {
            return Err(SchemaError::EmptyRule {
                location: location.to_string(),
            });
        }
        let regex = match &self.pattern {
            Some(p) => Some(Regex::new(p).map_err(|e| SchemaError::InvalidPattern {
                location: location.to_string(),
                pattern: p.clone(),
                message: e.to_string(),
            })?),
            None => None,
        };
        let label = self.describe();
        let rule = self;
        Ok(Predicate::new(label, move |value| {
            let Some(value) = value else {
                return false;
            };
            let s = value.display_string();
            if let Some(re) = &regex {
                if !re.is_match(&s) {
                    return false;
                }
            }
            if let Some(prefix) = &rule.starts_with {
                if !s.starts_with(prefix.as_str()) {
                    return false;
                }
            }
            if let Some(suffix) = &rule.ends_with {
                if !s.ends_with(suffix.as_str()) {
                    return false;
                }
            }
            let len = s.chars().count();
            if let Some(minl) = rule.min_length {
                if len < minl {
                    return false;
                }
            }
            if let Some(maxl) = rule.max_length {
                if len > maxl {
                    return false;
                }
            }
            if rule.min.is_some() || rule.max.is_some() {
                let n = match value {
                    FieldValue::Number(n) => Some(*n),
                    FieldValue::Text(t) => t.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
                    _ => None,
                };
                let Some(n) = n else {
                    return false;
                };
                if rule.min.is_some_and(|m| n < m) || rule.max.is_some_and(|m| n > m) {
                    return false;
                }
            }
            if let Some(list) = &rule.one_of {
                if !list.iter().any(|c| *c == s) {
                    return false;
                }
            }
            true
        }))
    }
}
