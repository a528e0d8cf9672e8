use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

pub type StateMap = BTreeMap<String, FieldValue>;

/// A sanitized value as stored in [`FormState`].
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    /// Result of numeric input that did not parse. Never equal to a real number.
    NotANumber,
    Bool(bool),
    /// Opaque to deep merge: replaced wholesale, never merged element-wise.
    List(Vec<FieldValue>),
    Object(StateMap),
}

impl FieldValue {
    /// Build a numeric value. NaN and the infinities fold into the sentinel, since
    /// JSON has no encoding for them.
    pub fn number(n: f64) -> Self {
        if n.is_finite() {
            FieldValue::Number(n)
        } else {
            FieldValue::NotANumber
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn as_object(&self) -> Option<&StateMap> {
        match self {
            FieldValue::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// True for values a `required` check rejects: empty text and the numeric sentinel.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::NotANumber => true,
            _ => false,
        }
    }

    /// String coercion used by text-based rules.
    pub fn display_string(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::NotANumber => "NaN".to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::List(items) => items
                .iter()
                .map(|v| v.display_string())
                .collect::<Vec<_>>()
                .join(","),
            FieldValue::Object(_) => self.to_json().to_string(),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Text(s) => JsonValue::String(s.clone()),
            FieldValue::Number(n) => number_to_json(*n),
            FieldValue::NotANumber => JsonValue::Null,
            FieldValue::Bool(b) => JsonValue::Bool(*b),
            FieldValue::List(items) => JsonValue::Array(items.iter().map(|v| v.to_json()).collect()),
            FieldValue::Object(m) => map_to_json(m),
        }
    }

    /// Inverse of [`FieldValue::to_json`]; `null` maps back to the numeric sentinel.
    pub fn from_json(v: &JsonValue) -> Self {
        match v {
            JsonValue::Null => FieldValue::NotANumber,
            JsonValue::Bool(b) => FieldValue::Bool(*b),
            JsonValue::Number(n) => n
                .as_f64()
                .map(FieldValue::number)
                .unwrap_or(FieldValue::NotANumber),
            JsonValue::String(s) => FieldValue::Text(s.clone()),
            JsonValue::Array(arr) => FieldValue::List(arr.iter().map(FieldValue::from_json).collect()),
            JsonValue::Object(obj) => FieldValue::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::number(n)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Number(n) => match whole_number(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            FieldValue::NotANumber => serializer.serialize_unit(),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for it in items {
                    seq.serialize_element(it)?;
                }
                seq.end()
            }
            FieldValue::Object(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

fn whole_number(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        Some(n as i64)
    } else {
        None
    }
}

fn format_number(n: f64) -> String {
    match whole_number(n) {
        Some(i) => i.to_string(),
        None => n.to_string(),
    }
}

fn number_to_json(n: f64) -> JsonValue {
    match whole_number(n) {
        Some(i) => JsonValue::from(i),
        None => serde_json::Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
    }
}

fn map_to_json(m: &StateMap) -> JsonValue {
    JsonValue::Object(m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
}

/// Address of a field: the sequence of `name`s from the schema root to the field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path such as `address.locationDetails.city`.
    pub fn parse(dotted: &str) -> Self {
        Self(
            dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect(),
        )
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segs = self.0.clone();
        segs.push(name.to_string());
        Self(segs)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(|s| s.as_str())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0.join("."))
        }
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        FieldPath::parse(s)
    }
}

impl<S: Into<String>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Current values of a form, keyed the same way the schema nests.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormState(StateMap);

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: StateMap) -> Self {
        Self(map)
    }

    /// Build a state from a JSON object; anything else yields an empty state.
    pub fn from_json(v: &JsonValue) -> Self {
        match FieldValue::from_json(v) {
            FieldValue::Object(m) => Self(m),
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Resolve a value by path. Intermediate segments must be objects.
    pub fn get_path(&self, path: &FieldPath) -> Option<&FieldValue> {
        let (first, rest) = path.segments().split_first()?;
        let mut cur = self.0.get(first)?;
        for seg in rest {
            cur = cur.as_object()?.get(seg)?;
        }
        Some(cur)
    }

    pub fn as_map(&self) -> &StateMap {
        &self.0
    }

    pub(crate) fn as_map_mut(&mut self) -> &mut StateMap {
        &mut self.0
    }

    pub fn into_map(self) -> StateMap {
        self.0
    }

    pub fn to_json(&self) -> JsonValue {
        map_to_json(&self.0)
    }
}

impl From<StateMap> for FormState {
    fn from(map: StateMap) -> Self {
        Self(map)
    }
}
