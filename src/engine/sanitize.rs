use crate::engine::value::FieldValue;
use crate::model::FieldKind;

/// The raw edit target as an input control reports it: its string value and, for
/// toggles, its checked state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawEdit {
    pub value: String,
    pub checked: bool,
}

impl RawEdit {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            checked: false,
        }
    }

    /// Numeric input arrives as text, exactly like a typed value would.
    pub fn number(n: impl ToString) -> Self {
        Self::text(n.to_string())
    }

    pub fn checked(checked: bool) -> Self {
        Self {
            value: "on".to_string(),
            checked,
        }
    }
}

/// Map a raw edit to the stored value for a field of `kind`.
/// Returns `None` for nested groups, which never take edits directly.
pub fn sanitize(kind: &FieldKind, raw: &RawEdit) -> Option<FieldValue> {
    match kind {
        FieldKind::Number => Some(parse_number(&raw.value)),
        FieldKind::Checkbox => Some(FieldValue::Bool(raw.checked)),
        FieldKind::Text | FieldKind::Select { .. } | FieldKind::Radio { .. } => {
            Some(FieldValue::Text(raw.value.clone()))
        }
        FieldKind::Nested { .. } => None,
    }
}

// Empty input counts as unparsable so a cleared required number still fails.
fn parse_number(s: &str) -> FieldValue {
    let t = s.trim();
    if t.is_empty() {
        return FieldValue::NotANumber;
    }
    match t.parse::<f64>() {
        Ok(n) => FieldValue::number(n),
        Err(_) => FieldValue::NotANumber,
    }
}
