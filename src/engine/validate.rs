use crate::engine::value::{FieldPath, FieldValue, FormState, StateMap};
use crate::model::{FieldKind, FieldSpec, FormSchema};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Required,
    /// The field's `validate` predicate returned false; carries the predicate label.
    Predicate(String),
    /// The caller's whole-form predicate rejected the state.
    External,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    /// `None` for an external rejection.
    pub path: Option<FieldPath>,
    pub kind: FailureKind,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, &self.kind) {
            (Some(p), FailureKind::Required) => write!(f, "'{p}' is required"),
            (Some(p), FailureKind::Predicate(label)) => {
                write!(f, "'{p}' failed validation ({label})")
            }
            (None, FailureKind::External) | (Some(_), FailureKind::External) => {
                f.write_str("rejected by form validator")
            }
            (None, kind) => write!(f, "{kind:?}"),
        }
    }
}

/// Outcome of one submit-time validation pass. Recomputed on every submit.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Verdict {
    failure: Option<Failure>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self { failure: None }
    }

    pub fn fail(failure: Failure) -> Self {
        Self {
            failure: Some(failure),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn reason(&self) -> Option<String> {
        self.failure.as_ref().map(|f| f.to_string())
    }
}

/// Check one field's own constraints against its resolved value.
///
/// For a nested field, `value` is its merged sub-object. Children are not visited here.
pub fn check_field(spec: &FieldSpec, value: Option<&FieldValue>) -> Option<FailureKind> {
    if spec.required {
        let missing = match (&spec.kind, value) {
            (_, None) => true,
            (FieldKind::Nested { .. }, Some(v)) => v.as_object().map_or(true, |m| m.is_empty()),
            (_, Some(v)) => v.is_blank(),
        };
        if missing {
            return Some(FailureKind::Required);
        }
    }
    if let Some(pred) = &spec.validate {
        if !pred.test(value) {
            return Some(FailureKind::Predicate(pred.label().to_string()));
        }
    }
    None
}

fn check_fields(fields: &[FieldSpec], parent: &FieldPath, state: Option<&StateMap>) -> Option<Failure> {
    for spec in fields {
        let Some(name) = spec.name.as_deref() else {
            continue;
        };
        let path = parent.child(name);
        let value = state.and_then(|m| m.get(name));
        if let FieldKind::Nested { fields: children } = &spec.kind {
            let sub = value.and_then(|v| v.as_object());
            if let Some(f) = check_fields(children, &path, sub) {
                return Some(f);
            }
        }
        if let Some(kind) = check_field(spec, value) {
            return Some(Failure {
                path: Some(path),
                kind,
            });
        }
    }
    None
}

/// Validate `state` against every field of `schema`, at every depth.
pub fn validate(schema: &FormSchema, state: &FormState) -> Verdict {
    match check_fields(schema.fields(), &FieldPath::root(), Some(state.as_map())) {
        Some(f) => Verdict::fail(f),
        None => Verdict::pass(),
    }
}

/// Schema verdict AND the caller's predicate. The predicate runs even when the schema
/// already failed.
pub fn validate_with(
    schema: &FormSchema,
    state: &FormState,
    external: Option<&dyn Fn(&FormState) -> bool>,
) -> Verdict {
    let verdict = validate(schema, state);
    let external_ok = external.map_or(true, |f| f(state));
    if verdict.is_ok() && !external_ok {
        return Verdict::fail(Failure {
            path: None,
            kind: FailureKind::External,
        });
    }
    verdict
}
