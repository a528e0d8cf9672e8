//! Form-state engine: sanitizing edits, merging them into nested state, walking the
//! schema, validating on submit, and the controller that ties them together.

pub mod controller;
pub mod merge;
pub mod rules;
pub mod sanitize;
pub mod validate;
pub mod value;
pub mod walker;

pub use controller::{FormController, FormStatus, Phase, SubmitOutcome};
pub use merge::{merge, merge_into};
pub use rules::Predicate;
pub use sanitize::{sanitize, RawEdit};
pub use validate::{validate, validate_with, Verdict};
pub use value::{FieldPath, FieldValue, FormState};
pub use walker::{flatten, leaves, FlatField};
