pub mod engine;
pub mod error;
pub mod model;
pub mod services;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use engine::{FieldPath, FieldValue, FormController, FormState, RawEdit};
pub use error::{EditError, SchemaError};
pub use model::{FieldSpec, FormDocument, FormSchema, FormSettings, SelectOption};
