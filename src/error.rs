use thiserror::Error;

/// Problems found while loading a form schema. Raised once, at load time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown field type '{kind}' at {location}")]
    UnknownKind { kind: String, location: String },

    #[error("field '{location}' of type {kind} requires non-empty 'options'")]
    MissingOptions { kind: String, location: String },

    #[error("nested field '{location}' requires non-empty 'fields'")]
    MissingFields { location: String },

    #[error("nested field at {location} must have a 'name'")]
    UnnamedNested { location: String },

    #[error("field at {location} has no 'name' but is required or validated")]
    UnnamedConstrained { location: String },

    #[error("field '{location}' of type {kind} does not take '{key}'")]
    UnexpectedKey {
        key: String,
        kind: String,
        location: String,
    },

    #[error("invalid field name '{name}' at {location}: names must be non-empty and contain no '.'")]
    InvalidName { name: String, location: String },

    #[error("duplicate field name '{name}' under {parent}")]
    DuplicateName { name: String, parent: String },

    #[error("field '{location}' has an invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        location: String,
        pattern: String,
        message: String,
    },

    #[error("field '{location}' has an empty validation rule")]
    EmptyRule { location: String },
}

/// An edit that cannot be routed to a data-bearing field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("no field at path '{0}'")]
    UnknownField(String),

    #[error("'{0}' is a nested group and does not accept edits")]
    NotALeaf(String),
}
