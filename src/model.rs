use crate::engine::rules::{Predicate, RuleDef};
use crate::engine::value::FieldPath;
use crate::error::SchemaError;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

pub const DEFAULT_STATUS_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum FieldKind {
    Text,
    Number,
    Checkbox,
    Select { options: Vec<SelectOption> },
    Radio { options: Vec<SelectOption> },
    // `nested` and `object` in documents
    Nested { fields: Vec<FieldSpec> },
}

impl FieldKind {
    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Select { .. } => "select",
            FieldKind::Radio { .. } => "radio",
            FieldKind::Nested { .. } => "nested",
        }
    }

    pub fn options(&self) -> Option<&[SelectOption]> {
        match self {
            FieldKind::Select { options } | FieldKind::Radio { options } => Some(options),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&[FieldSpec]> {
        match self {
            FieldKind::Nested { fields } => Some(fields),
            _ => None,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, FieldKind::Nested { .. })
    }
}

/// One schema node.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: Option<String>,
    pub label: String,
    pub placeholder: Option<String>,
    pub required: bool,
    pub disabled: bool,
    pub kind: FieldKind,
    pub validate: Option<Predicate>,
}

impl FieldSpec {
    fn with_kind(name: &str, kind: FieldKind) -> Self {
        Self {
            name: Some(name.to_string()),
            label: name.to_string(),
            placeholder: None,
            required: false,
            disabled: false,
            kind,
            validate: None,
        }
    }

    pub fn text(name: &str) -> Self {
        Self::with_kind(name, FieldKind::Text)
    }

    pub fn number(name: &str) -> Self {
        Self::with_kind(name, FieldKind::Number)
    }

    pub fn checkbox(name: &str) -> Self {
        Self::with_kind(name, FieldKind::Checkbox)
    }

    pub fn select(name: &str, options: Vec<SelectOption>) -> Self {
        Self::with_kind(name, FieldKind::Select { options })
    }

    pub fn radio(name: &str, options: Vec<SelectOption>) -> Self {
        Self::with_kind(name, FieldKind::Radio { options })
    }

    pub fn nested(name: &str, fields: Vec<FieldSpec>) -> Self {
        Self::with_kind(name, FieldKind::Nested { fields })
    }

    /// A nameless, presentational node. Never stores data.
    pub fn note(label: &str) -> Self {
        Self {
            name: None,
            label: label.to_string(),
            placeholder: None,
            required: false,
            disabled: true,
            kind: FieldKind::Text,
            validate: None,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn validate(mut self, predicate: Predicate) -> Self {
        self.validate = Some(predicate);
        self
    }
}

/// Ordered top-level fields. Only constructed through [`FormSchema::new`], which checks
/// the tree is well formed.
#[derive(Clone, Debug)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        check_siblings(&fields, &FieldPath::root())?;
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Find the node addressed by `path`, descending through nested groups.
    pub fn find(&self, path: &FieldPath) -> Option<&FieldSpec> {
        let mut level: &[FieldSpec] = &self.fields;
        let mut found: Option<&FieldSpec> = None;
        for seg in path.segments() {
            let spec = level.iter().find(|f| f.name.as_deref() == Some(seg.as_str()))?;
            level = spec.kind.children().unwrap_or(&[]);
            found = Some(spec);
        }
        found
    }
}

fn location(parent: &FieldPath, idx: usize, name: Option<&str>) -> String {
    match name {
        Some(n) => parent.child(n).to_string(),
        None if parent.is_root() => format!("fields[{idx}]"),
        None => format!("{parent}.fields[{idx}]"),
    }
}

fn check_siblings(fields: &[FieldSpec], parent: &FieldPath) -> Result<(), SchemaError> {
    let mut names: HashSet<&str> = HashSet::new();
    for (i, f) in fields.iter().enumerate() {
        let loc = location(parent, i, f.name.as_deref());
        if f.name.is_none() && (f.required || f.validate.is_some()) {
            return Err(SchemaError::UnnamedConstrained { location: loc });
        }
        if let Some(name) = f.name.as_deref() {
            if name.is_empty() || name.contains('.') {
                return Err(SchemaError::InvalidName {
                    name: name.to_string(),
                    location: loc,
                });
            }
            if !names.insert(name) {
                return Err(SchemaError::DuplicateName {
                    name: name.to_string(),
                    parent: parent.to_string(),
                });
            }
        }
        match &f.kind {
            FieldKind::Select { options } | FieldKind::Radio { options } => {
                if options.is_empty() {
                    return Err(SchemaError::MissingOptions {
                        kind: f.kind.tag().to_string(),
                        location: loc,
                    });
                }
            }
            FieldKind::Nested { fields: children } => {
                let Some(name) = f.name.as_deref() else {
                    return Err(SchemaError::UnnamedNested { location: loc });
                };
                if children.is_empty() {
                    return Err(SchemaError::MissingFields { location: loc });
                }
                check_siblings(children, &parent.child(name))?;
            }
            FieldKind::Text | FieldKind::Number | FieldKind::Checkbox => {}
        }
    }
    Ok(())
}

// ---- Document form (YAML / JSON) -------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct FieldDef {
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub options: Option<Vec<SelectOption>>,
    #[serde(default)]
    pub fields: Option<Vec<FieldDef>>,
    #[serde(default)]
    pub validate: Option<RuleDef>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FormDocument {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_status_timeout_ms")]
    pub status_timeout_ms: u64,
    #[serde(default = "default_true")]
    pub reset_on_success: bool,
    pub fields: Vec<FieldDef>,
}

/// Controller settings carried by a form document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormSettings {
    pub title: String,
    pub status_timeout: Duration,
    pub reset_on_success: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            title: "Dynamic Form".to_string(),
            status_timeout: Duration::from_millis(DEFAULT_STATUS_TIMEOUT_MS),
            reset_on_success: true,
        }
    }
}

fn default_status_timeout_ms() -> u64 {
    DEFAULT_STATUS_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

impl FormDocument {
    pub fn into_form(self) -> Result<(FormSchema, FormSettings), SchemaError> {
        let fields = convert_defs(self.fields, &FieldPath::root())?;
        let schema = FormSchema::new(fields)?;
        let settings = FormSettings {
            title: self.title.unwrap_or_else(|| FormSettings::default().title),
            status_timeout: Duration::from_millis(self.status_timeout_ms),
            reset_on_success: self.reset_on_success,
        };
        Ok((schema, settings))
    }
}

fn convert_defs(defs: Vec<FieldDef>, parent: &FieldPath) -> Result<Vec<FieldSpec>, SchemaError> {
    defs.into_iter()
        .enumerate()
        .map(|(i, d)| convert_def(d, parent, i))
        .collect()
}

fn convert_def(def: FieldDef, parent: &FieldPath, idx: usize) -> Result<FieldSpec, SchemaError> {
    let loc = location(parent, idx, def.name.as_deref());
    let tag = def.kind.to_ascii_lowercase();
    let foreign = match tag.as_str() {
        "select" | "radio" => def.fields.is_some().then_some("fields"),
        "nested" | "object" => def.options.is_some().then_some("options"),
        "text" | "number" | "checkbox" => match (&def.options, &def.fields) {
            (Some(_), _) => Some("options"),
            (None, Some(_)) => Some("fields"),
            (None, None) => None,
        },
        _ => None,
    };
    if let Some(key) = foreign {
        return Err(SchemaError::UnexpectedKey {
            key: key.to_string(),
            kind: tag,
            location: loc,
        });
    }
    let kind = match tag.as_str() {
        "text" => FieldKind::Text,
        "number" => FieldKind::Number,
        "checkbox" => FieldKind::Checkbox,
        "select" => FieldKind::Select {
            options: def.options.unwrap_or_default(),
        },
        "radio" => FieldKind::Radio {
            options: def.options.unwrap_or_default(),
        },
        "nested" | "object" => {
            let here = match def.name.as_deref() {
                Some(n) => parent.child(n),
                None => return Err(SchemaError::UnnamedNested { location: loc }),
            };
            FieldKind::Nested {
                fields: convert_defs(def.fields.unwrap_or_default(), &here)?,
            }
        }
        other => {
            return Err(SchemaError::UnknownKind {
                kind: other.to_string(),
                location: loc,
            })
        }
    };
    let validate = match def.validate {
        Some(rule) => Some(rule.into_rule().compile(&loc)?),
        None => None,
    };
    let label = def
        .label
        .or_else(|| def.name.clone())
        .unwrap_or_default();
    Ok(FieldSpec {
        name: def.name,
        label,
        placeholder: def.placeholder,
        required: def.required,
        disabled: def.disabled,
        kind,
        validate,
    })
}
