use crate::engine::value::FieldPath;
use crate::error::EditError;
use crate::model::{FieldKind, FieldSpec, FormSchema};

/// A data-bearing field and its address.
#[derive(Clone, Debug)]
pub struct LeafField<'a> {
    pub path: FieldPath,
    pub spec: &'a FieldSpec,
}

/// One row of the render traversal.
#[derive(Clone, Debug)]
pub enum FlatField<'a> {
    /// Header for a nested group; its children follow at `depth + 1`.
    Group {
        path: FieldPath,
        depth: usize,
        spec: &'a FieldSpec,
    },
    Leaf {
        path: FieldPath,
        depth: usize,
        spec: &'a FieldSpec,
    },
    /// Nameless presentational node.
    Note { depth: usize, spec: &'a FieldSpec },
}

impl<'a> FlatField<'a> {
    pub fn depth(&self) -> usize {
        match self {
            FlatField::Group { depth, .. }
            | FlatField::Leaf { depth, .. }
            | FlatField::Note { depth, .. } => *depth,
        }
    }

    pub fn spec(&self) -> &'a FieldSpec {
        match self {
            FlatField::Group { spec, .. }
            | FlatField::Leaf { spec, .. }
            | FlatField::Note { spec, .. } => *spec,
        }
    }

    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            FlatField::Group { path, .. } | FlatField::Leaf { path, .. } => Some(path),
            FlatField::Note { .. } => None,
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, FlatField::Leaf { spec, .. } if !spec.disabled)
    }
}

/// Depth-first, declaration-ordered render traversal.
pub fn flatten(schema: &FormSchema) -> Vec<FlatField<'_>> {
    fn append<'a>(
        out: &mut Vec<FlatField<'a>>,
        fields: &'a [FieldSpec],
        parent: &FieldPath,
        depth: usize,
    ) {
        for spec in fields {
            let Some(name) = spec.name.as_deref() else {
                out.push(FlatField::Note { depth, spec });
                continue;
            };
            let path = parent.child(name);
            match &spec.kind {
                FieldKind::Nested { fields: children } => {
                    out.push(FlatField::Group {
                        path: path.clone(),
                        depth,
                        spec,
                    });
                    append(out, children, &path, depth + 1);
                }
                _ => out.push(FlatField::Leaf { path, depth, spec }),
            }
        }
    }

    let mut out = Vec::new();
    append(&mut out, schema.fields(), &FieldPath::root(), 0);
    out
}

/// Data-bearing leaves only, in declaration order.
pub fn leaves(schema: &FormSchema) -> Vec<LeafField<'_>> {
    flatten(schema)
        .into_iter()
        .filter_map(|f| match f {
            FlatField::Leaf { path, spec, .. } => Some(LeafField { path, spec }),
            _ => None,
        })
        .collect()
}

/// Resolve an edit target, rejecting unknown paths and nested groups.
pub fn resolve_leaf<'a>(schema: &'a FormSchema, path: &FieldPath) -> Result<&'a FieldSpec, EditError> {
    let spec = schema
        .find(path)
        .ok_or_else(|| EditError::UnknownField(path.to_string()))?;
    if spec.kind.is_nested() {
        return Err(EditError::NotALeaf(path.to_string()));
    }
    Ok(spec)
}
