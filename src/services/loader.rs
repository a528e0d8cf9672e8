use crate::model::FormDocument;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const SCHEMA_ENV: &str = "DYNFORM_SCHEMA";
pub const SCHEMA_FILE: &str = "dynform.yaml";

/// Where a schema path came from, for the startup log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaSource {
    Argument,
    Env,
    WorkingDir,
    Ancestor,
}

/// Pick the schema document: explicit argument, then `DYNFORM_SCHEMA`, then
/// `dynform.yaml` in `cwd`, then `.tui/dynform.yaml` in `cwd` or any ancestor.
pub fn resolve_schema_path(
    arg: Option<&Path>,
    env: Option<&str>,
    cwd: &Path,
) -> Option<(PathBuf, SchemaSource)> {
    if let Some(p) = arg {
        return Some((p.to_path_buf(), SchemaSource::Argument));
    }
    if let Some(p) = env.filter(|s| !s.is_empty()) {
        return Some((PathBuf::from(p), SchemaSource::Env));
    }
    let here = cwd.join(SCHEMA_FILE);
    if here.is_file() {
        return Some((here, SchemaSource::WorkingDir));
    }
    cwd.ancestors()
        .map(|dir| dir.join(".tui").join(SCHEMA_FILE))
        .find(|p| p.is_file())
        .map(|p| (p, SchemaSource::Ancestor))
}

/// Parse a form document. YAML is a superset of JSON, so both go through serde_yaml.
pub fn parse_form_document(text: &str, origin: &Path) -> Result<FormDocument> {
    serde_yaml::from_str(text).with_context(|| format!("parsing form document: {origin:?}"))
}

pub fn load_form_document(path: &Path) -> Result<FormDocument> {
    let s = fs::read_to_string(path).with_context(|| format!("reading form document: {path:?}"))?;
    parse_form_document(&s, path)
}

/// Resolve from the process environment and load.
pub fn discover_form_document(arg: Option<&Path>) -> Result<(PathBuf, FormDocument)> {
    let env = std::env::var(SCHEMA_ENV).ok();
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let (path, source) = resolve_schema_path(arg, env.as_deref(), &cwd).ok_or_else(|| {
        anyhow!(
            "No form schema found. Pass a path, set {SCHEMA_ENV}, or place {SCHEMA_FILE} in CWD or .tui/ of an ancestor"
        )
    })?;
    tracing::info!(path = %path.display(), ?source, "loading form schema");
    let doc = load_form_document(&path)?;
    Ok((path, doc))
}

#[cfg(test)]
mod loader_tests;
