use super::*;
use std::fs;
use tempfile::tempdir;

const CONTACT_YAML: &str = r#"
title: Contact
status_timeout_ms: 1500
fields:
  - type: text
    name: name
    label: Name
    required: true
  - type: nested
    name: address
    fields:
      - type: number
        name: zipcode
      - type: text
        name: contact
        validate:
          starts_with: "+91"
"#;

#[test]
fn explicit_argument_wins_over_env_and_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(SCHEMA_FILE), CONTACT_YAML).unwrap();
    let arg = PathBuf::from("/somewhere/form.yaml");
    let (p, src) = resolve_schema_path(Some(arg.as_path()), Some("/env/form.yaml"), dir.path()).unwrap();
    assert_eq!(p, arg);
    assert_eq!(src, SchemaSource::Argument);
    let (p, src) = resolve_schema_path(None, Some("/env/form.yaml"), dir.path()).unwrap();
    assert_eq!(p, PathBuf::from("/env/form.yaml"));
    assert_eq!(src, SchemaSource::Env);
}

#[test]
fn empty_env_falls_through_to_working_dir() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(SCHEMA_FILE), CONTACT_YAML).unwrap();
    let (p, src) = resolve_schema_path(None, Some(""), dir.path()).unwrap();
    assert_eq!(p, dir.path().join(SCHEMA_FILE));
    assert_eq!(src, SchemaSource::WorkingDir);
}

#[test]
fn tui_dir_is_found_in_ancestors() {
    let dir = tempdir().unwrap();
    let tui = dir.path().join(".tui");
    fs::create_dir_all(&tui).unwrap();
    fs::write(tui.join(SCHEMA_FILE), CONTACT_YAML).unwrap();
    let deep = dir.path().join("a").join("b");
    fs::create_dir_all(&deep).unwrap();
    let (p, src) = resolve_schema_path(None, None, &deep).unwrap();
    assert_eq!(p, tui.join(SCHEMA_FILE));
    assert_eq!(src, SchemaSource::Ancestor);
}

#[test]
fn missing_schema_resolves_to_none() {
    // A relative cwd only walks its own components, ending at the package root
    // where cargo runs tests. None of them holds a schema.
    let cwd = Path::new("target/no-such-dir/deeper");
    assert!(!cwd.join(SCHEMA_FILE).exists());
    assert!(cwd
        .ancestors()
        .all(|dir| !dir.join(".tui").join(SCHEMA_FILE).exists()));
    assert_eq!(resolve_schema_path(None, None, cwd), None);
    assert_eq!(resolve_schema_path(None, Some(""), cwd), None);
}

#[test]
fn yaml_document_loads_into_schema_and_settings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("contact.yaml");
    fs::write(&path, CONTACT_YAML).unwrap();
    let (schema, settings) = load_form_document(&path).unwrap().into_form().unwrap();
    assert_eq!(settings.title, "Contact");
    assert_eq!(settings.status_timeout.as_millis(), 1500);
    assert!(schema.find(&"address.contact".into()).unwrap().validate.is_some());
}

#[test]
fn json_documents_parse_too() {
    let doc = parse_form_document(
        r#"{"fields": [{"type": "checkbox", "name": "subscribe"}]}"#,
        Path::new("inline.json"),
    )
    .unwrap();
    assert_eq!(doc.fields.len(), 1);
    assert!(doc.reset_on_success);
}

#[test]
fn parse_errors_name_the_file() {
    let err = parse_form_document("fields: [", Path::new("broken.yaml")).unwrap_err();
    assert!(format!("{err:#}").contains("broken.yaml"));
    let err = load_form_document(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(format!("{err}").contains("reading form document"));
}
