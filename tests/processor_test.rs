use std::fs;
use std::path::{Path, PathBuf};

use phos::error::Error;
use phos::processor::{classify, ensure_output_dir, materialize, Action, FileKind, Materializer};
use phos::renderer::HandlebarsRenderer;
use phos::value::Value;
use serde_json::json;
use tempfile::TempDir;
use walkdir::WalkDir;

// Bytes that are not valid UTF-8 and contain template markers.
const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0xff, 0xfe, b'{', b'{', b'x', b'}', b'}', 0x00];

fn write(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn relative_entries(root: &Path) -> Vec<(PathBuf, bool)> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            (
                entry.path().strip_prefix(root).unwrap().to_path_buf(),
                entry.file_type().is_dir(),
            )
        })
        .collect()
}

#[test]
fn test_ensure_output_dir() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();

    // Non-existent directory
    let new_dir = path.join("new_dir");
    let resolved = ensure_output_dir(&new_dir, false).unwrap();
    assert!(resolved.is_absolute());

    // Existing directory without force
    assert!(matches!(
        ensure_output_dir(path, false),
        Err(Error::OutputDirectoryExistsError { .. })
    ));

    // Existing directory with force
    assert!(ensure_output_dir(path, true).is_ok());
}

#[test]
fn test_classify() {
    assert_eq!(classify("a/logo.png"), FileKind::Binary);
    assert_eq!(classify("archive.ZIP"), FileKind::Binary);
    assert_eq!(classify("a/readme.md"), FileKind::Text);
    assert_eq!(classify("Dockerfile"), FileKind::Text);
}

#[test_log::test]
fn test_end_to_end_readme_and_logo() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write(source.path(), "a/readme.md", b"Hello {{name}}!");
    write(source.path(), "a/logo.png", PNG_BYTES);

    let variables = Value::from(json!({"name": "Nova"}));
    let report = materialize(source.path(), dest.path(), &variables).unwrap();

    assert_eq!(fs::read_to_string(dest.path().join("a/readme.md")).unwrap(), "Hello Nova!");
    assert_eq!(fs::read(dest.path().join("a/logo.png")).unwrap(), PNG_BYTES);

    let actions: Vec<Action> = report.iter().map(|entry| entry.action).collect();
    assert_eq!(actions, vec![Action::Created, Action::Copied, Action::Rendered]);
}

#[test_log::test]
fn test_topology_is_preserved() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write(source.path(), "package.json", br#"{"name": "{{projectName}}"}"#);
    write(source.path(), "src/index.ts", b"export {};\n");
    write(source.path(), "src/api/user_api.ts", b"// {{projectName}}\n");
    write(source.path(), "public/favicon.ico", &[0, 1, 2, 3]);
    write(source.path(), ".pylintrc", b"[MASTER]\n");
    fs::create_dir_all(source.path().join("empty/nested")).unwrap();

    let variables = Value::from(json!({"projectName": "nova"}));
    let output = dest.path().join("project");
    let report = materialize(source.path(), &output, &variables).unwrap();

    assert_eq!(relative_entries(source.path()), relative_entries(&output));
    assert_eq!(report.len(), relative_entries(source.path()).len());
    assert_eq!(
        fs::read_to_string(output.join("package.json")).unwrap(),
        r#"{"name": "nova"}"#
    );
}

#[test]
fn test_tree_without_markers_is_identical() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write(source.path(), "main.py", b"print('hello')\n");
    write(source.path(), "static/font.woff2", &[0xde, 0xad, 0xbe, 0xef]);
    write(source.path(), "docs/guide.md", b"# Guide\n");

    materialize(source.path(), dest.path(), &Value::mapping()).unwrap();

    assert!(!dir_diff::is_different(source.path(), dest.path()).unwrap());
}

#[test]
fn test_binary_files_ignore_configuration() {
    let source = TempDir::new().unwrap();
    let dest_a = TempDir::new().unwrap();
    let dest_b = TempDir::new().unwrap();
    write(source.path(), "bundle.tar.gz", PNG_BYTES);

    materialize(source.path(), dest_a.path(), &Value::from(json!({"x": "one"}))).unwrap();
    materialize(source.path(), dest_b.path(), &Value::from(json!({"x": "two"}))).unwrap();

    assert_eq!(fs::read(dest_a.path().join("bundle.tar.gz")).unwrap(), PNG_BYTES);
    assert_eq!(fs::read(dest_b.path().join("bundle.tar.gz")).unwrap(), PNG_BYTES);
}

#[test]
fn test_materialize_is_repeatable() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write(source.path(), "nested/dir/config.toml", b"name = \"{{name}}\"\n");
    let variables = Value::from(json!({"name": "nova"}));

    materialize(source.path(), dest.path(), &variables).unwrap();
    let first = fs::read(dest.path().join("nested/dir/config.toml")).unwrap();
    materialize(source.path(), dest.path(), &variables).unwrap();
    let second = fs::read(dest.path().join("nested/dir/config.toml")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_syntax_error_aborts_without_writing_the_file() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write(source.path(), "broken.json", b"{{#eq flags.lint true}}never closed");

    let renderer = HandlebarsRenderer::new();
    let variables = Value::from(json!({"flags": {"lint": true}}));
    let err = Materializer::new(&renderer, &variables)
        .materialize(source.path(), dest.path())
        .unwrap_err();

    match err {
        Error::RenderError { path, source } => {
            assert!(path.ends_with("broken.json"));
            assert!(matches!(*source, Error::TemplateError(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dest.path().join("broken.json").exists());
}

#[test]
fn test_missing_source_is_fatal() {
    let dest = TempDir::new().unwrap();
    let err = materialize("/definitely/not/a/template", dest.path(), &Value::mapping()).unwrap_err();
    assert!(matches!(err, Error::SourceError { .. }));
}

#[test]
fn test_non_utf8_text_file_is_a_source_error() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write(source.path(), "image.raw", PNG_BYTES);

    let err = materialize(source.path(), dest.path(), &Value::mapping()).unwrap_err();
    assert!(matches!(err, Error::SourceError { .. }));
}

#[test]
fn test_destination_inside_source_is_rejected() {
    let source = TempDir::new().unwrap();
    write(source.path(), "file.txt", b"x");

    let err = materialize(source.path(), source.path().join("out"), &Value::mapping()).unwrap_err();
    assert!(matches!(err, Error::ConfigError(_)));
}

#[test]
fn test_destination_reaching_the_source_through_parent_dirs_is_rejected() {
    let base = TempDir::new().unwrap();
    write(base.path(), "tpl/file.txt", b"x");
    fs::create_dir_all(base.path().join("other")).unwrap();

    let dest = base.path().join("other/../tpl/out");
    let err = materialize(base.path().join("tpl"), &dest, &Value::mapping()).unwrap_err();

    assert!(matches!(err, Error::ConfigError(_)));
    assert!(!base.path().join("tpl/out").exists());
}

#[cfg(unix)]
#[test]
fn test_destination_reaching_the_source_through_a_symlink_is_rejected() {
    let base = TempDir::new().unwrap();
    write(base.path(), "tpl/file.txt", b"x");
    std::os::unix::fs::symlink(base.path().join("tpl"), base.path().join("link")).unwrap();

    let err =
        materialize(base.path().join("tpl"), base.path().join("link/out"), &Value::mapping()).unwrap_err();

    assert!(matches!(err, Error::ConfigError(_)));
    assert!(!base.path().join("tpl/out").exists());
}
