use phos::answers::{build_configuration, load_answers_file};
use phos::recipe::parse_recipe;
use phos::renderer::HandlebarsRenderer;
use phos::value::Value;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_layers_override_defaults() {
    let recipe = parse_recipe(
        r#"{
            "defaults": {
                "projectName": "my-app",
                "frontend": {"framework": "astro", "eslint": true},
                "git": false
            }
        }"#,
    )
    .unwrap();
    let layers = vec![
        Value::from(json!({"frontend": {"framework": "svelte"}})),
        Value::from(json!({"git": true})),
    ];

    let configuration =
        build_configuration(&recipe, layers, &[], &HandlebarsRenderer::new()).unwrap();

    assert_eq!(
        configuration.to_json(),
        json!({
            "projectName": "my-app",
            "frontend": {"framework": "svelte", "eslint": true},
            "git": true
        })
    );
}

#[test]
fn test_assignments_win_over_layers() {
    let recipe = parse_recipe("{}").unwrap();
    let layers = vec![Value::from(json!({"frontend": {"eslint": true}}))];
    let assignments = vec!["frontend.eslint=false".to_string(), "projectName=nova".to_string()];

    let configuration =
        build_configuration(&recipe, layers, &assignments, &HandlebarsRenderer::new()).unwrap();

    assert_eq!(configuration.get_path("frontend.eslint"), &Value::Bool(false));
    assert_eq!(configuration.get_path("projectName"), &Value::from("nova"));
}

#[test]
fn test_derived_values_see_earlier_answers() {
    let recipe = parse_recipe(
        r#"
derived:
  backendName: "{{capitalize projectName}}_Backend"
  banner: "{{backendName}} ({{backend.framework}})"
"#,
    )
    .unwrap();
    let layers = vec![Value::from(json!({"projectName": "nova", "backend": {"framework": "fastapi"}}))];

    let configuration =
        build_configuration(&recipe, layers, &[], &HandlebarsRenderer::new()).unwrap();

    assert_eq!(configuration.get_path("backendName"), &Value::from("Nova_Backend"));
    assert_eq!(configuration.get_path("banner"), &Value::from("Nova_Backend (fastapi)"));
}

#[test]
fn test_invalid_derived_template_is_fatal() {
    let recipe = parse_recipe(r#"{"derived": {"x": "{{#if a}}unclosed"}}"#).unwrap();
    assert!(build_configuration(&recipe, Vec::new(), &[], &HandlebarsRenderer::new()).is_err());
}

#[test]
fn test_non_mapping_defaults_are_rejected() {
    let recipe = parse_recipe(r#"{"defaults": "nope"}"#).unwrap();
    assert!(build_configuration(&recipe, Vec::new(), &[], &HandlebarsRenderer::new()).is_err());
}

#[test]
fn test_load_answers_file() {
    let temp_dir = TempDir::new().unwrap();
    let yaml = temp_dir.path().join("answers.yaml");
    fs::write(&yaml, "projectName: nova\nbackend:\n  eslint: false\n").unwrap();
    let json_path = temp_dir.path().join("answers.json");
    fs::write(&json_path, r#"{"projectName": "nova"}"#).unwrap();

    let answers = load_answers_file(&yaml).unwrap();
    assert_eq!(answers.get_path("backend.eslint"), &Value::Bool(false));
    let answers = load_answers_file(&json_path).unwrap();
    assert_eq!(answers.get_path("projectName"), &Value::from("nova"));

    assert!(load_answers_file(temp_dir.path().join("missing.json")).is_err());
}

#[test]
fn test_answers_file_format_follows_extension() {
    let temp_dir = TempDir::new().unwrap();
    let json_path = temp_dir.path().join("answers.json");
    fs::write(&json_path, "projectName: nova\n").unwrap();
    let err = load_answers_file(&json_path).unwrap_err();
    assert!(err.to_string().contains("as JSON"));

    let yml_path = temp_dir.path().join("answers.yml");
    fs::write(&yml_path, "projectName: nova\n").unwrap();
    assert_eq!(load_answers_file(&yml_path).unwrap().get_path("projectName"), &Value::from("nova"));

    let other = temp_dir.path().join("answers.txt");
    fs::write(&other, "projectName: nova\n").unwrap();
    assert_eq!(load_answers_file(&other).unwrap().get_path("projectName"), &Value::from("nova"));
}
