//! Assembly of the configuration mapping.
//!
//! Answers are layered, lowest precedence first: recipe defaults, an answers
//! file, JSON from stdin, and `--set key.path=value` overrides. Derived values
//! from the recipe are rendered last, so the mapping handed to the renderer is
//! complete before any template is touched.

use log::debug;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::recipe::Recipe;
use crate::renderer::TemplateRenderer;
use crate::value::Value;

fn ensure_mapping(value: Value, origin: &str) -> Result<Value> {
    match value {
        Value::Mapping(_) => Ok(value),
        Value::Null => Ok(Value::mapping()),
        _ => Err(Error::ConfigError(format!("{origin} must contain a mapping of answers"))),
    }
}

/// Serialization formats accepted for answers files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswersFormat {
    Json,
    Yaml,
}

impl AnswersFormat {
    /// Picks the format from a `.json`, `.yml` or `.yaml` extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(AnswersFormat::Json),
            "yml" | "yaml" => Some(AnswersFormat::Yaml),
            _ => None,
        }
    }
}

/// Parses answers in a known format. Empty input yields an empty mapping.
pub fn parse_answers_as(content: &str, origin: &str, format: AnswersFormat) -> Result<Value> {
    if content.trim().is_empty() {
        return Ok(Value::mapping());
    }
    let value: Value = match format {
        AnswersFormat::Json => serde_json::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse {origin} as JSON: {e}")))?,
        AnswersFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse {origin} as YAML: {e}")))?,
    };
    ensure_mapping(value, origin)
}

/// Parses answers given as JSON or YAML, trying JSON first. Empty input yields an
/// empty mapping.
pub fn parse_answers(content: &str, origin: &str) -> Result<Value> {
    if content.trim().is_empty() {
        return Ok(Value::mapping());
    }
    let value: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse {origin}: {e}")))?,
    };
    ensure_mapping(value, origin)
}

/// Loads answers from a file.
///
/// `.json` files are read as JSON and `.yml`/`.yaml` files as YAML; any other
/// extension is tried as JSON, then YAML.
pub fn load_answers_file<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    debug!("Loading answers from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let origin = format!("answers file '{}'", path.display());
    match AnswersFormat::from_path(path) {
        Some(format) => parse_answers_as(&content, &origin, format),
        None => parse_answers(&content, &origin),
    }
}

/// Loads answers piped on stdin.
pub fn load_from_stdin() -> Result<Value> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    parse_answers(&buffer, "stdin")
}

/// Splits a dotted key into path segments, rejecting empty segments.
pub fn split_key(key: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|segment| segment.trim().is_empty()) {
        return Err(Error::ConfigError(format!("invalid answer key '{key}'")));
    }
    Ok(segments)
}

/// Parses a `key.path=value` override.
///
/// The value is read as JSON when possible (`true`, `3`, `["a"]`) and kept as a
/// plain string otherwise.
pub fn parse_assignment(raw: &str) -> Result<(Vec<String>, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| Error::ConfigError(format!("expected KEY=VALUE, got '{raw}'")))?;
    let segments = split_key(key.trim())?
        .into_iter()
        .map(str::to_string)
        .collect();
    let value = serde_json::from_str::<serde_json::Value>(value)
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((segments, value))
}

/// Builds the final configuration mapping.
///
/// # Arguments
/// * `recipe` - Recipe supplying defaults and derived values
/// * `layers` - Answer mappings, lowest precedence first
/// * `assignments` - Raw `key.path=value` overrides
/// * `renderer` - Renderer used for derived values
pub fn build_configuration(
    recipe: &Recipe,
    layers: Vec<Value>,
    assignments: &[String],
    renderer: &dyn TemplateRenderer,
) -> Result<Value> {
    let mut configuration = Value::mapping();
    configuration.merge(recipe.defaults.clone());
    for layer in layers {
        configuration.merge(layer);
    }
    configuration = ensure_mapping(configuration, "recipe defaults")?;

    for raw in assignments {
        let (path, value) = parse_assignment(raw)?;
        configuration.set(&path, value);
    }

    for (key, template) in &recipe.derived {
        let path = split_key(key)?;
        let rendered = renderer.render(template, &configuration)?;
        debug!("Derived {key} = {rendered}");
        configuration.set(&path, Value::String(rendered));
    }

    Ok(configuration)
}
