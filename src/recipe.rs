//! Recipe handling for Phos templates.
//!
//! A template root may carry a recipe (`phos.json`, `phos.yml` or `phos.yaml`)
//! describing default answers, derived values and the post-processing that
//! follows materialization. With a recipe the files to materialize live in a
//! subdirectory (`template` unless the recipe says otherwise); without one the
//! template root itself is materialized.

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use crate::constants::{DEFAULT_TEMPLATE_DIR, RECIPE_FILES};
use crate::error::{Error, Result};
use crate::renderer::evaluate_condition;
use crate::value::Value;

/// Guard shared by every post-processing rule.
///
/// `when` must be truthy and `unless` must be falsy; a missing guard always holds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub when: Option<String>,
    #[serde(default)]
    pub unless: Option<String>,
}

impl Condition {
    pub fn holds(&self, variables: &Value) -> Result<bool> {
        if let Some(expression) = &self.when {
            if !evaluate_condition(expression, variables)? {
                return Ok(false);
            }
        }
        if let Some(expression) = &self.unless {
            if evaluate_condition(expression, variables)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Deletes generated paths matching `paths` (glob patterns relative to the output).
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveRule {
    #[serde(flatten)]
    pub condition: Condition,
    pub paths: Vec<String>,
}

/// Moves one generated file. Both paths are rendered before use.
#[derive(Debug, Clone, Deserialize)]
pub struct RenameRule {
    #[serde(flatten)]
    pub condition: Condition,
    pub from: String,
    pub to: String,
}

/// Runs a program inside the generated project. Arguments are rendered before use.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandRule {
    #[serde(flatten)]
    pub condition: Condition,
    pub run: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Recipe {
    /// Subdirectory holding the files to materialize.
    pub template: Option<String>,
    /// Answers used when nothing else provides them.
    pub defaults: Value,
    /// Values computed from the answers, in order, e.g.
    /// `backendName: "{{capitalize projectName}}_Backend"`.
    pub derived: IndexMap<String, String>,
    pub remove: Vec<RemoveRule>,
    pub rename: Vec<RenameRule>,
    pub commands: Vec<CommandRule>,
}

/// A template root resolved on disk.
#[derive(Debug)]
pub struct TemplateLayout {
    pub root: PathBuf,
    pub source_dir: PathBuf,
    pub recipe: Recipe,
}

/// Returns true when `path` is relative and stays below the directory it is joined to.
pub fn is_contained(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path.components().all(|component| matches!(component, Component::Normal(_)))
}

/// Parses recipe content, trying JSON first and falling back to YAML.
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    match serde_json::from_str(content) {
        Ok(recipe) => Ok(recipe),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid recipe format: {e}"))),
    }
}

/// Finds the first recipe file present in `template_root`.
pub fn find_recipe<P: AsRef<Path>>(template_root: P) -> Option<PathBuf> {
    RECIPE_FILES
        .iter()
        .map(|file| template_root.as_ref().join(file))
        .find(|path| path.is_file())
}

/// Resolves a template root into its recipe and the directory to materialize.
///
/// # Errors
/// * `Error::SourceError` if the template root cannot be read
/// * `Error::ConfigError` if the recipe is invalid or names a missing template directory
pub fn load_template<P: AsRef<Path>>(template_root: P) -> Result<TemplateLayout> {
    let template_root = template_root.as_ref();
    let root = template_root.canonicalize().map_err(|source| Error::SourceError {
        path: template_root.to_path_buf(),
        source,
    })?;

    let Some(recipe_path) = find_recipe(&root) else {
        debug!("No recipe found in {}, materializing it as is", root.display());
        return Ok(TemplateLayout { source_dir: root.clone(), root, recipe: Recipe::default() });
    };

    debug!("Loading recipe from {}", recipe_path.display());
    let content = std::fs::read_to_string(&recipe_path)
        .map_err(|source| Error::SourceError { path: recipe_path.clone(), source })?;
    let recipe = parse_recipe(&content)?;

    let template_dir = recipe.template.as_deref().unwrap_or(DEFAULT_TEMPLATE_DIR);
    if !is_contained(Path::new(template_dir)) {
        return Err(Error::ConfigError(format!(
            "recipe template directory '{template_dir}' must be a relative path inside the template"
        )));
    }
    let source_dir = root.join(template_dir);
    if !source_dir.is_dir() {
        return Err(Error::ConfigError(format!(
            "template directory '{}' does not exist",
            source_dir.display()
        )));
    }

    Ok(TemplateLayout { root, source_dir, recipe })
}
