//! Template tree materialization.
//!
//! Walks a template directory depth-first and reproduces it at the destination:
//! directories are recreated, binary files are copied byte for byte and every other
//! file is rendered through a [`TemplateRenderer`]. The destination tree always has
//! the same relative paths as the source tree.

use log::debug;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::constants::BINARY_EXTENSIONS;
use crate::error::{Error, Result};
use crate::renderer::{HandlebarsRenderer, TemplateRenderer};
use crate::value::Value;

/// How a template file is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Copied verbatim, never decoded.
    Binary,
    /// Rendered as a template.
    Text,
}

/// Classifies a file by its name suffix alone, before any content is read.
pub fn classify<P: AsRef<Path>>(path: P) -> FileKind {
    let name = path
        .as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if BINARY_EXTENSIONS.iter().any(|extension| name.ends_with(extension)) {
        FileKind::Binary
    } else {
        FileKind::Text
    }
}

/// What happened to a single template entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Copied,
    Rendered,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Created => write!(f, "Created"),
            Action::Copied => write!(f, "Copied"),
            Action::Rendered => write!(f, "Rendered"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    pub action: Action,
    pub target: PathBuf,
}

/// Ensures the output directory is safe to write to and returns its absolute path.
///
/// # Arguments
/// * `output_dir` - Target directory path for generated output
/// * `force` - Whether to write into an existing directory
///
/// # Errors
/// * `Error::OutputDirectoryExistsError` if the directory exists and force is false
pub fn ensure_output_dir<P: AsRef<Path>>(output_dir: P, force: bool) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if output_dir.exists() && !force {
        return Err(Error::OutputDirectoryExistsError {
            output_dir: output_dir.display().to_string(),
        });
    }
    std::path::absolute(output_dir).map_err(Error::IoError)
}

/// Resolves `path` the way the filesystem will see it: the deepest existing
/// ancestor is canonicalized (following `..` and symlinks) and the missing tail
/// is re-appended.
fn resolve_destination(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(Error::IoError)?;
    for ancestor in absolute.ancestors() {
        let Ok(mut resolved) = ancestor.canonicalize() else {
            continue;
        };
        let tail = absolute
            .strip_prefix(ancestor)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        for component in tail.components() {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(part) => resolved.push(part),
                _ => {}
            }
        }
        return Ok(resolved);
    }
    Ok(absolute)
}

fn source_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::SourceError { path: path.to_path_buf(), source }
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::WriteError { path: path.to_path_buf(), source }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(write_error(path))
}

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    fs::write(path, content).map_err(write_error(path))
}

/// Applies a renderer and a configuration mapping to template trees.
pub struct Materializer<'a> {
    renderer: &'a dyn TemplateRenderer,
    variables: &'a Value,
}

impl<'a> Materializer<'a> {
    pub fn new(renderer: &'a dyn TemplateRenderer, variables: &'a Value) -> Self {
        Self { renderer, variables }
    }

    /// Materializes `source` into `dest`, returning one record per template entry
    /// in visit order.
    ///
    /// Both roots are made absolute before the walk starts. `dest` and any missing
    /// parents are created. The first failure aborts the walk; whatever was written
    /// before it stays in place.
    ///
    /// # Errors
    /// * `Error::SourceError` / `Error::WalkError` if the template cannot be read
    /// * `Error::RenderError` if a text file fails to render; no destination file
    ///   is created for it
    /// * `Error::WriteError` if the destination cannot be written
    pub fn materialize<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        dest: Q,
    ) -> Result<Vec<Materialized>> {
        let source = source.as_ref();
        let source_root = source.canonicalize().map_err(source_error(source))?;
        if !source_root.is_dir() {
            return Err(Error::SourceError {
                path: source_root,
                source: std::io::Error::other("not a directory"),
            });
        }
        let dest_root = std::path::absolute(dest.as_ref()).map_err(Error::IoError)?;
        let resolved_dest = resolve_destination(&dest_root)?;
        if resolved_dest.starts_with(&source_root) {
            return Err(Error::ConfigError(format!(
                "output directory '{}' lies inside the template '{}'",
                resolved_dest.display(),
                source_root.display()
            )));
        }

        debug!(
            "Materializing '{}' into '{}'",
            source_root.display(),
            dest_root.display()
        );
        create_dir(&dest_root)?;

        let mut report = Vec::new();
        for entry in WalkDir::new(&source_root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();
            let relative = path
                .strip_prefix(&source_root)
                .map_err(|e| Error::ConfigError(e.to_string()))?;
            let target = dest_root.join(relative);

            let action = if entry.file_type().is_dir() {
                debug!("Creating directory: {}", target.display());
                create_dir(&target)?;
                Action::Created
            } else {
                match classify(path) {
                    FileKind::Binary => {
                        debug!("Copying file: {}", target.display());
                        let bytes = fs::read(path).map_err(source_error(path))?;
                        write_file(&target, &bytes)?;
                        Action::Copied
                    }
                    FileKind::Text => {
                        debug!("Writing file: {}", target.display());
                        let content = fs::read_to_string(path).map_err(source_error(path))?;
                        let rendered =
                            self.renderer.render(&content, self.variables).map_err(|e| {
                                Error::RenderError { path: path.to_path_buf(), source: Box::new(e) }
                            })?;
                        write_file(&target, rendered.as_bytes())?;
                        Action::Rendered
                    }
                }
            };
            report.push(Materialized { action, target });
        }
        Ok(report)
    }
}

/// Materializes `source` into `dest` with the default renderer.
pub fn materialize<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    dest: Q,
    variables: &Value,
) -> Result<Vec<Materialized>> {
    let renderer = HandlebarsRenderer::new();
    Materializer::new(&renderer, variables).materialize(source, dest)
}
