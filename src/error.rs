//! Error handling for Phos.
//! Defines the error type and result alias used throughout the application.

use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for Phos operations.
///
/// Every failure inside the renderer or the materializer is surfaced to the caller
/// through this enum; nothing is logged-and-continued internally.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    /// A template file or directory could not be read.
    #[error("Cannot read template source '{}': {source}.", path.display())]
    SourceError { path: PathBuf, source: std::io::Error },

    /// A destination file or directory could not be written.
    #[error("Cannot write '{}': {source}.", path.display())]
    WriteError { path: PathBuf, source: std::io::Error },

    /// Errors from the directory walker (unreadable entries, link cycles).
    #[error("Template traversal error: {0}.")]
    WalkError(#[from] walkdir::Error),

    /// Malformed template text or a failing helper.
    #[error("Template error: {0}")]
    TemplateError(#[from] handlebars::RenderError),

    /// A template file failed to render; wraps the underlying error with the file path.
    #[error("Failed to render '{}': {source}", path.display())]
    RenderError {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents errors that occur during post-generation command execution
    #[error("Hook execution error: {0}.")]
    HookError(String),

    #[error("Cannot proceed: output directory '{output_dir}' already exists. Use --force to overwrite it.")]
    OutputDirectoryExistsError { output_dir: String },

    /// The user declined a confirmation that the run depends on.
    #[error("Aborted: {0}.")]
    Aborted(String),

    #[error("JSON error: {0}.")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}.")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Glob pattern error: {0}.")]
    GlobError(#[from] globset::Error),

    #[error("Prompt error: {0}.")]
    PromptError(#[from] dialoguer::Error),
}

/// Convenience type alias for Results with Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    if matches!(err, Error::RenderError { .. } | Error::WriteError { .. }) {
        eprintln!("The output directory may contain a partially generated project; inspect or delete it before retrying.");
    }
    std::process::exit(1);
}
