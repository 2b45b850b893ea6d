//! Phos is a template processing system for full-stack project scaffolding.
//! It materializes a template directory into a new project, rendering text files
//! against a configuration mapping and copying binary assets untouched.

/// Assembly of the configuration mapping from defaults, files, stdin and overrides
pub mod answers;

/// Command-line interface module for the Phos application
pub mod cli;

/// Common constants such as the binary extension list
pub mod constants;

/// Error types and handling for the Phos application
pub mod error;

/// env_logger initialization
pub mod logger;

/// Renames, removals and commands applied after generation
pub mod post;

/// Template tree materialization
/// Recreates directories, copies binary files and renders text files
pub mod processor;

/// User confirmation handling
pub mod prompt;

/// Recipe files (phos.json, phos.yml, phos.yaml) describing a template
pub mod recipe;

/// Handlebars rendering with the Phos helper set
pub mod renderer;

/// Orchestration of a whole generation run
pub mod runner;

/// Configuration values
pub mod value;
