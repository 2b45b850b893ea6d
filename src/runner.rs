//! Orchestration of a full generation run.

use log::info;
use std::path::{Path, PathBuf};

use crate::answers::{build_configuration, load_answers_file, load_from_stdin};
use crate::cli::Args;
use crate::error::{Error, Result};
use crate::post::PostProcessor;
use crate::processor::{ensure_output_dir, Materializer};
use crate::prompt::Prompter;
use crate::recipe::load_template;
use crate::renderer::HandlebarsRenderer;

/// Validates the output directory, asking before `--force` writes into an
/// existing one unless `--skip-overwrite-check` is set.
fn prepare_output_dir(args: &Args, prompt: &dyn Prompter) -> Result<PathBuf> {
    let output_dir: &Path = &args.output_dir;
    if args.force && output_dir.exists() && !args.skip_overwrite_check {
        let message = format!(
            "Directory '{}' already exists. Overwrite its contents?",
            output_dir.display()
        );
        if !prompt.confirm(&message, false)? {
            return Err(Error::Aborted(format!(
                "'{}' was left untouched",
                output_dir.display()
            )));
        }
    }
    ensure_output_dir(output_dir, args.force)
}

/// Generates a project from parsed arguments and returns the output root.
///
/// # Flow
/// 1. Validates the output directory, confirming overwrites
/// 2. Loads the template root and its recipe
/// 3. Assembles the configuration mapping
/// 4. Materializes the template tree
/// 5. Applies post-processing rules and commands
pub fn run(args: &Args, prompt: &dyn Prompter) -> Result<PathBuf> {
    let renderer = HandlebarsRenderer::new();

    let output_root = prepare_output_dir(args, prompt)?;
    let layout = load_template(&args.template)?;
    info!("Using template {}", layout.source_dir.display());

    let mut layers = Vec::new();
    if let Some(path) = &args.answers {
        layers.push(load_answers_file(path)?);
    }
    if args.stdin {
        layers.push(load_from_stdin()?);
    }
    let variables = build_configuration(&layout.recipe, layers, &args.set, &renderer)?;

    let materialized =
        Materializer::new(&renderer, &variables).materialize(&layout.source_dir, &output_root)?;
    for entry in &materialized {
        println!("{}: '{}'", entry.action, entry.target.display());
    }

    PostProcessor::new(&renderer, prompt, &variables, &output_root)
        .run(&layout.recipe, args.skip_hooks_check)?;

    println!("Project generated successfully in {}.", output_root.display());
    Ok(output_root)
}
