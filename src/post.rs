//! Post-processing of a generated project.
//!
//! Runs after materialization has finished: applies the recipe's rename rules,
//! then its remove rules, then its commands. Every path is addressed relative to
//! the output root, which is safe because the materialized tree mirrors the
//! template tree exactly.

use globset::{Glob, GlobSetBuilder};
use log::{debug, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::recipe::{is_contained, CommandRule, Recipe, RemoveRule, RenameRule};
use crate::renderer::TemplateRenderer;
use crate::value::Value;

pub struct PostProcessor<'a> {
    renderer: &'a dyn TemplateRenderer,
    prompt: &'a dyn Prompter,
    variables: &'a Value,
    output_root: &'a Path,
}

impl<'a> PostProcessor<'a> {
    pub fn new(
        renderer: &'a dyn TemplateRenderer,
        prompt: &'a dyn Prompter,
        variables: &'a Value,
        output_root: &'a Path,
    ) -> Self {
        Self { renderer, prompt, variables, output_root }
    }

    /// Applies every rule of `recipe` in order: renames, removals, commands.
    pub fn run(&self, recipe: &Recipe, skip_hooks_check: bool) -> Result<()> {
        self.apply_renames(&recipe.rename)?;
        self.apply_removals(&recipe.remove)?;
        self.run_commands(&recipe.commands, skip_hooks_check)
    }

    fn resolve(&self, raw: &str) -> Result<PathBuf> {
        let rendered = self.renderer.render(raw, self.variables)?;
        let relative = PathBuf::from(rendered.trim());
        if !is_contained(&relative) {
            return Err(Error::ConfigError(format!(
                "path '{}' must be relative to the generated project",
                relative.display()
            )));
        }
        Ok(self.output_root.join(relative))
    }

    /// Moves files whose rule holds. Returns the applied `(from, to)` pairs.
    pub fn apply_renames(&self, rules: &[RenameRule]) -> Result<Vec<(PathBuf, PathBuf)>> {
        let mut applied = Vec::new();
        for rule in rules {
            if !rule.condition.holds(self.variables)? {
                debug!("Skipping rename of '{}': condition does not hold", rule.from);
                continue;
            }
            let from = self.resolve(&rule.from)?;
            let to = self.resolve(&rule.to)?;
            if !from.exists() {
                return Err(Error::ConfigError(format!(
                    "cannot rename '{}': it was not generated",
                    rule.from
                )));
            }
            if let Some(parent) = to.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|source| Error::WriteError { path: parent.to_path_buf(), source })?;
            }
            std::fs::rename(&from, &to)
                .map_err(|source| Error::WriteError { path: to.clone(), source })?;
            info!("Renamed '{}' to '{}'", from.display(), to.display());
            applied.push((from, to));
        }
        Ok(applied)
    }

    /// Deletes generated paths matched by rules that hold. Returns the deleted paths.
    pub fn apply_removals(&self, rules: &[RemoveRule]) -> Result<Vec<PathBuf>> {
        let mut builder = GlobSetBuilder::new();
        let mut active = 0;
        for rule in rules {
            if !rule.condition.holds(self.variables)? {
                debug!("Keeping {:?}: condition does not hold", rule.paths);
                continue;
            }
            for pattern in &rule.paths {
                let pattern = self.renderer.render(pattern, self.variables)?;
                if pattern.starts_with('/') || pattern.split('/').any(|part| part == "..") {
                    return Err(Error::ConfigError(format!(
                        "remove pattern '{pattern}' must be relative to the generated project"
                    )));
                }
                builder.add(Glob::new(&pattern)?);
                active += 1;
            }
        }
        if active == 0 {
            return Ok(Vec::new());
        }
        let globs = builder.build()?;

        let mut matched = Vec::new();
        let mut walker = WalkDir::new(self.output_root).min_depth(1).into_iter();
        while let Some(entry) = walker.next() {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(self.output_root)
                .map_err(|e| Error::ConfigError(e.to_string()))?;
            if globs.is_match(relative) {
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                matched.push((entry.path().to_path_buf(), entry.file_type().is_dir()));
            }
        }

        let mut removed = Vec::with_capacity(matched.len());
        for (path, is_dir) in matched {
            let outcome = if is_dir {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            outcome.map_err(|source| Error::WriteError { path: path.clone(), source })?;
            info!("Removed '{}'", path.display());
            removed.push(path);
        }
        Ok(removed)
    }

    /// Runs commands whose rule holds inside the output root.
    ///
    /// The configuration is written to each command's stdin as JSON. Unless
    /// `skip_hooks_check` is set the user confirms once before anything runs.
    pub fn run_commands(&self, rules: &[CommandRule], skip_hooks_check: bool) -> Result<()> {
        let mut commands = Vec::new();
        for rule in rules {
            if !rule.condition.holds(self.variables)? {
                debug!("Skipping command {:?}: condition does not hold", rule.run);
                continue;
            }
            let args = rule
                .run
                .iter()
                .map(|arg| self.renderer.render(arg, self.variables))
                .collect::<Result<Vec<_>>>()?;
            if args.is_empty() {
                return Err(Error::ConfigError("command rule with an empty `run`".to_string()));
            }
            commands.push(args);
        }
        if commands.is_empty() {
            return Ok(());
        }

        if !skip_hooks_check {
            let listing: Vec<String> = commands.iter().map(|args| args.join(" ")).collect();
            let message = format!(
                "WARNING: This template runs commands on your system ({}). Do you want to run them?",
                listing.join("; ")
            );
            if !self.prompt.confirm(&message, false)? {
                warn!("Skipping post-generation commands");
                return Ok(());
            }
        }

        let context = self.variables.to_json().to_string();
        for args in commands {
            run_command(&args, self.output_root, &context)?;
        }
        Ok(())
    }
}

fn run_command(args: &[String], cwd: &Path, context: &str) -> Result<()> {
    let display = args.join(" ");
    info!("Running '{display}'");

    let mut child = Command::new(&args[0])
        .args(&args[1..])
        .current_dir(cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| Error::HookError(format!("failed to start '{display}': {e}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(context.as_bytes()) {
            // A command that never reads its stdin closes the pipe early.
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                drop(stdin);
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::IoError(e));
            }
        }
    }

    let status = child.wait()?;
    if !status.success() {
        return Err(Error::HookError(format!("'{display}' failed with status: {status}")));
    }
    Ok(())
}
