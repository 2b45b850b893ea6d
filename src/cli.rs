//! Command-line interface implementation for Phos.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments structure for Phos.
#[derive(Parser, Debug)]
#[command(author, version, about = "Phos: full-stack project scaffolding from template trees", long_about = None)]
pub struct Args {
    /// Path to the template directory
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Directory where the generated project will be created
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Write into the output directory even if it already exists
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Read answers as JSON from stdin
    #[arg(short, long)]
    pub stdin: bool,

    /// Read answers from a JSON or YAML file
    #[arg(short, long, value_name = "FILE")]
    pub answers: Option<PathBuf>,

    /// Set a single answer, e.g. `--set frontend.eslint=false`.
    /// Values are parsed as JSON when possible and kept as strings otherwise.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Skip the confirmation prompt when `--force` writes into an existing
    /// output directory.
    #[arg(long)]
    pub skip_overwrite_check: bool,

    /// Skip confirmation prompts when running post-generation commands.
    #[arg(long)]
    pub skip_hooks_check: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
