//! User confirmations.

use dialoguer::Confirm;

use crate::error::Result;

/// Asks the user yes/no questions.
pub trait Prompter {
    fn confirm(&self, message: &str, default: bool) -> Result<bool>;
}

/// Terminal prompter backed by dialoguer.
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        DialoguerPrompter::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new().with_prompt(message).default(default).interact()?)
    }
}
