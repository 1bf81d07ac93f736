//! Terminal confirmation prompts.

use std::io::{self, BufRead, IsTerminal, Write};

use colored::Colorize;

use crate::error::{Error, Result};
use crate::sync::{Confirm, Prompt};

/// Asks on stderr and reads a `y/N` answer from stdin.
///
/// Without a terminal on stdin every prompt is declined.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &Prompt) -> bool {
        if !io::stdin().is_terminal() {
            tracing::warn!(%prompt, "no terminal to confirm on, declining");
            return false;
        }

        let mut stderr = io::stderr();
        if write!(stderr, "{} {prompt} [y/N] ", "?".yellow().bold()).is_err() || stderr.flush().is_err() {
            return false;
        }

        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input).is_err() {
            return false;
        }
        is_yes(&input)
    }
}

/// Ask `prompt` and fail with `Error::Aborted` on a decline.
///
/// # Errors
///
/// Returns `Error::Aborted` when the answer is no.
pub fn require(confirm: &dyn Confirm, prompt: &Prompt) -> Result<()> {
    if confirm.confirm(prompt) {
        Ok(())
    } else {
        Err(Error::Aborted(prompt.to_string()))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{Always, ItemKind};

    fn delete_prompt() -> Prompt {
        Prompt::Delete {
            kind: ItemKind::Flow,
            id: "42".into(),
        }
    }

    #[test]
    fn test_require() {
        assert!(require(&Always(true), &delete_prompt()).is_ok());
        let err = require(&Always(false), &delete_prompt()).unwrap_err();
        assert!(matches!(err, Error::Aborted(_)));
        assert!(err.to_string().contains("flow '42'"));
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }
}
