//! Terminal implementation of the console's operator.

use std::io::{BufRead, Write};

use cuztory_admin::{Notice, Operator};

/// Prompts on stderr, reads answers from stdin.
#[derive(Debug, Clone, Copy)]
pub struct TerminalOperator {
    assume_yes: bool,
}

impl TerminalOperator {
    pub const fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Operator for TerminalOperator {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let mut stderr = std::io::stderr().lock();
        if write!(stderr, "{prompt} [y/N] ").and_then(|()| stderr.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }

    fn notify(&self, notice: Notice) {
        let (tag, message) = match &notice {
            Notice::Info(m) => ("info", m),
            Notice::Success(m) => ("ok", m),
            Notice::Error(m) => ("error", m),
        };
        // Operator-facing text; diagnostics go through tracing
        let _ = writeln!(std::io::stderr().lock(), "[{tag}] {message}");
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
