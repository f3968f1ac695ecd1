//! Output formatting for CLI.

use console::{style, Term};
use std::io::Write;
use std::process::ExitCode;

/// Reporting capability injected into the installer.
pub trait Reporter: Send + Sync {
    /// Report an informational message to the operator
    fn report(&self, message: &str);

    /// Report a fatal error and produce the exit code to terminate with
    fn fail(&self, message: &str, code: u8) -> ExitCode;
}

/// `... <message>`
pub fn format_report(message: &str) -> String {
    format!("... {}", message)
}

/// `Error: <message>`
pub fn format_failure(message: &str) -> String {
    format!("Error: {}", message)
}

/// Terminal reporter: progress to stdout, failures to stderr
pub struct Output {
    out: Term,
    err: Term,
    quiet: bool,
}

impl Output {
    /// Create a new output handler
    pub fn new() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            quiet: false,
        }
    }

    /// Suppress informational messages; failures are always shown
    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    /// Write an indented, highlighted list item
    pub fn list_item(&self, message: &str) {
        let _ = writeln!(&self.out, "  {}", style(message).green());
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for Output {
    fn report(&self, message: &str) {
        if !self.quiet {
            let _ = writeln!(&self.out, "{}", format_report(message));
        }
    }

    fn fail(&self, message: &str, code: u8) -> ExitCode {
        let _ = writeln!(&self.err, "{}", style(format_failure(message)).red());
        ExitCode::from(code)
    }
}
