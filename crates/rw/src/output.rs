//! Status reporting for `rw expand`.
//!
//! Expanded content goes to stdout; everything here is written to stderr.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};

pub(crate) struct Output {
    term: Term,
    done: Style,
    failed: Style,
    heading: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            done: Style::new().green(),
            failed: Style::new().red(),
            heading: Style::new().cyan().bold(),
        }
    }

    /// Report where the expanded document was written.
    pub(crate) fn wrote(&self, path: &Path) {
        let message = format!("Wrote {}", path.display());
        self.line(&self.done.apply_to(message).to_string());
    }

    /// Print the final metadata of a pass, already rendered as JSON.
    pub(crate) fn metadata(&self, json: &str) {
        self.line(&self.heading.apply_to("Metadata:").to_string());
        self.line(json);
    }

    /// Report the error that ended the command.
    pub(crate) fn failure(&self, err: &dyn Display) {
        let message = format!("Error: {err}");
        self.line(&self.failed.apply_to(message).to_string());
    }

    fn line(&self, text: &str) {
        // Nowhere left to report a failed stderr write
        let _ = self.term.write_line(text);
    }
}
