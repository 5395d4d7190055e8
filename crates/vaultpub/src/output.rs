//! Terminal output for vaultpub commands.
//!
//! Status lines go to stderr, so `vaultpub render` can pipe the markup it
//! writes to stdout.

use std::io;

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    status: Term,
    markup: Term,
    ok: Style,
    attention: Style,
    failure: Style,
    heading: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            status: Term::stderr(),
            markup: Term::stdout(),
            ok: Style::new().green(),
            attention: Style::new().yellow(),
            failure: Style::new().red().bold(),
            heading: Style::new().bold(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.status.write_line(msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.styled(&self.ok, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.styled(&self.attention, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.styled(&self.failure, msg);
    }

    /// Section title, preceded by a blank line.
    pub(crate) fn heading(&self, title: &str) {
        let _ = self.status.write_line("");
        self.styled(&self.heading, title);
    }

    /// Write storage markup to stdout, unstyled.
    pub(crate) fn markup(&self, markup: &str) -> io::Result<()> {
        self.markup.write_line(markup)
    }

    fn styled(&self, style: &Style, msg: &str) {
        let _ = self.status.write_line(&style.apply_to(msg).to_string());
    }
}
