//! Terminal reporting for chapter renders and book builds.

use std::path::Path;

use console::{Style, Term};

/// Reporter for CLI progress, written to stderr so HTML on stdout stays clean.
pub(crate) struct Output {
    term: Term,
    ok: Style,
    warn: Style,
    fail: Style,
    heading: Style,
    dim: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            fail: Style::new().red(),
            heading: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    fn line(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Book title and the directories a build reads from and writes to.
    pub(crate) fn build_header(&self, title: Option<&str>, source: &Path, output: &Path) {
        if let Some(title) = title {
            self.line(&self.heading.apply_to(title).to_string());
        }
        self.line(&format!("Source: {}", source.display()));
        self.line(&format!("Output: {}", output.display()));
    }

    /// One built chapter: `source -> output (title)`.
    pub(crate) fn chapter(&self, source: &Path, output: &Path, title: Option<&str>) {
        let title = self.dim.apply_to(format!("({})", title.unwrap_or("untitled")));
        self.line(&format!(
            "  {} -> {} {title}",
            source.display(),
            output.display()
        ));
    }

    /// A renderer warning attributed to a chapter.
    pub(crate) fn chapter_warning(&self, chapter: &Path, warning: &str) {
        let msg = format!("    {}: {warning}", chapter.display());
        self.line(&self.warn.apply_to(msg).to_string());
    }

    /// A chapter that could not be built.
    pub(crate) fn chapter_failed(&self, chapter: &Path, err: &dyn std::fmt::Display) {
        let msg = format!("  {}: {err}", chapter.display());
        self.line(&self.fail.apply_to(msg).to_string());
    }

    /// Final success line.
    pub(crate) fn success(&self, msg: &str) {
        self.line(&self.ok.apply_to(msg).to_string());
    }

    /// Fatal error before exit.
    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.fail.apply_to(msg).to_string());
    }
}
