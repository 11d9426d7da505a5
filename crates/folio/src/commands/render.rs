//! `folio render` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use folio_config::{CliSettings, Config};
use folio_renderer::RenderResult;

use crate::commands::create_renderer;
use crate::error::CliError;
use crate::output::Output;

/// Output format of a rendered chapter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// HTML fragment.
    #[default]
    Html,
    /// Full render result (html, title, toc, listings, warnings) as JSON.
    Json,
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to the chapter markdown file.
    file: PathBuf,

    /// Write output to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render code listings without syntax highlighting.
    #[arg(long)]
    no_highlight: bool,

    /// Do not number h2/h3 headers.
    #[arg(long)]
    no_number_sections: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, the chapter cannot be read,
    /// or the output cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            highlight: self.no_highlight.then_some(false),
            number_sections: self.no_number_sections.then_some(false),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let markdown = std::fs::read_to_string(&self.file)?;
        tracing::info!(file = %self.file.display(), "Rendering chapter");

        let result = create_renderer(&config.render).render_markdown(&markdown);
        for warning in &result.warnings {
            output.chapter_warning(&self.file, warning);
        }

        let rendered = format_result(&result, self.format)?;
        match &self.output {
            Some(path) => {
                std::fs::write(path, rendered)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(rendered.as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(())
    }
}

/// Serialize a render result in the requested format.
fn format_result(result: &RenderResult, format: Format) -> Result<String, CliError> {
    match format {
        Format::Html => Ok(result.html.clone()),
        Format::Json => Ok(serde_json::to_string_pretty(result)?),
    }
}
