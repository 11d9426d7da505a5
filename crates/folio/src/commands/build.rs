//! `folio build` command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use folio_config::{BookConfig, CliSettings, Config, RenderConfig};
use folio_renderer::{PLAIN, RenderResult, is_supported};
use rayon::prelude::*;

use crate::commands::create_renderer;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chapter source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory for rendered chapters (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

/// A rendered chapter written to the output directory.
struct BuiltChapter {
    /// Chapter path relative to the source directory.
    source: PathBuf,
    /// Written HTML file.
    output: PathBuf,
    title: Option<String>,
    warnings: Vec<String>,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, the source directory is
    /// missing, or any chapter fails to build.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let book = &config.book_resolved;

        if !book.source_dir.is_dir() {
            return Err(CliError::Validation(format!(
                "Source directory not found: {}",
                book.source_dir.display()
            )));
        }

        output.build_header(book.title.as_deref(), &book.source_dir, &book.output_dir);

        let chapters = scan_chapters(book);
        tracing::info!(count = chapters.len(), "Building chapters");

        let results: Vec<Result<BuiltChapter, (PathBuf, CliError)>> = chapters
            .par_iter()
            .map(|chapter| {
                build_chapter(book, &config.render, chapter).map_err(|e| (chapter.clone(), e))
            })
            .collect();

        let mut failed = 0;
        for result in &results {
            match result {
                Ok(built) => {
                    output.chapter(&built.source, &built.output, built.title.as_deref());
                    for warning in &built.warnings {
                        output.chapter_warning(&built.source, warning);
                    }
                }
                Err((chapter, err)) => {
                    failed += 1;
                    output.chapter_failed(chapter, err);
                }
            }
        }

        if failed > 0 {
            return Err(CliError::Validation(format!(
                "{failed} of {} chapters failed to build",
                results.len()
            )));
        }

        output.success(&format!(
            "Built {} chapters to {}",
            results.len(),
            book.output_dir.display()
        ));
        Ok(())
    }
}

/// Render one chapter and write it to `<output_dir>/<chapter>.html`.
fn build_chapter(
    book: &BookConfig,
    render: &RenderConfig,
    chapter: &Path,
) -> Result<BuiltChapter, CliError> {
    let markdown = fs::read_to_string(book.source_dir.join(chapter))?;
    let result = create_renderer(render).render_markdown(&markdown);

    let output = book.output_dir.join(chapter).with_extension("html");
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, &result.html)?;

    let warnings = chapter_warnings(&result, render);
    Ok(BuiltChapter {
        source: chapter.to_path_buf(),
        output,
        title: result.title,
        warnings,
    })
}

/// Renderer warnings plus listings whose language has no highlighter.
fn chapter_warnings(result: &RenderResult, render: &RenderConfig) -> Vec<String> {
    let mut warnings = result.warnings.clone();
    if !render.highlight {
        return warnings;
    }
    for listing in &result.listings {
        if let Some(lang) = &listing.lang
            && !lang.eq_ignore_ascii_case(PLAIN)
            && !is_supported(lang)
        {
            warnings.push(format!(
                "line {}: unknown listing language {lang:?}, rendered literally",
                listing.line
            ));
        }
    }
    warnings
}

/// Collect `.md` chapters under the source directory, relative to it.
///
/// Hidden files and directories are skipped, as are chapters matching an
/// exclude pattern. The result is sorted.
fn scan_chapters(book: &BookConfig) -> Vec<PathBuf> {
    let mut chapters = Vec::new();
    scan_directory(book, &book.source_dir, &mut chapters);
    chapters.sort();
    chapters
}

fn scan_directory(book: &BookConfig, dir: &Path, chapters: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "Cannot read directory, skipping");
        return;
    };

    for entry in entries.filter_map(Result::ok) {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            scan_directory(book, &path, chapters);
        } else if path.extension().is_some_and(|e| e == "md") {
            let Ok(relative) = path.strip_prefix(&book.source_dir) else {
                continue;
            };
            if book.is_excluded(relative) {
                tracing::debug!(chapter = %relative.display(), "Excluded chapter");
                continue;
            }
            chapters.push(relative.to_path_buf());
        }
    }
}
