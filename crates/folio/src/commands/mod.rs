//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod render;

pub(crate) use build::BuildArgs;
pub(crate) use render::RenderArgs;

use folio_config::RenderConfig;
use folio_renderer::{HtmlBackend, MarkdownRenderer};

/// Create a chapter renderer configured from the `[render]` section.
pub(crate) fn create_renderer(config: &RenderConfig) -> MarkdownRenderer<HtmlBackend> {
    let renderer = MarkdownRenderer::new()
        .with_gfm(config.gfm)
        .with_highlight(config.highlight)
        .with_section_numbering(config.number_sections);

    if config.extract_title {
        renderer.with_title_extraction()
    } else {
        renderer
    }
}
