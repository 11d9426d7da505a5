//! Book chapter renderer.
//!
//! Turns chapter source written in a markdown superset into classed HTML.
//! Rendering runs in three stages:
//!
//! 1. [`Preprocessor`] rewrites titled code listings into fenced code and
//!    guards footnote definition lines from the markdown parser.
//! 2. [`MarkdownRenderer`] consumes `pulldown-cmark` events. Paragraphs are
//!    classified as admonitions (`T> ...`), footnote definitions
//!    (`[^label]: ...`) or plain paragraphs whose `[^label]` references are
//!    numbered. Code blocks are highlighted with `syntect`.
//! 3. [`number_sections`] assigns `section_title` classes and `header_N`
//!    ids to every `h2`/`h3`.
//!
//! Format-specific markup is delegated to a [`RenderBackend`];
//! [`HtmlBackend`] is the one the book stylesheets are written against.
//!
//! # Example
//!
//! ```
//! use folio_renderer::{HtmlBackend, MarkdownRenderer};
//!
//! let markdown = "# Tenancy\n\n## Subdomains\n\nT> **Tip**\nT>\nT> Use a wildcard DNS record.";
//! let result = MarkdownRenderer::<HtmlBackend>::new()
//!     .with_title_extraction()
//!     .render_markdown(markdown);
//!
//! assert_eq!(result.title.as_deref(), Some("Tenancy"));
//! assert!(result.html.contains(r#"<h2 class="section_title" id="header_0">Subdomains</h2>"#));
//! assert!(result.html.contains("<div class='tip'><p><strong>Tip</strong></p>"));
//! ```

mod admonition;
mod backend;
mod error;
mod footnote;
mod highlight;
mod html;
mod paragraph;
mod postprocess;
mod preprocess;
mod renderer;
mod state;

pub use admonition::AdmonitionKind;
pub use backend::RenderBackend;
pub use error::PostprocessError;
pub use highlight::{PLAIN, highlight, is_supported};
pub use html::HtmlBackend;
pub use postprocess::{SECTION_CLASS, SectionedHtml, TocEntry, number_sections};
pub use preprocess::{CodeListing, ListingDirective, ListingDirectiveError, Preprocessor};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::escape_html;
