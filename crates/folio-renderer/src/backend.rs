//! Render backend trait for format-specific output.
//!
//! The renderer decides *what* a block is (admonition, footnote, listing);
//! the backend decides how it is written out.

use crate::admonition::AdmonitionKind;

/// Backend trait for format-specific rendering operations.
///
/// Implementations provide markup for the blocks the renderer intercepts:
/// - Code blocks (highlighted listings)
/// - Paragraph classes (plain, admonition, footnote definition)
/// - Inline footnote references
/// - Blockquotes and images
pub trait RenderBackend {
    /// Render a code block.
    ///
    /// # Arguments
    ///
    /// * `lang` - Optional language identifier (e.g., "ruby", "rust").
    ///   `None` renders the code literally.
    /// * `content` - The code content
    /// * `out` - Output buffer to write to
    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    /// Render a plain paragraph from already rendered inline HTML.
    fn paragraph(html: &str, out: &mut String) {
        out.push_str("<p>");
        out.push_str(html);
        out.push_str("</p>");
    }

    /// Render an admonition box.
    ///
    /// `segments` are the inline HTML of each blank-line separated part of
    /// the admonition body, prefixes already removed.
    fn admonition(kind: AdmonitionKind, segments: &[&str], out: &mut String);

    /// Render a footnote definition with its anchor.
    fn footnote_definition(label: &str, html: &str, out: &mut String);

    /// Render an inline footnote reference with its display number.
    fn footnote_reference(label: &str, number: usize, out: &mut String);

    /// Render blockquote start tag.
    fn blockquote_start(out: &mut String);

    /// Render blockquote end tag.
    fn blockquote_end(out: &mut String);

    /// Render an image.
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    /// Render a hard break.
    ///
    /// The newline keeps the following source line at a line start, where
    /// admonition prefixes are matched.
    fn hard_break(out: &mut String) {
        out.push_str("<br>\n");
    }

    /// Render a horizontal rule.
    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr>");
    }

    /// Render a task list marker.
    fn task_list_marker(checked: bool, out: &mut String) {
        if checked {
            out.push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            out.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }
}
