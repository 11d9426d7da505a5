//! HTML backend for chapter rendering.
//!
//! Produces the classed HTML the book stylesheets expect: single-quoted
//! class attributes on the custom blocks, `highlight` wrappers around code.

use std::fmt::Write;

use crate::admonition::AdmonitionKind;
use crate::backend::RenderBackend;
use crate::highlight::highlight;
use crate::state::escape_html;

/// HTML render backend.
///
/// Produces:
/// - `<div class='code'>` around highlighted listings
/// - `<div class='tip'>` (and friends) for admonitions
/// - `<div class='footnote'>` with a named anchor for footnote definitions
/// - `<sup>` links for footnote references
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        out.push_str("<div class='code'>");
        out.push_str(&highlight(content, lang));
        out.push_str("</div>");
    }

    fn admonition(kind: AdmonitionKind, segments: &[&str], out: &mut String) {
        write!(out, "<div class='{}'>", kind.css_class()).unwrap();
        for segment in segments {
            write!(out, "<p>{segment}</p>").unwrap();
        }
        out.push_str("</div>");
    }

    fn footnote_definition(label: &str, html: &str, out: &mut String) {
        write!(
            out,
            "<div class='footnote'><a name='footnote_{label}' href='#'></a>{html}</div>"
        )
        .unwrap();
    }

    fn footnote_reference(label: &str, number: usize, out: &mut String) {
        write!(out, "<a href='#footnote_{label}'><sup>{number}</sup></a>").unwrap();
    }

    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>");
    }

    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>");
    }

    fn image(src: &str, alt: &str, title: &str, out: &mut String) {
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        write!(
            out,
            r#"<img src="{}"{title_attr} alt="{}">"#,
            escape_html(src),
            escape_html(alt)
        )
        .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_code_block_plain() {
        let mut out = String::new();
        HtmlBackend::code_block(None, "a < b\n", &mut out);
        assert_eq!(
            out,
            r#"<div class='code'><div class="highlight"><pre>a &lt; b
</pre></div></div>"#
        );
    }

    #[test]
    fn test_code_block_highlighted() {
        let mut out = String::new();
        HtmlBackend::code_block(Some("ruby"), "def hello\nend\n", &mut out);
        assert!(out.starts_with(r#"<div class='code'><div class="highlight"><pre>"#));
        assert!(out.contains(r#"<span class=""#));
        assert!(out.ends_with("</pre></div></div>"));
    }

    #[test]
    fn test_admonition() {
        let mut out = String::new();
        HtmlBackend::admonition(
            AdmonitionKind::Warning,
            &["<strong>Careful</strong>", "Body"],
            &mut out,
        );
        assert_eq!(
            out,
            "<div class='warning'><p><strong>Careful</strong></p><p>Body</p></div>"
        );
    }

    #[test]
    fn test_footnote_definition() {
        let mut out = String::new();
        HtmlBackend::footnote_definition("1", "Behold, a footnote.", &mut out);
        assert_eq!(
            out,
            "<div class='footnote'><a name='footnote_1' href='#'></a>Behold, a footnote.</div>"
        );
    }

    #[test]
    fn test_footnote_reference() {
        let mut out = String::new();
        HtmlBackend::footnote_reference("123", 1, &mut out);
        assert_eq!(out, "<a href='#footnote_123'><sup>1</sup></a>");
    }

    #[test]
    fn test_paragraph_default() {
        let mut out = String::new();
        HtmlBackend::paragraph("Hello", &mut out);
        assert_eq!(out, "<p>Hello</p>");
    }

    #[test]
    fn test_blockquote() {
        let mut out = String::new();
        HtmlBackend::blockquote_start(&mut out);
        out.push_str("content");
        HtmlBackend::blockquote_end(&mut out);
        assert_eq!(out, "<blockquote>content</blockquote>");
    }

    #[test]
    fn test_image_with_title() {
        let mut out = String::new();
        HtmlBackend::image("tenants.png", "Tenants", "Schema per tenant", &mut out);
        assert_eq!(
            out,
            r#"<img src="tenants.png" title="Schema per tenant" alt="Tenants">"#
        );
    }
}
