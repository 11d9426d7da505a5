//! Syntax highlighting for code listings.
//!
//! Output is always wrapped in `<div class="highlight"><pre>`. Tokens are
//! `<span>` elements whose classes are the scope names of the token
//! (`keyword control ruby`), so colours come from the book stylesheet.

use std::sync::LazyLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::state::escape_html;

/// Language name that always renders literally.
pub const PLAIN: &str = "plain";

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Highlight `code` as `lang`.
///
/// `None`, [`PLAIN`], and languages without a known syntax render the
/// escaped code inside the same wrapper. Highlighter failures fall back to
/// the literal rendering as well.
#[must_use]
pub fn highlight(code: &str, lang: Option<&str>) -> String {
    let body = match lang.and_then(find_syntax) {
        Some(syntax) => highlight_classed(code, syntax).unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                lang = syntax.name.as_str(),
                "Highlighting failed, rendering literally"
            );
            escape_html(code)
        }),
        None => escape_html(code),
    };
    format!(r#"<div class="highlight"><pre>{body}</pre></div>"#)
}

/// Whether `lang` resolves to a highlighter syntax.
#[must_use]
pub fn is_supported(lang: &str) -> bool {
    find_syntax(lang).is_some()
}

fn find_syntax(lang: &str) -> Option<&'static SyntaxReference> {
    let lang = lang.trim();
    if lang.is_empty() || lang.eq_ignore_ascii_case(PLAIN) {
        return None;
    }
    let syntax = SYNTAX_SET.find_syntax_by_token(lang);
    if syntax.is_none() {
        tracing::debug!(lang, "Unknown listing language, rendering literally");
    }
    syntax
}

fn highlight_classed(code: &str, syntax: &SyntaxReference) -> Result<String, syntect::Error> {
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(generator.finalize())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_highlight_ruby_has_keyword_spans() {
        let html = highlight("def index\n  @books = Book.all\nend\n", Some("ruby"));
        assert!(html.starts_with(r#"<div class="highlight"><pre>"#));
        assert!(html.ends_with("</pre></div>"));
        assert!(html.contains(r#"<span class=""#));
        assert!(html.contains("keyword"));
    }

    #[test]
    fn test_highlight_plain_is_literal() {
        let html = highlight("<b>not bold</b>\n", Some("plain"));
        assert_eq!(
            html,
            "<div class=\"highlight\"><pre>&lt;b&gt;not bold&lt;/b&gt;\n</pre></div>"
        );
    }

    #[test]
    fn test_highlight_none_is_literal() {
        let html = highlight("x & y\n", None);
        assert_eq!(html, "<div class=\"highlight\"><pre>x &amp; y\n</pre></div>");
    }

    #[test]
    fn test_highlight_unknown_language_is_literal() {
        let html = highlight("whatever\n", Some("no-such-language"));
        assert_eq!(html, "<div class=\"highlight\"><pre>whatever\n</pre></div>");
    }

    #[test]
    fn test_is_supported() {
        assert!(is_supported("ruby"));
        assert!(is_supported("rb"));
        assert!(!is_supported("plain"));
        assert!(!is_supported(""));
        assert!(!is_supported("no-such-language"));
    }
}
