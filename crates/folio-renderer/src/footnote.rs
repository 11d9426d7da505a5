//! Footnote references and definitions.
//!
//! References (`[^label]`) are numbered in document order; the number shown
//! is independent of the label, while anchors use the label verbatim.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static FOOTNOTE_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\^([^\]]*)\]:\s*").expect("invalid footnote regex"));

static FOOTNOTE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\^([^\]]*)\]").expect("invalid footnote regex"));

/// Sequential footnote numbering for one document.
#[derive(Debug, Default)]
pub(crate) struct FootnoteCounter {
    count: usize,
}

impl FootnoteCounter {
    pub(crate) fn reset(&mut self) {
        self.count = 0;
    }

    /// Advance and return the next display number (1-based).
    pub(crate) fn next(&mut self) -> usize {
        self.count += 1;
        self.count
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }
}

/// A paragraph recognised as a footnote definition.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct FootnoteDefinition<'a> {
    pub label: &'a str,
    /// Definition text after the `[^label]:` marker.
    pub body: &'a str,
}

impl<'a> FootnoteDefinition<'a> {
    /// Recognise a definition from a paragraph's rendered inline HTML.
    pub(crate) fn parse(html: &'a str) -> Option<Self> {
        let trimmed = html.trim();
        let caps = FOOTNOTE_DEFINITION.captures(trimmed)?;
        let marker = caps.get(0)?;
        let label = caps.get(1)?.as_str();
        Some(Self {
            label,
            body: &trimmed[marker.end()..],
        })
    }
}

/// Replace every `[^label]` reference with the markup produced by `render`.
///
/// `render` receives the label and the reference's display number.
pub(crate) fn link_references<'h, F>(
    html: &'h str,
    counter: &mut FootnoteCounter,
    mut render: F,
) -> Cow<'h, str>
where
    F: FnMut(&str, usize) -> String,
{
    FOOTNOTE_REFERENCE.replace_all(html, |caps: &Captures<'_>| {
        let number = counter.next();
        render(&caps[1], number)
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_counter_sequence_and_reset() {
        let mut counter = FootnoteCounter::default();
        assert_eq!(counter.next(), 1);
        assert_eq!(counter.next(), 2);
        assert_eq!(counter.count(), 2);
        counter.reset();
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.next(), 1);
    }

    #[test]
    fn test_parse_definition() {
        let def = FootnoteDefinition::parse("[^1]: Behold, a footnote.").unwrap();
        assert_eq!(def.label, "1");
        assert_eq!(def.body, "Behold, a footnote.");
    }

    #[test]
    fn test_parse_definition_with_surrounding_whitespace() {
        let def = FootnoteDefinition::parse("\n  [^note]:   Text\n").unwrap();
        assert_eq!(def.label, "note");
        assert_eq!(def.body, "Text");
    }

    #[test]
    fn test_parse_definition_empty_label() {
        let def = FootnoteDefinition::parse("[^]: Empty").unwrap();
        assert_eq!(def.label, "");
        assert_eq!(def.body, "Empty");
    }

    #[test]
    fn test_parse_definition_requires_leading_marker() {
        assert!(FootnoteDefinition::parse("See [^1]: later").is_none());
        assert!(FootnoteDefinition::parse("[^1] no colon").is_none());
    }

    #[test]
    fn test_link_references_numbers_by_position() {
        let mut counter = FootnoteCounter::default();
        let html = link_references("a[^123] b[^x]", &mut counter, |label, n| {
            format!("<{label}:{n}>")
        });
        assert_eq!(html, "a<123:1> b<x:2>");
        assert_eq!(counter.count(), 2);
    }

    #[test]
    fn test_link_references_without_references() {
        let mut counter = FootnoteCounter::default();
        let html = link_references("plain", &mut counter, |_, _| String::new());
        assert!(matches!(html, Cow::Borrowed("plain")));
        assert_eq!(counter.count(), 0);
    }
}
