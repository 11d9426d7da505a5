//! Admonition boxes (`T> Tip`, `W> Warning`, ...).
//!
//! An admonition is a paragraph whose lines start with a one-letter prefix
//! followed by `>`. By the time the renderer sees the paragraph the `>` has
//! been escaped, so prefixes are matched as `T&gt;`.

use std::sync::LazyLock;

use regex::Regex;

static ADMONITION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([TWAIDEXQ])&gt;").expect("invalid admonition regex"));

static ADMONITION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[TWAIDEXQ]&gt;").expect("invalid admonition regex"));

static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("invalid blank line regex"));

/// Kind of admonition box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdmonitionKind {
    Tip,
    Warning,
    Aside,
    Information,
    Discussion,
    Error,
    Exercise,
    Question,
}

impl AdmonitionKind {
    /// Parse a one-letter prefix.
    #[must_use]
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            'T' => Some(Self::Tip),
            'W' => Some(Self::Warning),
            'A' => Some(Self::Aside),
            'I' => Some(Self::Information),
            'D' => Some(Self::Discussion),
            'E' => Some(Self::Error),
            'X' => Some(Self::Exercise),
            'Q' => Some(Self::Question),
            _ => None,
        }
    }

    /// CSS class of the wrapping `div`.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Tip => "tip",
            Self::Warning => "warning",
            Self::Aside => "aside",
            Self::Information => "information",
            Self::Discussion => "discussion",
            Self::Error => "error",
            Self::Exercise => "exercise",
            Self::Question => "question",
        }
    }
}

/// A paragraph recognised as an admonition.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Admonition {
    pub kind: AdmonitionKind,
    /// Body with every line prefix removed.
    pub body: String,
}

impl Admonition {
    /// Recognise an admonition from a paragraph's rendered inline HTML.
    pub(crate) fn parse(html: &str) -> Option<Self> {
        let caps = ADMONITION_START.captures(html)?;
        let kind = caps[1].chars().next().and_then(AdmonitionKind::from_prefix)?;
        let body = ADMONITION_PREFIX.replace_all(html, "").into_owned();
        Some(Self { kind, body })
    }

    /// Blank-line separated segments of the body, trimmed, empties dropped.
    pub(crate) fn segments(&self) -> Vec<&str> {
        BLANK_LINE
            .split(&self.body)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_from_prefix_all_letters() {
        let expected = [
            ('T', "tip"),
            ('W', "warning"),
            ('A', "aside"),
            ('I', "information"),
            ('D', "discussion"),
            ('E', "error"),
            ('X', "exercise"),
            ('Q', "question"),
        ];
        for (prefix, class) in expected {
            let kind = AdmonitionKind::from_prefix(prefix).unwrap();
            assert_eq!(kind.css_class(), class);
        }
    }

    #[test]
    fn test_from_prefix_unknown() {
        assert_eq!(AdmonitionKind::from_prefix('N'), None);
        assert_eq!(AdmonitionKind::from_prefix('t'), None);
    }

    #[test]
    fn test_parse_strips_every_prefix() {
        let html = "T&gt; <strong>Title</strong>\nT&gt; \nT&gt; Body line";
        let admonition = Admonition::parse(html).unwrap();
        assert_eq!(admonition.kind, AdmonitionKind::Tip);
        assert_eq!(admonition.body, " <strong>Title</strong>\n \n Body line");
        assert_eq!(admonition.segments(), vec!["<strong>Title</strong>", "Body line"]);
    }

    #[test]
    fn test_parse_requires_leading_prefix() {
        assert!(Admonition::parse("Some text\nT&gt; later").is_none());
        assert!(Admonition::parse("T> raw").is_none());
        assert!(Admonition::parse("Z&gt; unknown").is_none());
    }

    #[test]
    fn test_segments_single() {
        let admonition = Admonition::parse("Q&gt; Why?").unwrap();
        assert_eq!(admonition.segments(), vec!["Why?"]);
    }

    #[test]
    fn test_parse_mixed_prefixes_uses_first() {
        let admonition = Admonition::parse("T&gt; a\nW&gt; b").unwrap();
        assert_eq!(admonition.kind, AdmonitionKind::Tip);
        assert_eq!(admonition.body, " a\n b");
    }
}
