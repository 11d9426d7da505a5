//! Paragraph classification.
//!
//! Every rendered paragraph is exactly one of three things, checked in this
//! order: an admonition, a footnote definition, or a plain paragraph.

use crate::admonition::Admonition;
use crate::footnote::FootnoteDefinition;

/// Classified paragraph, borrowing from the paragraph's inline HTML.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ParagraphKind<'a> {
    Admonition(Admonition),
    FootnoteDefinition(FootnoteDefinition<'a>),
    Plain(&'a str),
}

impl<'a> ParagraphKind<'a> {
    pub(crate) fn classify(html: &'a str) -> Self {
        if let Some(admonition) = Admonition::parse(html) {
            Self::Admonition(admonition)
        } else if let Some(definition) = FootnoteDefinition::parse(html) {
            Self::FootnoteDefinition(definition)
        } else {
            Self::Plain(html)
        }
    }
}
