//! Titled code listings.
//!
//! A listing is a `{key=value,...}` line followed by indented code:
//!
//! ```text
//! {title=app/models/account.rb,lang=ruby}
//!     class Account < ActiveRecord::Base
//!     end
//! ```
//!
//! It is rewritten into an optional bold title plus a fenced code block.

use std::collections::HashMap;
use std::fmt::Write;

/// Number of leading whitespace characters removed from continuation lines.
const OUTDENT: usize = 4;

/// Error parsing a listing attribute line.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ListingDirectiveError {
    /// The line is not wrapped in braces.
    #[error("listing attributes must be wrapped in braces")]
    Unbraced,
    /// An item has more than one `=`.
    #[error("listing attribute `{0}` must have the form key=value or key")]
    NotKeyValue(String),
    /// An item has an empty key.
    #[error("listing attribute `{0}` has an empty key")]
    EmptyKey(String),
}

/// Parsed `{key=value,...}` attribute line of a listing.
///
/// Keys other than `title` and `lang` are kept but not rendered.
///
/// # Example
///
/// ```
/// use folio_renderer::ListingDirective;
///
/// let directive = ListingDirective::parse("{title=db/schema.rb, lang=ruby}").unwrap();
/// assert_eq!(directive.title(), Some("db/schema.rb"));
/// assert_eq!(directive.lang(), Some("ruby"));
/// ```
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListingDirective {
    /// All attributes, trimmed.
    pub attrs: HashMap<String, String>,
}

impl ListingDirective {
    /// Parse a brace-delimited attribute line.
    ///
    /// `{}` is valid and yields no attributes. A bare `key` is a flag with
    /// an empty value. Later duplicates win.
    pub fn parse(line: &str) -> Result<Self, ListingDirectiveError> {
        let inner = line
            .trim()
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or(ListingDirectiveError::Unbraced)?;

        let mut directive = Self::default();
        if inner.trim().is_empty() {
            return Ok(directive);
        }

        for item in inner.split(',') {
            let mut parts = item.split('=');
            let (Some(key), value, None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(ListingDirectiveError::NotKeyValue(item.trim().to_owned()));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ListingDirectiveError::EmptyKey(item.trim().to_owned()));
            }
            directive
                .attrs
                .insert(key.to_owned(), value.unwrap_or_default().trim().to_owned());
        }

        Ok(directive)
    }

    /// Listing title, shown in bold above the code.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.attr("title")
    }

    /// Highlighting language.
    #[must_use]
    pub fn lang(&self) -> Option<&str> {
        self.attr("lang")
    }

    /// Non-empty attribute value.
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Render the listing as markdown: optional bold title, then a fenced block.
    ///
    /// `body` is trimmed and outdented before it is fenced.
    #[must_use]
    pub fn to_markdown(&self, body: &str) -> String {
        let mut out = String::new();
        if let Some(title) = self.title() {
            write!(out, "**{}**\n\n", title.replace('_', "\\_")).unwrap();
        }
        write!(
            out,
            "```{}\n{}\n```\n\n",
            self.lang().unwrap_or_default(),
            outdent(body.trim())
        )
        .unwrap();
        out
    }
}

/// Remove up to four leading whitespace characters from every line but the first.
///
/// The first line has already lost its indentation to trimming.
pub(crate) fn outdent(code: &str) -> String {
    let mut lines = code.split('\n');
    let mut out = String::with_capacity(code.len());
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        let cut = line
            .char_indices()
            .take(OUTDENT)
            .take_while(|(_, c)| c.is_whitespace())
            .last()
            .map_or(0, |(i, c)| i + c.len_utf8());
        out.push_str(&line[cut..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_title_and_lang() {
        let directive =
            ListingDirective::parse("{title=spec/controllers/accounts/books_controller_spec.rb,lang=ruby}")
                .unwrap();
        assert_eq!(
            directive.title(),
            Some("spec/controllers/accounts/books_controller_spec.rb")
        );
        assert_eq!(directive.lang(), Some("ruby"));
    }

    #[test]
    fn test_parse_trims_keys_and_values() {
        let directive = ListingDirective::parse("{ lang = ruby , line-numbers=on }").unwrap();
        assert_eq!(directive.lang(), Some("ruby"));
        assert_eq!(
            directive.attrs.get("line-numbers").map(String::as_str),
            Some("on")
        );
        assert_eq!(directive.title(), None);
    }

    #[test]
    fn test_parse_empty_braces() {
        let directive = ListingDirective::parse("{}").unwrap();
        assert!(directive.attrs.is_empty());
    }

    #[test]
    fn test_parse_empty_value_allowed() {
        let directive = ListingDirective::parse("{lang=}").unwrap();
        assert_eq!(directive.attrs.get("lang").map(String::as_str), Some(""));
        assert_eq!(directive.lang(), None);
    }

    #[test]
    fn test_parse_bare_flag() {
        let directive = ListingDirective::parse("{title=a.rb,lang=ruby,crop}").unwrap();
        assert_eq!(directive.title(), Some("a.rb"));
        assert_eq!(directive.lang(), Some("ruby"));
        assert_eq!(directive.attrs.get("crop").map(String::as_str), Some(""));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ListingDirective::parse("{a=b=c}"),
            Err(ListingDirectiveError::NotKeyValue("a=b=c".to_owned()))
        );
        assert_eq!(
            ListingDirective::parse("{=ruby}"),
            Err(ListingDirectiveError::EmptyKey("=ruby".to_owned()))
        );
        assert_eq!(
            ListingDirective::parse("{lang=ruby,}"),
            Err(ListingDirectiveError::EmptyKey(String::new()))
        );
        assert_eq!(
            ListingDirective::parse("lang=ruby"),
            Err(ListingDirectiveError::Unbraced)
        );
    }

    #[test]
    fn test_outdent_strips_up_to_four() {
        assert_eq!(
            outdent("describe Foo do\n      it 'works'\n    end"),
            "describe Foo do\n  it 'works'\nend"
        );
        assert_eq!(outdent("a\n  b\n\tc"), "a\nb\nc");
    }

    #[test]
    fn test_outdent_single_line() {
        assert_eq!(outdent("puts 1"), "puts 1");
    }

    #[test]
    fn test_to_markdown_with_title() {
        let directive = ListingDirective::parse("{title=app/models/user_account.rb,lang=ruby}").unwrap();
        assert_eq!(
            directive.to_markdown("  class UserAccount\n    end\n"),
            "**app/models/user\\_account.rb**\n\n```ruby\nclass UserAccount\nend\n```\n\n"
        );
    }

    #[test]
    fn test_to_markdown_without_attributes() {
        let directive = ListingDirective::parse("{}").unwrap();
        assert_eq!(directive.to_markdown("x = 1"), "```\nx = 1\n```\n\n");
    }
}
