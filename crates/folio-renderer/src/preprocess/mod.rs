//! Source rewrites applied before markdown parsing.
//!
//! Two rewrites run in order:
//! 1. Titled code listings (`{title=...,lang=...}` plus indented code) become
//!    a bold title and a fenced code block.
//! 2. Footnote definition lines (`[^label]: text`) outside fenced code get
//!    their bracket escaped so the parser keeps them as paragraph text
//!    instead of reading them as link reference definitions.

mod fence;
mod listing;

use std::sync::LazyLock;

use regex::{Captures, Regex};

use fence::FenceTracker;
pub use listing::{ListingDirective, ListingDirectiveError};

static LISTING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^(\{[^}]*\})$(.*?)^([^\s].*?\n)").expect("invalid listing regex")
});

static FOOTNOTE_DEFINITION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}\[\^[^\]]*\]:").expect("invalid footnote regex"));

/// Metadata for a rewritten code listing.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeListing {
    /// Listing title, if given.
    pub title: Option<String>,
    /// Highlighting language, if given.
    pub lang: Option<String>,
    /// Line of the attribute line in the source (1-indexed).
    pub line: usize,
}

/// Preprocessor for chapter source text.
///
/// # Example
///
/// ```
/// use folio_renderer::Preprocessor;
///
/// let mut preprocessor = Preprocessor::new();
/// let output = preprocessor.process(
///     "{title=config/routes.rb,lang=ruby}\n    root to: \"home#index\"\n\nThe root route.\n",
/// );
///
/// assert_eq!(
///     output,
///     "**config/routes.rb**\n\n```ruby\nroot to: \"home#index\"\n```\n\nThe root route.\n"
/// );
/// assert_eq!(preprocessor.into_listings().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Preprocessor {
    warnings: Vec<String>,
    listings: Vec<CodeListing>,
}

impl Preprocessor {
    /// Create a new preprocessor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite `input` and return markdown ready for parsing.
    ///
    /// Listing metadata is collected and can be retrieved with
    /// [`into_listings`](Self::into_listings).
    #[must_use]
    pub fn process(&mut self, input: &str) -> String {
        let rewritten = self.rewrite_listings(input);
        let output = guard_footnote_definitions(&rewritten);
        tracing::debug!(
            listings = self.listings.len(),
            warnings = self.warnings.len(),
            "Preprocessed chapter"
        );
        output
    }

    /// Get warnings generated during processing.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get listings rewritten so far.
    #[must_use]
    pub fn listings(&self) -> &[CodeListing] {
        &self.listings
    }

    /// Consume the preprocessor and return collected listings.
    #[must_use]
    pub fn into_listings(self) -> Vec<CodeListing> {
        self.listings
    }

    fn rewrite_listings(&mut self, input: &str) -> String {
        LISTING
            .replace_all(input, |caps: &Captures<'_>| {
                let matched = &caps[0];
                let line = caps.get(0).map_or(1, |m| line_number(input, m.start()));

                match ListingDirective::parse(&caps[1]) {
                    Ok(directive) => {
                        self.listings.push(CodeListing {
                            title: directive.title().map(str::to_owned),
                            lang: directive.lang().map(str::to_owned),
                            line,
                        });
                        let mut out = directive.to_markdown(&caps[2]);
                        out.push_str(&caps[3]);
                        out
                    }
                    Err(e) => {
                        tracing::warn!(
                            line,
                            error = %e,
                            "Malformed listing attributes, leaving as text"
                        );
                        self.warnings.push(format!("line {line}: {e}"));
                        matched.to_owned()
                    }
                }
            })
            .into_owned()
    }
}

/// Escape the opening bracket of footnote definition lines outside fenced code.
fn guard_footnote_definitions(input: &str) -> String {
    let mut fence = FenceTracker::default();
    let mut output = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        if fence.update(line) || fence.in_fence() {
            output.push_str(line);
        } else if let Some(m) = FOOTNOTE_DEFINITION_LINE.find(line) {
            let bracket = m.end() - line[..m.end()].trim_start_matches(' ').len();
            output.push_str(&line[..bracket]);
            output.push('\\');
            output.push_str(&line[bracket..]);
        } else {
            output.push_str(line);
        }
    }

    output
}

fn line_number(input: &str, offset: usize) -> usize {
    input[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_titled_listing() {
        let input = "Intro.\n\n{title=spec/controllers/accounts/books_controller_spec.rb,lang=ruby}\n    require 'spec_helper'\n\n    describe Accounts::BooksController do\n      it 'works' do\n      end\n    end\n\nThe code above is a spec.\n";
        let mut preprocessor = Preprocessor::new();
        let output = preprocessor.process(input);
        assert_eq!(
            output,
            "Intro.\n\n**spec/controllers/accounts/books\\_controller\\_spec.rb**\n\n```ruby\nrequire 'spec_helper'\n\ndescribe Accounts::BooksController do\n  it 'works' do\n  end\nend\n```\n\nThe code above is a spec.\n"
        );
        assert_eq!(
            preprocessor.listings(),
            &[CodeListing {
                title: Some("spec/controllers/accounts/books_controller_spec.rb".to_owned()),
                lang: Some("ruby".to_owned()),
                line: 3,
            }]
        );
        assert!(preprocessor.warnings().is_empty());
    }

    #[test]
    fn test_listing_without_title() {
        let mut preprocessor = Preprocessor::new();
        let output = preprocessor.process("{lang=sql}\n    SELECT 1;\nDone.\n");
        assert_eq!(output, "```sql\nSELECT 1;\n```\n\nDone.\n");
    }

    #[test]
    fn test_listing_at_end_of_document_is_untouched() {
        let input = "{title=a.rb,lang=ruby}\n    puts 1\n";
        let mut preprocessor = Preprocessor::new();
        assert_eq!(preprocessor.process(input), input);
        assert!(preprocessor.listings().is_empty());
    }

    #[test]
    fn test_listing_trailing_line_without_newline_is_untouched() {
        let input = "{lang=ruby}\n    puts 1\nDone.";
        let mut preprocessor = Preprocessor::new();
        assert_eq!(preprocessor.process(input), input);
    }

    #[test]
    fn test_malformed_listing_warns_and_passes_through() {
        let input = "Text.\n\n{lang=ruby=sql}\n    puts 1\nDone.\n";
        let mut preprocessor = Preprocessor::new();
        let output = preprocessor.process(input);
        assert_eq!(output, input);
        assert_eq!(preprocessor.warnings().len(), 1);
        assert!(preprocessor.warnings()[0].starts_with("line 3: "));
        assert!(preprocessor.listings().is_empty());
    }

    #[test]
    fn test_multiple_listings() {
        let input = "{lang=ruby}\n    a\nOne.\n\n{lang=sql}\n    b\nTwo.\n";
        let mut preprocessor = Preprocessor::new();
        let output = preprocessor.process(input);
        assert_eq!(
            output,
            "```ruby\na\n```\n\nOne.\n\n```sql\nb\n```\n\nTwo.\n"
        );
        let lines: Vec<_> = preprocessor.into_listings().iter().map(|l| l.line).collect();
        assert_eq!(lines, vec![1, 5]);
    }

    #[test]
    fn test_footnote_definition_guarded() {
        let mut preprocessor = Preprocessor::new();
        assert_eq!(
            preprocessor.process("Text[^1]\n\n[^1]: Behold, a footnote.\n"),
            "Text[^1]\n\n\\[^1]: Behold, a footnote.\n"
        );
        assert_eq!(preprocessor.process("  [^a]: b"), "  \\[^a]: b");
    }

    #[test]
    fn test_footnote_definition_in_fence_untouched() {
        let input = "```\n[^1]: not a footnote\n```\n";
        let mut preprocessor = Preprocessor::new();
        assert_eq!(preprocessor.process(input), input);
    }

    #[test]
    fn test_indented_footnote_definition_untouched() {
        let input = "    [^1]: code\n";
        let mut preprocessor = Preprocessor::new();
        assert_eq!(preprocessor.process(input), input);
    }

    #[test]
    fn test_plain_text_unchanged() {
        let input = "# Title\n\nNothing special here.";
        let mut preprocessor = Preprocessor::new();
        assert_eq!(preprocessor.process(input), input);
    }
}
