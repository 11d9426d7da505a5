//! Section numbering for rendered chapter HTML.
//!
//! Every `h2` and `h3` gets `class="section_title"` and `id="header_N"`,
//! with one zero-based counter shared by both levels. The HTML is streamed
//! through `quick-xml` as a lenient tokenizer: end-tag names are not
//! checked and everything that is not a section header is written back
//! as read.

use std::borrow::Cow;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::PostprocessError;

/// CSS class assigned to numbered headers.
pub const SECTION_CLASS: &str = "section_title";

/// Table of contents entry for a numbered header.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (2 or 3).
    pub level: u8,
    /// Heading text content.
    pub title: String,
    /// Anchor ID (`header_N`).
    pub id: String,
}

/// Result of [`number_sections`].
#[derive(Clone, Debug)]
pub struct SectionedHtml {
    /// HTML with numbered headers.
    pub html: String,
    /// One entry per numbered header, in document order.
    pub sections: Vec<TocEntry>,
}

/// Header whose text is being collected.
struct OpenHeader {
    index: usize,
    name: Vec<u8>,
}

/// Number `h2`/`h3` headers in document order.
///
/// Existing `class` and `id` attributes on headers are replaced, other
/// attributes are kept, so running this twice gives the same output.
/// HTML without section headers is returned unchanged.
///
/// # Example
///
/// ```
/// use folio_renderer::number_sections;
///
/// let result = number_sections("<h2>Setup</h2><p>Text</p><h3>Details</h3>").unwrap();
/// assert_eq!(
///     result.html,
///     r#"<h2 class="section_title" id="header_0">Setup</h2><p>Text</p><h3 class="section_title" id="header_1">Details</h3>"#
/// );
/// assert_eq!(result.sections[1].title, "Details");
/// ```
pub fn number_sections(html: &str) -> Result<SectionedHtml, PostprocessError> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;

    let mut writer = Writer::new(Vec::with_capacity(html.len() + 64));
    let mut sections: Vec<TocEntry> = Vec::new();
    let mut open: Option<OpenHeader> = None;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => match section_level(&e) {
                Some(level) => {
                    let header = number_header(&reader, &e, sections.len())?;
                    if open.is_none() {
                        open = Some(OpenHeader {
                            index: sections.len(),
                            name: e.name().as_ref().to_vec(),
                        });
                    }
                    sections.push(TocEntry {
                        level,
                        title: String::new(),
                        id: header_id(sections.len()),
                    });
                    writer.write_event(Event::Start(header))?;
                }
                None => writer.write_event(Event::Start(e))?,
            },
            Event::Empty(e) => match section_level(&e) {
                Some(level) => {
                    let header = number_header(&reader, &e, sections.len())?;
                    sections.push(TocEntry {
                        level,
                        title: String::new(),
                        id: header_id(sections.len()),
                    });
                    writer.write_event(Event::Empty(header))?;
                }
                None => writer.write_event(Event::Empty(e))?,
            },
            Event::End(e) => {
                if let Some(header) = &open
                    && e.name().as_ref().eq_ignore_ascii_case(&header.name)
                {
                    let entry = &mut sections[header.index];
                    entry.title = entry.title.trim().to_owned();
                    open = None;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Text(e) => {
                if let Some(header) = &open {
                    let text = reader.decoder().decode(&e)?;
                    sections[header.index].title.push_str(&text);
                }
                writer.write_event(Event::Text(e))?;
            }
            Event::GeneralRef(e) => {
                if let Some(header) = &open {
                    let entity = reader.decoder().decode(&e)?;
                    sections[header.index]
                        .title
                        .push_str(&resolve_entity(&entity));
                }
                writer.write_event(Event::GeneralRef(e))?;
            }
            event => writer.write_event(event)?,
        }
    }

    let html = String::from_utf8(writer.into_inner())?;
    tracing::debug!(sections = sections.len(), "Numbered sections");
    Ok(SectionedHtml { html, sections })
}

fn header_id(index: usize) -> String {
    format!("header_{index}")
}

fn section_level(e: &BytesStart<'_>) -> Option<u8> {
    let name = e.name();
    let name = name.as_ref();
    if name.eq_ignore_ascii_case(b"h2") {
        Some(2)
    } else if name.eq_ignore_ascii_case(b"h3") {
        Some(3)
    } else {
        None
    }
}

/// Rebuild a header start tag with the section class and id.
fn number_header(
    reader: &Reader<&[u8]>,
    e: &BytesStart<'_>,
    index: usize,
) -> Result<BytesStart<'static>, PostprocessError> {
    let name = reader.decoder().decode(e.name().as_ref())?.into_owned();
    let mut header = BytesStart::new(name);

    for attr in e.html_attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if key.eq_ignore_ascii_case(b"class") || key.eq_ignore_ascii_case(b"id") {
            continue;
        }
        header.push_attribute(attr);
    }

    let id = header_id(index);
    header.push_attribute(("class", SECTION_CLASS));
    header.push_attribute(("id", id.as_str()));
    Ok(header)
}

/// Resolve an entity name (without `&` and `;`) for header text.
///
/// Unknown named entities are kept in their escaped form.
fn resolve_entity(entity: &str) -> Cow<'static, str> {
    if let Some(resolved) = resolve_predefined_entity(entity) {
        return Cow::Borrowed(resolved);
    }

    let code = match entity.strip_prefix('#') {
        Some(hex) if hex.starts_with(['x', 'X']) => u32::from_str_radix(&hex[1..], 16).ok(),
        Some(dec) => dec.parse::<u32>().ok(),
        None => None,
    };
    code.and_then(char::from_u32).map_or_else(
        || Cow::Owned(format!("&{entity};")),
        |c| Cow::Owned(c.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_numbers_h2_and_h3_with_shared_counter() {
        let result =
            number_sections("<h2>One</h2><p>x</p><h3>Two</h3><h4>Skip</h4><h2>Three</h2>").unwrap();
        assert_eq!(
            result.html,
            concat!(
                r#"<h2 class="section_title" id="header_0">One</h2><p>x</p>"#,
                r#"<h3 class="section_title" id="header_1">Two</h3><h4>Skip</h4>"#,
                r#"<h2 class="section_title" id="header_2">Three</h2>"#
            )
        );
        let ids: Vec<_> = result.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["header_0", "header_1", "header_2"]);
        let levels: Vec<_> = result.sections.iter().map(|s| s.level).collect();
        assert_eq!(levels, vec![2, 3, 2]);
    }

    #[test]
    fn test_idempotent() {
        let once = number_sections("<h2>A</h2><h3>B</h3><h2>C</h2>").unwrap();
        let twice = number_sections(&once.html).unwrap();
        assert_eq!(once.html, twice.html);
        assert_eq!(once.sections, twice.sections);
    }

    #[test]
    fn test_replaces_class_and_id_keeps_other_attributes() {
        let result =
            number_sections(r#"<h2 id="old" class="fancy" data-x="1">Title</h2>"#).unwrap();
        assert_eq!(
            result.html,
            r#"<h2 data-x="1" class="section_title" id="header_0">Title</h2>"#
        );
    }

    #[test]
    fn test_uppercase_tags() {
        let result = number_sections("<H2>Loud</H2>").unwrap();
        assert_eq!(
            result.html,
            r#"<H2 class="section_title" id="header_0">Loud</H2>"#
        );
        assert_eq!(result.sections[0].title, "Loud");
    }

    #[test]
    fn test_no_headers_is_unchanged() {
        let html = "<p>Just <em>text</em> &amp; more<br></p><div class='tip'><p>x</p></div>";
        let result = number_sections(html).unwrap();
        assert_eq!(result.html, html);
        assert!(result.sections.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let result = number_sections("").unwrap();
        assert_eq!(result.html, "");
        assert!(result.sections.is_empty());
    }

    #[test]
    fn test_toc_text_with_inline_markup_and_entities() {
        let result = number_sections("<h2>Use <code>Tom &amp; Jerry</code> &#39;now&#39;</h2>").unwrap();
        assert_eq!(result.sections[0].title, "Use Tom & Jerry 'now'");
    }

    #[test]
    fn test_unknown_entity_kept_in_toc() {
        let result = number_sections("<h3>A&nbsp;B</h3>").unwrap();
        assert_eq!(result.sections[0].title, "A&nbsp;B");
        assert_eq!(
            result.html,
            r#"<h3 class="section_title" id="header_0">A&nbsp;B</h3>"#
        );
    }

    #[test]
    fn test_resolve_entity() {
        assert_eq!(resolve_entity("lt"), "<");
        assert_eq!(resolve_entity("#x41"), "A");
        assert_eq!(resolve_entity("#65"), "A");
        assert_eq!(resolve_entity("#xZZ"), "&#xZZ;");
        assert_eq!(resolve_entity("hellip"), "&hellip;");
    }
}
