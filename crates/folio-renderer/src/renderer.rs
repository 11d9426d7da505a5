//! Chapter renderer with pluggable backend.

use std::fmt::Write;
use std::marker::PhantomData;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::backend::RenderBackend;
use crate::footnote::{FootnoteCounter, link_references};
use crate::paragraph::ParagraphKind;
use crate::postprocess::{TocEntry, number_sections};
use crate::preprocess::{CodeListing, Preprocessor};
use crate::state::{
    CodeBlockState, HeadingState, ImageState, ParagraphState, TableState, escape_html,
};

/// Result of rendering a chapter.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderResult {
    /// Rendered HTML fragment.
    pub html: String,
    /// Title extracted from first H1 heading (if title extraction was enabled).
    pub title: Option<String>,
    /// Numbered sections (empty when section numbering is disabled).
    pub toc: Vec<TocEntry>,
    /// Titled code listings found in the source.
    pub listings: Vec<CodeListing>,
    /// Warnings generated during rendering (malformed listings, postprocess failures).
    pub warnings: Vec<String>,
}

/// Chapter renderer with pluggable backend.
///
/// Paragraphs are buffered and classified when they end, so the backend sees
/// admonitions, footnote definitions and plain paragraphs as distinct blocks.
/// Everything else (lists, tables, inline formatting) is rendered generically.
///
/// One renderer owns one footnote counter. The counter restarts at every
/// [`render`](Self::render) call, so reusing a renderer for several chapters
/// numbers each chapter from 1.
pub struct MarkdownRenderer<B: RenderBackend> {
    output: String,
    code: CodeBlockState,
    paragraph: ParagraphState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    footnotes: FootnoteCounter,
    pending_image: Option<(String, String)>,
    gfm: bool,
    highlight: bool,
    number_sections: bool,
    _backend: PhantomData<B>,
}

impl<B: RenderBackend> MarkdownRenderer<B> {
    /// Create a new renderer with GFM, highlighting and section numbering enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            paragraph: ParagraphState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::new(false),
            footnotes: FootnoteCounter::default(),
            pending_image: None,
            gfm: true,
            highlight: true,
            number_sections: true,
            _backend: PhantomData,
        }
    }

    /// Enable title extraction from first H1 heading.
    ///
    /// The heading is still rendered.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.heading = HeadingState::new(true);
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Enable or disable syntax highlighting of code blocks.
    ///
    /// When disabled every code block is rendered literally.
    #[must_use]
    pub fn with_highlight(mut self, enabled: bool) -> Self {
        self.highlight = enabled;
        self
    }

    /// Enable or disable `h2`/`h3` numbering in [`render_markdown`](Self::render_markdown).
    #[must_use]
    pub fn with_section_numbering(mut self, enabled: bool) -> Self {
        self.number_sections = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
        } else {
            Options::empty()
        }
    }

    /// Create a configured parser for the given markdown text.
    #[must_use]
    pub fn create_parser<'a>(&self, markdown: &'a str) -> Parser<'a> {
        Parser::new_ext(markdown, self.parser_options())
    }

    /// Run the full pipeline on chapter source: preprocess, render, number sections.
    ///
    /// Never fails. Malformed listings stay literal and a failed section
    /// numbering pass keeps the un-numbered HTML; both are reported in
    /// [`RenderResult::warnings`].
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        let mut preprocessor = Preprocessor::new();
        let source = preprocessor.process(markdown);
        let mut warnings = preprocessor.warnings().to_vec();
        let listings = preprocessor.into_listings();

        let mut result = self.render(self.create_parser(&source));

        if self.number_sections {
            match number_sections(&result.html) {
                Ok(sectioned) => {
                    result.html = sectioned.html;
                    result.toc = sectioned.sections;
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Section numbering failed, keeping un-numbered HTML"
                    );
                    warnings.push(format!("section numbering failed: {e}"));
                }
            }
        }

        result.warnings = warnings;
        result.listings = listings;
        result
    }

    /// Render markdown events and return the result.
    ///
    /// No preprocessing or section numbering is applied; the footnote
    /// counter restarts at 0.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        self.footnotes.reset();
        for event in events {
            self.process_event(event);
        }

        tracing::debug!(footnotes = self.footnotes.count(), "Rendered chapter");

        RenderResult {
            html: std::mem::take(&mut self.output),
            title: self.heading.take_title(),
            toc: Vec::new(),
            listings: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Buffer that inline content goes to: heading, paragraph, or output.
    fn inline_buffer(&mut self) -> &mut String {
        if self.heading.is_active() {
            self.heading.html_buffer()
        } else if self.paragraph.is_active() {
            self.paragraph.buffer()
        } else {
            &mut self.output
        }
    }

    fn push_inline(&mut self, content: &str) {
        self.inline_buffer().push_str(content);
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => B::hard_break(self.inline_buffer()),
            Event::Rule => B::horizontal_rule(&mut self.output),
            Event::TaskListMarker(checked) => B::task_list_marker(checked, self.inline_buffer()),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Footnotes are handled on paragraph text; math is not enabled
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.paragraph.start(),
            Tag::Heading { level, .. } => self.heading.start_heading(heading_level_to_num(level)),
            Tag::BlockQuote(_) => B::blockquote_start(&mut self.output),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .filter(|_| self.highlight)
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Link { dest_url, .. } => {
                let link_tag = format!(r#"<a href="{}">"#, escape_html(&dest_url));
                self.push_inline(&link_tag);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image.start();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                let html = self.paragraph.end();
                self.finish_paragraph(&html);
            }
            TagEnd::Heading(_) => {
                if let Some((level, html)) = self.heading.complete_heading() {
                    let html = html.trim();
                    write!(self.output, "<h{level}>{html}</h{level}>").unwrap();
                }
            }
            TagEnd::BlockQuote(_) => B::blockquote_end(&mut self.output),
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                B::code_block(lang.as_deref(), &content, &mut self.output);
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    B::image(&src, &alt, &title, self.inline_buffer());
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
        }
    }

    /// Classify a finished paragraph and hand it to the backend.
    fn finish_paragraph(&mut self, html: &str) {
        match ParagraphKind::classify(html) {
            ParagraphKind::Admonition(admonition) => {
                B::admonition(admonition.kind, &admonition.segments(), &mut self.output);
            }
            ParagraphKind::FootnoteDefinition(definition) => {
                B::footnote_definition(definition.label, definition.body, &mut self.output);
            }
            ParagraphKind::Plain(html) => {
                let html = link_references(html, &mut self.footnotes, |label, number| {
                    let mut link = String::new();
                    B::footnote_reference(label, number, &mut link);
                    link
                });
                B::paragraph(&html, &mut self.output);
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else {
            if self.heading.is_active() {
                self.heading.push_text(text);
            }
            self.push_inline(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        let html = format!("<code>{}</code>", escape_html(code));
        self.push_inline(&html);
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else {
            self.push_inline("\n");
        }
    }
}

impl<B: RenderBackend> Default for MarkdownRenderer<B> {
    fn default() -> Self {
        Self::new()
    }
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
