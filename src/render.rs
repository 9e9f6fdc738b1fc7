// Copyright Sebastian Wiesner <sebastian@swsnr.de>

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The rendering driver.
//!
//! Walk the parser's enter/exit events and grow a stack of block frames.
//! Inline content accumulates in the buffer of the current frame; when a
//! block ends, its buffer is reflowed and pushed through the indent and
//! padding pipeline into the enclosing frame.  The document frame sits at
//! the bottom of the stack and flushes to the caller's writer at the end.

use std::io::Write;

use pulldown_cmark::{CodeBlockKind, Event, LinkType, Tag, TagEnd};
use tracing::{event, instrument, Level};
use url::Url;

use crate::ansi::AnsiWriter;
use crate::block::{BlockFrame, BlockStack};
use crate::color::ColorProfile;
use crate::highlight::Highlight;
use crate::indent::IndentWriter;
use crate::padding::PaddingWriter;
use crate::sanitize::Sanitize;
use crate::style::{expand_format, StyleBlock, StylePrimitive};
use crate::wrap::wrap;
use crate::{Error, Options};

mod table;

use table::TableBuilder;

/// How to reflow a finished block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reflow {
    /// Collapse newlines into spaces and wrap freely.
    Collapse,
    /// Wrap, but keep hard line breaks.
    Keep,
    /// Emit as-is; code and tables lay themselves out.
    None,
}

/// Logical containers the walk is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    List,
    Item,
    BlockQuote,
    Paragraph,
    /// A paragraph directly inside a list item; the item owns the layout.
    SkippedParagraph,
    Heading,
    CodeBlock,
    Table,
    DefinitionList,
    DefinitionTitle,
    DefinitionDescription,
    HtmlBlock,
}

#[derive(Debug)]
struct ListLevel {
    ordered: bool,
    index: u64,
}

#[derive(Debug)]
struct LinkTarget {
    destination: String,
    link_type: LinkType,
    image: bool,
}

#[derive(Debug)]
struct CodeBlockState {
    language: String,
    content: String,
}

struct Context<'a> {
    options: &'a Options,
    highlighter: &'a dyn Highlight,
    sanitizer: &'a dyn Sanitize,
    blocks: BlockStack,
    containers: Vec<Container>,
    /// Overlay styles for active inline spans.
    inline: Vec<StylePrimitive>,
    /// Nesting depth of emphasis; the second level renders as strong.
    emphasis: usize,
    lists: Vec<ListLevel>,
    links: Vec<LinkTarget>,
    /// Capture buffers for content consumed by its parent handler.
    captures: Vec<String>,
    table: Option<TableBuilder>,
    code: Option<CodeBlockState>,
    html: Option<String>,
    /// An item marker is due before the item's first content.
    pending_marker: bool,
}

/// Write `text` in the given style.
///
/// Every line of the text becomes a self-closed styled run; newlines are
/// emitted outside any styling so a run never spans a physical line.
fn write_styled<W: Write>(
    writer: &mut W,
    primitive: &StylePrimitive,
    profile: ColorProfile,
    text: &str,
) -> std::io::Result<()> {
    let sequence = primitive.sequence(profile);
    for (index, line) in text.split('\n').enumerate() {
        if 0 < index {
            writer.write_all(b"\n")?;
        }
        if line.is_empty() {
            continue;
        }
        if sequence.is_empty() {
            writer.write_all(line.as_bytes())?;
        } else {
            write!(writer, "\x1b[{sequence}m{line}\x1b[0m")?;
        }
    }
    Ok(())
}

/// Push a finished block through the indent and padding pipeline.
///
/// Indentation glyphs are rendered in the parent's style, padding in the
/// block's own style so styled backgrounds form uniform rectangles.
#[allow(clippy::too_many_arguments)]
fn pipe(
    text: &str,
    block: &StylePrimitive,
    parent: &StylePrimitive,
    indent: usize,
    indent_token: &str,
    padding: usize,
    profile: ColorProfile,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    let pad_style = block.clone();
    let token_style = parent.clone();
    let ansi = AnsiWriter::new(out);
    let padder = PaddingWriter::new(ansi, padding, move |w| {
        write_styled(w, &pad_style, profile, " ")
    });
    let mut indenter = IndentWriter::new(padder, indent, move |w| {
        write_styled(w, &token_style, profile, indent_token)
    });
    indenter.write_all(text.as_bytes())
}

impl<'a> Context<'a> {
    fn new(
        options: &'a Options,
        highlighter: &'a dyn Highlight,
        sanitizer: &'a dyn Sanitize,
    ) -> Self {
        Self {
            options,
            highlighter,
            sanitizer,
            blocks: BlockStack::new(),
            containers: Vec::new(),
            inline: Vec::new(),
            emphasis: 0,
            lists: Vec::new(),
            links: Vec::new(),
            captures: Vec::new(),
            table: None,
            code: None,
            html: None,
            pending_marker: false,
        }
    }

    fn profile(&self) -> ColorProfile {
        self.options.color_profile
    }

    /// The style for inline text at the current position.
    fn inline_style(&self) -> StylePrimitive {
        self.inline
            .last()
            .cloned()
            .unwrap_or_else(|| self.blocks.with(&self.options.styles.text))
    }

    /// Write a leaf token, applying the style's format template.
    fn styled_token(&mut self, primitive: &StylePrimitive, text: &str) -> Result<(), Error> {
        let expanded = match primitive.format.as_deref() {
            Some(format) => expand_format(format, text)?,
            None => text.to_string(),
        };
        let profile = self.profile();
        write_styled(
            &mut self.blocks.current_mut().buf,
            primitive,
            profile,
            &expanded,
        )?;
        Ok(())
    }

    /// Terminate the current line of the current frame, if it is open.
    fn ensure_newline(&mut self) {
        let buf = &mut self.blocks.current_mut().buf;
        if !buf.is_empty() && !buf.ends_with(b"\n") {
            buf.push(b'\n');
        }
    }

    /// Separate this block from a preceding sibling with a blank line.
    fn block_separator(&mut self) {
        self.ensure_newline();
        let frame = self.blocks.current_mut();
        if 0 < frame.child_blocks {
            frame.buf.push(b'\n');
        }
    }

    /// Open a block frame: separator, block prefix in the parent's style,
    /// then the block's own prefix into the fresh frame.
    fn start_block(&mut self, style: &StyleBlock) -> Result<(), Error> {
        self.block_separator();
        let profile = self.profile();
        let parent = self.blocks.current().style.primitive.clone();
        if let Some(block_prefix) = style.primitive.block_prefix.as_deref() {
            write_styled(
                &mut self.blocks.current_mut().buf,
                &parent,
                profile,
                block_prefix,
            )?;
        }
        let effective = StyleBlock {
            primitive: style.primitive.inherit_for_block(&parent),
            indent: style.indent,
            margin: style.margin,
            indent_token: style.indent_token.clone(),
        };
        self.blocks.push(BlockFrame::new(effective));
        let own = self.blocks.current().style.primitive.clone();
        if let Some(prefix) = own.prefix.as_deref() {
            write_styled(&mut self.blocks.current_mut().buf, &own, profile, prefix)?;
        }
        Ok(())
    }

    /// Close the current frame: suffix, reflow, pipeline, block suffix.
    fn end_block(&mut self, reflow: Reflow, pad: bool) -> Result<(), Error> {
        let profile = self.profile();
        let own = self.blocks.current().style.primitive.clone();
        if let Some(suffix) = own.suffix.as_deref() {
            write_styled(&mut self.blocks.current_mut().buf, &own, profile, suffix)?;
        }

        let width = self.blocks.content_width(self.options.word_wrap);
        let parent = self.blocks.parent().style.primitive.clone();
        let frame = self.blocks.pop();
        let text = String::from_utf8_lossy(&frame.buf).into_owned();
        let mut flowed = match reflow {
            Reflow::None => text,
            _ if width == 0 => text,
            Reflow::Collapse => wrap(&text, width, false),
            Reflow::Keep => wrap(&text, width, true),
        };
        if !flowed.is_empty() && !flowed.ends_with('\n') {
            flowed.push('\n');
        }

        let indent = frame.style.indent() + frame.style.margin();
        let token = frame.style.indent_token.clone().unwrap_or_else(|| " ".to_string());
        pipe(
            &flowed,
            &frame.style.primitive,
            &parent,
            indent,
            &token,
            if pad { width } else { 0 },
            profile,
            &mut self.blocks.current_mut().buf,
        )?;
        if let Some(block_suffix) = frame.style.primitive.block_suffix.as_deref() {
            write_styled(
                &mut self.blocks.current_mut().buf,
                &parent,
                profile,
                block_suffix,
            )?;
        }
        if !flowed.is_empty() || frame.style.primitive.block_suffix.is_some() {
            self.blocks.current_mut().child_blocks += 1;
        }
        Ok(())
    }

    /// Resolve a link target, leaving it alone when it cannot be resolved.
    fn resolve_url(&self, target: &str) -> String {
        match Url::parse(target) {
            Ok(url) => url.to_string(),
            Err(_) => match &self.options.base_url {
                Some(base) => base
                    .join(target)
                    .map(|url| url.to_string())
                    .unwrap_or_else(|_| target.to_string()),
                None => target.to_string(),
            },
        }
    }

    fn write_item_marker(&mut self) -> Result<(), Error> {
        self.pending_marker = false;
        let Some(level) = self.lists.last() else {
            return Ok(());
        };
        if level.ordered {
            let index = level.index.to_string();
            let style = self.blocks.with(&self.options.styles.enumeration);
            self.styled_token(&style, &index)?;
        } else {
            let item = self.options.styles.item.clone();
            let marker = item.block_prefix.clone().unwrap_or_default();
            let style = self.blocks.with(&item);
            let profile = self.profile();
            write_styled(&mut self.blocks.current_mut().buf, &style, profile, &marker)?;
        }
        Ok(())
    }

    fn start_link(&mut self, link_type: LinkType, destination: &str, image: bool) {
        self.links.push(LinkTarget {
            destination: destination.to_string(),
            link_type,
            image,
        });
        self.captures.push(String::new());
    }

    fn finish_link(&mut self) -> Result<(), Error> {
        let link = self.links.pop().expect("link end without link start");
        let text = self.captures.pop().expect("link capture missing");

        // Inside an outer capture only the text matters.
        if let Some(outer) = self.captures.last_mut() {
            outer.push_str(&text);
            return Ok(());
        }

        let styles = &self.options.styles;
        let (text_style, url_style) = if link.image {
            (
                self.blocks.with(&styles.image_text),
                self.blocks.with(&styles.image),
            )
        } else {
            (
                self.blocks.with(&styles.link_text),
                self.blocks.with(&styles.link),
            )
        };

        let url = match link.link_type {
            // The text of an autolink is the URL exactly as written.
            LinkType::Autolink => text.clone(),
            LinkType::Email if !link.destination.starts_with("mailto:") => {
                format!("mailto:{}", link.destination)
            }
            LinkType::Email => link.destination.clone(),
            _ => self.resolve_url(&link.destination),
        };

        let url_only = matches!(link.link_type, LinkType::Autolink | LinkType::Email)
            || text.is_empty()
            || text == url
            || text == link.destination;
        if url_only {
            self.styled_token(&url_style, &url)?;
        } else {
            self.styled_token(&text_style, &text)?;
            self.blocks.current_mut().buf.push(b' ');
            self.styled_token(&url_style, &url)?;
        }
        Ok(())
    }

    fn start_tag(&mut self, tag: Tag<'_>) -> Result<(), Error> {
        match tag {
            Tag::Paragraph => {
                if self.containers.last() == Some(&Container::Item) {
                    self.containers.push(Container::SkippedParagraph);
                } else {
                    let style = self.options.styles.paragraph.clone();
                    self.start_block(&style)?;
                    self.containers.push(Container::Paragraph);
                }
            }
            Tag::Heading { level, .. } => {
                let style = self.options.styles.heading_level(level as usize);
                self.start_block(&style)?;
                // The heading owns its content: inline text renders in the
                // heading style itself, not through the text cascade.
                let primitive = self.blocks.current().style.primitive.clone();
                self.inline.push(primitive);
                self.containers.push(Container::Heading);
            }
            Tag::BlockQuote(_) => {
                let style = self.options.styles.block_quote.clone();
                self.start_block(&style)?;
                self.containers.push(Container::BlockQuote);
            }
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(tag) => tag
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                let style = self.options.styles.code_block.block.clone();
                self.start_block(&style)?;
                self.code = Some(CodeBlockState {
                    language,
                    content: String::new(),
                });
                self.containers.push(Container::CodeBlock);
            }
            Tag::List(start) => {
                let mut style = self.options.styles.list.block.clone();
                if !self.lists.is_empty() {
                    style.indent = Some(self.options.styles.list.level_indent.unwrap_or(2));
                }
                self.start_block(&style)?;
                self.lists.push(ListLevel {
                    ordered: start.is_some(),
                    index: start.unwrap_or(1),
                });
                self.containers.push(Container::List);
            }
            Tag::Item => {
                self.ensure_newline();
                self.pending_marker = true;
                self.containers.push(Container::Item);
            }
            Tag::Emphasis => {
                let overlay = if 0 < self.emphasis {
                    self.options.styles.strong.clone()
                } else {
                    self.options.styles.emph.clone()
                };
                let style = overlay.colors_on_top_of(&self.inline_style());
                self.inline.push(style);
                self.emphasis += 1;
            }
            Tag::Strong => {
                let style = self
                    .options
                    .styles
                    .strong
                    .clone()
                    .colors_on_top_of(&self.inline_style());
                self.inline.push(style);
            }
            Tag::Strikethrough => {
                let style = self
                    .options
                    .styles
                    .strike_through
                    .clone()
                    .colors_on_top_of(&self.inline_style());
                self.inline.push(style);
            }
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => self.start_link(link_type, &dest_url, false),
            Tag::Image {
                link_type,
                dest_url,
                ..
            } => self.start_link(link_type, &dest_url, true),
            Tag::Table(alignments) => {
                let style = self.options.styles.table.block.clone();
                self.start_block(&style)?;
                self.table = Some(TableBuilder::new(alignments));
                self.containers.push(Container::Table);
            }
            Tag::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.start_head();
                }
            }
            Tag::TableRow => {}
            Tag::TableCell => self.captures.push(String::new()),
            Tag::DefinitionList => {
                let style = self.options.styles.definition_list.clone();
                self.start_block(&style)?;
                self.containers.push(Container::DefinitionList);
            }
            Tag::DefinitionListTitle => {
                self.ensure_newline();
                let style = self.blocks.with(&self.options.styles.definition_term);
                self.inline.push(style);
                self.containers.push(Container::DefinitionTitle);
            }
            Tag::DefinitionListDefinition => {
                self.ensure_newline();
                let description = self.options.styles.definition_description.clone();
                let profile = self.profile();
                if let Some(block_prefix) = description.block_prefix.as_deref() {
                    let enclosing = self.blocks.current().style.primitive.clone();
                    write_styled(
                        &mut self.blocks.current_mut().buf,
                        &enclosing,
                        profile,
                        block_prefix,
                    )?;
                }
                let style = self.blocks.with(&description);
                self.inline.push(style);
                self.containers.push(Container::DefinitionDescription);
            }
            Tag::HtmlBlock => {
                self.html = Some(String::new());
                self.containers.push(Container::HtmlBlock);
            }
            Tag::FootnoteDefinition(_) | Tag::MetadataBlock(_) => {
                event!(Level::WARN, ?tag, "ignoring unsupported block");
            }
            _ => {
                event!(Level::WARN, ?tag, "ignoring unknown tag");
            }
        }
        Ok(())
    }

    fn end_tag(&mut self, tag: TagEnd) -> Result<(), Error> {
        match tag {
            TagEnd::Paragraph => match self.containers.pop() {
                Some(Container::SkippedParagraph) => self.ensure_newline(),
                _ => self.end_block(Reflow::Collapse, true)?,
            },
            TagEnd::Heading(_) => {
                self.containers.pop();
                self.inline.pop();
                self.end_block(Reflow::Collapse, false)?;
            }
            TagEnd::BlockQuote(_) => {
                self.containers.pop();
                self.ensure_newline();
                self.end_block(Reflow::Keep, true)?;
            }
            TagEnd::CodeBlock => {
                self.containers.pop();
                let code = self.code.take().expect("code block end without start");
                let style = self.options.styles.code_block.clone();
                if style.wants_highlighting() {
                    let mut highlighted = Vec::new();
                    self.highlighter.highlight(
                        &mut highlighted,
                        &code.content,
                        &code.language,
                        style.theme.as_deref().unwrap_or_default(),
                        style.chroma.as_ref(),
                    )?;
                    self.blocks.current_mut().buf.extend_from_slice(&highlighted);
                } else {
                    let primitive = self.blocks.current().style.primitive.clone();
                    let profile = self.profile();
                    write_styled(
                        &mut self.blocks.current_mut().buf,
                        &primitive,
                        profile,
                        &code.content,
                    )?;
                }
                self.ensure_newline();
                self.end_block(Reflow::None, true)?;
            }
            TagEnd::List(_) => {
                self.containers.pop();
                self.lists.pop();
                self.ensure_newline();
                self.end_block(Reflow::Keep, true)?;
            }
            TagEnd::Item => {
                // An empty item still gets its marker.
                if self.pending_marker {
                    self.write_item_marker()?;
                }
                self.containers.pop();
                self.ensure_newline();
                if let Some(level) = self.lists.last_mut() {
                    level.index += 1;
                }
            }
            TagEnd::Emphasis => {
                self.inline.pop();
                self.emphasis = self.emphasis.saturating_sub(1);
            }
            TagEnd::Strong | TagEnd::Strikethrough => {
                self.inline.pop();
            }
            TagEnd::Link | TagEnd::Image => self.finish_link()?,
            TagEnd::Table => {
                self.containers.pop();
                let builder = self.table.take().expect("table end without start");
                let lines = builder.layout(&self.options.styles.table);
                let primitive = self.blocks.current().style.primitive.clone();
                let profile = self.profile();
                for line in lines {
                    write_styled(&mut self.blocks.current_mut().buf, &primitive, profile, &line)?;
                    self.blocks.current_mut().buf.push(b'\n');
                }
                self.end_block(Reflow::None, true)?;
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.end_head();
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.end_row();
                }
            }
            TagEnd::TableCell => {
                let text = self.captures.pop().unwrap_or_default();
                if let Some(table) = self.table.as_mut() {
                    table.push_cell(text);
                }
            }
            TagEnd::DefinitionList => {
                self.containers.pop();
                self.ensure_newline();
                self.end_block(Reflow::Keep, true)?;
            }
            TagEnd::DefinitionListTitle | TagEnd::DefinitionListDefinition => {
                self.containers.pop();
                self.inline.pop();
                self.ensure_newline();
            }
            TagEnd::HtmlBlock => {
                self.containers.pop();
                let raw = self.html.take().unwrap_or_default();
                let text = self.sanitizer.sanitize(&raw, true);
                if !text.is_empty() {
                    self.block_separator();
                    let style = self.blocks.with(&self.options.styles.html_block.primitive);
                    self.styled_token(&style, &text)?;
                    self.ensure_newline();
                    self.blocks.current_mut().child_blocks += 1;
                }
            }
            TagEnd::FootnoteDefinition | TagEnd::MetadataBlock(_) => {}
            _ => {
                event!(Level::WARN, ?tag, "ignoring unknown tag end");
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, event: Event<'_>) -> Result<(), Error> {
        event!(Level::TRACE, ?event, "rendering");
        // A due item marker goes out before the item's first content.  The
        // task checkbox substitutes the marker, and the paragraph wrapper of
        // a loose item is transparent so the checkbox inside it still wins.
        let transparent = matches!(event, Event::TaskListMarker(_))
            || (matches!(event, Event::Start(Tag::Paragraph))
                && self.containers.last() == Some(&Container::Item));
        if self.pending_marker && !transparent {
            self.write_item_marker()?;
        }
        match event {
            Event::Start(tag) => self.start_tag(tag)?,
            Event::End(tag) => self.end_tag(tag)?,
            Event::Text(text) => {
                if let Some(code) = self.code.as_mut() {
                    code.content.push_str(&text);
                } else if let Some(capture) = self.captures.last_mut() {
                    capture.push_str(&self.sanitizer.sanitize(&text, false));
                } else if let Some(html) = self.html.as_mut() {
                    html.push_str(&text);
                } else {
                    let clean = self.sanitizer.sanitize(&text, false);
                    let style = self.inline_style();
                    self.styled_token(&style, &clean)?;
                }
            }
            Event::Code(code) => {
                if let Some(capture) = self.captures.last_mut() {
                    capture.push_str(&code);
                } else {
                    let span = self.options.styles.code.primitive.clone();
                    let style = span.colors_on_top_of(&self.inline_style());
                    let text = format!(
                        "{}{}{}",
                        span.prefix.as_deref().unwrap_or_default(),
                        code,
                        span.suffix.as_deref().unwrap_or_default()
                    );
                    let profile = self.profile();
                    write_styled(&mut self.blocks.current_mut().buf, &style, profile, &text)?;
                }
            }
            Event::Html(html) => {
                if let Some(buffer) = self.html.as_mut() {
                    buffer.push_str(&html);
                } else {
                    let text = self.sanitizer.sanitize(&html, false);
                    if !text.is_empty() {
                        let style = self.blocks.with(&self.options.styles.html_block.primitive);
                        self.styled_token(&style, &text)?;
                        self.ensure_newline();
                    }
                }
            }
            Event::InlineHtml(html) => {
                let text = self.sanitizer.sanitize(&html, false);
                if !text.is_empty() {
                    let style = self.blocks.with(&self.options.styles.html_span.primitive);
                    self.styled_token(&style, &text)?;
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(capture) = self.captures.last_mut() {
                    capture.push(' ');
                } else {
                    self.blocks.current_mut().buf.push(b'\n');
                }
            }
            Event::Rule => {
                self.block_separator();
                let style = self.blocks.with(&self.options.styles.hr);
                self.styled_token(&style, "")?;
                self.ensure_newline();
                self.blocks.current_mut().child_blocks += 1;
            }
            Event::TaskListMarker(checked) => {
                self.pending_marker = false;
                let task = self.options.styles.task.clone();
                let glyph = if checked {
                    task.ticked.as_deref().unwrap_or("[\u{2713}] ").to_string()
                } else {
                    task.unticked.as_deref().unwrap_or("[ ] ").to_string()
                };
                let style = self.blocks.with(&task.primitive);
                let profile = self.profile();
                write_styled(&mut self.blocks.current_mut().buf, &style, profile, &glyph)?;
            }
            Event::FootnoteReference(label) => {
                let style = self.inline_style();
                let reference = format!("[{label}]");
                let profile = self.profile();
                write_styled(&mut self.blocks.current_mut().buf, &style, profile, &reference)?;
            }
            event => {
                event!(Level::WARN, ?event, "ignoring unknown event");
            }
        }
        Ok(())
    }

    /// Flush the document frame to the caller's writer.
    fn finish<W: Write>(mut self, writer: &mut W) -> Result<(), Error> {
        let width = self.blocks.content_width(self.options.word_wrap);
        let frame = self.blocks.pop();
        debug_assert!(self.blocks.is_empty(), "unbalanced block stack");
        let text = String::from_utf8_lossy(&frame.buf);
        let indent = frame.style.indent() + frame.style.margin();
        let token = frame.style.indent_token.clone().unwrap_or_else(|| " ".to_string());
        pipe(
            &text,
            &frame.style.primitive,
            &StylePrimitive::default(),
            indent,
            &token,
            width,
            self.profile(),
            writer,
        )?;
        if let Some(block_suffix) = frame.style.primitive.block_suffix.as_deref() {
            writer.write_all(block_suffix.as_bytes())?;
        }
        Ok(())
    }
}

/// Render parser events as styled text to `writer`.
#[instrument(level = "debug", skip_all, fields(word_wrap = options.word_wrap))]
pub(crate) fn push_styled<'e, I, W>(
    options: &Options,
    highlighter: &dyn Highlight,
    sanitizer: &dyn Sanitize,
    events: I,
    writer: &mut W,
) -> Result<(), Error>
where
    I: Iterator<Item = Event<'e>>,
    W: Write,
{
    let mut context = Context::new(options, highlighter, sanitizer);
    let document = options.styles.document.clone();
    if let Some(block_prefix) = document.primitive.block_prefix.as_deref() {
        writer.write_all(block_prefix.as_bytes())?;
    }
    context.blocks.push(BlockFrame::new(document));
    for event in events {
        context.dispatch(event)?;
    }
    context.finish(writer)
}
