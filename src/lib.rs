// Copyright Sebastian Wiesner <sebastian@swsnr.de>

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render Markdown to stylish ANSI text.
//!
//! Parse CommonMark with GFM tables, task lists, strikethrough and
//! definition lists, and render the result as word-wrapped, margin-indented
//! text with ANSI SGR styling, driven by a JSON style sheet.
//!
//! See [`render`] for the one-shot entry point and [`Renderer`] for a
//! reusable handle:
//!
//! ```
//! let options = velour::Options {
//!     styles: velour::theme::plain().clone(),
//!     ..velour::Options::default()
//! };
//! let text = velour::render("*Hello* **World**", &options).unwrap();
//! assert!(text.contains("Hello World"));
//! ```
//!
//! Rendering is a pure transformation: one call owns its entire state, and
//! independent calls may run concurrently.  Syntax highlighting and HTML
//! sanitisation are pluggable through [`Highlight`] and [`Sanitize`].

#![deny(warnings, clippy::all)]
#![forbid(unsafe_code)]

use std::io::Write;

use pulldown_cmark::{Options as ParserOptions, Parser};
use thiserror::Error as ThisError;
use url::Url;

mod ansi;
mod block;
mod color;
mod highlight;
mod indent;
mod padding;
mod render;
mod sanitize;
mod style;
pub mod theme;
mod wrap;

pub use crate::color::ColorProfile;
pub use crate::highlight::{Highlight, HighlightError, SyntectHighlighter};
pub use crate::sanitize::{Sanitize, TagStripper};
pub use crate::style::{
    StyleBlock, StyleCodeBlock, StyleConfig, StyleList, StylePrimitive, StyleTable, StyleTask,
    TokenStyles,
};

/// A rendering error.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The style configuration is not valid JSON.
    #[error("failed to parse style configuration: {0}")]
    StyleConfig(#[from] serde_json::Error),
    /// Syntax highlighting of a code block failed.
    #[error("syntax highlighting failed: {0}")]
    Highlight(#[from] HighlightError),
    /// A format template in the style sheet failed to expand.
    #[error("unknown placeholder {placeholder:?} in format string {format:?}")]
    Template {
        /// The placeholder which failed to expand.
        placeholder: String,
        /// The format string containing it.
        format: String,
    },
    /// The underlying writer failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Rendering options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Target printable columns for word wrapping; 0 disables reflow.
    pub word_wrap: usize,
    /// Base URL to resolve relative links against; `None` leaves them as-is.
    pub base_url: Option<Url>,
    /// The style sheet to render with.
    pub styles: StyleConfig,
    /// The colour capabilities to emit for.
    pub color_profile: ColorProfile,
}

impl Default for Options {
    /// Default options: wrap at 80 columns, no base URL, the dark style
    /// sheet, and the colour profile detected from the environment.
    fn default() -> Self {
        Self {
            word_wrap: 80,
            base_url: None,
            styles: theme::dark().clone(),
            color_profile: ColorProfile::detect(),
        }
    }
}

/// A reusable Markdown renderer.
pub struct Renderer {
    options: Options,
    highlighter: Box<dyn Highlight>,
    sanitizer: Box<dyn Sanitize>,
}

impl Renderer {
    /// Create a renderer with the default highlighter and sanitiser.
    pub fn new(options: Options) -> Self {
        let profile = options.color_profile;
        Self {
            options,
            highlighter: Box::new(SyntectHighlighter::new(profile)),
            sanitizer: Box::new(TagStripper),
        }
    }

    /// Replace the syntax highlighter.
    pub fn with_highlighter(mut self, highlighter: Box<dyn Highlight>) -> Self {
        self.highlighter = highlighter;
        self
    }

    /// Replace the HTML sanitiser.
    pub fn with_sanitizer(mut self, sanitizer: Box<dyn Sanitize>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// The options this renderer was created with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Render `source` and write the styled text to `writer`.
    ///
    /// Write errors surface immediately; output already written stays
    /// written.
    pub fn convert<W: Write>(&self, source: &str, writer: &mut W) -> Result<(), Error> {
        let parser = Parser::new_ext(source, parser_options());
        render::push_styled(
            &self.options,
            self.highlighter.as_ref(),
            self.sanitizer.as_ref(),
            parser,
            writer,
        )
    }
}

fn parser_options() -> ParserOptions {
    ParserOptions::ENABLE_TABLES
        | ParserOptions::ENABLE_STRIKETHROUGH
        | ParserOptions::ENABLE_TASKLISTS
        | ParserOptions::ENABLE_DEFINITION_LIST
}

/// Render a Markdown document to a string of styled text.
pub fn render(source: &str, options: &Options) -> Result<String, Error> {
    let renderer = Renderer::new(options.clone());
    let mut sink = Vec::new();
    renderer.convert(source, &mut sink)?;
    Ok(String::from_utf8_lossy(&sink).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn plain_options() -> Options {
        Options {
            word_wrap: 80,
            base_url: None,
            styles: theme::plain().clone(),
            color_profile: ColorProfile::Ansi256,
        }
    }

    /// Render with the plain style and strip trailing padding per line.
    fn render_lines(input: &str) -> Vec<String> {
        let rendered = render(input, &plain_options()).unwrap();
        rendered
            .lines()
            .map(|line| line.trim_end().to_string())
            .collect()
    }

    #[test]
    fn inline_markup_without_colour() {
        assert_eq!(
            render_lines("_lorem_ **ipsum** dolor **sit** _amet_"),
            vec!["  lorem ipsum dolor sit amet"],
        );
    }

    #[test]
    fn heading_then_paragraph() {
        assert_eq!(
            render_lines("# Hello\n\nWorld."),
            vec!["  # Hello", "", "  World."],
        );
    }

    #[test]
    fn paragraphs_are_separated_by_a_blank_line() {
        assert_eq!(render_lines("one\n\ntwo"), vec!["  one", "", "  two"]);
    }

    #[test]
    fn block_quote_gets_its_bar() {
        assert_eq!(render_lines("> Hello World"), vec!["  │ Hello World"]);
    }

    #[test]
    fn ordered_list_with_nesting() {
        assert_eq!(
            render_lines("1. a\n2. b\n   1. c"),
            vec!["  1. a", "  2. b", "    1. c"],
        );
    }

    #[test]
    fn unordered_list_uses_bullets() {
        assert_eq!(render_lines("- a\n- b"), vec!["  • a", "  • b"]);
    }

    #[test]
    fn task_list_markers() {
        assert_eq!(
            render_lines("- [ ] todo\n- [x] done"),
            vec!["  [ ] todo", "  [x] done"],
        );
    }

    #[test]
    fn code_block_is_indented_and_not_reflowed() {
        assert_eq!(
            render_lines("```\nlet it = be;\n```"),
            vec!["    let it = be;"],
        );
    }

    #[test]
    fn link_with_distinct_text() {
        assert_eq!(
            render_lines("[site](https://example.com/a)"),
            vec!["  site https://example.com/a"],
        );
    }

    #[test]
    fn autolink_renders_once() {
        assert_eq!(
            render_lines("Hello <http://example.com>"),
            vec!["  Hello http://example.com"],
        );
    }

    #[test]
    fn email_autolink_gets_mailto() {
        let lines = render_lines("Write <hello@example.com>");
        assert_eq!(lines, vec!["  Write mailto:hello@example.com"]);
    }

    #[test]
    fn relative_links_resolve_against_the_base_url() {
        let options = Options {
            base_url: Some(Url::parse("https://x.test/doc/").unwrap()),
            ..plain_options()
        };
        let rendered = render("[r](sub/p)", &options).unwrap();
        assert!(
            rendered.contains("https://x.test/doc/sub/p"),
            "unresolved link in {rendered:?}"
        );
    }

    #[test]
    fn malformed_relative_links_stay_as_is() {
        let rendered = render("[r](sub/p)", &plain_options()).unwrap();
        assert!(rendered.contains("r sub/p"), "mangled link in {rendered:?}");
    }

    #[test]
    fn hard_breaks_survive_in_list_items() {
        assert_eq!(
            render_lines("- first\\\n  second"),
            vec!["  • first", "  second"],
        );
    }

    #[test]
    fn thematic_break() {
        assert_eq!(render_lines("a\n\n---\n\nb"), vec!["  a", "", "  --------", "", "  b"]);
    }

    #[test]
    fn html_blocks_are_stripped_to_text() {
        assert_eq!(render_lines("<div>kept</div>"), vec!["  kept"]);
    }

    #[test]
    fn inline_html_is_stripped() {
        assert_eq!(render_lines("a <b>bold</b> word"), vec!["  a bold word"]);
    }

    #[test]
    fn tables_line_up() {
        let lines = render_lines("| a | b |\n|---|---|\n| 1 | 2 |");
        assert_eq!(lines, vec!["   a │ b", "  ───┼───", "   1 │ 2"]);
    }

    #[test]
    fn definition_lists_render_terms_and_descriptions() {
        assert_eq!(
            render_lines("term\n: description"),
            vec!["  term", "", "  : description"],
        );
    }

    #[test]
    fn word_wrap_zero_disables_reflow() {
        let options = Options {
            word_wrap: 0,
            ..plain_options()
        };
        let long = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod \
                    tempor incididunt ut labore";
        let rendered = render(long, &options).unwrap();
        assert!(rendered.lines().any(|line| line.trim_end().len() > 80));
    }

    #[test]
    fn footnote_syntax_does_not_choke_the_renderer() {
        let lines = render_lines("A footnote [^1]\n\n[^1: We do not support footnotes.");
        assert_eq!(
            lines,
            vec!["  A footnote [^1]", "", "  [^1: We do not support footnotes."],
        );
    }
}
