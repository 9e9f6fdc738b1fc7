// Copyright Sebastian Wiesner <sebastian@swsnr.de>

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Syntax highlighting of code blocks.
//!
//! The engine delegates highlighting through the [`Highlight`] trait; the
//! default implementation drives [`syntect`].  A code block style either
//! names a syntect theme or carries its own per-token styles, from which a
//! theme is synthesised on the fly.

use std::io::Write;

use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{
    Color as ThemeColor, FontStyle, ScopeSelectors, StyleModifier, Theme, ThemeItem, ThemeSet,
    ThemeSettings,
};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use thiserror::Error;

use crate::color::{parse_hex, sgr_color, ColorProfile};
use crate::style::{StylePrimitive, TokenStyles};

/// A highlighting failure.
#[derive(Debug, Error)]
pub enum HighlightError {
    /// The style sheet names a theme the highlighter does not know.
    #[error("unknown highlighting theme {name:?}")]
    UnknownTheme {
        /// The requested theme name.
        name: String,
    },
    /// The underlying highlighter failed.
    #[error(transparent)]
    Syntax(#[from] syntect::Error),
    /// Writing the highlighted code failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Colourise source code.
pub trait Highlight {
    /// Write `code` to `writer` as ANSI-coloured text.
    ///
    /// `language` is the fence tag of the code block, possibly empty.
    /// `theme` names the colour theme; implementations may instead build a
    /// theme from `tokens`, the per-token-class styles of the code block
    /// style, when no theme of that name exists.
    fn highlight(
        &self,
        writer: &mut dyn Write,
        code: &str,
        language: &str,
        theme: &str,
        tokens: Option<&TokenStyles>,
    ) -> Result<(), HighlightError>;
}

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// The default highlighter, backed by syntect's bundled syntaxes.
#[derive(Debug)]
pub struct SyntectHighlighter {
    profile: ColorProfile,
}

impl SyntectHighlighter {
    /// Create a highlighter emitting colours for the given profile.
    pub fn new(profile: ColorProfile) -> Self {
        Self { profile }
    }
}

impl Highlight for SyntectHighlighter {
    fn highlight(
        &self,
        writer: &mut dyn Write,
        code: &str,
        language: &str,
        theme: &str,
        tokens: Option<&TokenStyles>,
    ) -> Result<(), HighlightError> {
        let synthesised;
        let theme = match THEME_SET.themes.get(theme) {
            Some(theme) => theme,
            None => match tokens {
                Some(tokens) => {
                    synthesised = theme_from_tokens(tokens);
                    &synthesised
                }
                None => {
                    return Err(HighlightError::UnknownTheme {
                        name: theme.to_string(),
                    })
                }
            },
        };

        let syntax = SYNTAX_SET
            .find_syntax_by_token(language)
            .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
        let default_foreground = theme.settings.foreground;

        let mut highlighter = HighlightLines::new(syntax, theme);
        for line in LinesWithEndings::from(code) {
            for (style, text) in highlighter.highlight_line(line, &SYNTAX_SET)? {
                let styled = text.strip_suffix('\n').unwrap_or(text);
                if !styled.is_empty() {
                    let params = region_params(&style, default_foreground, self.profile);
                    if params.is_empty() {
                        write!(writer, "{styled}")?;
                    } else {
                        write!(writer, "\x1b[{params}m{styled}\x1b[0m")?;
                    }
                }
                if text.ends_with('\n') {
                    writer.write_all(b"\n")?;
                }
            }
        }
        Ok(())
    }
}

/// The SGR parameters for a highlighted region.
///
/// Region backgrounds are ignored on purpose, to avoid fighting the
/// terminal's colour theme; a region in the theme's default foreground is
/// left unstyled.
fn region_params(
    style: &syntect::highlighting::Style,
    default_foreground: Option<ThemeColor>,
    profile: ColorProfile,
) -> String {
    let mut params: Vec<String> = Vec::new();
    if style.font_style.contains(FontStyle::BOLD) {
        params.push("1".into());
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        params.push("3".into());
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        params.push("4".into());
    }
    let foreground = style.foreground;
    let is_default = default_foreground.is_some_and(|default| {
        default.r == foreground.r && default.g == foreground.g && default.b == foreground.b
    });
    if !is_default {
        let hex = format!("#{:02x}{:02x}{:02x}", foreground.r, foreground.g, foreground.b);
        if let Some(fragment) = sgr_color(&hex, false, profile) {
            params.push(fragment);
        }
    }
    params.join(";")
}

fn theme_color(primitive: &StylePrimitive) -> Option<ThemeColor> {
    primitive
        .color
        .as_deref()
        .and_then(parse_hex)
        .map(|(r, g, b)| ThemeColor { r, g, b, a: 0xff })
}

fn font_style(primitive: &StylePrimitive) -> Option<FontStyle> {
    let mut style = FontStyle::empty();
    if primitive.bold.unwrap_or(false) {
        style |= FontStyle::BOLD;
    }
    if primitive.italic.unwrap_or(false) {
        style |= FontStyle::ITALIC;
    }
    if primitive.underline.unwrap_or(false) {
        style |= FontStyle::UNDERLINE;
    }
    (!style.is_empty()).then_some(style)
}

/// Scope selectors for each token class of [`TokenStyles`].
fn token_scopes(tokens: &TokenStyles) -> Vec<(&'static str, &Option<StylePrimitive>)> {
    vec![
        ("comment", &tokens.comment),
        ("comment.preprocessor, meta.preprocessor", &tokens.comment_preproc),
        ("keyword, storage.modifier", &tokens.keyword),
        ("keyword.control", &tokens.keyword_reserved),
        ("keyword.control.import, keyword.other.import", &tokens.keyword_namespace),
        ("storage.type, support.type", &tokens.keyword_type),
        ("keyword.operator", &tokens.operator),
        ("punctuation", &tokens.punctuation),
        ("variable", &tokens.name),
        ("support.function.builtin, variable.language", &tokens.name_builtin),
        ("entity.name.tag", &tokens.name_tag),
        ("entity.other.attribute-name", &tokens.name_attribute),
        ("entity.name.class, entity.name.type", &tokens.name_class),
        ("constant.other, variable.other.constant", &tokens.name_constant),
        ("entity.name.function.decorator, meta.annotation", &tokens.name_decorator),
        ("entity.name.function, support.function", &tokens.name_function),
        ("constant", &tokens.literal),
        ("constant.numeric", &tokens.literal_number),
        ("string", &tokens.literal_string),
        ("constant.character.escape", &tokens.literal_string_escape),
        ("markup.deleted", &tokens.generic_deleted),
        ("markup.italic", &tokens.generic_emph),
        ("markup.inserted", &tokens.generic_inserted),
        ("markup.bold", &tokens.generic_strong),
        ("markup.heading", &tokens.generic_subheading),
        ("invalid", &tokens.error),
    ]
}

/// Build a syntect theme from per-token-class styles.
fn theme_from_tokens(tokens: &TokenStyles) -> Theme {
    let mut scopes = Vec::new();
    for (selector, primitive) in token_scopes(tokens) {
        let Some(primitive) = primitive else { continue };
        let foreground = theme_color(primitive);
        let font = font_style(primitive);
        if foreground.is_none() && font.is_none() {
            continue;
        }
        let scope: ScopeSelectors = selector
            .parse()
            .expect("static scope selector must parse");
        scopes.push(ThemeItem {
            scope,
            style: StyleModifier {
                foreground,
                background: None,
                font_style: font,
            },
        });
    }
    let settings = ThemeSettings {
        foreground: tokens.text.as_ref().and_then(theme_color),
        ..ThemeSettings::default()
    };
    Theme {
        settings,
        scopes,
        ..Theme::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn dark_tokens() -> TokenStyles {
        crate::theme::dark()
            .code_block
            .chroma
            .clone()
            .expect("dark style has token styles")
    }

    fn highlight_string(code: &str, language: &str, theme: &str) -> String {
        let highlighter = SyntectHighlighter::new(ColorProfile::Ansi256);
        let mut sink = Vec::new();
        let tokens = dark_tokens();
        highlighter
            .highlight(&mut sink, code, language, theme, Some(&tokens))
            .unwrap();
        String::from_utf8(sink).unwrap()
    }

    #[test]
    fn highlights_with_synthesised_theme() {
        let output = highlight_string("fn main() {}\n", "rust", "");
        assert!(output.contains("\x1b["), "no colour in {output:?}");
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn every_styled_run_closes_before_newline() {
        let output = highlight_string("let x = \"hi\";\nlet y = 2;\n", "rust", "");
        for line in output.lines() {
            if let Some(last) = line.rfind('\x1b') {
                assert!(
                    line[last..].starts_with("\x1b[0m"),
                    "open style at end of {line:?}"
                );
            }
        }
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        let output = highlight_string("whatever\n", "no-such-language", "");
        assert!(output.contains("whatever"));
    }

    #[test]
    fn unknown_theme_without_tokens_is_an_error() {
        let highlighter = SyntectHighlighter::new(ColorProfile::Ansi256);
        let mut sink = Vec::new();
        let result = highlighter.highlight(&mut sink, "code", "rust", "no-such-theme", None);
        assert!(matches!(
            result,
            Err(HighlightError::UnknownTheme { name }) if name == "no-such-theme"
        ));
    }

    #[test]
    fn named_themes_resolve() {
        let highlighter = SyntectHighlighter::new(ColorProfile::Ansi256);
        let mut sink = Vec::new();
        highlighter
            .highlight(&mut sink, "x = 1\n", "python", "base16-ocean.dark", None)
            .unwrap();
        let output = String::from_utf8(sink).unwrap();
        assert_eq!(output.matches('\n').count(), 1);
    }
}
