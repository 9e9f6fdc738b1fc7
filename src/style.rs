// Copyright Sebastian Wiesner <sebastian@swsnr.de>

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The style model.
//!
//! A style sheet maps every markdown element to a style shape; see
//! [`StyleConfig`].  All fields are optional: an absent field inherits from
//! the enclosing block or has no effect.  Style sheets deserialize from JSON
//! with `serde`; [`StyleConfig::from_json`] is the entry point.

use serde::{Deserialize, Serialize};

use crate::color::{sgr_color, ColorProfile};
use crate::Error;

/// Inline style attributes of a single element.
///
/// `prefix` and `suffix` are written around the element's text in the
/// element's own style; `block_prefix` and `block_suffix` are written in the
/// style of the enclosing block.  `format` is a template applied to the
/// element's token text, with `{text}` standing for the token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePrimitive {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    /// Foreground colour, as `#rrggbb` or a decimal palette index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Background colour, as `#rrggbb` or a decimal palette index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conceal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blink: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

macro_rules! inherit {
    ($child:expr, $parent:expr, $($field:ident),+) => {
        $(
            if $child.$field.is_none() {
                $child.$field = $parent.$field.clone();
            }
        )+
    };
}

impl StylePrimitive {
    /// Put this style on top of `parent`, with full inheritance.
    ///
    /// Every attribute not set here falls back to the parent's value.
    pub(crate) fn on_top_of(&self, parent: &StylePrimitive) -> StylePrimitive {
        let mut cascaded = self.clone();
        inherit!(
            cascaded,
            parent,
            block_prefix,
            block_suffix,
            prefix,
            suffix,
            color,
            background_color,
            bold,
            italic,
            underline,
            strikethrough,
            faint,
            conceal,
            overline,
            inverse,
            blink,
            format
        );
        cascaded
    }

    /// The cascade used when a block frame is pushed onto the stack.
    ///
    /// Colours and attribute flags inherit from the enclosing block;
    /// decoration strings do not, since a block writes its own prefixes and
    /// suffixes exactly once.
    pub(crate) fn inherit_for_block(&self, parent: &StylePrimitive) -> StylePrimitive {
        let mut cascaded = self.clone();
        inherit!(
            cascaded,
            parent,
            color,
            background_color,
            bold,
            italic,
            underline,
            strikethrough,
            faint,
            conceal,
            overline,
            inverse,
            blink
        );
        cascaded
    }

    /// Put this style on top of `parent`, inheriting colours only.
    ///
    /// Foreground and background colours fall back to the parent so that a
    /// block's colours propagate into the leaves it contains; every other
    /// attribute is taken from this style alone, so bold or italic never
    /// leak from a block into its children.
    pub(crate) fn colors_on_top_of(&self, parent: &StylePrimitive) -> StylePrimitive {
        let mut cascaded = self.clone();
        inherit!(cascaded, parent, color, background_color);
        cascaded
    }

    /// The SGR parameter sequence for this style, without CSI framing.
    ///
    /// Empty when the style sets no attribute.  Malformed colours are
    /// dropped, as if unset.
    pub(crate) fn sequence(&self, profile: ColorProfile) -> String {
        let mut params: Vec<String> = Vec::new();
        let mut flag = |set: &Option<bool>, code: &str| {
            if set.unwrap_or(false) {
                params.push(code.to_string());
            }
        };
        flag(&self.bold, "1");
        flag(&self.faint, "2");
        flag(&self.italic, "3");
        flag(&self.underline, "4");
        flag(&self.blink, "5");
        flag(&self.inverse, "7");
        flag(&self.conceal, "8");
        flag(&self.strikethrough, "9");
        flag(&self.overline, "53");
        if let Some(fragment) = self
            .color
            .as_deref()
            .and_then(|c| sgr_color(c, false, profile))
        {
            params.push(fragment);
        }
        if let Some(fragment) = self
            .background_color
            .as_deref()
            .and_then(|c| sgr_color(c, true, profile))
        {
            params.push(fragment);
        }
        params.join(";")
    }
}

/// Expand a format template against a token text.
///
/// `{text}` stands for the token; any other placeholder is an error, as is
/// an unterminated placeholder.
pub(crate) fn expand_format(format: &str, text: &str) -> Result<String, Error> {
    let mut expanded = String::with_capacity(format.len() + text.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '{' {
            expanded.push(c);
            continue;
        }
        let mut placeholder = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) if c.is_ascii_alphanumeric() || c == '_' => placeholder.push(c),
                _ => {
                    return Err(Error::Template {
                        placeholder,
                        format: format.to_string(),
                    })
                }
            }
        }
        match placeholder.as_str() {
            "text" => expanded.push_str(text),
            _ => {
                return Err(Error::Template {
                    placeholder,
                    format: format.to_string(),
                })
            }
        }
    }
    Ok(expanded)
}

/// A block-level style: inline attributes plus layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleBlock {
    #[serde(flatten)]
    pub primitive: StylePrimitive,
    /// Columns of indentation applied to every line of the block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,
    /// Margin columns added on both sides of the block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<usize>,
    /// The glyph used to fill the indentation, one copy per column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_token: Option<String>,
}

impl StyleBlock {
    pub(crate) fn indent(&self) -> usize {
        self.indent.unwrap_or(0)
    }

    pub(crate) fn margin(&self) -> usize {
        self.margin.unwrap_or(0)
    }
}

/// Style of lists; `level_indent` applies to nested lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleList {
    #[serde(flatten)]
    pub block: StyleBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_indent: Option<usize>,
}

/// Style of task list markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTask {
    #[serde(flatten)]
    pub primitive: StylePrimitive,
    /// Glyph for a checked task, e.g. `[✓] `.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticked: Option<String>,
    /// Glyph for an unchecked task, e.g. `[ ] `.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unticked: Option<String>,
}

/// Style of tables; separators are the glyphs between columns and rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTable {
    #[serde(flatten)]
    pub block: StyleBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_separator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_separator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_separator: Option<String>,
}

/// Styles for individual token classes of highlighted code.
///
/// The classes follow the conventional highlighter taxonomy, so existing
/// style sheets can be reused as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenStyles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_preproc: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_reserved: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_namespace: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_type: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub punctuation: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_builtin: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_tag: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_attribute: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_class: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_constant: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_decorator: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_function: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal_number: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal_string: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal_string_escape: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_deleted: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_emph: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_inserted: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_strong: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_subheading: Option<StylePrimitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<StylePrimitive>,
}

/// Style of code blocks.
///
/// `theme` names a highlighter theme; when neither a theme nor token styles
/// are configured the block is emitted in the primitive style, without
/// highlighting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleCodeBlock {
    #[serde(flatten)]
    pub block: StyleBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Per-token-class styles used when no named theme is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chroma: Option<TokenStyles>,
}

impl StyleCodeBlock {
    /// Whether this style asks for syntax highlighting at all.
    pub(crate) fn wants_highlighting(&self) -> bool {
        self.theme.as_deref().is_some_and(|theme| !theme.is_empty())
            || self.chroma.is_some()
    }
}

/// A complete style sheet, mapping element kinds to styles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub document: StyleBlock,
    pub block_quote: StyleBlock,
    pub paragraph: StyleBlock,
    pub list: StyleList,
    pub heading: StyleBlock,
    pub h1: StyleBlock,
    pub h2: StyleBlock,
    pub h3: StyleBlock,
    pub h4: StyleBlock,
    pub h5: StyleBlock,
    pub h6: StyleBlock,
    pub text: StylePrimitive,
    pub emph: StylePrimitive,
    pub strong: StylePrimitive,
    pub strike_through: StylePrimitive,
    pub hr: StylePrimitive,
    pub item: StylePrimitive,
    pub enumeration: StylePrimitive,
    pub task: StyleTask,
    pub link: StylePrimitive,
    pub link_text: StylePrimitive,
    pub image: StylePrimitive,
    pub image_text: StylePrimitive,
    pub code: StyleBlock,
    pub code_block: StyleCodeBlock,
    pub table: StyleTable,
    pub definition_list: StyleBlock,
    pub definition_term: StylePrimitive,
    pub definition_description: StylePrimitive,
    pub html_block: StyleBlock,
    pub html_span: StyleBlock,
}

impl StyleConfig {
    /// Parse a style sheet from JSON.
    ///
    /// Field names are snake_case as in the built-in style sheets; unknown
    /// fields are ignored, absent fields inherit at render time.
    pub fn from_json(json: &str) -> Result<StyleConfig, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// The style for a heading of the given level, cascaded over the
    /// generic heading style.
    pub(crate) fn heading_level(&self, level: usize) -> StyleBlock {
        let specific = match level {
            1 => &self.h1,
            2 => &self.h2,
            3 => &self.h3,
            4 => &self.h4,
            5 => &self.h5,
            _ => &self.h6,
        };
        StyleBlock {
            primitive: specific.primitive.on_top_of(&self.heading.primitive),
            indent: specific.indent.or(self.heading.indent),
            margin: specific.margin.or(self.heading.margin),
            indent_token: specific
                .indent_token
                .clone()
                .or_else(|| self.heading.indent_token.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn primitive(json: &str) -> StylePrimitive {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parse_primitive() {
        let style = primitive(
            r##"{"color": "#ff0000", "background_color": "63", "bold": true, "prefix": "> "}"##,
        );
        assert_eq!(style.color.as_deref(), Some("#ff0000"));
        assert_eq!(style.background_color.as_deref(), Some("63"));
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.prefix.as_deref(), Some("> "));
        assert_eq!(style.italic, None);
    }

    #[test]
    fn parse_block_layout() {
        let block: StyleBlock = serde_json::from_str(
            r#"{"indent": 1, "margin": 2, "indent_token": "│ ", "color": "252"}"#,
        )
        .unwrap();
        assert_eq!(block.indent(), 1);
        assert_eq!(block.margin(), 2);
        assert_eq!(block.indent_token.as_deref(), Some("│ "));
        assert_eq!(block.primitive.color.as_deref(), Some("252"));
    }

    #[test]
    fn full_cascade_inherits_everything() {
        let parent = primitive(r#"{"color": "252", "bold": true, "suffix": "!"}"#);
        let child = primitive(r#"{"color": "39"}"#);
        let cascaded = child.on_top_of(&parent);
        assert_eq!(cascaded.color.as_deref(), Some("39"));
        assert_eq!(cascaded.bold, Some(true));
        assert_eq!(cascaded.suffix.as_deref(), Some("!"));
    }

    #[test]
    fn color_cascade_does_not_leak_attributes() {
        let parent = primitive(r#"{"color": "252", "background_color": "236", "bold": true}"#);
        let child = primitive(r#"{"italic": true}"#);
        let cascaded = child.colors_on_top_of(&parent);
        assert_eq!(cascaded.color.as_deref(), Some("252"));
        assert_eq!(cascaded.background_color.as_deref(), Some("236"));
        assert_eq!(cascaded.italic, Some(true));
        // Bold must not leak through the colour-only cascade.
        assert_eq!(cascaded.bold, None);
    }

    #[test]
    fn block_cascade_keeps_decorations_to_the_block() {
        let parent = primitive(r#"{"color": "252", "bold": true, "block_prefix": "\n"}"#);
        let child = primitive(r###"{"prefix": "## "}"###);
        let cascaded = child.inherit_for_block(&parent);
        assert_eq!(cascaded.color.as_deref(), Some("252"));
        assert_eq!(cascaded.bold, Some(true));
        assert_eq!(cascaded.prefix.as_deref(), Some("## "));
        // The parent's block prefix was written by the parent already.
        assert_eq!(cascaded.block_prefix, None);
    }

    #[test]
    fn color_cascade_is_associative() {
        let a = primitive(r#"{"color": "1"}"#);
        let b = primitive(r#"{"background_color": "2"}"#);
        let c = primitive(r#"{"color": "3", "background_color": "4"}"#);
        let left = c.colors_on_top_of(&b.colors_on_top_of(&a));
        let right = c.colors_on_top_of(&b).colors_on_top_of(&a);
        assert_eq!(left.color, right.color);
        assert_eq!(left.background_color, right.background_color);
    }

    #[test]
    fn sequence_assembly() {
        let style = primitive(
            r#"{"color": "228", "background_color": "63", "bold": true, "underline": true}"#,
        );
        assert_eq!(style.sequence(ColorProfile::Ansi256), "1;4;38;5;228;48;5;63");
    }

    #[test]
    fn sequence_skips_malformed_colors() {
        let style = primitive(r#"{"color": "not-a-color", "bold": true}"#);
        assert_eq!(style.sequence(ColorProfile::Ansi256), "1");
    }

    #[test]
    fn sequence_empty_for_empty_style() {
        assert_eq!(StylePrimitive::default().sequence(ColorProfile::Ansi256), "");
    }

    #[test]
    fn format_expansion() {
        assert_eq!(expand_format("{text}. ", "1").unwrap(), "1. ");
        assert_eq!(expand_format("Image: {text} →", "alt").unwrap(), "Image: alt →");
        assert_eq!(expand_format("no placeholder", "x").unwrap(), "no placeholder");
    }

    #[test]
    fn format_expansion_fails_on_unknown_placeholder() {
        assert!(expand_format("{index}. ", "1").is_err());
        assert!(expand_format("{unterminated", "1").is_err());
    }

    #[test]
    fn heading_cascade() {
        let config = crate::theme::dark();
        let h1 = config.heading_level(1);
        assert_eq!(h1.primitive.bold, Some(true));
        assert_eq!(h1.primitive.color.as_deref(), Some("228"));
        assert_eq!(h1.primitive.background_color.as_deref(), Some("63"));
        let h2 = config.heading_level(2);
        // h2 has no colours of its own and inherits the heading colour.
        assert_eq!(h2.primitive.color.as_deref(), Some("39"));
        assert_eq!(h2.primitive.prefix.as_deref(), Some("## "));
    }

    #[test]
    fn config_ignores_unknown_fields() {
        let config = StyleConfig::from_json(r#"{"paragraph": {}, "no_such_element": {}}"#);
        assert!(config.is_ok());
    }
}
