// Copyright Sebastian Wiesner <sebastian@swsnr.de>

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Built-in style sheets.

use once_cell::sync::Lazy;

use crate::style::StyleConfig;

static DARK: Lazy<StyleConfig> = Lazy::new(|| {
    StyleConfig::from_json(include_str!("themes/dark.json"))
        .expect("embedded dark style sheet is valid")
});

static PLAIN: Lazy<StyleConfig> = Lazy::new(|| {
    StyleConfig::from_json(include_str!("themes/plain.json"))
        .expect("embedded plain style sheet is valid")
});

/// The default style sheet, tuned for dark terminal backgrounds.
pub fn dark() -> &'static StyleConfig {
    &DARK
}

/// A colour-free style sheet which keeps only the layout.
///
/// Useful for dumb terminals and for tests which assert on layout without
/// wading through escape sequences.
pub fn plain() -> &'static StyleConfig {
    &PLAIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_style_parses() {
        let config = dark();
        assert_eq!(config.document.margin(), 2);
        assert_eq!(config.block_quote.indent_token.as_deref(), Some("│ "));
        assert_eq!(config.list.level_indent, Some(2));
        assert_eq!(config.task.ticked.as_deref(), Some("[✓] "));
        assert!(config.code_block.wants_highlighting());
    }

    #[test]
    fn plain_style_has_no_colors() {
        let config = plain();
        assert_eq!(config.document.primitive.color, None);
        assert_eq!(config.h1.primitive.color, None);
        assert!(!config.code_block.wants_highlighting());
    }
}
