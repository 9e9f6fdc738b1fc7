// Copyright Sebastian Wiesner <sebastian@swsnr.de>

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! HTML sanitisation.
//!
//! Terminals render text, not markup: embedded HTML is reduced to its
//! textual content before it reaches the writer pipeline.

/// Strip markup from text destined for the terminal.
pub trait Sanitize {
    /// Remove HTML markup from `input` and unescape entities.
    ///
    /// With `trim`, surrounding whitespace is removed as well.
    fn sanitize(&self, input: &str, trim: bool) -> String;
}

/// The default sanitiser: drops tags and comments, unescapes entities.
///
/// A `<` only opens a tag when followed by a letter, `/`, `!` or `?`, so
/// prose like `a < b` survives untouched.  An unterminated tag at the end of
/// input is emitted literally.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagStripper;

impl Sanitize for TagStripper {
    fn sanitize(&self, input: &str, trim: bool) -> String {
        let stripped = strip_tags(input);
        let unescaped = unescape_entities(&stripped);
        if trim {
            unescaped.trim().to_string()
        } else {
            unescaped
        }
    }
}

fn opens_tag(next: Option<char>) -> bool {
    matches!(next, Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?')
}

fn strip_tags(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c != '<' || !opens_tag(chars.peek().map(|(_, c)| *c)) {
            output.push(c);
            continue;
        }
        // Scan to the closing angle bracket; if there is none the input
        // wasn't markup after all.
        let mut closed = false;
        for (_, c) in chars.by_ref() {
            if c == '>' {
                closed = true;
                break;
            }
        }
        if !closed {
            output.push_str(&input[start..]);
            break;
        }
    }
    output
}

fn named_entity(name: &str) -> Option<&'static str> {
    match name {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "nbsp" => Some("\u{a0}"),
        "hellip" => Some("…"),
        "mdash" => Some("—"),
        "ndash" => Some("–"),
        "copy" => Some("©"),
        _ => None,
    }
}

fn numeric_entity(body: &str) -> Option<char> {
    let code = if let Some(hex) = body.strip_prefix('x').or_else(|| body.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        body.parse::<u32>().ok()?
    };
    char::from_u32(code)
}

fn unescape_entities(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        output.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let entity = tail
            .char_indices()
            .take_while(|(i, c)| *i < 32 && *c != '&' && !c.is_whitespace())
            .find(|(_, c)| *c == ';')
            .map(|(i, _)| &tail[..i]);
        match entity {
            Some(name) => {
                let replacement = name
                    .strip_prefix('#')
                    .and_then(numeric_entity)
                    .map(String::from)
                    .or_else(|| named_entity(name).map(String::from));
                match replacement {
                    Some(text) => {
                        output.push_str(&text);
                        rest = &tail[name.len() + 1..];
                    }
                    None => {
                        output.push('&');
                        rest = tail;
                    }
                }
            }
            None => {
                output.push('&');
                rest = tail;
            }
        }
    }
    output.push_str(rest);
    output
}
