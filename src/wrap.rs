// Copyright Sebastian Wiesner <sebastian@swsnr.de>

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Word wrapping for styled text.
//!
//! Break text into lines of at most a target printable width, preferring
//! word boundaries.  Escape sequences count zero columns and travel with
//! the word they are attached to.  When a break falls inside a styled run
//! the run is closed before the newline and reopened after it, so wrapping
//! never strands an open style across a physical line.

use unicode_width::UnicodeWidthChar;

#[derive(Default)]
struct Wrapper {
    out: String,
    limit: usize,
    keep_newlines: bool,
    line_width: usize,
    /// Pending inter-word whitespace, dropped when a break lands here.
    pending: String,
    pending_width: usize,
    word: String,
    word_width: usize,
    /// SGR state in effect where the current word started.
    word_start_seq: String,
    /// Last complete non-reset SGR sequence.
    current_seq: String,
    escape: Option<String>,
}

impl Wrapper {
    fn new(limit: usize, keep_newlines: bool) -> Self {
        Self {
            limit,
            keep_newlines,
            ..Self::default()
        }
    }

    fn flush_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        let fits = self.line_width + self.pending_width + self.word_width <= self.limit;
        if 0 < self.word_width && 0 < self.line_width && !fits {
            // Break before this word, swallowing the whitespace the break
            // replaces.  Close the open run and reopen it on the new line.
            if !self.word_start_seq.is_empty() {
                self.out.push_str("\x1b[0m");
            }
            self.out.push('\n');
            self.out.push_str(&self.word_start_seq);
            self.line_width = 0;
        } else {
            self.pending_into_out();
        }
        self.pending.clear();
        self.pending_width = 0;
        self.out.push_str(&self.word);
        self.line_width += self.word_width;
        self.word.clear();
        self.word_width = 0;
        self.word_start_seq = self.current_seq.clone();
    }

    fn pending_into_out(&mut self) {
        self.out.push_str(&self.pending);
        self.line_width += self.pending_width;
        self.pending.clear();
        self.pending_width = 0;
    }

    fn hard_break(&mut self) {
        self.flush_word();
        // Trailing whitespace before a hard newline is dropped.
        self.pending.clear();
        self.pending_width = 0;
        if !self.current_seq.is_empty() {
            self.out.push_str("\x1b[0m");
        }
        self.out.push('\n');
        self.out.push_str(&self.current_seq);
        self.line_width = 0;
        self.word_start_seq = self.current_seq.clone();
    }

    fn escape_char(&mut self, c: char) {
        let buf = self.escape.as_mut().expect("escape in progress");
        let terminated = match buf.len() {
            1 => {
                buf.push(c);
                c != '['
            }
            _ => {
                buf.push(c);
                c.is_ascii_alphabetic()
            }
        };
        if terminated {
            let sequence = self.escape.take().expect("escape in progress");
            if let Some(params) = sequence
                .strip_prefix("\x1b[")
                .and_then(|rest| rest.strip_suffix('m'))
            {
                if params.is_empty() || params == "0" {
                    self.current_seq.clear();
                } else {
                    self.current_seq = sequence.clone();
                }
            }
            // The sequence travels with the word it precedes or sits in.
            self.word.push_str(&sequence);
        }
    }

    fn push(&mut self, c: char) {
        if self.escape.is_some() {
            self.escape_char(c);
        } else if c == '\x1b' {
            self.escape = Some(String::from(c));
        } else if c == '\n' {
            if self.keep_newlines {
                self.hard_break();
            } else {
                self.flush_word();
                self.pending.push(' ');
                self.pending_width += 1;
            }
        } else if c == ' ' || c == '\t' {
            self.flush_word();
            self.pending.push(c);
            self.pending_width += 1;
        } else {
            self.word.push(c);
            self.word_width += c.width().unwrap_or(0);
        }
    }

    fn finish(mut self) -> String {
        self.flush_word();
        // Unterminated escape data and trailing whitespace are dropped.
        self.out
    }
}

/// Wrap `text` to at most `limit` printable columns.
///
/// With `keep_newlines` newlines in the input are preserved as hard breaks;
/// otherwise they collapse into inter-word whitespace and the text reflows
/// freely.
pub(crate) fn wrap(text: &str, limit: usize, keep_newlines: bool) -> String {
    let mut wrapper = Wrapper::new(limit, keep_newlines);
    for c in text.chars() {
        wrapper.push(c);
    }
    wrapper.finish()
}
