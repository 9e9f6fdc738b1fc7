// Copyright Sebastian Wiesner <sebastian@swsnr.de>

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Right-padding of lines to a fixed printable width.

use std::io::{Result, Write};

use unicode_width::UnicodeWidthChar;

use crate::ansi::{AnsiWriter, ByteClass, SgrTracker};

/// A writer which pads every line up to a printable width.
///
/// The printable width counts terminal columns of Unicode characters — wide
/// CJK characters count two, escape sequences count zero.  When a line ends
/// short of the padding width the pad function is invoked once per missing
/// column; afterwards any open styled run is reset before the newline goes
/// out.  Padding in the block's own style is what turns a styled background
/// into a uniform rectangle.
pub(crate) struct PaddingWriter<W, F> {
    ansi: AnsiWriter<W>,
    padding: usize,
    pad_fn: F,
    width: usize,
    tracker: SgrTracker,
    carry: [u8; 4],
    carry_len: usize,
}

impl<W: Write, F: FnMut(&mut AnsiWriter<W>) -> Result<()>> PaddingWriter<W, F> {
    pub(crate) fn new(ansi: AnsiWriter<W>, padding: usize, pad_fn: F) -> Self {
        Self {
            ansi,
            padding,
            pad_fn,
            width: 0,
            tracker: SgrTracker::new(),
            carry: [0; 4],
            carry_len: 0,
        }
    }

    fn finish_line(&mut self) -> Result<()> {
        while self.width < self.padding {
            (self.pad_fn)(&mut self.ansi)?;
            self.width += 1;
        }
        self.ansi.reset()?;
        self.ansi.write_all(b"\n")?;
        self.width = 0;
        Ok(())
    }

    fn count(&mut self, byte: u8) {
        self.carry[self.carry_len] = byte;
        self.carry_len += 1;
        match std::str::from_utf8(&self.carry[..self.carry_len]) {
            Ok(s) => {
                self.width += s.chars().next().and_then(|c| c.width()).unwrap_or(0);
                self.carry_len = 0;
            }
            Err(error) => {
                if error.error_len().is_some() || self.carry_len == 4 {
                    // Invalid input; count nothing and resynchronize.
                    self.carry_len = 0;
                }
            }
        }
    }
}

impl<W: Write, F: FnMut(&mut AnsiWriter<W>) -> Result<()>> Write for PaddingWriter<W, F> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        for byte in buf {
            if *byte == b'\n' {
                self.finish_line()?;
                continue;
            }
            if self.tracker.observe(*byte) == ByteClass::Text {
                self.count(*byte);
            }
            self.ansi.write_all(std::slice::from_ref(byte))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.ansi.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn padded(padding: usize, input: &str) -> String {
        let mut sink = Vec::new();
        let ansi = AnsiWriter::new(&mut sink);
        let mut writer = PaddingWriter::new(ansi, padding, |w: &mut AnsiWriter<&mut Vec<u8>>| {
            w.write_all(b".")
        });
        writer.write_all(input.as_bytes()).unwrap();
        drop(writer);
        String::from_utf8(sink).unwrap()
    }

    #[test]
    fn pads_short_lines() {
        assert_eq!(padded(6, "ab\n"), "ab....\n");
    }

    #[test]
    fn leaves_full_lines_alone() {
        assert_eq!(padded(2, "abc\n"), "abc\n");
    }

    #[test]
    fn escapes_are_zero_width() {
        assert_eq!(padded(4, "\x1b[1mab\x1b[0m\n"), "\x1b[1mab\x1b[0m..\n");
    }

    #[test]
    fn wide_characters_count_double() {
        assert_eq!(padded(4, "日\n"), "日..\n");
    }

    #[test]
    fn resets_open_style_before_newline() {
        // The run is still open at the line break; padding closes it after
        // the pad glyphs so no style bleeds across the newline.
        assert_eq!(padded(2, "\x1b[7ma\n"), "\x1b[7ma.\x1b[0m\n");
    }

    #[test]
    fn pads_blank_lines() {
        assert_eq!(padded(3, "a\n\n"), "a..\n...\n");
    }
}
