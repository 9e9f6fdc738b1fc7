// Copyright Sebastian Wiesner <sebastian@swsnr.de>

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Per-line indentation.

use std::io::{Result, Write};

/// A writer which indents every line written through it.
///
/// At the start of each physical line the indent function is invoked once
/// per indentation column, before any content byte of that line — including
/// escape bytes, so a style restored after a line break never colours the
/// indentation.
pub(crate) struct IndentWriter<W, F> {
    inner: W,
    indent: usize,
    indent_fn: F,
    line_start: bool,
}

impl<W: Write, F: FnMut(&mut W) -> Result<()>> IndentWriter<W, F> {
    pub(crate) fn new(inner: W, indent: usize, indent_fn: F) -> Self {
        Self {
            inner,
            indent,
            indent_fn,
            line_start: true,
        }
    }

}

impl<W: Write, F: FnMut(&mut W) -> Result<()>> Write for IndentWriter<W, F> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        for byte in buf {
            if self.line_start {
                for _ in 0..self.indent {
                    (self.indent_fn)(&mut self.inner)?;
                }
                self.line_start = false;
            }
            self.inner.write_all(std::slice::from_ref(byte))?;
            if *byte == b'\n' {
                self.line_start = true;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}
