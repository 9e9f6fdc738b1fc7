// Copyright Sebastian Wiesner <sebastian@swsnr.de>

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! SGR state tracking.
//!
//! [`AnsiWriter`] forwards bytes verbatim while remembering the last SGR
//! sequence it saw.  [`AnsiWriter::reset`] and [`AnsiWriter::restore`] let
//! the surrounding writers drop to unstyled output for a newline or a
//! padding glyph and pick the previous style back up afterwards, so styled
//! runs never span a physical line break on the wire.

use std::io::{Result, Write};

const RESET: &[u8] = b"\x1b[0m";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum State {
    #[default]
    Text,
    Escape,
    Csi,
}

/// Classification of a single input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ByteClass {
    /// An ordinary text byte.
    Text,
    /// Part of an ANSI escape sequence, zero columns wide.
    Escape,
}

/// A byte-level scanner for ANSI escape sequences.
///
/// Feed every output byte through [`SgrTracker::observe`]; the tracker
/// classifies it and records the most recent complete SGR sequence.
#[derive(Debug, Default)]
pub(crate) struct SgrTracker {
    state: State,
    sequence: Vec<u8>,
    last_sequence: Vec<u8>,
    dirty: bool,
}

impl SgrTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Observe one byte of output.
    pub(crate) fn observe(&mut self, byte: u8) -> ByteClass {
        match self.state {
            State::Text => {
                if byte == 0x1b {
                    self.state = State::Escape;
                    self.sequence.clear();
                    self.sequence.push(byte);
                    ByteClass::Escape
                } else {
                    ByteClass::Text
                }
            }
            State::Escape => {
                self.sequence.push(byte);
                // Anything but a CSI opener is not an SGR sequence.
                self.state = if byte == b'[' { State::Csi } else { State::Text };
                ByteClass::Escape
            }
            State::Csi => {
                self.sequence.push(byte);
                if byte.is_ascii_alphabetic() {
                    self.state = State::Text;
                    if byte == b'm' {
                        if self.sequence == RESET || self.sequence == b"\x1b[m" {
                            self.last_sequence.clear();
                            self.dirty = false;
                        } else {
                            self.last_sequence = self.sequence.clone();
                            self.dirty = true;
                        }
                    }
                }
                ByteClass::Escape
            }
        }
    }

    /// Whether a styled run is currently open.
    pub(crate) fn dirty(&self) -> bool {
        self.dirty
    }

    /// The most recent non-reset SGR sequence, if any.
    #[allow(dead_code)]
    pub(crate) fn last_sequence(&self) -> &[u8] {
        &self.last_sequence
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

/// A writer which tracks the SGR state of everything written through it.
pub(crate) struct AnsiWriter<W> {
    inner: W,
    tracker: SgrTracker,
}

impl<W: Write> AnsiWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self {
            inner,
            tracker: SgrTracker::new(),
        }
    }

    /// Emit an SGR reset if a styled run is open.
    pub(crate) fn reset(&mut self) -> Result<()> {
        if self.tracker.dirty() {
            self.inner.write_all(RESET)?;
            self.tracker.mark_clean();
        }
        Ok(())
    }

    /// Re-emit the last SGR sequence seen, reopening the previous style.
    #[allow(dead_code)]
    pub(crate) fn restore(&mut self) -> Result<()> {
        if !self.tracker.last_sequence().is_empty() {
            let sequence = self.tracker.last_sequence().to_vec();
            self.inner.write_all(&sequence)?;
            self.tracker.dirty = true;
        }
        Ok(())
    }

}

impl<W: Write> Write for AnsiWriter<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        for byte in buf {
            self.tracker.observe(*byte);
        }
        self.inner.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn tracks_last_sequence() {
        let mut writer = AnsiWriter::new(Vec::new());
        writer.write_all(b"\x1b[1;38;5;228mtext").unwrap();
        assert!(writer.tracker.dirty());
        assert_eq!(writer.tracker.last_sequence(), b"\x1b[1;38;5;228m");
    }

    #[test]
    fn reset_sequence_clears_state() {
        let mut writer = AnsiWriter::new(Vec::new());
        writer.write_all(b"\x1b[1mbold\x1b[0m").unwrap();
        assert!(!writer.tracker.dirty());
        assert_eq!(writer.tracker.last_sequence(), b"");
    }

    #[test]
    fn reset_writes_only_when_dirty() {
        let mut writer = AnsiWriter::new(Vec::new());
        writer.write_all(b"plain").unwrap();
        writer.reset().unwrap();
        assert_eq!(writer.inner, b"plain");

        writer.write_all(b"\x1b[3m").unwrap();
        writer.reset().unwrap();
        assert_eq!(&writer.inner[5..], b"\x1b[3m\x1b[0m");
    }

    #[test]
    fn restore_reopens_style() {
        let mut writer = AnsiWriter::new(Vec::new());
        writer.write_all(b"\x1b[4mu\x1b[0m").unwrap();
        writer.restore().unwrap();
        // The reset cleared the stored sequence, nothing to restore.
        assert_eq!(writer.inner, b"\x1b[4mu\x1b[0m");

        writer.write_all(b"\x1b[7m").unwrap();
        writer.reset().unwrap();
        writer.restore().unwrap();
        assert!(writer.inner.ends_with(b"\x1b[7m\x1b[0m\x1b[7m"));
    }

    #[test]
    fn non_sgr_sequences_pass_through_unrecorded() {
        let mut writer = AnsiWriter::new(Vec::new());
        writer.write_all(b"\x1b[2Aup").unwrap();
        assert!(!writer.tracker.dirty());
        assert_eq!(writer.tracker.last_sequence(), b"");
        assert_eq!(writer.inner, b"\x1b[2Aup");
    }
}
