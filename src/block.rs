// Copyright Sebastian Wiesner <sebastian@swsnr.de>

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The stack of active block frames.

use crate::style::{StyleBlock, StylePrimitive};

/// One active block: a buffer of accumulated child output plus the
/// effective style of the block.
#[derive(Debug, Default)]
pub(crate) struct BlockFrame {
    /// Output accumulated for this block, flushed on exit.
    pub(crate) buf: Vec<u8>,
    /// The effective style of this block.
    pub(crate) style: StyleBlock,
    /// How many child blocks this block has emitted so far.
    pub(crate) child_blocks: usize,
}

impl BlockFrame {
    pub(crate) fn new(style: StyleBlock) -> Self {
        Self {
            buf: Vec::new(),
            style,
            child_blocks: 0,
        }
    }
}

/// A LIFO of block frames.
///
/// The stack is never empty while rendering: the driver pushes the document
/// frame before the first event and pops it after the last.
#[derive(Debug, Default)]
pub(crate) struct BlockStack {
    frames: Vec<BlockFrame>,
}

impl BlockStack {
    pub(crate) fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub(crate) fn push(&mut self, frame: BlockFrame) {
        self.frames.push(frame);
    }

    pub(crate) fn pop(&mut self) -> BlockFrame {
        self.frames.pop().expect("block stack never empty while rendering")
    }

    pub(crate) fn current(&self) -> &BlockFrame {
        self.frames.last().expect("block stack never empty while rendering")
    }

    pub(crate) fn current_mut(&mut self) -> &mut BlockFrame {
        self.frames.last_mut().expect("block stack never empty while rendering")
    }

    /// The frame below the top, or the top itself if there is only one.
    pub(crate) fn parent(&self) -> &BlockFrame {
        match self.frames.len() {
            0 => panic!("block stack never empty while rendering"),
            1 => &self.frames[0],
            n => &self.frames[n - 2],
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The sum of all frame indents on the stack.
    pub(crate) fn indent(&self) -> usize {
        self.frames.iter().map(|frame| frame.style.indent()).sum()
    }

    /// The sum of all frame margins on the stack.
    pub(crate) fn margin(&self) -> usize {
        self.frames.iter().map(|frame| frame.style.margin()).sum()
    }

    /// The effective content width inside the current block.
    ///
    /// Zero when wrapping is disabled or the decorations use up the whole
    /// target width; content is then emitted unwrapped.
    pub(crate) fn content_width(&self, word_wrap: usize) -> usize {
        word_wrap.saturating_sub(self.indent() + 2 * self.margin())
    }

    /// The style for a leaf rendered inside the current block.
    ///
    /// Colours cascade from the block, nothing else does.
    pub(crate) fn with(&self, child: &StylePrimitive) -> StylePrimitive {
        child.colors_on_top_of(&self.current().style.primitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn block(json: &str) -> StyleBlock {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn cumulative_layout() {
        let mut stack = BlockStack::new();
        stack.push(BlockFrame::new(block(r#"{"margin": 2}"#)));
        stack.push(BlockFrame::new(block(r#"{"indent": 1}"#)));
        stack.push(BlockFrame::new(block(r#"{"indent": 3, "margin": 1}"#)));
        assert_eq!(stack.indent(), 4);
        assert_eq!(stack.margin(), 3);
        assert_eq!(stack.content_width(80), 80 - 4 - 6);
    }

    #[test]
    fn content_width_clamps_to_zero() {
        let mut stack = BlockStack::new();
        stack.push(BlockFrame::new(block(r#"{"indent": 50, "margin": 20}"#)));
        assert_eq!(stack.content_width(80), 0);
        assert_eq!(stack.content_width(0), 0);
    }

    #[test]
    fn parent_of_single_frame_is_itself() {
        let mut stack = BlockStack::new();
        stack.push(BlockFrame::new(block(r#"{"indent": 7}"#)));
        assert_eq!(stack.parent().style.indent(), 7);
    }

    #[test]
    fn with_cascades_colors_only() {
        let mut stack = BlockStack::new();
        stack.push(BlockFrame::new(block(r#"{"color": "252", "bold": true}"#)));
        let child: StylePrimitive = serde_json::from_str(r#"{"italic": true}"#).unwrap();
        let effective = stack.with(&child);
        assert_eq!(effective.color.as_deref(), Some("252"));
        assert_eq!(effective.italic, Some(true));
        assert_eq!(effective.bold, None);
    }
}
