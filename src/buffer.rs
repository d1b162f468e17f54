//! Source buffer with a cursor and undo/redo.
//!
//! Stands in for the code-editor widget on the source side. Every edit says
//! whether it belongs in the user's history; marker lookups use
//! [`History::Skip`] so they never show up as undo steps.

use std::collections::VecDeque;
use std::ops::Range;

use log::trace;

use crate::error::{Error, Result};
use crate::offset::floor_char_boundary;

/// Default number of undo steps kept.
pub const DEFAULT_MAX_STEPS: usize = 100;

/// Whether an edit is recorded in the undo history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum History {
    Record,
    /// Invisible to undo/redo. The redo stack is left alone too.
    Skip,
}

/// A recorded edit.
#[derive(Debug, Clone)]
struct EditOperation {
    /// Byte position where the edit occurred
    pos: usize,
    /// Text that was deleted (empty for pure insertions)
    deleted: String,
    /// Text that was inserted (empty for pure deletions)
    inserted: String,
}

#[derive(Debug, Clone)]
pub struct SourceBuffer {
    text: String,
    cursor: usize,
    /// Oldest edit at the front.
    undo_stack: VecDeque<EditOperation>,
    redo_stack: Vec<EditOperation>,
    max_steps: usize,
}

impl Default for SourceBuffer {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl SourceBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_max_steps(text, DEFAULT_MAX_STEPS)
    }

    pub fn with_max_steps(text: impl Into<String>, max_steps: usize) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_steps,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Cursor as a byte offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor, clamped onto a char boundary.
    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = floor_char_boundary(&self.text, pos);
    }

    pub fn into_text(self) -> String {
        self.text
    }

    fn check_offset(&self, offset: usize) -> Result<()> {
        if offset > self.text.len() || !self.text.is_char_boundary(offset) {
            return Err(Error::InvalidOffset {
                offset,
                len: self.text.len(),
            });
        }
        Ok(())
    }

    /// Insert `s` at byte offset `pos`.
    pub fn insert(&mut self, pos: usize, s: &str, history: History) -> Result<()> {
        self.check_offset(pos)?;
        if s.is_empty() {
            return Ok(());
        }
        self.apply(pos, 0, s);
        if history == History::Record {
            self.record_op(pos, "", s);
        }
        Ok(())
    }

    /// Delete the bytes in `range`.
    pub fn delete(&mut self, range: Range<usize>, history: History) -> Result<()> {
        self.check_offset(range.start)?;
        self.check_offset(range.end)?;
        if range.start >= range.end {
            return Ok(());
        }
        let deleted = self.text[range.clone()].to_string();
        self.apply(range.start, range.len(), "");
        if history == History::Record {
            self.record_op(range.start, &deleted, "");
        }
        Ok(())
    }

    /// Replace the whole document. The cursor moves to the start.
    pub fn replace_all(&mut self, text: impl Into<String>, history: History) {
        let text = text.into();
        let old = std::mem::replace(&mut self.text, text);
        if history == History::Record && old != self.text {
            let inserted = self.text.clone();
            self.record_op(0, &old, &inserted);
        }
        self.cursor = 0;
    }

    /// Splice and keep the cursor pointing at the same content.
    fn apply(&mut self, pos: usize, removed: usize, inserted: &str) {
        self.text.replace_range(pos..pos + removed, inserted);
        if self.cursor > pos {
            self.cursor = if self.cursor < pos + removed {
                pos
            } else {
                self.cursor - removed + inserted.len()
            };
        }
    }

    fn record_op(&mut self, pos: usize, deleted: &str, inserted: &str) {
        // New edit invalidates redo
        self.redo_stack.clear();
        self.undo_stack.push_back(EditOperation {
            pos,
            deleted: deleted.to_string(),
            inserted: inserted.to_string(),
        });
        while self.undo_stack.len() > self.max_steps {
            self.undo_stack.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo the last recorded edit. Returns false when there is nothing to
    /// undo.
    pub fn undo(&mut self) -> bool {
        let Some(op) = self.undo_stack.pop_back() else {
            return false;
        };
        trace!("undo at {}: -{} +{}", op.pos, op.inserted.len(), op.deleted.len());
        // Inverse: remove what was inserted, put back what was deleted
        self.apply(op.pos, op.inserted.len(), &op.deleted);
        self.cursor = op.pos + op.deleted.len();
        self.redo_stack.push(op);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(op) = self.redo_stack.pop() else {
            return false;
        };
        self.apply(op.pos, op.deleted.len(), &op.inserted);
        self.cursor = op.pos + op.inserted.len();
        self.undo_stack.push_back(op);
        true
    }

    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_delete_undo_redo() {
        let mut buf = SourceBuffer::new("<p>ac</p>");
        buf.insert(4, "b", History::Record).unwrap();
        assert_eq!(buf.text(), "<p>abc</p>");
        buf.delete(3..4, History::Record).unwrap();
        assert_eq!(buf.text(), "<p>bc</p>");

        assert!(buf.undo());
        assert_eq!(buf.text(), "<p>abc</p>");
        assert!(buf.undo());
        assert_eq!(buf.text(), "<p>ac</p>");
        assert!(!buf.undo());

        assert!(buf.redo());
        assert_eq!(buf.text(), "<p>abc</p>");
        assert_eq!(buf.cursor(), 5);
    }

    #[test]
    fn skipped_edits_leave_history_alone() {
        let mut buf = SourceBuffer::new("ab");
        buf.insert(1, "x", History::Record).unwrap();
        assert!(buf.undo());
        assert!(buf.can_redo());

        buf.insert(1, "\0", History::Skip).unwrap();
        buf.delete(1..2, History::Skip).unwrap();
        assert!(!buf.can_undo());
        assert!(buf.can_redo());
        assert_eq!(buf.text(), "ab");
    }

    #[test]
    fn cursor_follows_edits() {
        let mut buf = SourceBuffer::new("hello");
        buf.set_cursor(3);
        buf.insert(0, ">>", History::Skip).unwrap();
        assert_eq!(buf.cursor(), 5);
        buf.delete(0..2, History::Skip).unwrap();
        assert_eq!(buf.cursor(), 3);
        buf.insert(3, "!", History::Skip).unwrap();
        assert_eq!(buf.cursor(), 3);
        buf.delete(1..4, History::Skip).unwrap();
        assert_eq!(buf.cursor(), 1);
    }

    #[test]
    fn rejects_offsets_outside_the_text_or_inside_a_char() {
        let mut buf = SourceBuffer::new("£");
        assert!(matches!(
            buf.insert(1, "x", History::Record),
            Err(Error::InvalidOffset { offset: 1, len: 2 })
        ));
        assert!(buf.insert(3, "x", History::Record).is_err());
        assert!(buf.delete(0..5, History::Record).is_err());
    }

    #[test]
    fn history_is_bounded() {
        let mut buf = SourceBuffer::with_max_steps("", 3);
        for _ in 0..5 {
            let end = buf.len();
            buf.insert(end, "a", History::Record).unwrap();
        }
        let mut undone = 0;
        while buf.undo() {
            undone += 1;
        }
        assert_eq!(undone, 3);
        assert_eq!(buf.text(), "aa");
    }

    #[test]
    fn oldest_steps_fall_off_first() {
        let mut buf = SourceBuffer::with_max_steps("", 2);
        for word in ["a", "b", "c", "d"] {
            let end = buf.len();
            buf.insert(end, word, History::Record).unwrap();
        }
        assert!(buf.undo());
        assert!(buf.undo());
        assert!(!buf.undo());
        assert_eq!(buf.text(), "ab");

        assert!(buf.redo());
        assert!(buf.redo());
        assert_eq!(buf.text(), "abcd");
        assert!(buf.can_undo());
    }

    #[test]
    fn replace_all_is_one_undo_step() {
        let mut buf = SourceBuffer::new("<p>x</p>");
        buf.replace_all("<p>\n  x\n</p>", History::Record);
        assert!(buf.undo());
        assert_eq!(buf.text(), "<p>x</p>");
    }
}
