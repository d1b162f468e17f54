//! Caret synchronisation through a marker character.
//!
//! Before the source view opens, a reserved character is inserted where the
//! caret should end up. The text travels through serialisation, editing and
//! prettifying with the marker inside it; on the other side the marker is
//! located, removed, and its offset becomes the new caret position.
//!
//! The marker is assumed never to occur in ordinary content. It is not
//! escaped or validated.

pub mod bridge;
mod placement;

use std::borrow::Cow;
use std::fmt;

use log::debug;
use memchr::{memchr, memmem};
use serde::{Deserialize, Serialize};

use crate::buffer::{History, SourceBuffer};
use crate::error::Result;
use crate::offset::floor_char_boundary;
use crate::syntax::SyntaxTree;

pub use placement::{safe_insertion_offset, PlacementNotFound, DISALLOWED_TAGS};

/// The reserved character. Defaults to NUL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marker(char);

impl Default for Marker {
    fn default() -> Self {
        Marker('\0')
    }
}

impl Marker {
    pub const fn new(c: char) -> Self {
        Marker(c)
    }

    pub const fn as_char(self) -> char {
        self.0
    }

    pub const fn len_utf8(self) -> usize {
        self.0.len_utf8()
    }
}

/// Printable form: `\0` for NUL, otherwise `char::escape_default`.
impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            '\0' => f.write_str("\\0"),
            c => write!(f, "{}", c.escape_default()),
        }
    }
}

/// Where the marker goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerStrategy {
    /// Exactly at the cursor, whatever is there.
    #[serde(rename = "cursor")]
    AtCursor,
    /// At the nearest boundary that does not split markup.
    #[default]
    #[serde(rename = "element")]
    AtElement,
}

impl std::str::FromStr for MarkerStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cursor" | "atcursor" => Ok(MarkerStrategy::AtCursor),
            "element" | "atelement" => Ok(MarkerStrategy::AtElement),
            other => Err(format!("unknown marker strategy '{other}'")),
        }
    }
}

/// Text with the marker removed, and where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretPosition<'a> {
    pub text: Cow<'a, str>,
    pub offset: Option<usize>,
}

/// Byte offset of the first `marker` in `text`.
pub fn locate_marker(text: &str, marker: Marker) -> Option<usize> {
    let c = marker.as_char();
    if c.is_ascii() {
        memchr(c as u8, text.as_bytes())
    } else {
        let mut buf = [0u8; 4];
        memmem::find(text.as_bytes(), c.encode_utf8(&mut buf).as_bytes())
    }
}

fn insert_at(text: &str, offset: usize, marker: Marker) -> String {
    let mut out = String::with_capacity(text.len() + marker.len_utf8());
    out.push_str(&text[..offset]);
    out.push(marker.as_char());
    out.push_str(&text[offset..]);
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaretSync {
    marker: Marker,
}

impl CaretSync {
    pub fn new(marker: Marker) -> Self {
        Self { marker }
    }

    pub fn marker(&self) -> Marker {
        self.marker
    }

    /// `text` with the marker exactly at `cursor`. The cursor is clamped to
    /// the text and moved back onto a char boundary.
    pub fn value_with_marker_at_cursor(&self, text: &str, cursor: usize) -> String {
        insert_at(text, floor_char_boundary(text, cursor), self.marker)
    }

    /// `text` with the marker at the nearest safe boundary, or `text`
    /// unchanged when there is none.
    pub fn value_with_marker_at_element(
        &self,
        tree: &SyntaxTree,
        text: &str,
        cursor: usize,
    ) -> String {
        match safe_insertion_offset(tree, text, cursor) {
            Ok(offset) => insert_at(text, offset, self.marker),
            Err(e) => {
                debug!("cursor {cursor}: {e}, leaving the text unmarked");
                text.to_string()
            }
        }
    }

    pub fn value_with_marker(
        &self,
        tree: &SyntaxTree,
        text: &str,
        cursor: usize,
        strategy: MarkerStrategy,
    ) -> String {
        match strategy {
            MarkerStrategy::AtCursor => self.value_with_marker_at_cursor(text, cursor),
            MarkerStrategy::AtElement => self.value_with_marker_at_element(tree, text, cursor),
        }
    }

    /// Remove the first marker and report where it was.
    pub fn scroll_to_caret_position<'a>(&self, text: &'a str) -> CaretPosition<'a> {
        match locate_marker(text, self.marker) {
            Some(offset) => {
                let mut out = String::with_capacity(text.len());
                out.push_str(&text[..offset]);
                out.push_str(&text[offset + self.marker.len_utf8()..]);
                CaretPosition {
                    text: Cow::Owned(out),
                    offset: Some(offset),
                }
            }
            None => CaretPosition {
                text: Cow::Borrowed(text),
                offset: None,
            },
        }
    }

    /// The buffer's text with the marker at its cursor. The marker is put
    /// into the live buffer and taken out again without touching the undo
    /// history.
    pub fn buffer_value_with_marker(
        &self,
        buffer: &mut SourceBuffer,
        strategy: MarkerStrategy,
    ) -> Result<String> {
        let cursor = buffer.cursor();
        let offset = match strategy {
            MarkerStrategy::AtCursor => Some(cursor),
            MarkerStrategy::AtElement => {
                let tree = SyntaxTree::parse(buffer.text());
                match safe_insertion_offset(&tree, buffer.text(), cursor) {
                    Ok(offset) => Some(offset),
                    Err(e) => {
                        debug!("cursor {cursor}: {e}, leaving the text unmarked");
                        None
                    }
                }
            }
        };
        let Some(offset) = offset else {
            return Ok(buffer.text().to_string());
        };

        let mut buf = [0u8; 4];
        let marker = self.marker.as_char().encode_utf8(&mut buf);
        buffer.insert(offset, marker, History::Skip)?;
        let value = buffer.text().to_string();
        buffer.delete(offset..offset + marker.len(), History::Skip)?;
        Ok(value)
    }

    /// Remove the marker from the buffer and put the cursor where it was.
    /// Returns the offset, or `None` when the buffer holds no marker.
    pub fn scroll_to_caret(&self, buffer: &mut SourceBuffer) -> Result<Option<usize>> {
        let Some(offset) = locate_marker(buffer.text(), self.marker) else {
            return Ok(None);
        };
        buffer.delete(offset..offset + self.marker.len_utf8(), History::Skip)?;
        buffer.set_cursor(offset);
        Ok(Some(offset))
    }
}
