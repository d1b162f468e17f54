//! Moving the caret between the rich-text view and the source view.
//!
//! The rich-text side marks its caret with a span of class [`MARKER_CLASS`]
//! appended to the selected node. On the way into the source view the span
//! becomes the marker character; on the way back the marker becomes a fresh
//! span that the host turns into its selection.

use std::str::FromStr;
use std::sync::LazyLock;

use log::debug;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use super::{CaretSync, MarkerStrategy};
use crate::buffer::{History, SourceBuffer};
use crate::error::Result;
use crate::reflow::{prettify, ReflowConfig};

pub const MARKER_CLASS: &str = "tcp_CmCaReT";

/// Span written back into the rich text at the caret.
pub const MARKER_SPAN: &str = r#"<span class="tcp_CmCaReT">&nbsp;</span>"#;

static MARKER_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"<span\s+class="{MARKER_CLASS}"([^>]*)>([^<]*)</span>"#))
        .expect("MARKER_SPAN_RE: hardcoded regex is valid")
});

/// Which direction the caret follows the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    #[serde(rename = "none")]
    Disabled,
    /// Rich text to source only.
    #[default]
    #[serde(rename = "forward")]
    Forward,
    /// Both ways.
    #[serde(rename = "both")]
    Both,
}

impl SyncMode {
    pub fn syncs_to_source(self) -> bool {
        matches!(self, SyncMode::Forward | SyncMode::Both)
    }

    pub fn syncs_back(self) -> bool {
        self == SyncMode::Both
    }
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(SyncMode::Disabled),
            "forward" => Ok(SyncMode::Forward),
            "both" => Ok(SyncMode::Both),
            other => Err(format!("unknown sync mode '{other}'")),
        }
    }
}

/// How the source view is opened and accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceViewOptions {
    pub sync: SyncMode,
    pub strategy: MarkerStrategy,
    /// Prettify the HTML when the source view opens.
    pub auto_prettify: bool,
    pub reflow: ReflowConfig,
}

impl Default for SourceViewOptions {
    fn default() -> Self {
        Self {
            sync: SyncMode::default(),
            strategy: MarkerStrategy::default(),
            auto_prettify: true,
            reflow: ReflowConfig::default(),
        }
    }
}

impl CaretSync {
    /// Replace every caret span in `html` with the marker.
    pub fn rich_to_source(&self, html: &str) -> String {
        let mut buf = [0u8; 4];
        let marker = self.marker().as_char().encode_utf8(&mut buf);
        MARKER_SPAN_RE.replace_all(html, NoExpand(marker)).into_owned()
    }

    /// Replace the first marker in `text` with a caret span.
    pub fn source_to_rich(&self, text: &str) -> String {
        text.replacen(self.marker().as_char(), MARKER_SPAN, 1)
    }

    /// Load serialized rich text into a new source buffer, cursor at the
    /// caret when the mode syncs into the source view.
    pub fn open_source_view(
        &self,
        rich_html: &str,
        options: &SourceViewOptions,
    ) -> Result<SourceBuffer> {
        let mut html = if options.sync.syncs_to_source() {
            self.rich_to_source(rich_html)
        } else {
            rich_html.to_string()
        };
        if options.auto_prettify {
            html = prettify(&html, &options.reflow);
        }

        let mut buffer = SourceBuffer::new(String::new());
        buffer.replace_all(html, History::Skip);
        if let Some(offset) = self.scroll_to_caret(&mut buffer)? {
            debug!("source view opened with the cursor at {offset}");
        }
        Ok(buffer)
    }

    /// HTML to hand back to the rich-text editor.
    pub fn accept_source_view(
        &self,
        buffer: &mut SourceBuffer,
        options: &SourceViewOptions,
    ) -> Result<String> {
        if !options.sync.syncs_back() {
            return Ok(buffer.text().to_string());
        }
        let value = self.buffer_value_with_marker(buffer, options.strategy)?;
        Ok(self.source_to_rich(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_becomes_marker_and_back() {
        let sync = CaretSync::default();
        let rich = r#"<p>ab<span class="tcp_CmCaReT" data-mce-bogus="1">&nbsp;</span></p>"#;
        let source = sync.rich_to_source(rich);
        assert_eq!(source, "<p>ab\0</p>");
        assert_eq!(
            sync.source_to_rich(&source),
            r#"<p>ab<span class="tcp_CmCaReT">&nbsp;</span></p>"#
        );
    }

    #[test]
    fn only_the_first_marker_goes_back() {
        let sync = CaretSync::default();
        assert_eq!(
            sync.source_to_rich("a\0b\0"),
            format!("a{MARKER_SPAN}b\0")
        );
    }

    #[test]
    fn open_positions_cursor_and_strips_marker() {
        let sync = CaretSync::default();
        let options = SourceViewOptions::default();
        let rich = r#"<div><p>Hi<span class="tcp_CmCaReT">&nbsp;</span></p></div>"#;
        let buffer = sync.open_source_view(rich, &options).unwrap();
        assert_eq!(buffer.text(), "<div>\n  <p>\n    Hi\n  </p>\n</div>");
        assert_eq!(&buffer.text()[..buffer.cursor()], "<div>\n  <p>\n    Hi");
        assert!(!buffer.can_undo());
    }

    #[test]
    fn disabled_mode_leaves_span_alone() {
        let sync = CaretSync::default();
        let options = SourceViewOptions {
            sync: SyncMode::Disabled,
            auto_prettify: false,
            ..Default::default()
        };
        let rich = r#"<p><span class="tcp_CmCaReT">&nbsp;</span></p>"#;
        let mut buffer = sync.open_source_view(rich, &options).unwrap();
        assert_eq!(buffer.text(), rich);
        assert_eq!(buffer.cursor(), 0);
        assert_eq!(sync.accept_source_view(&mut buffer, &options).unwrap(), rich);
    }

    #[test]
    fn accept_marks_the_caret_when_syncing_back() {
        let sync = CaretSync::default();
        let options = SourceViewOptions {
            sync: SyncMode::Both,
            ..Default::default()
        };
        let mut buffer = SourceBuffer::new("<p>one</p><p>two</p>");
        buffer.set_cursor(14);
        let html = sync.accept_source_view(&mut buffer, &options).unwrap();
        assert_eq!(html, format!("<p>one</p><p>t{MARKER_SPAN}wo</p>"));
        assert_eq!(buffer.text(), "<p>one</p><p>two</p>");

        let forward = SourceViewOptions::default();
        assert_eq!(
            sync.accept_source_view(&mut buffer, &forward).unwrap(),
            "<p>one</p><p>two</p>"
        );
    }

    #[test]
    fn sync_mode_parses_and_deserializes() {
        assert_eq!("none".parse::<SyncMode>(), Ok(SyncMode::Disabled));
        assert_eq!("Both".parse::<SyncMode>(), Ok(SyncMode::Both));
        assert!("sideways".parse::<SyncMode>().is_err());
        let mode: SyncMode = serde_json::from_str("\"forward\"").unwrap();
        assert_eq!(mode, SyncMode::Forward);
    }
}
