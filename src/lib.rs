//! codepro: caret markers and HTML reflow for a source-code view.
//!
//! Two engines share this crate:
//!
//! - [`caret`] puts a reserved marker character into HTML at a position
//!   that does not split a tag, attribute or raw-text element, and takes it
//!   out again after the text has been reformatted, so the caret survives
//!   the round trip.
//! - [`reflow`] prettifies and minifies HTML the way htmlfy does.
//!
//! ```
//! use codepro::{prettify, CaretSync, ReflowConfig};
//!
//! let sync = CaretSync::default();
//! let marked = sync.value_with_marker_at_cursor("<div>Hello</div>", 10);
//! let pretty = prettify(&marked, &ReflowConfig::default());
//! let caret = sync.scroll_to_caret_position(&pretty);
//! assert_eq!(caret.text, "<div>\n  Hello\n</div>");
//! assert_eq!(caret.offset, Some(13));
//! ```

pub mod buffer;
pub mod caret;
pub mod error;
pub mod offset;
pub mod reflow;
mod scan;
pub mod settings;
pub mod syntax;

pub use buffer::{History, SourceBuffer};
pub use caret::bridge::{SourceViewOptions, SyncMode};
pub use caret::{locate_marker, CaretPosition, CaretSync, Marker, MarkerStrategy};
pub use error::{ConfigError, Error, Result};
pub use reflow::{minify, prettify, prettify_with, ReflowConfig, UserConfig};
pub use settings::Settings;
pub use syntax::{NodeKind, SyntaxTree};
