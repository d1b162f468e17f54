//! HTML reflow: an htmlfy-style pretty-printer and minifier.
//!
//! Prettifying minifies first and then re-expands, so existing formatting
//! never leaks into the result:
//!
//! 1. ignored elements are cut out and replaced by placeholders
//! 2. quoted attribute values are trimmed and their structural characters
//!    spelled out
//! 3. `closify`, `trimify`, then `minify` (which entifies textarea bodies)
//! 4. tokenize and lay out one token per line
//! 5. cleanup, restore attribute values, put the ignored elements back

mod config;
mod ignore;
mod layout;
mod minify;

use log::debug;

pub use config::{ReflowConfig, UserConfig, DEFAULT_IGNORE_WITH, DEFAULT_INDENT, MAX_INDENT};
pub use minify::{closify, entify, is_html};

use crate::error::ConfigError;
use ignore::{protect_attributes, unprotect_attributes, IgnoredBlocks};
use layout::tokenize;
use minify::{minify_markup, strip_comments, trimify};

/// Per-call context. Nothing is shared between calls.
pub(crate) struct Reflow<'c> {
    config: &'c ReflowConfig,
    /// One indentation level.
    step: String,
}

impl<'c> Reflow<'c> {
    pub(crate) fn new(config: &'c ReflowConfig) -> Self {
        Self {
            config,
            step: " ".repeat(config.indent_width()),
        }
    }

    fn prettify(&self, html: &str) -> String {
        let token = self.config.ignore_with();

        let (html, blocks) = IgnoredBlocks::extract(html, self.config.ignore_tags(), token);
        let mut html = protect_attributes(&html, token);
        if self.config.strict() {
            html = strip_comments(&html);
        }
        let mut html = closify(&html);
        if !self.config.trim_tags().is_empty() {
            html = trimify(&html, self.config.trim_tags());
        }
        let html = minify_markup(&html);

        let tokens = tokenize(&html);
        let lines = self.layout(&tokens);
        debug!("reflow: {} tokens, {} lines", tokens.len(), lines.len());

        let out = self.cleanup(&lines.join("\n"));
        let out = out.strip_prefix('\n').unwrap_or(&out);
        let out = out.strip_suffix('\n').unwrap_or(out);
        let out = unprotect_attributes(out, token);
        if blocks.is_empty() {
            out
        } else {
            blocks.reinsert(&out, token)
        }
    }
}

/// Format `html` with one tag or text run per line, indented by depth.
///
/// Text without any HTML element is returned unchanged. Malformed markup is
/// formatted as well as it can be and never rejected.
pub fn prettify(html: &str, config: &ReflowConfig) -> String {
    if !is_html(html) {
        return html.to_string();
    }
    Reflow::new(config).prettify(html)
}

/// [`prettify`] with an unvalidated config. The config is checked before the
/// input is looked at.
pub fn prettify_with(html: &str, user: &UserConfig) -> Result<String, ConfigError> {
    let config = ReflowConfig::from_user(user)?;
    Ok(prettify(html, &config))
}

/// Single-line form of `html`: line breaks, tabs, whitespace between tags and
/// inside attribute values are removed.
pub fn minify(html: &str) -> String {
    if !is_html(html) {
        return html.to_string();
    }
    let protected = protect_attributes(html, DEFAULT_IGNORE_WITH);
    unprotect_attributes(&minify_markup(&protected), DEFAULT_IGNORE_WITH)
}
