//! Reflow configuration.
//!
//! [`UserConfig`] is what callers and config files provide: every field is
//! optional and numbers are signed so out-of-range input can be reported
//! instead of failing to deserialize. [`ReflowConfig::from_user`] validates
//! it against the defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scan::is_name_char;

pub const DEFAULT_IGNORE_WITH: &str = "_!i-£___£%_";
pub const DEFAULT_INDENT: usize = 2;
pub const MAX_INDENT: usize = 16;

/// Validated reflow options.
///
/// Only [`Default`] and [`ReflowConfig::from_user`] build one, so every
/// config that reaches the engine has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflowConfig {
    ignore_tags: Vec<String>,
    ignore_with: String,
    strict: bool,
    indent_width: usize,
    tag_wrap: usize,
    content_wrap: usize,
    trim_tags: Vec<String>,
}

impl ReflowConfig {
    /// Elements reproduced verbatim, tags included.
    pub fn ignore_tags(&self) -> &[String] {
        &self.ignore_tags
    }

    /// Prefix of the internal placeholders.
    pub fn ignore_with(&self) -> &str {
        &self.ignore_with
    }

    /// Drop comments and the slash of self-closing tags.
    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    /// Wrap the attributes of open tags longer than this. 0 disables.
    pub fn tag_wrap(&self) -> usize {
        self.tag_wrap
    }

    /// Word-wrap text at this column. 0 disables.
    pub fn content_wrap(&self) -> usize {
        self.content_wrap
    }

    /// Elements whose content is trimmed of leading and trailing whitespace.
    pub fn trim_tags(&self) -> &[String] {
        &self.trim_tags
    }
}

impl Default for ReflowConfig {
    fn default() -> Self {
        Self {
            ignore_tags: vec!["script".into(), "style".into(), "pre".into()],
            ignore_with: DEFAULT_IGNORE_WITH.to_string(),
            strict: false,
            indent_width: DEFAULT_INDENT,
            tag_wrap: 0,
            content_wrap: 0,
            trim_tags: Vec::new(),
        }
    }
}

/// Unvalidated options, as read from a file or built by a caller.
///
/// Field names follow htmlfy; the longer names are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserConfig {
    #[serde(alias = "ignore_tags", skip_serializing_if = "Option::is_none")]
    pub ignore: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_with: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(alias = "indent_width", skip_serializing_if = "Option::is_none")]
    pub tab_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_wrap: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_wrap: Option<i64>,
    #[serde(alias = "trim_tags", skip_serializing_if = "Option::is_none")]
    pub trim: Option<Vec<String>>,
}

impl UserConfig {
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Fields set in `other` win.
    pub fn merge(&mut self, other: UserConfig) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })*
            };
        }
        take!(ignore, ignore_with, strict, tab_size, tag_wrap, content_wrap, trim);
    }
}

fn is_tag_name(name: &str) -> bool {
    let b = name.as_bytes();
    !b.is_empty() && b[0].is_ascii_alphabetic() && b.iter().all(|&c| is_name_char(c))
}

fn check_tags(field: &'static str, tags: &[String]) -> Result<Vec<String>, ConfigError> {
    tags.iter()
        .map(|t| {
            if is_tag_name(t) {
                Ok(t.to_ascii_lowercase())
            } else {
                Err(ConfigError::InvalidTagName {
                    field,
                    name: t.clone(),
                })
            }
        })
        .collect()
}

fn check_width(field: &'static str, value: Option<i64>) -> Result<Option<usize>, ConfigError> {
    match value {
        None => Ok(None),
        Some(v) => usize::try_from(v)
            .map(Some)
            .map_err(|_| ConfigError::NegativeWidth { field, value: v }),
    }
}

impl ReflowConfig {
    /// Validate `user` and fill the gaps from the defaults.
    ///
    /// A list given in `user` replaces the default list.
    pub fn from_user(user: &UserConfig) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(size) = user.tab_size {
            if !(1..=MAX_INDENT as i64).contains(&size) {
                return Err(ConfigError::IndentOutOfRange(size));
            }
            config.indent_width = size as usize;
        }
        if let Some(w) = check_width("tag_wrap", user.tag_wrap)? {
            config.tag_wrap = w;
        }
        if let Some(w) = check_width("content_wrap", user.content_wrap)? {
            config.content_wrap = w;
        }
        if let Some(tags) = &user.ignore {
            config.ignore_tags = check_tags("ignore", tags)?;
        }
        if let Some(tags) = &user.trim {
            config.trim_tags = check_tags("trim", tags)?;
        }
        if let Some(token) = &user.ignore_with {
            if token.is_empty()
                || token.chars().any(|c| c.is_whitespace() || c == '<' || c == '>')
            {
                return Err(ConfigError::InvalidIgnoreToken);
            }
            config.ignore_with = token.clone();
        }
        if let Some(strict) = user.strict {
            config.strict = strict;
        }
        Ok(config)
    }
}
