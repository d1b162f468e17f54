//! File-based settings.
//!
//! A settings file holds a `[reflow]` table with the htmlfy options and a
//! `[caret]` table for the source view. Files ending in `.json` are read as
//! JSON, anything else as TOML. Missing fields fall back to their defaults.

use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::caret::bridge::{SourceViewOptions, SyncMode};
use crate::caret::{CaretSync, Marker, MarkerStrategy};
use crate::error::{Error, Result};
use crate::reflow::{ReflowConfig, UserConfig};

/* ============================= Caret settings ============================= */

/// How the caret travels between the rich-text and source views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaretSettings {
    pub marker: Marker,
    pub sync: SyncMode,
    pub strategy: MarkerStrategy,
    /// Prettify when the source view opens.
    pub auto_prettify: bool,
}

impl Default for CaretSettings {
    fn default() -> Self {
        Self {
            marker: Marker::default(),
            sync: SyncMode::default(),
            strategy: MarkerStrategy::default(),
            auto_prettify: true,
        }
    }
}

/* ================================ Settings ================================ */

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub reflow: UserConfig,
    pub caret: CaretSettings,
}

impl Settings {
    /// Read settings from `path`.
    ///
    /// # Errors
    ///
    /// - `Error::Io`: the file cannot be read
    /// - `Error::ConfigParse`: the contents are not valid for the format
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading settings from: {}", path.display());
        let contents = fs::read_to_string(path)?;

        if contents.trim().is_empty() {
            debug!("Settings file is empty, using defaults");
            return Ok(Self::default());
        }

        let is_json = path
            .extension()
            .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case("json"));
        let parsed: std::result::Result<Self, String> = if is_json {
            serde_json::from_str(&contents).map_err(|e| e.to_string())
        } else {
            toml::from_str(&contents).map_err(|e| e.to_string())
        };
        let settings = parsed.map_err(|message| Error::ConfigParse {
            path: path.to_path_buf(),
            message,
        })?;

        info!("Settings loaded from {}", path.display());
        Ok(settings)
    }

    /// Validated reflow options.
    pub fn reflow_config(&self) -> Result<ReflowConfig> {
        Ok(ReflowConfig::from_user(&self.reflow)?)
    }

    pub fn caret_sync(&self) -> CaretSync {
        CaretSync::new(self.caret.marker)
    }

    pub fn source_view_options(&self) -> Result<SourceViewOptions> {
        Ok(SourceViewOptions {
            sync: self.caret.sync,
            strategy: self.caret.strategy,
            auto_prettify: self.caret.auto_prettify,
            reflow: self.reflow_config()?,
        })
    }
}
