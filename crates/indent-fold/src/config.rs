//! Engine configuration.
//!
//! The only knob the folding algorithm needs is the tab width used when measuring indentation.
//! Configuration can be built in code or loaded from JSON:
//!
//! ```rust
//! use indent_fold::FoldConfig;
//!
//! let config = FoldConfig::from_json_str(r#"{ "tab_width": 8 }"#).unwrap();
//! assert_eq!(config.tab_width, 8);
//! ```

use crate::error::FoldError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tab width used when none is configured.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Folding engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FoldConfig {
    /// Number of indent columns a leading `'\t'` counts for (must be at least 1).
    pub tab_width: usize,
}

impl FoldConfig {
    /// Create a configuration with the given tab width.
    pub fn new(tab_width: usize) -> Result<Self, FoldError> {
        let config = Self { tab_width };
        config.validate()?;
        Ok(config)
    }

    /// Check that every field holds a usable value.
    pub fn validate(&self) -> Result<(), FoldError> {
        if self.tab_width == 0 {
            return Err(FoldError::InvalidTabWidth(self.tab_width));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, FoldError> {
        let config: FoldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FoldError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, FoldError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for FoldConfig {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }
}
