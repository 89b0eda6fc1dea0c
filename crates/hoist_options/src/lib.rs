//! hoist_options: `hoist.json` parsing and evaluation options.
//!
//! The file holds camelCase keys matching the structures below. Every field
//! is optional; the resolved accessors supply the defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Call depth used when neither the file nor the command line sets one.
pub const DEFAULT_MAX_CALL_DEPTH: u32 = 512;

/// Largest call depth the evaluation thread's stack can hold. Deeper limits
/// would overflow the native stack before the script sees a `RangeError`.
pub const MAX_CALL_DEPTH_CEILING: u32 = 5_000;

/// Options that control evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalOptions {
    /// Treat the whole script as if it opened with `"use strict"`.
    pub strict: Option<bool>,
    /// Maximum number of nested function calls before a `RangeError`.
    pub max_call_depth: Option<u32>,
    /// Color diagnostic reports. Console output is never colored.
    pub console_colors: Option<bool>,
}

impl EvalOptions {
    pub fn strict(&self) -> bool {
        self.strict.unwrap_or(false)
    }

    /// The configured depth, clamped to `1..=MAX_CALL_DEPTH_CEILING`.
    pub fn max_call_depth(&self) -> u32 {
        self.max_call_depth
            .unwrap_or(DEFAULT_MAX_CALL_DEPTH)
            .clamp(1, MAX_CALL_DEPTH_CEILING)
    }

    /// `None` leaves the choice to terminal detection.
    pub fn console_colors(&self) -> Option<bool> {
        self.console_colors
    }

    /// Overlay `other` on `self`: fields set in `other` win.
    pub fn merge(&mut self, other: &EvalOptions) {
        if other.strict.is_some() {
            self.strict = other.strict;
        }
        if other.max_call_depth.is_some() {
            self.max_call_depth = other.max_call_depth;
        }
        if other.console_colors.is_some() {
            self.console_colors = other.console_colors;
        }
    }

    /// Reject values outside what evaluation supports.
    pub fn validate(&self) -> Result<(), OptionsError> {
        match self.max_call_depth {
            Some(depth) if depth == 0 || depth > MAX_CALL_DEPTH_CEILING => {
                Err(OptionsError::CallDepthOutOfRange(depth))
            }
            _ => Ok(()),
        }
    }
}

/// The `hoist.json` file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoistConfig {
    #[serde(default)]
    pub eval_options: EvalOptions,
    /// Global function to call after the top level completes.
    pub entry: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: maxCallDepth {0} must be between 1 and {max}", max = MAX_CALL_DEPTH_CEILING)]
    CallDepthOutOfRange(u32),
}

/// Parse a `hoist.json` document from a string.
pub fn parse_options(content: &str) -> Result<HoistConfig, OptionsError> {
    let config: HoistConfig = serde_json::from_str(content)?;
    config.eval_options.validate()?;
    Ok(config)
}

/// Parse a `hoist.json` file from a path.
pub fn parse_options_file(path: impl AsRef<Path>) -> Result<HoistConfig, OptionsError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_options(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EvalOptions::default();
        assert!(!options.strict());
        assert_eq!(options.max_call_depth(), DEFAULT_MAX_CALL_DEPTH);
        assert_eq!(options.console_colors(), None);
    }

    #[test]
    fn test_merge_prefers_set_fields() {
        let mut base = EvalOptions {
            strict: Some(true),
            max_call_depth: Some(100),
            console_colors: None,
        };
        base.merge(&EvalOptions {
            max_call_depth: Some(20),
            ..EvalOptions::default()
        });
        assert_eq!(base.strict, Some(true));
        assert_eq!(base.max_call_depth, Some(20));
    }

    #[test]
    fn test_call_depth_is_clamped() {
        let deep = EvalOptions {
            max_call_depth: Some(200_000),
            ..EvalOptions::default()
        };
        assert_eq!(deep.max_call_depth(), MAX_CALL_DEPTH_CEILING);
        assert!(matches!(deep.validate(), Err(OptionsError::CallDepthOutOfRange(200_000))));

        let zero = EvalOptions {
            max_call_depth: Some(0),
            ..EvalOptions::default()
        };
        assert_eq!(zero.max_call_depth(), 1);
        assert!(zero.validate().is_err());
    }
}
