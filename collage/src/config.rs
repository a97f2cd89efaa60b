//! Builder configuration with defaults and environment overrides.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{
    BASE_ITEM_WIDTH, CANVAS_HEIGHT, CANVAS_WIDTH, EXPORT_SCALE, FIT_MARGIN, GRID_SIZE, MAX_HISTORY,
};
use crate::geometry::Size;

/// Error returned by [`CollageConfig::from_env`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is not a valid number: {value:?}")]
    Parse { key: &'static str, value: String },
    #[error("{key} must be {requirement}, got {value}")]
    OutOfRange { key: &'static str, requirement: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollageConfig {
    /// Logical canvas size; also the export size before supersampling.
    pub canvas: Size,
    /// Snapshots retained by undo history.
    pub history_depth: usize,
    pub grid_size: f64,
    pub export_scale: f64,
    /// Width given to newly added items.
    pub base_item_width: f64,
    /// Padding subtracted from the container by fit-to-view.
    pub fit_margin: f64,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            canvas: Size::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            history_depth: MAX_HISTORY,
            grid_size: GRID_SIZE,
            export_scale: EXPORT_SCALE,
            base_item_width: BASE_ITEM_WIDTH,
            fit_margin: FIT_MARGIN,
        }
    }
}

impl CollageConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Optional:
    /// - `COLLAGE_CANVAS_WIDTH`, `COLLAGE_CANVAS_HEIGHT`: default 600 x 800, must be > 0
    /// - `COLLAGE_HISTORY_DEPTH`: default 30, must be >= 1
    /// - `COLLAGE_GRID_SIZE`: default 20, must be > 0
    /// - `COLLAGE_EXPORT_SCALE`: default 2, must be > 0
    /// - `COLLAGE_BASE_ITEM_WIDTH`: default 180, must be > 0
    /// - `COLLAGE_FIT_MARGIN`: default 40, must be >= 0
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set but unparseable or out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Same as [`Self::from_env`] with an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let width = positive(&lookup, "COLLAGE_CANVAS_WIDTH", defaults.canvas.width)?;
        let height = positive(&lookup, "COLLAGE_CANVAS_HEIGHT", defaults.canvas.height)?;
        let history_depth = match lookup("COLLAGE_HISTORY_DEPTH") {
            None => defaults.history_depth,
            Some(raw) => {
                let depth = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::Parse { key: "COLLAGE_HISTORY_DEPTH", value: raw.clone() })?;
                if depth == 0 {
                    return Err(ConfigError::OutOfRange {
                        key: "COLLAGE_HISTORY_DEPTH",
                        requirement: "at least 1",
                        value: raw,
                    });
                }
                depth
            }
        };
        let grid_size = positive(&lookup, "COLLAGE_GRID_SIZE", defaults.grid_size)?;
        let export_scale = positive(&lookup, "COLLAGE_EXPORT_SCALE", defaults.export_scale)?;
        let base_item_width = positive(&lookup, "COLLAGE_BASE_ITEM_WIDTH", defaults.base_item_width)?;
        let fit_margin = match parse_f64(&lookup, "COLLAGE_FIT_MARGIN")? {
            None => defaults.fit_margin,
            Some(v) if v >= 0.0 => v,
            Some(v) => {
                return Err(ConfigError::OutOfRange {
                    key: "COLLAGE_FIT_MARGIN",
                    requirement: "non-negative",
                    value: v.to_string(),
                });
            }
        };

        Ok(Self {
            canvas: Size::new(width, height),
            history_depth,
            grid_size,
            export_scale,
            base_item_width,
            fit_margin,
        })
    }
}

fn parse_f64<F: Fn(&str) -> Option<String>>(lookup: &F, key: &'static str) -> Result<Option<f64>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(ConfigError::Parse { key, value: raw }),
    }
}

fn positive<F: Fn(&str) -> Option<String>>(lookup: &F, key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match parse_f64(lookup, key)? {
        None => Ok(default),
        Some(v) if v > 0.0 => Ok(v),
        Some(v) => Err(ConfigError::OutOfRange { key, requirement: "greater than 0", value: v.to_string() }),
    }
}
