//! Editor configuration, loadable from YAML

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editor::keymap::Keymap;
use crate::gesture::{GestureConfig, MouseButton};
use crate::selection::TIME_EPSILON;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Movement in pixels before a press becomes a drag
    pub drag_threshold_px: f64,
    /// Movement in pixels before a drag becomes a rectangle selection
    pub rectangle_threshold_px: f64,
    pub rectangle_button: Option<MouseButton>,
    /// Slack on the score bounds in ticks
    pub time_epsilon: f64,
    /// Snap grid for pointer times; one quarter note when unset
    pub grid_step_ticks: Option<f64>,
    /// Replaces the default bindings when present
    pub keymap: Keymap,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 3.0,
            rectangle_threshold_px: 10.0,
            rectangle_button: Some(MouseButton::Left),
            time_epsilon: TIME_EPSILON,
            grid_step_ticks: None,
            keymap: Keymap::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&content)?;
        log::info!("loaded editor config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.drag_threshold_px >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "drag_threshold_px must be >= 0, got {}",
                self.drag_threshold_px
            )));
        }
        if !(self.rectangle_threshold_px >= self.drag_threshold_px) {
            return Err(ConfigError::Invalid(format!(
                "rectangle_threshold_px ({}) must not be below drag_threshold_px ({})",
                self.rectangle_threshold_px, self.drag_threshold_px
            )));
        }
        if !(self.time_epsilon >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "time_epsilon must be >= 0, got {}",
                self.time_epsilon
            )));
        }
        if let Some(step) = self.grid_step_ticks {
            if !(step > 0.0) {
                return Err(ConfigError::Invalid(format!("grid_step_ticks must be > 0, got {}", step)));
            }
        }
        Ok(())
    }

    pub fn gesture_config(&self) -> GestureConfig {
        GestureConfig {
            drag_threshold: self.drag_threshold_px,
            rectangle_threshold: self.rectangle_threshold_px,
            rectangle_button: self.rectangle_button,
        }
    }
}
