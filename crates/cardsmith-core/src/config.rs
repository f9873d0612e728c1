//! Editor configuration.

use crate::elements::SerializableColor;
use crate::tools::ToolSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Colors offered in the palette.
pub const DEFAULT_PALETTE: [&str; 16] = [
    "#ff1493", "#ff69b4", "#ff6ec7", "#ffb6d9", "#a855f7", "#c4b5fd", "#00e5ff", "#7fffd4", "#7fff00",
    "#ffd700", "#ff6b6b", "#ffffff", "#000000", "#4a0033", "#0891b2", "#c71585",
];

/// Editor configuration. Every field falls back to its default when omitted.
///
/// History depth and export resolution are fixed and cannot be configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Palette as `#rrggbb` strings.
    pub palette: Vec<String>,
    /// Exported files are named `<prefix>-<unix millis>.png`.
    pub export_prefix: String,
    /// Largest side of an imported image after scaling.
    pub import_max_dimension: f64,
    pub tools: ToolSettings,
    /// Fixed RNG seed for reproducible random designs.
    pub seed: Option<u64>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            export_prefix: "birthday-card".to_string(),
            import_max_dimension: 200.0,
            tools: ToolSettings::default(),
            seed: None,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a positive number, got {value}"),
                })
            }
        };
        positive("canvas_width", self.canvas_width)?;
        positive("canvas_height", self.canvas_height)?;
        positive("import_max_dimension", self.import_max_dimension)?;
        if let Some(bad) = self.palette.iter().find(|c| SerializableColor::from_hex(c).is_none()) {
            return Err(ConfigError::Invalid {
                field: "palette",
                reason: format!("not a hex color: {bad}"),
            });
        }
        Ok(())
    }

    /// Palette parsed into colors.
    pub fn palette_colors(&self) -> Vec<SerializableColor> {
        self.palette.iter().filter_map(|c| SerializableColor::from_hex(c)).collect()
    }
}
