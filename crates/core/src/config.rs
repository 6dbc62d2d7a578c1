//! Engine configuration
//!
//! Defaults match the shipped app. Configuration can be created in code with
//! the `with_*` builders, loaded from a JSON file, or overridden from
//! environment variables.

use crate::calibration::{CALIBRATION_FLOOR_PX, DEFAULT_CM_PER_PIXEL};
use crate::geometry::Viewport;
use crate::mode::Mode;
use crate::scan::ScanSchedule;
use crate::units::Unit;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const ENV_INITIAL_SCALE: &str = "SNAPMEASURE_INITIAL_SCALE";
pub const ENV_UNIT: &str = "SNAPMEASURE_UNIT";
pub const ENV_MODE: &str = "SNAPMEASURE_MODE";

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid value for a configuration key
    #[error("invalid value for configuration key: {0}")]
    InvalidValue(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for a measurement session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Screen size used for the default point layout and scan snapping
    pub viewport: Viewport,
    /// Centimeters per pixel before any calibration
    pub initial_scale: f64,
    pub initial_unit: Unit,
    pub initial_mode: Mode,
    /// Minimum reference width in pixels accepted by calibration
    pub calibration_floor_px: f64,
    /// Roll (degrees) under which the level reads "Level"
    pub level_tolerance_deg: f64,
    pub scan: ScanSchedule,
    /// Delay before the simulated recognizer "hears" a phrase
    pub voice_listen_ms: u64,
    /// Delay after recognition before listening switches off
    pub voice_reset_ms: u64,
    pub default_label: String,
    /// Fixed RNG seed for reproducible scans and voice phrases
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            initial_scale: DEFAULT_CM_PER_PIXEL,
            initial_unit: Unit::Cm,
            initial_mode: Mode::Distance,
            calibration_floor_px: CALIBRATION_FLOOR_PX,
            level_tolerance_deg: 5.0,
            scan: ScanSchedule::default(),
            voice_listen_ms: 2000,
            voice_reset_ms: 1500,
            default_label: "Package #1".to_string(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_initial_scale(mut self, cm_per_pixel: f64) -> Self {
        self.initial_scale = cm_per_pixel;
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.initial_unit = unit;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.initial_mode = mode;
        self
    }

    pub fn with_scan_schedule(mut self, schedule: ScanSchedule) -> Self {
        self.scan = schedule;
        self
    }

    pub fn with_voice_delays(mut self, listen_ms: u64, reset_ms: u64) -> Self {
        self.voice_listen_ms = listen_ms;
        self.voice_reset_ms = reset_ms;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.default_label = label.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Loads configuration from the environment on top of the defaults.
    ///
    /// Environment variables:
    /// - `SNAPMEASURE_INITIAL_SCALE`: centimeters per pixel (default: 0.05)
    /// - `SNAPMEASURE_UNIT`: `cm`, `m`, `inch` or `ft` (default: cm)
    /// - `SNAPMEASURE_MODE`: initial mode id (default: distance)
    ///
    /// # Errors
    /// Returns an error if any variable holds an invalid value.
    pub fn from_env() -> ConfigResult<Self> {
        Self::default().apply_env()
    }

    /// Override fields from environment variables that are set
    pub fn apply_env(mut self) -> ConfigResult<Self> {
        if let Ok(val) = std::env::var(ENV_INITIAL_SCALE) {
            self.initial_scale = val
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidValue(ENV_INITIAL_SCALE.to_string()))?;
        }

        if let Ok(val) = std::env::var(ENV_UNIT) {
            self.initial_unit = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(ENV_UNIT.to_string()))?;
        }

        if let Ok(val) = std::env::var(ENV_MODE) {
            self.initial_mode = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(ENV_MODE.to_string()))?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Loads configuration from a JSON file.
    ///
    /// Missing keys keep their defaults:
    /// ```json
    /// { "initial_unit": "inch", "scan": { "finalize_ms": 3000 } }
    /// ```
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Parses configuration from a JSON string
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Check values that would break the engine
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.initial_scale.is_finite() && self.initial_scale > 0.0) {
            return Err(ConfigError::InvalidValue("initial_scale".to_string()));
        }
        if !(self.calibration_floor_px.is_finite() && self.calibration_floor_px >= 0.0) {
            return Err(ConfigError::InvalidValue("calibration_floor_px".to_string()));
        }
        if !(self.level_tolerance_deg.is_finite() && self.level_tolerance_deg > 0.0) {
            return Err(ConfigError::InvalidValue("level_tolerance_deg".to_string()));
        }
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(ConfigError::InvalidValue("viewport".to_string()));
        }
        if !self.scan.is_ordered() {
            return Err(ConfigError::InvalidValue("scan".to_string()));
        }
        Ok(())
    }
}
