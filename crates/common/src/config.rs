//! Application configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default recording settings.
    pub recording: RecordingDefaults,

    /// Landmark-pair table used to derive blendshape signals.
    pub mapping: MappingConfig,

    /// Rig channel names and shape-key calibration.
    pub rig: RigConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default recording parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingDefaults {
    /// Capture cadence in frames per second.
    pub fps: u32,

    /// Where the animation log is written.
    pub output_path: PathBuf,

    /// Apply each frame to the bound rig while capturing.
    pub real_time_preview: bool,

    /// Abort the session on the first malformed frame instead of dropping it.
    pub abort_on_malformed: bool,

    /// Exponential smoothing strength in `[0.0, 1.0]` (0 disables smoothing).
    pub smoothing: f64,
}

/// Blendshape mapping table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Feature name to the landmark index pair whose distance drives it.
    pub features: BTreeMap<String, [usize; 2]>,

    /// Landmark count produced by the tracking model, if known up front.
    pub landmark_count: Option<usize>,

    /// Expression coefficient count produced by the tracking model, if known.
    pub expression_len: Option<usize>,
}

/// Rig binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Channel name (`head`, `neck`, `head_location`) to host bone name.
    pub bone_targets: BTreeMap<String, String>,

    /// Feature name to host shape-key name.
    pub shape_targets: BTreeMap<String, String>,

    /// Multiplier applied to tracked translation before it is written to a location channel.
    pub translation_scale: f64,

    /// Per-feature calibration turning raw landmark distances into `[0, 1]` weights.
    pub calibration: BTreeMap<String, CalibrationConfig>,

    /// Animation frame rate of the host scene.
    pub fps: u32,
}

/// Raw-distance range for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Distance observed on a neutral face (weight 0).
    pub neutral: f64,
    /// Distance at full activation (weight 1).
    pub full: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "facerig=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recording: RecordingDefaults::default(),
            mapping: MappingConfig::default(),
            rig: RigConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RecordingDefaults {
    fn default() -> Self {
        Self {
            fps: 30,
            output_path: PathBuf::from("facial_animation.json"),
            real_time_preview: true,
            abort_on_malformed: false,
            smoothing: 0.0,
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        let features = [
            ("brow_up", [0, 1]),
            ("brow_down", [2, 3]),
            ("eye_blink_left", [6, 18]),
            ("mouth_open", [90, 102]),
            ("mouth_wide", [48, 66]),
        ]
        .into_iter()
        .map(|(name, pair)| (name.to_string(), pair))
        .collect();

        Self {
            features,
            landmark_count: None,
            expression_len: None,
        }
    }
}

impl Default for RigConfig {
    fn default() -> Self {
        let bone_targets = [("head", "head"), ("neck", "neck")]
            .into_iter()
            .map(|(channel, bone)| (channel.to_string(), bone.to_string()))
            .collect();

        let shape_targets = [
            ("eye_blink_left", "eye_blink.L"),
            ("eye_blink_right", "eye_blink.R"),
            ("mouth_open", "mouth_open"),
            ("mouth_wide", "mouth_wide"),
            ("brow_up_left", "brow_up.L"),
            ("brow_up_right", "brow_up.R"),
        ]
        .into_iter()
        .map(|(feature, key)| (feature.to_string(), key.to_string()))
        .collect();

        Self {
            bone_targets,
            shape_targets,
            translation_scale: 1.0,
            calibration: BTreeMap::new(),
            fps: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("facerig").join("config.json")
}
