//! Runtime configuration, loaded from JSON.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes. `{}` is a valid config.

use crate::detector::{GradientParams, RectangleParams};
use crate::error::ConfigError;
use crate::protocol::FrameFormat;
use crate::utils::lens::LensCorrection;
use crate::utils::morphology::Kernel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// UART settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub device: PathBuf,
    /// Informational; the platform configures the line
    pub baud_rate: u32,
    pub frame_format: FrameFormat,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/ttyS1"),
            baud_rate: 115_200,
            frame_format: FrameFormat::Current,
        }
    }
}

/// Where the QR reader looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QrSearch {
    /// The whole frame, independent of the rectangle result
    #[default]
    FullFrame,
    /// Only the selected rectangle
    Roi,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gradient: GradientParams,
    pub rectangle: RectangleParams,
    pub serial: SerialConfig,
    pub qr_search: QrSearch,
    /// Barrel correction applied before localization; off when absent
    pub lens: Option<LensCorrection>,
}

impl Config {
    /// Load and validate a JSON config file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty JSON, e.g. to seed a config file
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gradient;
        if g.blur_size % 2 == 0 {
            return invalid(format!("gradient.blur_size must be odd, got {}", g.blur_size));
        }
        check_kernel("gradient.close_kernel", g.close_kernel)?;
        check_kernel("gradient.cleanup_kernel", g.cleanup_kernel)?;

        let r = &self.rectangle;
        if r.block_size < 3 || r.block_size % 2 == 0 {
            return invalid(format!(
                "rectangle.block_size must be odd and >= 3, got {}",
                r.block_size
            ));
        }
        check_kernel("rectangle.close_kernel", r.close_kernel)?;
        if r.min_area > r.max_area {
            return invalid(format!(
                "rectangle.min_area {} exceeds max_area {}",
                r.min_area, r.max_area
            ));
        }
        if r.min_angle_deg >= r.max_angle_deg {
            return invalid(format!(
                "rectangle angle band ({}, {}) is empty",
                r.min_angle_deg, r.max_angle_deg
            ));
        }
        if r.epsilon_factor <= 0.0 {
            return invalid(format!(
                "rectangle.epsilon_factor must be positive, got {}",
                r.epsilon_factor
            ));
        }
        if r.border_margin < 0 {
            return invalid(format!(
                "rectangle.border_margin must not be negative, got {}",
                r.border_margin
            ));
        }

        if let Some(lens) = &self.lens {
            if lens.zoom <= 0.0 {
                return invalid(format!("lens.zoom must be positive, got {}", lens.zoom));
            }
        }
        Ok(())
    }
}

fn invalid(msg: String) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(msg))
}

fn check_kernel(name: &str, k: Kernel) -> Result<(), ConfigError> {
    if k.width == 0 || k.height == 0 {
        return invalid(format!("{name} must not be empty, got {}x{}", k.width, k.height));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = Config::from_json_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.gradient.close_kernel, Kernel::new(21, 7));
        assert_eq!(config.rectangle.block_size, 11);
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.qr_search, QrSearch::FullFrame);
        assert!(config.lens.is_none());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_json_str(
            r#"{
                "rectangle": { "min_area": 500 },
                "serial": { "frame_format": "legacy" },
                "qr_search": "roi",
                "lens": { "strength": 1.2 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.rectangle.min_area, 500.0);
        assert_eq!(config.rectangle.max_area, 80000.0);
        assert_eq!(config.serial.frame_format, FrameFormat::Legacy);
        assert_eq!(config.qr_search, QrSearch::Roi);
        let lens = config.lens.unwrap();
        assert_eq!(lens.strength, 1.2);
        assert_eq!(lens.zoom, 1.0);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        for raw in [
            r#"{"rectangle": {"block_size": 10}}"#,
            r#"{"rectangle": {"block_size": 1}}"#,
            r#"{"rectangle": {"min_area": 9000, "max_area": 100}}"#,
            r#"{"rectangle": {"min_angle_deg": 100, "max_angle_deg": 80}}"#,
            r#"{"rectangle": {"epsilon_factor": 0}}"#,
            r#"{"gradient": {"close_kernel": {"width": 0, "height": 7}}}"#,
            r#"{"gradient": {"blur_size": 8}}"#,
            r#"{"lens": {"zoom": 0}}"#,
        ] {
            assert!(
                matches!(Config::from_json_str(raw), Err(ConfigError::Invalid(_))),
                "accepted {raw}"
            );
        }
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Config::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_and_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let json = Config::default().to_json().unwrap();
        fs::write(&path, json).unwrap();
        assert_eq!(Config::load_json(&path).unwrap(), Config::default());
        assert!(matches!(
            Config::load_json(dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
    }
}
