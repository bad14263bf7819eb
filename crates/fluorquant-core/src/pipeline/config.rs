use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_INPUT_EXTENSION, DEFAULT_OUTPUT_EXTENSION};
use crate::error::{QuantError, Result};
use crate::measure::MeasurementConfig;
use crate::raster::Calibration;
use crate::segmentation::{DetectionConfig, SegmentationConfig, SeparationConfig};

/// Everything a batch run needs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Directory scanned for input images.
    pub input_dir: PathBuf,
    /// Where result tables go. Defaults to `input_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Only files with this extension are processed.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Extension of the written result tables.
    #[serde(default = "default_output_extension")]
    pub output_extension: String,
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub separation: SeparationConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub measurement: MeasurementConfig,
    /// Physical pixel size applied to every image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration: Option<Calibration>,
    /// Fixes the blinded label sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blinding_seed: Option<u64>,
}

fn default_extension() -> String {
    DEFAULT_INPUT_EXTENSION.to_string()
}
fn default_output_extension() -> String {
    DEFAULT_OUTPUT_EXTENSION.to_string()
}

impl BatchConfig {
    /// Default settings for images in `input_dir`.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: None,
            extension: default_extension(),
            output_extension: default_output_extension(),
            segmentation: SegmentationConfig::default(),
            separation: SeparationConfig::default(),
            detection: DetectionConfig::default(),
            measurement: MeasurementConfig::default(),
            calibration: None,
            blinding_seed: None,
        }
    }

    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.input_dir)
    }

    pub fn validate(&self) -> Result<()> {
        if self.segmentation.boundary_channel == 0 {
            return Err(QuantError::InvalidConfig(
                "boundary channel index is 1-based".to_string(),
            ));
        }
        if self.output_extension.trim_start_matches('.').is_empty() {
            return Err(QuantError::InvalidConfig(
                "output extension must not be empty".to_string(),
            ));
        }
        if let Some(cal) = &self.calibration {
            if !(cal.pixel_width > 0.0 && cal.pixel_height > 0.0) {
                return Err(QuantError::InvalidConfig(
                    "calibration pixel size must be positive".to_string(),
                ));
            }
        }
        self.detection.validate()
    }
}
