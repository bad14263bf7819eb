use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BLUR_SIGMA, DEFAULT_BOUNDARY_CHANNEL, DEFAULT_MAX_AREA, DEFAULT_MAX_CIRCULARITY,
    DEFAULT_MIN_AREA, DEFAULT_MIN_CIRCULARITY, DEFAULT_SIGMA_MULTIPLIER,
    DEFAULT_WATERSHED_TOLERANCE,
};
use crate::error::{QuantError, Result};

/// Rule used to propose a threshold for the boundary channel. The operator
/// may override the proposal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ThresholdMethod {
    /// Threshold = mean + sigma_multiplier * stddev.
    MeanPlusSigma,
    /// Otsu's method over the channel's own intensity range.
    #[default]
    Otsu,
    /// Fixed threshold in raw intensity units.
    Fixed(f32),
}

impl std::fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MeanPlusSigma => write!(f, "Mean + Sigma"),
            Self::Otsu => write!(f, "Otsu"),
            Self::Fixed(v) => write!(f, "Fixed ({v})"),
        }
    }
}

/// Boundary preprocessing and mask construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// 1-based index of the boundary-marker channel.
    #[serde(default = "default_boundary_channel")]
    pub boundary_channel: usize,
    /// Gaussian blur sigma applied before thresholding.
    #[serde(default = "default_blur_sigma")]
    pub blur_sigma: f32,
    #[serde(default)]
    pub threshold_method: ThresholdMethod,
    /// Sigma multiplier for MeanPlusSigma method.
    #[serde(default = "default_sigma_multiplier")]
    pub sigma_multiplier: f32,
}

fn default_boundary_channel() -> usize {
    DEFAULT_BOUNDARY_CHANNEL
}
fn default_blur_sigma() -> f32 {
    DEFAULT_BLUR_SIGMA
}
fn default_sigma_multiplier() -> f32 {
    DEFAULT_SIGMA_MULTIPLIER
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            boundary_channel: DEFAULT_BOUNDARY_CHANNEL,
            blur_sigma: DEFAULT_BLUR_SIGMA,
            threshold_method: ThresholdMethod::default(),
            sigma_multiplier: DEFAULT_SIGMA_MULTIPLIER,
        }
    }
}

/// Watershed separation of touching objects.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeparationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minimum prominence of a distance-map peak, in pixels, for it to keep
    /// its own basin. Lower peaks merge into their higher neighbor.
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,
}

fn default_true() -> bool {
    true
}
fn default_tolerance() -> f32 {
    DEFAULT_WATERSHED_TOLERANCE
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tolerance: DEFAULT_WATERSHED_TOLERANCE,
        }
    }
}

/// Size and shape filter for candidate regions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default = "default_min_area")]
    pub min_area: f64,
    #[serde(default = "default_max_area")]
    pub max_area: f64,
    #[serde(default = "default_min_circularity")]
    pub min_circularity: f64,
    #[serde(default = "default_max_circularity")]
    pub max_circularity: f64,
    /// Drop components whose bounding box touches the image border.
    #[serde(default = "default_true")]
    pub exclude_edges: bool,
}

fn default_min_area() -> f64 {
    DEFAULT_MIN_AREA
}
fn default_max_area() -> f64 {
    DEFAULT_MAX_AREA
}
fn default_min_circularity() -> f64 {
    DEFAULT_MIN_CIRCULARITY
}
fn default_max_circularity() -> f64 {
    DEFAULT_MAX_CIRCULARITY
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_area: DEFAULT_MIN_AREA,
            max_area: DEFAULT_MAX_AREA,
            min_circularity: DEFAULT_MIN_CIRCULARITY,
            max_circularity: DEFAULT_MAX_CIRCULARITY,
            exclude_edges: true,
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_area >= 0.0 && self.min_area <= self.max_area) {
            return Err(QuantError::InvalidConfig(format!(
                "area range [{}, {}] is empty",
                self.min_area, self.max_area
            )));
        }
        let circ_ok = (0.0..=1.0).contains(&self.min_circularity)
            && (0.0..=1.0).contains(&self.max_circularity)
            && self.min_circularity <= self.max_circularity;
        if !circ_ok {
            return Err(QuantError::InvalidConfig(format!(
                "circularity range [{}, {}] must lie within [0, 1]",
                self.min_circularity, self.max_circularity
            )));
        }
        Ok(())
    }

    pub fn accepts(&self, area: f64, circularity: f64) -> bool {
        (self.min_area..=self.max_area).contains(&area)
            && (self.min_circularity..=self.max_circularity).contains(&circularity)
    }
}
