use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{QuantError, Result};

/// A multi-channel 2-D micrograph.
///
/// Pixel values are raw detector intensities stored as f32 (0..255 for 8-bit
/// sources, 0..65535 for 16-bit sources). Channels are addressed with 1-based
/// indices, matching how channels are numbered in acquisition software.
#[derive(Clone, Debug)]
pub struct MultiChannelImage {
    /// Per-channel pixel data, each row-major with shape = (height, width).
    channels: Vec<Array2<f32>>,
    /// Real source file. Never shown while the image is being processed.
    identity: PathBuf,
    /// Blinded working label used in prompts and log lines.
    label: String,
    /// Physical pixel size, if known.
    pub calibration: Option<Calibration>,
}

impl MultiChannelImage {
    /// Build an image from per-channel rasters. All channels must share the
    /// same non-empty dimensions.
    pub fn new(channels: Vec<Array2<f32>>, identity: impl Into<PathBuf>) -> Result<Self> {
        let (h, w) = channels.first().map(|c| c.dim()).unwrap_or((0, 0));
        if h == 0 || w == 0 || channels.iter().any(|c| c.dim() != (h, w)) {
            return Err(QuantError::InvalidDimensions {
                width: w,
                height: h,
            });
        }
        Ok(Self {
            channels,
            identity: identity.into(),
            label: String::new(),
            calibration: None,
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_calibration(mut self, calibration: Option<Calibration>) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn width(&self) -> usize {
        self.channels[0].ncols()
    }

    pub fn height(&self) -> usize {
        self.channels[0].nrows()
    }

    /// (height, width), the same order `ndarray` uses.
    pub fn dim(&self) -> (usize, usize) {
        self.channels[0].dim()
    }

    /// Pixel data of a channel by 1-based index.
    pub fn channel(&self, index: usize) -> Result<&Array2<f32>> {
        if index == 0 || index > self.channels.len() {
            return Err(QuantError::InvalidChannelIndex {
                index,
                count: self.channels.len(),
            });
        }
        Ok(&self.channels[index - 1])
    }

    /// Iterate channels as (1-based index, data).
    pub fn channels(&self) -> impl Iterator<Item = (usize, &Array2<f32>)> {
        self.channels.iter().enumerate().map(|(i, c)| (i + 1, c))
    }

    /// Check the boundary channel exists.
    pub fn require_boundary_channel(&self, boundary_channel: usize) -> Result<()> {
        if boundary_channel == 0 || self.channels.len() < boundary_channel {
            return Err(QuantError::MissingBoundaryChannel {
                label: self.label.clone(),
                found: self.channels.len(),
                required: boundary_channel,
            });
        }
        Ok(())
    }

    pub fn identity(&self) -> &Path {
        &self.identity
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Physical size of one pixel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub pixel_width: f64,
    pub pixel_height: f64,
    /// Length unit, e.g. "µm".
    pub unit: String,
}

impl Calibration {
    /// Area of a single pixel in `unit`².
    pub fn pixel_area(&self) -> f64 {
        self.pixel_width * self.pixel_height
    }
}
