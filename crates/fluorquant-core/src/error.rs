use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuantError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image {label} has {found} channel(s); boundary channel {required} is missing")]
    MissingBoundaryChannel {
        label: String,
        found: usize,
        required: usize,
    },

    #[error("Channel index {index} out of range (channels: {count})")]
    InvalidChannelIndex { index: usize, count: usize },

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("No input images selected")]
    EmptySelection,

    #[error("Failed to write results to {path}: {source}")]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Batch aborted by operator")]
    Aborted,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl QuantError {
    /// Errors that end the whole batch instead of just the current image.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Aborted | Self::EmptySelection)
    }
}

pub type Result<T> = std::result::Result<T, QuantError>;
