/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Number of channels in the standard workflow (two measurement channels plus
/// the boundary marker).
pub const WORKFLOW_CHANNEL_COUNT: usize = 3;

/// Default 1-based index of the boundary-marker channel.
pub const DEFAULT_BOUNDARY_CHANNEL: usize = 3;

/// Default Gaussian blur sigma applied to the boundary channel.
pub const DEFAULT_BLUR_SIGMA: f32 = 3.0;

/// Default sigma multiplier for MeanPlusSigma thresholding.
pub const DEFAULT_SIGMA_MULTIPLIER: f32 = 2.0;

/// Number of histogram bins for Otsu's thresholding.
pub const OTSU_HISTOGRAM_BINS: usize = 256;

/// Default prominence (in pixels of distance) a distance-map peak needs to
/// seed its own watershed basin.
pub const DEFAULT_WATERSHED_TOLERANCE: f32 = 0.5;

/// Default minimum region area in pixels.
pub const DEFAULT_MIN_AREA: f64 = 4000.0;

/// Default maximum region area in pixels.
pub const DEFAULT_MAX_AREA: f64 = 50_000.0;

/// Default minimum circularity.
pub const DEFAULT_MIN_CIRCULARITY: f64 = 0.20;

/// Default maximum circularity.
pub const DEFAULT_MAX_CIRCULARITY: f64 = 1.00;

/// Default number of decimal places in result tables.
pub const DEFAULT_PRECISION: usize = 3;

/// Default input file extension.
pub const DEFAULT_INPUT_EXTENSION: &str = "tif";

/// Default result table extension.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "csv";

/// Prefix of blinded working labels.
pub const BLIND_LABEL_PREFIX: &str = "sample-";

/// Exclusive upper bound of the numeric part of a blinded label.
pub const BLIND_LABEL_SPACE: u32 = 1_000_000;
