pub mod components;
pub mod config;
pub mod detector;
pub mod distance;
pub mod mask;
pub mod preprocess;
pub mod threshold;
pub mod watershed;

pub use config::{DetectionConfig, SegmentationConfig, SeparationConfig, ThresholdMethod};
pub use detector::detect_regions;
pub use mask::{build_mask, fill_holes, Mask};
pub use preprocess::preprocess_boundary;
pub use threshold::suggest_threshold;
pub use watershed::separate;
