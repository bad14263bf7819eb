pub mod config;
mod image_pipeline;
mod orchestrator;
mod types;

pub use config::BatchConfig;
pub use image_pipeline::{choose_threshold, process_image, ProcessedImage};
pub use orchestrator::{run_batch, run_batch_reported};
pub use types::{
    BatchReport, ImageFailure, ImageReport, NoOpReporter, PipelineStage, ProgressReporter,
};
