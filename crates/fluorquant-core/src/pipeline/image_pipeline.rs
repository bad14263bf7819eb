use ndarray::Array2;
use tracing::{debug, info};

use crate::consts::WORKFLOW_CHANNEL_COUNT;
use crate::error::{QuantError, Result};
use crate::interaction::{Operator, ThresholdDecision, ThresholdPreview};
use crate::measure::{measure, ResultTable};
use crate::raster::MultiChannelImage;
use crate::revision::RevisionController;
use crate::segmentation::threshold::value_range;
use crate::segmentation::{build_mask, preprocess_boundary, suggest_threshold, SegmentationConfig};

use super::config::BatchConfig;
use super::types::{PipelineStage, ProgressReporter};

/// Result of running one image through segmentation, review and measurement.
#[derive(Debug)]
pub struct ProcessedImage {
    pub table: ResultTable,
    pub threshold: f32,
    pub regions: usize,
    pub passes: usize,
}

/// Run one image through the pipeline.
///
/// Pipeline: boundary check -> Gaussian blur -> threshold (operator
/// confirmed) -> hole fill -> watershed -> detection -> review loop ->
/// measurement. The operator only ever sees `image.label()`.
pub fn process_image(
    image: &MultiChannelImage,
    config: &BatchConfig,
    operator: &mut dyn Operator,
    reporter: &dyn ProgressReporter,
) -> Result<ProcessedImage> {
    let seg = &config.segmentation;
    image.require_boundary_channel(seg.boundary_channel)?;
    let label = image.label();
    if image.channel_count() != WORKFLOW_CHANNEL_COUNT {
        debug!(
            label,
            channels = image.channel_count(),
            "Non-standard channel count; every channel is measured"
        );
    }

    reporter.begin_stage(PipelineStage::Preprocessing);
    let smoothed = preprocess_boundary(image, seg.boundary_channel, seg.blur_sigma)?;

    reporter.begin_stage(PipelineStage::Thresholding);
    let threshold = choose_threshold(label, &smoothed, seg, operator)?;

    reporter.begin_stage(PipelineStage::Segmenting);
    let controller = RevisionController::new(
        label,
        &smoothed,
        threshold,
        &config.separation,
        config.detection.clone(),
    );

    reporter.begin_stage(PipelineStage::Reviewing);
    let outcome = controller.run(operator)?;

    reporter.begin_stage(PipelineStage::Measuring);
    let table = measure(&outcome.regions, image, &config.measurement)?;
    if outcome.regions.is_empty() {
        info!(label, "No qualifying regions; result table will be empty");
    }

    Ok(ProcessedImage {
        table,
        threshold: outcome.threshold,
        regions: outcome.regions.len(),
        passes: outcome.passes,
    })
}

/// Propose a threshold with the configured method and let the operator
/// confirm or override it. A dismissed prompt keeps the proposal.
pub fn choose_threshold(
    label: &str,
    smoothed: &Array2<f32>,
    config: &SegmentationConfig,
    operator: &mut dyn Operator,
) -> Result<f32> {
    let suggested = suggest_threshold(smoothed, &config.threshold_method, config.sigma_multiplier);
    let (min, max) = value_range(smoothed);
    let preview = ThresholdPreview {
        suggested,
        min,
        max,
        foreground_fraction: build_mask(smoothed, suggested).foreground_count() as f64
            / smoothed.len().max(1) as f64,
    };

    let threshold = match operator.adjust_threshold(label, &preview) {
        Some(ThresholdDecision::Use(value)) => value,
        Some(ThresholdDecision::Keep) | None => suggested,
        Some(ThresholdDecision::AbortBatch) => return Err(QuantError::Aborted),
    };

    info!(
        label,
        method = %config.threshold_method,
        suggested,
        threshold,
        "Boundary threshold chosen"
    );
    Ok(threshold)
}
