use crate::pipeline::BatchReport;
use crate::region::CandidateRegions;
use crate::segmentation::DetectionConfig;

/// What the operator sees when asked to confirm the boundary threshold.
#[derive(Clone, Debug)]
pub struct ThresholdPreview {
    /// Value proposed by the configured threshold method.
    pub suggested: f32,
    /// Intensity range of the smoothed boundary channel.
    pub min: f32,
    pub max: f32,
    /// Fraction of pixels that would be foreground at `suggested`.
    pub foreground_fraction: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ThresholdDecision {
    /// Use the suggested value.
    Keep,
    /// Use this value instead.
    Use(f32),
    AbortBatch,
}

/// Parameters for another detection pass. `None` fields keep their current
/// value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RevisionRequest {
    /// New boundary threshold; rebuilds the mask before detecting.
    pub threshold: Option<f32>,
    pub detection: Option<DetectionConfig>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ReviewDecision {
    Accept,
    Revise(RevisionRequest),
    AbortBatch,
}

/// The human in the loop.
///
/// Every call blocks until the operator answers. Images are only ever named
/// by their blinded working label. Returning `None` means the prompt was
/// dismissed without an answer, which is treated as "keep the default".
pub trait Operator {
    /// Called once the mask preview for the suggested threshold is ready.
    fn adjust_threshold(
        &mut self,
        label: &str,
        preview: &ThresholdPreview,
    ) -> Option<ThresholdDecision>;

    /// Called after every detection pass.
    fn review_detection(&mut self, label: &str, regions: &CandidateRegions)
        -> Option<ReviewDecision>;

    /// Manual add/remove of regions before the set is frozen.
    fn correct_regions(&mut self, _label: &str, _regions: &mut CandidateRegions) {}

    /// End-of-batch acknowledgment.
    fn acknowledge_batch(&mut self, _report: &BatchReport) {}
}

/// Accepts every proposal without asking. Used for unattended runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoOperator;

impl Operator for AutoOperator {
    fn adjust_threshold(&mut self, _: &str, _: &ThresholdPreview) -> Option<ThresholdDecision> {
        Some(ThresholdDecision::Keep)
    }

    fn review_detection(&mut self, _: &str, _: &CandidateRegions) -> Option<ReviewDecision> {
        Some(ReviewDecision::Accept)
    }
}
