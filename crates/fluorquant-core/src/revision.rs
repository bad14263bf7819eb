use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::error::{QuantError, Result};
use crate::interaction::{Operator, ReviewDecision, RevisionRequest};
use crate::region::{CandidateRegions, FrozenRegions};
use crate::segmentation::{
    build_mask, detect_regions, fill_holes, separate, DetectionConfig, Mask, SeparationConfig,
};

/// Threshold -> hole fill -> watershed separation.
pub fn segment_boundary(
    smoothed: &Array2<f32>,
    threshold: f32,
    separation: &SeparationConfig,
) -> Mask {
    let filled = fill_holes(&build_mask(smoothed, threshold));
    separate(&filled, separation)
}

/// Where the revision loop currently is.
#[derive(Clone, Debug, PartialEq)]
pub enum RevisionState {
    /// A detection pass finished; waiting for the operator's verdict.
    Detected,
    /// The operator asked for another pass with these parameters.
    Revising(RevisionRequest),
    /// The operator is satisfied; manual corrections come next.
    Accepted,
}

/// Outcome of a finished revision loop.
#[derive(Debug)]
pub struct RevisionOutcome {
    pub regions: FrozenRegions,
    /// Threshold in effect when the set was accepted.
    pub threshold: f32,
    pub detection: DetectionConfig,
    /// Number of detection passes, including the first.
    pub passes: usize,
}

/// Drives detection and operator review until the region set is accepted and
/// frozen. The number of passes is not bounded; only the operator ends the
/// loop.
pub struct RevisionController<'a> {
    label: &'a str,
    smoothed: &'a Array2<f32>,
    separation: &'a SeparationConfig,
    threshold: f32,
    detection: DetectionConfig,
    mask: Mask,
    candidates: CandidateRegions,
    state: RevisionState,
    passes: usize,
}

impl<'a> RevisionController<'a> {
    /// Build the mask and run the first detection pass. The controller starts
    /// in [`RevisionState::Detected`].
    pub fn new(
        label: &'a str,
        smoothed: &'a Array2<f32>,
        threshold: f32,
        separation: &'a SeparationConfig,
        detection: DetectionConfig,
    ) -> Self {
        let mask = segment_boundary(smoothed, threshold, separation);
        let candidates = CandidateRegions::new(mask.dim(), detect_regions(&mask, &detection));
        info!(
            label,
            threshold,
            regions = candidates.len(),
            "Initial detection complete"
        );
        Self {
            label,
            smoothed,
            separation,
            threshold,
            detection,
            mask,
            candidates,
            state: RevisionState::Detected,
            passes: 1,
        }
    }

    pub fn state(&self) -> &RevisionState {
        &self.state
    }

    pub fn candidates(&self) -> &CandidateRegions {
        &self.candidates
    }

    /// Advance one transition. `Accepted` is terminal; use [`Self::finish`].
    pub fn step(&mut self, operator: &mut dyn Operator) -> Result<&RevisionState> {
        let next = match std::mem::replace(&mut self.state, RevisionState::Detected) {
            RevisionState::Detected => {
                match operator.review_detection(self.label, &self.candidates) {
                    Some(ReviewDecision::Revise(request)) => RevisionState::Revising(request),
                    // A dismissed prompt counts as "no revision".
                    Some(ReviewDecision::Accept) | None => RevisionState::Accepted,
                    Some(ReviewDecision::AbortBatch) => return Err(QuantError::Aborted),
                }
            }
            RevisionState::Revising(request) => {
                // A rejected request leaves the current set for another review.
                if let Err(e) = self.revise(request) {
                    warn!(label = self.label, error = %e, "Revision rejected");
                }
                RevisionState::Detected
            }
            RevisionState::Accepted => RevisionState::Accepted,
        };
        self.state = next;
        Ok(&self.state)
    }

    /// Step until accepted, apply manual corrections, freeze.
    pub fn run(mut self, operator: &mut dyn Operator) -> Result<RevisionOutcome> {
        while self.state != RevisionState::Accepted {
            self.step(operator)?;
        }
        Ok(self.finish(operator))
    }

    /// Let the operator correct the accepted set, then freeze it.
    pub fn finish(mut self, operator: &mut dyn Operator) -> RevisionOutcome {
        let detected = self.candidates.len();
        operator.correct_regions(self.label, &mut self.candidates);
        if self.candidates.len() != detected {
            debug!(
                label = self.label,
                detected,
                corrected = self.candidates.len(),
                "Manual region corrections applied"
            );
        }
        let regions = self.candidates.freeze();
        info!(
            label = self.label,
            regions = regions.len(),
            passes = self.passes,
            "Region set frozen"
        );
        RevisionOutcome {
            regions,
            threshold: self.threshold,
            detection: self.detection,
            passes: self.passes,
        }
    }

    /// Re-run detection with the requested parameters. Nothing changes unless
    /// the whole request is valid.
    fn revise(&mut self, request: RevisionRequest) -> Result<()> {
        if let Some(ref detection) = request.detection {
            detection.validate()?;
        }
        if let Some(threshold) = request.threshold.filter(|t| !t.is_finite()) {
            return Err(QuantError::InvalidConfig(format!(
                "threshold {threshold} is not a finite value"
            )));
        }

        if let Some(detection) = request.detection {
            self.detection = detection;
        }
        if let Some(threshold) = request.threshold {
            self.threshold = threshold;
            self.mask = segment_boundary(self.smoothed, threshold, self.separation);
        }
        self.candidates.replace(detect_regions(&self.mask, &self.detection));
        self.passes += 1;
        info!(
            label = self.label,
            pass = self.passes,
            threshold = self.threshold,
            regions = self.candidates.len(),
            "Detection re-run"
        );
        Ok(())
    }
}
