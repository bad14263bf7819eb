use std::path::PathBuf;

/// Per-image processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Loading,
    Preprocessing,
    Thresholding,
    Segmenting,
    Reviewing,
    Measuring,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading image"),
            Self::Preprocessing => write!(f, "Smoothing boundary"),
            Self::Thresholding => write!(f, "Thresholding"),
            Self::Segmenting => write!(f, "Detecting regions"),
            Self::Reviewing => write!(f, "Awaiting review"),
            Self::Measuring => write!(f, "Measuring"),
            Self::Writing => write!(f, "Writing results"),
        }
    }
}

/// Thread-safe progress reporting for the batch.
///
/// Images are identified by their blinded label only. All methods have
/// default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// Image `index` (0-based) of `total` is starting.
    fn begin_image(&self, _label: &str, _index: usize, _total: usize) {}

    /// A new stage of the current image has started.
    fn begin_stage(&self, _stage: PipelineStage) {}

    /// The current image is done, successfully or not.
    fn finish_image(&self) {}
}

/// No-op progress reporter, used when `run_batch` delegates.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// A successfully processed image.
#[derive(Clone, Debug)]
pub struct ImageReport {
    pub label: String,
    pub source: PathBuf,
    pub output: PathBuf,
    /// Boundary threshold the regions were detected with.
    pub threshold: f32,
    pub regions: usize,
    /// Detection passes, including the first.
    pub passes: usize,
    pub rows: usize,
}

/// An image that was skipped.
#[derive(Clone, Debug)]
pub struct ImageFailure {
    pub label: String,
    pub source: PathBuf,
    pub error: String,
}

/// Summary of a batch run, unblinded.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<ImageReport>,
    pub failures: Vec<ImageFailure>,
    /// The operator stopped the batch early.
    pub aborted: bool,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.processed.len() + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.aborted
    }
}
