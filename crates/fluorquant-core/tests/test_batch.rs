mod common;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fluorquant_core::error::{QuantError, Result};
use fluorquant_core::interaction::{ReviewDecision, RevisionRequest, ThresholdDecision};
use fluorquant_core::io::{discover_images, ImageSource, TableSink};
use fluorquant_core::measure::ResultTable;
use fluorquant_core::pipeline::{
    run_batch, run_batch_reported, BatchConfig, PipelineStage, ProgressReporter,
};
use fluorquant_core::raster::MultiChannelImage;
use fluorquant_core::segmentation::DetectionConfig;

use common::{disk_image, save_gray16, save_rgb16, ScriptedOperator, SCENE_H, SCENE_W, TWO_CELLS};

/// Input directory with two good images, one single-channel image and a
/// stray text file.
fn populate(dir: &Path) {
    let scene = disk_image(SCENE_H, SCENE_W, &TWO_CELLS);
    save_rgb16(&scene, &dir.join("a_control.tif"));
    save_gray16(scene.channel(3).unwrap(), &dir.join("b_gray.tif"));
    save_rgb16(&scene, &dir.join("c_treated.tif"));
    std::fs::write(dir.join("notes.txt"), "not an image").unwrap();
}

fn config_for(input: &Path, output: &Path) -> BatchConfig {
    let mut config = BatchConfig::new(input);
    config.output_dir = Some(output.to_path_buf());
    config.blinding_seed = Some(11);
    config
}

#[test]
fn test_batch_skips_bad_image_and_continues() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate(input.path());

    let config = config_for(input.path(), output.path());
    let mut operator = ScriptedOperator::default();
    let report = run_batch(&config, &mut operator).unwrap();

    assert!(!report.aborted);
    assert_eq!(report.total(), 3);
    assert_eq!(report.processed.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert!(!report.is_clean());

    let failure = &report.failures[0];
    assert!(failure.source.ends_with("b_gray.tif"));
    assert!(failure.error.contains("boundary"), "error: {}", failure.error);

    for image in &report.processed {
        assert_eq!(image.regions, 2);
        assert_eq!(image.rows, 6);
        assert_eq!(image.passes, 1);
    }

    assert!(output.path().join("a_control.csv").is_file());
    assert!(output.path().join("c_treated.csv").is_file());
    assert!(!output.path().join("b_gray.csv").exists());
    assert!(!output.path().join("notes.csv").exists());

    let text = std::fs::read_to_string(output.path().join("a_control.csv")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], "Channel,Area,Mean,Min,Max,IntDen,RawIntDen");
    assert!(lines[1].starts_with("1,"));
    assert!(lines[6].starts_with("3,"));

    let acknowledged = operator.acknowledged.expect("batch acknowledged");
    assert_eq!(acknowledged.total(), 3);
}

#[test]
fn test_operator_never_sees_real_names() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate(input.path());

    let config = config_for(input.path(), output.path());
    let mut operator = ScriptedOperator::default();
    let report = run_batch(&config, &mut operator).unwrap();

    assert!(!operator.seen_labels.is_empty());
    for label in &operator.seen_labels {
        assert!(label.starts_with("sample-"), "label {label}");
        for real in ["a_control", "b_gray", "c_treated"] {
            assert!(!label.contains(real));
        }
    }
    let reported: Vec<&str> = report.processed.iter().map(|r| r.label.as_str()).collect();
    for label in &operator.seen_labels {
        assert!(reported.contains(&label.as_str()));
    }
}

#[test]
fn test_empty_selection() {
    let input = tempfile::tempdir().unwrap();
    std::fs::write(input.path().join("readme.md"), "nothing here").unwrap();
    let config = BatchConfig::new(input.path());
    let mut operator = ScriptedOperator::default();
    let err = run_batch(&config, &mut operator).unwrap_err();
    assert!(matches!(err, QuantError::EmptySelection));
    assert!(operator.acknowledged.is_none());
}

#[test]
fn test_discovery_filters_and_sorts() {
    let input = tempfile::tempdir().unwrap();
    for name in ["z.TIF", "a.tif", "m.png", "b.tiff"] {
        std::fs::write(input.path().join(name), b"").unwrap();
    }
    std::fs::create_dir(input.path().join("dir.tif")).unwrap();

    let found = discover_images(input.path(), ".tif").unwrap();
    let names: Vec<&str> = found
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a.tif", "z.TIF"]);
}

#[test]
fn test_abort_stops_batch_without_acknowledgment() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate(input.path());

    let config = config_for(input.path(), output.path());
    let mut operator = ScriptedOperator::default();
    operator
        .thresholds
        .push_back(Some(ThresholdDecision::AbortBatch));
    let report = run_batch(&config, &mut operator).unwrap();

    assert!(report.aborted);
    assert!(report.processed.is_empty());
    assert!(operator.acknowledged.is_none());
    assert!(!output.path().join("a_control.csv").exists());
}

#[test]
fn test_abort_after_first_image_keeps_its_output() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate(input.path());

    let config = config_for(input.path(), output.path());
    let mut operator = ScriptedOperator::default();
    // Image a is accepted, b fails before any prompt, c is aborted at review.
    operator.reviews.push_back(Some(ReviewDecision::Accept));
    operator.reviews.push_back(Some(ReviewDecision::AbortBatch));
    let report = run_batch(&config, &mut operator).unwrap();

    assert!(report.aborted);
    assert_eq!(report.processed.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(output.path().join("a_control.csv").is_file());
    assert!(!output.path().join("c_treated.csv").exists());
}

#[test]
fn test_invalid_revision_keeps_image() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate(input.path());

    let config = config_for(input.path(), output.path());
    let mut operator = ScriptedOperator::default();
    operator
        .reviews
        .push_back(Some(ReviewDecision::Revise(RevisionRequest {
            threshold: None,
            detection: Some(DetectionConfig {
                min_area: 10.0,
                max_area: 1.0,
                ..Default::default()
            }),
        })));
    let report = run_batch(&config, &mut operator).unwrap();

    assert_eq!(report.processed.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].source.ends_with("b_gray.tif"));
    assert_eq!(report.processed[0].regions, 2);
    assert_eq!(report.processed[0].passes, 1);
    assert!(output.path().join("a_control.csv").is_file());
    // Rejected request, re-review, then the second image.
    assert_eq!(operator.review_counts, vec![2, 2, 2]);
}

#[test]
fn test_unwritable_output_dir() {
    let input = tempfile::tempdir().unwrap();
    populate(input.path());
    let blocker = input.path().join("occupied");
    std::fs::write(&blocker, "file, not a directory").unwrap();

    let config = config_for(input.path(), &blocker);
    let mut operator = ScriptedOperator::default();
    let err = run_batch(&config, &mut operator).unwrap_err();
    assert!(matches!(err, QuantError::OutputWriteFailure { .. }), "got {err:?}");
}

// ---------------------------------------------------------------------------
// In-memory collaborators
// ---------------------------------------------------------------------------

struct SyntheticSource;

impl ImageSource for SyntheticSource {
    fn load(&self, path: &Path) -> Result<MultiChannelImage> {
        let scene = disk_image(SCENE_H, SCENE_W, &TWO_CELLS);
        let channels = (1..=3)
            .map(|i| scene.channel(i).cloned())
            .collect::<Result<Vec<_>>>()?;
        MultiChannelImage::new(channels, path)
    }
}

#[derive(Default)]
struct MemorySink {
    tables: Vec<(PathBuf, ResultTable)>,
}

impl TableSink for MemorySink {
    fn write_table(&mut self, path: &Path, table: &ResultTable) -> Result<()> {
        self.tables.push((path.to_path_buf(), table.clone()));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingReporter {
    images: Mutex<Vec<(String, usize, usize)>>,
    stages: Mutex<Vec<PipelineStage>>,
}

impl ProgressReporter for RecordingReporter {
    fn begin_image(&self, label: &str, index: usize, total: usize) {
        self.images
            .lock()
            .unwrap()
            .push((label.to_string(), index, total));
    }

    fn begin_stage(&self, stage: PipelineStage) {
        self.stages.lock().unwrap().push(stage);
    }
}

#[test]
fn test_custom_source_sink_and_reporter() {
    let output = tempfile::tempdir().unwrap();
    let inputs = vec![
        PathBuf::from("/virtual/first.tif"),
        PathBuf::from("/virtual/second.tif"),
    ];
    let config = config_for(Path::new("/virtual"), output.path());
    let mut sink = MemorySink::default();
    let reporter = Arc::new(RecordingReporter::default());
    let mut operator = ScriptedOperator::default();
    operator
        .thresholds
        .push_back(Some(ThresholdDecision::Use(105.0)));

    let report = run_batch_reported(
        &config,
        &inputs,
        &SyntheticSource,
        &mut sink,
        &mut operator,
        reporter.clone(),
    )
    .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.processed[0].threshold, 105.0);
    assert_eq!(operator.previews.len(), 2);

    let written: Vec<PathBuf> = sink.tables.iter().map(|(p, _)| p.clone()).collect();
    assert_eq!(
        written,
        vec![
            output.path().join("first.csv"),
            output.path().join("second.csv")
        ]
    );
    assert_eq!(sink.tables[0].1.len(), 6);

    let images = reporter.images.lock().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!((images[0].1, images[0].2), (0, 2));
    assert_eq!((images[1].1, images[1].2), (1, 2));
    assert!(images.iter().all(|(label, _, _)| label.starts_with("sample-")));

    let stages = reporter.stages.lock().unwrap();
    assert_eq!(
        &stages[..7],
        &[
            PipelineStage::Loading,
            PipelineStage::Preprocessing,
            PipelineStage::Thresholding,
            PipelineStage::Segmenting,
            PipelineStage::Reviewing,
            PipelineStage::Measuring,
            PipelineStage::Writing,
        ]
    );
}

#[test]
fn test_invalid_config_rejected_before_any_work() {
    let output = tempfile::tempdir().unwrap();
    let mut config = config_for(Path::new("/virtual"), output.path());
    config.segmentation.boundary_channel = 0;
    let mut sink = MemorySink::default();
    let mut operator = ScriptedOperator::default();

    let err = run_batch_reported(
        &config,
        &[PathBuf::from("/virtual/x.tif")],
        &SyntheticSource,
        &mut sink,
        &mut operator,
        Arc::new(RecordingReporter::default()),
    )
    .unwrap_err();
    assert!(matches!(err, QuantError::InvalidConfig(_)));
    assert!(sink.tables.is_empty());
}
