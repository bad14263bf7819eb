use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::blinding::BlindingTable;
use crate::error::{QuantError, Result};
use crate::interaction::Operator;
use crate::io::{discover_images, DelimitedTableSink, FsImageSource, ImageSource, TableSink};

use super::config::BatchConfig;
use super::image_pipeline::process_image;
use super::types::{
    BatchReport, ImageFailure, ImageReport, NoOpReporter, PipelineStage, ProgressReporter,
};

/// Process every matching image in `config.input_dir` with the default
/// file-system reader and CSV writer.
pub fn run_batch(config: &BatchConfig, operator: &mut dyn Operator) -> Result<BatchReport> {
    let inputs = discover_images(&config.input_dir, &config.extension)?;
    let mut sink = DelimitedTableSink::default();
    run_batch_reported(
        config,
        &inputs,
        &FsImageSource,
        &mut sink,
        operator,
        Arc::new(NoOpReporter),
    )
}

/// Process `inputs` one image at a time.
///
/// Per image: blind -> load -> segment/review/measure -> write table. Each
/// image's buffers, masks and regions live only inside its own iteration and
/// are released before the next one starts. A failing image is recorded and
/// skipped; an operator abort stops the batch and is reported through
/// `BatchReport::aborted`.
pub fn run_batch_reported(
    config: &BatchConfig,
    inputs: &[PathBuf],
    source: &dyn ImageSource,
    sink: &mut dyn TableSink,
    operator: &mut dyn Operator,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<BatchReport> {
    config.validate()?;
    if inputs.is_empty() {
        return Err(QuantError::EmptySelection);
    }

    let output_dir = config.output_dir();
    std::fs::create_dir_all(output_dir).map_err(|source| QuantError::OutputWriteFailure {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut blinding = match config.blinding_seed {
        Some(seed) => BlindingTable::with_seed(seed),
        None => BlindingTable::new(),
    };
    let mut report = BatchReport::default();
    let total = inputs.len();
    info!(images = total, "Starting batch");

    for (index, path) in inputs.iter().enumerate() {
        let label = blinding.blind(path);
        reporter.begin_image(&label, index, total);

        let result = process_one(
            path,
            &label,
            config,
            &blinding,
            source,
            sink,
            operator,
            reporter.as_ref(),
        );
        reporter.finish_image();

        match result {
            Ok(image_report) => report.processed.push(image_report),
            Err(e) if e.is_fatal() => {
                warn!(label = %label, error = %e, "Batch stopped");
                report.aborted = true;
                return Ok(report);
            }
            Err(e) => {
                warn!(label = %label, error = %e, "Image skipped");
                report.failures.push(ImageFailure {
                    label,
                    source: path.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        processed = report.processed.len(),
        failed = report.failures.len(),
        "Batch complete"
    );
    operator.acknowledge_batch(&report);
    Ok(report)
}

/// One iteration. Everything loaded here is dropped on return, on success and
/// on error alike.
#[allow(clippy::too_many_arguments)]
fn process_one(
    path: &Path,
    label: &str,
    config: &BatchConfig,
    blinding: &BlindingTable,
    source: &dyn ImageSource,
    sink: &mut dyn TableSink,
    operator: &mut dyn Operator,
    reporter: &dyn ProgressReporter,
) -> Result<ImageReport> {
    reporter.begin_stage(PipelineStage::Loading);
    let image = source
        .load(path)?
        .with_label(label)
        .with_calibration(config.calibration.clone());

    let processed = process_image(&image, config, operator, reporter)?;
    drop(image);

    reporter.begin_stage(PipelineStage::Writing);
    let output = blinding.output_path(label, config.output_dir(), &config.output_extension)?;
    sink.write_table(&output, &processed.table)?;
    info!(
        label,
        regions = processed.regions,
        rows = processed.table.len(),
        "Results written"
    );

    Ok(ImageReport {
        label: label.to_string(),
        source: path.to_path_buf(),
        output,
        threshold: processed.threshold,
        regions: processed.regions,
        passes: processed.passes,
        rows: processed.table.len(),
    })
}
