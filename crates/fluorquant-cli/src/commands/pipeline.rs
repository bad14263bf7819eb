use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use fluorquant_core::interaction::{AutoOperator, Operator};
use fluorquant_core::io::{discover_images, DelimitedTableSink, FsImageSource};
use fluorquant_core::pipeline::{
    run_batch_reported, BatchConfig, PipelineStage, ProgressReporter,
};
use fluorquant_core::raster::Calibration;
use fluorquant_core::segmentation::ThresholdMethod;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::operator::TerminalOperator;
use crate::summary::{print_batch_report, print_batch_summary};

#[derive(Clone, Copy, ValueEnum)]
pub enum ThresholdMethodArg {
    Otsu,
    MeanSigma,
}

#[derive(Args)]
pub struct RunArgs {
    /// Directory containing the images to process
    pub dir: PathBuf,

    /// Batch config file (TOML); flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where result tables are written (default: the input directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Extension of the images to process
    #[arg(long)]
    pub ext: Option<String>,

    /// 1-based index of the boundary-marker channel
    #[arg(long)]
    pub boundary_channel: Option<usize>,

    /// Gaussian blur sigma for the boundary channel
    #[arg(long)]
    pub sigma: Option<f32>,

    /// Rule that proposes the boundary threshold
    #[arg(long, value_enum)]
    pub method: Option<ThresholdMethodArg>,

    /// Sigma multiplier for the mean-sigma rule
    #[arg(long)]
    pub sigma_multiplier: Option<f32>,

    /// Fixed boundary threshold (overrides --method)
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Minimum region area in pixels
    #[arg(long)]
    pub min_area: Option<f64>,

    /// Maximum region area in pixels
    #[arg(long)]
    pub max_area: Option<f64>,

    /// Minimum circularity (0-1)
    #[arg(long)]
    pub min_circularity: Option<f64>,

    /// Maximum circularity (0-1)
    #[arg(long)]
    pub max_circularity: Option<f64>,

    /// Keep regions touching the image border
    #[arg(long)]
    pub keep_edges: bool,

    /// Disable watershed separation of touching regions
    #[arg(long)]
    pub no_separate: bool,

    /// Minimum peak prominence for watershed separation, in pixels
    #[arg(long)]
    pub tolerance: Option<f32>,

    /// Decimal places in the result tables
    #[arg(long)]
    pub precision: Option<usize>,

    /// Pixel size as <width>x<height> in physical units
    #[arg(long)]
    pub pixel_size: Option<String>,

    /// Unit of --pixel-size
    #[arg(long, default_value = "um")]
    pub unit: String,

    /// Seed for the blinded label sequence
    #[arg(long)]
    pub seed: Option<u64>,

    /// Accept every proposal without prompting
    #[arg(short, long)]
    pub yes: bool,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = load_config(args)?;
    config.validate()?;

    let inputs = discover_images(&config.input_dir, &config.extension)
        .with_context(|| format!("Failed to list {}", config.input_dir.display()))?;
    info!(
        images = inputs.len(),
        interactive = !args.yes,
        "Input images discovered"
    );
    print_batch_summary(&config, inputs.len());

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:40} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let reporter = Arc::new(BarReporter::new(pb.clone()));

    let mut operator: Box<dyn Operator> = if args.yes {
        Box::new(AutoOperator)
    } else {
        Box::new(TerminalOperator::new(pb.clone(), config.detection.clone()))
    };

    let mut sink = DelimitedTableSink::default();
    let report = run_batch_reported(
        &config,
        &inputs,
        &FsImageSource,
        &mut sink,
        operator.as_mut(),
        reporter,
    )?;
    pb.finish_with_message("Done");

    print_batch_report(&report);
    if report.aborted {
        println!("Batch aborted after {} image(s)", report.total());
    } else {
        println!(
            "{} of {} image(s) processed",
            report.processed.len(),
            report.total()
        );
    }

    Ok(())
}

fn load_config(args: &RunArgs) -> Result<BatchConfig> {
    let mut config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid batch config")?
    } else {
        BatchConfig::new(&args.dir)
    };
    config.input_dir = args.dir.clone();
    apply_overrides(args, &mut config)?;
    Ok(config)
}

fn apply_overrides(args: &RunArgs, config: &mut BatchConfig) -> Result<()> {
    if let Some(ref dir) = args.output_dir {
        config.output_dir = Some(dir.clone());
    }
    if let Some(ref ext) = args.ext {
        config.extension = ext.clone();
    }

    let seg = &mut config.segmentation;
    if let Some(channel) = args.boundary_channel {
        seg.boundary_channel = channel;
    }
    if let Some(sigma) = args.sigma {
        seg.blur_sigma = sigma;
    }
    if let Some(method) = args.method {
        seg.threshold_method = match method {
            ThresholdMethodArg::Otsu => ThresholdMethod::Otsu,
            ThresholdMethodArg::MeanSigma => ThresholdMethod::MeanPlusSigma,
        };
    }
    if let Some(k) = args.sigma_multiplier {
        seg.sigma_multiplier = k;
    }
    if let Some(t) = args.threshold {
        seg.threshold_method = ThresholdMethod::Fixed(t);
    }

    let det = &mut config.detection;
    if let Some(v) = args.min_area {
        det.min_area = v;
    }
    if let Some(v) = args.max_area {
        det.max_area = v;
    }
    if let Some(v) = args.min_circularity {
        det.min_circularity = v;
    }
    if let Some(v) = args.max_circularity {
        det.max_circularity = v;
    }
    if args.keep_edges {
        det.exclude_edges = false;
    }

    if args.no_separate {
        config.separation.enabled = false;
    }
    if let Some(tolerance) = args.tolerance {
        config.separation.tolerance = tolerance;
    }
    if let Some(precision) = args.precision {
        config.measurement.precision = precision;
    }
    if let Some(ref size) = args.pixel_size {
        config.calibration = Some(parse_pixel_size(size, &args.unit)?);
    }
    if args.seed.is_some() {
        config.blinding_seed = args.seed;
    }
    Ok(())
}

/// `0.65` or `0.65x0.5`.
fn parse_pixel_size(size: &str, unit: &str) -> Result<Calibration> {
    let parse = |s: &str| -> Result<f64> {
        s.trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid pixel size {size}"))
    };
    let (w, h) = match size.split_once('x') {
        Some((w, h)) => (parse(w)?, parse(h)?),
        None => {
            let v = parse(size)?;
            (v, v)
        }
    };
    if !(w > 0.0 && h > 0.0) {
        bail!("Pixel size must be positive, got {size}");
    }
    Ok(Calibration {
        pixel_width: w,
        pixel_height: h,
        unit: unit.to_string(),
    })
}

/// Progress bar over images; the message shows the blinded label and stage.
struct BarReporter {
    pb: ProgressBar,
    label: Mutex<String>,
}

impl BarReporter {
    fn new(pb: ProgressBar) -> Self {
        Self {
            pb,
            label: Mutex::new(String::new()),
        }
    }
}

impl ProgressReporter for BarReporter {
    fn begin_image(&self, label: &str, index: usize, _total: usize) {
        if let Ok(mut current) = self.label.lock() {
            *current = label.to_string();
        }
        self.pb.set_position(index as u64);
        self.pb.set_message(label.to_string());
    }

    fn begin_stage(&self, stage: PipelineStage) {
        let label = self.label.lock().map(|l| l.clone()).unwrap_or_default();
        self.pb.set_message(format!("{label}: {stage}"));
    }

    fn finish_image(&self) {
        self.pb.inc(1);
    }
}
