use console::Style;
use fluorquant_core::pipeline::{BatchConfig, BatchReport};
use fluorquant_core::segmentation::ThresholdMethod;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    error: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            error: Style::new().red(),
        }
    }
}

pub fn print_batch_summary(config: &BatchConfig, images: usize) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("FluorQuant Batch"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(16)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output_dir().display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Images"),
        s.value.apply_to(format!("{images} x .{}", config.extension))
    );
    println!();

    // Segmentation
    let seg = &config.segmentation;
    println!("  {}", s.header.apply_to("Segmentation"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Boundary"),
        s.value.apply_to(format!("channel {}", seg.boundary_channel))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Blur"),
        s.value.apply_to(format!("sigma {}", seg.blur_sigma))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Threshold"),
        s.method.apply_to(&seg.threshold_method)
    );
    if seg.threshold_method == ThresholdMethod::MeanPlusSigma {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Sigma x"),
            s.value.apply_to(seg.sigma_multiplier)
        );
    }
    if config.separation.enabled {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Watershed"),
            s.value.apply_to(format!("tolerance {}", config.separation.tolerance))
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Watershed"),
            s.disabled.apply_to("disabled")
        );
    }
    println!();

    // Detection
    let det = &config.detection;
    println!("  {}", s.header.apply_to("Detection"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Area"),
        s.value.apply_to(format!("{}-{} px", det.min_area, det.max_area))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Circularity"),
        s.value.apply_to(format!(
            "{:.2}-{:.2}",
            det.min_circularity, det.max_circularity
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Edges"),
        if det.exclude_edges {
            s.value.apply_to("excluded")
        } else {
            s.disabled.apply_to("kept")
        }
    );
    println!();

    // Measurement
    let columns: Vec<&str> = config
        .measurement
        .statistics()
        .iter()
        .map(|stat| stat.header())
        .collect();
    println!("  {}", s.header.apply_to("Measurement"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Columns"),
        s.value.apply_to(columns.join(", "))
    );
    match &config.calibration {
        Some(cal) => println!(
            "    {:<12}{}",
            s.label.apply_to("Pixel"),
            s.value.apply_to(format!(
                "{} x {} {}",
                cal.pixel_width, cal.pixel_height, cal.unit
            ))
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Pixel"),
            s.disabled.apply_to("uncalibrated")
        ),
    }
    println!();
}

/// Unblinded per-image results, printed once the batch is over.
pub fn print_batch_report(report: &BatchReport) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Results"));
    for image in &report.processed {
        println!(
            "    {:<16}{}  {}",
            s.label.apply_to(&image.label),
            s.path.apply_to(image.source.display()),
            s.value.apply_to(format!(
                "{} region(s), threshold {:.2}, {} pass(es) -> {}",
                image.regions,
                image.threshold,
                image.passes,
                image.output.display()
            ))
        );
    }
    for failure in &report.failures {
        println!(
            "    {:<16}{}  {}",
            s.label.apply_to(&failure.label),
            s.path.apply_to(failure.source.display()),
            s.error.apply_to(&failure.error)
        );
    }
    if report.aborted {
        println!("    {}", s.disabled.apply_to("batch aborted by operator"));
    }
    println!();
}
