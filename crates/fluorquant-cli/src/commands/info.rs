use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fluorquant_core::io::load_multichannel;
use fluorquant_core::segmentation::threshold::{compute_mean_stddev, value_range};

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let image = load_multichannel(&args.file)?;

    println!("File:        {}", args.file.display());
    println!("Dimensions:  {}x{}", image.width(), image.height());
    println!("Channels:    {}", image.channel_count());

    for (index, data) in image.channels() {
        let (min, max) = value_range(data);
        let (mean, stddev) = compute_mean_stddev(data);
        println!(
            "  Channel {index}:  min {min:.1}  max {max:.1}  mean {mean:.2}  stddev {stddev:.2}"
        );
    }

    Ok(())
}
