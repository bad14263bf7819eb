use ndarray::Array2;
use tracing::debug;

use crate::error::{QuantError, Result};
use crate::raster::{Calibration, MultiChannelImage};
use crate::region::{FrozenRegions, Region};

use super::config::MeasurementConfig;
use super::table::{MeasurementRecord, ResultTable};

/// Measure every frozen region in every channel of the image.
///
/// The boundary channel is measured like any other. Its values are not
/// meaningful as intensities (the regions were cut from it), but keeping the
/// rows makes the table shape independent of which channel drew the
/// boundaries and helps when checking a segmentation.
///
/// Row order: all regions of channel 1 by ascending id, then channel 2, and so
/// on.
pub fn measure(
    regions: &FrozenRegions,
    image: &MultiChannelImage,
    config: &MeasurementConfig,
) -> Result<ResultTable> {
    if regions.dim() != image.dim() {
        let (height, width) = regions.dim();
        return Err(QuantError::InvalidDimensions { width, height });
    }

    let mut records = Vec::with_capacity(regions.len() * image.channel_count());
    for (channel, data) in image.channels() {
        for region in regions.iter() {
            records.push(measure_region(
                region,
                channel,
                data,
                image.calibration.as_ref(),
            ));
        }
    }

    debug!(
        label = image.label(),
        regions = regions.len(),
        rows = records.len(),
        "Measurements complete"
    );

    Ok(ResultTable {
        records,
        columns: config.statistics(),
        precision: config.precision,
    })
}

/// Statistics of one region over one channel.
pub fn measure_region(
    region: &Region,
    channel: usize,
    data: &Array2<f32>,
    calibration: Option<&Calibration>,
) -> MeasurementRecord {
    let mut sum = 0.0f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &(row, col) in region.pixels() {
        let v = data[[row, col]] as f64;
        sum += v;
        min = min.min(v);
        max = max.max(v);
    }

    let count = region.area();
    let mean = if count > 0 { sum / count as f64 } else { 0.0 };
    if count == 0 {
        min = 0.0;
        max = 0.0;
    }
    let area = match calibration {
        Some(cal) => count as f64 * cal.pixel_area(),
        None => count as f64,
    };

    MeasurementRecord {
        region_id: region.id,
        channel,
        area,
        mean,
        min,
        max,
        integrated_density: mean * area,
        raw_integrated_density: sum,
    }
}
