#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;

use image::{ImageBuffer, Luma, Rgb};
use ndarray::Array2;

use fluorquant_core::interaction::{
    Operator, ReviewDecision, ThresholdDecision, ThresholdPreview,
};
use fluorquant_core::pipeline::BatchReport;
use fluorquant_core::raster::MultiChannelImage;
use fluorquant_core::region::CandidateRegions;
use fluorquant_core::segmentation::Mask;

/// Boundary-channel intensity inside objects.
pub const OBJECT_LEVEL: f32 = 200.0;
/// Boundary-channel intensity of the background.
pub const BACKGROUND_LEVEL: f32 = 10.0;

/// Mask with filled disks at (center_row, center_col, radius).
pub fn disk_mask(h: usize, w: usize, disks: &[(f64, f64, f64)]) -> Mask {
    Mask::new(Array2::from_shape_fn((h, w), |(r, c)| in_any_disk(r, c, disks)))
}

pub fn in_any_disk(r: usize, c: usize, disks: &[(f64, f64, f64)]) -> bool {
    disks.iter().any(|&(cy, cx, rad)| {
        let dy = r as f64 - cy;
        let dx = c as f64 - cx;
        dy * dy + dx * dx <= rad * rad
    })
}

/// Three-channel image whose boundary channel (3) shows the disks.
///
/// Channel 1 is 100 inside disks and 20 outside, with a small row-dependent
/// ripple so min/max differ. Channel 2 is a constant 40.
pub fn disk_image(h: usize, w: usize, disks: &[(f64, f64, f64)]) -> MultiChannelImage {
    let ch1 = Array2::from_shape_fn((h, w), |(r, c)| {
        let base = if in_any_disk(r, c, disks) { 100.0 } else { 20.0 };
        base + (r % 5) as f32
    });
    let ch2 = Array2::from_elem((h, w), 40.0f32);
    let ch3 = Array2::from_shape_fn((h, w), |(r, c)| {
        if in_any_disk(r, c, disks) {
            OBJECT_LEVEL
        } else {
            BACKGROUND_LEVEL
        }
    });
    MultiChannelImage::new(vec![ch1, ch2, ch3], "synthetic.tif")
        .unwrap()
        .with_label("sample-000001")
}

/// The standard two-cell test scene: two separate disks of radius 45.
pub const TWO_CELLS: [(f64, f64, f64); 2] = [(100.0, 90.0, 45.0), (100.0, 230.0, 45.0)];
pub const SCENE_H: usize = 200;
pub const SCENE_W: usize = 320;

/// Write the first three channels as a 16-bit RGB TIFF.
pub fn save_rgb16(image: &MultiChannelImage, path: &Path) {
    let (h, w) = image.dim();
    let channels: Vec<&Array2<f32>> = (1..=3).map(|i| image.channel(i).unwrap()).collect();
    let mut pixels = Vec::with_capacity(h * w * 3);
    for row in 0..h {
        for col in 0..w {
            for ch in &channels {
                pixels.push(ch[[row, col]].round().clamp(0.0, 65535.0) as u16);
            }
        }
    }
    let img = ImageBuffer::<Rgb<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .expect("buffer size matches dimensions");
    img.save(path).expect("save rgb tiff");
}

/// Write a single-channel 16-bit image.
pub fn save_gray16(data: &Array2<f32>, path: &Path) {
    let (h, w) = data.dim();
    let pixels: Vec<u16> = data.iter().map(|&v| v.round().clamp(0.0, 65535.0) as u16).collect();
    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .expect("buffer size matches dimensions");
    img.save(path).expect("save gray image");
}

/// Operator that replays queued answers and records what it was shown.
#[derive(Default)]
pub struct ScriptedOperator {
    pub thresholds: VecDeque<Option<ThresholdDecision>>,
    /// Answers to review prompts; once exhausted every review is accepted.
    pub reviews: VecDeque<Option<ReviewDecision>>,
    /// Region ids removed during manual correction.
    pub remove_ids: Vec<u32>,
    /// Pixel sets added during manual correction.
    pub add_regions: Vec<Vec<(usize, usize)>>,
    /// Every label passed to any prompt, in call order.
    pub seen_labels: Vec<String>,
    /// Candidate counts shown at each review prompt.
    pub review_counts: Vec<usize>,
    pub previews: Vec<ThresholdPreview>,
    pub acknowledged: Option<BatchReport>,
}

impl Operator for ScriptedOperator {
    fn adjust_threshold(
        &mut self,
        label: &str,
        preview: &ThresholdPreview,
    ) -> Option<ThresholdDecision> {
        self.seen_labels.push(label.to_string());
        self.previews.push(preview.clone());
        self.thresholds
            .pop_front()
            .unwrap_or(Some(ThresholdDecision::Keep))
    }

    fn review_detection(
        &mut self,
        label: &str,
        regions: &CandidateRegions,
    ) -> Option<ReviewDecision> {
        self.seen_labels.push(label.to_string());
        self.review_counts.push(regions.len());
        self.reviews
            .pop_front()
            .unwrap_or(Some(ReviewDecision::Accept))
    }

    fn correct_regions(&mut self, label: &str, regions: &mut CandidateRegions) {
        self.seen_labels.push(label.to_string());
        for id in &self.remove_ids {
            regions.remove(*id);
        }
        for pixels in self.add_regions.drain(..) {
            regions.insert_pixels(pixels).unwrap();
        }
    }

    fn acknowledge_batch(&mut self, report: &BatchReport) {
        self.acknowledged = Some(report.clone());
    }
}
