use ndarray::Array2;

use crate::error::Result;
use crate::filters::gaussian_blur::gaussian_blur_array;
use crate::raster::MultiChannelImage;

/// Blur a copy of the boundary channel to stabilize thresholding.
///
/// The image itself is left untouched, so measurement channels (and the raw
/// boundary channel) keep their original intensities.
pub fn preprocess_boundary(
    image: &MultiChannelImage,
    boundary_channel: usize,
    sigma: f32,
) -> Result<Array2<f32>> {
    let boundary = image.channel(boundary_channel)?;
    Ok(gaussian_blur_array(boundary, sigma))
}
