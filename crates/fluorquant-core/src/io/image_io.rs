use std::path::Path;

use image::{ImageBuffer, Pixel};
use ndarray::Array2;

use crate::error::Result;
use crate::raster::MultiChannelImage;

/// Decodes an input file into a multi-channel raster.
pub trait ImageSource {
    fn load(&self, path: &Path) -> Result<MultiChannelImage>;
}

/// Reads images from disk with the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsImageSource;

impl ImageSource for FsImageSource {
    fn load(&self, path: &Path) -> Result<MultiChannelImage> {
        load_multichannel(path)
    }
}

/// Load an image file, one raster per colour channel.
///
/// Colour images give three channels (alpha is dropped), grey images give
/// one. Values keep their stored range: 0..255 for 8-bit data, 0..65535 for
/// 16-bit data.
pub fn load_multichannel(path: &Path) -> Result<MultiChannelImage> {
    let img = image::open(path)?;
    let color = img.color();
    let bytes_per_sample = color.bytes_per_pixel() / color.channel_count();

    let channels = match (color.has_color(), bytes_per_sample) {
        (true, 1) => split_channels(&img.to_rgb8()),
        (true, 2) => split_channels(&img.to_rgb16()),
        (true, _) => split_channels(&img.to_rgb32f()),
        (false, 1) => split_channels(&img.to_luma8()),
        (false, 2) => split_channels(&img.to_luma16()),
        (false, _) => split_channels(&img.to_luma32f()),
    };

    MultiChannelImage::new(channels, path)
}

fn split_channels<P>(buf: &ImageBuffer<P, Vec<P::Subpixel>>) -> Vec<Array2<f32>>
where
    P: Pixel,
    P::Subpixel: Into<f32>,
{
    let (w, h) = buf.dimensions();
    let mut channels =
        vec![Array2::<f32>::zeros((h as usize, w as usize)); P::CHANNEL_COUNT as usize];
    for (x, y, px) in buf.enumerate_pixels() {
        for (c, &v) in px.channels().iter().enumerate() {
            channels[c][[y as usize, x as usize]] = v.into();
        }
    }
    channels
}
