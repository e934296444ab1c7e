use crate::error::{HarvestError, Result};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

pub struct ImageTransformer;

impl ImageTransformer {
    /// Turn an image into pixel art made of `pixel_size`-wide blocks.
    ///
    /// Nearest-neighbour downscale to `(w / pixel_size, h / pixel_size)`, then
    /// nearest-neighbour upscale back to the original size.
    pub fn pixelate(image: &RgbImage, pixel_size: u32) -> Result<RgbImage> {
        if pixel_size == 0 {
            return Err(HarvestError::invalid_argument("pixel_size must be a positive integer"));
        }

        let (width, height) = image.dimensions();
        let small_width = width / pixel_size;
        let small_height = height / pixel_size;

        if small_width == 0 || small_height == 0 {
            return Err(HarvestError::invalid_argument(format!(
                "pixel_size {} is too large for a {}x{} image",
                pixel_size, width, height
            )));
        }

        let small = imageops::resize(image, small_width, small_height, FilterType::Nearest);
        Ok(imageops::resize(&small, width, height, FilterType::Nearest))
    }

    /// Place two images next to each other on a white canvas, separated by a gap.
    pub fn side_by_side(left: &RgbImage, right: &RgbImage) -> RgbImage {
        const GAP: u32 = 16;
        let width = left.width() + GAP + right.width();
        let height = left.height().max(right.height());

        let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        imageops::replace(&mut canvas, left, 0, 0);
        imageops::replace(&mut canvas, right, (left.width() + GAP) as i64, 0);
        canvas
    }
}
