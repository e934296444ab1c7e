use crate::error::{HarvestError, Result};
use image::RgbImage;
use std::io;
use std::path::Path;

/// Load an image from disk, always as 8-bit RGB.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(HarvestError::unavailable(
            "load image",
            path,
            io::Error::new(io::ErrorKind::NotFound, "image file not found"),
        ));
    }

    let img = image::open(path)?;
    Ok(img.to_rgb8())
}

/// Save an image, creating missing parent directories. The format follows the extension.
pub fn save_image<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| HarvestError::unavailable("create directory", parent, e))?;
    }

    image.save(path)?;
    Ok(())
}

pub fn image_size(image: &RgbImage) -> (u32, u32) {
    image.dimensions()
}
