//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::OwnedImage;
use crate::util::{MultiMatchError, MultiMatchResult};
use std::path::Path;

fn io_error(err: image::ImageError) -> MultiMatchError {
    MultiMatchError::ImageIo {
        reason: err.to_string(),
    }
}

/// Creates an owned single-channel image from a grayscale buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> MultiMatchResult<OwnedImage> {
    OwnedImage::new(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
    )
}

/// Creates an owned three-channel image from an RGB buffer.
pub fn owned_from_rgb_image(img: &image::RgbImage) -> MultiMatchResult<OwnedImage> {
    OwnedImage::interleaved(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
        3,
    )
}

/// Loads an image from disk and converts it to grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> MultiMatchResult<OwnedImage> {
    let img = image::open(path).map_err(io_error)?;
    owned_from_gray_image(&img.to_luma8())
}

/// Loads an image from disk and converts it to interleaved RGB.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> MultiMatchResult<OwnedImage> {
    let img = image::open(path).map_err(io_error)?;
    owned_from_rgb_image(&img.to_rgb8())
}

/// Writes a one- or three-channel image to disk; the format follows the
/// file extension.
pub fn save_image<P: AsRef<Path>>(img: &OwnedImage, path: P) -> MultiMatchResult<()> {
    let color = match img.channels() {
        1 => image::ExtendedColorType::L8,
        3 => image::ExtendedColorType::Rgb8,
        channels => return Err(MultiMatchError::InvalidChannels { channels }),
    };
    let (width, height) = buffer_size(img.width(), img.height())?;
    image::save_buffer(path, img.data(), width, height, color).map_err(io_error)
}

/// Image size as the `u32` pair the `image` crate expects.
fn buffer_size(width: usize, height: usize) -> MultiMatchResult<(u32, u32)> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(MultiMatchError::InvalidDimensions { width, height }),
    }
}

#[cfg(test)]
mod tests {
    use super::buffer_size;
    use crate::util::MultiMatchError;

    #[test]
    fn buffer_size_passes_small_images() {
        assert_eq!(buffer_size(640, 480).unwrap(), (640, 480));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn buffer_size_rejects_dimensions_beyond_u32() {
        let wide = u32::MAX as usize + 1;
        assert_eq!(
            buffer_size(wide, 1).unwrap_err(),
            MultiMatchError::InvalidDimensions {
                width: wide,
                height: 1,
            }
        );
        assert!(buffer_size(1, wide).is_err());
    }
}
