//! Template storage and planning utilities.

use crate::image::{ImageView, OwnedImage};
use crate::util::MultiMatchResult;

mod plan;

pub(crate) use plan::FLAT_VARIANCE;
pub use plan::TemplatePlan;

/// Owned template image with interleaved channels.
#[derive(Clone, Debug)]
pub struct Template {
    img: OwnedImage,
}

impl Template {
    /// Creates a grayscale template from a contiguous buffer.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> MultiMatchResult<Self> {
        let img = OwnedImage::new(data, width, height)?;
        Ok(Self { img })
    }

    /// Creates a template from a contiguous interleaved buffer.
    pub fn interleaved(
        data: Vec<u8>,
        width: usize,
        height: usize,
        channels: usize,
    ) -> MultiMatchResult<Self> {
        let img = OwnedImage::interleaved(data, width, height, channels)?;
        Ok(Self { img })
    }

    /// Copies a template out of a larger image, e.g. a hand-picked patch.
    pub fn from_view(view: ImageView<'_, u8>) -> MultiMatchResult<Self> {
        let img = OwnedImage::from_view(view)?;
        Ok(Self { img })
    }

    /// Returns a borrowed view of the template data.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.img.view()
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.img.width()
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.img.height()
    }

    /// Returns the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.img.channels()
    }
}

impl From<OwnedImage> for Template {
    fn from(img: OwnedImage) -> Self {
        Self { img }
    }
}
