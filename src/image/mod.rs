//! Image views and owned buffers.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer of interleaved pixels
//! with an explicit stride. The stride counts elements (not pixels) between
//! the starts of consecutive rows, so a stride larger than
//! `width * channels` represents padded rows. ROI slices are zero-copy views
//! into the same backing slice and retain the original stride.

use crate::util::{MultiMatchError, MultiMatchResult};

#[cfg(feature = "image-io")]
pub mod io;

/// Borrowed 2D image view with interleaved channels and an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous single-channel view.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> MultiMatchResult<Self> {
        Self::new(data, width, height, 1, width)
    }

    /// Creates a contiguous view over interleaved multi-channel pixels.
    pub fn from_interleaved(
        data: &'a [T],
        width: usize,
        height: usize,
        channels: usize,
    ) -> MultiMatchResult<Self> {
        let stride = width
            .checked_mul(channels)
            .ok_or(MultiMatchError::InvalidDimensions { width, height })?;
        Self::new(data, width, height, channels, stride)
    }

    /// Creates a view with an explicit channel count and stride.
    pub fn new(
        data: &'a [T],
        width: usize,
        height: usize,
        channels: usize,
        stride: usize,
    ) -> MultiMatchResult<Self> {
        let needed = required_len(width, height, channels, stride)?;
        if data.len() < needed {
            return Err(MultiMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of interleaved channels per pixel.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the number of elements in one unpadded row.
    pub fn row_len(&self) -> usize {
        self.width * self.channels
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the channel values of pixel `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&'a [T]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = y
            .checked_mul(self.stride)?
            .checked_add(x.checked_mul(self.channels)?)?;
        self.data.get(start..start + self.channels)
    }

    /// Returns the first channel of pixel `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        self.pixel(x, y).and_then(|px| px.first())
    }

    /// Returns a contiguous slice for row `y` with length `width * channels`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.row_len())?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> MultiMatchResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(MultiMatchError::InvalidDimensions { width, height });
        }

        let out_of_bounds = MultiMatchError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or_else(|| out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x * self.channels))
            .ok_or(MultiMatchError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        let data = self
            .data
            .get(start..)
            .ok_or(MultiMatchError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;

        ImageView::new(data, width, height, self.channels, self.stride)
    }
}

fn required_len(
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
) -> MultiMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(MultiMatchError::InvalidDimensions { width, height });
    }
    if channels == 0 {
        return Err(MultiMatchError::InvalidChannels { channels });
    }
    let row_len = width
        .checked_mul(channels)
        .ok_or(MultiMatchError::InvalidDimensions { width, height })?;
    if stride < row_len {
        return Err(MultiMatchError::InvalidStride { row_len, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(row_len))
        .ok_or(MultiMatchError::InvalidDimensions { width, height })
}

/// Owned contiguous `u8` image with interleaved channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
}

impl OwnedImage {
    /// Creates a single-channel image from a contiguous buffer.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> MultiMatchResult<Self> {
        Self::interleaved(data, width, height, 1)
    }

    /// Creates an image from a contiguous interleaved buffer.
    ///
    /// The buffer length must equal `width * height * channels` exactly.
    pub fn interleaved(
        data: Vec<u8>,
        width: usize,
        height: usize,
        channels: usize,
    ) -> MultiMatchResult<Self> {
        let needed = required_len(width, height, channels, width.saturating_mul(channels))?;
        if data.len() < needed {
            return Err(MultiMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(MultiMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Copies a (possibly strided) view into a contiguous owned image.
    pub fn from_view(view: ImageView<'_, u8>) -> MultiMatchResult<Self> {
        let row_len = view.row_len();
        let mut data = Vec::with_capacity(row_len * view.height());
        for y in 0..view.height() {
            let row = view.row(y).ok_or(MultiMatchError::BufferTooSmall {
                needed: y * view.stride() + row_len,
                got: view.as_slice().len(),
            })?;
            data.extend_from_slice(row);
        }
        Self::interleaved(data, view.width(), view.height(), view.channels())
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            channels: self.channels,
            stride: self.width * self.channels,
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the contiguous pixel buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the contiguous pixel buffer for in-place edits.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageView, OwnedImage};
    use crate::util::MultiMatchError;

    #[test]
    fn interleaved_roi_keeps_channels_together() {
        // 3x2 RGB image, each pixel value encodes (x, y, channel).
        let mut data = Vec::new();
        for y in 0..2u8 {
            for x in 0..3u8 {
                for c in 0..3u8 {
                    data.push(y * 100 + x * 10 + c);
                }
            }
        }
        let view = ImageView::from_interleaved(&data, 3, 2, 3).unwrap();
        assert_eq!(view.row_len(), 9);

        let roi = view.roi(1, 1, 2, 1).unwrap();
        assert_eq!(roi.channels(), 3);
        assert_eq!(roi.row(0).unwrap(), &[110, 111, 112, 120, 121, 122]);
        assert_eq!(roi.pixel(1, 0).unwrap(), &[120, 121, 122]);
        assert!(roi.pixel(2, 0).is_none());
    }

    #[test]
    fn rejects_zero_channels() {
        let data = [0u8; 4];
        let err = ImageView::new(&data, 2, 2, 0, 2).unwrap_err();
        assert_eq!(err, MultiMatchError::InvalidChannels { channels: 0 });
    }

    #[test]
    fn owned_image_copies_strided_view() {
        let data: Vec<u8> = (0u8..12).collect();
        let view = ImageView::new(&data, 2, 3, 1, 4).unwrap();
        let owned = OwnedImage::from_view(view).unwrap();
        assert_eq!(owned.data(), &[0, 1, 4, 5, 8, 9]);
        assert_eq!(owned.view().stride(), 2);
    }

    #[test]
    fn owned_image_rejects_oversized_buffer() {
        let err = OwnedImage::new(vec![0u8; 5], 2, 2).unwrap_err();
        assert_eq!(
            err,
            MultiMatchError::InvalidDimensions {
                width: 2,
                height: 2
            }
        );
    }
}
