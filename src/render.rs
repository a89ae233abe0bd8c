//! Overlay rendering of detections.
//!
//! Detections of the same template share a color picked from a fixed
//! palette by `template_index % palette.len()`. Labels drive the legend;
//! unlabelled detections are drawn but never listed.

use crate::detection::Detection;
use crate::image::OwnedImage;
use crate::util::{MultiMatchError, MultiMatchResult};
use crate::ImageView;

/// 8-bit RGB triple.
pub type Rgb = [u8; 3];

/// The 12-color qualitative "Set3" palette.
pub const SET3_PALETTE: [Rgb; 12] = [
    [141, 211, 199],
    [255, 255, 179],
    [190, 186, 218],
    [251, 128, 114],
    [128, 177, 211],
    [253, 180, 98],
    [179, 222, 105],
    [252, 205, 229],
    [217, 217, 217],
    [188, 128, 189],
    [204, 235, 197],
    [255, 237, 111],
];

/// Palette slot for a template. An empty palette maps everything to 0.
pub fn color_index(template_index: usize, palette_size: usize) -> usize {
    if palette_size == 0 {
        return 0;
    }
    template_index % palette_size
}

/// Legend rows as `(label, color)`, one per distinct non-empty label, in
/// order of first appearance. A label shared by several templates takes the
/// color of its last detection.
pub fn legend_entries(detections: &[Detection], palette: &[Rgb]) -> Vec<(String, Rgb)> {
    let mut entries: Vec<(String, Rgb)> = Vec::new();
    if palette.is_empty() {
        return entries;
    }
    for det in detections {
        if det.label().is_empty() {
            continue;
        }
        let color = palette[color_index(det.template_index(), palette.len())];
        match entries.iter_mut().find(|(label, _)| label == det.label()) {
            Some(entry) => entry.1 = color,
            None => entries.push((det.label().to_owned(), color)),
        }
    }
    entries
}

/// Copies a one- or three-channel view into an RGB canvas.
pub fn rgb_canvas(image: ImageView<'_, u8>) -> MultiMatchResult<OwnedImage> {
    let mut data = Vec::with_capacity(image.width() * image.height() * 3);
    for y in 0..image.height() {
        let row = image.row(y).ok_or(MultiMatchError::BufferTooSmall {
            needed: y * image.stride() + image.row_len(),
            got: image.as_slice().len(),
        })?;
        match image.channels() {
            1 => row.iter().for_each(|&v| data.extend_from_slice(&[v, v, v])),
            3 => data.extend_from_slice(row),
            channels => return Err(MultiMatchError::InvalidChannels { channels }),
        }
    }
    OwnedImage::interleaved(data, image.width(), image.height(), 3)
}

/// Draws each detection's outline onto an RGB canvas.
///
/// Outlines are `thickness` pixels wide, grow inward from the box edges and
/// are clipped to the canvas.
pub fn draw_detections(
    canvas: &mut OwnedImage,
    detections: &[Detection],
    palette: &[Rgb],
    thickness: usize,
) -> MultiMatchResult<()> {
    if canvas.channels() != 3 {
        return Err(MultiMatchError::InvalidChannels {
            channels: canvas.channels(),
        });
    }
    if palette.is_empty() {
        return Ok(());
    }

    let width = canvas.width();
    let height = canvas.height();
    let data = canvas.data_mut();
    let mut put = |x: usize, y: usize, color: Rgb| {
        if x < width && y < height {
            let idx = (y * width + x) * 3;
            data[idx..idx + 3].copy_from_slice(&color);
        }
    };

    for det in detections {
        let color = palette[color_index(det.template_index(), palette.len())];
        let (x1, y1, x2, y2) = det.corners();
        let t = thickness.max(1).min(det.width()).min(det.height());
        for inset in 0..t {
            let top = y1 + inset;
            let bottom = y2 - 1 - inset;
            let left = x1 + inset;
            let right = x2 - 1 - inset;
            for x in left..=right {
                put(x, top, color);
                put(x, bottom, color);
            }
            for y in top..=bottom {
                put(left, y, color);
                put(right, y, color);
            }
        }
    }
    Ok(())
}
