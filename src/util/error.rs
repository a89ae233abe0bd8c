//! Error types for multimatch.

use thiserror::Error;

/// Result alias for multimatch operations.
pub type MultiMatchResult<T> = std::result::Result<T, MultiMatchError>;

/// Errors that can occur when running multimatch algorithms.
///
/// Argument errors are raised before any correlation work starts. Input
/// compatibility errors come from the correlation kernels and are passed
/// through the pipeline unchanged.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MultiMatchError {
    /// The expected object count must be at least one.
    #[error("invalid object count: at least one object should be expected in the image")]
    InvalidObjectCount,
    /// Labels were supplied but do not pair one-to-one with templates.
    #[error("label count mismatch: {labels} labels for {templates} templates")]
    LabelCountMismatch { labels: usize, templates: usize },
    /// The maximal overlap ratio lies outside `[0, 1]`.
    #[error("max overlap {max_overlap} is outside [0, 1]")]
    OverlapOutOfRange { max_overlap: f32 },
    /// The score threshold is NaN.
    #[error("score threshold must not be NaN")]
    ScoreThresholdNotANumber,
    /// The rescaling ratio is not a finite positive number.
    #[error("invalid scale ratio {ratio}")]
    InvalidScale { ratio: f32 },
    /// The search region does not overlap the image.
    #[error(
        "search region ({x}, {y}) {width}x{height} does not intersect {img_width}x{img_height} image"
    )]
    SearchRegionOutsideImage {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Width or height is zero or overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Stride is smaller than a row of pixels.
    #[error("invalid stride {stride} for row length {row_len}")]
    InvalidStride { row_len: usize, stride: usize },
    /// Channel count is zero.
    #[error("invalid channel count {channels}")]
    InvalidChannels { channels: usize },
    /// Backing buffer is too small for the described layout.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A region of interest does not fit inside the image.
    #[error(
        "roi out of bounds: ({x}, {y}) {width}x{height} in {img_width}x{img_height} image"
    )]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// The template exceeds the searched image in at least one dimension.
    #[error(
        "template {tpl_width}x{tpl_height} does not fit in search image {img_width}x{img_height}"
    )]
    TemplateTooLarge {
        tpl_width: usize,
        tpl_height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Image and template have different channel layouts.
    #[error("channel mismatch: image has {image} channels, template has {template}")]
    ChannelMismatch { image: usize, template: usize },
    /// Image decoding or encoding failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}

impl MultiMatchError {
    /// Returns true for errors caused by invalid call arguments.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidObjectCount
                | Self::LabelCountMismatch { .. }
                | Self::OverlapOutOfRange { .. }
                | Self::ScoreThresholdNotANumber
                | Self::InvalidScale { .. }
                | Self::SearchRegionOutsideImage { .. }
        )
    }

    /// Returns true for image/template incompatibilities reported by kernels.
    pub fn is_incompatible_input(&self) -> bool {
        matches!(
            self,
            Self::TemplateTooLarge { .. } | Self::ChannelMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::MultiMatchError;

    #[test]
    fn classifies_argument_errors() {
        let err = MultiMatchError::LabelCountMismatch {
            labels: 2,
            templates: 3,
        };
        assert!(err.is_invalid_argument());
        assert!(!err.is_incompatible_input());
        assert_eq!(err.to_string(), "label count mismatch: 2 labels for 3 templates");
    }

    #[test]
    fn classifies_kernel_errors() {
        let err = MultiMatchError::ChannelMismatch {
            image: 3,
            template: 1,
        };
        assert!(err.is_incompatible_input());
        assert!(!err.is_invalid_argument());
    }
}
