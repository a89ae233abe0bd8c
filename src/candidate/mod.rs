//! Candidate extraction and pruning.
//!
//! Peak extraction turns a score map into placement coordinates; suppression
//! turns the pooled detections of all templates into a non-overlapping set.

use crate::util::{MultiMatchError, MultiMatchResult};
use std::num::NonZeroUsize;

pub(crate) mod nms;
pub(crate) mod peaks;

/// How many objects the caller expects in the image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ObjectCount {
    /// Keep every detection that survives suppression.
    #[default]
    Unbounded,
    /// Keep at most this many detections.
    Finite(NonZeroUsize),
}

impl ObjectCount {
    /// Exactly one object: the best match in the image.
    pub const ONE: Self = Self::Finite(NonZeroUsize::MIN);

    /// Creates a finite count, rejecting zero.
    pub fn finite(count: usize) -> MultiMatchResult<Self> {
        NonZeroUsize::new(count)
            .map(Self::Finite)
            .ok_or(MultiMatchError::InvalidObjectCount)
    }

    /// Returns the finite bound, if any.
    pub fn limit(self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::Finite(n) => Some(n.get()),
        }
    }

    /// Returns true when exactly one object is requested.
    pub fn is_single(self) -> bool {
        self == Self::ONE
    }

    /// Peak search policy for this count.
    ///
    /// Only the single-object case limits peak extraction; any other count
    /// needs every local maximum so suppression can pick the survivors.
    pub fn peak_limit(self) -> PeakLimit {
        if self.is_single() {
            PeakLimit::Single
        } else {
            PeakLimit::Unbounded
        }
    }
}

impl From<NonZeroUsize> for ObjectCount {
    fn from(value: NonZeroUsize) -> Self {
        Self::Finite(value)
    }
}

/// Number of peaks to extract from one score map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeakLimit {
    /// Only the global maximum.
    Single,
    /// Every local maximum.
    Unbounded,
}

#[cfg(test)]
mod tests {
    use super::{ObjectCount, PeakLimit};
    use crate::util::MultiMatchError;

    #[test]
    fn finite_rejects_zero() {
        assert_eq!(
            ObjectCount::finite(0).unwrap_err(),
            MultiMatchError::InvalidObjectCount
        );
        assert_eq!(ObjectCount::finite(3).unwrap().limit(), Some(3));
        assert_eq!(ObjectCount::Unbounded.limit(), None);
    }

    #[test]
    fn only_single_object_limits_peaks() {
        assert_eq!(ObjectCount::ONE.peak_limit(), PeakLimit::Single);
        assert_eq!(
            ObjectCount::finite(2).unwrap().peak_limit(),
            PeakLimit::Unbounded
        );
        assert_eq!(ObjectCount::Unbounded.peak_limit(), PeakLimit::Unbounded);
    }
}
