use core::fmt;
use core::num::NonZeroU32;

use crate::{CoreError, CoreResult};

/// Stable row index into a sample table.
///
/// Row order of the table defines the index, so the same `SampleId` names the
/// same sample for the whole session. It is the key of selection sets and of
/// the render cache.
///
/// - `u32` keeps cache keys small
/// - `NonZero` enables `Option<SampleId>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleId(NonZeroU32);

impl SampleId {
    /// Create a SampleId from a 0-based row index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Recover the 0-based row index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Row index as `usize`, for slicing into column storage.
    pub fn as_usize(self) -> usize {
        self.index() as usize
    }

    /// Error unless this id addresses a row of a collection of length `len`.
    pub fn check_bound(self, what: &'static str, len: usize) -> CoreResult<usize> {
        let index = self.as_usize();
        if index < len {
            Ok(index)
        } else {
            Err(CoreError::IndexOob { what, index, len })
        }
    }
}

impl TryFrom<usize> for SampleId {
    type Error = CoreError;

    fn try_from(index: usize) -> CoreResult<Self> {
        // u32::MAX itself would saturate onto the previous id
        match u32::try_from(index) {
            Ok(i) if i < u32::MAX => Ok(Self::from_index(i)),
            _ => Err(CoreError::IndexOob {
                what: "sample id",
                index,
                len: u32::MAX as usize,
            }),
        }
    }
}

impl fmt::Debug for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SampleId({})", self.index())
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SampleId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.index())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SampleId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let index = u32::deserialize(deserializer)?;
        SampleId::try_from(index as usize).map_err(serde::de::Error::custom)
    }
}
