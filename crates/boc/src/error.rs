use thiserror::Error;

use crate::bits::SliceError;

/// Error produced while decoding or building a [`BagOfCells`](crate::BagOfCells)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BocError {
    #[error("unsupported BoC magic: {0:#010x}")]
    UnsupportedMagic(u32),

    #[error("BoC with cache bits is not supported")]
    UnsupportedCacheBits,

    #[error("BoC with {0} absent cells is not supported")]
    UnsupportedAbsentCells(u64),

    #[error("invalid reference size: {0} bytes")]
    InvalidRefSize(u8),

    #[error("invalid offset size: {0} bytes")]
    InvalidOffsetSize(u8),

    #[error("too many cells: {count}, at most {max} allowed")]
    TooManyCells { count: u64, max: usize },

    #[error("{roots} roots declared for {cells} cells")]
    TooManyRoots { roots: u64, cells: u64 },

    #[error("too many references: {0}")]
    TooManyReferences(usize),

    #[error("too many bits: {0}")]
    TooManyBits(usize),

    #[error("truncated BoC: {0}")]
    Truncated(SliceError),

    #[error("cell [{index}]: invalid tail byte {tail:#04x}")]
    InvalidTailByte { index: usize, tail: u8 },

    #[error("cell [{index}]: reference to [{reference}] out of {count} cells")]
    InvalidReference {
        index: usize,
        reference: u64,
        count: usize,
    },

    #[error("root index {index} out of {count} cells")]
    InvalidRootIndex { index: u64, count: usize },

    #[error("reference cycle detected")]
    ReferenceCycle,

    #[error("CRC32C mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("{0} bytes left in cell data after the last cell")]
    TrailingData(usize),

    #[error("{value} does not fit into {bits} bits")]
    IntegerOverflow { value: String, bits: usize },

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error(transparent)]
    Slice(SliceError),
}

impl From<SliceError> for BocError {
    #[inline]
    fn from(err: SliceError) -> Self {
        if err.is_overrun() {
            Self::Truncated(err)
        } else {
            Self::Slice(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bits::{Error, ResultExt};

    use super::*;

    #[test]
    fn overrun_is_truncation() {
        let err: Result<(), SliceError> = Err(SliceError::Overrun {
            requested: 16,
            remaining: 8,
        });
        let err: BocError = err.context("cells").unwrap_err().into();

        assert!(matches!(err, BocError::Truncated(_)));
        assert_eq!(
            err.to_string(),
            "truncated BoC: cells: slice overrun: requested 16 bits, 8 left"
        );
    }

    #[test]
    fn other_slice_errors() {
        let err: BocError = SliceError::custom("bad").into();
        assert_eq!(err, BocError::Slice(SliceError::Custom("bad".into())));
    }
}
