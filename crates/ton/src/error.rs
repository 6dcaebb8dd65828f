use core::fmt::Display;

use thiserror::Error;
use tonpeek_bits::{Error as ReadError, SliceError};

/// Error aborting the parse of a single message candidate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error(transparent)]
    Slice(#[from] SliceError),

    #[error("anycast addresses are not supported")]
    UnsupportedAnycast,

    #[error("inline StateInit is not supported")]
    UnsupportedInlineStateInit,

    #[error("not an internal message")]
    NotInternal,

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<MessageError>,
    },
}

impl ReadError for MessageError {
    #[inline]
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Self::Slice(SliceError::custom(msg))
    }

    #[inline]
    fn context<C>(self, context: C) -> Self
    where
        C: Display,
    {
        Self::Context {
            context: context.to_string(),
            source: Box::new(self),
        }
    }
}

/// Error parsing a textual address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid base64: {0}")]
    Base64(String),

    #[error("invalid length: {0} bytes")]
    InvalidLength(usize),

    #[error("unsupported flags: {0:#04x}")]
    UnsupportedFlags(u8),

    #[error("CRC mismatch: expected {expected:#06x}, got {actual:#06x}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    #[error("invalid raw address: {0}")]
    InvalidRaw(String),
}
