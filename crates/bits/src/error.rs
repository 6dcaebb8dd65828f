use core::fmt::Display;
use std::error::Error as StdError;

use thiserror::Error as ThisError;

/// Reading error
pub trait Error: StdError + Sized {
    /// Returns a custom error from given message
    fn custom<T>(msg: T) -> Self
    where
        T: Display;

    /// Wraps current error in given context
    fn context<C>(self, context: C) -> Self
    where
        C: Display;
}

/// Adapter for providing context on [`Result`]
pub trait ResultExt: Sized {
    /// Wrap [`Err`] in context by calling given function
    fn with_context<C>(self, context: impl FnOnce() -> C) -> Self
    where
        C: Display;

    /// Wrap [`Err`] in given context
    #[inline]
    fn context<C>(self, context: C) -> Self
    where
        C: Display,
    {
        self.with_context(move || context)
    }
}

impl<T, E> ResultExt for Result<T, E>
where
    E: Error,
{
    #[inline]
    fn with_context<C>(self, context: impl FnOnce() -> C) -> Result<T, E>
    where
        C: Display,
    {
        self.map_err(move |err| err.context(context()))
    }
}

/// Error produced by [`Slice`](crate::Slice) and other
/// [`BitReader`](crate::BitReader)s in this crate.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum SliceError {
    #[error("slice overrun: requested {requested} bits, {remaining} left")]
    Overrun { requested: usize, remaining: usize },

    #[error("unaligned read at bit {position}")]
    UnalignedRead { position: usize },

    #[error("buffer overrun: requested {requested} bytes, {remaining} bits left")]
    BufferOverrun { requested: usize, remaining: usize },

    #[error("{0}")]
    Custom(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<SliceError>,
    },
}

impl SliceError {
    /// Returns the innermost error, skipping all [`Context`](SliceError::Context) layers
    pub fn root_cause(&self) -> &Self {
        let mut err = self;
        while let Self::Context { source, .. } = err {
            err = source;
        }
        err
    }

    /// Returns whether the root cause is an [`Overrun`](SliceError::Overrun)
    #[inline]
    pub fn is_overrun(&self) -> bool {
        matches!(self.root_cause(), Self::Overrun { .. })
    }
}

impl Error for SliceError {
    #[inline]
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Self::Custom(msg.to_string())
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
