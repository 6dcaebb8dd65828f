use thiserror::Error;
use tonpeek_boc::BocError;

/// Error decoding a payload as a whole
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("format detection failed: {0}")]
    FormatDetectionFailure(String),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("BoC: {0}")]
    Boc(#[from] BocError),
}
