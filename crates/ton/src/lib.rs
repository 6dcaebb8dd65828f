#![cfg_attr(docsrs, feature(doc_auto_cfg))]
//! Addresses, coins and internal messages read from [TON](https://ton.org)
//! cells, and extraction of every internal message found in a cell graph.
//!
//! ```rust
//! # use tonpeek_boc::BagOfCells;
//! # use tonpeek_ton::{ExtractorConfig, extract};
//! // a lone cell with a single `1` bit is not a message
//! let boc = BagOfCells::parse_hex("b5ee9c72010101010003000001c0").unwrap();
//! let extraction = extract(boc.roots(), &ExtractorConfig::default());
//! assert!(extraction.records.is_empty());
//! assert!(extraction.skipped.is_empty());
//! ```
mod address;
mod currency;
mod error;
mod extract;
mod message;

pub use self::{address::*, currency::*, error::*, extract::*, message::*};

pub use tonpeek_boc as boc;
