//! [Bag Of Cells](https://docs.ton.org/develop/data-formats/cell-boc#bag-of-cells)
//! decoder and the [`Cell`] graph it produces.
//!
//! ```rust
//! # use tonpeek_boc::{BagOfCells, DecoderConfig};
//! let boc = BagOfCells::decode(
//!     [0xb5, 0xee, 0x9c, 0x72, 0x01, 0x01, 0x01, 0x01, 0x00, 0x03, 0x00, 0x00, 0x01, 0xb0],
//!     &DecoderConfig::default(),
//! )
//! .unwrap();
//!
//! let root = boc.single_root().unwrap();
//! assert_eq!(root.bit_len(), 3);
//! ```
mod boc;
mod builder;
mod cell;
mod config;
mod error;

pub use self::{boc::*, builder::*, cell::*, config::*, error::*};

pub use tonpeek_bits as bits;
