//! Bit-precise reading primitives shared by the BoC container parser and
//! the cell grammars built on top of it.
mod error;
mod reader;
mod slice;

pub use self::{error::*, reader::*, slice::*};

pub use bitvec;
