use core::{
    fmt::{self, Debug},
    ops::Deref,
    ptr,
};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use bitvec::{order::Msb0, vec::BitVec};
use digest::{Digest, Output};

use crate::{CellBuilder, bits::Slice};

/// Maximum number of data bits in a cell
pub const MAX_BITS_LEN: usize = 1023;

/// Maximum number of references in a cell
pub const MAX_REFS_COUNT: usize = 4;

/// A [Cell](https://docs.ton.org/develop/data-formats/cell-boc#cell).
///
/// Exotic cells (library, pruned branch, merkle proofs and updates) are kept
/// as opaque leaves: their data is available but never interpreted.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    pub data: BitVec<u8, Msb0>,
    pub references: Vec<Arc<Self>>,
    pub exotic: bool,
}

impl Cell {
    /// Create new [`CellBuilder`]
    #[inline]
    #[must_use]
    pub const fn builder() -> CellBuilder {
        CellBuilder::new()
    }

    /// Create empty cell
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: BitVec::EMPTY,
            references: Vec::new(),
            exotic: false,
        }
    }

    /// Return [`Slice`] over the data bits of this cell
    #[inline]
    #[must_use]
    pub fn parser(&self) -> Slice<'_> {
        Slice::new(&self.data)
    }

    #[inline]
    pub fn bit_len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn reference(&self, index: usize) -> Option<&Arc<Self>> {
        self.references.get(index)
    }

    /// Returns whether this cell has no data and zero references.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.references.is_empty()
    }

    /// See [Cell serialization](https://docs.ton.org/develop/data-formats/cell-boc#cell-serialization)
    #[inline]
    pub(crate) fn refs_descriptor(&self) -> u8 {
        self.references.len() as u8 | (u8::from(self.exotic) << 3)
    }

    /// See [Cell serialization](https://docs.ton.org/develop/data-formats/cell-boc#cell-serialization)
    #[inline]
    pub(crate) fn bits_descriptor(&self) -> u8 {
        let b = self.data.len();
        (b / 8) as u8 + b.div_ceil(8) as u8
    }

    /// Data bytes with the completion tag appended when the bit length is
    /// not a multiple of 8
    pub(crate) fn padded_data(&self) -> Vec<u8> {
        let mut bytes = self.data.as_raw_slice().to_vec();
        let rest_bits = self.data.len() % 8;
        if rest_bits != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= !0u8 << (8 - rest_bits); // clear the rest
                *last |= 1 << (8 - rest_bits - 1); // put stop-bit
            }
        }
        bytes
    }

    /// Returns whether this cell or any cell reachable from it is exotic
    pub fn has_exotic(&self) -> bool {
        let mut stack = vec![self];
        let mut seen = HashSet::new();
        while let Some(cell) = stack.pop() {
            if !seen.insert(ptr::from_ref(cell)) {
                continue;
            }
            if cell.exotic {
                return true;
            }
            stack.extend(cell.references.iter().map(Deref::deref));
        }
        false
    }

    /// [Standard Cell representation hash](https://docs.ton.org/develop/data-formats/cell-boc#standard-cell-representation-hash-calculation)
    /// of an ordinary cell tree.
    ///
    /// Depths and hashes of shared sub-trees are computed once. Returns
    /// `None` when an exotic cell is reachable, since their hashes depend on
    /// level masks that are not modelled here.
    pub fn hash_digest<D>(&self) -> Option<[u8; 32]>
    where
        D: Digest,
        Output<D>: Into<[u8; 32]>,
    {
        let mut computed: HashMap<*const Cell, (u16, [u8; 32])> = HashMap::new();
        let mut stack: Vec<(&Cell, bool)> = vec![(self, false)];

        while let Some((cell, expanded)) = stack.pop() {
            let key = ptr::from_ref(cell);
            if computed.contains_key(&key) {
                continue;
            }
            if cell.exotic {
                return None;
            }
            if !expanded {
                stack.push((cell, true));
                stack.extend(cell.references.iter().map(|r| (r.deref(), false)));
                continue;
            }

            let children = cell
                .references
                .iter()
                .map(|r| computed.get(&Arc::as_ptr(r)).copied())
                .collect::<Option<Vec<_>>>()?;
            let depth = children
                .iter()
                .map(|(depth, _)| *depth)
                .max()
                .map_or(Some(0), |d| d.checked_add(1))?;

            let mut d = D::new();
            d.update([cell.refs_descriptor(), cell.bits_descriptor()]);
            d.update(cell.padded_data());
            // refs depth
            for (depth, _) in &children {
                d.update(depth.to_be_bytes());
            }
            // refs hashes
            for (_, hash) in &children {
                d.update(hash);
            }
            computed.insert(key, (depth, d.finalize().into()));
        }

        computed.get(&ptr::from_ref(self)).map(|(_, hash)| *hash)
    }

    /// Calculates [standard Cell representation hash](https://docs.ton.org/develop/data-formats/cell-boc#cell-hash)
    #[cfg(feature = "sha2")]
    #[inline]
    pub fn hash(&self) -> Option<[u8; 32]> {
        self.hash_digest::<sha2::Sha256>()
    }
}

impl Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exotic {
            write!(f, "!")?;
        }
        if f.alternate() {
            write!(f, "{}[0b", self.data.len())?;
            for bit in &self.data {
                write!(f, "{}", if *bit { '1' } else { '0' })?;
            }
            write!(f, "]")?;
        } else {
            write!(
                f,
                "{}[0x{}]",
                self.data.len(),
                hex::encode_upper(self.data.as_raw_slice())
            )?;
        }
        if self.references.is_empty() {
            return Ok(());
        }
        write!(f, " -> ")?;
        f.debug_set().entries(&self.references).finish()
    }
}
