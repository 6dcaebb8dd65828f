use std::sync::Arc;

use bitvec::{order::Msb0, slice::BitSlice, vec::BitVec, view::BitView};
use num_bigint::BigUint;

use crate::{BocError, Cell, MAX_BITS_LEN, MAX_REFS_COUNT};

/// Cell builder created with [`Cell::builder()`].
///
/// ```rust
/// # use tonpeek_boc::{Cell, BocError};
/// # fn main() -> Result<(), BocError> {
/// let mut builder = Cell::builder();
/// builder
///     .store_uint(0x0F, 32)?
///     .store_reference(Cell::new())?;
/// let cell = builder.into_cell();
///
/// assert_eq!(cell.bit_len(), 32);
/// assert_eq!(cell.parser().load_u64(32).unwrap(), 0x0F);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CellBuilder {
    data: BitVec<u8, Msb0>,
    references: Vec<Arc<Cell>>,
    exotic: bool,
}

impl CellBuilder {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: BitVec::EMPTY,
            references: Vec::new(),
            exotic: false,
        }
    }

    #[inline]
    fn ensure_bits(&self, n: usize) -> Result<(), BocError> {
        let bits = self.data.len() + n;
        if bits > MAX_BITS_LEN {
            return Err(BocError::TooManyBits(bits));
        }
        Ok(())
    }

    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self, BocError> {
        self.ensure_bits(1)?;
        self.data.push(bit);
        Ok(self)
    }

    pub fn store_bits(&mut self, bits: &BitSlice<u8, Msb0>) -> Result<&mut Self, BocError> {
        self.ensure_bits(bits.len())?;
        self.data.extend_from_bitslice(bits);
        Ok(self)
    }

    #[inline]
    pub fn store_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, BocError> {
        self.store_bits(bytes.view_bits())
    }

    /// Stores `value` as `n`-bit big-endian unsigned integer, `n <= 64`
    pub fn store_uint(&mut self, value: u64, n: usize) -> Result<&mut Self, BocError> {
        if n > 64 || (n < 64 && value >> n != 0) {
            return Err(BocError::IntegerOverflow {
                value: value.to_string(),
                bits: n,
            });
        }
        let bytes = value.to_be_bytes();
        self.store_bits(&bytes.view_bits::<Msb0>()[64 - n..])
    }

    /// Stores `value` as `n`-bit two's complement integer, `n <= 64`
    pub fn store_int(&mut self, value: i64, n: usize) -> Result<&mut Self, BocError> {
        let fits = match n {
            0 => value == 0,
            1..64 => (-(1i64 << (n - 1))..(1i64 << (n - 1))).contains(&value),
            64 => true,
            _ => false,
        };
        if !fits {
            return Err(BocError::IntegerOverflow {
                value: value.to_string(),
                bits: n,
            });
        }
        let bytes = value.to_be_bytes();
        self.store_bits(&bytes.view_bits::<Msb0>()[64 - n..])
    }

    /// Stores `value` as `n`-bit big-endian unsigned integer
    pub fn store_biguint(&mut self, value: &BigUint, n: usize) -> Result<&mut Self, BocError> {
        let used = value.bits() as usize;
        if used > n {
            return Err(BocError::IntegerOverflow {
                value: value.to_string(),
                bits: n,
            });
        }
        self.ensure_bits(n)?;
        let bytes = value.to_bytes_be();
        let bits = bytes.view_bits::<Msb0>();
        self.data.resize(self.data.len() + n - used, false);
        self.data.extend_from_bitslice(&bits[bits.len() - used..]);
        Ok(self)
    }

    pub fn store_reference(&mut self, cell: impl Into<Arc<Cell>>) -> Result<&mut Self, BocError> {
        if self.references.len() == MAX_REFS_COUNT {
            return Err(BocError::TooManyReferences(MAX_REFS_COUNT + 1));
        }
        self.references.push(cell.into());
        Ok(self)
    }

    /// Marks the resulting cell as exotic
    #[inline]
    pub fn set_exotic(&mut self, exotic: bool) -> &mut Self {
        self.exotic = exotic;
        self
    }

    #[inline]
    #[must_use]
    pub fn into_cell(self) -> Cell {
        Cell {
            data: self.data,
            references: self.references,
            exotic: self.exotic,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(0xFF, 8)]
    #[case(u64::MAX, 64)]
    fn uint(#[case] value: u64, #[case] n: usize) {
        let mut builder = Cell::builder();
        builder.store_uint(value, n).unwrap();
        let cell = builder.into_cell();

        assert_eq!(cell.bit_len(), n);
        assert_eq!(cell.parser().load_u64(n).unwrap(), value);
    }

    #[rstest]
    #[case(-1, 8)]
    #[case(-128, 8)]
    #[case(127, 8)]
    #[case(-3, 3)]
    #[case(i64::MIN, 64)]
    fn int(#[case] value: i64, #[case] n: usize) {
        let mut builder = Cell::builder();
        builder.store_int(value, n).unwrap();

        assert_eq!(builder.into_cell().parser().load_i64(n).unwrap(), value);
    }

    #[rstest]
    #[case(2, 1)]
    #[case(256, 8)]
    #[case(1, 65)]
    fn uint_overflow(#[case] value: u64, #[case] n: usize) {
        assert!(matches!(
            Cell::builder().store_uint(value, n),
            Err(BocError::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn int_overflow() {
        assert!(Cell::builder().store_int(128, 8).is_err());
        assert!(Cell::builder().store_int(-129, 8).is_err());
        assert!(Cell::builder().store_int(1, 0).is_err());
    }

    #[test]
    fn biguint() {
        let value = BigUint::from(1_500_000_000u64);
        let mut builder = Cell::builder();
        builder.store_biguint(&value, 40).unwrap();
        let cell = builder.into_cell();

        assert_eq!(cell.bit_len(), 40);
        assert_eq!(cell.parser().load_uint(40).unwrap(), value);
        assert!(Cell::builder().store_biguint(&value, 30).is_err());
    }

    #[test]
    fn bits_overflow() {
        let mut builder = Cell::builder();
        builder.store_bytes(&[0; 127]).unwrap();
        builder.store_uint(0, 7).unwrap();

        assert_eq!(
            builder.store_bit(true).unwrap_err(),
            BocError::TooManyBits(1024)
        );
    }

    #[test]
    fn refs_overflow() {
        let mut builder = Cell::builder();
        for _ in 0..MAX_REFS_COUNT {
            builder.store_reference(Cell::new()).unwrap();
        }

        assert_eq!(
            builder.store_reference(Cell::new()).unwrap_err(),
            BocError::TooManyReferences(5)
        );
    }
}
