use core::fmt::{self, Debug};

use bitvec::{order::Msb0, slice::BitSlice, view::BitView};
use num_bigint::{BigInt, BigUint};

use crate::{BitReader, BitReaderExt, Error, SliceError};

/// Read cursor over the bits of a single cell.
///
/// Every `load_*` call either consumes exactly the requested number of bits
/// or fails without moving the cursor.
///
/// ```rust
/// # use tonpeek_bits::Slice;
/// let data = [0b1010_0000, 0xff];
/// let mut slice = Slice::from_bytes(&data, 12).unwrap();
///
/// assert!(slice.load_bit().unwrap());
/// assert_eq!(slice.load_u64(3).unwrap(), 0b010);
/// assert_eq!(slice.remaining_bits(), 8);
/// assert!(slice.load_u64(9).is_err());
/// ```
#[derive(Clone, Copy)]
pub struct Slice<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    position: usize,
}

/// Saved cursor position, see [`Slice::checkpoint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(usize);

impl<'a> Slice<'a> {
    #[inline]
    #[must_use]
    pub const fn new(bits: &'a BitSlice<u8, Msb0>) -> Self {
        Self { bits, position: 0 }
    }

    /// Creates slice over the first `bit_length` bits of `bytes`
    pub fn from_bytes(bytes: &'a [u8], bit_length: usize) -> Result<Self, SliceError> {
        let bits = bytes.view_bits::<Msb0>();
        if bit_length > bits.len() {
            return Err(Error::custom(format!(
                "bit length {bit_length} exceeds buffer of {} bytes",
                bytes.len()
            )));
        }
        Ok(Self::new(&bits[..bit_length]))
    }

    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn bit_length(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn remaining_bits(&self) -> usize {
        self.bit_length() - self.position
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining_bits() == 0
    }

    /// Returns whether the cursor stands on a byte boundary of the
    /// underlying cell data
    #[inline]
    pub const fn is_aligned(&self) -> bool {
        self.position % 8 == 0
    }

    #[inline]
    fn ensure(&self, n: usize) -> Result<(), SliceError> {
        if n > self.remaining_bits() {
            return Err(SliceError::Overrun {
                requested: n,
                remaining: self.remaining_bits(),
            });
        }
        Ok(())
    }

    #[inline]
    fn take(&mut self, n: usize) -> Result<&'a BitSlice<u8, Msb0>, SliceError> {
        self.ensure(n)?;
        let bits = &self.bits[self.position..self.position + n];
        self.position += n;
        Ok(bits)
    }

    #[inline]
    pub fn load_bit(&mut self) -> Result<bool, SliceError> {
        self.take(1).map(|bits| bits[0])
    }

    /// Loads `n`-bit big-endian unsigned integer
    pub fn load_uint(&mut self, n: usize) -> Result<BigUint, SliceError> {
        self.take(n)?.read_biguint(n)
    }

    /// Loads `n`-bit two's complement integer
    pub fn load_int(&mut self, n: usize) -> Result<BigInt, SliceError> {
        self.take(n)?.read_bigint(n)
    }

    /// Same as [`.load_uint()`](Slice::load_uint) for `n <= 64`
    pub fn load_u64(&mut self, n: usize) -> Result<u64, SliceError> {
        if n > 64 {
            return Err(Error::custom(format!("{n} bits do not fit into u64")));
        }
        self.take(n)?.read_u64(n)
    }

    /// Same as [`.load_int()`](Slice::load_int) for `n <= 64`
    pub fn load_i64(&mut self, n: usize) -> Result<i64, SliceError> {
        if n > 64 {
            return Err(Error::custom(format!("{n} bits do not fit into i64")));
        }
        self.take(n)?.read_i64(n)
    }

    /// Loads `byte_count` whole bytes. The cursor must be byte-aligned.
    pub fn load_buffer(&mut self, byte_count: usize) -> Result<Vec<u8>, SliceError> {
        if !self.is_aligned() {
            return Err(SliceError::UnalignedRead {
                position: self.position,
            });
        }
        let requested = byte_count
            .checked_mul(8)
            .filter(|&bits| bits <= self.remaining_bits())
            .ok_or(SliceError::BufferOverrun {
                requested: byte_count,
                remaining: self.remaining_bits(),
            })?;
        self.take(requested)?.read_bytes_vec(byte_count)
    }

    #[inline]
    pub fn skip_bits(&mut self, n: usize) -> Result<(), SliceError> {
        self.take(n).map(|_| ())
    }

    /// Remember current position to [`rewind`](Slice::rewind) to it later
    #[inline]
    pub const fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.position)
    }

    #[inline]
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.0.min(self.bit_length());
    }
}

impl Debug for Slice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slice[{}/{}]", self.position, self.bit_length())
    }
}

impl BitReader for Slice<'_> {
    type Error = SliceError;

    #[inline]
    fn bits_left(&self) -> usize {
        self.remaining_bits()
    }

    #[inline]
    fn read_bit(&mut self) -> Result<bool, Self::Error> {
        self.load_bit()
    }

    #[inline]
    fn read_bits_into(&mut self, dst: &mut BitSlice<u8, Msb0>) -> Result<(), Self::Error> {
        dst.copy_from_bitslice(self.take(dst.len())?);
        Ok(())
    }

    #[inline]
    fn skip(&mut self, n: usize) -> Result<(), Self::Error> {
        self.skip_bits(n)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const DATA: [u8; 8] = [0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x23, 0x45, 0x67];

    #[rstest]
    fn consumes_exactly(#[values(1, 7, 8, 13, 32, 63, 64)] n: usize) {
        let mut slice = Slice::from_bytes(&DATA, 64).unwrap();

        slice.load_u64(n).unwrap();
        let rest = slice.remaining_bits();
        slice.load_uint(rest).unwrap();

        assert_eq!(slice.position(), 64);
        assert!(slice.is_empty());
        assert_eq!(
            slice.load_bit().unwrap_err(),
            SliceError::Overrun {
                requested: 1,
                remaining: 0
            }
        );
    }

    #[test]
    fn uint_values() {
        let mut slice = Slice::from_bytes(&DATA, 64).unwrap();

        assert_eq!(slice.load_u64(4).unwrap(), 0xD);
        assert_eq!(slice.load_u64(12).unwrap(), 0xEAD);
        assert_eq!(slice.load_uint(48).unwrap(), BigUint::from(0xBEEF_0123_4567u64));
    }

    #[test]
    fn failed_read_does_not_move() {
        let mut slice = Slice::from_bytes(&DATA, 10).unwrap();
        slice.skip_bits(3).unwrap();

        assert!(slice.load_uint(8).is_err());
        assert_eq!(slice.position(), 3);
        assert!(slice.skip_bits(8).is_err());
        assert_eq!(slice.remaining_bits(), 7);
    }

    #[test]
    fn bit_length_beyond_buffer() {
        assert!(Slice::from_bytes(&DATA, 65).is_err());
    }

    #[test]
    fn buffer() {
        let mut slice = Slice::from_bytes(&DATA, 40).unwrap();

        assert_eq!(slice.load_buffer(2).unwrap(), [0xDE, 0xAD]);
        assert_eq!(
            slice.load_buffer(4).unwrap_err(),
            SliceError::BufferOverrun {
                requested: 4,
                remaining: 24
            }
        );
        slice.skip_bits(1).unwrap();
        assert_eq!(
            slice.load_buffer(1).unwrap_err(),
            SliceError::UnalignedRead { position: 17 }
        );
    }

    #[test]
    fn checkpoint_rewind() {
        let mut slice = Slice::from_bytes(&DATA, 64).unwrap();
        slice.skip_bits(5).unwrap();

        let checkpoint = slice.checkpoint();
        assert_eq!(slice.load_u64(32).unwrap(), 0xD5B7DDE0);
        slice.rewind(checkpoint);

        assert_eq!(slice.position(), 5);
        assert_eq!(slice.remaining_bits(), 59);
    }

    #[test]
    fn signed_workchain() {
        let data = [0xFF];
        let mut slice = Slice::from_bytes(&data, 8).unwrap();

        assert_eq!(slice.load_i64(8).unwrap(), -1);
    }

    #[test]
    fn int_values() {
        let mut slice = Slice::from_bytes(&DATA, 64).unwrap();

        assert_eq!(slice.load_int(4).unwrap(), BigInt::from(-3));
        assert_eq!(slice.load_int(12).unwrap(), BigInt::from(-339));
        assert_eq!(slice.load_int(48).unwrap(), BigInt::from(-71_541_251_160_729i64));
        assert!(slice.is_empty());
    }

    #[test]
    fn int_wider_than_i64() {
        let data = [0xFF; 9];
        let mut slice = Slice::from_bytes(&data, 72).unwrap();
        slice.skip_bits(1).unwrap();

        assert_eq!(slice.load_int(71).unwrap(), BigInt::from(-1));
    }

    #[test]
    fn int_positive() {
        let mut slice = Slice::from_bytes(&DATA[4..], 32).unwrap();

        assert_eq!(slice.load_int(32).unwrap(), BigInt::from(0x0123_4567));
    }

    #[test]
    fn i64_sign_bit_at_63() {
        let data = [0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE];
        let mut slice = Slice::from_bytes(&data, 64).unwrap();
        slice.skip_bits(1).unwrap();

        assert_eq!(slice.load_i64(63).unwrap(), -2);
    }
}
