use bitvec::{order::Msb0, slice::BitSlice, vec::BitVec, view::BitView};
use impl_tools::autoimpl;
use num_bigint::{BigInt, BigUint};

use crate::{Error, SliceError};

/// Sequential bit-level reader, most significant bit first.
#[autoimpl(for <R: trait + ?Sized> &mut R, Box<R>)]
pub trait BitReader {
    type Error: Error;

    /// Returns the number of bits that can still be read
    fn bits_left(&self) -> usize;

    fn read_bit(&mut self) -> Result<bool, Self::Error>;

    #[inline]
    fn read_bits_into(&mut self, dst: &mut BitSlice<u8, Msb0>) -> Result<(), Self::Error> {
        for mut bit in dst.iter_mut() {
            *bit = self.read_bit()?
        }
        Ok(())
    }

    #[inline]
    fn skip(&mut self, n: usize) -> Result<(), Self::Error> {
        for _ in 0..n {
            self.read_bit()?;
        }
        Ok(())
    }
}

pub trait BitReaderExt: BitReader {
    #[inline]
    fn read_bitvec(&mut self, n: usize) -> Result<BitVec<u8, Msb0>, Self::Error> {
        let mut dst = BitVec::with_capacity(n);
        dst.resize(n, false);
        self.read_bits_into(&mut dst)?;
        Ok(dst)
    }

    #[inline]
    fn read_bytes_array<const N: usize>(&mut self) -> Result<[u8; N], Self::Error> {
        let mut arr = [0; N];
        self.read_bits_into(arr.view_bits_mut::<Msb0>())?;
        Ok(arr)
    }

    #[inline]
    fn read_bytes_vec(&mut self, n: usize) -> Result<Vec<u8>, Self::Error> {
        let mut v = vec![0; n];
        self.read_bits_into(v.as_mut_slice().view_bits_mut::<Msb0>())?;
        Ok(v)
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8, Self::Error> {
        self.read_bytes_array().map(u8::from_be_bytes)
    }

    #[inline]
    fn read_u32(&mut self) -> Result<u32, Self::Error> {
        self.read_bytes_array().map(u32::from_be_bytes)
    }

    /// Reads a big-endian unsigned integer stored in `n` whole bytes,
    /// `n <= 8`.
    fn read_uint_bytes(&mut self, n: usize) -> Result<u64, Self::Error> {
        if n > 8 {
            return Err(Error::custom(format!(
                "{n}-byte integer does not fit into 64 bits"
            )));
        }
        Ok(self
            .read_bytes_vec(n)?
            .into_iter()
            .fold(0, |acc, b| (acc << 8) | b as u64))
    }

    /// Reads an `n`-bit unsigned integer, `n <= 64`.
    fn read_u64(&mut self, n: usize) -> Result<u64, Self::Error> {
        if n > 64 {
            return Err(Error::custom(format!("{n} bits do not fit into u64")));
        }
        let mut value = 0;
        for _ in 0..n {
            value = (value << 1) | self.read_bit()? as u64;
        }
        Ok(value)
    }

    /// Reads an `n`-bit two's complement integer, `n <= 64`.
    fn read_i64(&mut self, n: usize) -> Result<i64, Self::Error> {
        let unsigned = self.read_u64(n)?;
        Ok(match n {
            0 => 0,
            64 => unsigned as i64,
            n => ((unsigned << (64 - n)) as i64) >> (64 - n),
        })
    }

    /// Reads an `n`-bit unsigned integer of arbitrary width.
    #[inline]
    fn read_biguint(&mut self, n: usize) -> Result<BigUint, Self::Error> {
        let bits = self.read_bitvec(n)?;
        Ok(biguint_from_bits(&bits))
    }

    /// Reads an `n`-bit two's complement integer of arbitrary width.
    fn read_bigint(&mut self, n: usize) -> Result<BigInt, Self::Error> {
        let bits = self.read_bitvec(n)?;
        let unsigned = BigInt::from(biguint_from_bits(&bits));
        Ok(if bits.first().is_some_and(|b| *b) {
            unsigned - (BigInt::from(1u8) << n)
        } else {
            unsigned
        })
    }
}

impl<T> BitReaderExt for T where T: BitReader + ?Sized {}

/// Interprets `bits` as a big-endian unsigned integer.
pub fn biguint_from_bits(bits: &BitSlice<u8, Msb0>) -> BigUint {
    let mut bits = BitVec::<u8, Msb0>::from_bitslice(bits);
    let len = bits.len();
    let total_bits = len.div_ceil(8) * 8;
    bits.resize(total_bits, false);
    bits.shift_right(total_bits - len);
    BigUint::from_bytes_be(bits.as_raw_slice())
}

impl BitReader for &BitSlice<u8, Msb0> {
    type Error = SliceError;

    #[inline]
    fn bits_left(&self) -> usize {
        self.len()
    }

    #[inline]
    fn read_bit(&mut self) -> Result<bool, Self::Error> {
        let (bit, rest) = self.split_first().ok_or(SliceError::Overrun {
            requested: 1,
            remaining: 0,
        })?;
        let bit = *bit;
        *self = rest;
        Ok(bit)
    }

    #[inline]
    fn read_bits_into(&mut self, dst: &mut BitSlice<u8, Msb0>) -> Result<(), Self::Error> {
        if self.len() < dst.len() {
            return Err(SliceError::Overrun {
                requested: dst.len(),
                remaining: self.len(),
            });
        }
        let (v, rest) = self.split_at(dst.len());
        dst.copy_from_bitslice(v);
        *self = rest;
        Ok(())
    }

    #[inline]
    fn skip(&mut self, n: usize) -> Result<(), Self::Error> {
        if self.len() < n {
            return Err(SliceError::Overrun {
                requested: n,
                remaining: self.len(),
            });
        }
        let (_, rest) = self.split_at(n);
        *self = rest;
        Ok(())
    }
}
