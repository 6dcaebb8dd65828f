//! Collection of types to work with currencies
use core::fmt::{self, Display};

use lazy_static::lazy_static;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use tonpeek_bits::{ResultExt, Slice, SliceError};

lazy_static! {
    /// 1 TON in nanotons
    pub static ref ONE_TON: BigUint = BigUint::from(1_000_000_000u64);
}

/// Amount of nanotons, displayed scaled to TON
///
/// ```rust
/// # use tonpeek_ton::Coins;
/// assert_eq!(Coins::from_nano(1_500_000_000u64).to_string(), "1.5");
/// assert_eq!(Coins::from_nano(0u64).to_string(), "0");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coins(pub BigUint);

impl Coins {
    #[inline]
    pub fn from_nano(nano: impl Into<BigUint>) -> Self {
        Self(nano.into())
    }

    #[inline]
    pub fn from_ton(ton: u64) -> Self {
        Self(&*ONE_TON * ton)
    }
}

impl Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = &self.0 / &*ONE_TON;
        let frac = (&self.0 % &*ONE_TON).to_u64().unwrap_or_default();
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let frac = format!("{frac:09}");
        write!(f, "{whole}.{}", frac.trim_end_matches('0'))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Coins {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Reads `Grams`:
/// ```tlb
/// var_uint$_ {n:#} len:(#< n) value:(uint (len * 8)) = VarUInteger n;
/// nanograms$_ amount:(VarUInteger 16) = Grams;
/// ```
pub fn load_grams(slice: &mut Slice<'_>) -> Result<Coins, SliceError> {
    let len = slice.load_u64(4).context("len")? as usize;
    slice.load_uint(len * 8).context("value").map(Coins)
}

/// [`CurrencyCollection`](https://docs.ton.org/develop/data-formats/msg-tlb#currencycollection)
/// ```tlb
/// currencies$_ grams:Grams other:ExtraCurrencyCollection = CurrencyCollection;
/// ```
///
/// Extra currencies are never decoded: [`grams`](CurrencyCollection::grams)
/// is the whole value as far as this crate is concerned, and
/// [`has_extra`](CurrencyCollection::has_extra) only records that a
/// dictionary was present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyCollection {
    pub grams: Coins,
    pub has_extra: bool,
}

/// Reads [`CurrencyCollection`]. When the extra currencies flag is set, one
/// more bit telling where the dictionary lives is consumed and the
/// dictionary itself is skipped.
pub fn load_currency_collection(slice: &mut Slice<'_>) -> Result<CurrencyCollection, SliceError> {
    let grams = load_grams(slice).context("grams")?;
    let mut has_extra = false;
    if !slice.is_empty() {
        // extra_currencies$_ dict:(HashmapE 32 (VarUInteger 32))
        has_extra = slice.load_bit().context("other")?;
        if has_extra {
            slice.load_bit().context("other")?;
        }
    }
    Ok(CurrencyCollection { grams, has_extra })
}
