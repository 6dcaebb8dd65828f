use core::{
    fmt::{self, Debug, Display},
    str::FromStr,
};

use base64::{
    Engine,
    engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD},
};
use crc::Crc;
use strum::Display;
use tonpeek_bits::{BitReaderExt, ResultExt, Slice, SliceError};
use tracing::trace;

use crate::{AddressError, MessageError};

const CRC_16_XMODEM: Crc<u16> = Crc::<u16>::new(&crc::CRC_16_XMODEM);

/// Standard internal address: workchain and 256-bit account id
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MsgAddress {
    pub workchain_id: i32,
    pub address: [u8; 32],
}

impl MsgAddress {
    /// Parses raw `workchain:hex` form
    pub fn from_raw(s: impl AsRef<str>) -> Result<Self, AddressError> {
        let s = s.as_ref();
        let (workchain, addr) = s
            .split_once(':')
            .ok_or_else(|| AddressError::InvalidRaw(s.to_owned()))?;
        let workchain_id = workchain
            .parse::<i32>()
            .map_err(|err| AddressError::InvalidRaw(err.to_string()))?;
        let mut address = [0; 32];
        hex::decode_to_slice(addr, &mut address)
            .map_err(|err| AddressError::InvalidRaw(err.to_string()))?;
        Ok(Self {
            workchain_id,
            address,
        })
    }

    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain_id, hex::encode(self.address))
    }

    pub fn from_base64_url(s: impl AsRef<str>) -> Result<Self, AddressError> {
        Self::from_base64_url_flags(s).map(|(addr, _, _)| addr)
    }

    pub fn from_base64_url_flags(s: impl AsRef<str>) -> Result<(Self, bool, bool), AddressError> {
        Self::from_base64_repr(URL_SAFE_NO_PAD, s)
    }

    pub fn from_base64_std(s: impl AsRef<str>) -> Result<Self, AddressError> {
        Self::from_base64_std_flags(s).map(|(addr, _, _)| addr)
    }

    pub fn from_base64_std_flags(s: impl AsRef<str>) -> Result<(Self, bool, bool), AddressError> {
        Self::from_base64_repr(STANDARD_NO_PAD, s)
    }

    /// Bounceable mainnet friendly form, as shown by explorers and wallets
    #[inline]
    pub fn to_friendly(&self) -> String {
        self.to_base64_url()
    }

    pub fn to_base64_url(self) -> String {
        self.to_base64_url_flags(false, false)
    }

    pub fn to_base64_url_flags(self, non_bounceable: bool, non_production: bool) -> String {
        self.to_base64_flags(non_bounceable, non_production, URL_SAFE_NO_PAD)
    }

    pub fn to_base64_std(self) -> String {
        self.to_base64_std_flags(false, false)
    }

    pub fn to_base64_std_flags(self, non_bounceable: bool, non_production: bool) -> String {
        self.to_base64_flags(non_bounceable, non_production, STANDARD_NO_PAD)
    }

    /// Parses friendly representation of an address:
    /// `flags:uint8 workchain_id:int8 address:bits256 crc16:uint16`
    ///
    /// # Returns
    /// the address, non-bounceable flag, non-production flag.
    fn from_base64_repr(
        engine: impl Engine,
        s: impl AsRef<str>,
    ) -> Result<(Self, bool, bool), AddressError> {
        let mut bytes = [0; 36];
        let n = engine
            .decode_slice(s.as_ref(), &mut bytes)
            .map_err(|err| AddressError::Base64(err.to_string()))?;
        if n != bytes.len() {
            return Err(AddressError::InvalidLength(n));
        }

        let (non_production, non_bounceable) = match bytes[0] {
            0x11 => (false, false),
            0x51 => (false, true),
            0x91 => (true, false),
            0xD1 => (true, true),
            flags => return Err(AddressError::UnsupportedFlags(flags)),
        };
        let expected = u16::from_be_bytes([bytes[34], bytes[35]]);
        let actual = CRC_16_XMODEM.checksum(&bytes[0..34]);
        if expected != actual {
            return Err(AddressError::ChecksumMismatch { expected, actual });
        }
        let mut address = [0; 32];
        address.copy_from_slice(&bytes[2..34]);

        Ok((
            Self {
                workchain_id: bytes[1] as i8 as i32,
                address,
            },
            non_bounceable,
            non_production,
        ))
    }

    fn to_base64_flags(
        self,
        non_bounceable: bool,
        non_production: bool,
        engine: impl Engine,
    ) -> String {
        let mut bytes = [0; 36];
        let tag: u8 = match (non_production, non_bounceable) {
            (false, false) => 0x11,
            (false, true) => 0x51,
            (true, false) => 0x91,
            (true, true) => 0xD1,
        };
        bytes[0] = tag;
        bytes[1] = (self.workchain_id & 0xff) as u8;
        bytes[2..34].copy_from_slice(&self.address);
        let crc = CRC_16_XMODEM.checksum(&bytes[0..34]);
        bytes[34..].copy_from_slice(&crc.to_be_bytes());
        engine.encode(bytes)
    }
}

impl Debug for MsgAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for MsgAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_base64_url().as_str())
    }
}

impl FromStr for MsgAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 48 {
            if s.contains(['-', '_']) {
                Self::from_base64_url(s)
            } else {
                Self::from_base64_std(s)
            }
        } else {
            Self::from_raw(s)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[repr(u8)]
enum MsgAddressTag {
    #[strum(serialize = "addr_none$00")]
    Null,
    #[strum(serialize = "addr_extern$01")]
    Extern,
    #[strum(serialize = "addr_std$10")]
    Std,
    #[strum(serialize = "addr_var$11")]
    Var,
}

impl MsgAddressTag {
    #[inline]
    fn load(slice: &mut Slice<'_>) -> Result<Self, SliceError> {
        Ok(match slice.load_u64(2)? {
            0b00 => Self::Null,
            0b01 => Self::Extern,
            0b10 => Self::Std,
            _ => Self::Var,
        })
    }
}

/// Reads `MsgAddressInt` (also accepting `MsgAddressExt` tags).
///
/// ```tlb
/// addr_none$00 = MsgAddressExt;
/// addr_extern$01 len:(## 9) external_address:(bits len) = MsgAddressExt;
/// addr_std$10 anycast:(Maybe Anycast)
///   workchain_id:int8 address:bits256  = MsgAddressInt;
/// addr_var$11 anycast:(Maybe Anycast) addr_len:(## 9)
///   workchain_id:int32 address:(bits addr_len) = MsgAddressInt;
/// ```
///
/// Only `addr_std` yields an address. External and variable-length
/// addresses are skipped so that the cursor stays on the next field.
pub fn load_msg_address_int(slice: &mut Slice<'_>) -> Result<Option<MsgAddress>, MessageError> {
    let tag = MsgAddressTag::load(slice).context("tag")?;
    match tag {
        MsgAddressTag::Null => Ok(None),
        MsgAddressTag::Extern => {
            let len = slice.load_u64(9).context("len")?;
            slice.skip_bits(len as usize).context("external_address")?;
            trace!(%tag, len, "skipped address");
            Ok(None)
        }
        MsgAddressTag::Std => {
            if slice.load_bit().context("anycast")? {
                return Err(MessageError::UnsupportedAnycast);
            }
            let workchain_id = slice.load_i64(8).context("workchain_id")? as i32;
            let address = slice.read_bytes_array().context("address")?;
            Ok(Some(MsgAddress {
                workchain_id,
                address,
            }))
        }
        MsgAddressTag::Var => {
            if slice.load_bit().context("anycast")? {
                return Err(MessageError::UnsupportedAnycast);
            }
            let len = slice.load_u64(9).context("addr_len")?;
            slice.skip_bits(32).context("workchain_id")?;
            slice.skip_bits(len as usize).context("address")?;
            trace!(%tag, len, "skipped address");
            Ok(None)
        }
    }
}
