//! 256-bit permission bitmask

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, Not};
use std::str::FromStr;

use byteorder::{BigEndian, ByteOrder};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Fixed-width 256-bit bitmask used for both roles and features.
///
/// Limbs are stored least significant first, so bit `n` lives in
/// `limbs[n / 64]` at position `n % 64`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mask([u64; 4]);

impl Mask {
    pub const BITS: u32 = 256;
    pub const ZERO: Mask = Mask([0; 4]);
    pub const MAX: Mask = Mask([u64::MAX; 4]);

    /// Mask with only bit `n` set. Panics if `n >= 256`.
    pub const fn bit(n: u32) -> Mask {
        assert!(n < Self::BITS, "bit index out of range");
        let mut limbs = [0u64; 4];
        limbs[(n / 64) as usize] = 1 << (n % 64);
        Mask(limbs)
    }

    pub const fn from_u64(v: u64) -> Mask {
        Mask([v, 0, 0, 0])
    }

    pub const fn from_u128(v: u128) -> Mask {
        Mask([v as u64, (v >> 64) as u64, 0, 0])
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0[0] == 0 && self.0[1] == 0 && self.0[2] == 0 && self.0[3] == 0
    }

    /// True if every bit of `required` is set in `self`.
    #[inline]
    pub fn contains(&self, required: Mask) -> bool {
        *self & required == required
    }

    #[inline]
    pub fn count_ones(&self) -> u32 {
        self.0.iter().map(|l| l.count_ones()).sum()
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, limb) in self.0.iter().rev().enumerate() {
            BigEndian::write_u64(&mut out[i * 8..(i + 1) * 8], *limb);
        }
        out
    }

    pub fn from_be_bytes(bytes: &[u8; 32]) -> Mask {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().rev().enumerate() {
            *limb = BigEndian::read_u64(&bytes[i * 8..(i + 1) * 8]);
        }
        Mask(limbs)
    }

    /// Decode from a big-endian slice of exactly 32 bytes.
    pub fn from_be_slice(bytes: &[u8]) -> Result<Mask, Error> {
        let arr: &[u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::Decode(format!("mask must be 32 bytes, got {}", bytes.len())))?;
        Ok(Mask::from_be_bytes(arr))
    }
}

impl BitAnd for Mask {
    type Output = Mask;
    #[inline]
    fn bitand(self, rhs: Mask) -> Mask {
        Mask([self.0[0] & rhs.0[0], self.0[1] & rhs.0[1], self.0[2] & rhs.0[2], self.0[3] & rhs.0[3]])
    }
}

impl BitOr for Mask {
    type Output = Mask;
    #[inline]
    fn bitor(self, rhs: Mask) -> Mask {
        Mask([self.0[0] | rhs.0[0], self.0[1] | rhs.0[1], self.0[2] | rhs.0[2], self.0[3] | rhs.0[3]])
    }
}

impl BitXor for Mask {
    type Output = Mask;
    #[inline]
    fn bitxor(self, rhs: Mask) -> Mask {
        Mask([self.0[0] ^ rhs.0[0], self.0[1] ^ rhs.0[1], self.0[2] ^ rhs.0[2], self.0[3] ^ rhs.0[3]])
    }
}

impl Not for Mask {
    type Output = Mask;
    #[inline]
    fn not(self) -> Mask {
        Mask([!self.0[0], !self.0[1], !self.0[2], !self.0[3]])
    }
}

impl BitAndAssign for Mask {
    fn bitand_assign(&mut self, rhs: Mask) {
        *self = *self & rhs;
    }
}

impl BitOrAssign for Mask {
    fn bitor_assign(&mut self, rhs: Mask) {
        *self = *self | rhs;
    }
}

impl From<u64> for Mask {
    fn from(v: u64) -> Self {
        Mask::from_u64(v)
    }
}

impl From<u128> for Mask {
    fn from(v: u128) -> Self {
        Mask::from_u128(v)
    }
}

impl From<[u64; 4]> for Mask {
    /// Limbs least significant first.
    fn from(limbs: [u64; 4]) -> Self {
        Mask(limbs)
    }
}

impl fmt::LowerHex for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        let top = self.0.iter().rposition(|&l| l != 0);
        match top {
            None => f.write_str("0"),
            Some(top) => {
                write!(f, "{:x}", self.0[top])?;
                for limb in self.0[..top].iter().rev() {
                    write!(f, "{:016x}", limb)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self)
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mask({:#x})", self)
    }
}

impl FromStr for Mask {
    type Err = Error;

    /// Parses hex, with or without a `0x` prefix. Underscores are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let digits: String = digits.chars().filter(|c| *c != '_').collect();
        if digits.is_empty() || digits.len() > 64 {
            return Err(Error::Decode(format!("invalid mask '{}'", s)));
        }
        let mut limbs = [0u64; 4];
        for (i, c) in digits.chars().rev().enumerate() {
            let nibble = c
                .to_digit(16)
                .ok_or_else(|| Error::Decode(format!("invalid hex digit '{}' in mask", c)))?;
            limbs[i / 16] |= (nibble as u64) << ((i % 16) * 4);
        }
        Ok(Mask(limbs))
    }
}

impl Serialize for Mask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct MaskVisitor;

impl<'de> Visitor<'de> for MaskVisitor {
    type Value = Mask;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a hex string or an unsigned integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Mask, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Mask, E> {
        Ok(Mask::from_u64(v))
    }
}

impl<'de> Deserialize<'de> for Mask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MaskVisitor)
    }
}
