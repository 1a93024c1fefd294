//! Opaque operator identifiers

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Identity of an already-authenticated actor.
///
/// Serialized as `0x` hex like its `Display`; deserializes from that, a
/// decimal string or an unsigned integer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct OperatorId(pub u64);

impl OperatorId {
    /// The null identifier. Never seeded as an owner.
    pub const NULL: OperatorId = OperatorId(0);

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for OperatorId {
    fn from(v: u64) -> Self {
        OperatorId(v)
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::Debug for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OperatorId({:#x})", self.0)
    }
}

impl FromStr for OperatorId {
    type Err = Error;

    /// Accepts decimal or `0x`-prefixed hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse(),
        };
        parsed
            .map(OperatorId)
            .map_err(|e| Error::Decode(format!("invalid operator id '{}': {}", s, e)))
    }
}

impl Serialize for OperatorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct OperatorIdVisitor;

impl<'de> Visitor<'de> for OperatorIdVisitor {
    type Value = OperatorId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an operator id as an unsigned integer or a decimal or hex string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<OperatorId, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<OperatorId, E> {
        Ok(OperatorId(v))
    }

    // TOML integers arrive signed
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<OperatorId, E> {
        u64::try_from(v)
            .map(OperatorId)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }
}

impl<'de> Deserialize<'de> for OperatorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OperatorIdVisitor)
    }
}
