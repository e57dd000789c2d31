//! Permission masks.
//!
//! The default mask used when a caller requests `0` is `READ | WRITE`. It is
//! deliberately not "every defined bit": `DELEGATE` must always be asked for
//! explicitly.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, Result};

bitflags! {
    /// Bitset of actions a key may perform within a namespace.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PermissionMask: u32 {
        /// Pull / read content.
        const READ = 0x1;
        /// Push / write content.
        const WRITE = 0x2;
        /// Issue grants to other keys within the scope.
        const DELEGATE = 0x4;
    }
}

impl PermissionMask {
    /// Mask substituted for a zero request.
    pub const DEFAULT_REQUEST: Self = Self::READ.union(Self::WRITE);

    /// Validate raw bits, rejecting undefined ones. Zero is allowed here and
    /// yields the empty mask; boundaries decide what zero means.
    pub fn from_raw(bits: u32) -> Result<Self> {
        Self::from_bits(bits).ok_or(CoreError::InvalidMask(bits))
    }

    /// Validate a requested mask: undefined bits are an error, zero becomes
    /// `default`.
    pub fn requested(bits: u32, default: PermissionMask) -> Result<Self> {
        if bits == 0 {
            return Ok(default);
        }
        Self::from_raw(bits)
    }

    /// Validate a mask carried by a grant: undefined bits and zero are both
    /// rejected.
    pub fn granted(bits: u32) -> Result<Self> {
        let mask = Self::from_raw(bits)?;
        if mask.is_empty() {
            return Err(CoreError::EmptyMask);
        }
        Ok(mask)
    }
}

impl Default for PermissionMask {
    fn default() -> Self {
        Self::DEFAULT_REQUEST
    }
}

impl Serialize for PermissionMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for PermissionMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let bits = u32::deserialize(deserializer)?;
        PermissionMask::from_raw(bits).map_err(serde::de::Error::custom)
    }
}
