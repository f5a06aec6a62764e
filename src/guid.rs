//! Windows GUID handling.
//!
//! GUIDs are stored as 16 bytes where the first three groups are
//! little-endian. Version-1 UUIDs (used by the link tracker) also embed a
//! creation timestamp and the MAC address of the generating machine.

use crate::error::{LnkError, Result};
use chrono::{DateTime, Utc};
use std::fmt;

/// Size of a GUID in bytes.
pub const GUID_SIZE: usize = 16;

/// 100ns intervals between 1582-10-15 (UUID epoch) and 1970-01-01.
const UUID_UNIX_DIFF: u64 = 0x01B2_1DD2_1381_4000;

/// A 128-bit Windows GUID in on-disk byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid(pub [u8; GUID_SIZE]);

impl Guid {
    /// Creates a GUID from its on-disk bytes.
    pub const fn from_bytes(bytes: [u8; GUID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Reads a GUID from the first 16 bytes of `data`.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let bytes: [u8; GUID_SIZE] = data
            .get(..GUID_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| LnkError::truncated(0, GUID_SIZE, data.len()))?;
        Ok(Self(bytes))
    }

    /// Returns the raw on-disk bytes.
    pub fn as_bytes(&self) -> &[u8; GUID_SIZE] {
        &self.0
    }

    /// First group (little-endian u32).
    pub fn data1(&self) -> u32 {
        u32::from_le_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Second group (little-endian u16).
    pub fn data2(&self) -> u16 {
        u16::from_le_bytes([self.0[4], self.0[5]])
    }

    /// Third group (little-endian u16).
    pub fn data3(&self) -> u16 {
        u16::from_le_bytes([self.0[6], self.0[7]])
    }

    /// Returns true if all bytes are zero.
    pub fn is_nil(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// UUID version number (high nibble of the third group).
    pub fn uuid_version(&self) -> u8 {
        (self.data3() >> 12) as u8
    }

    /// Node field (last six bytes). For version-1 UUIDs this is a MAC address.
    pub fn node(&self) -> [u8; 6] {
        let mut node = [0u8; 6];
        node.copy_from_slice(&self.0[10..16]);
        node
    }

    /// Node field formatted as a colon-separated MAC address.
    pub fn mac_address(&self) -> String {
        self.node()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Creation time embedded in a version-1 UUID.
    ///
    /// Returns `None` for other versions or timestamps before the Unix epoch.
    pub fn uuid_timestamp(&self) -> Option<DateTime<Utc>> {
        if self.uuid_version() != 1 {
            return None;
        }

        let ticks = (u64::from(self.data3() & 0x0FFF) << 48)
            | (u64::from(self.data2()) << 32)
            | u64::from(self.data1());
        let unix_ticks = ticks.checked_sub(UUID_UNIX_DIFF)?;

        DateTime::from_timestamp(
            (unix_ticks / 10_000_000) as i64,
            ((unix_ticks % 10_000_000) * 100) as u32,
        )
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{}-{}",
            self.data1(),
            self.data2(),
            self.data3(),
            hex::encode(&self.0[8..10]),
            hex::encode(&self.0[10..16])
        )
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Guid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
