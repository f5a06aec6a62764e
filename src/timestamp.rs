//! Windows timestamp encodings found in shortcut files.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use std::fmt;

/// Seconds between 1601-01-01 (FILETIME epoch) and 1970-01-01.
pub const FILETIME_UNIX_DIFF: i64 = 11_644_473_600;

/// FILETIME ticks per second (100ns resolution).
const TICKS_PER_SECOND: u64 = 10_000_000;

/// A Windows FILETIME: 100-nanosecond intervals since 1601-01-01 UTC.
///
/// A raw value of zero means "no timestamp". It is kept as-is rather than
/// converted, and reports as the nominal year 1601.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FileTime(pub u64);

impl FileTime {
    /// Creates a FILETIME from its raw tick count.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw tick count.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Returns true for the zero sentinel.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Converts to a UTC date-time, or `None` for the zero sentinel.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        if self.is_empty() {
            return None;
        }

        let seconds = (self.0 / TICKS_PER_SECOND) as i64 - FILETIME_UNIX_DIFF;
        let nanos = ((self.0 % TICKS_PER_SECOND) * 100) as u32;

        DateTime::from_timestamp(seconds, nanos)
    }

    /// Calendar year, 1601 for the zero sentinel.
    pub fn year(&self) -> i32 {
        self.to_datetime().map_or(1601, |dt| dt.year())
    }
}

impl fmt::Display for FileTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            None => Ok(()),
        }
    }
}

/// A FAT (MS-DOS) date and time pair, as stored in shell items.
///
/// The low word holds the date, the high word holds the time with
/// two-second resolution. Values are local time with no zone information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DosDateTime(pub u32);

impl DosDateTime {
    /// Creates a FAT timestamp from its raw value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw value.
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Returns true if no date was stored.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Decodes the date and time. Invalid fields yield `None`.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        if self.is_empty() {
            return None;
        }

        let date = self.0 & 0xFFFF;
        let time = self.0 >> 16;

        let day = date & 0x1F;
        let month = (date >> 5) & 0x0F;
        let year = ((date >> 9) & 0x7F) as i32 + 1980;

        let seconds = (time & 0x1F) * 2;
        let minutes = (time >> 5) & 0x3F;
        let hours = (time >> 11) & 0x1F;

        let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hours, minutes, seconds)?;
        Some(Utc.from_utc_datetime(&naive))
    }
}

impl fmt::Display for DosDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            None => Ok(()),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FileTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.to_datetime(), serializer)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DosDateTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.to_datetime(), serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_sentinel() {
        let ft = FileTime::new(0);
        assert!(ft.is_empty());
        assert!(ft.to_datetime().is_none());
        assert_eq!(ft.year(), 1601);
        assert_eq!(ft.to_string(), "");
    }

    #[test]
    fn test_filetime_conversion() {
        let ft = FileTime::new(u64::from_le_bytes([159, 38, 31, 30, 26, 246, 216, 1]));
        assert_eq!(ft.to_datetime().unwrap().timestamp(), 1668204504);
        assert_eq!(ft.year(), 2022);
    }

    #[test]
    fn test_unix_epoch() {
        let ft = FileTime::new(FILETIME_UNIX_DIFF as u64 * TICKS_PER_SECOND);
        assert_eq!(ft.to_datetime().unwrap().timestamp(), 0);
    }

    #[test]
    fn test_dos_datetime() {
        let dos = DosDateTime::new(u32::from_le_bytes([196, 78, 156, 189]));
        let dt = dos.to_datetime().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2019-06-04 23:44:56");
    }

    #[test]
    fn test_dos_invalid_month() {
        // Month 0 is not a valid date.
        assert!(DosDateTime::new(0x0000_0001).to_datetime().is_none());
        assert!(DosDateTime::new(0).to_datetime().is_none());
    }
}
