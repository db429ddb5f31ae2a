//! Packed-BCD timestamps as stored by the station.
//!
//! Every date in the settings block is five bytes: year (offset from 2000),
//! month, day, hour and minute, each byte holding two BCD digits. The station
//! runs in local wall-clock time with no seconds and no zone information.

use core::fmt;

use chrono::{Local, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::error::{ParseError, ParseResult};

/// Number of bytes in an encoded [`BcdDate`].
pub const BCD_DATE_BYTES: usize = 5;

/// Split a byte into its high and low nibble.
#[must_use]
pub fn bcd_digits(byte: u8) -> (u8, u8) {
    ((byte >> 4) & 0x0F, byte & 0x0F)
}

/// Decode one packed-BCD byte. Nibbles above 9 are not rejected, so
/// `0xFF` yields 165.
#[must_use]
pub fn bcd_to_decimal(byte: u8) -> u8 {
    let (hi, lo) = bcd_digits(byte);
    hi * 10 + lo
}

/// Encode a value 0..=99 as one packed-BCD byte.
#[must_use]
pub fn decimal_to_bcd(value: u8) -> u8 {
    (((value / 10) % 10) << 4) | (value % 10)
}

/// A decoded station timestamp, local wall-clock time.
///
/// Field values are exactly what the BCD digits say and may be out of range
/// (month 13, minute 75). Conversions to absolute time normalise them by
/// carrying into the next larger unit.
///
/// ```
/// use wsp_types::BcdDate;
///
/// let date = BcdDate::from_bytes(&[0x10, 0x05, 0x14, 0x09, 0x30]).unwrap();
/// assert_eq!(date.to_string(), "2010-05-14 09:30:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BcdDate {
    /// Full year, 2000 plus the first BCD byte.
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl BcdDate {
    /// Decode a date from the first five bytes of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InsufficientBytes`] if `data` is shorter than
    /// [`BCD_DATE_BYTES`].
    pub fn from_bytes(data: &[u8]) -> ParseResult<Self> {
        match data.get(..BCD_DATE_BYTES) {
            Some(&[year, month, day, hour, minute]) => Ok(Self {
                year: 2000 + u16::from(bcd_to_decimal(year)),
                month: bcd_to_decimal(month),
                day: bcd_to_decimal(day),
                hour: bcd_to_decimal(hour),
                minute: bcd_to_decimal(minute),
            }),
            _ => Err(ParseError::insufficient(
                "BcdDate",
                BCD_DATE_BYTES,
                data.len(),
            )),
        }
    }

    /// Encode back to the five-byte station format.
    ///
    /// Only the last two digits of the year are kept.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; BCD_DATE_BYTES] {
        [
            decimal_to_bcd((self.year % 100) as u8),
            decimal_to_bcd(self.month),
            decimal_to_bcd(self.day),
            decimal_to_bcd(self.hour),
            decimal_to_bcd(self.minute),
        ]
    }

    /// Calendar date and time with out-of-range fields carried over.
    ///
    /// Month 0 and day 0 step back, as `mktime` would.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidValue`] if the result is not representable.
    pub fn to_naive(&self) -> ParseResult<NaiveDateTime> {
        let months = i32::from(self.year) * 12 + i32::from(self.month) - 1;
        let first = NaiveDate::from_ymd_opt(months.div_euclid(12), months.rem_euclid(12) as u32 + 1, 1)
            .ok_or_else(|| self.out_of_range())?;
        let offset = TimeDelta::days(i64::from(self.day) - 1)
            + TimeDelta::hours(i64::from(self.hour))
            + TimeDelta::minutes(i64::from(self.minute));
        first
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| midnight.checked_add_signed(offset))
            .ok_or_else(|| self.out_of_range())
    }

    /// Resolve against the host's local time zone.
    ///
    /// An ambiguous wall-clock time (clocks going back) resolves to the
    /// daylight-saving reading. A time that does not exist (clocks going
    /// forward) is read as daylight-saving time, i.e. one hour earlier in
    /// standard time.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidValue`] if the date cannot be resolved.
    pub fn to_local(&self) -> ParseResult<OffsetDateTime> {
        let naive = self.to_naive()?;
        let resolved = match Local.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => Local
                .from_local_datetime(&(naive - TimeDelta::hours(1)))
                .earliest(),
        }
        .ok_or_else(|| self.out_of_range())?;

        let offset = UtcOffset::from_whole_seconds(resolved.offset().local_minus_utc())
            .map_err(|e| ParseError::InvalidValue(e.to_string()))?;
        OffsetDateTime::from_unix_timestamp(resolved.timestamp())
            .map(|t| t.to_offset(offset))
            .map_err(|e| ParseError::InvalidValue(e.to_string()))
    }

    /// Resolve against a fixed UTC offset.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidValue`] if the date cannot be resolved.
    pub fn to_offset(&self, offset: UtcOffset) -> ParseResult<OffsetDateTime> {
        let naive = self.to_naive()?;
        let local_seconds = naive.and_utc().timestamp();
        OffsetDateTime::from_unix_timestamp(local_seconds - i64::from(offset.whole_seconds()))
            .map(|t| t.to_offset(offset))
            .map_err(|e| ParseError::InvalidValue(e.to_string()))
    }

    fn out_of_range(&self) -> ParseError {
        ParseError::InvalidValue(format!("date {self} is out of range"))
    }
}

impl fmt::Display for BcdDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}-{:02} {:02}:{:02}:00",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}
