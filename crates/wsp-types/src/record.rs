//! History chunks: one weather reading per 16 bytes.

use core::fmt::Write as _;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{ParseError, ParseResult};
use crate::layout::{HISTORY_CHUNK_SIZE, LOST_SENSOR_CONTACT_BIT, RAIN_COUNTER_OVERFLOW_BIT};
use crate::units::{WindDirection, fix_sign, rain_mm, tenths, DIRECTION_SCALE, PRESSURE_SCALE, WIND_SCALE};

/// A decoded history chunk.
///
/// Layout (little-endian):
/// - byte 0: minutes since the previous record
/// - byte 1: indoor humidity (%)
/// - bytes 2-3: indoor temperature (sign-magnitude tenths of °C)
/// - byte 4: outdoor humidity (%)
/// - bytes 5-6: outdoor temperature (sign-magnitude tenths of °C)
/// - bytes 7-8: absolute pressure (tenths of hPa)
/// - byte 9: average wind, low 8 bits
/// - byte 10: gust, low 8 bits
/// - byte 11: wind high nibbles (average low nibble, gust high nibble)
/// - byte 12: wind direction code, bit 7 set when invalid
/// - bytes 13-14: rain counter (0.3 mm ticks)
/// - byte 15: status bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeatherRecord {
    /// Minutes between this record and the one before it.
    pub delay: u8,
    pub indoor_humidity: u8,
    /// Tenths of °C.
    pub indoor_temp: i32,
    pub outdoor_humidity: u8,
    /// Tenths of °C.
    pub outdoor_temp: i32,
    /// Tenths of hPa.
    pub abs_pressure: u16,
    pub avg_wind_low: u8,
    pub gust_wind_low: u8,
    pub wind_high: u8,
    pub wind_direction: u8,
    /// Rain counter in 0.3 mm ticks.
    pub total_rain: u16,
    pub status: u8,
    /// The undecoded chunk.
    pub raw: [u8; HISTORY_CHUNK_SIZE],
}

impl WeatherRecord {
    /// Decode a record from the first 16 bytes of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InsufficientBytes`] if `data` is shorter than
    /// [`HISTORY_CHUNK_SIZE`].
    #[must_use = "parsing returns a Result that should be handled"]
    pub fn from_bytes(data: &[u8]) -> ParseResult<Self> {
        use bytes::Buf;

        if data.len() < HISTORY_CHUNK_SIZE {
            return Err(ParseError::insufficient(
                "WeatherRecord",
                HISTORY_CHUNK_SIZE,
                data.len(),
            ));
        }

        let mut raw = [0u8; HISTORY_CHUNK_SIZE];
        raw.copy_from_slice(&data[..HISTORY_CHUNK_SIZE]);

        let mut buf = &raw[..];
        Ok(Self {
            delay: buf.get_u8(),
            indoor_humidity: buf.get_u8(),
            indoor_temp: fix_sign(buf.get_u16_le()),
            outdoor_humidity: buf.get_u8(),
            outdoor_temp: fix_sign(buf.get_u16_le()),
            abs_pressure: buf.get_u16_le(),
            avg_wind_low: buf.get_u8(),
            gust_wind_low: buf.get_u8(),
            wind_high: buf.get_u8(),
            wind_direction: buf.get_u8(),
            total_rain: buf.get_u16_le(),
            status: buf.get_u8(),
            raw,
        })
    }

    /// Indoor temperature in °C.
    #[must_use]
    pub fn indoor_temperature(&self) -> f32 {
        tenths(self.indoor_temp)
    }

    /// Outdoor temperature in °C.
    #[must_use]
    pub fn outdoor_temperature(&self) -> f32 {
        tenths(self.outdoor_temp)
    }

    /// Absolute pressure in hPa.
    #[must_use]
    pub fn abs_pressure_hpa(&self) -> f32 {
        f32::from(self.abs_pressure) * PRESSURE_SCALE
    }

    /// Average wind speed in tenths of m/s (12 bits).
    #[must_use]
    pub fn avg_wind_raw(&self) -> u16 {
        (u16::from(self.wind_high & 0x0F) << 8) | u16::from(self.avg_wind_low)
    }

    /// Gust speed in tenths of m/s (12 bits).
    #[must_use]
    pub fn gust_wind_raw(&self) -> u16 {
        (u16::from((self.wind_high >> 4) & 0x0F) << 8) | u16::from(self.gust_wind_low)
    }

    /// Average wind speed in m/s.
    #[must_use]
    pub fn avg_wind_speed(&self) -> f32 {
        f32::from(self.avg_wind_raw()) * WIND_SCALE
    }

    /// Gust speed in m/s.
    #[must_use]
    pub fn gust_speed(&self) -> f32 {
        f32::from(self.gust_wind_raw()) * WIND_SCALE
    }

    /// Wind direction, `None` when the vane reading is flagged invalid.
    #[must_use]
    pub fn direction(&self) -> Option<WindDirection> {
        WindDirection::from_code(self.wind_direction)
    }

    /// Wind direction in degrees computed from the raw code.
    ///
    /// Unlike [`direction`](Self::direction) this does not check the
    /// invalid bit.
    #[must_use]
    pub fn direction_degrees(&self) -> f32 {
        f32::from(self.wind_direction) * DIRECTION_SCALE
    }

    /// Compass label, or `"--"` for an invalid reading.
    #[must_use]
    pub fn direction_label(&self) -> &'static str {
        self.direction().map_or("--", WindDirection::label)
    }

    /// Rain counter in millimetres.
    #[must_use]
    pub fn total_rain_mm(&self) -> f32 {
        rain_mm(self.total_rain)
    }

    /// Whether status bit `n` (0..=7) is set.
    #[must_use]
    pub fn status_bit(&self, n: u8) -> bool {
        n < 8 && self.status & (1 << n) != 0
    }

    /// Whether the outdoor sensor was in contact when this was recorded.
    #[must_use]
    pub fn sensor_contact(&self) -> bool {
        !self.status_bit(LOST_SENSOR_CONTACT_BIT)
    }

    /// Whether the rain counter wrapped around.
    #[must_use]
    pub fn rain_overflow(&self) -> bool {
        self.status_bit(RAIN_COUNTER_OVERFLOW_BIT)
    }

    /// Raw bytes as uppercase hex, each followed by a space.
    #[must_use]
    pub fn raw_hex(&self) -> String {
        let mut out = String::with_capacity(HISTORY_CHUNK_SIZE * 3);
        for byte in self.raw {
            let _ = write!(out, "{byte:02X} ");
        }
        out
    }
}

/// A history record placed in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryItem {
    /// Logical 1-based position, oldest first.
    pub index: u16,
    /// Device address the chunk was read from.
    pub address: u16,
    /// When the reading was taken.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub record: WeatherRecord,
}
