//! Memory layout and record types for Fineoffset USB weather stations
//! (WH1080, WH1081, WH3080 and rebadged variants).
//!
//! This crate only decodes bytes. Talking to the station, rebuilding the
//! history timeline and derived metrics live in `wsp-core`.
//!
//! # Features
//!
//! - Settings block decoding ([`StationSettings`])
//! - History chunk decoding ([`WeatherRecord`])
//! - Packed-BCD timestamps ([`BcdDate`])
//! - Sign-magnitude values and wind direction codes ([`units`])
//! - Memory map constants and ring arithmetic ([`layout`])
//!
//! # Example
//!
//! ```
//! use wsp_types::{WeatherRecord, WindDirection};
//!
//! let chunk = [5, 40, 0xC8, 0x00, 70, 0x32, 0x80, 0x94, 0x27, 12, 20, 0, 4, 0, 0, 0];
//! let record = WeatherRecord::from_bytes(&chunk).unwrap();
//! assert_eq!(record.indoor_temp, 200);
//! assert_eq!(record.outdoor_temp, -50);
//! assert_eq!(record.direction(), Some(WindDirection::E));
//! ```

pub mod bcd;
pub mod error;
pub mod layout;
pub mod record;
pub mod settings;
pub mod units;

pub use bcd::BcdDate;
pub use error::{ParseError, ParseResult};
pub use record::{HistoryItem, WeatherRecord};
pub use settings::{
    Alarm, AlarmEnable, AlarmThresholds, DateLine, DisplayOptions, Extreme, Extremes,
    OutdoorLine, PressureUnit, RainPeriod, RainUnit, StationSettings, TemperatureUnit,
    UnitSettings, WindSpeedUnit,
};
pub use units::{WindDirection, fix_sign};

#[cfg(test)]
mod tests {
    use super::*;

    // --- Cross-module decoding tests ---

    #[test]
    fn test_settings_datetime_resolves_at_offset() {
        let mut block = vec![0u8; layout::SETTINGS_BLOCK_SIZE];
        block[..2].copy_from_slice(&layout::MAGIC_NUMBER);
        block[43..48].copy_from_slice(&[0x11, 0x02, 0x28, 0x23, 0x45]);

        let settings = StationSettings::from_bytes(&block).unwrap();
        let at = settings
            .datetime
            .to_offset(time::UtcOffset::UTC)
            .unwrap();
        assert_eq!(at.year(), 2011);
        assert_eq!(at.hour(), 23);
        assert_eq!(at.minute(), 45);
    }

    #[test]
    fn test_record_from_settings_sized_buffer() {
        // A 32-byte transfer carries two chunks; only the first is decoded.
        let mut block = [0u8; layout::BLOCK_SIZE];
        block[0] = 30;
        block[16] = 99;
        let record = WeatherRecord::from_bytes(&block).unwrap();
        assert_eq!(record.delay, 30);
    }

    // --- Serialization tests ---

    #[cfg(feature = "serde")]
    #[test]
    fn test_history_item_serializes_rfc3339() {
        use time::macros::datetime;

        let item = HistoryItem {
            index: 7,
            address: 0x0160,
            timestamp: datetime!(2010-05-14 9:30 UTC),
            record: WeatherRecord::default(),
        };
        let json = serde_json::to_value(item).unwrap();
        assert_eq!(json["index"], 7);
        assert_eq!(json["timestamp"], "2010-05-14T09:30:00Z");
        assert_eq!(json["delay"], 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_settings_serialize_roundtrip() {
        let mut block = vec![0u8; layout::SETTINGS_BLOCK_SIZE];
        block[16] = 30;
        block[24] = 0x02;
        let settings = StationSettings::from_bytes(&block).unwrap();
        let json = serde_json::to_string(&settings).unwrap();
        let back: StationSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
