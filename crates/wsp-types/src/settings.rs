//! The 256-byte settings block at address 0.
//!
//! Multi-byte fields are little-endian. Temperatures are sign-magnitude
//! tenths of a degree, pressures tenths of hPa, rain counts 0.3 mm ticks.

use bytes::Buf;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bcd::BcdDate;
use crate::error::{ParseError, ParseResult};
use crate::layout::{HISTORY_MAX, MAGIC_NUMBER, SETTINGS_BLOCK_SIZE};
use crate::units::fix_sign;

/// Temperature display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

/// Rain display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RainUnit {
    Millimetre,
    Inch,
}

/// Pressure display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PressureUnit {
    Hpa,
    InHg,
    MmHg,
}

/// Wind speed display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WindSpeedUnit {
    MetresPerSecond,
    KilometresPerHour,
    Knot,
    MilesPerHour,
    Beaufort,
}

/// What the second line of the date area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DateLine {
    Year,
    DayName,
    AlarmTime,
}

/// What the outdoor temperature area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OutdoorLine {
    Temperature,
    WindChill,
    DewPoint,
}

/// Which rain total the display shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RainPeriod {
    Hour,
    Day,
    Week,
    Month,
    Total,
}

fn bit(flags: u8, n: u8) -> bool {
    flags & (1 << n) != 0
}

/// Variant for the lowest set bit of `flags`, counting from bit `first`.
fn first_set<T: Copy>(flags: u8, first: u8, variants: &[T]) -> Option<T> {
    variants
        .iter()
        .enumerate()
        .find(|(i, _)| bit(flags, first + *i as u8))
        .map(|(_, v)| *v)
}

/// Unit bitmasks at offsets 17 and 18.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitSettings {
    pub flags1: u8,
    pub flags2: u8,
}

impl UnitSettings {
    #[must_use]
    pub fn indoor_temperature(&self) -> TemperatureUnit {
        if bit(self.flags1, 0) {
            TemperatureUnit::Fahrenheit
        } else {
            TemperatureUnit::Celsius
        }
    }

    #[must_use]
    pub fn outdoor_temperature(&self) -> TemperatureUnit {
        if bit(self.flags1, 1) {
            TemperatureUnit::Fahrenheit
        } else {
            TemperatureUnit::Celsius
        }
    }

    /// Bit 2 set selects millimetres.
    #[must_use]
    pub fn rain(&self) -> RainUnit {
        if bit(self.flags1, 2) {
            RainUnit::Millimetre
        } else {
            RainUnit::Inch
        }
    }

    /// `None` when no pressure bit is set.
    #[must_use]
    pub fn pressure(&self) -> Option<PressureUnit> {
        first_set(
            self.flags1,
            5,
            &[PressureUnit::Hpa, PressureUnit::InHg, PressureUnit::MmHg],
        )
    }

    /// `None` when no wind speed bit is set.
    #[must_use]
    pub fn wind_speed(&self) -> Option<WindSpeedUnit> {
        first_set(
            self.flags2,
            0,
            &[
                WindSpeedUnit::MetresPerSecond,
                WindSpeedUnit::KilometresPerHour,
                WindSpeedUnit::Knot,
                WindSpeedUnit::MilesPerHour,
                WindSpeedUnit::Beaufort,
            ],
        )
    }
}

/// Display option bitmasks at offsets 19 and 20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayOptions {
    pub flags1: u8,
    pub flags2: u8,
}

impl DisplayOptions {
    /// Show relative rather than absolute pressure.
    #[must_use]
    pub fn relative_pressure(&self) -> bool {
        bit(self.flags1, 0)
    }

    /// Show gust rather than average wind speed.
    #[must_use]
    pub fn wind_gust(&self) -> bool {
        bit(self.flags1, 1)
    }

    #[must_use]
    pub fn time_12h(&self) -> bool {
        bit(self.flags1, 2)
    }

    /// Month before day in the date.
    #[must_use]
    pub fn month_first(&self) -> bool {
        bit(self.flags1, 3)
    }

    /// Use a 24 hour scale for the pressure graph.
    #[must_use]
    pub fn time_scale_24h(&self) -> bool {
        bit(self.flags1, 4)
    }

    #[must_use]
    pub fn date_line(&self) -> Option<DateLine> {
        first_set(
            self.flags1,
            5,
            &[DateLine::Year, DateLine::DayName, DateLine::AlarmTime],
        )
    }

    #[must_use]
    pub fn outdoor_line(&self) -> Option<OutdoorLine> {
        first_set(
            self.flags2,
            0,
            &[
                OutdoorLine::Temperature,
                OutdoorLine::WindChill,
                OutdoorLine::DewPoint,
            ],
        )
    }

    #[must_use]
    pub fn rain_period(&self) -> Option<RainPeriod> {
        first_set(
            self.flags2,
            3,
            &[
                RainPeriod::Hour,
                RainPeriod::Day,
                RainPeriod::Week,
                RainPeriod::Month,
                RainPeriod::Total,
            ],
        )
    }
}

/// A station alarm that can be switched on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Alarm {
    Time,
    WindDirection,
    IndoorHumidityLow,
    IndoorHumidityHigh,
    OutdoorHumidityLow,
    OutdoorHumidityHigh,
    WindAverage,
    WindGust,
    RainHourly,
    RainDaily,
    AbsPressureLow,
    AbsPressureHigh,
    RelPressureLow,
    RelPressureHigh,
    IndoorTempLow,
    IndoorTempHigh,
    OutdoorTempLow,
    OutdoorTempHigh,
    WindChillLow,
    WindChillHigh,
    DewPointLow,
    DewPointHigh,
}

impl Alarm {
    pub const ALL: [Alarm; 22] = [
        Alarm::Time,
        Alarm::WindDirection,
        Alarm::IndoorHumidityLow,
        Alarm::IndoorHumidityHigh,
        Alarm::OutdoorHumidityLow,
        Alarm::OutdoorHumidityHigh,
        Alarm::WindAverage,
        Alarm::WindGust,
        Alarm::RainHourly,
        Alarm::RainDaily,
        Alarm::AbsPressureLow,
        Alarm::AbsPressureHigh,
        Alarm::RelPressureLow,
        Alarm::RelPressureHigh,
        Alarm::IndoorTempLow,
        Alarm::IndoorTempHigh,
        Alarm::OutdoorTempLow,
        Alarm::OutdoorTempHigh,
        Alarm::WindChillLow,
        Alarm::WindChillHigh,
        Alarm::DewPointLow,
        Alarm::DewPointHigh,
    ];

    /// Byte (0..3) and bit of the enable flag.
    fn location(self) -> (usize, u8) {
        match self {
            Alarm::Time => (0, 1),
            Alarm::WindDirection => (0, 2),
            Alarm::IndoorHumidityLow => (0, 4),
            Alarm::IndoorHumidityHigh => (0, 5),
            Alarm::OutdoorHumidityLow => (0, 6),
            Alarm::OutdoorHumidityHigh => (0, 7),
            Alarm::WindAverage => (1, 0),
            Alarm::WindGust => (1, 1),
            Alarm::RainHourly => (1, 2),
            Alarm::RainDaily => (1, 3),
            Alarm::AbsPressureLow => (1, 4),
            Alarm::AbsPressureHigh => (1, 5),
            Alarm::RelPressureLow => (1, 6),
            Alarm::RelPressureHigh => (1, 7),
            Alarm::IndoorTempLow => (2, 0),
            Alarm::IndoorTempHigh => (2, 1),
            Alarm::OutdoorTempLow => (2, 2),
            Alarm::OutdoorTempHigh => (2, 3),
            Alarm::WindChillLow => (2, 4),
            Alarm::WindChillHigh => (2, 5),
            Alarm::DewPointLow => (2, 6),
            Alarm::DewPointHigh => (2, 7),
        }
    }
}

/// Alarm enable bitmasks at offsets 21 to 23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlarmEnable {
    pub flags: [u8; 3],
}

impl AlarmEnable {
    #[must_use]
    pub fn is_enabled(&self, alarm: Alarm) -> bool {
        let (byte, n) = alarm.location();
        bit(self.flags[byte], n)
    }

    /// All alarms that are switched on.
    pub fn enabled(&self) -> impl Iterator<Item = Alarm> + '_ {
        Alarm::ALL.into_iter().filter(|a| self.is_enabled(*a))
    }
}

/// Alarm thresholds, offsets 48 to 88.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlarmThresholds {
    pub indoor_humidity_high: u8,
    pub indoor_humidity_low: u8,
    pub indoor_temp_high: i32,
    pub indoor_temp_low: i32,
    pub outdoor_humidity_high: u8,
    pub outdoor_humidity_low: u8,
    pub outdoor_temp_high: i32,
    pub outdoor_temp_low: i32,
    pub wind_chill_high: i32,
    pub wind_chill_low: i32,
    pub dew_point_high: i32,
    pub dew_point_low: i32,
    pub abs_pressure_high: u16,
    pub abs_pressure_low: u16,
    pub rel_pressure_high: u16,
    pub rel_pressure_low: u16,
    pub avg_wind_beaufort: u8,
    /// Tenths of m/s.
    pub avg_wind_speed: u8,
    pub gust_beaufort: u8,
    /// Tenths of m/s.
    pub gust_speed: u8,
    pub wind_direction: u8,
    pub rain_hourly: u16,
    pub rain_daily: u16,
    /// Raw alarm clock time; see [`AlarmThresholds::time_hm`].
    pub time: u16,
}

impl AlarmThresholds {
    /// Alarm clock as `(hour, minute)`, one BCD byte each.
    #[must_use]
    pub fn time_hm(&self) -> (u8, u8) {
        let [hour, minute] = self.time.to_le_bytes();
        (
            crate::bcd::bcd_to_decimal(hour),
            crate::bcd::bcd_to_decimal(minute),
        )
    }
}

/// A recorded extreme value and when it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extreme<T> {
    pub value: T,
    pub at: BcdDate,
}

/// Recorded maxima and minima, offsets 98 to 255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extremes {
    pub max_indoor_humidity: Extreme<u8>,
    pub min_indoor_humidity: Extreme<u8>,
    pub max_outdoor_humidity: Extreme<u8>,
    pub min_outdoor_humidity: Extreme<u8>,
    pub max_indoor_temp: Extreme<i32>,
    pub min_indoor_temp: Extreme<i32>,
    pub max_outdoor_temp: Extreme<i32>,
    pub min_outdoor_temp: Extreme<i32>,
    pub max_wind_chill: Extreme<i32>,
    pub min_wind_chill: Extreme<i32>,
    pub max_dew_point: Extreme<i32>,
    pub min_dew_point: Extreme<i32>,
    pub max_abs_pressure: Extreme<u16>,
    pub min_abs_pressure: Extreme<u16>,
    pub max_rel_pressure: Extreme<u16>,
    pub min_rel_pressure: Extreme<u16>,
    pub max_avg_wind: Extreme<u16>,
    pub max_gust: Extreme<u16>,
    pub max_rain_hourly: Extreme<u16>,
    pub max_rain_daily: Extreme<u16>,
    pub max_rain_weekly: Extreme<u16>,
    pub max_rain_monthly: Extreme<u16>,
    pub max_rain_total: Extreme<u16>,
}

/// Decoded settings block.
///
/// Decoding never fails on content: the magic number is exposed so the
/// caller can decide whether the block is trustworthy, see
/// [`StationSettings::has_valid_magic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationSettings {
    pub magic_number: [u8; 2],
    /// Minutes between stored readings.
    pub read_period: u8,
    pub units: UnitSettings,
    pub display: DisplayOptions,
    pub alarm_enable: AlarmEnable,
    /// Hours from CET.
    pub timezone: i8,
    pub data_refreshed: u8,
    pub data_count: u16,
    pub current_pos: u16,
    pub relative_pressure: u16,
    pub absolute_pressure: u16,
    pub unknown: [u8; 7],
    pub datetime: BcdDate,
    pub alarms: AlarmThresholds,
    pub extremes: Extremes,
}

/// Field reader over a settings block whose length has been checked.
struct Fields<'a>(&'a [u8]);

impl Fields<'_> {
    fn u8(&self, offset: usize) -> u8 {
        self.0[offset]
    }

    fn i8(&self, offset: usize) -> i8 {
        (&self.0[offset..]).get_i8()
    }

    fn u16(&self, offset: usize) -> u16 {
        (&self.0[offset..]).get_u16_le()
    }

    fn signed(&self, offset: usize) -> i32 {
        fix_sign(self.u16(offset))
    }

    fn date(&self, offset: usize) -> BcdDate {
        BcdDate::from_bytes(&self.0[offset..]).unwrap_or_default()
    }

    fn bytes<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut out = [0u8; N];
        (&self.0[offset..]).copy_to_slice(&mut out);
        out
    }

    fn extreme_u8(&self, value: usize, date: usize) -> Extreme<u8> {
        Extreme {
            value: self.u8(value),
            at: self.date(date),
        }
    }

    fn extreme_u16(&self, value: usize, date: usize) -> Extreme<u16> {
        Extreme {
            value: self.u16(value),
            at: self.date(date),
        }
    }

    fn extreme_signed(&self, value: usize, date: usize) -> Extreme<i32> {
        Extreme {
            value: self.signed(value),
            at: self.date(date),
        }
    }
}

impl StationSettings {
    /// Decode a settings block.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InsufficientBytes`] if `data` is shorter than
    /// [`SETTINGS_BLOCK_SIZE`] (256) bytes.
    #[must_use = "parsing returns a Result that should be handled"]
    pub fn from_bytes(data: &[u8]) -> ParseResult<Self> {
        if data.len() < SETTINGS_BLOCK_SIZE {
            return Err(ParseError::insufficient(
                "StationSettings",
                SETTINGS_BLOCK_SIZE,
                data.len(),
            ));
        }
        let f = Fields(&data[..SETTINGS_BLOCK_SIZE]);

        let alarms = AlarmThresholds {
            indoor_humidity_high: f.u8(48),
            indoor_humidity_low: f.u8(49),
            indoor_temp_high: f.signed(50),
            indoor_temp_low: f.signed(52),
            outdoor_humidity_high: f.u8(54),
            outdoor_humidity_low: f.u8(55),
            outdoor_temp_high: f.signed(56),
            outdoor_temp_low: f.signed(58),
            wind_chill_high: f.signed(60),
            wind_chill_low: f.signed(62),
            dew_point_high: f.signed(64),
            dew_point_low: f.signed(66),
            abs_pressure_high: f.u16(68),
            abs_pressure_low: f.u16(70),
            rel_pressure_high: f.u16(72),
            rel_pressure_low: f.u16(74),
            avg_wind_beaufort: f.u8(76),
            avg_wind_speed: f.u8(77),
            gust_beaufort: f.u8(79),
            gust_speed: f.u8(80),
            wind_direction: f.u8(82),
            rain_hourly: f.u16(83),
            rain_daily: f.u16(85),
            time: f.u16(87),
        };

        let extremes = Extremes {
            max_indoor_humidity: f.extreme_u8(98, 141),
            min_indoor_humidity: f.extreme_u8(99, 146),
            max_outdoor_humidity: f.extreme_u8(100, 151),
            min_outdoor_humidity: f.extreme_u8(101, 156),
            max_indoor_temp: f.extreme_signed(102, 161),
            min_indoor_temp: f.extreme_signed(104, 166),
            max_outdoor_temp: f.extreme_signed(106, 171),
            min_outdoor_temp: f.extreme_signed(108, 176),
            max_wind_chill: f.extreme_signed(110, 181),
            min_wind_chill: f.extreme_signed(112, 186),
            max_dew_point: f.extreme_signed(114, 191),
            min_dew_point: f.extreme_signed(116, 196),
            max_abs_pressure: f.extreme_u16(118, 201),
            min_abs_pressure: f.extreme_u16(120, 206),
            max_rel_pressure: f.extreme_u16(122, 211),
            min_rel_pressure: f.extreme_u16(124, 216),
            max_avg_wind: f.extreme_u16(126, 221),
            max_gust: f.extreme_u16(128, 226),
            max_rain_hourly: f.extreme_u16(130, 231),
            max_rain_daily: f.extreme_u16(132, 236),
            max_rain_weekly: f.extreme_u16(134, 241),
            max_rain_monthly: f.extreme_u16(136, 246),
            max_rain_total: f.extreme_u16(138, 251),
        };

        Ok(Self {
            magic_number: f.bytes(0),
            read_period: f.u8(16),
            units: UnitSettings {
                flags1: f.u8(17),
                flags2: f.u8(18),
            },
            display: DisplayOptions {
                flags1: f.u8(19),
                flags2: f.u8(20),
            },
            alarm_enable: AlarmEnable {
                flags: f.bytes(21),
            },
            timezone: f.i8(24),
            data_refreshed: f.u8(26),
            data_count: f.u16(27),
            current_pos: f.u16(30),
            relative_pressure: f.u16(32),
            absolute_pressure: f.u16(34),
            unknown: f.bytes(36),
            datetime: f.date(43),
            alarms,
            extremes,
        })
    }

    /// Whether offsets 0 and 1 hold `0x55 0xAA`.
    #[must_use]
    pub fn has_valid_magic(&self) -> bool {
        self.magic_number == MAGIC_NUMBER
    }

    /// Whether the history ring has wrapped and every slot holds a record.
    #[must_use]
    pub fn history_full(&self) -> bool {
        self.data_count >= HISTORY_MAX
    }

    /// Stored reading count as a percentage of the ring capacity.
    #[must_use]
    pub fn fill_percent(&self) -> f32 {
        f32::from(self.data_count.min(HISTORY_MAX)) * 100.0 / f32::from(HISTORY_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> Vec<u8> {
        let mut block = vec![0u8; SETTINGS_BLOCK_SIZE];
        block[0] = 0x55;
        block[1] = 0xAA;
        block[16] = 30;
        block[17] = 0b0010_0100; // mm, hPa
        block[18] = 0b0000_0001; // m/s
        block[19] = 0b0010_0011;
        block[20] = 0b0000_1001;
        block[21] = 0b0010_0010;
        block[22] = 0b0000_0001;
        block[23] = 0b1000_0000;
        block[24] = 0xFF; // -1
        block[27..29].copy_from_slice(&100u16.to_le_bytes());
        block[30..32].copy_from_slice(&0x0730u16.to_le_bytes());
        block[32..34].copy_from_slice(&10132u16.to_le_bytes());
        block[34..36].copy_from_slice(&10080u16.to_le_bytes());
        block[36..43].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7]);
        block[43..48].copy_from_slice(&[0x10, 0x05, 0x14, 0x09, 0x30]);
        block[50..52].copy_from_slice(&0x80C8u16.to_le_bytes()); // -20.0
        block[87] = 0x07;
        block[88] = 0x45;
        block[108..110].copy_from_slice(&0x8064u16.to_le_bytes()); // -10.0
        block[176..181].copy_from_slice(&[0x10, 0x01, 0x02, 0x03, 0x04]);
        block[138..140].copy_from_slice(&1234u16.to_le_bytes());
        block[251..256].copy_from_slice(&[0x09, 0x12, 0x31, 0x23, 0x59]);
        block
    }

    #[test]
    fn test_decode_header_fields() {
        let settings = StationSettings::from_bytes(&sample_block()).unwrap();

        assert!(settings.has_valid_magic());
        assert_eq!(settings.read_period, 30);
        assert_eq!(settings.timezone, -1);
        assert_eq!(settings.data_count, 100);
        assert_eq!(settings.current_pos, 0x0730);
        assert_eq!(settings.relative_pressure, 10132);
        assert_eq!(settings.absolute_pressure, 10080);
        assert_eq!(settings.unknown, [1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(settings.datetime.to_string(), "2010-05-14 09:30:00");
    }

    #[test]
    fn test_decode_signed_thresholds_and_extremes() {
        let settings = StationSettings::from_bytes(&sample_block()).unwrap();

        assert_eq!(settings.alarms.indoor_temp_high, -200);
        assert_eq!(settings.alarms.time_hm(), (7, 45));
        assert_eq!(settings.extremes.min_outdoor_temp.value, -100);
        assert_eq!(
            settings.extremes.min_outdoor_temp.at.to_string(),
            "2010-01-02 03:04:00"
        );
        assert_eq!(settings.extremes.max_rain_total.value, 1234);
        assert_eq!(
            settings.extremes.max_rain_total.at.to_string(),
            "2009-12-31 23:59:00"
        );
    }

    #[test]
    fn test_decode_bitmasks() {
        let settings = StationSettings::from_bytes(&sample_block()).unwrap();

        assert_eq!(settings.units.indoor_temperature(), TemperatureUnit::Celsius);
        assert_eq!(settings.units.rain(), RainUnit::Millimetre);
        assert_eq!(settings.units.pressure(), Some(PressureUnit::Hpa));
        assert_eq!(settings.units.wind_speed(), Some(WindSpeedUnit::MetresPerSecond));

        assert!(settings.display.relative_pressure());
        assert!(settings.display.wind_gust());
        assert!(!settings.display.time_12h());
        assert_eq!(settings.display.date_line(), Some(DateLine::Year));
        assert_eq!(settings.display.outdoor_line(), Some(OutdoorLine::Temperature));
        assert_eq!(settings.display.rain_period(), Some(RainPeriod::Hour));

        let enabled: Vec<Alarm> = settings.alarm_enable.enabled().collect();
        assert_eq!(
            enabled,
            vec![
                Alarm::Time,
                Alarm::IndoorHumidityHigh,
                Alarm::WindAverage,
                Alarm::DewPointHigh
            ]
        );
    }

    #[test]
    fn test_magic_mismatch_still_decodes() {
        let mut block = sample_block();
        block[1] = 0x00;
        let settings = StationSettings::from_bytes(&block).unwrap();
        assert!(!settings.has_valid_magic());
        assert_eq!(settings.read_period, 30);
    }

    #[test]
    fn test_single_byte_change_touches_one_field() {
        let block = sample_block();
        let before = StationSettings::from_bytes(&block).unwrap();

        let mut changed = block.clone();
        changed[16] = 5;
        let mut after = StationSettings::from_bytes(&changed).unwrap();
        assert_eq!(after.read_period, 5);
        after.read_period = before.read_period;
        assert_eq!(after, before);
    }

    #[test]
    fn test_insufficient_bytes() {
        let err = StationSettings::from_bytes(&[0u8; 255]).unwrap_err();
        assert_eq!(
            err,
            ParseError::InsufficientBytes {
                what: "StationSettings",
                expected: 256,
                actual: 255
            }
        );
    }

    #[test]
    fn test_history_full_and_fill_percent() {
        let mut settings = StationSettings::from_bytes(&sample_block()).unwrap();
        assert!(!settings.history_full());
        assert!((settings.fill_percent() - 2.45).abs() < 0.01);
        settings.data_count = HISTORY_MAX;
        assert!(settings.history_full());
        settings.data_count = 5000;
        assert_eq!(settings.fill_percent(), 100.0);
    }

    #[test]
    fn test_rain_unit_bit() {
        let mm = UnitSettings { flags1: 0b0000_0100, flags2: 0 };
        assert_eq!(mm.rain(), RainUnit::Millimetre);
        let inch = UnitSettings { flags1: 0b0010_0000, flags2: 0 };
        assert_eq!(inch.rain(), RainUnit::Inch);
    }
}
