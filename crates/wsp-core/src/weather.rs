//! Derived weather metrics.
//!
//! Everything here is computed from decoded records; the station stores
//! none of these values per reading.

use tracing::debug;

use wsp_types::{HistoryItem, WeatherRecord};

use crate::history::History;
use crate::station::Station;
use crate::traits::StationMemory;

const DEW_A: f32 = 17.27;
const DEW_B: f32 = 237.7;

/// Seconds in one hour.
pub const HOUR: i64 = 3600;

/// Dew point in °C (Magnus formula).
///
/// Not a number when humidity is 0.
pub fn dew_point_from(temperature: f32, humidity: u8) -> f32 {
    let gamma = DEW_A * temperature / (DEW_B + temperature) + (f32::from(humidity) / 100.0).ln();
    DEW_B * gamma / (DEW_A - gamma)
}

/// Outdoor dew point of a record, in °C.
pub fn dew_point(record: &WeatherRecord) -> f32 {
    dew_point_from(record.outdoor_temperature(), record.outdoor_humidity)
}

/// Wind chill in °C (Court's formula).
///
/// Only applies below 33 °C with at least 1.79 m/s of wind; otherwise the
/// air temperature is returned unchanged.
pub fn wind_chill_from(temperature: f32, wind_speed: f32) -> f32 {
    if temperature < 33.0 && wind_speed >= 1.79 {
        33.0 + (temperature - 33.0) * (0.55 + 0.417 * wind_speed.sqrt() - 0.0454 * wind_speed)
    } else {
        temperature
    }
}

/// Outdoor wind chill of a record, from the average wind speed.
pub fn wind_chill(record: &WeatherRecord) -> f32 {
    wind_chill_from(record.outdoor_temperature(), record.avg_wind_speed())
}

/// Beaufort number for a wind speed in m/s.
pub fn beaufort(speed: f32) -> u8 {
    let force = (speed / 0.8365).powf(2.0 / 3.0) + 0.5;
    force as u8
}

/// Sea-level pressure in hPa for a station at `altitude` meters.
///
/// The scale height uses the raw outdoor temperature (tenths of °C), as
/// the station's own firmware does.
pub fn relative_pressure(record: &WeatherRecord, altitude: f32) -> f32 {
    let temp = record.outdoor_temp as f32;
    let exponent = altitude / (18429.1 + 67.53 * temp + 0.003 * altitude);
    record.abs_pressure_hpa() * 10f32.powf(exponent)
}

/// Rain fallen between two records, in mm.
pub fn rain_between(current: &HistoryItem, reference: &HistoryItem) -> f32 {
    current.record.total_rain_mm() - reference.record.total_rain_mm()
}

/// The newest loaded item at least `seconds` older than the slot at
/// `position`.
pub fn rain_reference(history: &History, position: usize, seconds: i64) -> Option<&HistoryItem> {
    let current = history.slots().get(position)?.as_ref()?;
    history.slots()[..position]
        .iter()
        .rev()
        .flatten()
        .find(|item| (current.timestamp - item.timestamp).whole_seconds() >= seconds)
}

/// Rain in mm over the `seconds` before the slot at `position`, searching
/// the loaded history.
///
/// Returns 0 when the slot is missing or no record is old enough.
pub fn rain_since(history: &History, position: usize, seconds: i64) -> f32 {
    let Some(current) = history.slots().get(position).and_then(Option::as_ref) else {
        return 0.0;
    };
    match rain_reference(history, position, seconds) {
        Some(reference) => rain_between(current, reference),
        None => 0.0,
    }
}

/// Rain over the last hour and day for one history slot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RainTotals {
    /// mm in the last hour.
    pub last_hour: f32,
    /// mm in the last 24 hours.
    pub last_day: f32,
}

impl RainTotals {
    /// Daily rain spread over 24 hours, in mm/h.
    pub fn day_hourly_rate(&self) -> f32 {
        self.last_day / 24.0
    }
}

impl<M: StationMemory> Station<M> {
    /// Rain in mm over the `seconds` before the slot at `position`.
    ///
    /// In quick rain mode the reference record is found by read period
    /// arithmetic and read from the station when not loaded. Otherwise
    /// this is [`rain_since`].
    pub fn rain_over(&mut self, history: &History, position: usize, seconds: i64) -> f32 {
        if !history.quick_rain() {
            return rain_since(history, position, seconds);
        }
        let Some(current) = history.slots().get(position).and_then(Option::as_ref) else {
            return 0.0;
        };
        match self.quick_rain_reference(history, current, seconds) {
            Some(reference) => rain_between(current, &reference),
            None => {
                debug!("No quick rain reference {}s before 0x{:04X}", seconds, current.address);
                0.0
            }
        }
    }

    /// Rain over the last hour and day for the slot at `position`.
    pub fn rain_totals(&mut self, history: &History, position: usize) -> RainTotals {
        RainTotals {
            last_hour: self.rain_over(history, position, HOUR),
            last_day: self.rain_over(history, position, 24 * HOUR),
        }
    }
}
