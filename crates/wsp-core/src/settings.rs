//! Settings write path.
//!
//! The station only picks up host changes after [`SETTINGS_CHANGED`] is
//! written to the data-refreshed flag, so every setter ends with that
//! notification.

use tracing::info;

use wsp_types::layout::{offsets, SETTINGS_CHANGED};

use crate::error::{Error, Result};
use crate::retry::with_retry;
use crate::station::Station;
use crate::traits::StationMemory;

/// Longest read period the station accepts, in minutes.
pub const MAX_READ_PERIOD: u8 = 240;

impl<M: StationMemory> Station<M> {
    /// Write one byte, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] on read-only transports.
    pub fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        let retry = self.retry_config().clone();
        let memory = self.memory_mut();
        with_retry(&retry, "write_byte", || memory.write_byte(address, value))
    }

    /// Tell the station its settings changed.
    pub fn notify_settings_changed(&mut self) -> Result<()> {
        self.write_byte(offsets::DATA_REFRESHED, SETTINGS_CHANGED)
    }

    /// Set the minutes between stored readings (1..=240).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a period outside 1..=240.
    pub fn set_read_period(&mut self, minutes: u8) -> Result<()> {
        if minutes == 0 || minutes > MAX_READ_PERIOD {
            return Err(Error::invalid_config(format!(
                "read period must be 1..={} minutes, got {}",
                MAX_READ_PERIOD, minutes
            )));
        }
        info!("Setting read period to {} minutes", minutes);
        self.write_byte(offsets::READ_PERIOD, minutes)?;
        self.notify_settings_changed()
    }

    /// Set the hour offset from CET (-12..=12).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an offset outside -12..=12.
    pub fn set_timezone(&mut self, hours: i8) -> Result<()> {
        if !(-12..=12).contains(&hours) {
            return Err(Error::invalid_config(format!(
                "timezone must be -12..=12 hours, got {}",
                hours
            )));
        }
        info!("Setting timezone to CET{:+}", hours);
        self.write_byte(offsets::TIMEZONE, hours as u8)?;
        self.notify_settings_changed()
    }

    /// Clear the stored history.
    ///
    /// Sets the record count to 0 and the write position to `0x0100`.
    pub fn reset_memory(&mut self) -> Result<()> {
        info!("Resetting history memory");
        let count = offsets::DATA_COUNT;
        let pos = offsets::CURRENT_POS;
        self.write_byte(count, 0)?;
        self.write_byte(count + 1, 0)?;
        self.write_byte(pos, 0x00)?;
        self.write_byte(pos + 1, 0x01)?;
        self.notify_settings_changed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockRecord, MockStation, MockStationBuilder};

    #[test]
    fn test_set_read_period() {
        let mut station = Station::new(MockStation::new());
        station.set_read_period(5).unwrap();
        assert_eq!(station.memory().writes(), &[(16, 5), (26, 0xAA)]);
        assert_eq!(station.read_settings().unwrap().read_period, 5);
    }

    #[test]
    fn test_set_read_period_rejects_zero() {
        let mut station = Station::new(MockStation::new());
        assert!(matches!(
            station.set_read_period(0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(station.memory().writes().is_empty());
    }

    #[test]
    fn test_set_timezone_negative() {
        let mut station = Station::new(MockStation::new());
        station.set_timezone(-2).unwrap();
        assert_eq!(station.memory().writes(), &[(24, 0xFE), (26, 0xAA)]);
        assert_eq!(station.read_settings().unwrap().timezone, -2);
    }

    #[test]
    fn test_reset_memory() {
        let mock = MockStationBuilder::new()
            .records(MockRecord::default(), 20)
            .build();
        let mut station = Station::new(mock);
        station.reset_memory().unwrap();

        assert_eq!(
            station.memory().writes(),
            &[(27, 0), (28, 0), (30, 0x00), (31, 0x01), (26, 0xAA)]
        );
        let settings = station.read_settings().unwrap();
        assert_eq!(settings.data_count, 0);
        assert_eq!(settings.current_pos, 0x0100);
    }

    #[test]
    fn test_write_on_read_only_transport() {
        let mut mock = MockStation::new();
        mock.set_read_only(true);
        let mut station = Station::new(mock);
        assert!(matches!(
            station.set_timezone(1),
            Err(Error::Unsupported(_))
        ));
    }
}
