//! Mock station implementation for testing.
//!
//! This module provides an in-memory station that can be used for unit
//! testing without a USB device attached.
//!
//! The [`MockStation`] implements the [`StationMemory`] trait, allowing it to
//! be used interchangeably with real transports in generic code.
//!
//! # Features
//!
//! - **History seeding**: Push records in write order and let the builder
//!   maintain `current_pos` and `data_count`
//! - **Failure injection**: Fail reads at specific addresses, permanently or
//!   a fixed number of times
//! - **Unsettled memory**: Serve a bad magic number for the first few
//!   settings reads
//! - **Write capture**: Record every byte written for later inspection

use std::collections::{HashMap, HashSet};

use bytes::BufMut;

use wsp_types::layout::{
    offsets, BLOCK_SIZE, HISTORY_CHUNK_SIZE, HISTORY_MAX, HISTORY_START, MAGIC_NUMBER, MEMORY_SIZE,
    next_address,
};
use wsp_types::units::to_sign_magnitude;
use wsp_types::BcdDate;

use crate::error::{Error, Result};
use crate::traits::StationMemory;

/// Values for one history chunk, in raw station units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockRecord {
    pub delay: u8,
    pub indoor_humidity: u8,
    /// Tenths of °C.
    pub indoor_temp: i32,
    pub outdoor_humidity: u8,
    /// Tenths of °C.
    pub outdoor_temp: i32,
    /// Tenths of hPa.
    pub abs_pressure: u16,
    /// Tenths of m/s, 12 bits.
    pub avg_wind: u16,
    /// Tenths of m/s, 12 bits.
    pub gust_wind: u16,
    pub wind_direction: u8,
    /// 0.3 mm ticks.
    pub total_rain: u16,
    pub status: u8,
}

impl Default for MockRecord {
    fn default() -> Self {
        Self {
            delay: 30,
            indoor_humidity: 45,
            indoor_temp: 215,
            outdoor_humidity: 70,
            outdoor_temp: 123,
            abs_pressure: 10132,
            avg_wind: 25,
            gust_wind: 40,
            wind_direction: 4,
            total_rain: 0,
            status: 0,
        }
    }
}

impl MockRecord {
    /// Set the delay in minutes.
    #[must_use]
    pub fn delay(mut self, minutes: u8) -> Self {
        self.delay = minutes;
        self
    }

    /// Set the outdoor temperature in tenths of °C.
    #[must_use]
    pub fn outdoor_temp(mut self, tenths: i32) -> Self {
        self.outdoor_temp = tenths;
        self
    }

    /// Set the rain counter.
    #[must_use]
    pub fn total_rain(mut self, ticks: u16) -> Self {
        self.total_rain = ticks;
        self
    }

    /// Set the status byte.
    #[must_use]
    pub fn status(mut self, status: u8) -> Self {
        self.status = status;
        self
    }

    /// Encode as a station chunk.
    pub fn to_bytes(&self) -> [u8; HISTORY_CHUNK_SIZE] {
        let wind_high =
            (((self.gust_wind >> 8) as u8 & 0x0F) << 4) | ((self.avg_wind >> 8) as u8 & 0x0F);

        let mut buf = Vec::with_capacity(HISTORY_CHUNK_SIZE);
        buf.put_u8(self.delay);
        buf.put_u8(self.indoor_humidity);
        buf.put_u16_le(to_sign_magnitude(self.indoor_temp));
        buf.put_u8(self.outdoor_humidity);
        buf.put_u16_le(to_sign_magnitude(self.outdoor_temp));
        buf.put_u16_le(self.abs_pressure);
        buf.put_u8(self.avg_wind as u8);
        buf.put_u8(self.gust_wind as u8);
        buf.put_u8(wind_high);
        buf.put_u8(self.wind_direction);
        buf.put_u16_le(self.total_rain);
        buf.put_u8(self.status);

        let mut chunk = [0u8; HISTORY_CHUNK_SIZE];
        chunk.copy_from_slice(&buf);
        chunk
    }
}

/// An in-memory weather station.
///
/// # Example
///
/// ```
/// use wsp_core::{MockRecord, MockStationBuilder, Station};
///
/// let mock = MockStationBuilder::new()
///     .read_period(5)
///     .record(MockRecord::default().delay(5))
///     .record(MockRecord::default().delay(5))
///     .build();
///
/// let mut station = Station::new(mock);
/// let settings = station.read_settings().unwrap();
/// assert_eq!(settings.data_count, 2);
/// assert_eq!(settings.current_pos, 0x0110);
/// ```
#[derive(Debug, Clone)]
pub struct MockStation {
    memory: Vec<u8>,
    read_count: u32,
    writes: Vec<(u16, u8)>,
    read_only: bool,
    failing: HashSet<u16>,
    transient: HashMap<u16, u32>,
    bad_magic_reads: u32,
}

impl Default for MockStation {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStation {
    /// A station with valid settings and no history.
    pub fn new() -> Self {
        MockStationBuilder::new().build()
    }

    /// The full memory image.
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Number of block reads served, failures included.
    pub fn read_count(&self) -> u32 {
        self.read_count
    }

    /// Reset the read counter.
    pub fn reset_read_count(&mut self) {
        self.read_count = 0;
    }

    /// Every byte written so far, in order.
    pub fn writes(&self) -> &[(u16, u8)] {
        &self.writes
    }

    /// Reject writes with [`Error::Unsupported`].
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Make every read of the block at `address` fail.
    pub fn fail_address(&mut self, address: u16) {
        self.failing.insert(address);
    }

    /// Make the next `count` reads of the block at `address` fail.
    pub fn set_transient_failures(&mut self, address: u16, count: u32) {
        self.transient.insert(address, count);
    }

    fn check_write(&self) -> Result<()> {
        if self.read_only {
            return Err(Error::unsupported("write to read-only mock station"));
        }
        Ok(())
    }
}

impl StationMemory for MockStation {
    fn read_block(&mut self, address: u16) -> Result<[u8; BLOCK_SIZE]> {
        self.read_count += 1;

        if self.failing.contains(&address) {
            return Err(Error::read_failed(address, "mock failure"));
        }
        if let Some(remaining) = self.transient.get_mut(&address) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::read_failed(address, "mock transient failure"));
            }
        }

        let start = usize::from(address);
        let end = (start + BLOCK_SIZE).min(MEMORY_SIZE);
        let mut block = [0u8; BLOCK_SIZE];
        block[..end - start].copy_from_slice(&self.memory[start..end]);

        if address == 0 && self.bad_magic_reads > 0 {
            self.bad_magic_reads -= 1;
            block[0] = 0xFF;
            block[1] = 0xFF;
        }
        Ok(block)
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        self.check_write()?;
        self.memory[usize::from(address)] = value;
        self.writes.push((address, value));
        Ok(())
    }

    fn write_block(&mut self, address: u16, data: &[u8; BLOCK_SIZE]) -> Result<()> {
        self.check_write()?;
        let start = usize::from(address);
        let end = (start + BLOCK_SIZE).min(MEMORY_SIZE);
        self.memory[start..end].copy_from_slice(&data[..end - start]);
        for (offset, value) in data[..end - start].iter().enumerate() {
            self.writes.push((address + offset as u16, *value));
        }
        Ok(())
    }
}

/// Builder for creating mock stations with custom memory contents.
#[derive(Debug, Clone)]
pub struct MockStationBuilder {
    magic: [u8; 2],
    read_period: u8,
    timezone: i8,
    datetime: BcdDate,
    start_address: u16,
    data_count: Option<u16>,
    records: Vec<[u8; HISTORY_CHUNK_SIZE]>,
    settings_bytes: Vec<(usize, u8)>,
    bad_magic_reads: u32,
}

impl Default for MockStationBuilder {
    fn default() -> Self {
        Self {
            magic: MAGIC_NUMBER,
            read_period: 30,
            timezone: 0,
            datetime: BcdDate {
                year: 2010,
                month: 5,
                day: 14,
                hour: 9,
                minute: 30,
            },
            start_address: HISTORY_START,
            data_count: None,
            records: Vec::new(),
            settings_bytes: Vec::new(),
            bad_magic_reads: 0,
        }
    }
}

impl MockStationBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the magic number bytes.
    #[must_use]
    pub fn magic(mut self, magic: [u8; 2]) -> Self {
        self.magic = magic;
        self
    }

    /// Set the read period in minutes.
    #[must_use]
    pub fn read_period(mut self, minutes: u8) -> Self {
        self.read_period = minutes;
        self
    }

    /// Set the timezone byte.
    #[must_use]
    pub fn timezone(mut self, hours: i8) -> Self {
        self.timezone = hours;
        self
    }

    /// Set the station clock.
    #[must_use]
    pub fn datetime(mut self, datetime: BcdDate) -> Self {
        self.datetime = datetime;
        self
    }

    /// Address the first pushed record is written to.
    #[must_use]
    pub fn start_address(mut self, address: u16) -> Self {
        self.start_address = address;
        self
    }

    /// Override the stored `data_count`.
    #[must_use]
    pub fn data_count(mut self, count: u16) -> Self {
        self.data_count = Some(count);
        self
    }

    /// Append a record; the last one pushed is the newest.
    #[must_use]
    pub fn record(mut self, record: MockRecord) -> Self {
        self.records.push(record.to_bytes());
        self
    }

    /// Append a raw chunk.
    #[must_use]
    pub fn raw_record(mut self, chunk: [u8; HISTORY_CHUNK_SIZE]) -> Self {
        self.records.push(chunk);
        self
    }

    /// Append `count` copies of `record`.
    #[must_use]
    pub fn records(mut self, record: MockRecord, count: usize) -> Self {
        let chunk = record.to_bytes();
        self.records.extend(std::iter::repeat_n(chunk, count));
        self
    }

    /// Poke an arbitrary byte in the settings block.
    #[must_use]
    pub fn settings_byte(mut self, offset: usize, value: u8) -> Self {
        self.settings_bytes.push((offset, value));
        self
    }

    /// Serve a bad magic number on the first `count` reads of block 0.
    #[must_use]
    pub fn unsettled_reads(mut self, count: u32) -> Self {
        self.bad_magic_reads = count;
        self
    }

    /// Build the mock station.
    pub fn build(self) -> MockStation {
        let mut memory = vec![0u8; MEMORY_SIZE];

        let mut address = self.start_address;
        let mut current_pos = self.start_address;
        for (i, chunk) in self.records.iter().enumerate() {
            if i > 0 {
                address = next_address(address);
            }
            let start = usize::from(address);
            memory[start..start + HISTORY_CHUNK_SIZE].copy_from_slice(chunk);
            current_pos = address;
        }

        let stored = self.records.len().min(usize::from(HISTORY_MAX)) as u16;
        let data_count = self.data_count.unwrap_or(stored);

        memory[..2].copy_from_slice(&self.magic);
        memory[usize::from(offsets::READ_PERIOD)] = self.read_period;
        memory[usize::from(offsets::TIMEZONE)] = self.timezone as u8;
        let count_at = usize::from(offsets::DATA_COUNT);
        memory[count_at..count_at + 2].copy_from_slice(&data_count.to_le_bytes());
        let pos_at = usize::from(offsets::CURRENT_POS);
        memory[pos_at..pos_at + 2].copy_from_slice(&current_pos.to_le_bytes());
        memory[43..48].copy_from_slice(&self.datetime.to_bytes());
        for (offset, value) in self.settings_bytes {
            memory[offset] = value;
        }

        MockStation {
            memory,
            read_count: 0,
            writes: Vec::new(),
            read_only: false,
            failing: HashSet::new(),
            transient: HashMap::new(),
            bad_magic_reads: self.bad_magic_reads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsp_types::{StationSettings, WeatherRecord};

    #[test]
    fn test_mock_record_encoding() {
        let record = MockRecord {
            avg_wind: 0x12C,
            gust_wind: 0x290,
            outdoor_temp: -52,
            ..MockRecord::default()
        };
        let decoded = WeatherRecord::from_bytes(&record.to_bytes()).unwrap();
        assert_eq!(decoded.outdoor_temp, -52);
        assert_eq!(decoded.avg_wind_raw(), 0x12C);
        assert_eq!(decoded.gust_wind_raw(), 0x290);
        assert_eq!(decoded.wind_high, 0x21);
    }

    #[test]
    fn test_builder_defaults() {
        let mock = MockStation::new();
        let settings = StationSettings::from_bytes(&mock.memory()[..256]).unwrap();
        assert!(settings.has_valid_magic());
        assert_eq!(settings.read_period, 30);
        assert_eq!(settings.data_count, 0);
        assert_eq!(settings.current_pos, HISTORY_START);
        assert_eq!(settings.datetime.to_string(), "2010-05-14 09:30:00");
    }

    #[test]
    fn test_builder_places_records() {
        let mock = MockStationBuilder::new()
            .start_address(0xFFE0)
            .records(MockRecord::default(), 3)
            .build();
        let settings = StationSettings::from_bytes(&mock.memory()[..256]).unwrap();
        assert_eq!(settings.data_count, 3);
        // 0xFFE0, 0xFFF0, then wraps to the start of the ring.
        assert_eq!(settings.current_pos, HISTORY_START);
        assert_eq!(mock.memory()[0xFFE0], 30);
        assert_eq!(mock.memory()[0x0100], 30);
    }

    #[test]
    fn test_data_count_saturates() {
        let mock = MockStationBuilder::new()
            .records(MockRecord::default(), usize::from(HISTORY_MAX) + 5)
            .build();
        let settings = StationSettings::from_bytes(&mock.memory()[..256]).unwrap();
        assert_eq!(settings.data_count, HISTORY_MAX);
        assert_eq!(settings.current_pos, 0x0100 + 4 * 16);
    }

    #[test]
    fn test_read_block_zero_fills_past_end() {
        let mut mock = MockStationBuilder::new()
            .start_address(0xFFF0)
            .record(MockRecord::default())
            .build();
        let block = mock.read_block(0xFFF0).unwrap();
        assert_eq!(block[0], 30);
        assert_eq!(&block[16..], &[0u8; 16]);
    }

    #[test]
    fn test_failure_injection() {
        let mut mock = MockStation::new();
        mock.fail_address(0x0100);
        mock.set_transient_failures(0x0110, 2);

        assert!(mock.read_block(0x0100).is_err());
        assert!(mock.read_block(0x0110).is_err());
        assert!(mock.read_block(0x0110).is_err());
        assert!(mock.read_block(0x0110).is_ok());
        assert_eq!(mock.read_count(), 4);
    }

    #[test]
    fn test_unsettled_reads() {
        let mut mock = MockStationBuilder::new().unsettled_reads(1).build();
        assert_eq!(&mock.read_block(0).unwrap()[..2], &[0xFF, 0xFF]);
        assert_eq!(&mock.read_block(0).unwrap()[..2], &MAGIC_NUMBER);
    }

    #[test]
    fn test_writes_are_recorded() {
        let mut mock = MockStation::new();
        mock.write_byte(16, 5).unwrap();
        assert_eq!(mock.memory()[16], 5);
        assert_eq!(mock.writes(), &[(16, 5)]);

        mock.set_read_only(true);
        assert!(matches!(mock.write_byte(16, 6), Err(Error::Unsupported(_))));
    }
}
